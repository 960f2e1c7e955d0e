//! Public authentication flow tests: signup, confirmation, login,
//! refresh, and password recovery through the full router.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use gatehouse_identity::mock::{MockIdentityProvider, MOCK_CONFIRMATION_CODE};

use common::TestApp;

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::new(MockIdentityProvider::new());

    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "gatehouse-api");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_signup_rejects_invalid_fields_with_details() {
    let app = TestApp::new(MockIdentityProvider::new());

    let (status, body) = app
        .post_json(
            "/auth/signup",
            json!({ "email": "bad", "password": "123", "name": "x" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], true);
    assert_eq!(body["message"], "Invalid request data");
    assert!(body["timestamp"].is_string());

    let details = &body["details"];
    assert!(details["email"].is_array());
    assert!(details["password"].is_array());
}

#[tokio::test]
async fn test_signup_then_confirm_then_login() {
    let app = TestApp::new(MockIdentityProvider::new());

    let (status, body) = app
        .post_json(
            "/auth/signup",
            json!({
                "email": "new@example.com",
                "password": "password123",
                "name": "New User",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["userConfirmed"], false);
    assert_eq!(body["codeDelivery"]["medium"], "EMAIL");

    // Login before confirmation is refused
    let (status, body) = app
        .post_json(
            "/auth/login",
            json!({ "email": "new@example.com", "password": "password123" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User not confirmed");

    let (status, _) = app
        .post_json(
            "/auth/confirm",
            json!({ "email": "new@example.com", "code": MOCK_CONFIRMATION_CODE }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post_json(
            "/auth/login",
            json!({ "email": "new@example.com", "password": "password123" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["tokenType"], "Bearer");
    assert!(body["accessToken"].is_string());
    assert!(body["refreshToken"].is_string());
}

#[tokio::test]
async fn test_login_wrong_password_is_generic_unauthorized() {
    let provider = MockIdentityProvider::new().with_user(
        "sub-1",
        "known@example.com",
        "right-password",
        None,
        true,
    );
    let app = TestApp::new(provider);

    let (status, body) = app
        .post_json(
            "/auth/login",
            json!({ "email": "known@example.com", "password": "wrong-password" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], true);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_login_unknown_account_indistinguishable_from_bad_password() {
    let app = TestApp::new(MockIdentityProvider::new());

    let (status, body) = app
        .post_json(
            "/auth/login",
            json!({ "email": "ghost@example.com", "password": "whatever123" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_refresh_returns_fresh_tokens() {
    let provider = MockIdentityProvider::new().with_user(
        "sub-1",
        "a@example.com",
        "password123",
        None,
        true,
    );
    let app = TestApp::new(provider);

    let (_, login) = app
        .post_json(
            "/auth/login",
            json!({ "email": "a@example.com", "password": "password123" }),
        )
        .await;

    let (status, body) = app
        .post_json(
            "/auth/refresh",
            json!({
                "email": "a@example.com",
                "refreshToken": login["refreshToken"],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Token refreshed");
    assert!(body["accessToken"].is_string());
}

#[tokio::test]
async fn test_password_recovery_flow() {
    let provider = MockIdentityProvider::new().with_user(
        "sub-1",
        "a@example.com",
        "old-password",
        None,
        true,
    );
    let app = TestApp::new(provider);

    let (status, body) = app
        .post_json("/auth/forgot-password", json!({ "email": "a@example.com" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["codeDelivery"]["medium"], "EMAIL");

    // Wrong code fails, right code resets
    let (status, _) = app
        .post_json(
            "/auth/confirm-password",
            json!({
                "email": "a@example.com",
                "code": "000000",
                "newPassword": "brand-new-password",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post_json(
            "/auth/confirm-password",
            json!({
                "email": "a@example.com",
                "code": MOCK_CONFIRMATION_CODE,
                "newPassword": "brand-new-password",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .post_json(
            "/auth/login",
            json!({ "email": "a@example.com", "password": "brand-new-password" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unreachable_provider_maps_to_500() {
    let provider = MockIdentityProvider::new().with_user(
        "sub-1",
        "a@example.com",
        "password123",
        None,
        true,
    );
    let app = TestApp::new(provider);
    app.identity
        .fail_with(Some(gatehouse_identity::IdentityError::Unavailable));

    let (status, body) = app
        .post_json(
            "/auth/login",
            json!({ "email": "a@example.com", "password": "password123" }),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], true);
    assert_eq!(body["message"], "Identity provider unavailable");
}

#[tokio::test]
async fn test_rate_limited_provider_maps_to_429() {
    let provider = MockIdentityProvider::new().with_user(
        "sub-1",
        "a@example.com",
        "password123",
        None,
        true,
    );
    let app = TestApp::new(provider);
    app.identity
        .fail_with(Some(gatehouse_identity::IdentityError::LimitExceeded));

    let (status, body) = app
        .post_json("/auth/forgot-password", json!({ "email": "a@example.com" }))
        .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], true);
}
