//! Authenticated profile route tests: token enforcement, merged
//! profile reads, profile writes, and password changes.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use gatehouse_identity::mock::MockIdentityProvider;

use common::{signed_token, TestApp};

fn seeded_app() -> TestApp {
    let provider = MockIdentityProvider::new().with_user(
        "sub-1",
        "a@example.com",
        "old-password",
        Some("user"),
        true,
    );
    TestApp::new(provider)
}

#[tokio::test]
async fn test_profile_requires_token() {
    let app = seeded_app();

    let (status, body) = app.get("/profile", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], true);
    assert_eq!(body["message"], "Access token not provided");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_expired_token_rejected_with_generic_message() {
    let app = seeded_app();
    let token = signed_token("sub-1", "a@example.com", Some("user"), -3600);

    let (status, body) = app.get("/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid or expired token");
}

#[tokio::test]
async fn test_malformed_authorization_header_rejected() {
    let app = seeded_app();

    let request = axum::http::Request::builder()
        .method("GET")
        .uri("/profile")
        .header("authorization", "Token abc123")
        .body(axum::body::Body::empty())
        .unwrap();

    let (status, body) = app.request(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], true);
}

#[tokio::test]
async fn test_get_profile_merges_provider_and_store() {
    let app = seeded_app();
    let token = signed_token("sub-1", "a@example.com", Some("user"), 3600);

    let (status, body) = app.get("/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let user = &body["user"];
    assert_eq!(user["userId"], "sub-1");
    assert_eq!(user["email"], "a@example.com");
    assert_eq!(user["role"], "user");
    assert_eq!(user["emailVerified"], true);
    // No extended record yet
    assert_eq!(user["profile"], json!({}));
}

#[tokio::test]
async fn test_update_then_get_profile_round_trips_attributes() {
    let app = seeded_app();
    let token = signed_token("sub-1", "a@example.com", Some("user"), 3600);

    let (status, _) = app
        .send_json(
            "PUT",
            "/profile",
            Some(&token),
            json!({
                "name": "Renamed User",
                "profile": { "phone": "555-0100", "city": "Lisbon" },
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get("/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let user = &body["user"];
    assert_eq!(user["name"], "Renamed User");
    assert_eq!(user["profile"]["phone"], "555-0100");
    assert_eq!(user["profile"]["city"], "Lisbon");
    assert!(user["profile"]["updatedAt"].is_string());
}

#[tokio::test]
async fn test_update_profile_rejects_short_name() {
    let app = seeded_app();
    let token = signed_token("sub-1", "a@example.com", Some("user"), 3600);

    let (status, body) = app
        .send_json("PUT", "/profile", Some(&token), json!({ "name": "x" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid request data");
}

#[tokio::test]
async fn test_change_password_with_own_token() {
    let app = seeded_app();
    let token = signed_token("sub-1", "a@example.com", Some("user"), 3600);
    app.identity.bind_token(&token, "a@example.com");

    // Wrong current password is refused
    let (status, _) = app
        .send_json(
            "POST",
            "/profile/change-password",
            Some(&token),
            json!({
                "currentPassword": "not-the-password",
                "newPassword": "replacement-password",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .send_json(
            "POST",
            "/profile/change-password",
            Some(&token),
            json!({
                "currentPassword": "old-password",
                "newPassword": "replacement-password",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password changed");

    // New password is now live
    let (status, _) = app
        .post_json(
            "/auth/login",
            json!({ "email": "a@example.com", "password": "replacement-password" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_change_password_rejects_short_replacement() {
    let app = seeded_app();
    let token = signed_token("sub-1", "a@example.com", Some("user"), 3600);

    let (status, _) = app
        .send_json(
            "POST",
            "/profile/change-password",
            Some(&token),
            json!({ "currentPassword": "old-password", "newPassword": "short" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_profile_store_outage_is_internal_error() {
    let app = seeded_app();
    let token = signed_token("sub-1", "a@example.com", Some("user"), 3600);
    app.profiles.set_unreachable(true);

    let (status, body) = app.get("/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Internal server error");
}
