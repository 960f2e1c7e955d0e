//! Public authentication handlers
//!
//! Implements the unauthenticated flows:
//! - POST /auth/signup
//! - POST /auth/confirm
//! - POST /auth/login
//! - POST /auth/refresh
//! - POST /auth/forgot-password
//! - POST /auth/confirm-password

use std::collections::HashMap;

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use gatehouse_identity::IdentityError;

use crate::error::ApiError;
use crate::state::AppState;

/// Request for user registration
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8))]
    pub password: String,

    #[validate(length(min = 2, max = 100))]
    pub name: String,
}

/// Request for login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ConfirmSignupRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub code: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPasswordRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub code: String,

    #[validate(length(min = 8))]
    pub new_password: String,
}

/// POST /auth/signup - Register a new user
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    request.validate()?;

    let mut attributes = HashMap::new();
    attributes.insert("name".to_string(), request.name);

    let outcome = state
        .identity
        .sign_up(&request.email, &request.password, &attributes)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered. Check your email to confirm the account.",
            "userConfirmed": outcome.user_confirmed,
            "codeDelivery": outcome.code_delivery,
        })),
    ))
}

/// POST /auth/confirm - Confirm a registration with the emailed code
pub async fn confirm_signup(
    State(state): State<AppState>,
    Json(request): Json<ConfirmSignupRequest>,
) -> Result<Json<Value>, ApiError> {
    request.validate()?;

    state
        .identity
        .confirm_sign_up(&request.email, &request.code)
        .await?;

    Ok(Json(json!({
        "message": "Email confirmed. You can now log in.",
    })))
}

/// POST /auth/login - Authenticate and issue tokens
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    request.validate()?;

    let tokens = state
        .identity
        .login(&request.email, &request.password)
        .await
        .map_err(|e| match e {
            IdentityError::UserNotConfirmed
            | IdentityError::LimitExceeded
            | IdentityError::Unavailable => ApiError::Provider(e),
            // Never reveal whether the account exists
            _ => ApiError::Provider(IdentityError::NotAuthorized),
        })?;

    let mut body = serde_json::to_value(&tokens).map_err(|e| ApiError::Internal(e.into()))?;
    body["message"] = json!("Login successful");
    Ok(Json(body))
}

/// POST /auth/refresh - Exchange a refresh token for fresh tokens
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<Value>, ApiError> {
    request.validate()?;

    let tokens = state
        .identity
        .refresh(&request.email, &request.refresh_token)
        .await?;

    let mut body = serde_json::to_value(&tokens).map_err(|e| ApiError::Internal(e.into()))?;
    body["message"] = json!("Token refreshed");
    Ok(Json(body))
}

/// POST /auth/forgot-password - Start the password-reset flow
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    request.validate()?;

    let delivery = state.identity.forgot_password(&request.email).await?;

    Ok(Json(json!({
        "message": "Recovery code sent to your email",
        "codeDelivery": delivery,
    })))
}

/// POST /auth/confirm-password - Complete the password-reset flow
pub async fn confirm_password(
    State(state): State<AppState>,
    Json(request): Json<ConfirmPasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    request.validate()?;

    state
        .identity
        .confirm_password(&request.email, &request.code, &request.new_password)
        .await?;

    Ok(Json(json!({
        "message": "Password changed",
    })))
}
