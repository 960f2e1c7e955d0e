//! Handler-level error type mapping every failure into the envelope

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gatehouse_auth::AuthError;
use gatehouse_common::error_body;
use gatehouse_identity::IdentityError;
use gatehouse_profile::ProfileError;

/// API error.
///
/// Validation failures expose field-level details; provider failures
/// are translated to fixed user-facing messages; everything unexpected
/// collapses to a generic 500 with the diagnostic logged only.
#[derive(Debug)]
pub enum ApiError {
    Validation(validator::ValidationErrors),
    BadRequest(String),
    Auth(AuthError),
    Provider(IdentityError),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                let details = serde_json::to_value(&errors).ok();
                let body = Json(error_body("Invalid request data", details));
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            ApiError::BadRequest(message) => {
                let body = Json(error_body(message, None));
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            ApiError::Auth(error) => error.into_response(),
            ApiError::Provider(error) => {
                let status = StatusCode::from_u16(error.status())
                    .unwrap_or(StatusCode::BAD_REQUEST);
                let body = Json(error_body(error.to_string(), None));
                (status, body).into_response()
            }
            ApiError::Internal(error) => {
                tracing::error!(error = %error, "Internal server error");
                let body = Json(error_body("Internal server error", None));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        ApiError::Auth(error)
    }
}

impl From<IdentityError> for ApiError {
    fn from(error: IdentityError) -> Self {
        ApiError::Provider(error)
    }
}

impl From<ProfileError> for ApiError {
    fn from(error: ProfileError) -> Self {
        ApiError::Internal(anyhow::Error::new(error))
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        ApiError::Internal(error)
    }
}
