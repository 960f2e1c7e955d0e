//! Authentication and authorization errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gatehouse_common::error_body;

/// Authentication error.
///
/// Messages are intentionally generic; diagnostic detail is logged at
/// the failure site and never returned to the caller.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Access token not provided")]
    MissingToken,
    #[error("Invalid authorization header format")]
    InvalidAuthorizationFormat,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("User not authenticated")]
    Unauthenticated,
    #[error("Access denied. Insufficient permissions.")]
    Forbidden,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken
            | AuthError::InvalidAuthorizationFormat
            | AuthError::InvalidToken
            | AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(error_body(self.to_string(), None));
        (status, body).into_response()
    }
}
