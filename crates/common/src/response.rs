//! Uniform response envelope and CORS policy
//!
//! Success responses are the handler payload serialized as-is with a
//! 2xx status. Failures share one envelope across every handler:
//! `{ error: true, message, timestamp, details? }`.

use axum::http::Method;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

/// Error envelope returned by every failing handler
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Always `true`; lets clients discriminate without inspecting status
    pub error: bool,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// Field-level detail, present only for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Build the error envelope with the current timestamp
pub fn error_body(message: impl Into<String>, details: Option<serde_json::Value>) -> ErrorBody {
    ErrorBody {
        error: true,
        message: message.into(),
        timestamp: Utc::now(),
        details,
    }
}

/// Permissive CORS layer (wildcard origin) applied to every response
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
}
