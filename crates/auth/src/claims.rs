//! Decoded JWT claims

use gatehouse_common::DEFAULT_ROLE;
use serde::{Deserialize, Serialize};

/// Verified claim set from a Cognito-issued token.
///
/// Only attached to a request after the verifier has confirmed the
/// signature, issuer, algorithm, and expiry. Handlers must never see
/// an unverified instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issuer
    pub iss: String,
    /// Expires at
    pub exp: u64,
    /// Issued at
    #[serde(default)]
    pub iat: u64,
    /// Email, when present on the token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Role attribute; read through [`Claims::role`], not directly
    #[serde(
        rename = "custom:role",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub role: Option<String>,
}

impl Claims {
    /// Effective role, defaulting to `user` when the attribute is absent.
    ///
    /// This is the single default-resolution point for token roles.
    pub fn role(&self) -> &str {
        self.role.as_deref().unwrap_or(DEFAULT_ROLE)
    }
}
