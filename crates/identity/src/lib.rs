//! Gatehouse identity provider adapter
//!
//! Thin boundary over the external identity service. Every operation
//! forwards its parameters and normalizes provider error codes into a
//! small taxonomy; there is no authentication logic of our own here.
//! Supports:
//! - AWS Cognito for production
//! - Programmable mock provider for testing and development

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use gatehouse_common::{DEFAULT_ROLE, ROLE_ATTRIBUTE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod cognito;
pub mod mock;

/// Normalized identity-provider failure.
///
/// Display strings are the fixed user-facing messages; `Provider`
/// carries the provider's raw message when no mapping exists.
#[derive(Debug, Clone, Error)]
pub enum IdentityError {
    #[error("User not found")]
    UserNotFound,
    #[error("Invalid credentials")]
    NotAuthorized,
    #[error("User not confirmed")]
    UserNotConfirmed,
    #[error("User already exists")]
    UsernameExists,
    #[error("Invalid parameters")]
    InvalidParameter,
    #[error("Invalid verification code")]
    CodeMismatch,
    #[error("Verification code expired")]
    ExpiredCode,
    #[error("Attempt limit exceeded, try again later")]
    LimitExceeded,
    /// The provider could not be reached at all; not a caller fault
    #[error("Identity provider unavailable")]
    Unavailable,
    #[error("{0}")]
    Provider(String),
}

impl IdentityError {
    /// Map a provider error code to the taxonomy, falling back to the
    /// raw message when the code is unrecognized.
    pub fn from_code(code: Option<&str>, raw_message: impl Into<String>) -> Self {
        match code {
            Some("UserNotFoundException") => IdentityError::UserNotFound,
            Some("NotAuthorizedException") => IdentityError::NotAuthorized,
            Some("UserNotConfirmedException") => IdentityError::UserNotConfirmed,
            Some("UsernameExistsException") => IdentityError::UsernameExists,
            Some("InvalidParameterException") => IdentityError::InvalidParameter,
            Some("CodeMismatchException") => IdentityError::CodeMismatch,
            Some("ExpiredCodeException") => IdentityError::ExpiredCode,
            Some("LimitExceededException") => IdentityError::LimitExceeded,
            _ => IdentityError::Provider(raw_message.into()),
        }
    }

    /// Domain-appropriate HTTP status for this failure
    pub fn status(&self) -> u16 {
        match self {
            IdentityError::UserNotFound => 404,
            IdentityError::NotAuthorized => 401,
            IdentityError::UsernameExists => 409,
            IdentityError::UserNotConfirmed
            | IdentityError::InvalidParameter
            | IdentityError::CodeMismatch
            | IdentityError::ExpiredCode => 400,
            IdentityError::LimitExceeded => 429,
            IdentityError::Unavailable => 500,
            IdentityError::Provider(_) => 400,
        }
    }
}

/// Outcome of a signup request
#[derive(Debug, Clone, Serialize)]
pub struct SignUpOutcome {
    pub user_confirmed: bool,
    pub user_sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_delivery: Option<CodeDelivery>,
}

/// Where and how a confirmation code was delivered
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeDelivery {
    pub destination: Option<String>,
    pub medium: Option<String>,
    pub attribute: Option<String>,
}

/// Token set issued by the provider
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub expires_in: i32,
    pub token_type: String,
}

/// User record as the provider reports it
#[derive(Debug, Clone)]
pub struct IdentityUser {
    pub username: String,
    pub enabled: bool,
    pub status: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Flattened provider attributes (email, name, custom:role, ...)
    pub attributes: HashMap<String, String>,
}

impl IdentityUser {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Subject identifier; falls back to the username for providers
    /// that do not expose a separate `sub` attribute.
    pub fn sub(&self) -> &str {
        self.attribute("sub").unwrap_or(&self.username)
    }

    /// Effective role, defaulting through the shared constant
    pub fn role(&self) -> &str {
        self.attribute(ROLE_ATTRIBUTE).unwrap_or(DEFAULT_ROLE)
    }

    pub fn email_verified(&self) -> bool {
        self.attribute("email_verified") == Some("true")
    }
}

/// One page of a user listing
#[derive(Debug, Clone)]
pub struct UserPage {
    pub users: Vec<IdentityUser>,
    pub pagination_token: Option<String>,
}

/// Boundary to the external identity service.
///
/// Implementations forward to the provider; no retries are performed
/// here, callers own retry policy.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register a new user with the given attributes
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        attributes: &HashMap<String, String>,
    ) -> Result<SignUpOutcome, IdentityError>;

    /// Confirm a registration with the emailed code
    async fn confirm_sign_up(&self, email: &str, code: &str) -> Result<(), IdentityError>;

    /// Authenticate with email + password
    async fn login(&self, email: &str, password: &str) -> Result<AuthTokens, IdentityError>;

    /// Exchange a refresh token for fresh access/id tokens
    async fn refresh(&self, email: &str, refresh_token: &str)
        -> Result<AuthTokens, IdentityError>;

    /// Start the password-reset flow
    async fn forgot_password(&self, email: &str) -> Result<Option<CodeDelivery>, IdentityError>;

    /// Complete the password-reset flow with the emailed code
    async fn confirm_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), IdentityError>;

    /// Change the password of the caller identified by `access_token`
    async fn change_password(
        &self,
        access_token: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), IdentityError>;

    /// Look up a user by username/sub (admin credentialed)
    async fn admin_get_user(&self, username: &str) -> Result<IdentityUser, IdentityError>;

    /// List users, paginated
    async fn list_users(
        &self,
        limit: i32,
        pagination_token: Option<String>,
    ) -> Result<UserPage, IdentityError>;

    /// Update user attributes (admin credentialed)
    async fn admin_update_attributes(
        &self,
        username: &str,
        attributes: &HashMap<String, String>,
    ) -> Result<(), IdentityError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        assert!(matches!(
            IdentityError::from_code(Some("UserNotFoundException"), "raw"),
            IdentityError::UserNotFound
        ));
        assert!(matches!(
            IdentityError::from_code(Some("NotAuthorizedException"), "raw"),
            IdentityError::NotAuthorized
        ));
        assert!(matches!(
            IdentityError::from_code(Some("LimitExceededException"), "raw"),
            IdentityError::LimitExceeded
        ));
    }

    #[test]
    fn test_unrecognized_code_falls_back_to_raw_message() {
        let err = IdentityError::from_code(Some("SomethingNewException"), "the raw message");
        assert!(matches!(err, IdentityError::Provider(_)));
        assert_eq!(err.to_string(), "the raw message");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(IdentityError::UserNotFound.status(), 404);
        assert_eq!(IdentityError::NotAuthorized.status(), 401);
        assert_eq!(IdentityError::UsernameExists.status(), 409);
        assert_eq!(IdentityError::CodeMismatch.status(), 400);
        assert_eq!(IdentityError::LimitExceeded.status(), 429);
        assert_eq!(IdentityError::Unavailable.status(), 500);
    }

    #[test]
    fn test_identity_user_role_defaults() {
        let user = IdentityUser {
            username: "u1".to_string(),
            enabled: true,
            status: None,
            created_at: None,
            updated_at: None,
            attributes: HashMap::new(),
        };
        assert_eq!(user.role(), "user");
        assert_eq!(user.sub(), "u1");

        let mut attrs = HashMap::new();
        attrs.insert("custom:role".to_string(), "moderator".to_string());
        attrs.insert("sub".to_string(), "sub-1".to_string());
        let user = IdentityUser {
            attributes: attrs,
            ..user
        };
        assert_eq!(user.role(), "moderator");
        assert_eq!(user.sub(), "sub-1");
    }
}
