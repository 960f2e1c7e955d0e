//! Authenticated profile handlers
//!
//! - GET  /profile - merged provider attributes + extended profile
//! - PUT  /profile - update name and/or extended profile record
//! - POST /profile/change-password

use std::collections::HashMap;

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use gatehouse_auth::{extract_bearer_token, AuthUser};

use crate::error::ApiError;
use crate::state::AppState;

/// Request for updating the profile
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: Option<String>,

    /// Free-form extended profile attributes (phone, address, ...)
    pub profile: Option<serde_json::Map<String, Value>>,
}

/// Request for changing the password
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    pub current_password: String,

    #[validate(length(min = 8))]
    pub new_password: String,
}

/// GET /profile - Current user's merged profile
pub async fn get_profile(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let user = state.identity.admin_get_user(&claims.sub).await?;
    let profile = state.profiles.get_profile(&claims.sub).await?;

    let profile = match profile {
        Some(record) => serde_json::to_value(&record).map_err(|e| ApiError::Internal(e.into()))?,
        None => json!({}),
    };

    Ok(Json(json!({
        "user": {
            "userId": claims.sub,
            "email": user.attribute("email"),
            "name": user.attribute("name"),
            "role": user.role(),
            "emailVerified": user.email_verified(),
            "profile": profile,
        },
    })))
}

/// PUT /profile - Update provider name attribute and/or extended profile
pub async fn update_profile(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<Value>, ApiError> {
    request.validate()?;

    if let Some(name) = request.name {
        let mut attributes = HashMap::new();
        attributes.insert("name".to_string(), name);
        state
            .identity
            .admin_update_attributes(&claims.sub, &attributes)
            .await?;
    }

    if let Some(profile) = request.profile {
        state.profiles.put_profile(&claims.sub, profile).await?;
    }

    Ok(Json(json!({
        "message": "Profile updated",
    })))
}

/// POST /profile/change-password - Change the caller's password.
///
/// Forwards the caller's own access token to the provider; a wrong
/// current password fails with invalid credentials.
pub async fn change_password(
    AuthUser(_claims): AuthUser,
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    request.validate()?;

    // AuthUser already proved the header is present and well-formed
    let access_token = headers
        .get(AUTHORIZATION)
        .ok_or(gatehouse_auth::AuthError::MissingToken)
        .and_then(extract_bearer_token)?;

    state
        .identity
        .change_password(&access_token, &request.current_password, &request.new_password)
        .await?;

    Ok(Json(json!({
        "message": "Password changed",
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_profile_validation() {
        // Valid request
        let valid = UpdateProfileRequest {
            name: Some("Valid Name".to_string()),
            profile: None,
        };
        assert!(valid.validate().is_ok());

        // Name too short
        let short = UpdateProfileRequest {
            name: Some("x".to_string()),
            profile: None,
        };
        assert!(short.validate().is_err());

        // Both fields optional
        let empty = UpdateProfileRequest {
            name: None,
            profile: None,
        };
        assert!(empty.validate().is_ok());
    }

    #[test]
    fn test_change_password_validation() {
        let request = ChangePasswordRequest {
            current_password: "old-password".to_string(),
            new_password: "short".to_string(),
        };
        assert!(request.validate().is_err());

        let request = ChangePasswordRequest {
            current_password: "old-password".to_string(),
            new_password: "long-enough-password".to_string(),
        };
        assert!(request.validate().is_ok());
    }
}
