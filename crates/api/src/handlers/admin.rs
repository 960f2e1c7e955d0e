//! Admin-only user management handlers
//!
//! All routes here require the caller to hold the admin role; the
//! [`AdminUser`] extractor enforces that before the handler runs.

use std::collections::HashMap;
use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use gatehouse_auth::{AdminUser, Role};
use gatehouse_common::ROLE_ATTRIBUTE;
use gatehouse_identity::IdentityUser;

use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i32 = 10;
const MAX_PAGE_SIZE: i32 = 60;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    pub limit: Option<i32>,
    pub pagination_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

fn user_summary(user: &IdentityUser) -> Value {
    json!({
        "userId": user.sub(),
        "email": user.attribute("email"),
        "name": user.attribute("name"),
        "role": user.role(),
        "status": user.status,
        "enabled": user.enabled,
        "createdAt": user.created_at.map(|t| t.to_rfc3339()),
    })
}

/// GET /admin/users - Paginated user listing
pub async fn list_users(
    AdminUser(_claims): AdminUser,
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Value>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let page = state
        .identity
        .list_users(limit, query.pagination_token)
        .await?;

    let users: Vec<Value> = page.users.iter().map(user_summary).collect();

    Ok(Json(json!({
        "users": users,
        "paginationToken": page.pagination_token,
        "total": users.len(),
    })))
}

/// GET /admin/users/{user_id} - Single user detail
pub async fn get_user(
    AdminUser(_claims): AdminUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let user = state.identity.admin_get_user(&user_id).await?;

    let mut detail = user_summary(&user);
    if let Some(object) = detail.as_object_mut() {
        object.insert("emailVerified".to_string(), json!(user.email_verified()));
        object.insert(
            "updatedAt".to_string(),
            json!(user.updated_at.map(|t| t.to_rfc3339())),
        );
    }

    Ok(Json(json!({ "user": detail })))
}

/// PUT /admin/users/{user_id}/role - Assign a role to a user
pub async fn update_user_role(
    AdminUser(_claims): AdminUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<Json<Value>, ApiError> {
    let role = Role::from_str(&request.role)
        .map_err(|_| ApiError::BadRequest("Invalid role".to_string()))?;

    let mut attributes = HashMap::new();
    attributes.insert(ROLE_ATTRIBUTE.to_string(), role.as_str().to_string());

    state
        .identity
        .admin_update_attributes(&user_id, &attributes)
        .await?;

    Ok(Json(json!({
        "message": "User role updated",
        "userId": user_id,
        "role": role.as_str(),
    })))
}
