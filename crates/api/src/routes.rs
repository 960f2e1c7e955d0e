use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers::{admin, auth, health, profile};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        // Public authentication flows
        .route("/auth/signup", post(auth::signup))
        .route("/auth/confirm", post(auth::confirm_signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh_token))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/confirm-password", post(auth::confirm_password))
        // Authenticated profile
        .route("/profile", get(profile::get_profile).put(profile::update_profile))
        .route("/profile/change-password", post(profile::change_password))
        // Admin user management
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/{user_id}", get(admin::get_user))
        .route("/admin/users/{user_id}/role", put(admin::update_user_role))
}
