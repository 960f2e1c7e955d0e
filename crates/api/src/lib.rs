//! Gatehouse API composition root
//!
//! Wires the token verifier, identity provider, and profile store into
//! a single router with uniform response envelope and CORS policy.

use std::sync::Arc;

use axum::Router;
use gatehouse_auth::{KeyResolver, TokenVerifier};
use gatehouse_common::Config;
use gatehouse_identity::cognito::CognitoIdentityProvider;
use gatehouse_profile::dynamo::DynamoProfileStore;

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

/// Create the application router for the given state
pub fn create_app(state: AppState) -> Router {
    routes::routes().with_state(state)
}

/// Build production state: Cognito + DynamoDB + JWKS-backed verifier
pub async fn build_state(config: &Config) -> AppState {
    let resolver = Arc::new(KeyResolver::from_jwks_url(config.jwks_url()));
    let verifier = TokenVerifier::new(resolver, config.issuer());

    let identity = CognitoIdentityProvider::new(
        config.region.clone(),
        config.user_pool_id.clone(),
        config.user_pool_client_id.clone(),
    )
    .await;

    let profiles =
        DynamoProfileStore::new(config.region.clone(), config.profiles_table.clone()).await;

    AppState {
        verifier,
        identity: Arc::new(identity),
        profiles: Arc::new(profiles),
    }
}
