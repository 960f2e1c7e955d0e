//! Application state shared across handlers

use std::sync::Arc;

use axum::extract::FromRef;
use gatehouse_auth::TokenVerifier;
use gatehouse_identity::IdentityProvider;
use gatehouse_profile::ProfileStore;

/// Application state for the Gatehouse API
#[derive(Clone)]
pub struct AppState {
    pub verifier: TokenVerifier,
    pub identity: Arc<dyn IdentityProvider>,
    pub profiles: Arc<dyn ProfileStore>,
}

impl FromRef<AppState> for TokenVerifier {
    fn from_ref(state: &AppState) -> Self {
        state.verifier.clone()
    }
}
