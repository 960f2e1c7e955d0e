//! Token verification middleware for the Gatehouse API
//!
//! Provides JWKS key resolution, RS256 bearer-token validation, the
//! role-based authorization gate, and axum extractors that work with
//! any state implementing `FromRef<S>` for `TokenVerifier`.

mod claims;
mod error;
mod extractors;
mod gate;
mod keys;
mod verifier;

pub use claims::Claims;
pub use error::AuthError;
pub use extractors::{AdminUser, AuthUser};
pub use gate::{authorize, is_admin, is_owner_or_admin, Role};
pub use keys::{HttpKeySource, KeyError, KeyResolver, KeySource};
pub use verifier::{extract_bearer_token, TokenVerifier, TOKEN_SCHEME};
