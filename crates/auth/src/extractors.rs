//! Axum extractors for authentication
//!
//! Generic over any state `S` where `TokenVerifier: FromRef<S>`.
//! This is axum's idiomatic nested-state pattern.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::claims::Claims;
use crate::error::AuthError;
use crate::gate::{authorize, Role};
use crate::verifier::{extract_bearer_token, TokenVerifier};

/// Authenticated request extractor.
///
/// Verifies the bearer token and attaches the claim set; any role is
/// accepted.
#[derive(Debug)]
pub struct AuthUser(pub Claims);

impl<S> FromRequestParts<S> for AuthUser
where
    TokenVerifier: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let verifier = TokenVerifier::from_ref(state);

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingToken)?;

        let token = extract_bearer_token(auth_header)?;
        let claims = verifier.verify(&token).await?;

        Ok(AuthUser(claims))
    }
}

/// Admin-only extractor.
///
/// Like `AuthUser` but additionally requires the `admin` role,
/// rejecting with 403 otherwise.
#[derive(Debug)]
pub struct AdminUser(pub Claims);

impl<S> FromRequestParts<S> for AdminUser
where
    TokenVerifier: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;

        authorize(Some(&claims), &[Role::Admin])?;

        Ok(AdminUser(claims))
    }
}
