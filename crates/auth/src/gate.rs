//! Role-based authorization gate
//!
//! Every role decision in the API goes through `authorize` or the
//! predicates here, so call sites cannot drift apart.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::claims::Claims;
use crate::error::AuthError;

/// Coarse-grained authorization role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
    Moderator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
            Role::Moderator => "moderator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            "moderator" => Ok(Role::Moderator),
            _ => Err(()),
        }
    }
}

/// Approve or deny a request for the given required role set.
///
/// Absent claims deny with `Unauthenticated`. An empty required set
/// allows: authentication alone suffices. Otherwise the effective role
/// (defaulted by [`Claims::role`]) must be a member of the set.
pub fn authorize(claims: Option<&Claims>, required_roles: &[Role]) -> Result<(), AuthError> {
    let claims = claims.ok_or(AuthError::Unauthenticated)?;

    if required_roles.is_empty() {
        return Ok(());
    }

    let role = claims.role();
    if required_roles.iter().any(|r| r.as_str() == role) {
        Ok(())
    } else {
        tracing::debug!(sub = %claims.sub, role = %role, "Role not in required set");
        Err(AuthError::Forbidden)
    }
}

/// Whether the claims carry the admin role
pub fn is_admin(claims: &Claims) -> bool {
    claims.role() == Role::Admin.as_str()
}

/// Whether the subject is `target_id` itself, or any admin
pub fn is_owner_or_admin(claims: &Claims, target_id: &str) -> bool {
    claims.sub == target_id || is_admin(claims)
}
