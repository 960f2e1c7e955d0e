//! Shared infrastructure for Gatehouse
//!
//! Response envelope, permissive CORS layer, and process configuration.

pub mod config;
pub mod response;

pub use config::Config;
pub use response::{cors_layer, error_body, ErrorBody};

/// Custom attribute carrying a user's role at the identity provider
pub const ROLE_ATTRIBUTE: &str = "custom:role";

/// Role assumed when the role attribute is absent.
///
/// Every default-role decision in the system goes through this constant;
/// do not re-default at call sites.
pub const DEFAULT_ROLE: &str = "user";
