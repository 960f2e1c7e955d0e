//! Gatehouse profile store
//!
//! Key-value records holding the free-form extended profile for a
//! user, keyed by the user's subject identifier. Last write wins; no
//! versioning or conflict detection. Supports:
//! - DynamoDB for production
//! - In-memory store for testing and development

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod dynamo;
pub mod memory;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("profile store unreachable: {0}")]
    Store(String),
    #[error("corrupt profile record: {0}")]
    Corrupt(String),
}

/// Extended profile record.
///
/// `user_id` is a foreign key to the identity provider's user record,
/// not enforced here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub user_id: String,
    /// Free-form attributes (phone, address, preferences, ...)
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
    pub updated_at: DateTime<Utc>,
}

/// Boundary to the profile key-value store
#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch a user's profile record, if one exists
    async fn get_profile(&self, user_id: &str) -> Result<Option<ProfileRecord>, ProfileError>;

    /// Write a user's profile record, stamping `updated_at`.
    ///
    /// Replaces the whole record; last write wins.
    async fn put_profile(
        &self,
        user_id: &str,
        attributes: serde_json::Map<String, serde_json::Value>,
    ) -> Result<ProfileRecord, ProfileError>;
}
