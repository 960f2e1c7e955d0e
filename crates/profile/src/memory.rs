//! In-memory profile store for tests and local development

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::Utc;
use serde_json::Value;

use crate::{ProfileError, ProfileRecord, ProfileStore};

/// Profile store held in a process-local map
#[derive(Clone, Default)]
pub struct MemoryProfileStore {
    records: Arc<RwLock<HashMap<String, ProfileRecord>>>,
    /// When set, every operation fails as if the store were down
    unreachable: Arc<RwLock<bool>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent operations fail with a store error
    pub fn set_unreachable(&self, unreachable: bool) {
        *self.unreachable.write().unwrap() = unreachable;
    }

    fn check_reachable(&self) -> Result<(), ProfileError> {
        if *self.unreachable.read().unwrap() {
            return Err(ProfileError::Store("simulated outage".to_string()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get_profile(&self, user_id: &str) -> Result<Option<ProfileRecord>, ProfileError> {
        self.check_reachable()?;
        Ok(self.records.read().unwrap().get(user_id).cloned())
    }

    async fn put_profile(
        &self,
        user_id: &str,
        attributes: serde_json::Map<String, Value>,
    ) -> Result<ProfileRecord, ProfileError> {
        self.check_reachable()?;

        let record = ProfileRecord {
            user_id: user_id.to_string(),
            attributes,
            updated_at: Utc::now(),
        };

        self.records
            .write()
            .unwrap()
            .insert(user_id.to_string(), record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_get_round_trip() {
        let store = MemoryProfileStore::new();

        let mut attributes = serde_json::Map::new();
        attributes.insert("phone".to_string(), serde_json::json!("123"));

        let written = store.put_profile("user-1", attributes).await.unwrap();
        let read = store.get_profile("user-1").await.unwrap().unwrap();

        assert_eq!(read.attributes["phone"], "123");
        assert_eq!(read.updated_at, written.updated_at);
    }

    #[tokio::test]
    async fn test_last_write_wins_and_timestamp_advances() {
        let store = MemoryProfileStore::new();

        let mut first = serde_json::Map::new();
        first.insert("phone".to_string(), serde_json::json!("123"));
        let before = store.put_profile("user-1", first).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let mut second = serde_json::Map::new();
        second.insert("phone".to_string(), serde_json::json!("456"));
        store.put_profile("user-1", second).await.unwrap();

        let read = store.get_profile("user-1").await.unwrap().unwrap();
        assert_eq!(read.attributes["phone"], "456");
        assert!(read.updated_at > before.updated_at);
    }

    #[tokio::test]
    async fn test_missing_profile_is_none() {
        let store = MemoryProfileStore::new();
        assert!(store.get_profile("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_simulated_outage() {
        let store = MemoryProfileStore::new();
        store.set_unreachable(true);

        let result = store.get_profile("user-1").await;
        assert!(matches!(result, Err(ProfileError::Store(_))));
    }
}
