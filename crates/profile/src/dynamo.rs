//! DynamoDB profile store implementation

use std::collections::HashMap;

use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{ProfileError, ProfileRecord, ProfileStore};

const KEY_ATTRIBUTE: &str = "userId";
const UPDATED_AT_ATTRIBUTE: &str = "updatedAt";

/// Profile store backed by a DynamoDB table keyed on `userId`
pub struct DynamoProfileStore {
    client: Client,
    table: String,
}

impl DynamoProfileStore {
    /// Create a store with default AWS configuration for the region
    pub async fn new(region: String, table: String) -> Self {
        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region))
            .load()
            .await;

        Self {
            client: Client::new(&aws_config),
            table,
        }
    }

    /// Create a store from an already-built client (tests, LocalStack)
    pub fn from_client(client: Client, table: String) -> Self {
        Self { client, table }
    }
}

/// JSON value to DynamoDB attribute, recursively
fn to_attribute_value(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(items) => AttributeValue::L(items.iter().map(to_attribute_value).collect()),
        Value::Object(map) => AttributeValue::M(
            map.iter()
                .map(|(k, v)| (k.clone(), to_attribute_value(v)))
                .collect(),
        ),
    }
}

/// DynamoDB attribute back to JSON; set types never occur in records
/// we write, so they collapse to null with a warning
fn from_attribute_value(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => n
            .parse::<serde_json::Number>()
            .map(Value::Number)
            .unwrap_or_else(|_| Value::String(n.clone())),
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::L(items) => Value::Array(items.iter().map(from_attribute_value).collect()),
        AttributeValue::M(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), from_attribute_value(v)))
                .collect(),
        ),
        other => {
            tracing::warn!(attribute = ?other, "Unsupported attribute type in profile record");
            Value::Null
        }
    }
}

fn record_from_item(
    user_id: &str,
    item: &HashMap<String, AttributeValue>,
) -> Result<ProfileRecord, ProfileError> {
    let updated_at = match item.get(UPDATED_AT_ATTRIBUTE) {
        Some(AttributeValue::S(stamp)) => DateTime::parse_from_rfc3339(stamp)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| ProfileError::Corrupt(format!("bad {UPDATED_AT_ATTRIBUTE}: {e}")))?,
        // Records written before the timestamp existed
        None => DateTime::<Utc>::UNIX_EPOCH,
        Some(other) => {
            return Err(ProfileError::Corrupt(format!(
                "unexpected {UPDATED_AT_ATTRIBUTE} type: {other:?}"
            )))
        }
    };

    let attributes = item
        .iter()
        .filter(|(name, _)| name.as_str() != KEY_ATTRIBUTE && name.as_str() != UPDATED_AT_ATTRIBUTE)
        .map(|(name, value)| (name.clone(), from_attribute_value(value)))
        .collect();

    Ok(ProfileRecord {
        user_id: user_id.to_string(),
        attributes,
        updated_at,
    })
}

#[async_trait::async_trait]
impl ProfileStore for DynamoProfileStore {
    async fn get_profile(&self, user_id: &str) -> Result<Option<ProfileRecord>, ProfileError> {
        let out = self
            .client
            .get_item()
            .table_name(&self.table)
            .key(KEY_ATTRIBUTE, AttributeValue::S(user_id.to_string()))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, user_id, "Profile get_item failed");
                ProfileError::Store(e.to_string())
            })?;

        match out.item() {
            Some(item) => Ok(Some(record_from_item(user_id, item)?)),
            None => Ok(None),
        }
    }

    async fn put_profile(
        &self,
        user_id: &str,
        attributes: serde_json::Map<String, Value>,
    ) -> Result<ProfileRecord, ProfileError> {
        let updated_at = Utc::now();

        let mut request = self
            .client
            .put_item()
            .table_name(&self.table)
            .item(KEY_ATTRIBUTE, AttributeValue::S(user_id.to_string()))
            .item(
                UPDATED_AT_ATTRIBUTE,
                AttributeValue::S(updated_at.to_rfc3339()),
            );

        for (name, value) in &attributes {
            request = request.item(name, to_attribute_value(value));
        }

        request.send().await.map_err(|e| {
            tracing::error!(error = ?e, user_id, "Profile put_item failed");
            ProfileError::Store(e.to_string())
        })?;

        Ok(ProfileRecord {
            user_id: user_id.to_string(),
            attributes,
            updated_at,
        })
    }
}
