//! Signing-key resolution against a remote JSON Web Key Set
//!
//! The resolver owns a process-lifetime cache keyed by `kid`, populated
//! lazily from an injectable [`KeySource`]. A `kid` missing from the
//! cache triggers exactly one re-fetch (covers key rotation); a `kid`
//! the provider still does not publish is a hard failure, so a
//! rotation misconfiguration fails loudly instead of being retried
//! into invisibility.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::DecodingKey;
use tokio::sync::RwLock;

/// Key resolution failure
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("failed to fetch key set: {0}")]
    Fetch(String),
    #[error("unknown signing key id: {0}")]
    UnknownKeyId(String),
}

/// Source of the provider's published key set.
///
/// Production uses [`HttpKeySource`]; tests inject a fake to make key
/// resolution deterministic.
#[async_trait]
pub trait KeySource: Send + Sync {
    async fn fetch_keys(&self) -> Result<JwkSet, KeyError>;
}

/// Fetches the key set from the issuer's `.well-known/jwks.json` endpoint
pub struct HttpKeySource {
    jwks_url: String,
    client: reqwest::Client,
}

impl HttpKeySource {
    pub fn new(jwks_url: String) -> Self {
        Self {
            jwks_url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl KeySource for HttpKeySource {
    async fn fetch_keys(&self) -> Result<JwkSet, KeyError> {
        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| KeyError::Fetch(format!("request to {} failed: {}", self.jwks_url, e)))?;

        if !response.status().is_success() {
            return Err(KeyError::Fetch(format!(
                "key-set endpoint returned HTTP {}",
                response.status()
            )));
        }

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| KeyError::Fetch(format!("invalid key set: {}", e)))
    }
}

/// Resolves a key id to the public key needed to verify a signature.
///
/// Constructed once at process start and shared by reference; the cache
/// is read-mostly and a race to populate the same `kid` is benign since
/// redundant fetches converge to the same value. No lock is held across
/// the network fetch.
pub struct KeyResolver {
    source: Arc<dyn KeySource>,
    cache: RwLock<HashMap<String, DecodingKey>>,
}

impl KeyResolver {
    pub fn new(source: Arc<dyn KeySource>) -> Self {
        Self {
            source,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Resolver backed by an HTTP fetch of the given JWKS endpoint
    pub fn from_jwks_url(jwks_url: String) -> Self {
        Self::new(Arc::new(HttpKeySource::new(jwks_url)))
    }

    /// Look up the public key for `kid`.
    ///
    /// Cache hit returns immediately. On a miss the key set is fetched
    /// once and the cache replaced with the provider's current keys; a
    /// `kid` still absent after that fetch fails with
    /// [`KeyError::UnknownKeyId`].
    pub async fn signing_key(&self, kid: &str) -> Result<DecodingKey, KeyError> {
        if let Some(key) = self.cache.read().await.get(kid) {
            return Ok(key.clone());
        }

        let jwks = self.source.fetch_keys().await?;

        let mut fresh = HashMap::new();
        for jwk in &jwks.keys {
            let Some(id) = jwk.common.key_id.clone() else {
                continue;
            };
            match DecodingKey::from_jwk(jwk) {
                Ok(key) => {
                    fresh.insert(id, key);
                }
                Err(e) => {
                    tracing::warn!(kid = %id, error = %e, "Skipping unusable key in key set");
                }
            }
        }

        let mut cache = self.cache.write().await;
        *cache = fresh;
        cache
            .get(kid)
            .cloned()
            .ok_or_else(|| KeyError::UnknownKeyId(kid.to_string()))
    }
}
