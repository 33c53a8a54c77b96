use std::collections::HashMap;

use async_trait::async_trait;
use jsonwebtoken::DecodingKey;

use crate::error::KeyFetchError;

/// Resolves key ids to public signing keys
///
/// Implementations own whatever caching and refresh policy they need; the
/// verifier only asks for one key per call and never retries.
#[async_trait]
pub trait KeySource: Send + Sync {
    /// Return the public key registered under `key_id`
    async fn fetch_key(&self, key_id: &str) -> Result<DecodingKey, KeyFetchError>;
}

/// Fixed in-memory key set, useful for tests and air-gapped deployments
#[derive(Clone, Default)]
pub struct StaticKeySource {
    keys: HashMap<String, DecodingKey>,
}

impl StaticKeySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a key under the given id
    pub fn with_key(mut self, key_id: impl Into<String>, key: DecodingKey) -> Self {
        self.keys.insert(key_id.into(), key);
        self
    }

    /// Register an RSA public key given as base64url modulus and exponent
    pub fn with_rsa_components(
        self,
        key_id: impl Into<String>,
        n: &str,
        e: &str,
    ) -> Result<Self, KeyFetchError> {
        let key = DecodingKey::from_rsa_components(n, e).map_err(KeyFetchError::InvalidKey)?;
        Ok(self.with_key(key_id, key))
    }
}

#[async_trait]
impl KeySource for StaticKeySource {
    async fn fetch_key(&self, key_id: &str) -> Result<DecodingKey, KeyFetchError> {
        self.keys
            .get(key_id)
            .cloned()
            .ok_or_else(|| KeyFetchError::KeyNotFound(key_id.to_string()))
    }
}
