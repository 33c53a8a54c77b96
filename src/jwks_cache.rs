use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use async_trait::async_trait;
use jsonwebtoken::jwk::AlgorithmParameters;
use jsonwebtoken::jwk::Jwk;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::jwk::PublicKeyUse;
use jsonwebtoken::jwk::RSAKeyParameters;
use jsonwebtoken::DecodingKey;
use reqwest::Client;
use tokio::sync::RwLock;

use crate::config::AppCheckConfig;
use crate::error::fetch_jwks_error;
use crate::error::KeyFetchError;
use crate::key_source::KeySource;

const API_CLIENT_HEADER: &str = "x-goog-api-client";

fn api_client_header_value() -> String {
    format!("fire-admin-rust/{}", env!("CARGO_PKG_VERSION"))
}

struct CachedJwks {
    jwks: JwkSet,
    fetched_at: Instant,
}

impl CachedJwks {
    fn new(jwks: JwkSet) -> Self {
        Self {
            jwks,
            fetched_at: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() >= ttl
    }
}

/// Key source backed by a remote JSON Web Key Set
///
/// The whole key set is cached for the configured TTL. A key id missing from a
/// still-fresh cache triggers one refresh before the lookup fails, so rotated
/// keys are picked up without waiting for expiry.
pub struct JwksKeySource {
    cache: Arc<RwLock<Option<CachedJwks>>>,
    url: String,
    ttl: Duration,
    client: Client,
}

impl JwksKeySource {
    /// Create a new key source for the given URL, TTL and HTTP client
    pub fn new(url: impl Into<String>, ttl: Duration, client: Client) -> Self {
        Self {
            cache: Arc::new(RwLock::new(None)),
            url: url.into(),
            ttl,
            client,
        }
    }

    /// Create a key source from the JWKS settings of a verifier configuration
    pub fn from_config(config: &AppCheckConfig) -> Self {
        let client = config.http_client.clone().unwrap_or_default();
        Self::new(config.jwks_url.clone(), config.jwks_cache_ttl, client)
    }

    /// Get the key set, fetching from the network if not cached or expired
    ///
    /// The flag reports whether the returned set was fetched by this call.
    async fn get_jwks(&self) -> Result<(JwkSet, bool), KeyFetchError> {
        if let Some(jwks) = self.try_get_cached().await {
            return Ok((jwks, false));
        }

        Ok((self.refresh().await?, true))
    }

    /// Try to get the key set from cache if present and not expired
    async fn try_get_cached(&self) -> Option<JwkSet> {
        let cache = self.cache.read().await;
        let cached = cache.as_ref()?;

        if cached.is_expired(self.ttl) {
            return None;
        }

        tracing::debug!(url = %self.url, "using cached App Check JWKS");
        Some(cached.jwks.clone())
    }

    /// Force refresh the key set
    async fn refresh(&self) -> Result<JwkSet, KeyFetchError> {
        let jwks = self.fetch_jwks().await?;

        let mut cache = self.cache.write().await;
        *cache = Some(CachedJwks::new(jwks.clone()));

        Ok(jwks)
    }

    async fn fetch_jwks(&self) -> Result<JwkSet, KeyFetchError> {
        tracing::debug!(url = %self.url, "fetching App Check JWKS");

        let jwks: JwkSet = self
            .client
            .get(&self.url)
            .header(API_CLIENT_HEADER, api_client_header_value())
            .send()
            .await
            .map_err(fetch_jwks_error)?
            .error_for_status()
            .map_err(fetch_jwks_error)?
            .json()
            .await
            .map_err(fetch_jwks_error)?;

        if !jwks.keys.iter().any(is_signing_key) {
            return Err(KeyFetchError::EmptyKeySet);
        }

        Ok(jwks)
    }
}

#[async_trait]
impl KeySource for JwksKeySource {
    async fn fetch_key(&self, key_id: &str) -> Result<DecodingKey, KeyFetchError> {
        let (jwks, fetched) = self.get_jwks().await?;
        if let Some(jwk) = find_signing_key(&jwks, key_id) {
            return decoding_key(jwk);
        }

        if fetched {
            return Err(KeyFetchError::KeyNotFound(key_id.to_string()));
        }

        tracing::debug!(kid = key_id, "key id not in cached JWKS, refreshing");
        let jwks = self.refresh().await?;
        let jwk = find_signing_key(&jwks, key_id)
            .ok_or_else(|| KeyFetchError::KeyNotFound(key_id.to_string()))?;

        decoding_key(jwk)
    }
}

/// Only RSA keys not marked for encryption can check App Check signatures
fn is_signing_key(jwk: &Jwk) -> bool {
    matches!(jwk.algorithm, AlgorithmParameters::RSA(_))
        && !matches!(jwk.common.public_key_use, Some(PublicKeyUse::Encryption))
}

fn find_signing_key<'a>(jwks: &'a JwkSet, kid: &str) -> Option<&'a Jwk> {
    jwks.find(kid).filter(|jwk| is_signing_key(jwk))
}

fn decoding_key(jwk: &Jwk) -> Result<DecodingKey, KeyFetchError> {
    match &jwk.algorithm {
        AlgorithmParameters::RSA(RSAKeyParameters { n, e, .. }) => {
            DecodingKey::from_rsa_components(n, e).map_err(KeyFetchError::InvalidKey)
        }
        other_algo => Err(KeyFetchError::UnsupportedKey(format!("{other_algo:?}"))),
    }
}
