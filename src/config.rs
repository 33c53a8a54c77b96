use std::env;
use std::time::Duration;

use reqwest::Client;

use crate::error::Error;
use crate::error::Result;

/// Issuer prefix every App Check token's `iss` claim must start with
pub const APP_CHECK_ISSUER: &str = "https://firebaseappcheck.googleapis.com/";

/// Public endpoint serving the App Check signing keys
pub const APP_CHECK_JWKS_URL: &str = "https://firebaseappcheck.googleapis.com/v1/jwks";

/// Keys rotate slowly, so they are kept for 6 hours rather than the usual 5 minutes
const DEFAULT_JWKS_CACHE_TTL_SECS: u64 = 21600;

const PROJECT_ENV_VARS: [&str; 2] = ["GOOGLE_CLOUD_PROJECT", "GCLOUD_PROJECT"];

/// Configuration for the App Check verifier
#[derive(Debug, Clone)]
pub struct AppCheckConfig {
    /// Firebase project the tokens must be scoped to
    pub(crate) project_id: String,
    /// URL of the JSON Web Key Set holding the signing keys
    pub(crate) jwks_url: String,
    /// Time-to-live for the cached key set (default: 6 hours)
    pub(crate) jwks_cache_ttl: Duration,
    /// Optional custom HTTP client for fetching the key set
    /// If not provided, a default client will be created
    pub(crate) http_client: Option<Client>,
    /// Audience override; defaults to `projects/<project_id>`
    pub(crate) expected_audience: Option<String>,
}

impl AppCheckConfig {
    /// Create a new configuration for the given project
    ///
    /// # Errors
    /// Returns `Error::ProjectIdMissing` if the project id is empty
    pub fn new(project_id: impl Into<String>) -> Result<Self> {
        let project_id = project_id.into();
        if project_id.trim().is_empty() {
            return Err(Error::ProjectIdMissing);
        }

        Ok(Self {
            project_id,
            jwks_url: APP_CHECK_JWKS_URL.to_string(),
            jwks_cache_ttl: Duration::from_secs(DEFAULT_JWKS_CACHE_TTL_SECS),
            http_client: None,
            expected_audience: None,
        })
    }

    /// Create a configuration with the project id taken from `GOOGLE_CLOUD_PROJECT`,
    /// falling back to `GCLOUD_PROJECT`
    ///
    /// # Errors
    /// Returns `Error::ProjectIdMissing` if neither variable holds a value
    pub fn from_env() -> Result<Self> {
        let project_id = PROJECT_ENV_VARS
            .iter()
            .find_map(|name| env::var(name).ok().filter(|value| !value.trim().is_empty()))
            .ok_or(Error::ProjectIdMissing)?;

        Self::new(project_id)
    }

    /// Set the URL the signing keys are fetched from
    ///
    /// # Errors
    /// Returns `Error::InvalidConfig` if the URL is empty
    pub fn with_jwks_url(mut self, url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(Error::InvalidConfig("JWKS URL must not be empty".to_string()));
        }
        self.jwks_url = url;
        Ok(self)
    }

    /// Set the key set cache TTL
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.jwks_cache_ttl = ttl;
        self
    }

    /// Expect a different audience than the default `projects/<project_id>`
    ///
    /// # Errors
    /// Returns `Error::InvalidConfig` if the audience is empty
    pub fn with_expected_audience(mut self, audience: impl Into<String>) -> Result<Self> {
        let audience = audience.into();
        if audience.trim().is_empty() {
            return Err(Error::InvalidConfig("expected audience must not be empty".to_string()));
        }
        self.expected_audience = Some(audience);
        Ok(self)
    }

    /// Set a custom HTTP client
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// The audience tokens must list, `projects/<project_id>` unless overridden
    pub fn expected_audience(&self) -> String {
        match &self.expected_audience {
            Some(audience) => audience.clone(),
            None => format!("projects/{}", self.project_id),
        }
    }

    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    pub fn cache_ttl(&self) -> Duration {
        self.jwks_cache_ttl
    }
}
