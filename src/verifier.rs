use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::decode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::Validation;
use serde_json::Map;
use serde_json::Value;

use crate::claims::AppCheckClaims;
use crate::config::AppCheckConfig;
use crate::config::APP_CHECK_ISSUER;
use crate::error::decode_error;
use crate::error::Error;
use crate::error::KeyFetchError;
use crate::error::Result;
use crate::error::VerificationFailure;
use crate::header::UnverifiedHeader;
use crate::jwks_cache::JwksKeySource;
use crate::key_source::KeySource;

/// Trait for App Check token verification
#[async_trait]
pub trait VerifyToken {
    /// Verify a token and return its claims
    ///
    /// Every rejection is reported as [`Error::TokenVerification`].
    async fn verify(&self, token: &str) -> Result<AppCheckClaims>;
}

/// Verifier for Firebase App Check tokens
///
/// Holds only immutable configuration and a shared key source, so one instance
/// can serve concurrent requests.
pub struct AppCheckVerifier<K: KeySource = JwksKeySource> {
    key_source: Arc<K>,
    expected_audience: String,
    validation: Validation,
}

impl AppCheckVerifier<JwksKeySource> {
    /// Create a verifier that fetches signing keys from the configured JWKS URL
    pub fn new(config: AppCheckConfig) -> Self {
        let key_source = JwksKeySource::from_config(&config);
        Self::with_key_source(config, key_source)
    }

    /// Create a verifier for the given project with default key fetching
    ///
    /// # Errors
    /// Returns `Error::ProjectIdMissing` if the project id is empty
    pub fn for_project(project_id: impl Into<String>) -> Result<Self> {
        Ok(Self::new(AppCheckConfig::new(project_id)?))
    }
}

impl<K: KeySource> AppCheckVerifier<K> {
    /// Create a verifier that resolves signing keys through `key_source`
    pub fn with_key_source(config: AppCheckConfig, key_source: K) -> Self {
        Self::with_shared_key_source(config, Arc::new(key_source))
    }

    /// Like [`with_key_source`](Self::with_key_source), sharing one key source across verifiers
    pub fn with_shared_key_source(config: AppCheckConfig, key_source: Arc<K>) -> Self {
        let expected_audience = config.expected_audience();

        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = 0;
        validation.set_audience(&[&expected_audience]);
        validation.set_required_spec_claims(&["exp", "aud"]);

        Self {
            key_source,
            expected_audience,
            validation,
        }
    }

    pub fn expected_audience(&self) -> &str {
        &self.expected_audience
    }

    async fn verify_token(
        &self,
        token: &str,
    ) -> std::result::Result<AppCheckClaims, VerificationFailure> {
        if token.trim().is_empty() {
            return Err(VerificationFailure::EmptyToken);
        }

        let header = UnverifiedHeader::parse(token)?;

        let kid = header.kid.as_deref().ok_or(KeyFetchError::KeyIdMissing)?;
        let key = self.key_source.fetch_key(kid).await?;

        header.check_shape()?;

        let claims = self.decode_and_verify(token, &key)?;
        check_issuer(&claims)?;
        self.check_audience(&claims)?;
        let subject = check_subject(&claims)?;

        Ok(AppCheckClaims::from_verified(claims, subject))
    }

    /// Verify the signature together with audience and expiry
    fn decode_and_verify(
        &self,
        token: &str,
        key: &DecodingKey,
    ) -> std::result::Result<Map<String, Value>, VerificationFailure> {
        let token_data = decode::<Map<String, Value>>(token, key, &self.validation)
            .map_err(|e| decode_error(e, &self.expected_audience, APP_CHECK_ISSUER))?;

        Ok(token_data.claims)
    }

    /// `aud` must be a list containing the project; a bare string is rejected
    /// even when it matches.
    fn check_audience(
        &self,
        claims: &Map<String, Value>,
    ) -> std::result::Result<(), VerificationFailure> {
        let contains_project = match claims.get("aud") {
            Some(Value::Array(audiences)) => audiences
                .iter()
                .any(|aud| aud.as_str() == Some(self.expected_audience.as_str())),
            _ => false,
        };

        if !contains_project {
            return Err(VerificationFailure::IncorrectAudience(self.expected_audience.clone()));
        }

        Ok(())
    }
}

#[async_trait]
impl<K: KeySource> VerifyToken for AppCheckVerifier<K> {
    async fn verify(&self, token: &str) -> Result<AppCheckClaims> {
        match self.verify_token(token).await {
            Ok(claims) => {
                tracing::debug!(app_id = claims.app_id(), "verified App Check token");
                Ok(claims)
            }
            Err(failure) => {
                tracing::warn!(reason = %failure, "rejected App Check token");
                Err(Error::TokenVerification(failure))
            }
        }
    }
}

fn check_issuer(claims: &Map<String, Value>) -> std::result::Result<(), VerificationFailure> {
    match claims.get("iss").and_then(Value::as_str) {
        Some(iss) if iss.starts_with(APP_CHECK_ISSUER) => Ok(()),
        _ => Err(VerificationFailure::IncorrectIssuer(APP_CHECK_ISSUER.to_string())),
    }
}

fn check_subject(claims: &Map<String, Value>) -> std::result::Result<String, VerificationFailure> {
    match claims.get("sub").and_then(Value::as_str) {
        Some(sub) if !sub.is_empty() => Ok(sub.to_string()),
        _ => Err(VerificationFailure::InvalidSubject),
    }
}
