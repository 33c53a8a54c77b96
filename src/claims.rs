use std::ops::Deref;

use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

/// Claim name holding the convenience copy of `sub`
pub const APP_ID_CLAIM: &str = "app_id";

/// Verified claims of an App Check token
///
/// Only produced once every check has passed. Besides the signed payload it
/// carries an `app_id` entry copied from `sub`, the Firebase app identifier
/// (e.g. `1:1234:android:abcd`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AppCheckClaims(Map<String, Value>);

impl AppCheckClaims {
    /// Wrap a verified payload and add the `app_id` alias
    pub(crate) fn from_verified(mut claims: Map<String, Value>, subject: String) -> Self {
        claims.insert(APP_ID_CLAIM.to_string(), Value::String(subject));
        Self(claims)
    }

    /// The Firebase app id the token was issued to
    pub fn app_id(&self) -> &str {
        self.str_claim(APP_ID_CLAIM).unwrap_or_default()
    }

    pub fn subject(&self) -> &str {
        self.str_claim("sub").unwrap_or_default()
    }

    pub fn issuer(&self) -> &str {
        self.str_claim("iss").unwrap_or_default()
    }

    /// Audiences listed in the token, i.e. the project resource names
    pub fn audience(&self) -> Vec<&str> {
        match self.0.get("aud") {
            Some(Value::Array(values)) => values.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp_claim("exp")
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp_claim("iat")
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    fn str_claim(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// Read a NumericDate claim (seconds since the Unix epoch)
    fn timestamp_claim(&self, name: &str) -> Option<DateTime<Utc>> {
        let secs = self.0.get(name).and_then(Value::as_i64)?;
        DateTime::from_timestamp(secs, 0)
    }
}

impl Deref for AppCheckClaims {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<AppCheckClaims> for Map<String, Value> {
    fn from(claims: AppCheckClaims) -> Self {
        claims.0
    }
}
