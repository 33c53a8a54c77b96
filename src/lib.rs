//! # Firecheck
//!
//! A Rust library for verifying Firebase App Check tokens on the server.
//!
//! App Check tokens are RS256-signed JWTs issued by
//! `https://firebaseappcheck.googleapis.com/`. Verification fetches the public
//! signing keys from the App Check JWKS endpoint and enforces the claims App
//! Check guarantees.
//!
//! ## Features
//!
//! - Signature verification against the published App Check JWKS
//! - JWKS caching with a 6 hour TTL and refresh when an unknown key id shows up
//! - Header checks (`typ: JWT`, `alg: RS256`) plus issuer, audience, subject and
//!   expiration validation
//! - One error kind for every rejection, with a message naming the failed check
//! - Pluggable [`KeySource`] for tests or pre-provisioned keys
//!
//! ## Example
//!
//! ```rust,no_run
//! use firecheck::{AppCheckConfig, AppCheckVerifier, VerifyToken};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppCheckConfig::new("my-project")?
//!         .with_cache_ttl(Duration::from_secs(3600));
//!
//!     let verifier = AppCheckVerifier::new(config);
//!
//!     let token = "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9...";
//!     let claims = verifier.verify(token).await?;
//!
//!     println!("App ID: {}", claims.app_id());
//!
//!     Ok(())
//! }
//! ```

mod claims;
mod config;
mod error;
mod header;
mod jwks_cache;
mod key_source;
mod verifier;

// Re-exports for public API
pub use claims::AppCheckClaims;
pub use claims::APP_ID_CLAIM;
pub use config::AppCheckConfig;
pub use config::APP_CHECK_ISSUER;
pub use config::APP_CHECK_JWKS_URL;
pub use error::Error;
pub use error::KeyFetchError;
pub use error::Result;
pub use error::VerificationFailure;
pub use header::EXPECTED_ALGORITHM;
pub use header::EXPECTED_TYPE;
pub use jwks_cache::JwksKeySource;
pub use key_source::KeySource;
pub use key_source::StaticKeySource;
pub use verifier::AppCheckVerifier;
pub use verifier::VerifyToken;
