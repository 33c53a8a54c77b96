use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::Deserialize;

use crate::error::VerificationFailure;

/// The only signing algorithm App Check uses
pub const EXPECTED_ALGORITHM: &str = "RS256";

/// Header type tag App Check tokens carry
pub const EXPECTED_TYPE: &str = "JWT";

/// JOSE header read from a token before its signature has been checked
///
/// Fields are kept as raw strings so that values `jsonwebtoken` does not know
/// (e.g. `none`) are still reported accurately.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
pub(crate) struct UnverifiedHeader {
    pub alg: Option<String>,
    pub typ: Option<String>,
    pub kid: Option<String>,
}

impl UnverifiedHeader {
    /// Decode the first segment of a compact token without verifying anything
    pub(crate) fn parse(token: &str) -> Result<Self, VerificationFailure> {
        let mut segments = token.split('.');
        let (Some(header), Some(_payload), Some(_signature), None) =
            (segments.next(), segments.next(), segments.next(), segments.next())
        else {
            return Err(VerificationFailure::MalformedHeader(
                "expected three segments separated by '.'".to_string(),
            ));
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(header.trim_end_matches('='))
            .map_err(|e| VerificationFailure::MalformedHeader(format!("invalid base64url: {e}")))?;

        serde_json::from_slice(&bytes)
            .map_err(|e| VerificationFailure::MalformedHeader(format!("invalid JSON: {e}")))
    }

    /// Reject anything other than `typ: JWT` and `alg: RS256`
    pub(crate) fn check_shape(&self) -> Result<(), VerificationFailure> {
        if self.typ.as_deref() != Some(EXPECTED_TYPE) {
            return Err(VerificationFailure::IncorrectType(self.typ.clone()));
        }

        if self.alg.as_deref() != Some(EXPECTED_ALGORITHM) {
            return Err(VerificationFailure::IncorrectAlgorithm(self.alg.clone()));
        }

        Ok(())
    }
}
