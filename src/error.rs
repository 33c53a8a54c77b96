use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error(
        "A project ID must be specified to verify App Check tokens. Either pass it to \
         AppCheckConfig::new or set the GOOGLE_CLOUD_PROJECT environment variable."
    )]
    ProjectIdMissing,
    #[error("Invalid App Check configuration: {0}")]
    InvalidConfig(String),
    #[error("Verifying App Check token failed. Error: {0}")]
    TokenVerification(#[from] VerificationFailure),
}

impl Error {
    /// Returns the verification sub-reason, if this is a token verification error
    pub fn verification_failure(&self) -> Option<&VerificationFailure> {
        match self {
            Error::TokenVerification(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Reason a token was rejected
///
/// All reasons surface through the single [`Error::TokenVerification`] kind;
/// the variant only exists so that the message names the violated invariant.
#[derive(Error, Debug)]
pub enum VerificationFailure {
    #[error("App Check token must be a non-empty string")]
    EmptyToken,
    #[error("The provided App Check token has a malformed header: {0}")]
    MalformedHeader(String),
    #[error("{0}")]
    KeyFetch(#[from] KeyFetchError),
    #[error(
        "The provided App Check token has an incorrect type header. Expected JWT but got {0:?}"
    )]
    IncorrectType(Option<String>),
    #[error(
        "The provided App Check token has an incorrect alg header. Expected RS256 but got {0:?}"
    )]
    IncorrectAlgorithm(Option<String>),
    #[error("The provided App Check token has an invalid signature")]
    InvalidSignature,
    #[error("The provided App Check token has expired")]
    Expired,
    #[error(
        "The provided App Check token has an incorrect \"aud\" (audience) claim. \
         Expected payload to include {0}"
    )]
    IncorrectAudience(String),
    #[error(
        "The provided App Check token has an incorrect \"iss\" (issuer) claim. \
         Expected claim to include {0}"
    )]
    IncorrectIssuer(String),
    #[error("The provided App Check token \"sub\" (subject) claim must be a non-empty string")]
    InvalidSubject,
    #[error("Decoding App Check token failed: {0}")]
    Decode(#[source] jsonwebtoken::errors::Error),
}

/// Failure to resolve the signing key for a token
#[derive(Error, Debug)]
pub enum KeyFetchError {
    #[error("Missing 'kid' in the header of the provided App Check token")]
    KeyIdMissing,
    #[error("Unable to find a signing key that matches: {0:?}")]
    KeyNotFound(String),
    #[error("The JWKS endpoint did not contain any usable signing keys")]
    EmptyKeySet,
    #[error("Only RSA signing keys are supported, got: {0}")]
    UnsupportedKey(String),
    #[error("Invalid signing key material: {0}")]
    InvalidKey(#[source] jsonwebtoken::errors::Error),
    #[error("Failed to fetch signing keys: {0}")]
    Http(#[source] reqwest::Error),
}

pub(crate) fn fetch_jwks_error(error: reqwest::Error) -> KeyFetchError {
    KeyFetchError::Http(error)
}

/// Maps a `jsonwebtoken` decode failure onto the matching verification reason
pub(crate) fn decode_error(
    error: jsonwebtoken::errors::Error,
    audience: &str,
    issuer: &str,
) -> VerificationFailure {
    use jsonwebtoken::errors::ErrorKind;

    let failure = match error.kind() {
        ErrorKind::InvalidSignature => Some(VerificationFailure::InvalidSignature),
        ErrorKind::ExpiredSignature => Some(VerificationFailure::Expired),
        ErrorKind::InvalidAudience => {
            Some(VerificationFailure::IncorrectAudience(audience.to_string()))
        }
        ErrorKind::MissingRequiredClaim(claim) if claim == "aud" => {
            Some(VerificationFailure::IncorrectAudience(audience.to_string()))
        }
        ErrorKind::InvalidIssuer => Some(VerificationFailure::IncorrectIssuer(issuer.to_string())),
        _ => None,
    };

    failure.unwrap_or(VerificationFailure::Decode(error))
}
