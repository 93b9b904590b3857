//! Validation outcome kinds.
//!
//! These carry no user-facing text beyond their `Display`; the HTTP layer
//! decides status codes and messages (see `crate::error`).
use thiserror::Error;

/// Why a bearer token was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No token was supplied at all (neither cookie nor header).
    #[error("missing authentication token")]
    MissingToken,

    /// Empty, not three segments, or an undecodable header/payload.
    #[error("malformed token")]
    MalformedToken,

    /// The header's `kid` is absent, or unknown even after a forced refresh.
    #[error("unknown signing key")]
    UnknownSigningKey,

    /// Cryptographic mismatch, or the header algorithm does not fit the key.
    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token expired")]
    TokenExpired,

    #[error("audience mismatch")]
    AudienceMismatch,

    #[error("issuer mismatch")]
    IssuerMismatch,

    /// A required claim is missing/empty, or `nbf` is still in the future.
    #[error("invalid claim: {0}")]
    InvalidClaims(&'static str),

    /// The key set could not be fetched. Transient; the caller may retry.
    #[error("failed to fetch signing keys: {0}")]
    FetchFailed(String),
}

impl AuthError {
    /// Whether retrying the whole validation later could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::FetchFailed(_))
    }
}

/// Key cache lookup/refresh failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyCacheError {
    #[error("no key with id '{0}' in the key set")]
    KeyNotFound(String),

    #[error("jwks fetch failed: {0}")]
    FetchFailed(String),
}

impl From<KeyCacheError> for AuthError {
    fn from(e: KeyCacheError) -> Self {
        match e {
            KeyCacheError::KeyNotFound(_) => AuthError::UnknownSigningKey,
            KeyCacheError::FetchFailed(reason) => AuthError::FetchFailed(reason),
        }
    }
}
