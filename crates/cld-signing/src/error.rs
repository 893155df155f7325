//! Signing error types.

use thiserror::Error;

/// Result type for signing operations.
pub type SigningResult<T> = Result<T, SigningError>;

/// Errors that can occur while computing signatures and auth tokens.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SigningError {
    #[error("Unsupported signature algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Signing misconfigured: {0}")]
    Configuration(String),

    #[error("Auth token requires either an expiration or a duration")]
    MissingExpiration,

    #[error("Auth token requires either an acl or a url")]
    MissingScope,
}

impl SigningError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn unsupported_algorithm(name: impl Into<String>) -> Self {
        Self::UnsupportedAlgorithm(name.into())
    }
}
