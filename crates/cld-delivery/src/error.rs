//! Delivery error types.

use cld_models::{AssetType, ConfigError, DeliveryType};
use cld_signing::SigningError;
use thiserror::Error;

/// Result type for URL construction.
pub type DeliveryResult<T> = Result<T, DeliveryError>;

/// Errors that can occur while building delivery or search URLs.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("URL suffix is not supported for {asset_type}/{delivery_type}")]
    UnsupportedSuffix {
        asset_type: AssetType,
        delivery_type: DeliveryType,
    },

    #[error("URL suffix must not contain '.' or '/': {0}")]
    InvalidSuffix(String),

    #[error("Root path is only supported for image/upload, got {asset_type}/{delivery_type}")]
    UnsupportedRootPath {
        asset_type: AssetType,
        delivery_type: DeliveryType,
    },

    #[error("Version too large to encode: {0}")]
    VersionTooLarge(String),

    #[error("Signing error: {0}")]
    Signing(#[from] SigningError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DeliveryError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

impl From<ConfigError> for DeliveryError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Signing(e) => Self::Signing(e),
            other => Self::Configuration(other.to_string()),
        }
    }
}
