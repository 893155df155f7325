//! Client error types.

use cld_delivery::DeliveryError;
use cld_models::ConfigError;
use cld_signing::SigningError;
use serde::Deserialize;
use thiserror::Error;

/// Result type for API calls.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while calling the Cloudinary API.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Deadline exceeded: {0}")]
    DeadlineExceeded(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode response: {source}")]
    Decode {
        /// The body as generic JSON, when it was JSON at all.
        partial: Option<serde_json::Value>,
        body: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Signing error: {0}")]
    Signing(#[from] SigningError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::DeadlineExceeded(err.to_string())
        } else {
            Self::Transport(err)
        }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl ClientError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Map a non-success response to an error, using the API's
    /// `{"error": {"message": ...}}` body when present.
    pub fn from_http_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorEnvelope>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.to_string());
        Self::Api { status, message }
    }

    /// Decode `body` into `T`, keeping the raw body on failure.
    pub fn decode<T: serde::de::DeserializeOwned>(body: String) -> ClientResult<T> {
        serde_json::from_str(&body).map_err(|source| Self::Decode {
            partial: serde_json::from_str(&body).ok(),
            body,
            source,
        })
    }

    /// True if the call ran out of time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::DeadlineExceeded(_))
    }

    /// HTTP status carried by the error, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status().map(|s| s.as_u16()),
            ClientError::DeadlineExceeded(_) => Some(408),
            _ => None,
        }
    }
}
