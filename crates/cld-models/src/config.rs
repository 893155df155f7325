//! Client configuration and `CLOUDINARY_URL` parsing.

use std::fmt;
use std::time::Duration;

use cld_signing::{AuthTokenSpec, SignatureAlgorithm};
use percent_encoding::percent_decode_str;
use tracing::debug;
use url::Url;

use crate::error::{ConfigError, ConfigResult};

/// Default Upload/Admin API endpoint.
pub const DEFAULT_UPLOAD_PREFIX: &str = "https://api.cloudinary.com";

/// Default size of a single upload chunk (20 MB).
pub const DEFAULT_CHUNK_SIZE: u64 = 20_000_000;

/// Default deadline for plain API calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default deadline for a whole upload, all chunks included.
pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 600;

const URL_SCHEME: &str = "cloudinary";

// =============================================================================
// Credentials
// =============================================================================

/// Account credentials.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub cloud_name: String,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub signature_algorithm: SignatureAlgorithm,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &self.api_secret.as_ref().map(|_| "<redacted>"))
            .field("signature_algorithm", &self.signature_algorithm)
            .finish()
    }
}

impl Credentials {
    pub fn new(
        cloud_name: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            cloud_name: cloud_name.into(),
            api_key: Some(api_key.into()),
            api_secret: Some(api_secret.into()),
            signature_algorithm: SignatureAlgorithm::default(),
        }
    }

    /// Credentials for building unsigned delivery URLs only.
    pub fn cloud_only(cloud_name: impl Into<String>) -> Self {
        Self {
            cloud_name: cloud_name.into(),
            ..Default::default()
        }
    }
}

// =============================================================================
// Delivery
// =============================================================================

/// Options that shape delivery URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryConfig {
    pub secure: bool,
    /// Account has a dedicated `{cloud}-res` CDN host.
    pub private_cdn: bool,
    /// Spread requests over `res-1` .. `res-5` shards.
    pub cdn_subdomain: bool,
    /// Unset inherits `cdn_subdomain` on shared hosts.
    pub secure_cdn_subdomain: Option<bool>,
    /// Custom host for plain HTTP delivery.
    pub cname: Option<String>,
    /// Custom host for HTTPS delivery (`secure_distribution`).
    pub secure_cname: Option<String>,
    pub shorten: bool,
    pub use_root_path: bool,
    pub force_version: bool,
    pub sign_url: bool,
    pub long_url_signature: bool,
    pub analytics: bool,
    /// Token settings for restricted delivery; used instead of `s--` signatures.
    pub auth_token: Option<AuthTokenSpec>,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            secure: true,
            private_cdn: false,
            cdn_subdomain: false,
            secure_cdn_subdomain: None,
            cname: None,
            secure_cname: None,
            shorten: false,
            use_root_path: false,
            force_version: true,
            sign_url: false,
            long_url_signature: false,
            analytics: true,
            auth_token: None,
        }
    }
}

// =============================================================================
// Client configuration
// =============================================================================

/// Full client configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct CloudinaryConfig {
    pub credentials: Credentials,
    pub delivery: DeliveryConfig,
    /// Scheme and host of the Upload/Admin API.
    pub upload_prefix: String,
    /// Bytes per upload chunk.
    pub chunk_size: u64,
    /// Deadline for plain API calls.
    pub timeout: Duration,
    /// Deadline for a whole upload.
    pub upload_timeout: Duration,
    /// Bearer token used by the Admin API instead of Basic auth.
    pub oauth_token: Option<String>,
}

impl fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("credentials", &self.credentials)
            .field("delivery", &self.delivery)
            .field("upload_prefix", &self.upload_prefix)
            .field("chunk_size", &self.chunk_size)
            .field("timeout", &self.timeout)
            .field("upload_timeout", &self.upload_timeout)
            .field("oauth_token", &self.oauth_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl CloudinaryConfig {
    /// Create a config with default options.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            delivery: DeliveryConfig::default(),
            upload_prefix: DEFAULT_UPLOAD_PREFIX.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            upload_timeout: Duration::from_secs(DEFAULT_UPLOAD_TIMEOUT_SECS),
            oauth_token: None,
        }
    }

    /// Create config from environment variables.
    ///
    /// `CLOUDINARY_URL` wins; otherwise `CLOUDINARY_CLOUD_NAME`,
    /// `CLOUDINARY_API_KEY` and `CLOUDINARY_API_SECRET` are used.
    pub fn from_env() -> ConfigResult<Self> {
        if let Ok(url) = std::env::var("CLOUDINARY_URL") {
            if !url.is_empty() {
                return Self::from_url(&url);
            }
        }

        let cloud_name = std::env::var("CLOUDINARY_CLOUD_NAME")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                ConfigError::missing("CLOUDINARY_URL or CLOUDINARY_CLOUD_NAME must be set")
            })?;

        let credentials = Credentials {
            cloud_name,
            api_key: std::env::var("CLOUDINARY_API_KEY").ok().filter(|s| !s.is_empty()),
            api_secret: std::env::var("CLOUDINARY_API_SECRET").ok().filter(|s| !s.is_empty()),
            signature_algorithm: SignatureAlgorithm::default(),
        };

        Ok(Self::new(credentials))
    }

    /// Parse `cloudinary://{api_key}:{api_secret}@{cloud_name}?k=v...`.
    pub fn from_url(raw: &str) -> ConfigResult<Self> {
        let url = Url::parse(raw).map_err(|e| ConfigError::invalid_url(e.to_string()))?;

        if url.scheme() != URL_SCHEME {
            return Err(ConfigError::invalid_url(format!(
                "expected scheme '{}', got '{}'",
                URL_SCHEME,
                url.scheme()
            )));
        }

        let cloud_name = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ConfigError::invalid_url("missing cloud name"))?
            .to_string();

        let api_key = Some(decode(url.username())).filter(|s| !s.is_empty());
        let api_secret = url.password().map(decode).filter(|s| !s.is_empty());

        let mut config = Self::new(Credentials {
            cloud_name,
            api_key,
            api_secret,
            signature_algorithm: SignatureAlgorithm::default(),
        });

        for (key, value) in url.query_pairs() {
            config.apply_option(&key, &value)?;
        }

        debug!(
            cloud_name = %config.credentials.cloud_name,
            has_secret = config.credentials.api_secret.is_some(),
            "Parsed CLOUDINARY_URL"
        );

        Ok(config)
    }

    /// Apply a single `key=value` option as found in `CLOUDINARY_URL`.
    ///
    /// Unknown keys are ignored.
    pub fn apply_option(&mut self, key: &str, value: &str) -> ConfigResult<()> {
        let delivery = &mut self.delivery;
        match key {
            "secure" => delivery.secure = parse_bool(key, value)?,
            "private_cdn" => delivery.private_cdn = parse_bool(key, value)?,
            "cdn_subdomain" => delivery.cdn_subdomain = parse_bool(key, value)?,
            "secure_cdn_subdomain" => {
                delivery.secure_cdn_subdomain = Some(parse_bool(key, value)?)
            }
            "cname" => delivery.cname = non_empty(value),
            "secure_distribution" => delivery.secure_cname = non_empty(value),
            "shorten" => delivery.shorten = parse_bool(key, value)?,
            "use_root_path" => delivery.use_root_path = parse_bool(key, value)?,
            "force_version" => delivery.force_version = parse_bool(key, value)?,
            "sign_url" => delivery.sign_url = parse_bool(key, value)?,
            "long_url_signature" => delivery.long_url_signature = parse_bool(key, value)?,
            "analytics" => delivery.analytics = parse_bool(key, value)?,
            "signature_algorithm" => self.credentials.signature_algorithm = value.parse()?,
            "upload_prefix" => {
                self.upload_prefix = value.trim_end_matches('/').to_string();
            }
            "chunk_size" => self.chunk_size = parse_u64(key, value)?,
            "timeout" => self.timeout = Duration::from_secs(parse_u64(key, value)?),
            "upload_timeout" => {
                self.upload_timeout = Duration::from_secs(parse_u64(key, value)?)
            }
            "oauth_token" => self.oauth_token = non_empty(value),
            _ => debug!(key, "Ignoring unknown configuration option"),
        }
        Ok(())
    }

    pub fn cloud_name(&self) -> &str {
        &self.credentials.cloud_name
    }

    /// API secret, or an error naming the operation that needs it.
    pub fn require_secret(&self, operation: &str) -> ConfigResult<&str> {
        self.credentials
            .api_secret
            .as_deref()
            .ok_or_else(|| {
                ConfigError::missing(format!("api_secret is required for {}", operation))
            })
    }

    /// API key, or an error naming the operation that needs it.
    pub fn require_key(&self, operation: &str) -> ConfigResult<&str> {
        self.credentials
            .api_key
            .as_deref()
            .ok_or_else(|| ConfigError::missing(format!("api_key is required for {}", operation)))
    }
}

fn decode(value: &str) -> String {
    percent_decode_str(value).decode_utf8_lossy().into_owned()
}

fn non_empty(value: &str) -> Option<String> {
    Some(value.to_string()).filter(|s| !s.is_empty())
}

fn parse_bool(key: &str, value: &str) -> ConfigResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::invalid_value(key, value)),
    }
}

fn parse_u64(key: &str, value: &str) -> ConfigResult<u64> {
    value
        .parse()
        .map_err(|_| ConfigError::invalid_value(key, value))
}
