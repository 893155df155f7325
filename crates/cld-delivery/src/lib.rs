//! Cloudinary delivery URLs.
//!
//! This crate provides:
//! - CDN host selection and sharding
//! - Delivery URL assembly with signatures, auth tokens and SEO suffixes
//! - The SDK analytics signature
//! - Signed Search API URLs

pub mod analytics;
pub mod distribution;
pub mod error;
pub mod search;
pub mod url;

pub use analytics::{encode_version, sdk_signature};
pub use distribution::domain_shard;
pub use error::{DeliveryError, DeliveryResult};
pub use search::{search_url, DEFAULT_SEARCH_TTL_SECS};
pub use url::UrlBuilder;
