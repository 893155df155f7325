//! Shared configuration and data models for the Cloudinary SDK.
//!
//! This crate provides:
//! - Credentials and delivery options, loaded from `CLOUDINARY_URL`
//! - Asset and delivery type enums plus asset references
//! - Upload API parameter sets
//! - Search queries and typed API responses

pub mod asset;
pub mod config;
pub mod error;
pub mod params;
pub mod results;
pub mod search;

pub use asset::{AssetParseError, AssetRef, AssetType, DeliveryType};
pub use config::{
    CloudinaryConfig, Credentials, DeliveryConfig, DEFAULT_CHUNK_SIZE, DEFAULT_UPLOAD_PREFIX,
};
pub use error::{ConfigError, ConfigResult};
pub use params::{AssetTypeProvider, DestroyParams, UploadParams};
pub use results::{DestroyResult, PingResult, UploadResult};
pub use search::SearchQuery;
