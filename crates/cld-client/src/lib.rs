//! Async client for the Cloudinary Upload and Admin APIs.
//!
//! This crate provides:
//! - Signed and unsigned uploads from files, bytes, remote URLs and data URIs
//! - Chunked uploads for large files
//! - Generic Upload API and Admin API calls
//! - Delivery and search URLs bound to the client configuration
//! - Request metrics and tracing spans

pub mod admin;
pub mod chunk;
pub mod client;
pub mod error;
pub mod metrics;
pub mod source;
pub mod upload;


pub use chunk::{plan_chunks, ContentRange};
pub use client::CloudinaryClient;
pub use error::{ClientError, ClientResult};
pub use source::FileSource;

pub use cld_models::{
    AssetRef, AssetType, CloudinaryConfig, Credentials, DeliveryConfig, DeliveryType,
    DestroyParams, DestroyResult, PingResult, SearchQuery, UploadParams, UploadResult,
};
pub use cld_signing::{ArrayStyle, ParamValue, Params};
