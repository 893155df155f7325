//! Signing primitives for the Cloudinary API.
//!
//! This crate provides:
//! - API request signatures over canonicalized parameters
//! - Delivery URL signatures (`s--...--`)
//! - Time-boxed auth tokens for restricted delivery
//! - Notification and upload-response signature verification

pub mod auth_token;
pub mod canonical;
pub mod error;
pub mod notification;
pub mod signature;

pub use auth_token::{AuthTokenSpec, DEFAULT_TOKEN_NAME};
pub use canonical::{
    api_sign_request, canonicalize, form_pairs, sign_request, unix_now, ArrayStyle, ParamValue,
    Params,
};
pub use error::{SigningError, SigningResult};
pub use notification::{
    verify_api_response_signature, verify_notification_signature,
    DEFAULT_NOTIFICATION_VALID_FOR_SECS,
};
pub use signature::{
    secure_compare, sign, sign_to_base64_truncated, sign_to_hex, url_signature,
    SignatureAlgorithm,
};
