//! Typed API responses.
//!
//! Only the commonly used fields are modeled; everything else is kept in
//! `extra` so no data is lost.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Response of the `upload` action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadResult {
    pub asset_id: Option<String>,
    pub public_id: String,
    pub version: u64,
    pub version_id: Option<String>,
    pub signature: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub format: Option<String>,
    pub resource_type: Option<String>,
    #[serde(rename = "type")]
    pub delivery_type: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub bytes: Option<u64>,
    pub etag: Option<String>,
    pub placeholder: Option<bool>,
    pub url: Option<String>,
    pub secure_url: Option<String>,
    pub original_filename: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response of the `destroy` action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DestroyResult {
    /// `ok` or `not found`.
    pub result: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DestroyResult {
    pub fn is_ok(&self) -> bool {
        self.result == "ok"
    }
}

/// Response of the Admin API `ping` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PingResult {
    pub status: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
