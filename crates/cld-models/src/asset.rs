//! Asset types, delivery types and asset references.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of stored asset (the `resource_type` on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    #[default]
    Image,
    Video,
    /// Raw files (documents, archives, ...).
    #[serde(rename = "raw")]
    File,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Image => "image",
            AssetType::Video => "video",
            AssetType::File => "raw",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = AssetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "image" => Ok(AssetType::Image),
            "video" => Ok(AssetType::Video),
            "raw" | "file" => Ok(AssetType::File),
            _ => Err(AssetParseError::AssetType(s.to_string())),
        }
    }
}

/// How an asset is stored and delivered (the `type` on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryType {
    #[default]
    Upload,
    Private,
    Authenticated,
    Fetch,
    List,
    Multi,
    Sprite,
    Text,
    Facebook,
    Twitter,
    Youtube,
    Vimeo,
}

impl DeliveryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryType::Upload => "upload",
            DeliveryType::Private => "private",
            DeliveryType::Authenticated => "authenticated",
            DeliveryType::Fetch => "fetch",
            DeliveryType::List => "list",
            DeliveryType::Multi => "multi",
            DeliveryType::Sprite => "sprite",
            DeliveryType::Text => "text",
            DeliveryType::Facebook => "facebook",
            DeliveryType::Twitter => "twitter",
            DeliveryType::Youtube => "youtube",
            DeliveryType::Vimeo => "vimeo",
        }
    }
}

impl fmt::Display for DeliveryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryType {
    type Err = AssetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "upload" => Ok(DeliveryType::Upload),
            "private" => Ok(DeliveryType::Private),
            "authenticated" => Ok(DeliveryType::Authenticated),
            "fetch" => Ok(DeliveryType::Fetch),
            "list" => Ok(DeliveryType::List),
            "multi" => Ok(DeliveryType::Multi),
            "sprite" => Ok(DeliveryType::Sprite),
            "text" => Ok(DeliveryType::Text),
            "facebook" => Ok(DeliveryType::Facebook),
            "twitter" => Ok(DeliveryType::Twitter),
            "youtube" => Ok(DeliveryType::Youtube),
            "vimeo" => Ok(DeliveryType::Vimeo),
            _ => Err(AssetParseError::DeliveryType(s.to_string())),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssetParseError {
    #[error("Unknown asset type: {0}")]
    AssetType(String),
    #[error("Unknown delivery type: {0}")]
    DeliveryType(String),
}

/// Reference to a delivered asset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssetRef {
    pub asset_type: AssetType,
    pub delivery_type: DeliveryType,
    pub public_id: String,
    /// 0 means unversioned.
    pub version: u64,
    /// Opaque transformation string, e.g. `c_fill,w_100`.
    pub transformation: Option<String>,
    /// SEO suffix appended after the public id.
    pub suffix: Option<String>,
    pub format: Option<String>,
}

impl AssetRef {
    pub fn new(asset_type: AssetType, public_id: impl Into<String>) -> Self {
        Self {
            asset_type,
            public_id: public_id.into(),
            ..Default::default()
        }
    }

    pub fn image(public_id: impl Into<String>) -> Self {
        Self::new(AssetType::Image, public_id)
    }

    pub fn video(public_id: impl Into<String>) -> Self {
        Self::new(AssetType::Video, public_id)
    }

    pub fn file(public_id: impl Into<String>) -> Self {
        Self::new(AssetType::File, public_id)
    }

    pub fn with_delivery_type(mut self, delivery_type: DeliveryType) -> Self {
        self.delivery_type = delivery_type;
        self
    }

    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    pub fn with_transformation(mut self, transformation: impl Into<String>) -> Self {
        self.transformation = Some(transformation.into());
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}
