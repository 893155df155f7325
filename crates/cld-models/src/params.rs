//! Upload API parameter sets.

use std::collections::BTreeMap;

use cld_signing::{ParamValue, Params};

use crate::asset::{AssetType, DeliveryType};

/// Parameter sets that target a specific asset type endpoint.
pub trait AssetTypeProvider {
    fn asset_type(&self) -> AssetType;
}

fn insert_str(params: &mut Params, key: &str, value: &Option<String>) {
    if let Some(v) = value {
        params.insert(key.to_string(), ParamValue::from(v.as_str()));
    }
}

fn insert_bool(params: &mut Params, key: &str, value: Option<bool>) {
    if let Some(v) = value {
        params.insert(key.to_string(), ParamValue::Bool(v));
    }
}

/// Parameters of the `upload` action.
///
/// Flags are tri-state: `None` leaves the account default in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadParams {
    pub asset_type: AssetType,
    pub delivery_type: Option<DeliveryType>,
    pub public_id: Option<String>,
    pub folder: Option<String>,
    pub tags: Vec<String>,
    pub context: BTreeMap<String, String>,
    pub upload_preset: Option<String>,
    /// Upload through an unsigned preset; no signature is sent.
    pub unsigned: Option<bool>,
    pub overwrite: Option<bool>,
    pub invalidate: Option<bool>,
    pub unique_filename: Option<bool>,
    pub use_filename: Option<bool>,
    pub format: Option<String>,
    pub transformation: Option<String>,
    /// Eager transformations, sent `|`-separated.
    pub eager: Vec<String>,
    pub notification_url: Option<String>,
    /// Anything not modeled above.
    pub extra: Params,
}

impl UploadParams {
    pub fn new(asset_type: AssetType) -> Self {
        Self {
            asset_type,
            ..Default::default()
        }
    }

    pub fn with_public_id(mut self, public_id: impl Into<String>) -> Self {
        self.public_id = Some(public_id.into());
        self
    }

    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = Some(folder.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Switch to an unsigned upload through `preset`.
    pub fn unsigned_with_preset(mut self, preset: impl Into<String>) -> Self {
        self.upload_preset = Some(preset.into());
        self.unsigned = Some(true);
        self
    }

    pub fn is_unsigned(&self) -> bool {
        self.unsigned.unwrap_or(false)
    }

    /// Form parameters, before signing.
    pub fn to_params(&self) -> Params {
        let mut params = self.extra.clone();

        if let Some(dt) = self.delivery_type {
            params.insert("type".to_string(), ParamValue::from(dt.as_str()));
        }
        insert_str(&mut params, "public_id", &self.public_id);
        insert_str(&mut params, "folder", &self.folder);
        if !self.tags.is_empty() {
            params.insert("tags".to_string(), ParamValue::List(self.tags.clone()));
        }
        if !self.context.is_empty() {
            params.insert("context".to_string(), ParamValue::Map(self.context.clone()));
        }
        insert_str(&mut params, "upload_preset", &self.upload_preset);
        insert_bool(&mut params, "overwrite", self.overwrite);
        insert_bool(&mut params, "invalidate", self.invalidate);
        insert_bool(&mut params, "unique_filename", self.unique_filename);
        insert_bool(&mut params, "use_filename", self.use_filename);
        insert_str(&mut params, "format", &self.format);
        insert_str(&mut params, "transformation", &self.transformation);
        if !self.eager.is_empty() {
            params.insert("eager".to_string(), ParamValue::Str(self.eager.join("|")));
        }
        insert_str(&mut params, "notification_url", &self.notification_url);

        params
    }
}

impl AssetTypeProvider for UploadParams {
    fn asset_type(&self) -> AssetType {
        self.asset_type
    }
}

/// Parameters of the `destroy` action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestroyParams {
    pub public_id: String,
    pub asset_type: AssetType,
    pub delivery_type: Option<DeliveryType>,
    pub invalidate: Option<bool>,
}

impl DestroyParams {
    pub fn new(public_id: impl Into<String>) -> Self {
        Self {
            public_id: public_id.into(),
            ..Default::default()
        }
    }

    pub fn to_params(&self) -> Params {
        let mut params = Params::new();
        params.insert("public_id".to_string(), ParamValue::from(self.public_id.as_str()));
        if let Some(dt) = self.delivery_type {
            params.insert("type".to_string(), ParamValue::from(dt.as_str()));
        }
        insert_bool(&mut params, "invalidate", self.invalidate);
        params
    }
}

impl AssetTypeProvider for DestroyParams {
    fn asset_type(&self) -> AssetType {
        self.asset_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_params_skip_unset_flags() {
        let params = UploadParams::new(AssetType::Image)
            .with_public_id("sample")
            .to_params();

        assert_eq!(params.len(), 1);
        assert_eq!(params.get("public_id"), Some(&ParamValue::from("sample")));
    }

    #[test]
    fn test_upload_params_explicit_false_is_sent() {
        let mut upload = UploadParams::new(AssetType::Video);
        upload.overwrite = Some(false);
        upload.unique_filename = Some(true);
        let params = upload.to_params();

        assert_eq!(params.get("overwrite"), Some(&ParamValue::Bool(false)));
        assert_eq!(params.get("unique_filename"), Some(&ParamValue::Bool(true)));
        assert!(!params.contains_key("invalidate"));
    }

    #[test]
    fn test_upload_params_collections() {
        let mut upload = UploadParams::new(AssetType::Image)
            .with_tag("a")
            .with_tag("b")
            .with_context("alt", "dog");
        upload.eager = vec!["w_100".to_string(), "w_200,c_fill".to_string()];
        upload.delivery_type = Some(DeliveryType::Private);
        let params = upload.to_params();

        assert_eq!(params.get("tags").map(|v| v.to_form_value()), Some("a,b".to_string()));
        assert_eq!(params.get("context").map(|v| v.to_form_value()), Some("alt=dog".to_string()));
        assert_eq!(
            params.get("eager"),
            Some(&ParamValue::from("w_100|w_200,c_fill"))
        );
        assert_eq!(params.get("type"), Some(&ParamValue::from("private")));
    }

    #[test]
    fn test_unsigned_preset() {
        let upload = UploadParams::default().unsigned_with_preset("ml_default");
        assert!(upload.is_unsigned());
        assert_eq!(
            upload.to_params().get("upload_preset"),
            Some(&ParamValue::from("ml_default"))
        );
    }

    #[test]
    fn test_asset_type_provider() {
        fn endpoint<P: AssetTypeProvider>(p: &P) -> &'static str {
            p.asset_type().as_str()
        }

        assert_eq!(endpoint(&UploadParams::new(AssetType::File)), "raw");
        let mut destroy = DestroyParams::new("x");
        destroy.asset_type = AssetType::Video;
        assert_eq!(endpoint(&destroy), "video");
    }
}
