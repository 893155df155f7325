//! Delivery URL construction.
//!
//! A delivery URL is assembled as:
//!
//! ```text
//! {prefix}/{asset_type}/{delivery_type}/{signature}/{transformation}/{version}/{source}
//! ```
//!
//! with empty segments omitted.

use std::sync::LazyLock;

use cld_models::{AssetRef, AssetType, CloudinaryConfig, Credentials, DeliveryConfig, DeliveryType};
use cld_signing::url_signature;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use tracing::debug;

use crate::analytics;
use crate::distribution;
use crate::error::{DeliveryError, DeliveryResult};

/// Characters left as-is in public ids.
const SOURCE_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'/')
    .remove(b':');

static REMOTE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?:/").expect("valid regex"));

static VERSIONED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v[0-9]+").expect("valid regex"));

static DUPLICATE_SLASHES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^:])/+").expect("valid regex"));

/// Builds delivery URLs for one account.
#[derive(Debug, Clone, Copy)]
pub struct UrlBuilder<'a> {
    credentials: &'a Credentials,
    delivery: &'a DeliveryConfig,
}

impl<'a> UrlBuilder<'a> {
    pub fn new(credentials: &'a Credentials, delivery: &'a DeliveryConfig) -> Self {
        Self {
            credentials,
            delivery,
        }
    }

    pub fn from_config(config: &'a CloudinaryConfig) -> Self {
        Self::new(&config.credentials, &config.delivery)
    }

    /// Build the delivery URL of `asset`.
    pub fn build(&self, asset: &AssetRef) -> DeliveryResult<String> {
        let cloud_name = self.credentials.cloud_name.as_str();
        if cloud_name.is_empty() {
            return Err(DeliveryError::configuration("cloud_name is required to build URLs"));
        }

        let suffix = validate_suffix(asset.suffix.as_deref())?;
        let resource = self.resource_segments(asset, suffix.is_some())?;
        let (source, source_to_sign) =
            finalize_source(&asset.public_id, asset.format.as_deref(), suffix);
        let transformation = asset.transformation.as_deref().unwrap_or_default();
        let version = self.version_segment(asset);

        let auth_token = self.delivery.auth_token.as_ref().filter(|_| self.delivery.sign_url);

        let signature = if self.delivery.sign_url && auth_token.is_none() {
            let secret = self
                .credentials
                .api_secret
                .as_deref()
                .ok_or_else(|| {
                    DeliveryError::configuration("api_secret is required to sign URLs")
                })?;
            let to_sign = compact_join(&[transformation, &source_to_sign]);
            Some(url_signature(
                &to_sign,
                secret,
                self.delivery.long_url_signature,
                self.credentials.signature_algorithm,
            ))
        } else {
            None
        };

        let prefix = distribution::prefix(&asset.public_id, cloud_name, self.delivery);

        let mut parts: Vec<&str> = vec![prefix.as_str()];
        parts.extend(resource.iter().copied());
        parts.extend([
            signature.as_deref().unwrap_or_default(),
            transformation,
            version.as_deref().unwrap_or_default(),
            source.as_str(),
        ]);
        let mut url = DUPLICATE_SLASHES
            .replace_all(&compact_join(&parts), "$1/")
            .into_owned();

        if let Some(token) = auth_token {
            let path = ::url::Url::parse(&url)
                .map_err(|e| DeliveryError::configuration(format!("Invalid delivery URL: {}", e)))?
                .path()
                .to_string();
            url.push('?');
            url.push_str(&token.generate(Some(&path))?);
        } else if self.delivery.analytics && !url.contains('?') {
            url.push_str(&format!("?{}={}", analytics::QUERY_KEY, analytics::sdk_signature()));
        }

        debug!(public_id = %asset.public_id, signed = self.delivery.sign_url, "Built delivery URL");

        Ok(url)
    }

    /// The `{asset_type}/{delivery_type}` segments, after SEO and root path rewrites.
    fn resource_segments(
        &self,
        asset: &AssetRef,
        has_suffix: bool,
    ) -> DeliveryResult<Vec<&'static str>> {
        let (asset_type, delivery_type) = (asset.asset_type, asset.delivery_type);
        let is_image_upload =
            asset_type == AssetType::Image && delivery_type == DeliveryType::Upload;

        let mut segments = if has_suffix {
            vec![seo_resource(asset_type, delivery_type)?]
        } else {
            vec![asset_type.as_str(), delivery_type.as_str()]
        };

        if self.delivery.use_root_path {
            if !is_image_upload {
                return Err(DeliveryError::UnsupportedRootPath {
                    asset_type,
                    delivery_type,
                });
            }
            segments.clear();
        }

        if self.delivery.shorten && is_image_upload && segments.len() == 2 {
            segments = vec!["iu"];
        }

        Ok(segments)
    }

    fn version_segment(&self, asset: &AssetRef) -> Option<String> {
        if asset.version != 0 {
            return Some(format!("v{}", asset.version));
        }

        let public_id = asset.public_id.as_str();
        let synthesize = self.delivery.force_version
            && !public_id.contains('/')
            && !REMOTE_URL.is_match(public_id)
            && !VERSIONED.is_match(public_id);

        synthesize.then(|| "v1".to_string())
    }
}

/// SEO resource segment replacing `{asset_type}/{delivery_type}`.
fn seo_resource(
    asset_type: AssetType,
    delivery_type: DeliveryType,
) -> DeliveryResult<&'static str> {
    match (asset_type, delivery_type) {
        (AssetType::Image, DeliveryType::Upload) => Ok("images"),
        (AssetType::Image, DeliveryType::Private) => Ok("private_images"),
        (AssetType::Image, DeliveryType::Authenticated) => Ok("authenticated_images"),
        (AssetType::Video, DeliveryType::Upload) => Ok("videos"),
        (AssetType::File, DeliveryType::Upload) => Ok("files"),
        _ => Err(DeliveryError::UnsupportedSuffix {
            asset_type,
            delivery_type,
        }),
    }
}

fn validate_suffix(suffix: Option<&str>) -> DeliveryResult<Option<&str>> {
    match suffix.filter(|s| !s.is_empty()) {
        Some(s) if s.contains('.') || s.contains('/') => {
            Err(DeliveryError::InvalidSuffix(s.to_string()))
        }
        other => Ok(other),
    }
}

/// Escape `public_id` for use in a URL path.
///
/// Returns the path source and the part covered by the `s--` signature;
/// the SEO suffix is not signed.
fn finalize_source(
    public_id: &str,
    format: Option<&str>,
    suffix: Option<&str>,
) -> (String, String) {
    let collapsed = DUPLICATE_SLASHES.replace_all(public_id, "$1/");

    if REMOTE_URL.is_match(&collapsed) {
        let source = collapsed.into_owned();
        return (source.clone(), source);
    }

    let decoded = percent_decode_str(&collapsed).decode_utf8_lossy();
    let escaped = utf8_percent_encode(&decoded, SOURCE_ESCAPE).to_string();

    let mut source = escaped.clone();
    let mut source_to_sign = escaped;
    if let Some(suffix) = suffix {
        source.push('/');
        source.push_str(suffix);
    }
    if let Some(format) = format.filter(|f| !f.is_empty()) {
        source.push('.');
        source.push_str(format);
        source_to_sign.push('.');
        source_to_sign.push_str(format);
    }

    (source, source_to_sign)
}

fn compact_join(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use cld_signing::AuthTokenSpec;

    fn credentials() -> Credentials {
        Credentials::new("demo", "1234", "secret")
    }

    fn no_analytics() -> DeliveryConfig {
        DeliveryConfig {
            analytics: false,
            ..Default::default()
        }
    }

    fn build(delivery: &DeliveryConfig, asset: &AssetRef) -> DeliveryResult<String> {
        UrlBuilder::new(&credentials(), delivery).build(asset)
    }

    #[test]
    fn test_basic_url_synthesizes_version() {
        let url = build(&no_analytics(), &AssetRef::image("sample").with_format("jpg")).unwrap();
        assert_eq!(url, "https://res.cloudinary.com/demo/image/upload/v1/sample.jpg");
    }

    #[test]
    fn test_version_rules() {
        let config = no_analytics();

        let foldered = build(&config, &AssetRef::image("folder/sample")).unwrap();
        assert_eq!(foldered, "https://res.cloudinary.com/demo/image/upload/folder/sample");

        let versioned_id = build(&config, &AssetRef::image("v123/sample")).unwrap();
        assert_eq!(versioned_id, "https://res.cloudinary.com/demo/image/upload/v123/sample");

        let version_like = build(&config, &AssetRef::image("v123")).unwrap();
        assert_eq!(version_like, "https://res.cloudinary.com/demo/image/upload/v123");

        let synthesized = build(&config, &AssetRef::image("sample")).unwrap();
        assert_eq!(synthesized, "https://res.cloudinary.com/demo/image/upload/v1/sample");

        let explicit =
            build(&config, &AssetRef::image("folder/sample").with_version(1234)).unwrap();
        assert_eq!(explicit, "https://res.cloudinary.com/demo/image/upload/v1234/folder/sample");

        let no_force = DeliveryConfig {
            force_version: false,
            ..no_analytics()
        };
        let plain = build(&no_force, &AssetRef::image("sample")).unwrap();
        assert_eq!(plain, "https://res.cloudinary.com/demo/image/upload/sample");
    }

    #[test]
    fn test_transformation_segment() {
        let asset = AssetRef::video("dog")
            .with_transformation("c_fill,w_100")
            .with_version(5)
            .with_format("mp4");
        let url = build(&no_analytics(), &asset).unwrap();
        assert_eq!(url, "https://res.cloudinary.com/demo/video/upload/c_fill,w_100/v5/dog.mp4");
    }

    #[test]
    fn test_fetch_url_passes_through() {
        let asset = AssetRef::image("http://example.com/a b.jpg")
            .with_delivery_type(DeliveryType::Fetch);
        let url = build(&no_analytics(), &asset).unwrap();
        assert_eq!(url, "https://res.cloudinary.com/demo/image/fetch/http://example.com/a b.jpg");
    }

    #[test]
    fn test_source_is_escaped_once() {
        let asset = AssetRef::image("folder/my%20file ü").with_version(1);
        let url = build(&no_analytics(), &asset).unwrap();
        assert_eq!(
            url,
            "https://res.cloudinary.com/demo/image/upload/v1/folder/my%20file%20%C3%BC"
        );
    }

    #[test]
    fn test_seo_suffix() {
        let asset = AssetRef::image("sample").with_suffix("hello").with_format("jpg");
        let url = build(&no_analytics(), &asset).unwrap();
        assert_eq!(url, "https://res.cloudinary.com/demo/images/v1/sample/hello.jpg");

        let private = AssetRef::image("sample")
            .with_suffix("hello")
            .with_delivery_type(DeliveryType::Private);
        assert!(build(&no_analytics(), &private).unwrap().contains("/private_images/"));

        let raw = AssetRef::file("doc").with_suffix("hello");
        assert!(build(&no_analytics(), &raw).unwrap().contains("/files/"));
    }

    #[test]
    fn test_seo_suffix_errors() {
        let unsupported = AssetRef::video("dog")
            .with_suffix("hello")
            .with_delivery_type(DeliveryType::Private);
        assert!(matches!(
            build(&no_analytics(), &unsupported),
            Err(DeliveryError::UnsupportedSuffix {
                asset_type: AssetType::Video,
                delivery_type: DeliveryType::Private,
            })
        ));

        for bad in ["hello.world", "hello/world"] {
            let asset = AssetRef::image("sample").with_suffix(bad);
            assert!(matches!(
                build(&no_analytics(), &asset),
                Err(DeliveryError::InvalidSuffix(_))
            ));
        }
    }

    #[test]
    fn test_root_path_and_shorten() {
        let root = DeliveryConfig {
            use_root_path: true,
            ..no_analytics()
        };
        assert_eq!(
            build(&root, &AssetRef::image("sample").with_format("jpg")).unwrap(),
            "https://res.cloudinary.com/demo/v1/sample.jpg"
        );
        assert_eq!(
            build(&root, &AssetRef::image("sample").with_suffix("hello")).unwrap(),
            "https://res.cloudinary.com/demo/v1/sample/hello"
        );
        assert!(matches!(
            build(&root, &AssetRef::video("dog")),
            Err(DeliveryError::UnsupportedRootPath { .. })
        ));

        let short = DeliveryConfig {
            shorten: true,
            ..no_analytics()
        };
        assert_eq!(
            build(&short, &AssetRef::image("sample")).unwrap(),
            "https://res.cloudinary.com/demo/iu/v1/sample"
        );
        assert_eq!(
            build(&short, &AssetRef::video("dog")).unwrap(),
            "https://res.cloudinary.com/demo/video/upload/v1/dog"
        );
    }

    #[test]
    fn test_signed_url() {
        let config = DeliveryConfig {
            sign_url: true,
            force_version: false,
            ..no_analytics()
        };
        let asset = AssetRef::image("sample")
            .with_transformation("w_100")
            .with_format("jpg");
        let url = build(&config, &asset).unwrap();
        assert_eq!(
            url,
            "https://res.cloudinary.com/demo/image/upload/s--3CkXix_b--/w_100/sample.jpg"
        );
    }

    #[test]
    fn test_signature_ignores_suffix() {
        let config = DeliveryConfig {
            sign_url: true,
            force_version: false,
            ..no_analytics()
        };
        let plain = build(
            &config,
            &AssetRef::image("sample")
                .with_transformation("w_100")
                .with_format("jpg"),
        )
        .unwrap();
        let seo = build(
            &config,
            &AssetRef::image("sample")
                .with_transformation("w_100")
                .with_format("jpg")
                .with_suffix("nice"),
        )
        .unwrap();
        assert!(plain.contains("/s--3CkXix_b--/"));
        assert!(seo.contains("/s--3CkXix_b--/"));
    }

    #[test]
    fn test_long_signature() {
        let config = DeliveryConfig {
            sign_url: true,
            long_url_signature: true,
            ..no_analytics()
        };
        let url = build(&config, &AssetRef::image("sample")).unwrap();
        let segment = url.split('/').find(|s| s.starts_with("s--")).unwrap();
        assert_eq!(segment.len(), 32 + 5);
    }

    #[test]
    fn test_signing_requires_secret() {
        let config = DeliveryConfig {
            sign_url: true,
            ..no_analytics()
        };
        let creds = Credentials::cloud_only("demo");
        let result = UrlBuilder::new(&creds, &config).build(&AssetRef::image("sample"));
        assert!(matches!(result, Err(DeliveryError::Configuration(_))));
    }

    #[test]
    fn test_missing_cloud_name() {
        let creds = Credentials::default();
        let result = UrlBuilder::new(&creds, &no_analytics()).build(&AssetRef::image("sample"));
        assert!(matches!(result, Err(DeliveryError::Configuration(_))));
    }

    #[test]
    fn test_auth_token_replaces_signature() {
        let config = DeliveryConfig {
            sign_url: true,
            force_version: false,
            auth_token: Some(AuthTokenSpec::new("00112233FF99").with_expiration(1_000)),
            ..Default::default()
        };
        let asset = AssetRef::image("sample")
            .with_delivery_type(DeliveryType::Authenticated)
            .with_format("jpg");
        let url = build(&config, &asset).unwrap();

        let (base, query) = url.split_once('?').unwrap();
        assert_eq!(base, "https://res.cloudinary.com/demo/image/authenticated/sample.jpg");
        assert!(query.starts_with("__cld_token__=exp=1000~hmac="));
        assert!(!url.contains("s--"));
        assert!(!url.contains("_a="));

        let expected = AuthTokenSpec::new("00112233FF99")
            .with_expiration(1_000)
            .generate(Some("/demo/image/authenticated/sample.jpg"))
            .unwrap();
        assert_eq!(query, expected);
    }

    #[test]
    fn test_analytics_query() {
        let url = build(&DeliveryConfig::default(), &AssetRef::image("sample")).unwrap();
        assert_eq!(
            url,
            format!(
                "https://res.cloudinary.com/demo/image/upload/v1/sample?_a={}",
                analytics::sdk_signature()
            )
        );
    }

    #[test]
    fn test_from_config() {
        let config =
            CloudinaryConfig::from_url("cloudinary://k:s@demo?analytics=false&secure=false")
                .unwrap();
        let url = UrlBuilder::from_config(&config)
            .build(&AssetRef::image("sample"))
            .unwrap();
        assert_eq!(url, "http://res.cloudinary.com/demo/image/upload/v1/sample");
    }
}
