//! Signed Search API URLs.
//!
//! The URL embeds the base64 query and a SHA256 signature over it, so it can
//! be handed to untrusted clients for a limited time:
//!
//! ```text
//! {prefix}/search/{signature}/{ttl}/{base64_query}[/{next_cursor}]
//! ```

use base64::{engine::general_purpose::STANDARD, Engine};
use cld_models::{CloudinaryConfig, SearchQuery};
use cld_signing::{sign_to_hex, SignatureAlgorithm};
use tracing::debug;

use crate::distribution;
use crate::error::{DeliveryError, DeliveryResult};

/// Default lifetime of a search URL in seconds.
pub const DEFAULT_SEARCH_TTL_SECS: u64 = 300;

/// Build a signed search URL for `query`.
///
/// `ttl` defaults to five minutes; `next_cursor` overrides the query's own
/// cursor.
pub fn search_url(
    config: &CloudinaryConfig,
    query: &SearchQuery,
    ttl: Option<u64>,
    next_cursor: Option<&str>,
) -> DeliveryResult<String> {
    let secret = config.require_secret("search URLs")?;

    let cloud_name = config.cloud_name();
    if cloud_name.is_empty() {
        return Err(DeliveryError::configuration("cloud_name is required to build URLs"));
    }

    let ttl = ttl.unwrap_or(DEFAULT_SEARCH_TTL_SECS);
    let encoded = STANDARD.encode(query.to_json()?);
    let signature = sign_to_hex(&format!("{}{}", ttl, encoded), secret, SignatureAlgorithm::Sha256);

    let prefix = distribution::prefix("", cloud_name, &config.delivery);
    let mut url = format!("{}/search/{}/{}/{}", prefix, signature, ttl, encoded);

    if let Some(cursor) = next_cursor.or(query.next_cursor.as_deref()).filter(|c| !c.is_empty()) {
        url.push('/');
        url.push_str(cursor);
    }

    debug!(ttl, "Built search URL");

    Ok(url)
}
