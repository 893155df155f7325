//! Cloudinary API client.
//!
//! Production-grade client with:
//! - Shared HTTP connection pool
//! - Per-call deadlines
//! - Observability (tracing spans, metrics)
//!
//! No call is retried; callers own their retry policy.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use cld_delivery::{search_url, UrlBuilder};
use cld_models::{AssetRef, CloudinaryConfig, SearchQuery, UploadResult};
use cld_signing::{
    unix_now, verify_api_response_signature, verify_notification_signature,
    DEFAULT_NOTIFICATION_VALID_FOR_SECS,
};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info_span, Instrument};

use crate::error::{ClientError, ClientResult};
use crate::metrics::record_request;

/// Cloudinary Upload and Admin API client.
///
/// Cheap to clone; clones share the connection pool and configuration.
#[derive(Debug, Clone)]
pub struct CloudinaryClient {
    pub(crate) http: Client,
    pub(crate) config: Arc<CloudinaryConfig>,
}

impl CloudinaryClient {
    /// Create a new client.
    pub fn new(config: CloudinaryConfig) -> ClientResult<Self> {
        if config.cloud_name().is_empty() {
            return Err(ClientError::configuration("cloud_name must not be empty"));
        }

        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("cld-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Transport)?;

        debug!(cloud_name = %config.cloud_name(), "Created Cloudinary client");

        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    /// Create from `CLOUDINARY_URL` (or the split `CLOUDINARY_*` variables).
    pub fn from_env() -> ClientResult<Self> {
        Self::new(CloudinaryConfig::from_env()?)
    }

    pub fn config(&self) -> &CloudinaryConfig {
        &self.config
    }

    // =========================================================================
    // Delivery
    // =========================================================================

    /// Delivery URL of `asset`.
    pub fn url(&self, asset: &AssetRef) -> ClientResult<String> {
        Ok(UrlBuilder::from_config(&self.config).build(asset)?)
    }

    /// Signed Search API URL.
    pub fn search_url(
        &self,
        query: &SearchQuery,
        ttl: Option<u64>,
        next_cursor: Option<&str>,
    ) -> ClientResult<String> {
        Ok(search_url(&self.config, query, ttl, next_cursor)?)
    }

    // =========================================================================
    // Signature verification
    // =========================================================================

    /// Check a webhook notification against its `X-Cld-Signature` and
    /// `X-Cld-Timestamp` headers.
    pub fn verify_notification(
        &self,
        body: &str,
        timestamp: i64,
        signature: &str,
        valid_for: Option<i64>,
    ) -> ClientResult<bool> {
        let secret = self.config.require_secret("notification verification")?;
        Ok(verify_notification_signature(
            body,
            timestamp,
            signature,
            secret,
            self.config.credentials.signature_algorithm,
            valid_for.unwrap_or(DEFAULT_NOTIFICATION_VALID_FOR_SECS),
            unix_now(),
        ))
    }

    /// Check the signature returned with an upload.
    pub fn verify_upload_result(&self, result: &UploadResult) -> ClientResult<bool> {
        let secret = self.config.require_secret("response verification")?;
        let Some(signature) = result.signature.as_deref() else {
            return Ok(false);
        };
        Ok(verify_api_response_signature(
            &result.public_id,
            result.version,
            signature,
            secret,
            self.config.credentials.signature_algorithm,
        ))
    }

    // =========================================================================
    // Request plumbing
    // =========================================================================

    /// `{upload_prefix}/v1_1/{cloud_name}/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> String {
        format!(
            "{}/v1_1/{}/{}",
            self.config.upload_prefix.trim_end_matches('/'),
            self.config.cloud_name(),
            path.trim_start_matches('/')
        )
    }

    /// Run `fut` under `deadline`, with a span and request metrics.
    ///
    /// Dropping the returned future aborts the in-flight request.
    pub(crate) async fn execute<T, F>(
        &self,
        operation: &str,
        deadline: Duration,
        fut: F,
    ) -> ClientResult<T>
    where
        F: Future<Output = ClientResult<T>>,
    {
        let span = info_span!(
            "cloudinary_request",
            operation = %operation,
            cloud_name = %self.config.cloud_name()
        );

        let start = Instant::now();
        let result = match tokio::time::timeout(deadline, fut.instrument(span)).await {
            Ok(result) => result,
            Err(_) => Err(ClientError::DeadlineExceeded(format!(
                "{} did not complete within {:?}",
                operation, deadline
            ))),
        };
        let latency_ms = start.elapsed().as_millis() as f64;

        let status = match &result {
            Ok(_) => 200,
            Err(e) => e.http_status().unwrap_or(0),
        };
        record_request(operation, status, latency_ms);

        if let Err(e) = &result {
            debug!(operation, error = %e, latency_ms, "Cloudinary request failed");
        }

        result
    }

    /// Decode a response body, mapping non-2xx statuses to API errors.
    pub(crate) async fn read_response<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ClientError::from_http_status(status.as_u16(), &body));
        }

        ClientError::decode(body)
    }
}
