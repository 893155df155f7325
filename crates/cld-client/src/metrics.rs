//! Cloudinary client metrics.
//!
//! Provides standardized metrics for monitoring API calls:
//! - Request counters by operation and status
//! - Latency histograms
//! - Upload chunk counters

use metrics::{counter, histogram};

// =============================================================================
// Metric Names
// =============================================================================

/// Metric name constants for consistency.
pub mod names {
    /// Total API requests by operation and status.
    pub const REQUESTS_TOTAL: &str = "cloudinary_requests_total";

    /// Request latency in seconds by operation.
    pub const LATENCY_SECONDS: &str = "cloudinary_latency_seconds";

    /// Upload chunks sent, by status.
    pub const UPLOAD_CHUNKS_TOTAL: &str = "cloudinary_upload_chunks_total";
}

// =============================================================================
// Recording Functions
// =============================================================================

/// Record metrics for a completed API request.
pub fn record_request(operation: &str, status: u16, latency_ms: f64) {
    counter!(
        names::REQUESTS_TOTAL,
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        names::LATENCY_SECONDS,
        "operation" => operation.to_string()
    )
    .record(latency_ms / 1000.0);
}

/// Record a single upload chunk.
pub fn record_chunk(status: u16) {
    counter!(
        names::UPLOAD_CHUNKS_TOTAL,
        "status" => status.to_string()
    )
    .increment(1);
}
