//! Chunk planning for large uploads.

use std::fmt;

use cld_signing::signature::digest;
use cld_signing::SignatureAlgorithm;
use uuid::Uuid;

use crate::error::{ClientError, ClientResult};

/// Inclusive byte range of one chunk, rendered as a `Content-Range` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRange {
    pub start: u64,
    /// Inclusive.
    pub end: u64,
    pub total: u64,
}

impl ContentRange {
    pub fn byte_count(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn is_last(&self) -> bool {
        self.end + 1 == self.total
    }
}

impl fmt::Display for ContentRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bytes {}-{}/{}", self.start, self.end, self.total)
    }
}

/// Split `total` bytes into contiguous chunks of at most `chunk_size` bytes.
pub fn plan_chunks(total: u64, chunk_size: u64) -> ClientResult<Vec<ContentRange>> {
    if chunk_size == 0 {
        return Err(ClientError::configuration("chunk_size must be greater than zero"));
    }

    let mut ranges = Vec::with_capacity(total.div_ceil(chunk_size) as usize);
    let mut start = 0;
    while start < total {
        let end = (start + chunk_size).min(total) - 1;
        ranges.push(ContentRange { start, end, total });
        start = end + 1;
    }
    Ok(ranges)
}

/// Identifier shared by all chunks of one upload (`X-Unique-Upload-Id`).
pub fn upload_session_id() -> String {
    let hash = digest(Uuid::new_v4().as_bytes(), SignatureAlgorithm::Sha1);
    let mut id = hex::encode(hash);
    id.truncate(16);
    id
}
