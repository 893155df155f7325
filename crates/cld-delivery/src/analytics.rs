//! SDK analytics signature appended to delivery URLs as `?_a=`.

use std::sync::OnceLock;

use tracing::warn;

use crate::error::{DeliveryError, DeliveryResult};

/// Query parameter carrying the analytics signature.
pub const QUERY_KEY: &str = "_a";

const CHARS: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

const ALGO_VERSION: char = 'B';
const PRODUCT: char = 'A';
const SDK_CODE: char = 'R';
const FEATURE: char = '0';
const ERROR_SIGNATURE: &str = "E";

const BINARY_PAD: usize = 18;

static SIGNATURE: OnceLock<String> = OnceLock::new();

/// Encode a dotted version into three signature characters.
pub fn encode_version(version: &str) -> DeliveryResult<String> {
    let padded: String = version
        .split('.')
        .rev()
        .map(|part| format!("{:0>2}", part))
        .collect();

    let number: u64 = padded
        .parse()
        .map_err(|_| DeliveryError::configuration(format!("Invalid version: {}", version)))?;

    if number >= 1 << BINARY_PAD {
        return Err(DeliveryError::VersionTooLarge(version.to_string()));
    }

    Ok((0..BINARY_PAD / 6)
        .rev()
        .map(|group| CHARS[((number >> (group * 6)) & 0x3f) as usize] as char)
        .collect())
}

/// `major.minor` of a toolchain version string.
fn major_minor(version: &str) -> String {
    version.split('.').take(2).collect::<Vec<_>>().join(".")
}

fn build_signature(sdk_version: &str, tech_version: &str) -> DeliveryResult<String> {
    Ok(format!(
        "{}{}{}{}{}{}",
        ALGO_VERSION,
        PRODUCT,
        SDK_CODE,
        encode_version(sdk_version)?,
        encode_version(&major_minor(tech_version))?,
        FEATURE
    ))
}

/// The analytics signature of this SDK build, computed once.
///
/// The tech version is the rustc that compiled this crate, captured by the
/// build script. Without it the declared minimum Rust version is reported.
pub fn sdk_signature() -> &'static str {
    SIGNATURE.get_or_init(|| {
        let tech_version = option_env!("CLD_RUSTC_VERSION")
            .or(option_env!("CARGO_PKG_RUST_VERSION"))
            .unwrap_or_default();
        build_signature(env!("CARGO_PKG_VERSION"), tech_version).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to compute analytics signature");
            ERROR_SIGNATURE.to_string()
        })
    })
}
