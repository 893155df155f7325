//! Signature engine.
//!
//! Cloudinary API and delivery signatures are plain digests of the
//! canonical payload with the API secret appended. Auth tokens use a
//! keyed HMAC-SHA256 instead (see [`hmac_sha256_hex`]).

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::URL_SAFE, Engine};
use hmac::{Hmac, Mac};
use sha1::{Digest, Sha1};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{SigningError, SigningResult};

/// Length of a short (SHA1) delivery URL signature.
pub const SHORT_URL_SIGNATURE_LENGTH: usize = 8;

/// Length of a long (SHA256) delivery URL signature.
pub const LONG_URL_SIGNATURE_LENGTH: usize = 32;

/// Digest algorithm used for API and URL signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SignatureAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

impl SignatureAlgorithm {
    /// Wire name, as sent in the `signature_algorithm` parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureAlgorithm::Sha1 => "sha1",
            SignatureAlgorithm::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = SigningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha1" | "sha-1" => Ok(SignatureAlgorithm::Sha1),
            "sha256" | "sha-256" => Ok(SignatureAlgorithm::Sha256),
            _ => Err(SigningError::unsupported_algorithm(s)),
        }
    }
}

/// Raw digest of `payload`.
pub fn digest(payload: &[u8], algorithm: SignatureAlgorithm) -> Vec<u8> {
    match algorithm {
        SignatureAlgorithm::Sha1 => Sha1::digest(payload).to_vec(),
        SignatureAlgorithm::Sha256 => Sha256::digest(payload).to_vec(),
    }
}

/// Sign `payload` with `secret`, returning the raw digest bytes.
pub fn sign(payload: &str, secret: &str, algorithm: SignatureAlgorithm) -> Vec<u8> {
    let mut input = Vec::with_capacity(payload.len() + secret.len());
    input.extend_from_slice(payload.as_bytes());
    input.extend_from_slice(secret.as_bytes());
    digest(&input, algorithm)
}

/// Sign and encode as lowercase hex (API signatures).
pub fn sign_to_hex(payload: &str, secret: &str, algorithm: SignatureAlgorithm) -> String {
    hex::encode(sign(payload, secret, algorithm))
}

/// Sign and encode as URL-safe base64, truncated to `length` characters.
pub fn sign_to_base64_truncated(
    payload: &str,
    secret: &str,
    algorithm: SignatureAlgorithm,
    length: usize,
) -> String {
    let mut encoded = URL_SAFE.encode(sign(payload, secret, algorithm));
    encoded.truncate(length);
    encoded
}

/// Build the `s--{sig}--` path segment of a signed delivery URL.
///
/// Long signatures always use SHA256 and 32 characters; short ones use the
/// account's configured algorithm and 8 characters.
pub fn url_signature(
    to_sign: &str,
    secret: &str,
    long: bool,
    default_algorithm: SignatureAlgorithm,
) -> String {
    let (algorithm, length) = if long {
        (SignatureAlgorithm::Sha256, LONG_URL_SIGNATURE_LENGTH)
    } else {
        (default_algorithm, SHORT_URL_SIGNATURE_LENGTH)
    };
    format!(
        "s--{}--",
        sign_to_base64_truncated(to_sign, secret, algorithm, length)
    )
}

/// Keyed HMAC-SHA256 encoded as lowercase hex.
pub fn hmac_sha256_hex(key: &[u8], payload: &str) -> SigningResult<String> {
    type HmacSha256 = Hmac<Sha256>;

    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| SigningError::configuration(format!("Invalid HMAC key: {}", e)))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time string comparison for signature checks.
pub fn secure_compare(a: &str, b: &str) -> bool {
    a.len() == b.len() && bool::from(a.as_bytes().ct_eq(b.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_from_str() {
        assert_eq!("sha1".parse::<SignatureAlgorithm>(), Ok(SignatureAlgorithm::Sha1));
        assert_eq!("SHA256".parse::<SignatureAlgorithm>(), Ok(SignatureAlgorithm::Sha256));
        assert_eq!(
            "md5".parse::<SignatureAlgorithm>(),
            Err(SigningError::UnsupportedAlgorithm("md5".to_string()))
        );
    }

    #[test]
    fn test_sign_to_hex_is_digest_of_payload_and_secret() {
        // sha1("abc")
        assert_eq!(
            sign_to_hex("a", "bc", SignatureAlgorithm::Sha1),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
        // sha256("abc")
        assert_eq!(
            sign_to_hex("ab", "c", SignatureAlgorithm::Sha256),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_sign_is_deterministic() {
        let a = sign("public_id=sample&timestamp=1", "secret", SignatureAlgorithm::Sha256);
        let b = sign("public_id=sample&timestamp=1", "secret", SignatureAlgorithm::Sha256);
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn test_url_signature_lengths() {
        let short = url_signature("c_fill/sample.jpg", "secret", false, SignatureAlgorithm::Sha1);
        assert!(short.starts_with("s--") && short.ends_with("--"));
        assert_eq!(short.len(), SHORT_URL_SIGNATURE_LENGTH + 5);

        let long = url_signature("c_fill/sample.jpg", "secret", true, SignatureAlgorithm::Sha1);
        assert_eq!(long.len(), LONG_URL_SIGNATURE_LENGTH + 5);
    }

    #[test]
    fn test_url_signature_value() {
        assert_eq!(
            url_signature("w_100/sample.jpg", "secret", false, SignatureAlgorithm::Sha1),
            "s--3CkXix_b--"
        );
    }

    #[test]
    fn test_hmac_sha256_hex() {
        // RFC 4231 test case 2
        assert_eq!(
            hmac_sha256_hex(b"Jefe", "what do ya want for nothing?").unwrap(),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_secure_compare() {
        assert!(secure_compare("abc", "abc"));
        assert!(!secure_compare("abc", "abd"));
        assert!(!secure_compare("abc", "abcd"));
    }
}
