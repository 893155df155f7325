//! Verification of signed notifications and API responses.

use tracing::debug;

use crate::canonical::{api_sign_request, ArrayStyle, ParamValue, Params};
use crate::signature::{secure_compare, sign_to_hex, SignatureAlgorithm};

/// Default acceptance window for notifications (2 hours).
pub const DEFAULT_NOTIFICATION_VALID_FOR_SECS: i64 = 7200;

/// Verify the `X-Cld-Signature` of a webhook notification.
///
/// `timestamp` is the `X-Cld-Timestamp` header value. Notifications older
/// than `valid_for` seconds relative to `now` are rejected outright.
pub fn verify_notification_signature(
    body: &str,
    timestamp: i64,
    signature: &str,
    secret: &str,
    algorithm: SignatureAlgorithm,
    valid_for: i64,
    now: i64,
) -> bool {
    if timestamp < now - valid_for {
        debug!(timestamp, now, valid_for, "Rejecting expired notification");
        return false;
    }

    let expected = sign_to_hex(&format!("{}{}", body, timestamp), secret, algorithm);
    secure_compare(signature, &expected)
}

/// Verify the signature returned alongside an upload response.
pub fn verify_api_response_signature(
    public_id: &str,
    version: u64,
    signature: &str,
    secret: &str,
    algorithm: SignatureAlgorithm,
) -> bool {
    let mut params = Params::new();
    params.insert("public_id".to_string(), ParamValue::from(public_id));
    params.insert("version".to_string(), ParamValue::from(version));

    let expected = api_sign_request(&params, secret, algorithm, ArrayStyle::Comma);
    secure_compare(signature, &expected)
}
