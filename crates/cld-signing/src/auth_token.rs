//! Time-boxed access tokens for restricted delivery URLs.
//!
//! A token looks like:
//!
//! ```text
//! __cld_token__=ip=1.2.3.4~st=1111111111~exp=1111111411~acl=%2fimage%2f*~hmac=...
//! ```
//!
//! The `hmac` part is an HMAC-SHA256 (keyed with the hex-decoded token key)
//! over the other parts, plus `url=...` when the token is scoped to a single
//! URL instead of an ACL.

use tracing::debug;

use crate::canonical::unix_now;
use crate::error::{SigningError, SigningResult};
use crate::signature::hmac_sha256_hex;

/// Default name of the token query parameter.
pub const DEFAULT_TOKEN_NAME: &str = "__cld_token__";

/// Characters escaped inside `acl` and `url` token parts. Everything else,
/// non-ASCII included, is signed as is.
const TOKEN_UNSAFE: &[u8] = b" \"#%&'/:;<=>?@[\\]^`{|}~";

/// Auth token settings.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthTokenSpec {
    /// Hex-encoded HMAC key.
    pub key: String,
    pub ip: Option<String>,
    /// ACL patterns; several are joined with `!`.
    pub acl: Vec<String>,
    /// Unix seconds.
    pub start_time: Option<i64>,
    /// Unix seconds.
    pub expiration: Option<i64>,
    /// Seconds after `start_time` (or now).
    pub duration: Option<i64>,
    /// Query parameter name; defaults to `__cld_token__`.
    pub token_name: Option<String>,
}

impl std::fmt::Debug for AuthTokenSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthTokenSpec")
            .field("key", &"<redacted>")
            .field("ip", &self.ip)
            .field("acl", &self.acl)
            .field("start_time", &self.start_time)
            .field("expiration", &self.expiration)
            .field("duration", &self.duration)
            .field("token_name", &self.token_name)
            .finish()
    }
}

impl AuthTokenSpec {
    /// Create a spec with the given hex key.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    pub fn with_acl(mut self, acl: impl Into<String>) -> Self {
        self.acl.push(acl.into());
        self
    }

    pub fn with_start_time(mut self, start_time: i64) -> Self {
        self.start_time = Some(start_time);
        self
    }

    pub fn with_expiration(mut self, expiration: i64) -> Self {
        self.expiration = Some(expiration);
        self
    }

    pub fn with_duration(mut self, duration: i64) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn token_name(&self) -> &str {
        self.token_name.as_deref().unwrap_or(DEFAULT_TOKEN_NAME)
    }

    /// Generate a token for `url` (a URL path) using the current time.
    pub fn generate(&self, url: Option<&str>) -> SigningResult<String> {
        self.generate_at(url, unix_now())
    }

    /// Generate a token, using `now` when a start time must be assumed.
    pub fn generate_at(&self, url: Option<&str>, now: i64) -> SigningResult<String> {
        let expiration = match (self.expiration, self.duration) {
            (Some(exp), _) => exp,
            (None, Some(duration)) => self.start_time.unwrap_or(now) + duration,
            (None, None) => return Err(SigningError::MissingExpiration),
        };

        if self.acl.is_empty() && url.is_none() {
            return Err(SigningError::MissingScope);
        }

        let key = hex::decode(&self.key).map_err(|e| {
            SigningError::configuration(format!("Auth token key must be hex encoded: {}", e))
        })?;

        let mut parts = Vec::with_capacity(5);
        if let Some(ip) = &self.ip {
            parts.push(format!("ip={}", ip));
        }
        if let Some(st) = self.start_time {
            parts.push(format!("st={}", st));
        }
        parts.push(format!("exp={}", expiration));
        if !self.acl.is_empty() {
            parts.push(format!("acl={}", escape_to_lower(&self.acl.join("!"))));
        }

        let mut to_sign = parts.clone();
        if let Some(url) = url.filter(|_| self.acl.is_empty()) {
            to_sign.push(format!("url={}", escape_to_lower(url)));
        }

        let hmac = hmac_sha256_hex(&key, &to_sign.join("~"))?;
        parts.push(format!("hmac={}", hmac));

        debug!(expiration, acl = !self.acl.is_empty(), "Generated auth token");

        Ok(format!("{}={}", self.token_name(), parts.join("~")))
    }
}

/// Percent-escape the token-unsafe characters using lowercase hex.
pub fn escape_to_lower(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match u8::try_from(c) {
            Ok(b) if TOKEN_UNSAFE.contains(&b) => out.push_str(&format!("%{:02x}", b)),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "00112233FF99";

    fn split_token(token: &str) -> (Vec<String>, String) {
        let body = token.split_once('=').unwrap().1;
        let mut parts: Vec<String> = body.split('~').map(str::to_string).collect();
        let hmac = parts.pop().unwrap();
        (parts, hmac.trim_start_matches("hmac=").to_string())
    }

    #[test]
    fn test_escape_to_lower() {
        assert_eq!(escape_to_lower("/image/*"), "%2fimage%2f*");
        assert_eq!(escape_to_lower("a b~c"), "a%20b%7ec");
        assert_eq!(escape_to_lower("plain-text_1.jpg"), "plain-text_1.jpg");
        assert_eq!(escape_to_lower("[a]\\{b}|^`"), "%5ba%5d%5c%7bb%7d%7c%5e%60");
    }

    #[test]
    fn test_escape_leaves_non_ascii_untouched() {
        assert_eq!(escape_to_lower("/image/ü*"), "%2fimage%2fü*");
        assert_eq!(escape_to_lower("日本"), "日本");
    }

    #[test]
    fn test_generate_with_acl() {
        let spec = AuthTokenSpec::new(KEY)
            .with_ip("111.222.111.222")
            .with_start_time(1111111111)
            .with_duration(300)
            .with_acl("/image/*");
        let token = spec.generate_at(None, 0).unwrap();

        assert!(token.starts_with(
            "__cld_token__=ip=111.222.111.222~st=1111111111~exp=1111111411~acl=%2fimage%2f*~hmac="
        ));
    }

    #[test]
    fn test_hmac_round_trip() {
        let spec = AuthTokenSpec::new(KEY)
            .with_start_time(222222222)
            .with_expiration(222222522)
            .with_acl("/*/t_foobar");
        let token = spec.generate_at(None, 0).unwrap();
        let (parts, hmac) = split_token(&token);

        let key = hex::decode(KEY).unwrap();
        let recomputed = hmac_sha256_hex(&key, &parts.join("~")).unwrap();
        assert_eq!(hmac, recomputed);
    }

    #[test]
    fn test_url_is_signed_but_not_emitted() {
        let spec = AuthTokenSpec::new(KEY).with_expiration(1_000);
        let token = spec.generate_at(Some("/demo/image/upload/sample.jpg"), 0).unwrap();
        let (parts, hmac) = split_token(&token);

        assert_eq!(parts, vec!["exp=1000".to_string()]);

        let key = hex::decode(KEY).unwrap();
        let payload = "exp=1000~url=%2fdemo%2fimage%2fupload%2fsample.jpg";
        assert_eq!(hmac, hmac_sha256_hex(&key, payload).unwrap());
    }

    #[test]
    fn test_acl_wins_over_url() {
        let with_url = AuthTokenSpec::new(KEY)
            .with_expiration(1_000)
            .with_acl("/image/*")
            .generate_at(Some("/image/upload/x.jpg"), 0)
            .unwrap();
        let without_url = AuthTokenSpec::new(KEY)
            .with_expiration(1_000)
            .with_acl("/image/*")
            .generate_at(None, 0)
            .unwrap();
        assert_eq!(with_url, without_url);
    }

    #[test]
    fn test_multiple_acls_joined() {
        let token = AuthTokenSpec::new(KEY)
            .with_expiration(10)
            .with_acl("/image/*")
            .with_acl("/video/*")
            .generate_at(None, 0)
            .unwrap();
        assert!(token.contains("acl=%2fimage%2f*!%2fvideo%2f*"));
    }

    #[test]
    fn test_duration_uses_now_without_start_time() {
        let token = AuthTokenSpec::new(KEY)
            .with_duration(60)
            .with_acl("/*")
            .generate_at(None, 1_000)
            .unwrap();
        assert!(token.contains("exp=1060"));
        assert!(!token.contains("st="));
    }

    #[test]
    fn test_missing_expiration() {
        let result = AuthTokenSpec::new(KEY).with_acl("/*").generate_at(None, 0);
        assert_eq!(result, Err(SigningError::MissingExpiration));
    }

    #[test]
    fn test_missing_scope() {
        let result = AuthTokenSpec::new(KEY).with_duration(10).generate_at(None, 0);
        assert_eq!(result, Err(SigningError::MissingScope));
    }

    #[test]
    fn test_invalid_key() {
        let result = AuthTokenSpec::new("not-hex")
            .with_duration(10)
            .with_acl("/*")
            .generate_at(None, 0);
        assert!(matches!(result, Err(SigningError::Configuration(_))));
    }

    #[test]
    fn test_custom_token_name() {
        let mut spec = AuthTokenSpec::new(KEY).with_expiration(10).with_acl("/*");
        spec.token_name = Some("__token__".to_string());
        assert!(spec.generate_at(None, 0).unwrap().starts_with("__token__=exp=10~"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let spec = AuthTokenSpec::new(KEY);
        assert!(!format!("{:?}", spec).contains(KEY));
    }
}
