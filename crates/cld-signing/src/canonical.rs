//! Parameter canonicalization for API request signatures.
//!
//! The canonical form is:
//!
//! ```text
//! key1=value1&key2=value2...
//! ```
//!
//! Keys are sorted ascending, empty values are dropped, and any literal `&`
//! inside a value is written as `%26` so that a single value can never be
//! mistaken for several parameters by a verifier splitting on `&`.

use std::collections::BTreeMap;

use crate::signature::{sign_to_hex, SignatureAlgorithm};

/// Parameters excluded from API request signatures.
pub const EXCLUDED_FROM_SIGNATURE: &[&str] = &["api_key", "file", "resource_type", "signature"];

/// A single request parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Bool(bool),
    List(Vec<String>),
    /// Key/value pairs such as `context` or `metadata`.
    Map(BTreeMap<String, String>),
}

impl ParamValue {
    /// True when the value carries nothing worth sending.
    pub fn is_empty(&self) -> bool {
        match self {
            ParamValue::Str(s) => s.is_empty(),
            ParamValue::List(items) => items.iter().all(|s| s.is_empty()),
            ParamValue::Map(map) => map.is_empty(),
            ParamValue::Int(_) | ParamValue::Bool(_) => false,
        }
    }

    /// Render as a single form/query value; lists are comma-joined.
    pub fn to_form_value(&self) -> String {
        match self {
            ParamValue::Str(s) => s.clone(),
            ParamValue::Int(n) => n.to_string(),
            ParamValue::Bool(b) => b.to_string(),
            ParamValue::List(items) => items.join(","),
            ParamValue::Map(map) => encode_map(map),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        ParamValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        ParamValue::List(value)
    }
}

impl From<BTreeMap<String, String>> for ParamValue {
    fn from(value: BTreeMap<String, String>) -> Self {
        ParamValue::Map(value)
    }
}

/// Request parameters, kept sorted by key.
pub type Params = BTreeMap<String, ParamValue>;

/// How list values appear in the signed string.
///
/// The vendor API uses both conventions depending on the endpoint, so the
/// style is chosen by the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArrayStyle {
    /// `tags=a,b`
    #[default]
    Comma,
    /// `tags[0]=a&tags[1]=b`
    Indexed,
}

/// Encode a key/value map as `k1=v1|k2=v2`, escaping `=` and `|` in values.
pub fn encode_map(map: &BTreeMap<String, String>) -> String {
    map.iter()
        .map(|(k, v)| format!("{}={}", k, v.replace('=', "\\=").replace('|', "\\|")))
        .collect::<Vec<_>>()
        .join("|")
}

fn escape_value(value: &str) -> String {
    value.replace('&', "%26")
}

/// Flatten `params` into form fields, rendering lists in `style`.
///
/// Empty values are dropped. The same pairs feed both the signed string and
/// the request body, so a verifier sees exactly what was signed.
pub fn form_pairs(params: &Params, style: ArrayStyle) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(params.len());

    for (key, value) in params {
        if value.is_empty() {
            continue;
        }
        match (value, style) {
            (ParamValue::List(items), ArrayStyle::Indexed) => {
                for (i, item) in items.iter().enumerate() {
                    pairs.push((format!("{}[{}]", key, i), item.clone()));
                }
            }
            _ => pairs.push((key.clone(), value.to_form_value())),
        }
    }

    pairs
}

/// Build the canonical string of `params`.
pub fn canonicalize(params: &Params, style: ArrayStyle) -> String {
    form_pairs(params, style)
        .iter()
        .map(|(key, value)| format!("{}={}", key, escape_value(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Compute the hex API signature of `params`.
///
/// `file`, `api_key`, `resource_type` and any previous `signature` are never
/// part of the signed string.
pub fn api_sign_request(
    params: &Params,
    secret: &str,
    algorithm: SignatureAlgorithm,
    style: ArrayStyle,
) -> String {
    let to_sign: Params = params
        .iter()
        .filter(|(k, _)| !EXCLUDED_FROM_SIGNATURE.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    sign_to_hex(&canonicalize(&to_sign, style), secret, algorithm)
}

/// Inject `timestamp`, `signature` and `api_key` into `params`.
pub fn sign_request(
    params: &mut Params,
    api_key: &str,
    api_secret: &str,
    algorithm: SignatureAlgorithm,
    style: ArrayStyle,
    timestamp: i64,
) {
    params.insert("timestamp".to_string(), ParamValue::Int(timestamp));
    params.remove("signature");

    let signature = api_sign_request(params, api_secret, algorithm, style);

    params.insert("signature".to_string(), ParamValue::Str(signature));
    params.insert("api_key".to_string(), ParamValue::Str(api_key.to_string()));
}

/// Current Unix time in seconds.
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}
