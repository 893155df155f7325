//! Admin API calls.
//!
//! Requests authenticate with HTTP Basic auth (`api_key:api_secret`), or
//! with a bearer token when `oauth_token` is configured.

use cld_models::PingResult;
use cld_signing::{ParamValue, Params};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::client::CloudinaryClient;
use crate::error::ClientResult;

impl CloudinaryClient {
    /// Check connectivity and credentials.
    pub async fn ping(&self) -> ClientResult<PingResult> {
        self.call_admin_api(Method::GET, "ping", &Params::new()).await
    }

    /// Call an Admin API endpoint relative to `/v1_1/{cloud_name}/`.
    ///
    /// `GET` and `DELETE` send `params` in the query string; other methods
    /// send a JSON body.
    pub async fn call_admin_api<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &Params,
    ) -> ClientResult<T> {
        let url = self.api_url(path);

        self.execute("admin", self.config.timeout, async {
            let request = self.authorize(self.http.request(method.clone(), &url))?;
            let request = if method == Method::GET || method == Method::DELETE {
                request.query(&query_pairs(params))
            } else {
                request.json(&json_body(params))
            };

            let response = request.send().await?;
            Self::read_response(response).await
        })
        .await
    }

    fn authorize(&self, request: RequestBuilder) -> ClientResult<RequestBuilder> {
        if let Some(token) = self.config.oauth_token.as_deref() {
            return Ok(request.bearer_auth(token));
        }

        let api_key = self.config.require_key("Admin API calls")?;
        let api_secret = self.config.require_secret("Admin API calls")?;
        Ok(request.basic_auth(api_key, Some(api_secret)))
    }
}

/// Query pairs; lists repeat their key as `key[]`.
fn query_pairs(params: &Params) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(params.len());
    for (key, value) in params.iter().filter(|(_, v)| !v.is_empty()) {
        match value {
            ParamValue::List(items) => {
                pairs.extend(items.iter().map(|item| (format!("{}[]", key), item.clone())));
            }
            other => pairs.push((key.clone(), other.to_form_value())),
        }
    }
    pairs
}

fn json_body(params: &Params) -> Value {
    let body: Map<String, Value> = params
        .iter()
        .map(|(key, value)| {
            let json = match value {
                ParamValue::Str(s) => Value::from(s.as_str()),
                ParamValue::Int(n) => Value::from(*n),
                ParamValue::Bool(b) => Value::from(*b),
                ParamValue::List(items) => Value::from(items.clone()),
                ParamValue::Map(map) => Value::Object(
                    map.iter()
                        .map(|(k, v)| (k.clone(), Value::from(v.as_str())))
                        .collect(),
                ),
            };
            (key.clone(), json)
        })
        .collect();
    Value::Object(body)
}
