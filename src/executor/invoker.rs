use std::time::{Duration, Instant};

use reqwest::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::database::models::ApiInterface;
use crate::executor::ExecuteRequest;
use crate::types::{HeaderMap, HttpMethod, ParamMap, PostType};

#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error("invalid header {0}")]
    InvalidHeader(String),

    #[error("failed to encode request: {0}")]
    Encode(String),

    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("request failed: {0}")]
    Transport(String),
}

/// Captured outcome of one outbound call
#[derive(Debug, Clone)]
pub struct Invocation {
    pub status: u16,
    /// First value per header name
    pub headers: HeaderMap,
    pub body: String,
    pub elapsed_ms: i64,
    /// 2xx or 3xx
    pub success: bool,
}

/// Issues the single outbound request of an execution. No retries.
#[derive(Clone)]
pub struct HttpInvoker {
    client: reqwest::Client,
    default_timeout: Duration,
}

impl HttpInvoker {
    pub fn new(default_timeout: Duration) -> Result<Self, InvokeError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| InvokeError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            default_timeout,
        })
    }

    pub async fn invoke(
        &self,
        interface: &ApiInterface,
        request: &ExecuteRequest,
    ) -> Result<Invocation, InvokeError> {
        let method = request_method(&interface.method)?;
        let url = build_url(&interface.url, request.url_params.as_ref())?;
        let timeout = resolve_timeout(request.timeout, interface.timeout, self.default_timeout);

        let mut builder = self.client.request(method.clone(), &url).timeout(timeout);
        if let Some(headers) = &request.headers {
            for (name, value) in headers {
                let header_name = HeaderName::from_bytes(name.as_bytes())
                    .map_err(|_| InvokeError::InvalidHeader(name.clone()))?;
                let header_value = HeaderValue::from_str(value)
                    .map_err(|_| InvokeError::InvalidHeader(name.clone()))?;
                builder = builder.header(header_name, header_value);
            }
        }

        if method != Method::GET {
            if let Some(body) = request.body_params.as_ref().filter(|b| !b.is_empty()) {
                let post_type = interface.post_type();
                let encoded = encode_body(post_type, body)?;
                builder = builder
                    .header(CONTENT_TYPE, post_type.content_type())
                    .body(encoded);
            }
        }

        debug!("{} {} (timeout {:?})", method, url, timeout);
        let started = Instant::now();
        let response = builder.send().await.map_err(|e| transport_error(e, timeout))?;

        let status = response.status();
        let mut headers = HeaderMap::new();
        for (name, value) in response.headers() {
            headers
                .entry(name.as_str().to_string())
                .or_insert_with(|| String::from_utf8_lossy(value.as_bytes()).into_owned());
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_error(e, timeout))?;
        let elapsed_ms = started.elapsed().as_millis() as i64;

        Ok(Invocation {
            status: status.as_u16(),
            headers,
            body,
            elapsed_ms,
            success: status.is_success() || status.is_redirection(),
        })
    }
}

fn transport_error(err: reqwest::Error, timeout: Duration) -> InvokeError {
    if err.is_timeout() {
        InvokeError::Timeout(timeout)
    } else {
        InvokeError::Transport(err.to_string())
    }
}

/// Only GET, POST, PUT, DELETE and PATCH are dispatched
fn request_method(method: &str) -> Result<Method, InvokeError> {
    let unsupported = || InvokeError::UnsupportedMethod(method.trim().to_ascii_uppercase());
    match method.parse::<HttpMethod>().map_err(|_| unsupported())? {
        HttpMethod::Get => Ok(Method::GET),
        HttpMethod::Post => Ok(Method::POST),
        HttpMethod::Put => Ok(Method::PUT),
        HttpMethod::Delete => Ok(Method::DELETE),
        HttpMethod::Patch => Ok(Method::PATCH),
        HttpMethod::Head | HttpMethod::Options => Err(unsupported()),
    }
}

/// Per-call override, then the interface setting, then the default.
/// Non-positive values count as unset.
pub fn resolve_timeout(
    override_secs: Option<i64>,
    interface_secs: Option<i64>,
    default: Duration,
) -> Duration {
    override_secs
        .filter(|s| *s > 0)
        .or(interface_secs.filter(|s| *s > 0))
        .map(|s| Duration::from_secs(s as u64))
        .unwrap_or(default)
}

/// Text form of a parameter value for query strings and form bodies.
/// `None` for null.
pub fn stringify_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
        Value::Array(_) | Value::Object(_) => serde_json::to_string(value).ok(),
    }
}

fn encode_pairs(params: &ParamMap) -> Result<String, InvokeError> {
    let pairs: Vec<(&str, String)> = params
        .iter()
        .filter_map(|(k, v)| stringify_value(v).map(|s| (k.as_str(), s)))
        .collect();
    serde_urlencoded::to_string(pairs).map_err(|e| InvokeError::Encode(e.to_string()))
}

/// Appends non-null URL parameters, using `&` when `base` already has a query
pub fn build_url(base: &str, params: Option<&ParamMap>) -> Result<String, InvokeError> {
    let Some(params) = params else {
        return Ok(base.to_string());
    };
    let query = encode_pairs(params)?;
    if query.is_empty() {
        return Ok(base.to_string());
    }
    let separator = if base.contains('?') { '&' } else { '?' };
    Ok(format!("{}{}{}", base, separator, query))
}

pub fn encode_body(post_type: PostType, params: &ParamMap) -> Result<String, InvokeError> {
    match post_type {
        PostType::Form => encode_pairs(params),
        PostType::Json => {
            serde_json::to_string(params).map_err(|e| InvokeError::Encode(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> ParamMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn query_is_appended_with_correct_separator() {
        let p = params(json!({ "b": "x y", "a": 1, "skip": null }));

        assert_eq!(
            build_url("http://api.local/v1", Some(&p)).unwrap(),
            "http://api.local/v1?a=1&b=x+y"
        );
        assert_eq!(
            build_url("http://api.local/v1?k=v", Some(&p)).unwrap(),
            "http://api.local/v1?k=v&a=1&b=x+y"
        );
    }

    #[test]
    fn all_null_params_leave_url_unchanged() {
        let p = params(json!({ "skip": null }));
        assert_eq!(build_url("http://api.local", Some(&p)).unwrap(), "http://api.local");
        assert_eq!(build_url("http://api.local", None).unwrap(), "http://api.local");
    }

    #[test]
    fn structured_values_are_sent_as_compact_json() {
        assert_eq!(stringify_value(&json!(true)).as_deref(), Some("true"));
        assert_eq!(stringify_value(&json!(2.5)).as_deref(), Some("2.5"));
        assert_eq!(stringify_value(&json!({ "a": [1] })).as_deref(), Some("{\"a\":[1]}"));
        assert_eq!(stringify_value(&Value::Null), None);
    }

    #[test]
    fn form_and_json_bodies() {
        let p = params(json!({ "name": "a&b", "n": 3 }));
        assert_eq!(encode_body(PostType::Form, &p).unwrap(), "n=3&name=a%26b");
        assert_eq!(encode_body(PostType::Json, &p).unwrap(), "{\"n\":3,\"name\":\"a&b\"}");
    }

    #[test]
    fn timeout_precedence_ignores_non_positive_values() {
        let default = Duration::from_secs(60);
        assert_eq!(resolve_timeout(Some(5), Some(10), default), Duration::from_secs(5));
        assert_eq!(resolve_timeout(None, Some(10), default), Duration::from_secs(10));
        assert_eq!(resolve_timeout(Some(0), Some(-1), default), default);
        assert_eq!(resolve_timeout(None, None, default), default);
    }

    #[test]
    fn only_five_methods_dispatch() {
        assert_eq!(request_method("patch").unwrap(), Method::PATCH);
        assert!(matches!(
            request_method("HEAD"),
            Err(InvokeError::UnsupportedMethod(m)) if m == "HEAD"
        ));
        assert!(matches!(
            request_method("trace"),
            Err(InvokeError::UnsupportedMethod(m)) if m == "TRACE"
        ));
    }
}
