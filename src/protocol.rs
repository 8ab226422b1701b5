//! HTTP request definitions for talking to the daemon API.
//!
//! Callers describe a request with [`RequestOptions`]; [`build_request`]
//! normalizes it against a daemon address into a [`RequestDescriptor`].

use crate::client::pool::{self, Agent};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Method;
use std::time::Duration;

/// User agent the daemon expects on every API call.
pub const USER_AGENT_VALUE: &str = "SiaPrime-Agent";

/// Timeout applied when the caller does not set one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Caller-supplied request options.
///
/// A bare path (`"/gateway"`) converts into options with only `url` set.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Path on the daemon, e.g. `/renter/files`.
    pub url: String,
    /// HTTP method. `None` means GET.
    pub method: Option<Method>,
    /// Per-request timeout. `None` means [`DEFAULT_TIMEOUT`].
    pub timeout: Option<Duration>,
    /// Ignored: [`build_request`] replaces headers with the fixed user agent.
    pub headers: Option<HeaderMap>,
    /// Query string parameters.
    pub query: Vec<(String, String)>,
    /// JSON request body.
    pub body: Option<serde_json::Value>,
}

impl RequestOptions {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Some(Method::POST),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = Some(headers);
        self
    }
}

impl From<&str> for RequestOptions {
    fn from(path: &str) -> Self {
        Self::get(path)
    }
}

impl From<String> for RequestOptions {
    fn from(path: String) -> Self {
        Self::get(path)
    }
}

impl From<&String> for RequestOptions {
    fn from(path: &String) -> Self {
        Self::get(path.as_str())
    }
}

/// A fully normalized request, ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    /// Daemon `host:port`; connection slots are counted per address.
    pub address: String,
    /// Absolute URL: `http://<address><path>`.
    pub url: String,
    pub method: Method,
    pub timeout: Duration,
    pub headers: HeaderMap,
    /// Responses are always decoded as JSON.
    pub json: bool,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    /// Shared connection pool the request is sent through.
    pub pool: &'static Agent,
}

/// Normalize `opts` into a request against the daemon at `address`.
///
/// Any caller headers are discarded and replaced with the SiaPrime user agent.
pub fn build_request(address: &str, opts: impl Into<RequestOptions>) -> RequestDescriptor {
    let opts = opts.into();

    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

    RequestDescriptor {
        address: address.to_string(),
        url: format!("http://{}{}", address, opts.url),
        method: opts.method.unwrap_or(Method::GET),
        timeout: opts.timeout.unwrap_or(DEFAULT_TIMEOUT),
        headers,
        json: true,
        query: opts.query,
        body: opts.body,
        pool: pool::agent(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_and_struct_forms_match() {
        let from_path = build_request("localhost:4280", "/foo");
        let from_struct = build_request(
            "localhost:4280",
            RequestOptions {
                url: "/foo".to_string(),
                ..RequestOptions::default()
            },
        );
        assert_eq!(from_path, from_struct);
        assert_eq!(from_path.url, "http://localhost:4280/foo");
        assert_eq!(from_path.address, "localhost:4280");
    }

    #[test]
    fn test_defaults() {
        let req = build_request("127.0.0.1:9980", "/consensus");
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.timeout, Duration::from_millis(10_000));
        assert!(req.json);
        assert!(req.body.is_none());
    }

    #[test]
    fn test_explicit_timeout_is_kept() {
        let req = build_request(
            "localhost:4280",
            RequestOptions::get("/gateway").with_timeout(Duration::from_secs(600)),
        );
        assert_eq!(req.timeout, Duration::from_secs(600));
    }

    #[test]
    fn test_caller_headers_are_replaced() {
        let mut custom = HeaderMap::new();
        custom.insert("x-api-key", HeaderValue::from_static("secret"));
        custom.insert(USER_AGENT, HeaderValue::from_static("curl/8.0"));

        let req = build_request(
            "localhost:4280",
            RequestOptions::post("/wallet/unlock").with_headers(custom),
        );

        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.headers.get(USER_AGENT).unwrap(), "SiaPrime-Agent");
        assert!(req.headers.get("x-api-key").is_none());
        assert_eq!(req.method, Method::POST);
    }

    #[test]
    fn test_requests_share_one_pool() {
        let a = build_request("localhost:4280", "/a");
        let b = build_request("localhost:9999", "/b");
        assert!(std::ptr::eq(a.pool, b.pool));
    }
}
