//! JSON-over-HTTP calls to the daemon API.

use crate::error::{Error, Result};
use crate::protocol::{build_request, RequestDescriptor, RequestOptions};
use serde_json::Value;
use std::time::Instant;
use tracing::debug;

/// Call the daemon API at `address`.
///
/// Resolves with the decoded body on a 2xx status. A transport failure is
/// returned as [`Error::Transport`]; any other status is returned as
/// [`Error::Api`] holding the decoded body.
pub async fn call(address: &str, opts: impl Into<RequestOptions>) -> Result<Value> {
    let request = build_request(address, opts);
    send(request).await
}

/// Send an already normalized request.
pub async fn send(request: RequestDescriptor) -> Result<Value> {
    let pool = request.pool;

    // Waiting for a slot counts against the timeout. Once it is used up the
    // request goes out with a zero timeout, so reqwest reports a timeout.
    let started = Instant::now();
    let _socket = tokio::time::timeout(request.timeout, pool.checkout(&request.address))
        .await
        .ok();
    let remaining = request.timeout.saturating_sub(started.elapsed());

    debug!(method = %request.method, url = %request.url, "Calling daemon API");

    let mut builder = pool
        .client_for(&request.method)
        .request(request.method, &request.url)
        .headers(request.headers)
        .timeout(remaining);
    if !request.query.is_empty() {
        builder = builder.query(&request.query);
    }
    if let Some(body) = &request.body {
        builder = builder.json(body);
    }

    let response = builder.send().await?;
    let status = response.status();
    let text = response.text().await?;
    let body = decode_body(&text);

    debug!(status = status.as_u16(), "Daemon API responded");

    if status.is_success() {
        Ok(body)
    } else {
        Err(Error::Api(body))
    }
}

/// Decode a response body: JSON when it parses, the raw text otherwise.
fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
