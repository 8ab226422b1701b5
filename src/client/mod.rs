//! Client side of the wrapper.
//!
//! - Issues JSON calls against a daemon address
//! - Probes whether the daemon API is reachable
//! - Vends a [`Connection`] bound to one address

pub mod http;
pub mod pool;

pub use http::call;

use crate::error::{Error, Result};
use crate::protocol::RequestOptions;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Endpoint used as the readiness probe.
pub const PROBE_PATH: &str = "/gateway";

/// How long the readiness probe waits before giving up (10 minutes).
pub const PROBE_TIMEOUT: Duration = Duration::from_millis(600_000);

/// Check whether the daemon API at `address` answers.
///
/// This does not look at the daemon process; it only checks that a call to
/// `/gateway` succeeds. Every kind of failure yields `false`.
pub async fn is_running(address: &str) -> bool {
    let probe = RequestOptions::get(PROBE_PATH).with_timeout(PROBE_TIMEOUT);
    match call(address, probe).await {
        Ok(_) => true,
        Err(e) => {
            debug!(address, error = %e, "Readiness probe failed");
            false
        }
    }
}

/// Connect to a running daemon at `address`.
///
/// Probes once. If the probe fails the result is [`Error::CouldNotConnect`],
/// whatever the cause.
pub async fn connect(address: impl Into<String>) -> Result<Connection> {
    let address = address.into();
    if !is_running(&address).await {
        warn!(address = %address, "Could not connect to daemon");
        return Err(Error::CouldNotConnect);
    }
    Ok(Connection { address })
}

/// A handle bound to one daemon address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    address: String,
}

impl Connection {
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Call the API at this connection's address.
    pub async fn call(&self, opts: impl Into<RequestOptions>) -> Result<Value> {
        call(&self.address, opts).await
    }

    /// Call the API and decode the body into `T`.
    ///
    /// A body that does not match `T` is returned as [`Error::Api`].
    pub async fn call_as<T: DeserializeOwned>(&self, opts: impl Into<RequestOptions>) -> Result<T> {
        let body = self.call(opts).await?;
        <T as serde::Deserialize>::deserialize(&body).map_err(|_| Error::Api(body))
    }

    /// Probe the daemon again.
    pub async fn is_running(&self) -> bool {
        is_running(&self.address).await
    }
}
