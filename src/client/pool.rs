//! Process-wide HTTP connection pool.
//!
//! Every API call goes through one keep-alive client. At most
//! [`MAX_SOCKETS`] requests are in flight per `host:port`; extra calls to
//! that daemon wait for a free slot instead of opening more sockets. Calls
//! to other daemons are not held up.

use reqwest::redirect::Policy;
use reqwest::{Client, Method};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Concurrent socket cap per daemon address.
pub const MAX_SOCKETS: usize = 20;

/// Redirect hops followed for safe methods.
const MAX_REDIRECTS: usize = 10;

static AGENT: OnceLock<Agent> = OnceLock::new();

/// Shared keep-alive client with a bounded number of concurrent sockets per host.
#[derive(Debug)]
pub struct Agent {
    client: Client,
    no_redirect: Client,
    max_sockets: usize,
    sockets: Mutex<HashMap<String, Arc<Semaphore>>>,
}

fn build_client(max_sockets: usize, redirects: Policy) -> Client {
    Client::builder()
        .pool_max_idle_per_host(max_sockets)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .redirect(redirects)
        .build()
        .expect("Failed to create HTTP client")
}

impl Agent {
    fn new(max_sockets: usize) -> Self {
        Self {
            client: build_client(max_sockets, Policy::limited(MAX_REDIRECTS)),
            no_redirect: build_client(max_sockets, Policy::none()),
            max_sockets,
            sockets: Mutex::new(HashMap::new()),
        }
    }

    /// Client for `method`. Only GET-like methods follow redirects; a 3xx
    /// answer to POST, PUT, PATCH or DELETE comes back as-is.
    pub fn client_for(&self, method: &Method) -> &Client {
        if follows_redirects(method) {
            &self.client
        } else {
            &self.no_redirect
        }
    }

    fn slots(&self, authority: &str) -> Arc<Semaphore> {
        let mut sockets = self.sockets.lock().unwrap_or_else(|e| e.into_inner());
        sockets
            .entry(authority.to_string())
            .or_insert_with(|| Arc::new(Semaphore::new(self.max_sockets)))
            .clone()
    }

    /// Wait for a free socket slot on `authority` (`host:port`). The slot is
    /// released when the permit drops.
    pub async fn checkout(&self, authority: &str) -> OwnedSemaphorePermit {
        self.slots(authority)
            .acquire_owned()
            .await
            .expect("connection pool semaphore is never closed")
    }

    /// Number of sockets currently free on `authority`.
    pub fn available(&self, authority: &str) -> usize {
        self.slots(authority).available_permits()
    }
}

fn follows_redirects(method: &Method) -> bool {
    !matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

// There is only ever one pool, so identity is equality.
impl PartialEq for Agent {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

/// The shared pool, created on first use and kept for the life of the process.
pub fn agent() -> &'static Agent {
    AGENT.get_or_init(|| Agent::new(MAX_SOCKETS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_is_a_singleton() {
        assert!(std::ptr::eq(agent(), agent()));
        assert_eq!(agent(), agent());
    }

    #[tokio::test]
    async fn test_checkout_bounds_concurrency_per_host() {
        let pool = Agent::new(2);
        let first = pool.checkout("10.0.0.1:4280").await;
        let _second = pool.checkout("10.0.0.1:4280").await;
        assert_eq!(pool.available("10.0.0.1:4280"), 0);

        drop(first);
        assert_eq!(pool.available("10.0.0.1:4280"), 1);
    }

    #[tokio::test]
    async fn test_full_host_does_not_block_another() {
        let pool = Agent::new(2);
        let _a1 = pool.checkout("10.0.0.1:4280").await;
        let _a2 = pool.checkout("10.0.0.1:4280").await;

        let other = tokio::time::timeout(
            Duration::from_millis(100),
            pool.checkout("10.0.0.2:4280"),
        )
        .await;
        assert!(other.is_ok());

        let same = tokio::time::timeout(
            Duration::from_millis(100),
            pool.checkout("10.0.0.1:4280"),
        )
        .await;
        assert!(same.is_err());
    }

    #[test]
    fn test_only_safe_methods_follow_redirects() {
        assert!(follows_redirects(&Method::GET));
        assert!(follows_redirects(&Method::HEAD));
        assert!(!follows_redirects(&Method::POST));
        assert!(!follows_redirects(&Method::PUT));
        assert!(!follows_redirects(&Method::PATCH));
        assert!(!follows_redirects(&Method::DELETE));
    }
}
