//! Error types for the siaprime wrapper.
//!
//! Nothing in this crate retries or recovers. Every failure is handed to the
//! direct caller as one of these variants.

use std::path::PathBuf;

/// Result type for siaprime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the launcher, the API caller and the unit converter.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The daemon executable could not be spawned.
    #[error("failed to spawn '{}': {source}", .path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The daemon output log could not be opened for writing.
    #[error("failed to open daemon log '{}': {source}", .path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Network-level failure (DNS, refused connection, timeout).
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// The daemon answered with a status outside 2xx. Holds the response body.
    #[error("{0}")]
    Api(serde_json::Value),

    /// Input that does not parse as a decimal amount.
    #[error("invalid amount: {0:?}")]
    InvalidAmount(String),

    /// The readiness probe failed. The underlying cause is not kept.
    #[error("could not connect to the SiaPrime daemon")]
    CouldNotConnect,
}

impl Error {
    /// Returns the response body for [`Error::Api`].
    pub fn api_body(&self) -> Option<&serde_json::Value> {
        match self {
            Error::Api(body) => Some(body),
            _ => None,
        }
    }

    /// True for the connect sentinel.
    pub fn is_could_not_connect(&self) -> bool {
        matches!(self, Error::CouldNotConnect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_could_not_connect_message_is_fixed() {
        assert_eq!(
            Error::CouldNotConnect.to_string(),
            "could not connect to the SiaPrime daemon"
        );
    }

    #[test]
    fn test_api_error_displays_body() {
        let err = Error::Api(serde_json::json!({ "message": "no such host" }));
        assert_eq!(err.to_string(), r#"{"message":"no such host"}"#);
        assert_eq!(
            err.api_body().and_then(|b| b.get("message")),
            Some(&serde_json::json!("no such host"))
        );
    }

    #[test]
    fn test_spawn_error_names_path() {
        let err = Error::Spawn {
            path: PathBuf::from("/nope/spd"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.to_string().contains("/nope/spd"));
        assert!(!err.is_could_not_connect());
    }
}
