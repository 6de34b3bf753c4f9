//! Transport seam for outbound GET requests
//!
//! `HttpTransport` is the single point where bytes leave the process. The
//! fetch client layers allow-listing and retry on top of it, and tests
//! replace it with a mock to count network attempts.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
#[cfg(test)]
use mockall::automock;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FetchError;

/// A fully read upstream response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: Bytes,
}

impl RawResponse {
    /// Create a response
    #[must_use]
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Performs a single GET request
///
/// Implementations must return `Ok` for any response that was completely
/// received, whatever its status. Only failures to obtain a response are
/// errors.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issue a GET request to `url` with extra headers
    async fn get(&self, url: &str, headers: &[(String, String)]) -> Result<RawResponse, FetchError>;
}

/// Connection settings for the reqwest-backed transport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Per-attempt timeout in seconds (default: 10)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds (default: 5)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// User agent sent upstream; some providers reject anonymous clients
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

const fn default_timeout() -> u64 {
    10
}

const fn default_connect_timeout() -> u64 {
    5
}

fn default_user_agent() -> String {
    format!("Waypoint/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// `HttpTransport` backed by a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout_secs: u64,
}

impl ReqwestTransport {
    /// Build a transport from connection settings
    ///
    /// # Errors
    ///
    /// Returns `FetchError::ClientInit` if the HTTP client cannot be built.
    pub fn new(config: &TransportConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| FetchError::ClientInit(e.to_string()))?;

        Ok(Self {
            client,
            timeout_secs: config.timeout_secs,
        })
    }

    /// Build a transport with default settings
    ///
    /// # Errors
    ///
    /// Returns `FetchError::ClientInit` if the HTTP client cannot be built.
    pub fn with_defaults() -> Result<Self, FetchError> {
        Self::new(&TransportConfig::default())
    }

    fn map_error(&self, err: &reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, headers: &[(String, String)]) -> Result<RawResponse, FetchError> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(|e| self.map_error(&e))?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| self.map_error(&e))?;

        debug!(status, bytes = body.len(), "Upstream response received");

        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = TransportConfig::default();
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.connect_timeout_secs, 5);
        assert!(config.user_agent.starts_with("Waypoint/"));
    }

    #[test]
    fn config_deserialization_fills_defaults() {
        let config: TransportConfig = serde_json::from_str(r#"{"timeout_secs":3}"#).unwrap();
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(config.connect_timeout_secs, 5);
    }

    #[test]
    fn raw_response_success_range() {
        assert!(RawResponse::new(200, "").is_success());
        assert!(RawResponse::new(204, "").is_success());
        assert!(!RawResponse::new(199, "").is_success());
        assert!(!RawResponse::new(301, "").is_success());
        assert!(!RawResponse::new(500, "").is_success());
    }

    #[test]
    fn transport_builds_with_defaults() {
        assert!(ReqwestTransport::with_defaults().is_ok());
    }
}
