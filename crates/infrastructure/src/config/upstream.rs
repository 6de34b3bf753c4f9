//! Outbound HTTP settings shared by every upstream provider.

use serde::{Deserialize, Serialize};
use upstream_http::{RetryConfig, TransportConfig};

/// Upstream transport, retry and allow-list configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Extra allow-listed URL prefixes beyond the provider base URLs
    #[serde(default)]
    pub allowed_hosts: Vec<String>,

    /// Backoff between transport-level retries
    #[serde(default)]
    pub retry: RetryConfig,
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

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            user_agent: default_user_agent(),
            allowed_hosts: Vec::new(),
            retry: RetryConfig::default(),
        }
    }
}

impl UpstreamConfig {
    /// Transport settings for the shared HTTP client
    #[must_use]
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            timeout_secs: self.timeout_secs,
            connect_timeout_secs: self.connect_timeout_secs,
            user_agent: self.user_agent.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_carries_timeouts() {
        let config = UpstreamConfig {
            timeout_secs: 3,
            connect_timeout_secs: 1,
            ..Default::default()
        };

        let transport = config.transport();
        assert_eq!(transport.timeout_secs, 3);
        assert_eq!(transport.connect_timeout_secs, 1);
        assert!(transport.user_agent.starts_with("Waypoint/"));
    }
}
