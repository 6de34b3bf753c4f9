//! Transit service configuration

use serde::{Deserialize, Serialize};

/// Configuration for the public transit service (transport.rest / HAFAS)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitConfig {
    /// Base URL for the transport.rest API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Transport attempts per upstream call
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Language for station names and remarks
    #[serde(default = "default_language")]
    pub language: String,

    /// Upper bound for one upstream call, retries included (0: none)
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,
}

fn default_base_url() -> String {
    "https://v6.db.transport.rest".to_string()
}

const fn default_max_attempts() -> u32 {
    2
}

fn default_language() -> String {
    "en".to_string()
}

const fn default_deadline_ms() -> u64 {
    25_000
}

impl Default for TransitConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            max_attempts: default_max_attempts(),
            language: default_language(),
            deadline_ms: default_deadline_ms(),
        }
    }
}

impl TransitConfig {
    /// Create a configuration suitable for testing
    #[must_use]
    pub fn for_testing(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Base URL without a trailing slash
    #[must_use]
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("transit.base_url must not be empty".to_string());
        }

        if self.max_attempts == 0 {
            return Err("transit.max_attempts must be greater than 0".to_string());
        }

        Ok(())
    }
}
