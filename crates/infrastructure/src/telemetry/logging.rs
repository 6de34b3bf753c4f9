//! `tracing-subscriber` setup with env-filter and pretty or JSON output

use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Configuration for log output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "waypoint=debug,tower_http=info")
    ///
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Emit structured JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_log_filter() -> String {
    "info,tower_http=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Effective filter: `RUST_LOG` if set and valid, else the configured filter
    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_filter))
    }
}

/// Initialize the global subscriber
///
/// Fails if a global subscriber is already installed.
///
/// # Example
///
/// ```ignore
/// use infrastructure::telemetry::{LoggingConfig, init_logging};
///
/// init_logging(&LoggingConfig::default())?;
/// ```
pub fn init_logging(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let registry = tracing_subscriber::registry().with(config.env_filter());

    if config.json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true),
            )
            .try_init()
            .map_err(|e| TelemetryError::Init(e.to_string()))?;
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init()
            .map_err(|e| TelemetryError::Init(e.to_string()))?;
    }

    info!(json = config.json, filter = %config.log_filter, "Logging initialized");
    Ok(())
}

/// Error type for logging initialization
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to initialize tracing subscriber
    #[error("Failed to initialize tracing: {0}")]
    Init(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = LoggingConfig::default();
        assert_eq!(config.log_filter, "info,tower_http=info");
        assert!(!config.json);
    }

    #[test]
    fn test_config_json_default() {
        let parsed: LoggingConfig = serde_json::from_str(r#"{"log_filter": "debug"}"#).unwrap();
        assert_eq!(parsed.log_filter, "debug");
        assert!(!parsed.json);
    }

    #[test]
    fn test_second_init_fails() {
        let config = LoggingConfig {
            log_filter: "warn".to_string(),
            json: true,
        };
        let _ = init_logging(&config);
        let err = init_logging(&config).unwrap_err();
        assert!(err.to_string().starts_with("Failed to initialize tracing"));
    }
}
