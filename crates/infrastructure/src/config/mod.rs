//! Application configuration
//!
//! Split into focused sub-modules:
//! - `server`: HTTP server settings
//! - `upstream`: outbound transport, retry and allow-list settings
//!
//! Provider settings (`weather`, `transit`, `geocoding`) reuse the config
//! types of their integration crates.

mod server;
mod upstream;

use std::fmt;

use integration_transit::{NominatimConfig, TransitConfig};
use integration_weather::WeatherConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;
use upstream_http::AllowList;
use url::Url;

pub use server::ServerConfig;
pub use upstream::UpstreamConfig;

use crate::telemetry::LoggingConfig;

/// Prefix for environment overrides, e.g. `WAYPOINT__SERVER__PORT=8080`
pub const ENV_PREFIX: &str = "WAYPOINT";

/// Separator between prefix and nested keys in environment overrides
pub const ENV_SEPARATOR: &str = "__";

/// Error type for configuration loading and validation
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Sources could not be read or deserialized
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A loaded value is unusable
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Application environment (development or production)
///
/// Production refuses `server.expose_error_details`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment
    #[default]
    Development,
    /// Production environment
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(format!(
                "Invalid environment: {s}. Use 'development' or 'production'"
            )),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development or production)
    #[serde(default)]
    pub environment: Environment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Log filter and format
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Outbound HTTP configuration
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Open-Meteo weather provider
    #[serde(default)]
    pub weather: WeatherConfig,

    /// transport.rest transit provider
    #[serde(default)]
    pub transit: TransitConfig,

    /// Nominatim geocoding provider
    #[serde(default)]
    pub geocoding: NominatimConfig,
}

type Builder = config::ConfigBuilder<config::builder::DefaultState>;

impl AppConfig {
    fn defaults() -> Result<Builder, config::ConfigError> {
        let server = ServerConfig::default();
        config::Config::builder()
            .set_default("server.host", server.host)?
            .set_default("server.port", server.port)
    }

    fn env_source() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR)
            .list_separator(",")
            .with_list_parse_key("upstream.allowed_hosts")
            .with_list_parse_key("server.allowed_origins")
            .try_parsing(true)
    }

    /// Load configuration from environment and optional file
    ///
    /// Layers, lowest precedence first: built-in defaults, `config.toml` in
    /// the working directory (if present), `WAYPOINT__*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = Self::defaults()?
            .add_source(config::File::with_name("config").required(false))
            .add_source(Self::env_source())
            .build()?;

        let app: Self = config.try_deserialize()?;
        debug!(environment = %app.environment, "Configuration loaded");
        Ok(app)
    }

    /// Load configuration from a TOML document layered over the defaults
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let config = Self::defaults()?
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Whether the service runs in production mode
    #[must_use]
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Allow-list of every configured upstream base URL plus extra hosts
    #[must_use]
    pub fn allow_list(&self) -> AllowList {
        AllowList::new(
            [
                self.weather.base_url.as_str(),
                self.weather.icon_base_url.as_str(),
                self.transit.base_url.as_str(),
                self.geocoding.base_url.as_str(),
            ]
            .into_iter()
            .chain(self.upstream.allowed_hosts.iter().map(String::as_str)),
        )
    }

    /// Reject configurations the server cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let urls = [
            ("weather.base_url", &self.weather.base_url),
            ("weather.icon_base_url", &self.weather.icon_base_url),
            ("transit.base_url", &self.transit.base_url),
            ("geocoding.base_url", &self.geocoding.base_url),
        ];
        for (key, value) in urls {
            check_http_url(key, value)?;
        }
        for host in &self.upstream.allowed_hosts {
            check_http_url("upstream.allowed_hosts", host)?;
        }

        if self.upstream.timeout_secs == 0 {
            return Err(invalid("upstream.timeout_secs must be greater than 0"));
        }
        if self.upstream.connect_timeout_secs == 0 {
            return Err(invalid("upstream.connect_timeout_secs must be greater than 0"));
        }
        if self.upstream.retry.multiplier < 1.0 {
            return Err(invalid("upstream.retry.multiplier must be at least 1.0"));
        }
        if !(0.0..=1.0).contains(&self.upstream.retry.jitter_factor) {
            return Err(invalid("upstream.retry.jitter_factor must be within 0.0..=1.0"));
        }

        if self.is_production() && self.server.expose_error_details {
            return Err(invalid(
                "server.expose_error_details must be false in production",
            ));
        }

        self.transit.validate().map_err(ConfigError::Invalid)?;
        Ok(())
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Invalid(message.to_string())
}

fn check_http_url(key: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{key} must not be empty")));
    }
    let url = Url::parse(value)
        .map_err(|e| ConfigError::Invalid(format!("{key} is not a valid URL ({value}): {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid(format!(
            "{key} must use http or https ({value})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_default() {
        let env = Environment::default();
        assert_eq!(env, Environment::Development);
    }

    #[test]
    fn test_environment_display() {
        assert_eq!(format!("{}", Environment::Development), "development");
        assert_eq!(format!("{}", Environment::Production), "production");
    }

    #[test]
    fn test_environment_from_str() {
        assert_eq!(
            "prod".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert_eq!(
            "DEVELOPMENT".parse::<Environment>().unwrap(),
            Environment::Development
        );
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.is_production());
    }

    #[test]
    fn test_allow_list_contains_every_provider() {
        let config = AppConfig::default();
        let allow_list = config.allow_list();

        assert!(allow_list.is_allowed("https://api.open-meteo.com/v1/forecast?latitude=1"));
        assert!(allow_list.is_allowed("https://openweathermap.org/img/wn/01d@2x.png"));
        assert!(allow_list.is_allowed("https://v6.db.transport.rest/journeys?from=1&to=2"));
        assert!(allow_list.is_allowed("https://nominatim.openstreetmap.org/search?q=x"));
        assert!(!allow_list.is_allowed("https://example.com/"));
    }

    #[test]
    fn test_allow_list_includes_extra_hosts() {
        let mut config = AppConfig::default();
        config.upstream.allowed_hosts = vec!["https://example.com/api".to_string()];

        assert!(config.allow_list().is_allowed("https://example.com/api/v1"));
        assert!(!config.allow_list().is_allowed("https://example.com/other"));
    }

    #[test]
    fn test_validate_rejects_empty_base_url() {
        let mut config = AppConfig::default();
        config.weather.base_url = String::new();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("weather.base_url"));
    }

    #[test]
    fn test_validate_rejects_non_http_host() {
        let mut config = AppConfig::default();
        config.upstream.allowed_hosts = vec!["ftp://files.example.com".to_string()];

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = AppConfig::default();
        config.upstream.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_toml_layers_over_defaults() {
        let config = AppConfig::from_toml(
            r#"
            environment = "production"

            [server]
            port = 8080

            [logging]
            json = true

            [upstream]
            timeout_secs = 4
            allowed_hosts = ["https://example.com"]

            [upstream.retry]
            jitter_enabled = false

            [weather]
            temperature_unit = "fahrenheit"

            [geocoding]
            country_filter = "de"
            "#,
        )
        .unwrap();

        assert!(config.is_production());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(!config.server.expose_error_details);
        assert!(config.logging.json);
        assert_eq!(config.upstream.timeout_secs, 4);
        assert_eq!(config.upstream.allowed_hosts, ["https://example.com"]);
        assert!(!config.upstream.retry.jitter_enabled);
        assert_eq!(config.weather.temperature_unit, "fahrenheit");
        assert_eq!(config.geocoding.country_filter, "de");
        assert_eq!(config.transit.base_url, "https://v6.db.transport.rest");
    }

    #[test]
    fn test_from_toml_empty_matches_server_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        let defaults = ServerConfig::default();

        assert_eq!(config.server.bind_address(), defaults.bind_address());
        assert!(!config.server.expose_error_details);
    }

    #[test]
    fn test_error_details_are_opt_in() {
        let config = AppConfig::from_toml(
            r#"
            [server]
            expose_error_details = true
            "#,
        )
        .unwrap();

        assert!(!config.is_production());
        assert!(config.server.expose_error_details);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_error_details_in_production() {
        let mut config = AppConfig::default();
        config.environment = Environment::Production;
        config.server.expose_error_details = true;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.expose_error_details"));

        config.server.expose_error_details = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_rejects_unknown_environment() {
        let result = AppConfig::from_toml(r#"environment = "staging""#);
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = AppConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.server.port, config.server.port);
        assert_eq!(parsed.weather.base_url, config.weather.base_url);
    }
}
