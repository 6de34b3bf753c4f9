//! Infrastructure layer - configuration, logging and provider wiring
//!
//! Loads [`AppConfig`] from file and environment, installs the global
//! `tracing` subscriber, and builds the upstream provider clients.

pub mod config;
pub mod providers;
pub mod telemetry;

pub use config::{AppConfig, ConfigError, Environment, ServerConfig, UpstreamConfig};
pub use providers::Providers;
pub use telemetry::{LoggingConfig, TelemetryError, init_logging};
