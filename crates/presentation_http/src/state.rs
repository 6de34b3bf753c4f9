//! Application state shared across handlers

use std::fmt;
use std::sync::Arc;

use infrastructure::{AppConfig, Providers};
use integration_transit::{GeocodingService, TransitService};
use integration_weather::WeatherService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Weather provider
    pub weather: Arc<dyn WeatherService>,
    /// Transit provider
    pub transit: Arc<dyn TransitService>,
    /// Geocoding provider
    pub geocoding: Arc<dyn GeocodingService>,
    /// Application configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// State over the provider clients built from `config`
    #[must_use]
    pub fn new(providers: Providers, config: AppConfig) -> Self {
        Self {
            weather: providers.weather,
            transit: providers.transit,
            geocoding: providers.geocoding,
            config: Arc::new(config),
        }
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("environment", &self.config.environment)
            .finish_non_exhaustive()
    }
}
