//! Upstream provider wiring
//!
//! Builds one shared [`FetchClient`] from [`AppConfig`] and hands it to each
//! provider client. The allow-list is built once here and never changes.

use std::fmt;
use std::sync::Arc;

use integration_transit::{GeocodingService, HafasTransitClient, NominatimClient, TransitService};
use integration_weather::{OpenMeteoClient, WeatherService};
use tracing::info;
use upstream_http::{FetchClient, FetchError};

use crate::config::AppConfig;

/// Provider clients behind their service traits
#[derive(Clone)]
pub struct Providers {
    /// Open-Meteo weather and icon proxy
    pub weather: Arc<dyn WeatherService>,
    /// transport.rest stations, departures and journeys
    pub transit: Arc<dyn TransitService>,
    /// Nominatim place search
    pub geocoding: Arc<dyn GeocodingService>,
}

impl fmt::Debug for Providers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Providers")
            .field("weather", &"OpenMeteoClient")
            .field("transit", &"HafasTransitClient")
            .field("geocoding", &"NominatimClient")
            .finish()
    }
}

impl Providers {
    /// Build every provider client from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize.
    pub fn from_config(config: &AppConfig) -> Result<Self, FetchError> {
        let allow_list = Arc::new(config.allow_list());
        info!(allow_list = %allow_list, "Upstream allow-list");

        let fetch = FetchClient::from_config(
            &config.upstream.transport(),
            allow_list,
            config.upstream.retry.clone(),
        )?;

        Ok(Self {
            weather: Arc::new(OpenMeteoClient::new(fetch.clone(), config.weather.clone())),
            transit: Arc::new(HafasTransitClient::new(fetch.clone(), config.transit.clone())),
            geocoding: Arc::new(NominatimClient::new(fetch, config.geocoding.clone())),
        })
    }
}
