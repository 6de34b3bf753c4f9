//! Open-Meteo weather integration
//!
//! Client for the Open-Meteo Weather API (<https://open-meteo.com>) that
//! normalizes current conditions, daily and hourly forecasts into the
//! provider-independent DTOs in `domain::entities`. Condition icons are
//! proxied from the OpenWeatherMap icon set.

pub mod client;
pub mod config;
mod models;
pub mod normalize;

pub use client::{OpenMeteoClient, WeatherService};
pub use config::WeatherConfig;
pub use models::WeatherCondition;
pub use normalize::sun_is_currently_up;
