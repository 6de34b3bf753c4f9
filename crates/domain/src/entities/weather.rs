//! Normalized weather DTOs
//!
//! Stable output shapes for current conditions, daily and hourly forecasts,
//! independent of the upstream provider's schema. Values the provider may
//! omit are `Option`s rather than zeroed.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A numeric reading together with its unit (e.g. `12.5 km/h`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// The reading
    pub value: f64,
    /// Unit as reported by the provider (e.g. `°C`, `mm`, `km/h`)
    pub unit: String,
}

impl Measurement {
    /// Create a new measurement
    #[must_use]
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }
}

impl std::fmt::Display for Measurement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1} {}", self.value, self.unit)
    }
}

/// Current conditions at a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// Latitude the provider resolved the request to
    pub latitude: f64,
    /// Longitude the provider resolved the request to
    pub longitude: f64,
    /// Timezone the provider used for local times, absent when not reported
    pub timezone: Option<String>,
    /// Observation instant
    pub time: DateTime<Utc>,
    /// Air temperature
    pub temperature: Option<Measurement>,
    /// Apparent temperature for the current hour
    pub feels_like: Option<Measurement>,
    /// Today's minimum temperature
    pub temperature_min: Option<Measurement>,
    /// Today's maximum temperature
    pub temperature_max: Option<Measurement>,
    /// Precipitation in the current interval
    pub precipitation: Option<Measurement>,
    /// Today's precipitation total
    pub precipitation_sum: Option<Measurement>,
    /// Wind speed
    pub wind_speed: Option<Measurement>,
    /// Today's sunrise
    pub sunrise: Option<DateTime<Utc>>,
    /// Today's sunset
    pub sunset: Option<DateTime<Utc>>,
    /// Whether the sun is up at `time`
    pub is_day: bool,
    /// WMO weather code (`-1` when unrecognized)
    pub weather_code: i32,
    /// Icon identifier, day or night variant
    pub icon: String,
    /// Human-readable condition
    pub description: String,
}

/// A single day of a daily forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// Calendar date in the location's timezone
    pub date: NaiveDate,
    /// WMO weather code (`-1` when unrecognized)
    pub weather_code: i32,
    /// Day-variant icon identifier
    pub icon: String,
    /// Human-readable condition
    pub description: String,
    /// Minimum temperature
    pub temperature_min: Option<Measurement>,
    /// Maximum temperature
    pub temperature_max: Option<Measurement>,
    /// Precipitation total
    pub precipitation_sum: Option<Measurement>,
    /// Hours with precipitation
    pub precipitation_hours: Option<Measurement>,
}

/// Daily forecast starting tomorrow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    /// Latitude the provider resolved the request to
    pub latitude: f64,
    /// Longitude the provider resolved the request to
    pub longitude: f64,
    /// Timezone the provider used for dates, absent when not reported
    pub timezone: Option<String>,
    /// One entry per forecast day
    pub days: Vec<ForecastDay>,
}

/// A single hour of an hourly forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastHour {
    /// Start of the hour
    pub timestamp: DateTime<Utc>,
    /// `timestamp` rendered in the requested display timezone
    pub local_time: String,
    /// Air temperature
    pub temperature: Option<Measurement>,
    /// Wind speed
    pub wind_speed: Option<Measurement>,
    /// Precipitation amount
    pub precipitation: Option<Measurement>,
    /// Whether the sun is up at `timestamp`
    pub is_day: bool,
    /// WMO weather code (`-1` when unrecognized)
    pub weather_code: i32,
    /// Icon identifier, day or night variant
    pub icon: String,
    /// Human-readable condition
    pub description: String,
}

/// Hourly forecast from the current hour up to a horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecast {
    /// Latitude the provider resolved the request to
    pub latitude: f64,
    /// Longitude the provider resolved the request to
    pub longitude: f64,
    /// Display timezone of `local_time` fields
    pub timezone: String,
    /// Retained hours, in upstream order
    pub hours: Vec<ForecastHour>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measurement_display() {
        let m = Measurement::new(12.49, "km/h");
        assert_eq!(m.to_string(), "12.5 km/h");
    }

    #[test]
    fn missing_measurements_serialize_as_null() {
        let day = ForecastDay {
            date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            weather_code: 3,
            icon: "04d".to_string(),
            description: "Overcast".to_string(),
            temperature_min: None,
            temperature_max: Some(Measurement::new(8.0, "°C")),
            precipitation_sum: None,
            precipitation_hours: None,
        };
        let json = serde_json::to_value(&day).unwrap();
        assert!(json["temperature_min"].is_null());
        assert_eq!(json["temperature_max"]["unit"], "°C");
        assert_eq!(json["date"], "2026-03-01");
    }
}
