//! Weather provider configuration

use serde::{Deserialize, Serialize};

/// Open-Meteo settings and unit defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Open-Meteo API base URL (default: <https://api.open-meteo.com/v1>)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Icon base URL (default: <https://openweathermap.org/img/wn>)
    #[serde(default = "default_icon_base_url")]
    pub icon_base_url: String,

    /// `celsius` or `fahrenheit` (default: celsius)
    #[serde(default = "default_temperature_unit")]
    pub temperature_unit: String,

    /// `kmh`, `ms`, `mph` or `kn` (default: kmh)
    #[serde(default = "default_wind_speed_unit")]
    pub wind_speed_unit: String,

    /// `mm` or `inch` (default: mm)
    #[serde(default = "default_precipitation_unit")]
    pub precipitation_unit: String,

    /// Transport attempts per upstream call (default: 2)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Upper bound for one upstream call, retries included (0: none)
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,
}

fn default_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_icon_base_url() -> String {
    "https://openweathermap.org/img/wn".to_string()
}

fn default_temperature_unit() -> String {
    "celsius".to_string()
}

fn default_wind_speed_unit() -> String {
    "kmh".to_string()
}

fn default_precipitation_unit() -> String {
    "mm".to_string()
}

const fn default_max_attempts() -> u32 {
    2
}

const fn default_deadline_ms() -> u64 {
    25_000
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            icon_base_url: default_icon_base_url(),
            temperature_unit: default_temperature_unit(),
            wind_speed_unit: default_wind_speed_unit(),
            precipitation_unit: default_precipitation_unit(),
            max_attempts: default_max_attempts(),
            deadline_ms: default_deadline_ms(),
        }
    }
}

impl WeatherConfig {
    /// Base URL without a trailing slash
    #[must_use]
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Icon base URL without a trailing slash
    #[must_use]
    pub fn icon_base(&self) -> &str {
        self.icon_base_url.trim_end_matches('/')
    }

    /// Display label for the configured temperature unit
    #[must_use]
    pub fn temperature_label(&self) -> &str {
        match self.temperature_unit.as_str() {
            "fahrenheit" => "°F",
            _ => "°C",
        }
    }

    /// Display label for the configured wind speed unit
    #[must_use]
    pub fn wind_speed_label(&self) -> &str {
        match self.wind_speed_unit.as_str() {
            "ms" => "m/s",
            "mph" => "mp/h",
            "kn" => "kn",
            _ => "km/h",
        }
    }

    /// Display label for the configured precipitation unit
    #[must_use]
    pub fn precipitation_label(&self) -> &str {
        match self.precipitation_unit.as_str() {
            "inch" => "inch",
            _ => "mm",
        }
    }
}
