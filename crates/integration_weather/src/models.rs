//! Weather data models
//!
//! The WMO condition table and the lenient shape of an Open-Meteo
//! `/forecast` response. Every field of the raw shape is optional so that
//! a provider omitting a series degrades to absent values, not to an error.

use std::collections::HashMap;

use serde::Deserialize;

/// Icon pair used when the condition code is not in the table
pub(crate) const UNKNOWN_ICONS: (&str, &str) = ("03d", "03n");

/// Code reported for unrecognized conditions
pub(crate) const UNKNOWN_CODE: i32 = -1;

/// Weather condition derived from WMO weather codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherCondition {
    /// Clear sky (WMO 0)
    ClearSky,
    /// Mainly clear (WMO 1)
    MainlyClear,
    /// Partly cloudy (WMO 2)
    PartlyCloudy,
    /// Overcast (WMO 3)
    Overcast,
    /// Fog (WMO 45)
    Fog,
    /// Depositing rime fog (WMO 48)
    RimeFog,
    /// Drizzle (WMO 51, 53, 55)
    Drizzle,
    /// Freezing drizzle (WMO 56, 57)
    FreezingDrizzle,
    /// Rain (WMO 61, 63, 65)
    Rain,
    /// Freezing rain (WMO 66, 67)
    FreezingRain,
    /// Snow (WMO 71, 73, 75)
    Snow,
    /// Snow grains (WMO 77)
    SnowGrains,
    /// Rain showers (WMO 80, 81, 82)
    RainShowers,
    /// Snow showers (WMO 85, 86)
    SnowShowers,
    /// Thunderstorm (WMO 95)
    Thunderstorm,
    /// Thunderstorm with hail (WMO 96, 99)
    ThunderstormWithHail,
    /// Unknown condition
    Unknown,
}

impl WeatherCondition {
    /// Convert WMO weather code to `WeatherCondition`
    ///
    /// See: <https://open-meteo.com/en/docs> for WMO code reference
    #[must_use]
    pub const fn from_wmo_code(code: i32) -> Self {
        match code {
            0 => Self::ClearSky,
            1 => Self::MainlyClear,
            2 => Self::PartlyCloudy,
            3 => Self::Overcast,
            45 => Self::Fog,
            48 => Self::RimeFog,
            51 | 53 | 55 => Self::Drizzle,
            56 | 57 => Self::FreezingDrizzle,
            61 | 63 | 65 => Self::Rain,
            66 | 67 => Self::FreezingRain,
            71 | 73 | 75 => Self::Snow,
            77 => Self::SnowGrains,
            80..=82 => Self::RainShowers,
            85 | 86 => Self::SnowShowers,
            95 => Self::Thunderstorm,
            96 | 99 => Self::ThunderstormWithHail,
            _ => Self::Unknown,
        }
    }

    /// Code to report for this condition, `-1` for unknown
    #[must_use]
    pub const fn code_or_unknown(self, code: i32) -> i32 {
        match self {
            Self::Unknown => UNKNOWN_CODE,
            _ => code,
        }
    }

    /// Get a human-readable description of the weather condition
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::ClearSky => "Clear sky",
            Self::MainlyClear => "Mainly clear",
            Self::PartlyCloudy => "Partly cloudy",
            Self::Overcast => "Overcast",
            Self::Fog => "Fog",
            Self::RimeFog => "Depositing rime fog",
            Self::Drizzle => "Drizzle",
            Self::FreezingDrizzle => "Freezing drizzle",
            Self::Rain => "Rain",
            Self::FreezingRain => "Freezing rain",
            Self::Snow => "Snow",
            Self::SnowGrains => "Snow grains",
            Self::RainShowers => "Rain showers",
            Self::SnowShowers => "Snow showers",
            Self::Thunderstorm => "Thunderstorm",
            Self::ThunderstormWithHail => "Thunderstorm with hail",
            Self::Unknown => "Unknown weather",
        }
    }

    /// Day and night icon identifiers
    #[must_use]
    pub const fn icons(self) -> (&'static str, &'static str) {
        match self {
            Self::ClearSky => ("01d", "01n"),
            Self::MainlyClear => ("02d", "02n"),
            Self::PartlyCloudy => ("03d", "03n"),
            Self::Overcast => ("04d", "04n"),
            Self::Fog | Self::RimeFog => ("50d", "50n"),
            Self::Drizzle | Self::FreezingDrizzle | Self::RainShowers => ("09d", "09n"),
            Self::Rain | Self::FreezingRain => ("10d", "10n"),
            Self::Snow | Self::SnowGrains | Self::SnowShowers => ("13d", "13n"),
            Self::Thunderstorm | Self::ThunderstormWithHail => ("11d", "11n"),
            Self::Unknown => UNKNOWN_ICONS,
        }
    }

    /// Icon for the given time of day
    #[must_use]
    pub const fn icon(self, is_day: bool) -> &'static str {
        let (day, night) = self.icons();
        if is_day { day } else { night }
    }
}

impl std::fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Unit labels keyed by series name
pub(crate) type Units = HashMap<String, String>;

/// Open-Meteo `/forecast` response, requested with `timeformat=unixtime`
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ForecastResponse {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
    pub utc_offset_seconds: Option<i64>,
    pub current: Option<CurrentBlock>,
    #[serde(default)]
    pub current_units: Units,
    pub daily: Option<DailyBlock>,
    #[serde(default)]
    pub daily_units: Units,
    pub hourly: Option<HourlyBlock>,
    #[serde(default)]
    pub hourly_units: Units,
}

impl ForecastResponse {
    pub fn offset(&self) -> i64 {
        self.utc_offset_seconds.unwrap_or(0)
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CurrentBlock {
    pub time: Option<i64>,
    pub temperature_2m: Option<f64>,
    pub weather_code: Option<i32>,
    pub wind_speed_10m: Option<f64>,
    pub precipitation: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DailyBlock {
    #[serde(default)]
    pub time: Vec<i64>,
    #[serde(default)]
    pub weather_code: Vec<Option<i32>>,
    #[serde(default)]
    pub temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    pub temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_sum: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_hours: Vec<Option<f64>>,
    #[serde(default)]
    pub sunrise: Vec<Option<i64>>,
    #[serde(default)]
    pub sunset: Vec<Option<i64>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct HourlyBlock {
    #[serde(default)]
    pub time: Vec<i64>,
    #[serde(default)]
    pub apparent_temperature: Vec<Option<f64>>,
    #[serde(default)]
    pub temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub wind_speed_10m: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation: Vec<Option<f64>>,
    #[serde(default)]
    pub weather_code: Vec<Option<i32>>,
}

/// Element `i` of an optional series
pub(crate) fn at<T: Copy>(series: &[Option<T>], i: usize) -> Option<T> {
    series.get(i).copied().flatten()
}
