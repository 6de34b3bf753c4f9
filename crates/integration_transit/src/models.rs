//! Raw transport.rest response shapes
//!
//! Every field is optional. A journey or location that does not fit these
//! shapes at all is skipped by the normalizer rather than failing the
//! whole response.

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawJourney {
    #[serde(default)]
    pub legs: Vec<RawLeg>,
    pub refresh_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawLeg {
    pub origin: Option<RawStop>,
    pub destination: Option<RawStop>,
    pub departure: Option<DateTime<Utc>>,
    pub planned_departure: Option<DateTime<Utc>>,
    pub arrival: Option<DateTime<Utc>>,
    pub planned_arrival: Option<DateTime<Utc>>,
    pub departure_delay: Option<i64>,
    pub arrival_delay: Option<i64>,
    pub departure_platform: Option<String>,
    pub planned_departure_platform: Option<String>,
    pub arrival_platform: Option<String>,
    pub planned_arrival_platform: Option<String>,
    pub direction: Option<String>,
    pub line: Option<RawLine>,
    pub walking: Option<bool>,
}

impl RawLeg {
    pub fn is_walking(&self) -> bool {
        self.walking.unwrap_or(false)
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawStop {
    pub id: Option<String>,
    pub name: Option<String>,
    pub location: Option<RawCoordinates>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawLocation {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub location: Option<RawCoordinates>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawCoordinates {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl RawCoordinates {
    pub fn pair(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawLine {
    pub name: Option<String>,
    pub product: Option<String>,
    pub mode: Option<String>,
}

/// Nominatim `search?format=jsonv2` result
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawPlace {
    pub display_name: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// A string field that is present and not blank
pub(crate) fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.trim().is_empty())
}
