//! Normalized transit DTOs
//!
//! Stations, departures and connections as returned to callers. Delays are
//! kept in seconds; minutes are only derived for display.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fallback used when the provider gives no line name or direction
pub const UNKNOWN: &str = "Unknown";

/// Kind of a transit location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StationKind {
    /// A station grouping several stops
    Station,
    /// A single stop or platform
    Stop,
}

impl StationKind {
    /// Map the provider's `type` field; anything else is not a station
    #[must_use]
    pub fn from_type(kind: &str) -> Option<Self> {
        match kind {
            "station" => Some(Self::Station),
            "stop" => Some(Self::Stop),
            _ => None,
        }
    }
}

/// A transit station or stop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// Provider identifier (e.g. an IBNR number)
    pub id: String,
    /// Display name
    pub name: String,
    /// Station or stop
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<StationKind>,
    /// Latitude coordinate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Longitude coordinate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl Station {
    /// Create a station without coordinates
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: None,
            latitude: None,
            longitude: None,
        }
    }

    /// Attach coordinates
    #[must_use]
    pub fn with_coords(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Line metadata for a departure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// Display name (e.g. "ICE 1601", "S5"), `Unknown` when absent
    pub name: String,
    /// Product type (e.g. "nationalExpress", "suburban")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    /// Transport mode (e.g. "train", "bus")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

/// A departure from a station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Departure {
    /// Trip identifier, from the refresh token or synthesized
    pub trip_id: String,
    /// Stop the departure leaves from
    pub origin: Station,
    /// Scheduled departure (falls back to the actual time)
    pub planned_time: Option<DateTime<Utc>>,
    /// Real-time departure
    pub actual_time: Option<DateTime<Utc>>,
    /// Delay in seconds; absent when unknown
    pub delay_seconds: Option<i64>,
    /// Scheduled platform (falls back to the actual platform)
    pub platform: Option<String>,
    /// Real-time platform
    pub actual_platform: Option<String>,
    /// Line metadata
    pub line: Line,
    /// Direction, never empty
    pub direction: String,
}

/// A connection between two stations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// Name of the first leg's origin, absent when upstream omits it
    pub origin: Option<String>,
    /// Name of the last leg's destination, absent when upstream omits it
    pub destination: Option<String>,
    /// Scheduled departure of the first leg
    pub departure: Option<DateTime<Utc>>,
    /// Scheduled arrival of the last leg
    pub arrival: Option<DateTime<Utc>>,
    /// Whole minutes between departure and arrival, may be negative
    pub duration_minutes: Option<i64>,
    /// Departure platform of the first leg
    pub departure_platform: Option<String>,
    /// Arrival platform of the last leg
    pub arrival_platform: Option<String>,
    /// Departure delay of the first leg in seconds
    pub departure_delay_seconds: Option<i64>,
    /// Arrival delay of the last leg in seconds
    pub arrival_delay_seconds: Option<i64>,
    /// Line name of the first leg, `Unknown` when absent
    pub line_name: String,
    /// Direction of the first leg, else the final destination
    pub direction: Option<String>,
    /// Number of changes between vehicles
    pub transfers: u32,
    /// Number of legs including walks
    pub legs: u32,
}
