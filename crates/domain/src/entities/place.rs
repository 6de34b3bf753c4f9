//! Geocoded place DTO

use serde::{Deserialize, Serialize};

/// A place resolved from a free-text address search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Full display name as returned by the geocoder
    pub display_name: String,
    /// Latitude coordinate
    pub latitude: f64,
    /// Longitude coordinate
    pub longitude: f64,
    /// Place category (e.g. "railway", "boundary")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Place type within the category (e.g. "station", "city")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}
