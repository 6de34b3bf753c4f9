//! Public transit integration for Waypoint
//!
//! Station search, departures and connections via the
//! [transport.rest](https://v6.db.transport.rest) API (HAFAS-based, covering
//! German public transit), and place search via
//! [Nominatim/OpenStreetMap](https://nominatim.openstreetmap.org).
//!
//! # Architecture
//!
//! [`TransitService`] is implemented by [`HafasTransitClient`] and
//! [`GeocodingService`] by [`NominatimClient`]. Both issue requests
//! through the shared allow-listed `upstream_http::FetchClient` and
//! convert the provider's JSON into the DTOs in `domain::entities`.
//!
//! # Example
//!
//! ```rust,ignore
//! use integration_transit::{HafasTransitClient, TransitConfig, TransitService};
//!
//! let client = HafasTransitClient::new(fetch, TransitConfig::default());
//! let stations = client.search_stations("Berlin Hbf", 5).await?;
//! ```

mod client;
mod config;
mod geocoding;
mod models;
mod normalize;

pub use client::{HafasTransitClient, TransitService};
pub use config::TransitConfig;
pub use geocoding::{GeocodingService, NominatimClient, NominatimConfig};
pub use normalize::duration_minutes;
