//! Nominatim place search
//!
//! Resolves free-text queries to places using the
//! [Nominatim](https://nominatim.openstreetmap.org) API (OpenStreetMap).
//!
//! Requests are spaced at least `min_interval_ms` apart, per the Nominatim
//! usage policy of at most one request per second.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use domain::ServiceError;
use domain::entities::Place;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};
use upstream_http::{FetchClient, FetchOptions};
use url::Url;

use crate::normalize;

const SEARCH_FAILED: &str = "Failed to search places";

/// Configuration for the Nominatim geocoding service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NominatimConfig {
    /// Base URL for the Nominatim API
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,

    /// Country code filter applied when the caller gives none (empty: any)
    #[serde(default)]
    pub country_filter: String,

    /// Minimum spacing between requests in milliseconds
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,

    /// Preferred result languages
    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    /// Transport attempts per upstream call
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Upper bound for one upstream call, retries included (0: none)
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,
}

fn default_geocoding_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

const fn default_min_interval_ms() -> u64 {
    1_100
}

fn default_accept_language() -> String {
    "en".to_string()
}

const fn default_max_attempts() -> u32 {
    1
}

const fn default_deadline_ms() -> u64 {
    15_000
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_base_url(),
            country_filter: String::new(),
            min_interval_ms: default_min_interval_ms(),
            accept_language: default_accept_language(),
            max_attempts: default_max_attempts(),
            deadline_ms: default_deadline_ms(),
        }
    }
}

impl NominatimConfig {
    /// Create a configuration suitable for testing
    #[must_use]
    pub fn for_testing(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            min_interval_ms: 0,
            ..Default::default()
        }
    }

    /// Base URL without a trailing slash
    #[must_use]
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

/// Place search exposed to the HTTP layer
#[async_trait]
pub trait GeocodingService: Send + Sync {
    /// Places matching `query`, optionally restricted to a country code
    async fn search(
        &self,
        query: &str,
        limit: u32,
        country: Option<&str>,
    ) -> Result<Vec<Place>, ServiceError>;
}

/// Nominatim-based geocoding client with request spacing
#[derive(Debug, Clone)]
pub struct NominatimClient {
    fetch: FetchClient,
    config: NominatimConfig,
    last_request: Arc<Mutex<Option<Instant>>>,
}

impl NominatimClient {
    /// Create a new Nominatim client over a shared fetch client
    #[must_use]
    pub fn new(fetch: FetchClient, config: NominatimConfig) -> Self {
        Self {
            fetch,
            config,
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// Wait until the minimum request spacing has elapsed
    async fn rate_limit(&self) {
        let min_interval = Duration::from_millis(self.config.min_interval_ms);
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < min_interval {
                let wait = min_interval.saturating_sub(elapsed);
                debug!(?wait, "Rate limiting geocoding request");
                tokio::time::sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// URL for a place search
    pub(crate) fn search_url(
        &self,
        query: &str,
        limit: u32,
        country: Option<&str>,
    ) -> Result<String, ServiceError> {
        let mut params = vec![
            ("q", query.to_string()),
            ("format", "jsonv2".to_string()),
            ("limit", limit.to_string()),
            ("accept-language", self.config.accept_language.clone()),
        ];

        let country = country
            .map(str::to_ascii_lowercase)
            .or_else(|| Some(self.config.country_filter.clone()).filter(|c| !c.is_empty()));
        if let Some(country) = country {
            params.push(("countrycodes", country));
        }

        let endpoint = format!("{}/search", self.config.base());
        Url::parse_with_params(&endpoint, params.iter().map(|(k, v)| (*k, v.as_str())))
            .map(String::from)
            .map_err(|e| ServiceError::internal("Invalid geocoding provider URL").with_cause(e))
    }
}

#[async_trait]
impl GeocodingService for NominatimClient {
    #[instrument(skip(self))]
    async fn search(
        &self,
        query: &str,
        limit: u32,
        country: Option<&str>,
    ) -> Result<Vec<Place>, ServiceError> {
        let url = self.search_url(query.trim(), limit, country)?;

        self.rate_limit().await;

        // Queries are often home addresses; log the endpoint only
        let options = FetchOptions::with_attempts(self.config.max_attempts)
            .deadline_ms(self.config.deadline_ms)
            .header("Accept", "application/json")
            .display_url(format!("{}/search", self.config.base()));
        let response = self
            .fetch
            .fetch_json(&url, &options)
            .await
            .map_err(|e| ServiceError::internal(SEARCH_FAILED).with_cause(e))?;

        if !response.ok {
            warn!(status = response.status, "Geocoding provider returned an error");
            if response.status == 400 {
                let reason = response.reason().unwrap_or(SEARCH_FAILED).to_string();
                return Err(ServiceError::bad_request(reason));
            }
            return Err(ServiceError::internal(SEARCH_FAILED));
        }

        let places = normalize::places(&response.body)?;
        debug!(count = places.len(), "Geocoded query");
        Ok(places)
    }
}
