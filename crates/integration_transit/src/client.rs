//! transport.rest (HAFAS) transit client

use async_trait::async_trait;
use domain::ServiceError;
use domain::entities::{Connection, Departure, Station};
use serde_json::Value;
use tracing::{debug, instrument, warn};
use upstream_http::{FetchClient, FetchOptions};
use url::Url;

use crate::config::TransitConfig;
use crate::normalize;

const STATIONS_FAILED: &str = "Failed to search stations";
const DEPARTURES_FAILED: &str = "Failed to fetch departures";
const CONNECTIONS_FAILED: &str = "Failed to search connections";

/// Transit operations exposed to the HTTP layer
#[async_trait]
pub trait TransitService: Send + Sync {
    /// Stations and stops matching a free-text query
    async fn search_stations(
        &self,
        query: &str,
        results: u32,
    ) -> Result<Vec<Station>, ServiceError>;

    /// Upcoming departures from a station within `duration_minutes`
    async fn departures(
        &self,
        station_id: &str,
        duration_minutes: u32,
        results: u32,
    ) -> Result<Vec<Departure>, ServiceError>;

    /// Connections between two stations
    async fn connections(
        &self,
        from: &str,
        to: &str,
        results: u32,
    ) -> Result<Vec<Connection>, ServiceError>;
}

/// HAFAS-based transit client using the transport.rest API
#[derive(Debug, Clone)]
pub struct HafasTransitClient {
    fetch: FetchClient,
    config: TransitConfig,
}

impl HafasTransitClient {
    /// Create a new transit client over a shared fetch client
    #[must_use]
    pub fn new(fetch: FetchClient, config: TransitConfig) -> Self {
        Self { fetch, config }
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &TransitConfig {
        &self.config
    }

    fn url(&self, path: &str, params: &[(&str, String)]) -> Result<String, ServiceError> {
        let endpoint = format!("{}{path}", self.config.base());
        Url::parse_with_params(&endpoint, params.iter().map(|(k, v)| (*k, v.as_str())))
            .map(String::from)
            .map_err(|e| ServiceError::internal("Invalid transit provider URL").with_cause(e))
    }

    /// URL for a station search
    pub(crate) fn stations_url(&self, query: &str, results: u32) -> Result<String, ServiceError> {
        self.url(
            "/locations",
            &[
                ("query", query.to_string()),
                ("results", results.to_string()),
                ("poi", "false".to_string()),
                ("addresses", "false".to_string()),
                ("language", self.config.language.clone()),
            ],
        )
    }

    /// URL for departures from a station
    pub(crate) fn departures_url(
        &self,
        station_id: &str,
        duration_minutes: u32,
        results: u32,
    ) -> Result<String, ServiceError> {
        let mut url = Url::parse(self.config.base())
            .map_err(|e| ServiceError::internal("Invalid transit provider URL").with_cause(e))?;
        url.path_segments_mut()
            .map_err(|()| ServiceError::internal("Invalid transit provider URL"))?
            .pop_if_empty()
            .extend(["stops", station_id, "departures"]);
        url.query_pairs_mut()
            .append_pair("duration", &duration_minutes.to_string())
            .append_pair("results", &results.to_string())
            .append_pair("language", &self.config.language);
        Ok(url.into())
    }

    /// URL for a connection search
    pub(crate) fn connections_url(
        &self,
        from: &str,
        to: &str,
        results: u32,
    ) -> Result<String, ServiceError> {
        self.url(
            "/journeys",
            &[
                ("from", from.to_string()),
                ("to", to.to_string()),
                ("results", results.to_string()),
                ("language", self.config.language.clone()),
            ],
        )
    }

    /// Fetch a URL and return the body of a 2xx response
    async fn fetch_body(&self, url: &str, failure: &'static str) -> Result<Value, ServiceError> {
        let options = FetchOptions::with_attempts(self.config.max_attempts)
            .deadline_ms(self.config.deadline_ms)
            .header("Accept", "application/json");
        let response = self
            .fetch
            .fetch_json(url, &options)
            .await
            .map_err(|e| ServiceError::internal(failure).with_cause(e))?;

        if response.ok {
            return Ok(response.body);
        }

        warn!(status = response.status, "Transit provider returned an error");
        if response.status == 400 {
            let reason = response.reason().unwrap_or(failure).to_string();
            return Err(ServiceError::bad_request(reason));
        }
        Err(ServiceError::internal(failure))
    }
}

fn limit(results: u32) -> usize {
    usize::try_from(results).unwrap_or(usize::MAX)
}

#[async_trait]
impl TransitService for HafasTransitClient {
    #[instrument(skip(self))]
    async fn search_stations(
        &self,
        query: &str,
        results: u32,
    ) -> Result<Vec<Station>, ServiceError> {
        let url = self.stations_url(query, results)?;
        debug!("Searching stations");

        let body = self.fetch_body(&url, STATIONS_FAILED).await?;
        normalize::stations(&body, limit(results))
    }

    #[instrument(skip(self))]
    async fn departures(
        &self,
        station_id: &str,
        duration_minutes: u32,
        results: u32,
    ) -> Result<Vec<Departure>, ServiceError> {
        let url = self.departures_url(station_id, duration_minutes, results)?;
        debug!("Fetching departures");

        let body = self.fetch_body(&url, DEPARTURES_FAILED).await?;
        normalize::departures(&body, limit(results))
    }

    #[instrument(skip(self))]
    async fn connections(
        &self,
        from: &str,
        to: &str,
        results: u32,
    ) -> Result<Vec<Connection>, ServiceError> {
        let url = self.connections_url(from, to, results)?;
        debug!("Searching connections");

        let body = self.fetch_body(&url, CONNECTIONS_FAILED).await?;
        normalize::connections(&body, limit(results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use upstream_http::{AllowList, RetryConfig, TransportConfig};

    fn client() -> HafasTransitClient {
        let config = TransitConfig::default();
        let allow_list = Arc::new(AllowList::new([config.base_url.as_str()]));
        let fetch =
            FetchClient::from_config(&TransportConfig::default(), allow_list, RetryConfig::immediate())
                .unwrap();
        HafasTransitClient::new(fetch, config)
    }

    fn pairs(url: &str) -> Vec<(String, String)> {
        Url::parse(url)
            .unwrap()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn test_stations_url_disables_poi_and_addresses() {
        let url = client().stations_url("Berlin Hbf", 10).unwrap();
        assert!(url.starts_with("https://v6.db.transport.rest/locations?"));
        assert!(url.contains("poi=false"));
        assert!(url.contains("addresses=false"));

        let pairs = pairs(&url);
        assert!(pairs.contains(&("query".to_string(), "Berlin Hbf".to_string())));
        assert!(pairs.contains(&("results".to_string(), "10".to_string())));
    }

    #[test]
    fn test_departures_url() {
        let url = client().departures_url("8011160", 120, 20).unwrap();
        assert!(url.starts_with("https://v6.db.transport.rest/stops/8011160/departures?"));
        assert!(url.contains("duration=120"));
        assert!(url.contains("results=20"));
    }

    #[test]
    fn test_departures_url_escapes_station_id() {
        let url = client().departures_url("../admin", 60, 5).unwrap();
        assert!(url.starts_with("https://v6.db.transport.rest/stops/..%2Fadmin/departures?"));
    }

    #[test]
    fn test_connections_url() {
        let url = client().connections_url("8011160", "8000261", 5).unwrap();
        let pairs = pairs(&url);
        assert!(pairs.contains(&("from".to_string(), "8011160".to_string())));
        assert!(pairs.contains(&("to".to_string(), "8000261".to_string())));
        assert!(pairs.contains(&("results".to_string(), "5".to_string())));
    }
}
