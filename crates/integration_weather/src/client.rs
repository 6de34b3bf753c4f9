//! Open-Meteo weather client
//!
//! Builds `/forecast` URLs, fetches them through the allow-listed
//! [`FetchClient`] and normalizes the result.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Utc};
use domain::entities::{CurrentConditions, DailyForecast, HourlyForecast};
use domain::{GeoLocation, ServiceError, Timezone};
use serde_json::Value;
use tracing::{debug, instrument, warn};
use upstream_http::{FetchClient, FetchOptions, UpstreamResponse};
use url::Url;

use crate::config::WeatherConfig;
use crate::models::ForecastResponse;
use crate::normalize::{self, UNEXPECTED_RESPONSE, forecast_window};

const CURRENT_FAILED: &str = "Failed to fetch current weather";
const DAILY_FAILED: &str = "Failed to fetch weather forecast";
const HOURLY_FAILED: &str = "Failed to fetch hourly weather forecast";
const ICON_FAILED: &str = "Failed to fetch weather icon";

/// Weather operations exposed to the HTTP layer
///
/// A `timezone` of `None` lets the provider pick the zone from the
/// coordinates.
#[async_trait]
pub trait WeatherService: Send + Sync {
    /// Current conditions with today's extremes and sun times
    async fn current(
        &self,
        location: GeoLocation,
        timezone: Option<Timezone>,
    ) -> Result<CurrentConditions, ServiceError>;

    /// Daily forecast for the `days` days after today
    async fn daily(
        &self,
        location: GeoLocation,
        timezone: Option<Timezone>,
        days: u8,
    ) -> Result<DailyForecast, ServiceError>;

    /// Hourly forecast from the current hour up to `hours` ahead
    ///
    /// The current hour counts even when partly over, so up to `hours + 1`
    /// entries come back.
    async fn hourly(
        &self,
        location: GeoLocation,
        timezone: Option<Timezone>,
        hours: u32,
        display_tz: Timezone,
    ) -> Result<HourlyForecast, ServiceError>;

    /// PNG bytes for a condition icon such as `10d`
    async fn icon(&self, icon: &str) -> Result<Bytes, ServiceError>;
}

/// Open-Meteo implementation of [`WeatherService`]
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    fetch: FetchClient,
    config: WeatherConfig,
    clock: fn() -> DateTime<Utc>,
}

impl OpenMeteoClient {
    /// Create a client over a shared fetch client
    #[must_use]
    pub fn new(fetch: FetchClient, config: WeatherConfig) -> Self {
        Self {
            fetch,
            config,
            clock: Utc::now,
        }
    }

    /// Replace the clock used for forecast windows
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &WeatherConfig {
        &self.config
    }

    fn options(&self, accept: &'static str) -> FetchOptions {
        FetchOptions::with_attempts(self.config.max_attempts)
            .deadline_ms(self.config.deadline_ms)
            .header("Accept", accept)
    }

    /// Query pairs shared by every forecast request
    fn base_params(
        location: GeoLocation,
        timezone: Option<Timezone>,
        config: &WeatherConfig,
    ) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", location.latitude().to_string()),
            ("longitude", location.longitude().to_string()),
            (
                "timezone",
                timezone.map_or_else(|| "auto".to_string(), |tz| tz.to_string()),
            ),
            ("temperature_unit", config.temperature_unit.clone()),
            ("wind_speed_unit", config.wind_speed_unit.clone()),
            ("precipitation_unit", config.precipitation_unit.clone()),
            ("timeformat", "unixtime".to_string()),
        ]
    }

    fn forecast_url(&self, params: &[(&'static str, String)]) -> Result<String, ServiceError> {
        let endpoint = format!("{}/forecast", self.config.base());
        Url::parse_with_params(&endpoint, params.iter().map(|(k, v)| (*k, v.as_str())))
            .map(String::from)
            .map_err(|e| ServiceError::internal("Invalid weather provider URL").with_cause(e))
    }

    /// URL for current conditions
    pub(crate) fn current_url(
        &self,
        location: GeoLocation,
        timezone: Option<Timezone>,
    ) -> Result<String, ServiceError> {
        let mut params = Self::base_params(location, timezone, &self.config);
        params.extend([
            (
                "current",
                "temperature_2m,weather_code,wind_speed_10m,precipitation".to_string(),
            ),
            (
                "daily",
                "temperature_2m_max,temperature_2m_min,precipitation_sum,sunrise,sunset"
                    .to_string(),
            ),
            ("hourly", "apparent_temperature".to_string()),
            ("forecast_days", "1".to_string()),
        ]);
        self.forecast_url(&params)
    }

    /// URL for a daily forecast over an explicit date range
    pub(crate) fn daily_url(
        &self,
        location: GeoLocation,
        timezone: Option<Timezone>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<String, ServiceError> {
        let mut params = Self::base_params(location, timezone, &self.config);
        params.extend([
            (
                "daily",
                "weather_code,temperature_2m_max,temperature_2m_min,precipitation_sum,\
                 precipitation_hours"
                    .to_string(),
            ),
            ("start_date", start.format("%Y-%m-%d").to_string()),
            ("end_date", end.format("%Y-%m-%d").to_string()),
        ]);
        self.forecast_url(&params)
    }

    /// URL for a two-day hourly forecast
    pub(crate) fn hourly_url(
        &self,
        location: GeoLocation,
        timezone: Option<Timezone>,
    ) -> Result<String, ServiceError> {
        let mut params = Self::base_params(location, timezone, &self.config);
        params.extend([
            (
                "hourly",
                "temperature_2m,wind_speed_10m,precipitation,weather_code".to_string(),
            ),
            ("daily", "sunrise,sunset".to_string()),
            ("forecast_days", "2".to_string()),
        ]);
        self.forecast_url(&params)
    }

    /// URL for a condition icon
    pub(crate) fn icon_url(&self, icon: &str) -> String {
        format!("{}/{icon}@2x.png", self.config.icon_base())
    }

    /// Fetch a forecast URL and decode the lenient response shape
    async fn fetch_forecast(
        &self,
        url: &str,
        failure: &'static str,
    ) -> Result<ForecastResponse, ServiceError> {
        // Coordinates locate the caller; keep them out of the logs
        let options = self
            .options("application/json")
            .display_url(format!("{}/forecast", self.config.base()));

        let response = self
            .fetch
            .fetch_json(url, &options)
            .await
            .map_err(|e| ServiceError::internal(failure).with_cause(e))?;

        let body = check_status(response, failure)?;
        serde_json::from_value(body)
            .map_err(|e| ServiceError::internal(UNEXPECTED_RESPONSE).with_cause(e))
    }
}

/// Map a non-2xx envelope to a categorized error, or hand back the body
///
/// An upstream 400 means the caller's parameters were rejected, so the
/// provider's reason is passed on. Everything else is our failure.
fn check_status(
    response: UpstreamResponse<Value>,
    failure: &'static str,
) -> Result<Value, ServiceError> {
    if response.ok {
        return Ok(response.body);
    }

    warn!(status = response.status, "Weather provider returned an error");
    if response.status == 400 {
        let reason = response.reason().unwrap_or(failure).to_string();
        return Err(ServiceError::bad_request(reason));
    }
    Err(ServiceError::internal(failure))
}

/// Whether `icon` looks like `NN[dn]`
fn is_icon_id(icon: &str) -> bool {
    let bytes = icon.as_bytes();
    bytes.len() == 3
        && bytes[0].is_ascii_digit()
        && bytes[1].is_ascii_digit()
        && matches!(bytes[2], b'd' | b'n')
}

#[async_trait]
impl WeatherService for OpenMeteoClient {
    #[instrument(skip(self), fields(lat = %location.latitude(), lon = %location.longitude()))]
    async fn current(
        &self,
        location: GeoLocation,
        timezone: Option<Timezone>,
    ) -> Result<CurrentConditions, ServiceError> {
        let url = self.current_url(location, timezone)?;
        debug!("Fetching current weather");

        let response = self.fetch_forecast(&url, CURRENT_FAILED).await?;
        normalize::current_conditions(&response, &self.config)
    }

    #[instrument(skip(self), fields(lat = %location.latitude(), lon = %location.longitude()))]
    async fn daily(
        &self,
        location: GeoLocation,
        timezone: Option<Timezone>,
        days: u8,
    ) -> Result<DailyForecast, ServiceError> {
        let now = (self.clock)();
        let today = timezone.map_or_else(
            || now.date_naive(),
            |tz| now.with_timezone(&tz.tz()).date_naive(),
        );
        let (start, end) = forecast_window(today, days);
        let url = self.daily_url(location, timezone, start, end)?;
        debug!(%start, %end, "Fetching daily forecast");

        let response = self.fetch_forecast(&url, DAILY_FAILED).await?;
        normalize::daily_forecast(&response, &self.config)
    }

    #[instrument(skip(self), fields(lat = %location.latitude(), lon = %location.longitude()))]
    async fn hourly(
        &self,
        location: GeoLocation,
        timezone: Option<Timezone>,
        hours: u32,
        display_tz: Timezone,
    ) -> Result<HourlyForecast, ServiceError> {
        let url = self.hourly_url(location, timezone)?;
        debug!("Fetching hourly forecast");

        let response = self.fetch_forecast(&url, HOURLY_FAILED).await?;
        normalize::hourly_forecast(&response, &self.config, (self.clock)(), hours, display_tz)
    }

    #[instrument(skip(self))]
    async fn icon(&self, icon: &str) -> Result<Bytes, ServiceError> {
        if !is_icon_id(icon) {
            return Err(ServiceError::bad_request(format!("Invalid icon: {icon}")));
        }

        let response = self
            .fetch
            .fetch_buffer(&self.icon_url(icon), &self.options("image/png"))
            .await
            .map_err(|e| ServiceError::internal(ICON_FAILED).with_cause(e))?;

        match response.status {
            _ if response.ok => Ok(response.body),
            404 => Err(ServiceError::with_status("Weather icon not found", 404)),
            status => {
                warn!(status, "Icon provider returned an error");
                Err(ServiceError::internal(ICON_FAILED))
            },
        }
    }
}
