//! Weather handlers
//!
//! Current conditions, daily and hourly forecasts, and the icon proxy.

use std::sync::LazyLock;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::header,
    response::IntoResponse,
};
use domain::entities::{CurrentConditions, DailyForecast, HourlyForecast};
use domain::{GeoLocation, ServiceError, Timezone};
use serde::Deserialize;
use tracing::instrument;

use super::common::{
    empty_as_none, is_known_timezone, latitude, longitude, pattern, provider_timezone,
    query_or_bad_request, request_timezone,
};
use crate::error::ApiError;
use crate::middleware::{ParamDescriptor, ParamSet, Rule};
use crate::state::AppState;

/// Forecast days when `days` is absent
pub const DEFAULT_FORECAST_DAYS: u8 = 9;

/// Hourly horizon when `hours` is absent
pub const DEFAULT_HOURLY_HOURS: u32 = 24;

/// `GET /v1/weather/current`
pub static CURRENT_PARAMS: LazyLock<ParamSet> =
    LazyLock::new(|| ParamSet::new([latitude(), longitude(), request_timezone()]));

/// `GET /v1/weather/forecast`
pub static FORECAST_PARAMS: LazyLock<ParamSet> = LazyLock::new(|| {
    ParamSet::new([
        latitude(),
        longitude(),
        request_timezone(),
        ParamDescriptor::query("days").rule(Rule::range(1.0, 9.0)),
    ])
});

/// `GET /v1/weather/hourly`
pub static HOURLY_PARAMS: LazyLock<ParamSet> = LazyLock::new(|| {
    ParamSet::new([
        latitude(),
        longitude(),
        request_timezone(),
        ParamDescriptor::query("hours").rule(Rule::range(1.0, 48.0)),
        ParamDescriptor::query("tz").rule(
            Rule::custom(|value| is_known_timezone(value, false))
                .with_message("Parameter tz is invalid: expected an IANA timezone"),
        ),
    ])
});

/// `GET /v1/weather/icons/{icon}`
pub static ICON_PARAMS: LazyLock<ParamSet> = LazyLock::new(|| {
    ParamSet::new([ParamDescriptor::path("icon").rule(pattern(r"\d{2}[dn]", "Invalid icon"))])
});

/// Query for current conditions
#[derive(Debug, Deserialize)]
pub struct CurrentQuery {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub timezone: Option<String>,
}

/// Query for the daily forecast
#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub days: Option<u8>,
}

/// Query for the hourly forecast
#[derive(Debug, Deserialize)]
pub struct HourlyQuery {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub hours: Option<u32>,
    #[serde(default)]
    pub tz: Option<String>,
}

fn location(lat: f64, lon: f64) -> Result<GeoLocation, ServiceError> {
    GeoLocation::new(lat, lon)
        .map_err(|e| ServiceError::bad_request("Invalid coordinates").with_cause(e))
}

/// Current weather for a location
#[instrument(skip(state))]
pub async fn current(
    State(state): State<AppState>,
    query: Result<Query<CurrentQuery>, QueryRejection>,
) -> Result<Json<CurrentConditions>, ApiError> {
    let query = query_or_bad_request(query)?;
    let location = location(query.lat, query.lon)?;
    let timezone = provider_timezone(query.timezone.as_deref())?;

    let current = state.weather.current(location, timezone).await?;
    Ok(Json(current))
}

/// Daily forecast starting tomorrow
#[instrument(skip(state))]
pub async fn forecast(
    State(state): State<AppState>,
    query: Result<Query<ForecastQuery>, QueryRejection>,
) -> Result<Json<DailyForecast>, ApiError> {
    let query = query_or_bad_request(query)?;
    let location = location(query.lat, query.lon)?;
    let timezone = provider_timezone(query.timezone.as_deref())?;
    let days = query.days.unwrap_or(DEFAULT_FORECAST_DAYS);

    let forecast = state.weather.daily(location, timezone, days).await?;
    Ok(Json(forecast))
}

/// Hourly forecast from the current hour
///
/// `hours` bounds the horizon, not the count: the partial current hour is
/// included, so up to `hours + 1` entries are returned.
#[instrument(skip(state))]
pub async fn hourly(
    State(state): State<AppState>,
    query: Result<Query<HourlyQuery>, QueryRejection>,
) -> Result<Json<HourlyForecast>, ApiError> {
    let query = query_or_bad_request(query)?;
    let location = location(query.lat, query.lon)?;
    let timezone = provider_timezone(query.timezone.as_deref())?;
    let hours = query.hours.unwrap_or(DEFAULT_HOURLY_HOURS);
    let display_tz = match query.tz.as_deref().map(str::trim).filter(|tz| !tz.is_empty()) {
        Some(tz) => Timezone::parse(tz)
            .map_err(|e| ServiceError::bad_request("Parameter tz is invalid").with_cause(e))?,
        None => Timezone::utc(),
    };

    let forecast = state
        .weather
        .hourly(location, timezone, hours, display_tz)
        .await?;
    Ok(Json(forecast))
}

/// Condition icon proxied from the icon provider
#[instrument(skip(state))]
pub async fn icon(
    State(state): State<AppState>,
    Path(icon): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let bytes = state.weather.icon(&icon).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, "public, max-age=86400"),
        ],
        bytes,
    ))
}
