//! Transit handlers
//!
//! Station search, departures and connections via transport.rest.

use std::sync::LazyLock;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use domain::entities::{Connection, Departure, Station};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::common::{empty_as_none, pattern, query_or_bad_request, results, station_id_rule};
use crate::error::ApiError;
use crate::middleware::{ParamDescriptor, ParamSet, Rule};
use crate::state::AppState;

/// Station results when `results` is absent
pub const DEFAULT_STATION_RESULTS: u32 = 10;
/// Departure results when `results` is absent
pub const DEFAULT_DEPARTURE_RESULTS: u32 = 20;
/// Departure look-ahead in minutes when `duration` is absent
pub const DEFAULT_DEPARTURE_DURATION: u32 = 120;
/// Connection results when `results` is absent
pub const DEFAULT_CONNECTION_RESULTS: u32 = 5;

fn duration() -> ParamDescriptor {
    ParamDescriptor::query("duration").rule(Rule::range(10.0, 720.0))
}

/// `GET /v1/transit/stations`
pub static STATIONS_PARAMS: LazyLock<ParamSet> = LazyLock::new(|| {
    ParamSet::new([
        ParamDescriptor::query("query").required().rule(pattern(
            r"(?s).{2,100}",
            "Invalid query: expected 2 to 100 characters",
        )),
        results(),
    ])
});

/// `GET /v1/transit/stations/{stationId}/departures`
pub static DEPARTURES_PARAMS: LazyLock<ParamSet> = LazyLock::new(|| {
    ParamSet::new([
        ParamDescriptor::path("stationId").rule(station_id_rule()),
        duration(),
        results(),
    ])
});

/// `GET /v1/transit/departures?stationId=`
pub static DEPARTURES_QUERY_PARAMS: LazyLock<ParamSet> = LazyLock::new(|| {
    ParamSet::new([
        ParamDescriptor::query("stationId")
            .required()
            .rule(station_id_rule()),
        duration(),
        results(),
    ])
});

/// `GET /v1/transit/connections`
pub static CONNECTIONS_PARAMS: LazyLock<ParamSet> = LazyLock::new(|| {
    ParamSet::new([
        ParamDescriptor::query("from").required().rule(station_id_rule()),
        ParamDescriptor::query("to").required().rule(station_id_rule()),
        results(),
    ])
});

/// Query for a station search
#[derive(Debug, Deserialize)]
pub struct StationsQuery {
    pub query: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub results: Option<u32>,
}

/// Query for departures
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeparturesQuery {
    #[serde(default)]
    pub station_id: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub duration: Option<u32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub results: Option<u32>,
}

/// Query for a connection search
#[derive(Debug, Deserialize)]
pub struct ConnectionsQuery {
    pub from: String,
    pub to: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub results: Option<u32>,
}

/// Station search response
#[derive(Debug, Serialize)]
pub struct StationsResponse {
    pub stations: Vec<Station>,
}

/// Departures response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeparturesResponse {
    pub station_id: String,
    pub departures: Vec<Departure>,
}

/// Connections response
#[derive(Debug, Serialize)]
pub struct ConnectionsResponse {
    pub connections: Vec<Connection>,
}

/// Stations and stops matching a query
#[instrument(skip(state))]
pub async fn stations(
    State(state): State<AppState>,
    query: Result<Query<StationsQuery>, QueryRejection>,
) -> Result<Json<StationsResponse>, ApiError> {
    let query = query_or_bad_request(query)?;
    let results = query.results.unwrap_or(DEFAULT_STATION_RESULTS);

    let stations = state
        .transit
        .search_stations(query.query.trim(), results)
        .await?;
    Ok(Json(StationsResponse { stations }))
}

async fn fetch_departures(
    state: &AppState,
    station_id: String,
    query: DeparturesQuery,
) -> Result<Json<DeparturesResponse>, ApiError> {
    let station_id = station_id.trim().to_string();
    let duration = query.duration.unwrap_or(DEFAULT_DEPARTURE_DURATION);
    let results = query.results.unwrap_or(DEFAULT_DEPARTURE_RESULTS);

    let departures = state
        .transit
        .departures(&station_id, duration, results)
        .await?;
    Ok(Json(DeparturesResponse {
        station_id,
        departures,
    }))
}

/// Upcoming departures for the station in the path
#[instrument(skip(state))]
pub async fn departures(
    State(state): State<AppState>,
    Path(station_id): Path<String>,
    query: Result<Query<DeparturesQuery>, QueryRejection>,
) -> Result<Json<DeparturesResponse>, ApiError> {
    let query = query_or_bad_request(query)?;
    fetch_departures(&state, station_id, query).await
}

/// Upcoming departures for the `stationId` query parameter
#[instrument(skip(state))]
pub async fn departures_by_query(
    State(state): State<AppState>,
    query: Result<Query<DeparturesQuery>, QueryRejection>,
) -> Result<Json<DeparturesResponse>, ApiError> {
    let mut query = query_or_bad_request(query)?;
    let station_id = query.station_id.take().unwrap_or_default();
    fetch_departures(&state, station_id, query).await
}

/// Connections between two stations
#[instrument(skip(state))]
pub async fn connections(
    State(state): State<AppState>,
    query: Result<Query<ConnectionsQuery>, QueryRejection>,
) -> Result<Json<ConnectionsResponse>, ApiError> {
    let query = query_or_bad_request(query)?;
    let results = query.results.unwrap_or(DEFAULT_CONNECTION_RESULTS);

    let connections = state
        .transit
        .connections(query.from.trim(), query.to.trim(), results)
        .await?;
    Ok(Json(ConnectionsResponse { connections }))
}
