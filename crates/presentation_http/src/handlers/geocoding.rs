//! Geocoding handler

use std::sync::LazyLock;

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use domain::entities::Place;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::common::{empty_as_none, pattern, query_or_bad_request};
use crate::error::ApiError;
use crate::middleware::{ParamDescriptor, ParamSet, Rule};
use crate::state::AppState;

/// Places returned when `limit` is absent
pub const DEFAULT_PLACE_LIMIT: u32 = 5;

/// `GET /v1/geocoding/search`
pub static SEARCH_PARAMS: LazyLock<ParamSet> = LazyLock::new(|| {
    ParamSet::new([
        ParamDescriptor::query("q").required().rule(pattern(
            r"(?s).{2,200}",
            "Invalid q: expected 2 to 200 characters",
        )),
        ParamDescriptor::query("limit").rule(Rule::range(1.0, 10.0)),
        ParamDescriptor::query("country").rule(pattern(
            "[A-Za-z]{2}",
            "Invalid country: expected a two-letter country code",
        )),
    ])
});

/// Query for a place search
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub limit: Option<u32>,
    #[serde(default)]
    pub country: Option<String>,
}

/// Place search response
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub places: Vec<Place>,
}

/// Places matching a free-text query
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = query_or_bad_request(query)?;
    let limit = query.limit.unwrap_or(DEFAULT_PLACE_LIMIT);
    let country = query
        .country
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let places = state.geocoding.search(&query.q, limit, country).await?;
    Ok(Json(SearchResponse { places }))
}
