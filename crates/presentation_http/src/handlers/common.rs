//! Shared helpers for HTTP handlers
//!
//! Parameter descriptors reused across routes and query decoding helpers.

use std::str::FromStr;

use axum::extract::{Query, rejection::QueryRejection};
use domain::{ServiceError, Timezone};
use serde::{Deserialize, Deserializer};

use crate::middleware::{ParamDescriptor, Rule};

/// Value of `timezone` that lets the weather provider pick the zone
pub const AUTO_TIMEZONE: &str = "auto";

/// `lat`: required, -90..=90
pub fn latitude() -> ParamDescriptor {
    ParamDescriptor::query("lat")
        .required()
        .rule(Rule::range(-90.0, 90.0).with_message("Latitude out of range (-90 to 90)"))
}

/// `lon`: required, -180..=180
pub fn longitude() -> ParamDescriptor {
    ParamDescriptor::query("lon")
        .required()
        .rule(Rule::range(-180.0, 180.0).with_message("Longitude out of range (-180 to 180)"))
}

/// IANA zone check used by the `timezone` and `tz` custom rules
///
/// Kept async so it can be swapped for a remote lookup.
pub async fn is_known_timezone(value: String, allow_auto: bool) -> bool {
    let value = value.trim();
    (allow_auto && value.eq_ignore_ascii_case(AUTO_TIMEZONE)) || Timezone::parse(value).is_ok()
}

/// `timezone`: optional IANA zone or `auto`
pub fn request_timezone() -> ParamDescriptor {
    ParamDescriptor::query("timezone").rule(
        Rule::custom(|value| is_known_timezone(value, true))
            .with_message("Parameter timezone is invalid: expected an IANA timezone or 'auto'"),
    )
}

/// `results`: optional, 1..=50
pub fn results() -> ParamDescriptor {
    ParamDescriptor::query("results").rule(Rule::range(1.0, 50.0))
}

/// Regex rule for a literal pattern
#[allow(clippy::expect_used)]
pub fn pattern(pattern: &'static str, message: &str) -> Rule {
    Rule::regex(pattern)
        .expect("constant pattern compiles")
        .with_message(message)
}

/// Station identifiers as used by transport.rest
pub fn station_id_rule() -> Rule {
    pattern(r"\d{1,20}", "Invalid station id")
}

/// Deserialize blank query values as `None`
pub fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Unwrap a query extraction, turning a rejection into a 400
pub fn query_or_bad_request<T>(
    query: Result<Query<T>, QueryRejection>,
) -> Result<T, ServiceError> {
    query
        .map(|Query(params)| params)
        .map_err(|e| ServiceError::bad_request("Invalid query parameters").with_cause(e))
}

/// `None` for `auto` or absent, else the parsed zone
pub fn provider_timezone(value: Option<&str>) -> Result<Option<Timezone>, ServiceError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) if v.eq_ignore_ascii_case(AUTO_TIMEZONE) => Ok(None),
        Some(v) => Timezone::parse(v)
            .map(Some)
            .map_err(|e| ServiceError::bad_request("Parameter timezone is invalid").with_cause(e)),
    }
}
