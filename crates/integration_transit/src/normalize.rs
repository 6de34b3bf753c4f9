//! Conversion of transport.rest and Nominatim responses into DTOs

use chrono::{DateTime, Utc};
use domain::ServiceError;
use domain::entities::{Connection, Departure, Line, Place, Station, StationKind, UNKNOWN};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::{RawJourney, RawLeg, RawLine, RawLocation, RawPlace, RawStop, non_empty};

/// Message for structurally unusable transit responses
pub(crate) const UNEXPECTED_RESPONSE: &str = "Unexpected response from transit provider";

/// Message for structurally unusable geocoding responses
pub(crate) const UNEXPECTED_GEOCODING_RESPONSE: &str = "Unexpected response from geocoding provider";

const MILLIS_PER_MINUTE: i64 = 60_000;

/// Whole minutes from `departure` to `arrival`, rounded down
///
/// Arrival before departure yields a negative value.
#[must_use]
pub fn duration_minutes(departure: DateTime<Utc>, arrival: DateTime<Utc>) -> i64 {
    (arrival - departure)
        .num_milliseconds()
        .div_euclid(MILLIS_PER_MINUTE)
}

/// Decode each array element, dropping those that do not fit `T`
fn decode_items<T: DeserializeOwned>(items: &[Value]) -> Vec<T> {
    items
        .iter()
        .filter_map(|item| match T::deserialize(item) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                debug!(error = %e, "Skipping malformed item");
                None
            },
        })
        .collect()
}

fn journeys(body: &Value) -> Result<Vec<RawJourney>, ServiceError> {
    body.get("journeys")
        .and_then(Value::as_array)
        .map(|items| decode_items(items))
        .ok_or_else(|| ServiceError::internal(UNEXPECTED_RESPONSE))
}

/// A stop needs both id and name; departures use the id for `trip_id` and
/// as the origin's identity, so an unidentified origin drops the journey.
fn station(stop: &RawStop) -> Option<Station> {
    let id = non_empty(stop.id.as_ref())?;
    let name = non_empty(stop.name.as_ref())?;
    let station = Station::new(id, name);
    Some(match stop.location.as_ref().and_then(|l| l.pair()) {
        Some((lat, lon)) => station.with_coords(lat, lon),
        None => station,
    })
}

fn line(raw: &RawLine) -> Line {
    Line {
        name: non_empty(raw.name.as_ref()).unwrap_or(UNKNOWN).to_string(),
        product: raw.product.clone(),
        mode: raw.mode.clone(),
    }
}

fn stop_name(stop: Option<&RawStop>) -> Option<&str> {
    stop.and_then(|s| non_empty(s.name.as_ref()))
}

/// Stations and stops from a `/locations` response, in upstream order
pub(crate) fn stations(body: &Value, limit: usize) -> Result<Vec<Station>, ServiceError> {
    let items = body
        .as_array()
        .ok_or_else(|| ServiceError::internal(UNEXPECTED_RESPONSE))?;

    let stations: Vec<Station> = decode_items::<RawLocation>(items)
        .into_iter()
        .filter_map(|location| {
            let kind = location.kind.as_deref().and_then(StationKind::from_type)?;
            let mut station = station(&RawStop {
                id: location.id,
                name: location.name,
                location: location.location,
            })?;
            station.kind = Some(kind);
            Some(station)
        })
        .take(limit)
        .collect();

    debug!(total = items.len(), kept = stations.len(), "Normalized stations");
    Ok(stations)
}

fn departure(journey: &RawJourney) -> Option<Departure> {
    let leg = journey.legs.first()?;
    let origin = station(leg.origin.as_ref()?)?;
    let line = line(leg.line.as_ref()?);

    let planned_time = leg.planned_departure.or(leg.departure);
    let trip_id = non_empty(journey.refresh_token.as_ref()).map_or_else(
        || {
            let when = planned_time.map_or_else(|| "unscheduled".to_string(), |t| t.to_rfc3339());
            format!("{}-{when}", origin.id)
        },
        ToString::to_string,
    );

    let direction = non_empty(leg.direction.as_ref())
        .or_else(|| stop_name(leg.destination.as_ref()))
        .unwrap_or(UNKNOWN)
        .to_string();

    Some(Departure {
        trip_id,
        origin,
        planned_time,
        actual_time: leg.departure,
        delay_seconds: leg.departure_delay,
        platform: leg
            .planned_departure_platform
            .clone()
            .or_else(|| leg.departure_platform.clone()),
        actual_platform: leg.departure_platform.clone(),
        line,
        direction,
    })
}

/// Departures from a departures response, first leg of each journey
pub(crate) fn departures(body: &Value, limit: usize) -> Result<Vec<Departure>, ServiceError> {
    let journeys = journeys(body)?;
    let total = journeys.len();

    let departures: Vec<Departure> = journeys.iter().filter_map(departure).take(limit).collect();

    debug!(total, kept = departures.len(), "Normalized departures");
    Ok(departures)
}

fn transfers(legs: &[RawLeg]) -> u32 {
    let riding = legs.iter().filter(|leg| !leg.is_walking()).count();
    u32::try_from(riding.saturating_sub(1)).unwrap_or(u32::MAX)
}

fn connection(journey: &RawJourney) -> Option<Connection> {
    let first = journey.legs.first()?;
    let last = journey.legs.last()?;

    let departure = first.planned_departure.or(first.departure);
    let arrival = last.planned_arrival.or(last.arrival);
    let duration = departure
        .zip(arrival)
        .map(|(dep, arr)| duration_minutes(dep, arr));
    if let Some(minutes) = duration.filter(|m| *m < 0) {
        warn!(minutes, "Connection arrives before it departs");
    }

    let destination = stop_name(last.destination.as_ref());

    Some(Connection {
        origin: stop_name(first.origin.as_ref()).map(ToString::to_string),
        destination: destination.map(ToString::to_string),
        departure,
        arrival,
        duration_minutes: duration,
        departure_platform: first
            .planned_departure_platform
            .clone()
            .or_else(|| first.departure_platform.clone()),
        arrival_platform: last
            .planned_arrival_platform
            .clone()
            .or_else(|| last.arrival_platform.clone()),
        departure_delay_seconds: first.departure_delay,
        arrival_delay_seconds: last.arrival_delay,
        line_name: first
            .line
            .as_ref()
            .and_then(|l| non_empty(l.name.as_ref()))
            .unwrap_or(UNKNOWN)
            .to_string(),
        direction: non_empty(first.direction.as_ref())
            .or(destination)
            .map(ToString::to_string),
        transfers: transfers(&journey.legs),
        legs: u32::try_from(journey.legs.len()).unwrap_or(u32::MAX),
    })
}

/// Connections from a `/journeys` response, skipping journeys without legs
pub(crate) fn connections(body: &Value, limit: usize) -> Result<Vec<Connection>, ServiceError> {
    let journeys = journeys(body)?;
    let total = journeys.len();

    let connections: Vec<Connection> =
        journeys.iter().filter_map(connection).take(limit).collect();

    debug!(total, kept = connections.len(), "Normalized connections");
    Ok(connections)
}

/// Places from a Nominatim `jsonv2` search response
pub(crate) fn places(body: &Value) -> Result<Vec<Place>, ServiceError> {
    let items = body
        .as_array()
        .ok_or_else(|| ServiceError::internal(UNEXPECTED_GEOCODING_RESPONSE))?;

    Ok(decode_items::<RawPlace>(items)
        .into_iter()
        .filter_map(|raw| {
            let latitude = raw.lat.as_deref()?.parse::<f64>().ok()?;
            let longitude = raw.lon.as_deref()?.parse::<f64>().ok()?;
            Some(Place {
                display_name: raw.display_name?,
                latitude,
                longitude,
                category: raw.category,
                kind: raw.kind,
            })
        })
        .collect())
}
