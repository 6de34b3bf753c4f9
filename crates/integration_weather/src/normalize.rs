//! Conversion of Open-Meteo responses into normalized weather DTOs
//!
//! All functions here are pure: the current instant is passed in, never
//! read from the clock.

use chrono::{DateTime, Days, NaiveDate, Utc};
use domain::entities::{
    CurrentConditions, DailyForecast, ForecastDay, ForecastHour, HourlyForecast, Measurement,
};
use domain::{ServiceError, Timezone};
use tracing::debug;

use crate::config::WeatherConfig;
use crate::models::{DailyBlock, ForecastResponse, UNKNOWN_CODE, Units, WeatherCondition, at};

const SECONDS_PER_DAY: i64 = 86_400;
const SECONDS_PER_HOUR: i64 = 3_600;

/// Message for responses missing the data a request asked for
pub(crate) const UNEXPECTED_RESPONSE: &str = "Unexpected response from weather provider";

/// Local time format for hourly entries
pub const LOCAL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Whether `now` lies strictly between sunrise and sunset
///
/// Returns false when either instant is unknown.
#[must_use]
pub fn sun_is_currently_up(
    now: DateTime<Utc>,
    sunrise: Option<DateTime<Utc>>,
    sunset: Option<DateTime<Utc>>,
) -> bool {
    match (sunrise, sunset) {
        (Some(rise), Some(set)) => now > rise && now < set,
        _ => false,
    }
}

/// First and last date of a daily forecast of `days` days after `today`
#[must_use]
pub fn forecast_window(today: NaiveDate, days: u8) -> (NaiveDate, NaiveDate) {
    let start = today + Days::new(1);
    let end = today + Days::new(u64::from(days.max(1)));
    (start, end)
}

/// Whether an hourly entry starting at `timestamp` falls in the horizon
///
/// The hour containing `now` is kept; entries at or past
/// `now + hours` are dropped. Mid-hour, `hours = N` therefore keeps
/// N + 1 entries: the partial current hour plus N full ones.
#[must_use]
pub fn within_horizon(timestamp: DateTime<Utc>, now: DateTime<Utc>, hours: u32) -> bool {
    let now_secs = now.timestamp();
    let current_hour = now_secs - now_secs.rem_euclid(SECONDS_PER_HOUR);
    let horizon = now_secs + i64::from(hours) * SECONDS_PER_HOUR;
    let ts = timestamp.timestamp();
    ts >= current_hour && ts < horizon
}

fn instant(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

/// Hour of day at `secs` in a zone `offset` seconds from UTC
fn local_hour(secs: i64, offset: i64) -> i64 {
    (secs + offset).rem_euclid(SECONDS_PER_DAY) / SECONDS_PER_HOUR
}

/// Day number at `secs` in a zone `offset` seconds from UTC
fn local_day(secs: i64, offset: i64) -> i64 {
    (secs + offset).div_euclid(SECONDS_PER_DAY)
}

fn local_date(secs: i64, offset: i64) -> Option<NaiveDate> {
    instant(secs + offset).map(|dt| dt.date_naive())
}

fn measure(value: Option<f64>, units: &Units, key: &str, fallback: &str) -> Option<Measurement> {
    value.map(|v| {
        let unit = units.get(key).map_or(fallback, String::as_str);
        Measurement::new(v, unit)
    })
}

fn coordinates(response: &ForecastResponse) -> Result<(f64, f64), ServiceError> {
    match (response.latitude, response.longitude) {
        (Some(lat), Some(lon)) => Ok((lat, lon)),
        _ => Err(ServiceError::internal(UNEXPECTED_RESPONSE)),
    }
}

fn timezone_name(response: &ForecastResponse) -> Option<String> {
    response
        .timezone
        .as_deref()
        .map(str::trim)
        .filter(|tz| !tz.is_empty())
        .map(ToString::to_string)
}

/// Build current conditions from a `current` + `daily` + `hourly` response
pub(crate) fn current_conditions(
    response: &ForecastResponse,
    config: &WeatherConfig,
) -> Result<CurrentConditions, ServiceError> {
    let (latitude, longitude) = coordinates(response)?;
    let current = response
        .current
        .as_ref()
        .ok_or_else(|| ServiceError::internal(UNEXPECTED_RESPONSE))?;
    let now_secs = current
        .time
        .ok_or_else(|| ServiceError::internal(UNEXPECTED_RESPONSE))?;
    let time = instant(now_secs).ok_or_else(|| ServiceError::internal(UNEXPECTED_RESPONSE))?;
    let offset = response.offset();

    let daily = response.daily.as_ref();
    let today = |series: &dyn Fn(&DailyBlock) -> Option<f64>| daily.and_then(series);
    let sunrise = daily.and_then(|d| at(&d.sunrise, 0)).and_then(instant);
    let sunset = daily.and_then(|d| at(&d.sunset, 0)).and_then(instant);

    let feels_like = response.hourly.as_ref().and_then(|hourly| {
        let hour = local_hour(now_secs, offset);
        hourly
            .time
            .iter()
            .position(|&t| local_hour(t, offset) == hour)
            .and_then(|i| at(&hourly.apparent_temperature, i))
    });

    let code = current.weather_code.unwrap_or(UNKNOWN_CODE);
    let condition = WeatherCondition::from_wmo_code(code);
    let is_day = sun_is_currently_up(time, sunrise, sunset);

    let current_units = &response.current_units;
    let daily_units = &response.daily_units;
    let temp = config.temperature_label();
    let precip = config.precipitation_label();

    Ok(CurrentConditions {
        latitude,
        longitude,
        timezone: timezone_name(response),
        time,
        temperature: measure(current.temperature_2m, current_units, "temperature_2m", temp),
        feels_like: measure(
            feels_like,
            &response.hourly_units,
            "apparent_temperature",
            temp,
        ),
        temperature_min: measure(
            today(&|d| at(&d.temperature_2m_min, 0)),
            daily_units,
            "temperature_2m_min",
            temp,
        ),
        temperature_max: measure(
            today(&|d| at(&d.temperature_2m_max, 0)),
            daily_units,
            "temperature_2m_max",
            temp,
        ),
        precipitation: measure(current.precipitation, current_units, "precipitation", precip),
        precipitation_sum: measure(
            today(&|d| at(&d.precipitation_sum, 0)),
            daily_units,
            "precipitation_sum",
            precip,
        ),
        wind_speed: measure(
            current.wind_speed_10m,
            current_units,
            "wind_speed_10m",
            config.wind_speed_label(),
        ),
        sunrise,
        sunset,
        is_day,
        weather_code: condition.code_or_unknown(code),
        icon: condition.icon(is_day).to_string(),
        description: condition.description().to_string(),
    })
}

/// Build a daily forecast, one entry per element of the `daily.time` series
pub(crate) fn daily_forecast(
    response: &ForecastResponse,
    config: &WeatherConfig,
) -> Result<DailyForecast, ServiceError> {
    let (latitude, longitude) = coordinates(response)?;
    let daily = response
        .daily
        .as_ref()
        .ok_or_else(|| ServiceError::internal(UNEXPECTED_RESPONSE))?;
    let offset = response.offset();
    let units = &response.daily_units;
    let temp = config.temperature_label();
    let precip = config.precipitation_label();

    let days = daily
        .time
        .iter()
        .enumerate()
        .map(|(i, &secs)| {
            let date = local_date(secs, offset)
                .ok_or_else(|| ServiceError::internal(UNEXPECTED_RESPONSE))?;
            let code = at(&daily.weather_code, i).unwrap_or(UNKNOWN_CODE);
            let condition = WeatherCondition::from_wmo_code(code);

            Ok(ForecastDay {
                date,
                weather_code: condition.code_or_unknown(code),
                icon: condition.icon(true).to_string(),
                description: condition.description().to_string(),
                temperature_min: measure(
                    at(&daily.temperature_2m_min, i),
                    units,
                    "temperature_2m_min",
                    temp,
                ),
                temperature_max: measure(
                    at(&daily.temperature_2m_max, i),
                    units,
                    "temperature_2m_max",
                    temp,
                ),
                precipitation_sum: measure(
                    at(&daily.precipitation_sum, i),
                    units,
                    "precipitation_sum",
                    precip,
                ),
                precipitation_hours: measure(
                    at(&daily.precipitation_hours, i),
                    units,
                    "precipitation_hours",
                    "h",
                ),
            })
        })
        .collect::<Result<Vec<_>, ServiceError>>()?;

    debug!(days = days.len(), "Normalized daily forecast");

    Ok(DailyForecast {
        latitude,
        longitude,
        timezone: timezone_name(response),
        days,
    })
}

/// Build an hourly forecast from `now` up to `hours` ahead
pub(crate) fn hourly_forecast(
    response: &ForecastResponse,
    config: &WeatherConfig,
    now: DateTime<Utc>,
    hours: u32,
    display_tz: Timezone,
) -> Result<HourlyForecast, ServiceError> {
    let (latitude, longitude) = coordinates(response)?;
    let hourly = response
        .hourly
        .as_ref()
        .ok_or_else(|| ServiceError::internal(UNEXPECTED_RESPONSE))?;
    let offset = response.offset();
    let units = &response.hourly_units;

    // (local day, sunrise, sunset) for each day in the response
    let sun_times: Vec<(i64, Option<DateTime<Utc>>, Option<DateTime<Utc>>)> = response
        .daily
        .as_ref()
        .map(|daily| {
            daily
                .time
                .iter()
                .enumerate()
                .map(|(i, &secs)| {
                    (
                        local_day(secs, offset),
                        at(&daily.sunrise, i).and_then(instant),
                        at(&daily.sunset, i).and_then(instant),
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    let hours_out: Vec<ForecastHour> = hourly
        .time
        .iter()
        .enumerate()
        .filter_map(|(i, &secs)| instant(secs).map(|ts| (i, secs, ts)))
        .filter(|&(_, _, ts)| within_horizon(ts, now, hours))
        .map(|(i, secs, timestamp)| {
            let day = local_day(secs, offset);
            let is_day = sun_times
                .iter()
                .find(|(d, _, _)| *d == day)
                .is_some_and(|&(_, rise, set)| sun_is_currently_up(timestamp, rise, set));

            let code = at(&hourly.weather_code, i).unwrap_or(UNKNOWN_CODE);
            let condition = WeatherCondition::from_wmo_code(code);

            ForecastHour {
                timestamp,
                local_time: timestamp
                    .with_timezone(&display_tz.tz())
                    .format(LOCAL_TIME_FORMAT)
                    .to_string(),
                temperature: measure(
                    at(&hourly.temperature_2m, i),
                    units,
                    "temperature_2m",
                    config.temperature_label(),
                ),
                wind_speed: measure(
                    at(&hourly.wind_speed_10m, i),
                    units,
                    "wind_speed_10m",
                    config.wind_speed_label(),
                ),
                precipitation: measure(
                    at(&hourly.precipitation, i),
                    units,
                    "precipitation",
                    config.precipitation_label(),
                ),
                is_day,
                weather_code: condition.code_or_unknown(code),
                icon: condition.icon(is_day).to_string(),
                description: condition.description().to_string(),
            }
        })
        .collect();

    debug!(
        total = hourly.time.len(),
        kept = hours_out.len(),
        "Normalized hourly forecast"
    );

    Ok(HourlyForecast {
        latitude,
        longitude,
        timezone: display_tz.to_string(),
        hours: hours_out,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn utc(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, h, m, 0).unwrap()
    }

    fn parse(value: serde_json::Value) -> ForecastResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn sun_up_between_sunrise_and_sunset() {
        let rise = Some(utc(7, 30));
        let set = Some(utc(17, 0));

        assert!(sun_is_currently_up(utc(12, 0), rise, set));
        assert!(!sun_is_currently_up(utc(18, 0), rise, set));
        assert!(!sun_is_currently_up(utc(6, 0), rise, set));
    }

    #[test]
    fn sun_up_is_strict_at_boundaries() {
        let rise = Some(utc(7, 30));
        let set = Some(utc(17, 0));

        assert!(!sun_is_currently_up(utc(7, 30), rise, set));
        assert!(!sun_is_currently_up(utc(17, 0), rise, set));
    }

    #[test]
    fn sun_up_false_without_times() {
        assert!(!sun_is_currently_up(utc(12, 0), None, Some(utc(17, 0))));
        assert!(!sun_is_currently_up(utc(12, 0), Some(utc(7, 0)), None));
    }

    #[test]
    fn forecast_window_starts_tomorrow() {
        let today = NaiveDate::from_ymd_opt(2026, 12, 30).unwrap();
        let (start, end) = forecast_window(today, 5);
        assert_eq!(start, NaiveDate::from_ymd_opt(2026, 12, 31).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2027, 1, 4).unwrap());

        let (start, end) = forecast_window(today, 1);
        assert_eq!(start, end);
    }

    #[test]
    fn horizon_keeps_current_hour_and_drops_past() {
        let now = utc(10, 20);
        assert!(within_horizon(utc(10, 0), now, 24));
        assert!(!within_horizon(utc(9, 0), now, 24));
        assert!(within_horizon(utc(11, 0), now, 1));
        assert!(!within_horizon(utc(11, 0), utc(10, 0), 1));
    }

    #[test]
    fn horizon_mid_hour_keeps_one_extra_entry() {
        let now = utc(10, 30);
        let kept = (0..24)
            .map(|h| utc(h, 0))
            .filter(|ts| within_horizon(*ts, now, 2))
            .count();
        assert_eq!(kept, 3);

        let on_the_hour = (0..24)
            .map(|h| utc(h, 0))
            .filter(|ts| within_horizon(*ts, utc(10, 0), 2))
            .count();
        assert_eq!(on_the_hour, 2);
    }

    #[test]
    fn local_hour_respects_offset() {
        let secs = utc(23, 0).timestamp();
        assert_eq!(local_hour(secs, 0), 23);
        assert_eq!(local_hour(secs, 3_600), 0);
        assert_eq!(local_hour(secs, -3_600), 22);
    }

    #[test]
    fn current_picks_matching_hour_and_day_icon() {
        let midnight = utc(0, 0).timestamp();
        let hourly_times: Vec<i64> = (0..24).map(|h| midnight + h * 3_600).collect();
        let apparent: Vec<f64> = (0..24).map(f64::from).collect();

        let response = parse(json!({
            "latitude": 52.52,
            "longitude": 13.41,
            "timezone": "GMT",
            "utc_offset_seconds": 0,
            "current_units": { "temperature_2m": "°C", "wind_speed_10m": "km/h" },
            "current": {
                "time": utc(12, 15).timestamp(),
                "temperature_2m": 9.5,
                "weather_code": 61,
                "wind_speed_10m": 14.0,
                "precipitation": 0.4
            },
            "daily": {
                "time": [midnight],
                "temperature_2m_max": [11.0],
                "temperature_2m_min": [3.0],
                "precipitation_sum": [2.5],
                "sunrise": [utc(7, 30).timestamp()],
                "sunset": [utc(17, 0).timestamp()]
            },
            "hourly": { "time": hourly_times, "apparent_temperature": apparent }
        }));

        let current = current_conditions(&response, &WeatherConfig::default()).unwrap();

        assert!(current.is_day);
        assert_eq!(current.icon, "10d");
        assert_eq!(current.description, "Rain");
        assert_eq!(current.weather_code, 61);
        assert_eq!(current.feels_like.unwrap().value, 12.0);
        assert_eq!(current.temperature_max.unwrap().value, 11.0);
        assert_eq!(current.precipitation_sum.unwrap().unit, "mm");
        assert_eq!(current.wind_speed.unwrap().unit, "km/h");
    }

    #[test]
    fn current_unknown_code_at_night() {
        let response = parse(json!({
            "latitude": 1.0,
            "longitude": 2.0,
            "current": { "time": utc(22, 0).timestamp(), "weather_code": 42 },
            "daily": {
                "time": [utc(0, 0).timestamp()],
                "sunrise": [utc(7, 30).timestamp()],
                "sunset": [utc(17, 0).timestamp()]
            }
        }));

        let current = current_conditions(&response, &WeatherConfig::default()).unwrap();

        assert!(!current.is_day);
        assert_eq!(current.weather_code, -1);
        assert_eq!(current.icon, "03n");
        assert_eq!(current.description, "Unknown weather");
        assert!(current.feels_like.is_none());
        assert!(current.temperature.is_none());
    }

    #[test]
    fn current_without_current_block_is_internal_error() {
        let response = parse(json!({ "latitude": 1.0, "longitude": 2.0 }));
        let err = current_conditions(&response, &WeatherConfig::default()).unwrap_err();
        assert_eq!(err.status(), 500);
        assert_eq!(err.message(), UNEXPECTED_RESPONSE);
    }

    #[test]
    fn daily_uses_day_icons_and_units() {
        let offset = 3_600;
        let day0 = utc(0, 0).timestamp() - offset;
        let response = parse(json!({
            "latitude": 52.52,
            "longitude": 13.41,
            "timezone": "Europe/Berlin",
            "utc_offset_seconds": offset,
            "daily_units": { "precipitation_sum": "mm", "precipitation_hours": "h" },
            "daily": {
                "time": [day0, day0 + 86_400],
                "weather_code": [0, 95],
                "temperature_2m_max": [12.0, 14.0],
                "temperature_2m_min": [2.0, null],
                "precipitation_sum": [0.0, 6.1],
                "precipitation_hours": [0.0, 3.0]
            }
        }));

        let forecast = daily_forecast(&response, &WeatherConfig::default()).unwrap();

        assert_eq!(forecast.days.len(), 2);
        assert_eq!(forecast.days[0].date, NaiveDate::from_ymd_opt(2026, 3, 14).unwrap());
        assert_eq!(forecast.days[0].icon, "01d");
        assert_eq!(forecast.days[1].icon, "11d");
        assert!(forecast.days[1].temperature_min.is_none());
        assert_eq!(forecast.days[1].precipitation_hours.as_ref().unwrap().unit, "h");
        assert_eq!(forecast.timezone.as_deref(), Some("Europe/Berlin"));
    }

    #[test]
    fn missing_provider_timezone_stays_absent() {
        let response = parse(json!({
            "latitude": 52.52,
            "longitude": 13.41,
            "current": { "time": utc(12, 0).timestamp(), "weather_code": 0 },
            "daily": { "time": [utc(0, 0).timestamp()], "weather_code": [0] }
        }));

        let current = current_conditions(&response, &WeatherConfig::default()).unwrap();
        assert_eq!(current.timezone, None);

        let forecast = daily_forecast(&response, &WeatherConfig::default()).unwrap();
        assert_eq!(forecast.timezone, None);
        assert_eq!(forecast.days.len(), 1);
    }

    #[test]
    fn hourly_filters_window_and_renders_local_time() {
        let midnight = utc(0, 0).timestamp();
        let times: Vec<i64> = (0..48).map(|h| midnight + h * 3_600).collect();
        let codes: Vec<i32> = vec![0; 48];
        let response = parse(json!({
            "latitude": 52.52,
            "longitude": 13.41,
            "utc_offset_seconds": 0,
            "hourly": { "time": times, "weather_code": codes, "temperature_2m": vec![5.0; 48] },
            "daily": {
                "time": [midnight, midnight + 86_400],
                "sunrise": [utc(7, 0).timestamp(), utc(7, 0).timestamp() + 86_400],
                "sunset": [utc(18, 0).timestamp(), utc(18, 0).timestamp() + 86_400]
            }
        }));
        let tz = Timezone::parse("Europe/Berlin").unwrap();

        let forecast = hourly_forecast(
            &response,
            &WeatherConfig::default(),
            utc(16, 30),
            4,
            tz,
        )
        .unwrap();

        let stamps: Vec<String> = forecast.hours.iter().map(|h| h.local_time.clone()).collect();
        assert_eq!(
            stamps,
            [
                "2026-03-14 17:00",
                "2026-03-14 18:00",
                "2026-03-14 19:00",
                "2026-03-14 20:00",
                "2026-03-14 21:00"
            ]
        );
        assert!(forecast.hours[0].is_day);
        assert_eq!(forecast.hours[0].icon, "01d");
        assert!(!forecast.hours[2].is_day);
        assert_eq!(forecast.hours[2].icon, "01n");
        assert_eq!(forecast.timezone, "Europe/Berlin");
    }
}
