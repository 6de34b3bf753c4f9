//! Entities - normalized output shapes returned to callers

mod place;
mod transit;
mod weather;

pub use place::Place;
pub use transit::{Connection, Departure, Line, Station, StationKind, UNKNOWN};
pub use weather::{
    CurrentConditions, DailyForecast, ForecastDay, ForecastHour, HourlyForecast, Measurement,
};
