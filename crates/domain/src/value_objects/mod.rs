//! Value Objects - Immutable, identity-less domain primitives

mod geo_location;
mod timezone;

pub use geo_location::{GeoLocation, InvalidCoordinates};
pub use timezone::{InvalidTimezone, Timezone};
