//! Domain layer for Waypoint
//!
//! Contains the categorized error raised by every layer, the normalized
//! weather and transit DTOs, and validated value objects. This layer knows
//! nothing about HTTP clients or upstream providers.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::{BoxError, ServiceError};
pub use value_objects::*;
