//! Waypoint HTTP presentation layer
//!
//! Routes, request parameter validation and error rendering for the
//! weather, transit and geocoding API.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ApiError, set_expose_internal_errors};
pub use middleware::{ParamDescriptor, ParamLocation, ParamSet, Rule};
pub use routes::create_router;
pub use state::AppState;
