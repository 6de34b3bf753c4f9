//! HTTP middleware components

pub mod validation;

pub use validation::{ParamDescriptor, ParamLocation, ParamSet, Rule, validate_params};
