//! HTTP request handlers

pub mod common;
pub mod geocoding;
pub mod health;
pub mod transit;
pub mod weather;
