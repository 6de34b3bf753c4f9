//! Categorized service error
//!
//! The single error shape raised deliberately by the validation, fetch and
//! normalization pipeline. It carries a client-safe message, an HTTP-style
//! status code and the lower-level cause for operators.

use std::error::Error as StdError;

use thiserror::Error;

/// Boxed lower-level error kept as the cause of a [`ServiceError`]
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Status used when none is given
pub const DEFAULT_STATUS: u16 = 500;

/// A failure with a message, an HTTP status and an underlying cause
///
/// The message is what the caller sees; the cause is only ever logged.
/// When no cause is supplied one is synthesized from the message, so the
/// origin of the failure is never lost.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ServiceError {
    message: String,
    status: u16,
    #[source]
    cause: BoxError,
}

/// Cause synthesized for errors raised without an underlying error
#[derive(Debug, Error)]
#[error("{0}")]
pub struct Origin(String);

impl ServiceError {
    /// Create an error with the default status (500)
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_status(message, DEFAULT_STATUS)
    }

    /// Create an error with an explicit status
    pub fn with_status(message: impl Into<String>, status: u16) -> Self {
        let message = message.into();
        Self {
            cause: Box::new(Origin(message.clone())),
            message,
            status,
        }
    }

    /// Client input was rejected (400)
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_status(message, 400)
    }

    /// Something failed on our side or upstream (500)
    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_status(message, DEFAULT_STATUS)
    }

    /// Attach the lower-level error that caused this one
    #[must_use]
    pub fn with_cause(mut self, cause: impl Into<BoxError>) -> Self {
        self.cause = cause.into();
        self
    }

    /// Client-safe message
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP-style status code
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// The underlying cause
    #[must_use]
    pub fn cause(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.cause.as_ref()
    }

    /// Whether the failure is attributable to the caller (4xx)
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status >= 400 && self.status < 500
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("socket closed")]
    struct SocketClosed;

    #[test]
    fn new_defaults_to_500() {
        let err = ServiceError::new("boom");
        assert_eq!(err.status(), 500);
        assert_eq!(err.message(), "boom");
        assert!(!err.is_client_error());
    }

    #[test]
    fn bad_request_is_client_error() {
        let err = ServiceError::bad_request("days is out of range");
        assert_eq!(err.status(), 400);
        assert!(err.is_client_error());
    }

    #[test]
    fn missing_cause_is_synthesized_from_message() {
        let err = ServiceError::internal("Failed to fetch weather");
        assert_eq!(err.cause().to_string(), "Failed to fetch weather");
        assert!(err.source().is_some());
    }

    #[test]
    fn explicit_cause_is_kept() {
        let err = ServiceError::internal("Failed to fetch departures").with_cause(SocketClosed);
        assert_eq!(err.cause().to_string(), "socket closed");
        assert_eq!(err.to_string(), "Failed to fetch departures");
    }

    #[test]
    fn display_is_message_only() {
        let err = ServiceError::with_status("Not found", 404);
        assert_eq!(err.to_string(), "Not found");
        assert_eq!(err.status(), 404);
    }
}
