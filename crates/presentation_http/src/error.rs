//! API error handling
//!
//! Renders failures as `{ "error": message }` with the matching status.
//! Categorized errors keep their own status and client-safe message; any
//! other failure becomes a 500 with a generic message, and only then is the
//! real error logged for operators.

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::ServiceError;
use serde::Serialize;
use tracing::{debug, error, warn};

/// Message returned for every uncategorized failure
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Whether unexpected errors carry `details`; off until configured
static EXPOSE_INTERNAL_ERRORS: AtomicBool = AtomicBool::new(false);

/// Configure whether details of unexpected errors are included in responses
pub fn set_expose_internal_errors(expose: bool) {
    EXPOSE_INTERNAL_ERRORS.store(expose, Ordering::SeqCst);
}

fn should_expose_details() -> bool {
    EXPOSE_INTERNAL_ERRORS.load(Ordering::SeqCst)
}

/// API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A deliberate failure carrying its own status and message
    #[error(transparent)]
    Categorized(#[from] ServiceError),

    /// Anything else
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Additional error details (development only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }
}

fn status_of(err: &ServiceError) -> StatusCode {
    StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Categorized(err) => {
                let status = status_of(&err);
                if status.is_server_error() {
                    warn!(status = status.as_u16(), error = %err, cause = %err.cause(), "Request failed");
                } else {
                    debug!(status = status.as_u16(), error = %err, "Request rejected");
                }
                (status, Json(ErrorResponse::new(err.message()))).into_response()
            },
            Self::Unexpected(err) => {
                error!(error = ?err, "Unhandled error");
                let body = ErrorResponse {
                    error: INTERNAL_ERROR_MESSAGE.to_string(),
                    details: should_expose_details().then(|| format!("{err:#}")),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            },
        }
    }
}

/// Response for a panic caught by `CatchPanicLayer`
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");

    ApiError::Unexpected(anyhow::anyhow!("handler panicked: {detail}")).into_response()
}
