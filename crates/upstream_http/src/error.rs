//! Fetch-layer errors
//!
//! These are plain errors. Categorizing them into user-facing statuses is
//! left to the calling service.

use thiserror::Error;

use crate::retry::Retryable;

/// Errors raised by the fetch client
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL does not start with any allow-listed prefix
    #[error("Host not allowed: {url}")]
    HostNotAllowed {
        /// Rejected URL
        url: String,
    },

    /// Connection or protocol failure before a complete response was read
    #[error("Transport error: {0}")]
    Transport(String),

    /// A single attempt exceeded the per-call timeout
    #[error("Request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured per-call timeout
        timeout_secs: u64,
    },

    /// A 2xx body could not be decoded as JSON
    #[error("Invalid JSON body: {0}")]
    Decode(String),

    /// The caller's overall deadline elapsed, retries included
    #[error("Deadline of {deadline_ms}ms exceeded")]
    DeadlineExceeded {
        /// Deadline in milliseconds
        deadline_ms: u64,
    },

    /// The underlying HTTP client could not be built
    #[error("Failed to initialize HTTP client: {0}")]
    ClientInit(String),
}

impl Retryable for FetchError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout { .. })
    }
}
