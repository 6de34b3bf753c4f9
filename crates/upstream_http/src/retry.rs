//! Bounded retry with optional exponential backoff
//!
//! Attempts are sequential. Only errors reporting themselves as retryable
//! are retried, and never more than the caller's attempt budget.
//!
//! # Example
//!
//! ```rust,ignore
//! use upstream_http::retry::{RetryConfig, with_retry};
//!
//! let config = RetryConfig::default();
//! let result = with_retry(&config, 3, || async {
//!     transport.get(url, &[]).await
//! }).await;
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Backoff applied between retry attempts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Delay before the first retry in milliseconds (default: 100ms)
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,

    /// Maximum delay between retries in milliseconds (default: 2000ms)
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Whether to add jitter to prevent thundering herd (default: true)
    #[serde(default = "default_true")]
    pub jitter_enabled: bool,

    /// Maximum jitter factor (0.0 to 1.0, default: 0.1 = 10%)
    #[serde(default = "default_jitter_factor")]
    pub jitter_factor: f64,
}

const fn default_initial_delay() -> u64 {
    100
}

const fn default_max_delay() -> u64 {
    2_000
}

const fn default_multiplier() -> f64 {
    2.0
}

const fn default_true() -> bool {
    true
}

const fn default_jitter_factor() -> f64 {
    0.1
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay(),
            max_delay_ms: default_max_delay(),
            multiplier: default_multiplier(),
            jitter_enabled: default_true(),
            jitter_factor: default_jitter_factor(),
        }
    }
}

impl RetryConfig {
    /// Create a backoff configuration with custom parameters
    #[must_use]
    pub const fn new(initial_delay_ms: u64, max_delay_ms: u64, multiplier: f64) -> Self {
        Self {
            initial_delay_ms,
            max_delay_ms,
            multiplier,
            jitter_enabled: true,
            jitter_factor: 0.1,
        }
    }

    /// Retry immediately with no delay between attempts
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            initial_delay_ms: 0,
            max_delay_ms: 0,
            multiplier: 1.0,
            jitter_enabled: false,
            jitter_factor: 0.0,
        }
    }

    /// Disable jitter (not recommended for production)
    #[must_use]
    pub const fn without_jitter(mut self) -> Self {
        self.jitter_enabled = false;
        self
    }

    /// Calculate the delay for a given retry number (0-indexed)
    ///
    /// delay = initial_delay * multiplier^retry, capped at max_delay,
    /// with optional jitter.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_wrap,
        clippy::cast_sign_loss,
        clippy::cast_possible_truncation
    )]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base_delay = (self.initial_delay_ms as f64) * self.multiplier.powi(attempt as i32);
        let capped_delay = base_delay.min(self.max_delay_ms as f64);

        let final_delay = if self.jitter_enabled && capped_delay > 0.0 {
            let jitter_range = capped_delay * self.jitter_factor;
            let jitter = rand::rng().random_range(-jitter_range..=jitter_range);
            (capped_delay + jitter).max(0.0)
        } else {
            capped_delay
        };

        Duration::from_millis(final_delay as u64)
    }
}

/// Trait for errors that can be checked for retryability
pub trait Retryable {
    /// Returns true if this error is retryable
    fn is_retryable(&self) -> bool;
}

/// Retry result containing either success or the last error
#[derive(Debug)]
pub struct RetryResult<T, E> {
    /// The result of the operation
    pub result: Result<T, E>,
    /// Number of attempts made (1 = no retries, 2 = one retry, etc.)
    pub attempts: u32,
    /// Total time spent including retries
    pub total_duration: Duration,
}

impl<T, E> RetryResult<T, E> {
    /// Check if the operation succeeded
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Convert to standard Result, discarding metadata
    pub fn into_result(self) -> Result<T, E> {
        self.result
    }
}

/// Execute an async operation at most `max_attempts` times
///
/// A `max_attempts` of 0 is treated as 1. Non-retryable errors are
/// returned after the attempt that produced them.
#[allow(clippy::cast_possible_truncation)]
pub async fn with_retry<F, Fut, T, E>(
    config: &RetryConfig,
    max_attempts: u32,
    mut operation: F,
) -> RetryResult<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + std::fmt::Display,
{
    let max_attempts = max_attempts.max(1);
    let start = std::time::Instant::now();
    let mut attempts = 0u32;

    loop {
        attempts += 1;

        match operation().await {
            Ok(value) => {
                if attempts > 1 {
                    debug!(
                        attempts = attempts,
                        duration_ms = start.elapsed().as_millis() as u64,
                        "Operation succeeded after retries"
                    );
                }
                return RetryResult {
                    result: Ok(value),
                    attempts,
                    total_duration: start.elapsed(),
                };
            },
            Err(err) => {
                if !err.is_retryable() {
                    debug!(
                        attempts = attempts,
                        error = %err,
                        "Operation failed with non-retryable error"
                    );
                    return RetryResult {
                        result: Err(err),
                        attempts,
                        total_duration: start.elapsed(),
                    };
                }

                if attempts >= max_attempts {
                    warn!(
                        attempts = attempts,
                        max_attempts = max_attempts,
                        error = %err,
                        "Operation failed after max attempts"
                    );
                    return RetryResult {
                        result: Err(err),
                        attempts,
                        total_duration: start.elapsed(),
                    };
                }

                let delay = config.delay_for_attempt(attempts - 1);
                warn!(
                    attempt = attempts,
                    max_attempts = max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Operation failed, retrying"
                );

                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            },
        }
    }
}
