//! Allow-listed fetch client
//!
//! Every URL is checked against the allow-list before the transport is
//! touched. Transport failures are retried up to the caller's attempt
//! budget; a completed response is never retried, whatever its status.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::allow_list::AllowList;
use crate::error::FetchError;
use crate::retry::{RetryConfig, with_retry};
use crate::transport::{HttpTransport, RawResponse, ReqwestTransport, TransportConfig};

/// Per-call options
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Total transport attempts, including the first (default: 1)
    pub max_attempts: u32,
    /// URL written to the log instead of the real one
    pub display_url: Option<String>,
    /// Extra request headers
    pub headers: Vec<(String, String)>,
    /// Upper bound for the whole call, retries included
    pub deadline: Option<Duration>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            display_url: None,
            headers: Vec::new(),
            deadline: None,
        }
    }
}

impl FetchOptions {
    /// Options allowing `max_attempts` transport attempts
    #[must_use]
    pub fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    /// Log `url` instead of the real URL
    #[must_use]
    pub fn display_url(mut self, url: impl Into<String>) -> Self {
        self.display_url = Some(url.into());
        self
    }

    /// Add a request header
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Bound the whole call, retries included
    #[must_use]
    pub const fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Bound the whole call to `millis`; `0` leaves it unbounded
    #[must_use]
    pub fn deadline_ms(self, millis: u64) -> Self {
        if millis == 0 {
            self
        } else {
            self.deadline(Duration::from_millis(millis))
        }
    }
}

/// Result of one logical upstream call
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse<B> {
    /// HTTP status code
    pub status: u16,
    /// Whether the status is 2xx
    pub ok: bool,
    /// Decoded body
    pub body: B,
}

impl UpstreamResponse<Value> {
    /// Reason text a provider attached to an error body, if any
    ///
    /// Providers disagree on the key, so `reason`, `error` and `message`
    /// are tried in that order.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        ["reason", "error", "message"]
            .iter()
            .find_map(|key| self.body.get(key).and_then(Value::as_str))
            .filter(|s| !s.trim().is_empty())
    }
}

/// HTTP client restricted to allow-listed upstream hosts
#[derive(Clone)]
pub struct FetchClient {
    transport: Arc<dyn HttpTransport>,
    allow_list: Arc<AllowList>,
    retry: RetryConfig,
}

impl fmt::Debug for FetchClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchClient")
            .field("allow_list", &self.allow_list)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl FetchClient {
    /// Create a client over an arbitrary transport
    #[must_use]
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        allow_list: Arc<AllowList>,
        retry: RetryConfig,
    ) -> Self {
        Self {
            transport,
            allow_list,
            retry,
        }
    }

    /// Create a client backed by reqwest
    ///
    /// # Errors
    ///
    /// Returns `FetchError::ClientInit` if the HTTP client cannot be built.
    pub fn from_config(
        config: &TransportConfig,
        allow_list: Arc<AllowList>,
        retry: RetryConfig,
    ) -> Result<Self, FetchError> {
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::new(Arc::new(transport), allow_list, retry))
    }

    /// The allow-list this client enforces
    #[must_use]
    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    /// Fetch `url` and decode the body as JSON
    ///
    /// Non-2xx bodies are decoded best effort and become `Value::Null` when
    /// they are not JSON.
    ///
    /// # Errors
    ///
    /// `HostNotAllowed` before any network activity, `Transport`/`Timeout`
    /// once the attempt budget is spent, `Decode` for an undecodable 2xx
    /// body, `DeadlineExceeded` when the deadline elapses.
    pub async fn fetch_json(
        &self,
        url: &str,
        options: &FetchOptions,
    ) -> Result<UpstreamResponse<Value>, FetchError> {
        let raw = self.fetch(url, options).await?;
        let ok = raw.is_success();

        let body = if raw.body.is_empty() {
            if ok {
                return Err(FetchError::Decode("empty body".to_string()));
            }
            Value::Null
        } else {
            match serde_json::from_slice::<Value>(&raw.body) {
                Ok(value) => value,
                Err(e) if ok => return Err(FetchError::Decode(e.to_string())),
                Err(_) => Value::Null,
            }
        };

        Ok(UpstreamResponse {
            status: raw.status,
            ok,
            body,
        })
    }

    /// Fetch `url` and return the raw body
    ///
    /// # Errors
    ///
    /// Same as [`fetch_json`](Self::fetch_json) except no decoding happens.
    pub async fn fetch_buffer(
        &self,
        url: &str,
        options: &FetchOptions,
    ) -> Result<UpstreamResponse<Bytes>, FetchError> {
        let raw = self.fetch(url, options).await?;
        Ok(UpstreamResponse {
            status: raw.status,
            ok: raw.is_success(),
            body: raw.body,
        })
    }

    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<RawResponse, FetchError> {
        if !self.allow_list.is_allowed(url) {
            warn!(url = %options.display_url.as_deref().unwrap_or(url), "Rejected URL outside allow-list");
            return Err(FetchError::HostNotAllowed {
                url: url.to_string(),
            });
        }

        let display_url = options.display_url.as_deref().unwrap_or(url);
        info!(url = %display_url, "Fetching upstream");

        let attempts = with_retry(&self.retry, options.max_attempts, || {
            self.transport.get(url, &options.headers)
        });

        let outcome = match options.deadline {
            Some(deadline) => tokio::time::timeout(deadline, attempts).await.map_err(|_| {
                warn!(url = %display_url, ?deadline, "Upstream deadline exceeded");
                FetchError::DeadlineExceeded {
                    deadline_ms: u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX),
                }
            })?,
            None => attempts.await,
        };
        debug!(
            url = %display_url,
            attempts = outcome.attempts,
            elapsed_ms = u64::try_from(outcome.total_duration.as_millis()).unwrap_or(u64::MAX),
            ok = outcome.is_ok(),
            "Upstream call finished"
        );
        let raw = outcome.into_result()?;

        if !raw.is_success() {
            warn!(url = %display_url, status = raw.status, "Upstream returned non-success status");
        }

        Ok(raw)
    }
}
