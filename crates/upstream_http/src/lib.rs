//! Upstream HTTP
//!
//! Outbound calls to third-party providers. Every URL is checked against a
//! read-only host allow-list before any network activity, transport
//! failures are retried a bounded number of times, and non-2xx statuses
//! are returned to the caller untouched for interpretation.

pub mod allow_list;
pub mod client;
pub mod error;
pub mod retry;
pub mod transport;

pub use allow_list::AllowList;
pub use client::{FetchClient, FetchOptions, UpstreamResponse};
pub use error::FetchError;
pub use retry::{RetryConfig, Retryable};
pub use transport::{HttpTransport, RawResponse, ReqwestTransport, TransportConfig};
