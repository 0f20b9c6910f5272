//! HTTP transport: the Drive download endpoint, the large-file confirmation
//! handshake, and the bounded retry loop.
//!
//! The [`HttpClient`] trait is the seam for dependency injection: production
//! code uses the blocking [`ReqwestClient`], tests script responses through a
//! mock. [`DriveFetcher`] owns everything that makes one logical fetch out of
//! the provider's quirks, so callers see a single
//! `download(id) -> final path` operation.

mod drive;
mod error;
mod http;
mod retry;

pub use drive::DriveFetcher;
pub use error::TransportError;
pub use http::{HttpClient, HttpResponse, ReqwestClient};
pub use retry::{RetryPolicy, DEFAULT_BACKOFF_SECS, DEFAULT_MAX_ATTEMPTS};

#[cfg(test)]
pub use http::tests::{ok_response, status_response, MockHttpClient};
