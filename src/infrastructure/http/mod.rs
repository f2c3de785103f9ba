//! HTTP transport seam shared by discovery and the API client.
//!
//! The transport hands back *every* HTTP response as data, whatever its
//! status code; [`TransportError`] is reserved for connection-level failures
//! where no response arrived at all. Callers that care about 401/405/404
//! inspect [`HttpResponse::status`] instead of catching errors.

mod client;

pub use client::ReqwestTransport;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// A plain HTTP response: status plus the full body as text.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Connection-level transport failures (DNS, refused, timeout). An HTTP
/// response with an error status is not a `TransportError`.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("could not connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },
}

impl TransportError {
    pub fn connect(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Connect {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    pub fn request(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Request {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

/// Abstract HTTP client used for probes and API calls.
///
/// Implementations must be stateless per request — no cookie jar, no session
/// reuse between calls — and must never attach ambient credentials; probe
/// requests rely on going out anonymous. Each request carries its own
/// timeout so a single unreachable host cannot hang a caller indefinitely.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, TransportError>;

    async fn post_form(
        &self,
        url: &str,
        fields: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError>;
}
