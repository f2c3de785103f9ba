//! Production transport backed by reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{HttpResponse, HttpTransport, TransportError};

/// reqwest-backed transport. One shared connection pool, no cookie store,
/// per-request timeouts.
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }

    async fn read_response(
        url: &str,
        response: reqwest::Response,
    ) -> Result<HttpResponse, TransportError> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|source| TransportError::request(url, source.to_string()))?;
        Ok(HttpResponse { status, body })
    }

    fn classify(url: &str, source: reqwest::Error) -> TransportError {
        if source.is_timeout() {
            TransportError::timeout(url)
        } else if source.is_connect() {
            TransportError::connect(url, source.to_string())
        } else {
            TransportError::request(url, source.to_string())
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, TransportError> {
        debug!(url, "HTTP GET");
        let response = self
            .http
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|source| Self::classify(url, source))?;
        Self::read_response(url, response).await
    }

    async fn post_form(
        &self,
        url: &str,
        fields: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        debug!(url, "HTTP POST (form)");
        let response = self
            .http
            .post(url)
            .form(fields)
            .timeout(timeout)
            .send()
            .await
            .map_err(|source| Self::classify(url, source))?;
        Self::read_response(url, response).await
    }
}
