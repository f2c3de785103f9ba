//! Typed client for the ZoneMinder REST endpoints zmng targets.
//!
//! Bound to one discovered API base URL. The endpoints themselves are fixed
//! by the server's API contract: `host/login.json` for authentication,
//! `host/getVersion.json` for identity, and `configs/viewByName/{name}.json`
//! for server configuration values.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use super::http::{HttpTransport, TransportError};

pub const LOGIN_PATH: &str = "host/login.json";
pub const VERSION_PATH: &str = "host/getVersion.json";

/// Errors from the ZoneMinder REST API client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{url} returned an unexpected body: {reason}")]
    InvalidBody { url: String, reason: String },

    #[error("login succeeded but no access token was returned")]
    MissingToken,
}

impl ApiError {
    fn status(url: impl Into<String>, status: u16) -> Self {
        Self::Status {
            url: url.into(),
            status,
        }
    }

    fn invalid_body(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidBody {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

/// Tokens returned by a successful login.
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub version: Option<String>,
}

/// Thin typed wrapper over one discovered API base URL.
pub struct ZmApi<T: HttpTransport> {
    transport: Arc<T>,
    api_url: String,
    timeout: Duration,
}

impl<T: HttpTransport> ZmApi<T> {
    pub fn new(transport: Arc<T>, api_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            transport,
            api_url: api_url.into(),
            timeout,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        let base = self.api_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    /// POST credentials to `host/login.json` and return the session tokens.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginSession, ApiError> {
        let url = self.endpoint(LOGIN_PATH);
        debug!(url = url.as_str(), "Logging in");
        let response = self
            .transport
            .post_form(&url, &[("user", username), ("pass", password)], self.timeout)
            .await?;
        if !response.is_success() {
            return Err(ApiError::status(url, response.status));
        }

        let body: LoginBody = serde_json::from_str(&response.body)
            .map_err(|source| ApiError::invalid_body(&url, source.to_string()))?;
        let access_token = body
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or(ApiError::MissingToken)?;

        info!("Authenticated against ZoneMinder API");
        Ok(LoginSession {
            access_token,
            refresh_token: body.refresh_token,
            version: body.version,
        })
    }

    /// Fetch the server's reported version. Anonymous on most installs;
    /// servers that gate it return 401 and surface as [`ApiError::Status`].
    pub async fn version(&self) -> Result<String, ApiError> {
        let url = self.endpoint(VERSION_PATH);
        let response = self.transport.get(&url, self.timeout).await?;
        if !response.is_success() {
            return Err(ApiError::status(url, response.status));
        }

        let body: VersionBody = serde_json::from_str(&response.body)
            .map_err(|source| ApiError::invalid_body(&url, source.to_string()))?;
        body.version
            .filter(|version| !version.is_empty())
            .ok_or_else(|| ApiError::invalid_body(url, "missing version field"))
    }

    /// Read one server configuration value by name, e.g. `ZM_PATH_ZMS`.
    /// Returns `None` when the config exists but carries no value.
    pub async fn config_value(&self, name: &str, token: &str) -> Result<Option<String>, ApiError> {
        let url = format!(
            "{}?token={token}",
            self.endpoint(&format!("configs/viewByName/{name}.json"))
        );
        let response = self.transport.get(&url, self.timeout).await?;
        if !response.is_success() {
            return Err(ApiError::status(url, response.status));
        }

        let body: ConfigBody = serde_json::from_str(&response.body)
            .map_err(|source| ApiError::invalid_body(&url, source.to_string()))?;
        Ok(body
            .config
            .and_then(|envelope| envelope.config)
            .and_then(|record| record.value)
            .filter(|value| !value.is_empty()))
    }
}

#[derive(Deserialize)]
struct LoginBody {
    access_token: Option<String>,
    refresh_token: Option<String>,
    version: Option<String>,
}

#[derive(Deserialize)]
struct VersionBody {
    version: Option<String>,
}

#[derive(Deserialize)]
struct ConfigBody {
    config: Option<ConfigEnvelope>,
}

#[derive(Deserialize)]
struct ConfigEnvelope {
    #[serde(rename = "Config")]
    config: Option<ConfigRecord>,
}

#[derive(Deserialize)]
struct ConfigRecord {
    #[serde(rename = "Value")]
    value: Option<String>,
}
