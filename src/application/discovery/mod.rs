//! ZoneMinder endpoint discovery.
//!
//! Given whatever the user typed — a bare host, `host:port`, or a full URL —
//! the engine probes candidate base URLs and API mount points in order until
//! one answers like a ZoneMinder API, then derives the portal, API, and
//! streaming CGI URLs. With credentials it additionally logs in and reads
//! the server's `ZM_PATH_ZMS` configuration to replace the inferred CGI path
//! with the configured one.
//!
//! Probes run strictly sequentially: each outcome decides whether the next
//! pair is attempted, and hammering an unknown server concurrently risks
//! rate limits and duplicate login attempts. The engine holds no shared
//! mutable state, so independent `discover` calls may run concurrently.

pub mod candidates;

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::types::ServerEndpoints;
use crate::infrastructure::api::ZmApi;
use crate::infrastructure::http::{HttpResponse, HttpTransport, TransportError};

use candidates::{API_PATHS, candidate_bases, normalize_input};

/// Default per-probe request timeout.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Primary probe target; a live API answers it and names its version.
const VERSION_PROBE: &str = "host/getVersion.json";
/// Fallback probe target; has no universal version field, so status alone
/// decides.
const LOGIN_PROBE: &str = "host/login.json";
/// Streaming executable assumed when the server's configured path is
/// unknown.
const DEFAULT_ZMS_PATH: &str = "/cgi-bin/nph-zms";
/// Server config key holding the streaming CGI path.
const ZMS_PATH_CONFIG: &str = "ZM_PATH_ZMS";

/// Per-call discovery inputs beyond the typed address.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    /// Supplying both username and password enables the authenticated
    /// CGI-path refinement after a successful probe.
    pub username: Option<String>,
    pub password: Option<String>,
    /// Cooperative cancel signal, checked at every probe boundary.
    pub cancel: CancellationToken,
}

/// Discovery failures, distinguishable so callers can branch — a manual-URL
/// entry fallback makes sense on [`DiscoveryError::ApiNotFound`] but not on
/// [`DiscoveryError::Cancelled`].
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("no server answered at any of: {attempted}")]
    PortalUnreachable { attempted: String },

    #[error("no ZoneMinder API found under: {attempted}")]
    ApiNotFound { attempted: String },

    #[error("discovery was cancelled")]
    Cancelled,

    #[error("portal {portal_url} and API {api_url} resolved to different schemes")]
    SchemeMismatch { portal_url: String, api_url: String },

    #[error("discovery failed unexpectedly: {message}")]
    Unknown { message: String },
}

impl DiscoveryError {
    fn portal_unreachable(bases: &[String]) -> Self {
        Self::PortalUnreachable {
            attempted: bases.join(", "),
        }
    }

    fn api_not_found(bases: &[String]) -> Self {
        Self::ApiNotFound {
            attempted: bases.join(", "),
        }
    }

    fn scheme_mismatch(portal_url: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self::SchemeMismatch {
            portal_url: portal_url.into(),
            api_url: api_url.into(),
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }
}

/// Outcome of probing one `(base, api_path)` pair.
enum ProbeOutcome {
    /// The pair answers like a ZoneMinder API.
    Confirmed,
    /// The server answered HTTP but nothing API-shaped lives at this path.
    HttpMiss,
    /// No HTTP response at all (DNS, refused, timeout).
    Unreachable,
}

/// The discovery engine. Stateless across calls; the transport is the only
/// collaborator and is injected explicitly.
pub struct DiscoveryEngine<T: HttpTransport> {
    transport: Arc<T>,
    probe_timeout: Duration,
}

impl<T: HttpTransport> DiscoveryEngine<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            transport,
            probe_timeout: PROBE_TIMEOUT,
        }
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Resolve a user-typed address into [`ServerEndpoints`].
    ///
    /// Issues network requests only; no state survives the call, and two
    /// calls against an unchanged server yield identical results.
    pub async fn discover(
        &self,
        input: &str,
        options: DiscoveryOptions,
    ) -> Result<ServerEndpoints, DiscoveryError> {
        if normalize_input(input).is_empty() {
            return Err(DiscoveryError::unknown("empty server address"));
        }
        let bases = candidate_bases(input);
        info!(input, candidates = bases.len(), "Starting endpoint discovery");

        let mut saw_http_response = false;
        for base in &bases {
            for api_path in API_PATHS {
                let full_api_url = format!("{base}{api_path}");
                if options.cancel.is_cancelled() {
                    debug!(url = full_api_url.as_str(), "Cancelled before probe");
                    return Err(DiscoveryError::Cancelled);
                }

                match self.probe_pair(&full_api_url, &options.cancel).await? {
                    ProbeOutcome::Confirmed => {
                        info!(api_url = full_api_url.as_str(), "API endpoint confirmed");
                        return self.finish(base, &full_api_url, &options).await;
                    }
                    ProbeOutcome::HttpMiss => saw_http_response = true,
                    ProbeOutcome::Unreachable => {}
                }
            }
        }

        warn!(
            attempted = bases.join(", ").as_str(),
            "Discovery exhausted all candidates"
        );
        if saw_http_response {
            Err(DiscoveryError::api_not_found(&bases))
        } else {
            Err(DiscoveryError::portal_unreachable(&bases))
        }
    }

    /// Probe one candidate API base: `getVersion.json` first, then
    /// `login.json` — but only when the first miss was HTTP-level. A dead
    /// server will not suddenly answer a different path.
    async fn probe_pair(
        &self,
        full_api_url: &str,
        cancel: &CancellationToken,
    ) -> Result<ProbeOutcome, DiscoveryError> {
        let version_url = format!("{full_api_url}/{VERSION_PROBE}");
        match self.request(&version_url, cancel).await? {
            Ok(response) => {
                if probe_confirms(&response, true) {
                    return Ok(ProbeOutcome::Confirmed);
                }
                debug!(
                    url = version_url.as_str(),
                    status = response.status,
                    "Version probe missed; trying login fallback"
                );
            }
            Err(error) => {
                debug!(url = version_url.as_str(), error = %error, "Version probe unreachable");
                return Ok(ProbeOutcome::Unreachable);
            }
        }

        let login_url = format!("{full_api_url}/{LOGIN_PROBE}");
        match self.request(&login_url, cancel).await? {
            Ok(response) if probe_confirms(&response, false) => Ok(ProbeOutcome::Confirmed),
            Ok(response) => {
                debug!(
                    url = login_url.as_str(),
                    status = response.status,
                    "Login fallback missed"
                );
                Ok(ProbeOutcome::HttpMiss)
            }
            // The version probe already proved the server answers HTTP.
            Err(error) => {
                debug!(url = login_url.as_str(), error = %error, "Login fallback unreachable");
                Ok(ProbeOutcome::HttpMiss)
            }
        }
    }

    /// One probe GET, racing the cancel signal so an in-flight request is
    /// dropped as soon as cancellation is observed.
    async fn request(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<Result<HttpResponse, TransportError>, DiscoveryError> {
        tokio::select! {
            _ = cancel.cancelled() => Err(DiscoveryError::Cancelled),
            result = self.transport.get(url, self.probe_timeout) => Ok(result),
        }
    }

    /// Derive the result triple from a confirmed pair, then optionally
    /// refine the CGI path through an authenticated config lookup.
    async fn finish(
        &self,
        base: &str,
        full_api_url: &str,
        options: &DiscoveryOptions,
    ) -> Result<ServerEndpoints, DiscoveryError> {
        let portal_url = base.to_string();
        let api_url = full_api_url.to_string();
        verify_scheme_consistency(&portal_url, &api_url)?;

        let mut cgi_url = format!("{portal_url}{DEFAULT_ZMS_PATH}");
        if let (Some(username), Some(password)) = (&options.username, &options.password) {
            if options.cancel.is_cancelled() {
                return Err(DiscoveryError::Cancelled);
            }
            if let Some(configured) = self
                .fetch_zms_path(&api_url, &portal_url, username, password, &options.cancel)
                .await?
            {
                cgi_url = configured;
            }
        }

        info!(
            portal_url = portal_url.as_str(),
            api_url = api_url.as_str(),
            cgi_url = cgi_url.as_str(),
            "Discovery complete"
        );
        Ok(ServerEndpoints {
            portal_url,
            api_url,
            cgi_url,
        })
    }

    /// Authenticated CGI-path refinement. Every failure except cancellation
    /// is swallowed here — the inferred default path still works for most
    /// installs, and the caller asked for discovery, not login.
    async fn fetch_zms_path(
        &self,
        api_url: &str,
        portal_url: &str,
        username: &str,
        password: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<String>, DiscoveryError> {
        let api = ZmApi::new(self.transport.clone(), api_url, self.probe_timeout);

        let session = tokio::select! {
            _ = cancel.cancelled() => return Err(DiscoveryError::Cancelled),
            result = api.login(username, password) => match result {
                Ok(session) => session,
                Err(error) => {
                    warn!(error = %error, "Login for CGI path lookup failed; keeping inferred path");
                    return Ok(None);
                }
            },
        };

        let value = tokio::select! {
            _ = cancel.cancelled() => return Err(DiscoveryError::Cancelled),
            result = api.config_value(ZMS_PATH_CONFIG, &session.access_token) => match result {
                Ok(value) => value,
                Err(error) => {
                    warn!(error = %error, "ZM_PATH_ZMS lookup failed; keeping inferred path");
                    return Ok(None);
                }
            },
        };

        let Some(path) = value else {
            warn!("Server reports an empty ZM_PATH_ZMS; keeping inferred path");
            return Ok(None);
        };
        let Some(origin) = origin_of(portal_url) else {
            warn!(portal_url, "Could not extract origin; keeping inferred path");
            return Ok(None);
        };
        info!(path = path.as_str(), "Using server-configured streaming path");
        Ok(Some(format!("{origin}{path}")))
    }
}

/// Portal and API must share one scheme. A split-protocol pairing means the
/// deployment is misconfigured and the user has to fix it, not something the
/// client papers over.
pub fn verify_scheme_consistency(portal_url: &str, api_url: &str) -> Result<(), DiscoveryError> {
    if scheme_of(portal_url) != scheme_of(api_url) {
        return Err(DiscoveryError::scheme_mismatch(portal_url, api_url));
    }
    Ok(())
}

fn scheme_of(url: &str) -> Option<&str> {
    url.split_once("://").map(|(scheme, _)| scheme)
}

/// Scheme + host + port of a URL, dropping any subpath. The configured
/// `ZM_PATH_ZMS` value is absolute from the origin, not from the portal
/// subpath.
fn origin_of(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_string();
    let scheme = parsed.scheme();
    Some(match parsed.port() {
        Some(port) => format!("{scheme}://{host}:{port}"),
        None => format!("{scheme}://{host}"),
    })
}

/// Statuses that prove an endpoint exists: 200 live, 401 exists but wants
/// auth, 405 exists but rejects the method. A 200 additionally has to look
/// like a version document when `require_version_body` is set, so a generic
/// web server or redirected login page answering 200 does not pass.
fn probe_confirms(response: &HttpResponse, require_version_body: bool) -> bool {
    match response.status {
        200 => !require_version_body || body_has_version(&response.body),
        401 | 405 => true,
        _ => false,
    }
}

fn body_has_version(body: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .as_object()
                .map(|object| object.contains_key("version") || object.contains_key("apiversion"))
        })
        .unwrap_or(false)
}
