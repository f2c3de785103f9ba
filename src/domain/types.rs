use serde::{Deserialize, Serialize};

/// Resolved addressing for one ZoneMinder server, produced by endpoint
/// discovery and consumed wherever the server is subsequently contacted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEndpoints {
    /// Web portal base: scheme + host + optional port + optional subpath,
    /// no trailing slash.
    pub portal_url: String,
    /// REST API base, always `portal_url` plus the mounted API path.
    pub api_url: String,
    /// Full streaming CGI endpoint, including the executable name.
    pub cgi_url: String,
}
