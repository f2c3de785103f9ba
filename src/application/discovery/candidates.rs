//! Candidate generation for endpoint discovery.

/// API mount points probed under each base URL, in order: an install under
/// the `/zm` subpath is the common layout, web-root installs come second.
pub const API_PATHS: [&str; 2] = ["/zm/api", "/api"];

/// Normalize raw user input: trim whitespace, drop one trailing slash.
pub fn normalize_input(input: &str) -> String {
    let trimmed = input.trim();
    trimmed.strip_suffix('/').unwrap_or(trimmed).to_string()
}

/// Candidate base URLs in probe order. An explicit scheme is trusted as-is;
/// a bare host tries https before http, since most deployments terminate TLS
/// at the edge while LAN-only installs stay on plain http.
pub fn candidate_bases(input: &str) -> Vec<String> {
    let normalized = normalize_input(input);
    if normalized.starts_with("http://") || normalized.starts_with("https://") {
        vec![normalized]
    } else {
        vec![
            format!("https://{normalized}"),
            format!("http://{normalized}"),
        ]
    }
}
