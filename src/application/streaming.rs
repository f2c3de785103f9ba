//! Stream URL construction for the `nph-zms` CGI endpoint.
//!
//! Pure formatting over a discovered `cgi_url`; the streaming protocols
//! themselves are the server's business. Parameter order is fixed so
//! identical requests produce identical URLs.

/// Streaming mode understood by `nph-zms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    /// Continuous MJPEG stream.
    Jpeg,
    /// Single still frame.
    Single,
}

impl StreamMode {
    pub fn as_str(self) -> &'static str {
        match self {
            StreamMode::Jpeg => "jpeg",
            StreamMode::Single => "single",
        }
    }
}

/// Parameters for one monitor stream.
#[derive(Debug, Clone)]
pub struct StreamRequest {
    pub monitor_id: u32,
    pub mode: StreamMode,
    /// Percent scale, e.g. 50 for half size.
    pub scale: Option<u32>,
    pub maxfps: Option<u32>,
    pub buffer: Option<u32>,
    /// Access token appended when the server requires stream auth.
    pub auth_token: Option<String>,
}

impl StreamRequest {
    pub fn new(monitor_id: u32) -> Self {
        Self {
            monitor_id,
            mode: StreamMode::Jpeg,
            scale: None,
            maxfps: None,
            buffer: None,
            auth_token: None,
        }
    }

    pub fn with_mode(mut self, mode: StreamMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn with_maxfps(mut self, maxfps: u32) -> Self {
        self.maxfps = Some(maxfps);
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }
}

/// Build the full stream URL for a monitor against a discovered `cgi_url`.
pub fn stream_url(cgi_url: &str, request: &StreamRequest) -> String {
    let mut url = format!(
        "{}?mode={}&monitor={}",
        cgi_url.trim_end_matches('/'),
        request.mode.as_str(),
        request.monitor_id
    );
    if let Some(scale) = request.scale {
        url.push_str(&format!("&scale={scale}"));
    }
    if let Some(maxfps) = request.maxfps {
        url.push_str(&format!("&maxfps={maxfps}"));
    }
    if let Some(buffer) = request.buffer {
        url.push_str(&format!("&buffer={buffer}"));
    }
    if let Some(token) = &request.auth_token {
        url.push_str(&format!("&token={token}"));
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    const CGI_URL: &str = "https://zm.example.com/zm/cgi-bin/nph-zms";

    #[test]
    fn default_request_is_mjpeg_for_one_monitor() {
        assert_eq!(
            stream_url(CGI_URL, &StreamRequest::new(3)),
            "https://zm.example.com/zm/cgi-bin/nph-zms?mode=jpeg&monitor=3"
        );
    }

    #[test]
    fn optional_parameters_keep_fixed_order() {
        let request = StreamRequest::new(7)
            .with_mode(StreamMode::Single)
            .with_scale(50)
            .with_maxfps(5)
            .with_token("tok123");
        assert_eq!(
            stream_url(CGI_URL, &request),
            "https://zm.example.com/zm/cgi-bin/nph-zms?mode=single&monitor=7&scale=50&maxfps=5&token=tok123"
        );
    }

    #[test]
    fn trailing_slash_on_cgi_url_is_tolerated() {
        assert_eq!(
            stream_url("http://cam.local/cgi-bin/nph-zms/", &StreamRequest::new(1)),
            "http://cam.local/cgi-bin/nph-zms?mode=jpeg&monitor=1"
        );
    }
}
