//! Minimal HTTP response model.
//!
//! This struct represents a **fully buffered** HTTP response returned by the
//! pre-flight transport. The transport never follows redirects on its own, so
//! `url` is always the URL that was requested and 3xx responses reach the caller.
//!
//! `headers` is an `http::HeaderMap`, which is **case-insensitive** for header
//! names and keeps repeated `Set-Cookie` headers apart.
use http::header::LOCATION;
use http::HeaderMap;
use url::Url;

/// Simple structure for HTTP responses.
#[derive(Debug, Clone)]
pub struct Response {
    /// URL of the response.
    pub url: Url,

    /// Numeric HTTP status code (e.g., `200`, `302`).
    pub status: u16,

    /// Human-readable reason phrase (e.g., `"OK"`, `"Found"`).
    pub status_text: String,

    /// Response headers as a case-insensitive map.
    pub headers: HeaderMap,

    /// Raw response body bytes.
    pub body: Vec<u8>,
}

impl Response {
    /// A bodiless response, mostly useful for transports and tests.
    pub fn new(url: Url, status: u16, headers: HeaderMap) -> Self {
        let status_text = http::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown")
            .to_string();

        Self {
            url,
            status,
            status_text,
            headers,
            body: Vec::new(),
        }
    }

    /// `true` for any status in `[300, 400)`.
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }

    /// The `Location` header resolved against the response URL.
    ///
    /// `None` when the header is missing, not text, or not a valid URL reference.
    pub fn location(&self) -> Option<Url> {
        let raw = self.headers.get(LOCATION)?.to_str().ok()?.trim();
        if raw.is_empty() {
            return None;
        }
        self.url.join(raw).ok()
    }
}
