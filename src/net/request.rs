//! Navigation request model.
//!
//! A [`Request`] is a value: every transformation (attaching cookies, overriding
//! the user agent) produces a new request and leaves the input untouched.
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use std::time::Duration;
use url::Url;

/// How a request may use cached data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Follow whatever the protocol and the response headers allow.
    #[default]
    UseProtocolCachePolicy,
    /// Bypass local and intermediate caches.
    ReloadIgnoringCacheData,
    /// Use cached data regardless of age, load only when nothing is cached.
    ReturnCacheDataElseLoad,
    /// Use cached data only, never load.
    ReturnCacheDataDontLoad,
}

/// A navigation request.
#[derive(Debug, Clone)]
pub struct Request {
    /// Target URL. A request without URL can still be handed to the engine,
    /// but it cannot be pre-flighted.
    pub url: Option<Url>,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    pub cache_policy: CachePolicy,
    /// Request timeout. `None` means the transport default.
    pub timeout: Option<Duration>,
}

impl Request {
    /// A `GET` request for `url` with default cache policy and timeout.
    pub fn new(url: Url) -> Self {
        Self {
            url: Some(url),
            ..Self::empty()
        }
    }

    /// A request without a URL.
    pub fn empty() -> Self {
        Self {
            url: None,
            method: Method::GET,
            headers: HeaderMap::new(),
            body: Vec::new(),
            cache_policy: CachePolicy::default(),
            timeout: None,
        }
    }

    /// Parses `url` into a `GET` request.
    pub fn parse(url: &str) -> Result<Self, url::ParseError> {
        Ok(Self::new(Url::parse(url)?))
    }

    pub fn with_cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache_policy = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets (replaces) a header. Values that are not valid header text are ignored.
    pub fn set_header(&mut self, name: HeaderName, value: &str) {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
    }

    /// Returns the value of `name` as text, if present and valid.
    pub fn header(&self, name: &HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The `Cookie` header currently attached to this request.
    pub fn cookie_header(&self) -> Option<&str> {
        self.header(&http::header::COOKIE)
    }
}
