//! Web view configuration.
//!
//! `WebViewConfig` controls how a [`ManagedWebView`](crate::webview::ManagedWebView)
//! pre-flights navigations and how its engine instance is configured.
//! Defaults come from [`Default`]; [`WebViewConfig::builder()`] customizes
//! them with validation.
//!
//! # Examples
//!
//! ```rust
//! use managed_webview::config::{ScriptInjection, WebViewConfig};
//! use std::time::Duration;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = WebViewConfig::builder()
//!     .user_agent("MyApp/2.1")
//!     .redirect_timeout(Duration::from_secs(3))
//!     .script_injection(ScriptInjection::Accumulate)
//!     .build()?; // returns Result<WebViewConfig, WebViewConfigError>
//! assert_eq!(cfg.redirect_timeout, Duration::from_secs(3));
//! # Ok(()) }
//! ```
//!
//! # Fields (summary)
//! - `user_agent`: Optional `User-Agent` override applied whenever cookies are attached.
//! - `redirect_timeout`: Timeout of the single redirect re-fetch (default: 5 s, must be non-zero).
//! - `allows_inline_media_playback`: Passed to the engine (default: `true`).
//! - `content_mode`: Preferred content mode (default: `Mobile`).
//! - `allows_back_forward_gestures`: Passed to the engine (default: `true`).
//! - `clear_site_data_on_drop`: Clear cookies and caches when the view goes away (default: `true`).
//! - `script_injection`: How cookie scripts are kept in the engine (default: `ReplacePerCookie`).

use crate::engine::ContentMode;
use http::HeaderValue;
use std::fmt;
use std::time::Duration;

/// How pushed cookies are kept as document-start scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScriptInjection {
    /// Every push adds one script per cookie. Scripts are never removed, so
    /// the script list grows with every navigation.
    Accumulate,
    /// At most one script per cookie (domain, path, name). A newer push
    /// replaces the older script.
    #[default]
    ReplacePerCookie,
}

#[derive(Debug, Clone)]
pub struct WebViewConfig {
    pub user_agent: Option<String>,
    pub redirect_timeout: Duration,
    pub allows_inline_media_playback: bool,
    pub content_mode: ContentMode,
    pub allows_back_forward_gestures: bool,
    pub clear_site_data_on_drop: bool,
    pub script_injection: ScriptInjection,
}

impl Default for WebViewConfig {
    fn default() -> Self {
        Self {
            user_agent: None,
            redirect_timeout: Duration::from_secs(5),
            allows_inline_media_playback: true,
            content_mode: ContentMode::Mobile,
            allows_back_forward_gestures: true,
            clear_site_data_on_drop: true,
            script_injection: ScriptInjection::default(),
        }
    }
}

impl WebViewConfig {
    pub fn builder() -> WebViewConfigBuilder {
        WebViewConfigBuilder::default()
    }
}

/// Builder for [`WebViewConfig`].
#[derive(Debug, Clone, Default)]
pub struct WebViewConfigBuilder {
    inner: WebViewConfig,
}

impl WebViewConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut WebViewConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn user_agent<S: Into<String>>(self, ua: S) -> Self { self.map(|c| c.user_agent = Some(ua.into())) }
    pub fn redirect_timeout(self, timeout: Duration) -> Self { self.map(|c| c.redirect_timeout = timeout) }
    pub fn allows_inline_media_playback(self, on: bool) -> Self { self.map(|c| c.allows_inline_media_playback = on) }
    pub fn content_mode(self, mode: ContentMode) -> Self { self.map(|c| c.content_mode = mode) }
    pub fn allows_back_forward_gestures(self, on: bool) -> Self { self.map(|c| c.allows_back_forward_gestures = on) }
    pub fn clear_site_data_on_drop(self, on: bool) -> Self { self.map(|c| c.clear_site_data_on_drop = on) }
    pub fn script_injection(self, mode: ScriptInjection) -> Self { self.map(|c| c.script_injection = mode) }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut WebViewConfig)) -> Self { self.map(f) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<WebViewConfig, WebViewConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

// ---------- Validation ----------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebViewConfigError {
    ZeroRedirectTimeout,
    InvalidUserAgent(String),
}

impl fmt::Display for WebViewConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebViewConfigError::ZeroRedirectTimeout =>
                write!(f, "redirect_timeout must be greater than zero"),
            WebViewConfigError::InvalidUserAgent(ua) =>
                write!(f, "user_agent {ua:?} is not a valid header value"),
        }
    }
}
impl std::error::Error for WebViewConfigError {}

pub(crate) fn validate(c: &WebViewConfig) -> Result<(), WebViewConfigError> {
    if c.redirect_timeout.is_zero() {
        return Err(WebViewConfigError::ZeroRedirectTimeout);
    }
    if let Some(ua) = &c.user_agent {
        if ua.trim().is_empty() || HeaderValue::from_str(ua).is_err() {
            return Err(WebViewConfigError::InvalidUserAgent(ua.clone()));
        }
    }
    Ok(())
}
