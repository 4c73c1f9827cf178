//! Navigation and UI event types.
//!
//! The engine reports what it is doing through a
//! [`NavigationDelegate`](crate::webview::NavigationDelegate); the web view
//! turns those reports into the values defined here and hands them to the
//! user handlers in its [`HandlerTable`](crate::webview::HandlerTable).
//!
//! # Main Types
//!
//! - [`NavigationAction`]: a navigation the engine is about to perform.
//! - [`NavigationResponse`]: the response of a navigation the engine received.
//! - [`NavigationActionPolicy`] / [`NavigationResponsePolicy`]: policy decisions, both default to allow.
//! - [`NewWindowPolicy`]: what to do with a request for a new window.
//! - [`Decision`]: the continuation a handler uses to answer a decision.
use crate::net::Request;
use http::HeaderMap;
use std::fmt::{Debug, Display};
use tokio::sync::oneshot;
use url::Url;
use uuid::Uuid;

/// Identifies a managed web view.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WebViewId(Uuid);

impl WebViewId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WebViewId {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for WebViewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WebViewId({})", self.0)
    }
}

impl Display for WebViewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A frame taking part in a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameInfo {
    pub is_main_frame: bool,
    pub url: Option<Url>,
}

impl FrameInfo {
    pub fn main(url: Option<Url>) -> Self {
        Self { is_main_frame: true, url }
    }

    pub fn child(url: Option<Url>) -> Self {
        Self { is_main_frame: false, url }
    }
}

/// What triggered a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationType {
    LinkActivated,
    FormSubmitted,
    BackForward,
    Reload,
    FormResubmitted,
    #[default]
    Other,
}

/// A navigation the engine is about to perform.
#[derive(Debug, Clone)]
pub struct NavigationAction {
    pub request: Request,
    pub navigation_type: NavigationType,
    pub source_frame: Option<FrameInfo>,
    /// `None` when the navigation asks for a new window.
    pub target_frame: Option<FrameInfo>,
}

impl NavigationAction {
    pub fn new(request: Request) -> Self {
        Self {
            request,
            navigation_type: NavigationType::default(),
            source_frame: None,
            target_frame: None,
        }
    }

    pub fn with_target_frame(mut self, frame: FrameInfo) -> Self {
        self.target_frame = Some(frame);
        self
    }
}

/// The response of a navigation, as seen by the engine.
#[derive(Debug, Clone)]
pub struct NavigationResponse {
    pub url: Url,
    /// HTTP status. `None` for non-HTTP responses (`file:`, `data:` and such).
    pub status: Option<u16>,
    pub headers: HeaderMap,
    pub is_for_main_frame: bool,
}

impl NavigationResponse {
    pub fn http(url: Url, status: u16, headers: HeaderMap) -> Self {
        Self {
            url,
            status: Some(status),
            headers,
            is_for_main_frame: true,
        }
    }

    pub fn is_http(&self) -> bool {
        self.status.is_some()
    }
}

/// Features requested for a new window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowFeatures {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub menu_bar_visibility: Option<bool>,
    pub status_bar_visibility: Option<bool>,
    pub toolbars_visibility: Option<bool>,
    pub allows_resizing: Option<bool>,
}

/// A navigation the engine could not complete.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("navigation failed: {message}")]
pub struct NavigationError {
    pub url: Option<Url>,
    pub message: String,
}

impl NavigationError {
    pub fn new(url: Option<Url>, message: impl Into<String>) -> Self {
        Self {
            url,
            message: message.into(),
        }
    }
}

/// Answer to a navigation policy decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationActionPolicy {
    #[default]
    Allow,
    Cancel,
    Download,
}

/// Answer to a response policy decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationResponsePolicy {
    #[default]
    Allow,
    Cancel,
    Download,
}

/// What happened to a request for a new window.
///
/// A web view never opens a second view on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewWindowPolicy {
    /// Load the request in the requesting view instead.
    NavigateInPlace,
    /// Drop the request.
    Suppress,
}

impl NewWindowPolicy {
    /// Policy used when no handler is installed: main-frame and untargeted
    /// requests navigate in place, anything else is suppressed.
    pub fn default_for(action: &NavigationAction) -> Self {
        match &action.target_frame {
            None => NewWindowPolicy::NavigateInPlace,
            Some(frame) if frame.is_main_frame => NewWindowPolicy::NavigateInPlace,
            Some(_) => NewWindowPolicy::Suppress,
        }
    }
}

/// Continuation of a decision handed to a user handler.
///
/// Call [`Decision::decide`] once, possibly later from another task. Dropping
/// the decision without answering resolves it to the default policy.
pub struct Decision<T> {
    tx: oneshot::Sender<T>,
}

impl<T> Decision<T> {
    pub(crate) fn new(tx: oneshot::Sender<T>) -> Self {
        Self { tx }
    }

    pub fn decide(self, value: T) {
        // The engine may have given up on the decision already
        let _ = self.tx.send(value);
    }
}

impl<T> Debug for Decision<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decision").field("abandoned", &self.tx.is_closed()).finish()
    }
}

/// Creates a decision and the receiver its answer arrives on.
pub(crate) fn decision<T>() -> (Decision<T>, oneshot::Receiver<T>) {
    let (tx, rx) = oneshot::channel();
    (Decision::new(tx), rx)
}
