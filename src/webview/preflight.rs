//! Pre-flight of a navigation.
//!
//! Before the engine sees a request, the web view fetches it once through its
//! background session to attach native cookies, capture response cookies and
//! resolve a single redirect hop:
//!
//! ```text
//! Idle -> Fetching --3xx + Location--> FetchingRedirect --any--> Complete
//!           |                                |
//!           +--2xx/4xx/5xx--> Complete       +--error--> Fallback
//!           +--error / 3xx without Location--> Fallback
//! ```
//!
//! `Complete` hands the fetched request to the engine with freshly attached
//! cookies, `Fallback` hands over the original cookie-attached request.
//! A redirect answer to the redirect fetch is never followed.
use crate::errors::NetError;
use crate::net::{BackgroundSession, CachePolicy, Request, Response};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PreflightState {
    /// The original request is in flight.
    Fetching,
    /// The single redirect hop is in flight.
    FetchingRedirect,
}

/// What to do with the result of the fetch in flight.
#[derive(Debug)]
pub(crate) enum Step {
    FollowRedirect(Url),
    Complete,
    /// Hand the original request to the engine. Carries the reason for the log.
    Fallback(String),
}

/// The pre-flight sequence of one `load`.
#[derive(Debug)]
pub(crate) struct Preflight {
    pub generation: u64,
    /// The caller's request with the cookies attached when the load started.
    pub original: Request,
    /// The request of the fetch in flight.
    pub current: Request,
    pub state: PreflightState,
    pub session: BackgroundSession,
}

impl Preflight {
    pub fn new(generation: u64, original: Request, session: BackgroundSession) -> Self {
        Self {
            generation,
            current: original.clone(),
            original,
            state: PreflightState::Fetching,
            session,
        }
    }

    /// Classifies the result of the fetch in flight.
    pub fn next_step(&self, result: &Result<Response, NetError>) -> Step {
        let response = match result {
            Ok(r) => r,
            Err(e) => return Step::Fallback(e.to_string()),
        };

        if !response.is_redirect() || self.state == PreflightState::FetchingRedirect {
            return Step::Complete;
        }
        match response.location() {
            Some(location) => Step::FollowRedirect(location),
            None => Step::Fallback(NetError::InvalidRedirect.to_string()),
        }
    }

    /// Moves to the redirect hop.
    pub fn follow(&mut self, request: Request) {
        self.current = request;
        self.state = PreflightState::FetchingRedirect;
    }
}

/// The request used for the redirect hop: no caches, short timeout.
pub(crate) fn redirect_request(location: Url, timeout: Duration) -> Request {
    Request::new(location)
        .with_cache_policy(CachePolicy::ReloadIgnoringCacheData)
        .with_timeout(timeout)
}
