//! In-memory engine.
//!
//! [`HeadlessEngine`] renders nothing. It records every request handed to its
//! loader, and its [`InMemoryWebsiteDataStore`] keeps cookies in a
//! [`DefaultCookieJar`]. Tests drive navigation events through the
//! [`NavigationDelegate`] the engine was created with.
use crate::cookies::{Cookie, CookieJar, DefaultCookieJar};
use crate::engine::{
    EngineConfiguration, EngineCookieStore, EngineCookieStoreHandle, EngineFactory, NavigationId, WebEngine,
    WebEngineHandle, WebsiteDataStore, WebsiteDataTypes,
};
use crate::net::Request;
use crate::rect::Rect;
use crate::webview::NavigationDelegate;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use time::OffsetDateTime;
use tokio::sync::Notify;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Engine cookie store backed by a [`DefaultCookieJar`].
#[derive(Default)]
pub struct InMemoryEngineCookieStore {
    jar: Mutex<DefaultCookieJar>,
    set_calls: AtomicUsize,
}

impl InMemoryEngineCookieStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Snapshot without going through the async API.
    pub fn cookies(&self) -> Vec<Cookie> {
        lock(&self.jar).cookies()
    }

    /// Number of `set_cookie` calls received so far.
    pub fn set_calls(&self) -> usize {
        self.set_calls.load(Ordering::SeqCst)
    }

    fn clear(&self) {
        lock(&self.jar).clear();
    }
}

#[async_trait]
impl EngineCookieStore for InMemoryEngineCookieStore {
    async fn all_cookies(&self) -> Vec<Cookie> {
        self.cookies()
    }

    async fn set_cookie(&self, cookie: Cookie) {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.jar).set_cookie(cookie);
    }

    async fn delete_cookie(&self, cookie: Cookie) {
        lock(&self.jar).delete_cookie(&cookie);
    }
}

/// Website data store with an in-memory cookie store.
///
/// Caches are not modelled; removals are recorded so callers can inspect them.
pub struct InMemoryWebsiteDataStore {
    cookies: Arc<InMemoryEngineCookieStore>,
    persistent: bool,
    removals: Mutex<Vec<(WebsiteDataTypes, OffsetDateTime)>>,
}

impl InMemoryWebsiteDataStore {
    /// A store that reports itself as persistent, like an engine's default store.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            cookies: InMemoryEngineCookieStore::new(),
            persistent: true,
            removals: Mutex::new(Vec::new()),
        })
    }

    /// A non-persistent store.
    pub fn ephemeral() -> Arc<Self> {
        Arc::new(Self {
            cookies: InMemoryEngineCookieStore::new(),
            persistent: false,
            removals: Mutex::new(Vec::new()),
        })
    }

    /// Typed access to the cookie store.
    pub fn cookies(&self) -> &Arc<InMemoryEngineCookieStore> {
        &self.cookies
    }

    /// Every `remove_data` call received, oldest first.
    pub fn removals(&self) -> Vec<(WebsiteDataTypes, OffsetDateTime)> {
        lock(&self.removals).clone()
    }
}

#[async_trait]
impl WebsiteDataStore for InMemoryWebsiteDataStore {
    fn cookie_store(&self) -> EngineCookieStoreHandle {
        self.cookies.clone()
    }

    fn is_persistent(&self) -> bool {
        self.persistent
    }

    async fn remove_data(&self, types: WebsiteDataTypes, modified_since: OffsetDateTime) {
        // Nothing here tracks modification times, so everything counts as modified
        if types.contains(WebsiteDataTypes::COOKIES) {
            self.cookies.clear();
        }
        lock(&self.removals).push((types, modified_since));
    }
}

/// Engine that records loads instead of rendering them.
pub struct HeadlessEngine {
    frame: Rect,
    configuration: EngineConfiguration,
    delegate: NavigationDelegate,
    loads: Mutex<Vec<Request>>,
    load_notify: Notify,
}

impl HeadlessEngine {
    pub fn new(frame: Rect, configuration: EngineConfiguration, delegate: NavigationDelegate) -> Arc<Self> {
        Arc::new(Self {
            frame,
            configuration,
            delegate,
            loads: Mutex::new(Vec::new()),
            load_notify: Notify::new(),
        })
    }

    pub fn frame(&self) -> Rect {
        self.frame
    }

    /// The delegate the owning web view listens on.
    pub fn delegate(&self) -> &NavigationDelegate {
        &self.delegate
    }

    /// Requests handed to the loader, oldest first.
    pub fn loads(&self) -> Vec<Request> {
        lock(&self.loads).clone()
    }

    /// Scripts that would run at the start of the next document.
    pub fn document_start_scripts(&self) -> Vec<String> {
        self.configuration
            .user_content_controller
            .user_scripts()
            .into_iter()
            .filter(|s| s.injection_time == crate::engine::InjectionTime::AtDocumentStart)
            .map(|s| s.source)
            .collect()
    }

    /// Waits until at least `count` requests have been handed to the loader.
    pub async fn wait_for_loads(&self, count: usize) -> Vec<Request> {
        loop {
            let notified = self.load_notify.notified();
            {
                let loads = lock(&self.loads);
                if loads.len() >= count {
                    return loads.clone();
                }
            }
            notified.await;
        }
    }
}

impl WebEngine for HeadlessEngine {
    fn configuration(&self) -> &EngineConfiguration {
        &self.configuration
    }

    fn load(&self, request: Request) -> Option<NavigationId> {
        log::debug!(
            "headless engine loading {}",
            request.url.as_ref().map(|u| u.as_str()).unwrap_or("<no url>")
        );
        lock(&self.loads).push(request);
        self.load_notify.notify_waiters();
        Some(NavigationId::new())
    }
}

/// Factory that creates [`HeadlessEngine`]s and remembers them.
#[derive(Default)]
pub struct HeadlessEngineFactory {
    created: Mutex<Vec<Arc<HeadlessEngine>>>,
}

impl HeadlessEngineFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently created engine.
    pub fn last(&self) -> Option<Arc<HeadlessEngine>> {
        lock(&self.created).last().cloned()
    }

    pub fn created(&self) -> usize {
        lock(&self.created).len()
    }
}

impl EngineFactory for HeadlessEngineFactory {
    fn create(&self, frame: Rect, configuration: EngineConfiguration, delegate: NavigationDelegate) -> WebEngineHandle {
        let engine = HeadlessEngine::new(frame, configuration, delegate);
        lock(&self.created).push(engine.clone());
        engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cookie_store_counts_sets_and_deletes() {
        let store = InMemoryEngineCookieStore::new();
        let c = Cookie::new("a", "1", "example.com");

        store.set_cookie(c.clone()).await;
        assert_eq!(store.set_calls(), 1);
        assert_eq!(store.all_cookies().await, vec![c.clone()]);

        store.delete_cookie(c).await;
        assert!(store.all_cookies().await.is_empty());
    }

    #[tokio::test]
    async fn removing_cookies_empties_the_cookie_store() {
        let data = InMemoryWebsiteDataStore::new();
        data.cookie_store().set_cookie(Cookie::new("a", "1", "example.com")).await;

        data.remove_data(WebsiteDataTypes::MEMORY_CACHE, OffsetDateTime::UNIX_EPOCH).await;
        assert_eq!(data.cookies().cookies().len(), 1);

        data.remove_data(WebsiteDataTypes::SITE_DATA, OffsetDateTime::UNIX_EPOCH).await;
        assert!(data.cookies().cookies().is_empty());
        assert_eq!(data.removals().len(), 2);
    }

    #[test]
    fn ephemeral_store_is_not_persistent() {
        assert!(InMemoryWebsiteDataStore::new().is_persistent());
        assert!(!InMemoryWebsiteDataStore::ephemeral().is_persistent());
    }
}
