//! Cookie movement between the native jar and an engine.
//!
//! [`CookieSynchronizer`] holds no state of its own besides handles to the two
//! stores it moves cookies between. Every operation is best-effort: malformed
//! cookies are dropped and nothing here returns an error.
use crate::config::ScriptInjection;
use crate::cookies::{
    request_header_value, format_http_date, Cookie, CookieJar, CookieJarHandle, CookieProperty,
};
use crate::engine::{EngineConfiguration, EngineCookieStoreHandle, UserScript, WebsiteDataStoreHandle, WebsiteDataTypes};
use crate::events::NavigationResponse;
use crate::net::Request;
use http::header::{COOKIE, USER_AGENT};
use http::HeaderMap;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLockReadGuard, RwLockWriteGuard};
use time::OffsetDateTime;
use tokio::task::JoinHandle;
use url::Url;

/// Moves cookies between the native jar and engine cookie stores.
///
/// Cloning is cheap; clones share both stores.
#[derive(Clone)]
pub struct CookieSynchronizer {
    native: CookieJarHandle,
    default_data_store: WebsiteDataStoreHandle,
}

impl std::fmt::Debug for CookieSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieSynchronizer")
            .field("native_cookies", &self.read().cookies().len())
            .finish_non_exhaustive()
    }
}

impl CookieSynchronizer {
    /// `default_data_store` is used whenever an operation is not given a store of its own.
    pub fn new(native: CookieJarHandle, default_data_store: WebsiteDataStoreHandle) -> Self {
        Self {
            native,
            default_data_store,
        }
    }

    pub fn native(&self) -> &CookieJarHandle {
        &self.native
    }

    pub fn default_data_store(&self) -> &WebsiteDataStoreHandle {
        &self.default_data_store
    }

    /// Snapshot of every unexpired native cookie.
    pub fn native_cookies(&self) -> Vec<Cookie> {
        self.read().cookies()
    }

    fn read(&self) -> RwLockReadGuard<'_, dyn CookieJar + Send + Sync + 'static> {
        self.native.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, dyn CookieJar + Send + Sync + 'static> {
        self.native.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a copy of `request` carrying the native cookies for its URL.
    ///
    /// A request without URL gets every native cookie. When there is nothing to
    /// attach the `Cookie` header is left as it was. `user_agent` replaces the
    /// `User-Agent` header when given.
    pub fn attach_native_cookies(&self, request: &Request, user_agent: Option<&str>) -> Request {
        let cookies = match &request.url {
            Some(url) => self.read().cookies_for_url(url),
            None => self.read().cookies(),
        };

        let mut out = request.clone();
        if let Some(value) = request_header_value(&cookies) {
            out.set_header(COOKIE, &value);
        }
        if let Some(ua) = user_agent {
            out.set_header(USER_AGENT, ua);
        }
        out
    }

    /// Parses every `Set-Cookie` header for `url` into the native jar.
    pub fn store_from_response_headers(&self, headers: &HeaderMap, url: &Url) {
        self.write().store_response_cookies(url, headers);
    }

    pub fn store_native_cookies(&self, cookies: impl IntoIterator<Item = Cookie>) {
        self.write().set_cookies(cookies.into_iter().collect());
    }

    /// Builds a cookie from `properties` and stores it. Unusable properties are dropped silently.
    pub fn store_native_cookie_properties(&self, properties: &HashMap<CookieProperty, String>) {
        match Cookie::from_properties(properties) {
            Some(cookie) => self.write().set_cookie(cookie),
            None => log::debug!("dropping cookie built from malformed properties"),
        }
    }

    /// Pulls cookies out of an engine navigation into the native jar.
    ///
    /// Header cookies of an HTTP response are stored right away. Every cookie
    /// currently in `engine_store` is read and stored by a spawned task; the
    /// returned handle resolves to the number of engine cookies copied. This
    /// returns as soon as the read has been started.
    pub fn store_from_engine_navigation(
        &self,
        response: &NavigationResponse,
        engine_store: EngineCookieStoreHandle,
    ) -> JoinHandle<usize> {
        if response.is_http() {
            self.store_from_response_headers(&response.headers, &response.url);
        }

        let this = self.clone();
        tokio::spawn(async move {
            let cookies = engine_store.all_cookies().await;
            let count = cookies.len();
            this.store_native_cookies(cookies);
            log::debug!("copied {count} engine cookies into the native jar");
            count
        })
    }

    /// Pushes `cookies` into the engine described by `configuration`.
    ///
    /// Every cookie becomes a document-start script in the engine's user
    /// content controller and is also set through the engine cookie store.
    /// Resolves once every `set_cookie` call has completed, in whatever order
    /// they finish. An empty list resolves immediately without touching the engine.
    pub async fn push_to_engine_store(
        &self,
        cookies: &[Cookie],
        configuration: &EngineConfiguration,
        injection: ScriptInjection,
    ) {
        if cookies.is_empty() {
            return;
        }

        let controller = &configuration.user_content_controller;
        for cookie in cookies {
            let script = UserScript::at_document_start(cookie_script(cookie));
            match injection {
                ScriptInjection::Accumulate => controller.add_user_script(script),
                ScriptInjection::ReplacePerCookie => controller.set_cookie_script(cookie.key(), script),
            }
        }

        let store = configuration.data_store.cookie_store();
        futures::future::join_all(cookies.iter().map(|c| store.set_cookie(c.clone()))).await;
        log::debug!("pushed {} cookies into the engine store", cookies.len());
    }

    /// Pushes every native cookie into the engine. See [`push_to_engine_store`](Self::push_to_engine_store).
    pub async fn push_native_cookies(&self, configuration: &EngineConfiguration, injection: ScriptInjection) {
        let cookies = self.native_cookies();
        self.push_to_engine_store(&cookies, configuration, injection).await;
    }

    /// Sets a single cookie in the default engine store.
    pub async fn push_cookie_to_default_store(&self, cookie: Cookie) {
        self.default_data_store.cookie_store().set_cookie(cookie).await;
    }

    /// Deletes `cookie` from `data_store`, or from the default store.
    pub async fn delete_cookie(&self, cookie: &Cookie, data_store: Option<&WebsiteDataStoreHandle>) {
        let store = data_store.unwrap_or(&self.default_data_store);
        store.cookie_store().delete_cookie(cookie.clone()).await;
    }

    /// Removes cookies, disk cache, offline application cache and memory
    /// cache of `data_store` (or the default store), however old they are.
    ///
    /// Local, session and indexed storage are kept.
    pub async fn clear_site_data(&self, data_store: Option<&WebsiteDataStoreHandle>) {
        let store = data_store.unwrap_or(&self.default_data_store);
        store.remove_data(WebsiteDataTypes::SITE_DATA, OffsetDateTime::UNIX_EPOCH).await;
        log::debug!("cleared site data");
    }
}

/// `document.cookie` assignment equivalent to `cookie`.
pub fn cookie_script(cookie: &Cookie) -> String {
    let mut s = format!(
        "{}={};path={};domain={};",
        cookie.name,
        cookie.value,
        cookie.path,
        cookie.domain_attribute()
    );
    if let Some(expires) = cookie.expires {
        s.push_str("expires=");
        s.push_str(&format_http_date(expires));
        s.push(';');
    }
    if cookie.secure {
        s.push_str("Secure;");
    }
    if cookie.http_only {
        s.push_str("HttpOnly");
    }

    format!("document.cookie='{}';", escape_js_single_quoted(&s))
}

fn escape_js_single_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::DefaultCookieJar;
    use crate::engine::headless::InMemoryWebsiteDataStore;
    use crate::engine::{EngineCookieStore, ProcessPool, UserContentController, WebsiteDataStore};
    use async_trait::async_trait;
    use http::header::SET_COOKIE;
    use http::HeaderValue;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use time::macros::datetime;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn synchronizer() -> (CookieSynchronizer, Arc<InMemoryWebsiteDataStore>) {
        let data = InMemoryWebsiteDataStore::new();
        let sync = CookieSynchronizer::new(DefaultCookieJar::new().into(), data.clone());
        (sync, data)
    }

    fn configuration(data: WebsiteDataStoreHandle) -> EngineConfiguration {
        EngineConfiguration {
            process_pool: ProcessPool::shared(),
            data_store: data,
            user_content_controller: UserContentController::new(),
            allows_inline_media_playback: true,
            preferred_content_mode: Default::default(),
            allows_back_forward_navigation_gestures: true,
        }
    }

    fn set_cookie_headers(values: &[&'static str]) -> HeaderMap {
        let mut h = HeaderMap::new();
        for v in values {
            h.append(SET_COOKIE, HeaderValue::from_static(v));
        }
        h
    }

    #[test]
    fn attaches_cookies_in_enumeration_order() {
        let (sync, _) = synchronizer();
        sync.store_native_cookies([
            Cookie::new("b", "2", "example.com"),
            Cookie::new("a", "1", "example.com"),
            Cookie::new("other", "x", "other.com"),
        ]);

        let req = Request::parse("https://example.com/page").unwrap();
        let out = sync.attach_native_cookies(&req, None);

        assert_eq!(out.cookie_header(), Some("b=2; a=1"));
        assert!(req.cookie_header().is_none());
    }

    #[test]
    fn request_without_url_gets_every_cookie() {
        let (sync, _) = synchronizer();
        sync.store_native_cookies([Cookie::new("a", "1", "a.com"), Cookie::new("b", "2", "b.com")]);

        let out = sync.attach_native_cookies(&Request::empty(), None);
        assert_eq!(out.cookie_header(), Some("a=1; b=2"));
    }

    #[test]
    fn no_cookies_leaves_request_unchanged() {
        let (sync, _) = synchronizer();
        let mut req = Request::parse("https://example.com/").unwrap();
        req.set_header(COOKIE, "manual=1");

        let out = sync.attach_native_cookies(&req, None);
        assert_eq!(out.cookie_header(), Some("manual=1"));
        assert_eq!(out.headers, req.headers);
    }

    #[test]
    fn user_agent_is_overridden() {
        let (sync, _) = synchronizer();
        let req = Request::parse("https://example.com/").unwrap();
        let out = sync.attach_native_cookies(&req, Some("Test/1.0"));
        assert_eq!(out.header(&USER_AGENT), Some("Test/1.0"));
    }

    #[test]
    fn response_cookies_round_trip_into_cookie_header() {
        let (sync, _) = synchronizer();
        let u = url("https://shop.example.com/cart");
        sync.store_from_response_headers(
            &set_cookie_headers(&[
                "session=abc; Path=/",
                "theme=dark; Domain=example.com",
                "gone=1; Max-Age=0",
            ]),
            &u,
        );

        let out = sync.attach_native_cookies(&Request::new(u), None);
        assert_eq!(out.cookie_header(), Some("session=abc; theme=dark"));
    }

    #[test]
    fn malformed_properties_are_dropped() {
        let (sync, _) = synchronizer();
        let mut props = HashMap::new();
        props.insert(CookieProperty::Name, "a".to_string());
        sync.store_native_cookie_properties(&props);
        assert!(sync.native_cookies().is_empty());

        props.insert(CookieProperty::Value, "1".to_string());
        props.insert(CookieProperty::Domain, "example.com".to_string());
        sync.store_native_cookie_properties(&props);
        assert_eq!(sync.native_cookies().len(), 1);
    }

    #[test]
    fn cookie_script_carries_every_attribute() {
        let c = Cookie::new("sid", "x1", "example.com")
            .domain_wide()
            .with_path("/app")
            .with_expires(datetime!(2037-10-21 07:28:00 UTC))
            .secure(true)
            .http_only(true);

        assert_eq!(
            cookie_script(&c),
            "document.cookie='sid=x1;path=/app;domain=.example.com;expires=Wed, 21 Oct 2037 07:28:00 GMT;Secure;HttpOnly';"
        );
    }

    #[test]
    fn cookie_script_for_session_cookie_and_quotes() {
        let c = Cookie::new("q", "it's", "example.com");
        assert_eq!(cookie_script(&c), "document.cookie='q=it\\'s;path=/;domain=example.com;';");
    }

    #[tokio::test]
    async fn empty_push_never_touches_the_engine() {
        let (sync, data) = synchronizer();
        let cfg = configuration(data.clone());

        sync.push_to_engine_store(&[], &cfg, ScriptInjection::Accumulate).await;

        assert_eq!(data.cookies().set_calls(), 0);
        assert!(cfg.user_content_controller.user_scripts().is_empty());
    }

    /// Engine store whose `set_cookie` calls finish in reverse order of arrival.
    struct ReversedStore {
        started: AtomicUsize,
        finished: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl EngineCookieStore for ReversedStore {
        async fn all_cookies(&self) -> Vec<Cookie> {
            Vec::new()
        }

        async fn set_cookie(&self, cookie: Cookie) {
            let n = self.started.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(40 - 20 * n as u64)).await;
            self.finished.lock().unwrap().push(cookie.name);
        }

        async fn delete_cookie(&self, _cookie: Cookie) {}
    }

    struct ReversedData(Arc<ReversedStore>);

    #[async_trait]
    impl WebsiteDataStore for ReversedData {
        fn cookie_store(&self) -> EngineCookieStoreHandle {
            self.0.clone()
        }

        fn is_persistent(&self) -> bool {
            false
        }

        async fn remove_data(&self, _types: WebsiteDataTypes, _modified_since: OffsetDateTime) {}
    }

    #[tokio::test]
    async fn push_completes_after_every_set_regardless_of_order() {
        let (sync, _) = synchronizer();
        let store = Arc::new(ReversedStore {
            started: AtomicUsize::new(0),
            finished: Mutex::new(Vec::new()),
        });
        let cfg = configuration(Arc::new(ReversedData(store.clone())));

        let cookies = [Cookie::new("c1", "1", "example.com"), Cookie::new("c2", "2", "example.com")];
        sync.push_to_engine_store(&cookies, &cfg, ScriptInjection::ReplacePerCookie).await;

        assert_eq!(*store.finished.lock().unwrap(), vec!["c2", "c1"]);
        assert_eq!(cfg.user_content_controller.user_scripts().len(), 2);
    }

    #[tokio::test]
    async fn injection_mode_controls_script_growth() {
        let (sync, data) = synchronizer();
        let cookies = [Cookie::new("a", "1", "example.com")];

        let replace = configuration(data.clone());
        for _ in 0..3 {
            sync.push_to_engine_store(&cookies, &replace, ScriptInjection::ReplacePerCookie).await;
        }
        assert_eq!(replace.user_content_controller.user_scripts().len(), 1);

        let accumulate = configuration(data.clone());
        for _ in 0..3 {
            sync.push_to_engine_store(&cookies, &accumulate, ScriptInjection::Accumulate).await;
        }
        assert_eq!(accumulate.user_content_controller.user_scripts().len(), 3);
        assert_eq!(data.cookies().cookies().len(), 1);
    }

    #[tokio::test]
    async fn engine_navigation_cookies_reach_the_native_jar() {
        let (sync, data) = synchronizer();
        data.cookie_store().set_cookie(Cookie::new("script", "1", "example.com")).await;

        let response = NavigationResponse::http(
            url("https://example.com/"),
            200,
            set_cookie_headers(&["header=1"]),
        );
        let copied = sync.store_from_engine_navigation(&response, data.cookie_store()).await.unwrap();

        assert_eq!(copied, 1);
        let mut names: Vec<_> = sync.native_cookies().into_iter().map(|c| c.name).collect();
        names.sort();
        assert_eq!(names, vec!["header", "script"]);
    }

    #[tokio::test]
    async fn non_http_navigation_skips_header_parsing() {
        let (sync, data) = synchronizer();
        let response = NavigationResponse {
            url: url("https://example.com/"),
            status: None,
            headers: set_cookie_headers(&["header=1"]),
            is_for_main_frame: true,
        };
        sync.store_from_engine_navigation(&response, data.cookie_store()).await.unwrap();
        assert!(sync.native_cookies().is_empty());
    }

    #[tokio::test]
    async fn delete_and_single_push_use_default_store() {
        let (sync, data) = synchronizer();
        let c = Cookie::new("a", "1", "example.com");

        sync.push_cookie_to_default_store(c.clone()).await;
        assert_eq!(data.cookies().cookies(), vec![c.clone()]);

        sync.delete_cookie(&c, None).await;
        assert!(data.cookies().cookies().is_empty());
    }

    #[tokio::test]
    async fn clear_site_data_removes_site_data_since_epoch() {
        let (sync, default) = synchronizer();
        let other = InMemoryWebsiteDataStore::ephemeral();
        let other_handle: WebsiteDataStoreHandle = other.clone();

        sync.clear_site_data(Some(&other_handle)).await;

        assert!(default.removals().is_empty());
        let removals = other.removals();
        assert_eq!(removals.len(), 1);
        let (types, since) = removals[0];
        assert_eq!(types, WebsiteDataTypes::SITE_DATA);
        assert!(!types.contains(WebsiteDataTypes::LOCAL_STORAGE));
        assert_eq!(since, OffsetDateTime::UNIX_EPOCH);
    }
}
