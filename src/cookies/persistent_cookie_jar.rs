use crate::cookies::{Cookie, CookieJar, CookieStoreError, CookieStoreHandle, DefaultCookieJar};
use std::sync::{Arc, RwLock};
use url::Url;

/// A `CookieJar` decorator that persists changes after each mutation.
///
/// Reads go straight to the in-memory jar. Writes update it and then hand a
/// snapshot to the backing [`CookieStore`](crate::cookies::CookieStore).
/// Persistence is best-effort: a failed write is logged and the in-memory
/// state stays authoritative.
pub struct PersistentCookieJar {
    /// In-memory state.
    inner: DefaultCookieJar,
    /// Handle to the cookie store responsible for persistence.
    store_handle: CookieStoreHandle,
}

impl PersistentCookieJar {
    /// Loads the jar from `store` and wraps it.
    pub fn open(store_handle: CookieStoreHandle) -> Result<Self, CookieStoreError> {
        let inner = store_handle.load()?;
        log::debug!("loaded {} persisted cookies", inner.entries.len());
        Ok(Self { inner, store_handle })
    }

    fn persist(&self) {
        if let Err(e) = self.store_handle.persist(&self.inner) {
            log::warn!("cannot persist native cookies: {e}");
        }
    }
}

impl From<PersistentCookieJar> for Arc<RwLock<dyn CookieJar + Send + Sync>> {
    fn from(jar: PersistentCookieJar) -> Self {
        Arc::new(RwLock::new(jar))
    }
}

impl CookieJar for PersistentCookieJar {
    fn cookies(&self) -> Vec<Cookie> {
        self.inner.cookies()
    }

    fn cookies_for_url(&self, url: &Url) -> Vec<Cookie> {
        self.inner.cookies_for_url(url)
    }

    fn set_cookie(&mut self, cookie: Cookie) {
        self.inner.set_cookie(cookie);
        self.persist();
    }

    /// Persists once for the whole batch.
    fn set_cookies(&mut self, cookies: Vec<Cookie>) {
        if cookies.is_empty() {
            return;
        }
        self.inner.set_cookies(cookies);
        self.persist();
    }

    fn delete_cookie(&mut self, cookie: &Cookie) {
        self.inner.delete_cookie(cookie);
        self.persist();
    }

    fn clear(&mut self) {
        self.inner.clear();
        if let Err(e) = self.store_handle.remove_all() {
            log::warn!("cannot remove persisted cookies: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::{CookieStore, InMemoryCookieStore};
    use http::header::SET_COOKIE;
    use http::{HeaderMap, HeaderValue};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts snapshots handed to the backing store.
    #[derive(Default)]
    struct CountingStore {
        inner: InMemoryCookieStore,
        persists: AtomicUsize,
    }

    impl CookieStore for CountingStore {
        fn load(&self) -> Result<DefaultCookieJar, CookieStoreError> {
            self.inner.load()
        }

        fn persist(&self, snapshot: &DefaultCookieJar) -> Result<(), CookieStoreError> {
            self.persists.fetch_add(1, Ordering::SeqCst);
            self.inner.persist(snapshot)
        }

        fn remove_all(&self) -> Result<(), CookieStoreError> {
            self.inner.remove_all()
        }
    }

    #[test]
    fn mutations_reach_the_store() {
        let store = InMemoryCookieStore::new();
        let mut jar = PersistentCookieJar::open(store.clone()).unwrap();

        jar.set_cookie(Cookie::new("a", "1", "example.com"));
        jar.set_cookie(Cookie::new("b", "2", "example.com"));
        assert_eq!(store.load().unwrap().cookies().len(), 2);

        jar.delete_cookie(&Cookie::new("a", "", "example.com"));
        assert_eq!(store.load().unwrap().cookies().len(), 1);

        jar.clear();
        assert!(store.load().unwrap().cookies().is_empty());
    }

    #[test]
    fn reopening_restores_previous_cookies() {
        let store = InMemoryCookieStore::new();
        {
            let mut jar = PersistentCookieJar::open(store.clone()).unwrap();
            jar.set_cookie(Cookie::new("sid", "abc", "example.com"));
        }

        let jar = PersistentCookieJar::open(store).unwrap();
        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(jar.request_cookie_header(&url).as_deref(), Some("sid=abc"));
    }

    #[test]
    fn response_cookies_are_persisted_once_per_response() {
        let store = Arc::new(CountingStore::default());
        let mut jar = PersistentCookieJar::open(store.clone()).unwrap();

        let mut headers = HeaderMap::new();
        for raw in ["a=1", "b=2", "c=3", "broken"] {
            headers.append(SET_COOKIE, HeaderValue::from_static(raw));
        }
        jar.store_response_cookies(&Url::parse("https://example.com/").unwrap(), &headers);

        assert_eq!(store.persists.load(Ordering::SeqCst), 1);
        assert_eq!(store.load().unwrap().cookies().len(), 3);
    }

    #[test]
    fn batch_set_persists_once_and_empty_batch_not_at_all() {
        let store = Arc::new(CountingStore::default());
        let mut jar = PersistentCookieJar::open(store.clone()).unwrap();

        jar.set_cookies(Vec::new());
        assert_eq!(store.persists.load(Ordering::SeqCst), 0);

        jar.set_cookies(vec![
            Cookie::new("a", "1", "example.com"),
            Cookie::new("b", "2", "example.com"),
        ]);
        assert_eq!(store.persists.load(Ordering::SeqCst), 1);
        assert_eq!(store.load().unwrap().cookies().len(), 2);
    }
}
