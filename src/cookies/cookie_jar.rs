//! Native cookie jar abstraction and a simple in-memory implementation.
//!
//! The **native jar** is the process-wide cookie storage consulted by ordinary
//! HTTP requests. It is keyed by `(domain, path, name)`; setting a cookie with
//! an existing key replaces it in place, so enumeration order is the order in
//! which keys were first stored.
//!
//! The jar is **not** internally synchronized. Share it as a
//! [`CookieJarHandle`](crate::cookies::CookieJarHandle).
use crate::cookies::parse::{domain_matches, parse_set_cookie, path_matches};
use crate::cookies::Cookie;
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use time::OffsetDateTime;
use url::Url;

/// Native cookie storage.
///
/// Lookups never return expired cookies.
pub trait CookieJar: Send + Sync {
    /// All stored, unexpired cookies in enumeration order.
    fn cookies(&self) -> Vec<Cookie>;

    /// Cookies that should be sent with a request to `url`.
    ///
    /// Implementations filter by domain, path and the `Secure` flag.
    fn cookies_for_url(&self, url: &Url) -> Vec<Cookie>;

    /// Stores `cookie`, replacing any cookie with the same key.
    ///
    /// A cookie that is already expired removes the stored one instead.
    fn set_cookie(&mut self, cookie: Cookie);

    /// Removes the cookie with the same key as `cookie`, if present.
    fn delete_cookie(&mut self, cookie: &Cookie);

    /// Removes all cookies from the jar.
    fn clear(&mut self);

    /// Parses every `Set-Cookie` header in `headers` for `url` and stores the result.
    fn store_response_cookies(&mut self, url: &Url, headers: &HeaderMap) {
        self.set_cookies(response_cookies(url, headers));
    }

    /// Stores every cookie in `cookies`, in order.
    fn set_cookies(&mut self, cookies: Vec<Cookie>) {
        for cookie in cookies {
            self.set_cookie(cookie);
        }
    }

    /// Returns the `Cookie` request header value to send for `url`, if any.
    fn request_cookie_header(&self, url: &Url) -> Option<String> {
        crate::cookies::request_header_value(&self.cookies_for_url(url))
    }
}

/// Every well-formed `Set-Cookie` cookie in `headers`, parsed for `url`.
pub(crate) fn response_cookies(url: &Url, headers: &HeaderMap) -> Vec<Cookie> {
    headers
        .get_all(http::header::SET_COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .filter_map(|raw| parse_set_cookie(raw, url))
        .collect()
}

/// In-memory native jar.
///
/// No persistence; wrap it in a [`PersistentCookieJar`](crate::cookies::PersistentCookieJar)
/// to keep cookies across runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultCookieJar {
    /// Cookies in enumeration order. Keys are unique.
    pub entries: Vec<Cookie>,
}

impl DefaultCookieJar {
    /// Creates an empty in-memory cookie jar.
    pub fn new() -> Self {
        DefaultCookieJar { entries: Vec::new() }
    }

    fn live(&self) -> impl Iterator<Item = &Cookie> {
        let now = OffsetDateTime::now_utc();
        self.entries.iter().filter(move |c| !c.is_expired_at(now))
    }
}

impl From<DefaultCookieJar> for Arc<RwLock<dyn CookieJar + Send + Sync>> {
    fn from(jar: DefaultCookieJar) -> Self {
        Arc::new(RwLock::new(jar))
    }
}

impl CookieJar for DefaultCookieJar {
    fn cookies(&self) -> Vec<Cookie> {
        self.live().cloned().collect()
    }

    fn cookies_for_url(&self, url: &Url) -> Vec<Cookie> {
        let Some(host) = url.host_str() else {
            return Vec::new();
        };
        let host = host.to_ascii_lowercase();
        let path = url.path();
        let is_secure = matches!(url.scheme(), "https" | "wss");

        self.live()
            .filter(|c| {
                if c.host_only {
                    host == c.domain
                } else {
                    domain_matches(&host, &c.domain)
                }
            })
            .filter(|c| path_matches(path, &c.path))
            .filter(|c| !c.secure || is_secure)
            .cloned()
            .collect()
    }

    fn set_cookie(&mut self, cookie: Cookie) {
        let existing = self.entries.iter().position(|c| c.same_key(&cookie));

        if cookie.is_expired() {
            if let Some(idx) = existing {
                self.entries.remove(idx);
            }
            return;
        }

        match existing {
            Some(idx) => self.entries[idx] = cookie,
            None => self.entries.push(cookie),
        }
    }

    fn delete_cookie(&mut self, cookie: &Cookie) {
        self.entries.retain(|c| !c.same_key(cookie));
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use time::macros::datetime;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn same_key_replaces_in_place() {
        let mut jar = DefaultCookieJar::new();
        jar.set_cookie(Cookie::new("a", "1", "example.com"));
        jar.set_cookie(Cookie::new("b", "2", "example.com"));
        jar.set_cookie(Cookie::new("a", "3", "example.com"));

        let values: Vec<_> = jar.cookies().into_iter().map(|c| (c.name, c.value)).collect();
        assert_eq!(values, vec![("a".into(), "3".into()), ("b".into(), "2".into())]);
    }

    #[test]
    fn different_path_is_a_different_cookie() {
        let mut jar = DefaultCookieJar::new();
        jar.set_cookie(Cookie::new("a", "1", "example.com"));
        jar.set_cookie(Cookie::new("a", "2", "example.com").with_path("/app"));
        assert_eq!(jar.cookies().len(), 2);
    }

    #[test]
    fn expired_cookie_removes_stored_one() {
        let mut jar = DefaultCookieJar::new();
        jar.set_cookie(Cookie::new("a", "1", "example.com"));
        jar.set_cookie(Cookie::new("a", "1", "example.com").with_expires(datetime!(2000-01-01 0:00 UTC)));
        assert!(jar.cookies().is_empty());
    }

    #[test]
    fn url_lookup_filters_domain_path_and_secure() {
        let mut jar = DefaultCookieJar::new();
        jar.set_cookie(Cookie::new("host", "1", "example.com"));
        jar.set_cookie(Cookie::new("wide", "2", "example.com").domain_wide());
        jar.set_cookie(Cookie::new("deep", "3", "example.com").with_path("/app"));
        jar.set_cookie(Cookie::new("tls", "4", "example.com").secure(true));
        jar.set_cookie(Cookie::new("other", "5", "other.com"));

        let names = |u: &str| -> Vec<String> {
            jar.cookies_for_url(&url(u)).into_iter().map(|c| c.name).collect()
        };

        assert_eq!(names("https://example.com/app/x"), vec!["host", "wide", "deep", "tls"]);
        assert_eq!(names("http://example.com/"), vec!["host", "wide"]);
        assert_eq!(names("https://www.example.com/"), vec!["wide"]);
        assert!(names("https://nothing.org/").is_empty());
    }

    #[test]
    fn store_response_cookies_reads_every_set_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.append("set-cookie", HeaderValue::from_static("a=1; Path=/"));
        headers.append("set-cookie", HeaderValue::from_static("b=2; Path=/"));
        headers.append("set-cookie", HeaderValue::from_static("broken"));

        let mut jar = DefaultCookieJar::new();
        jar.store_response_cookies(&url("https://example.com/login"), &headers);

        assert_eq!(
            jar.request_cookie_header(&url("https://example.com/")).as_deref(),
            Some("a=1; b=2")
        );
    }

    #[test]
    fn delete_and_clear() {
        let mut jar = DefaultCookieJar::new();
        let a = Cookie::new("a", "1", "example.com");
        jar.set_cookie(a.clone());
        jar.set_cookie(Cookie::new("b", "2", "example.com"));

        jar.delete_cookie(&a);
        assert_eq!(jar.cookies().len(), 1);

        jar.clear();
        assert!(jar.cookies().is_empty());
    }
}
