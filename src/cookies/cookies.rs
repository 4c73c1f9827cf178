//! Cookie core types.
//!
//! This module defines the **type-erased handle** used to share the native jar
//! and the serializable [`Cookie`] record.
//!
//! # Concurrency model
//! [`CookieJarHandle`] is `Arc<RwLock<dyn CookieJar + Send + Sync>>`. Callers
//! take a **read lock** for lookups and a **write lock** for mutations. The
//! native jar is shared with unrelated parts of the host process, so nothing
//! beyond the lock itself serializes access to it.
//!
//! ```rust
//! use managed_webview::cookies::{Cookie, CookieJarHandle, DefaultCookieJar};
//!
//! let jar: CookieJarHandle = DefaultCookieJar::new().into();
//! jar.write().unwrap().set_cookie(Cookie::new("session", "abc123", "example.com"));
//! assert_eq!(jar.read().unwrap().cookies().len(), 1);
//! ```

use crate::cookies::CookieJar;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use time::OffsetDateTime;

/// A handle to the native cookie jar.
pub type CookieJarHandle = Arc<RwLock<dyn CookieJar + Send + Sync>>;

/// SameSite policy of a cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    /// Case-insensitive parse of a `SameSite` attribute value.
    pub fn parse(value: &str) -> Option<SameSite> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("strict") {
            Some(SameSite::Strict)
        } else if value.eq_ignore_ascii_case("lax") {
            Some(SameSite::Lax)
        } else if value.eq_ignore_ascii_case("none") {
            Some(SameSite::None)
        } else {
            None
        }
    }
}

/// Identity of a cookie inside a store: `(domain, path, name)`.
///
/// Two cookies with the same key replace each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CookieKey {
    pub domain: String,
    pub path: String,
    pub name: String,
}

/// A cookie as held by the native jar and the engine store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name (case-sensitive).
    pub name: String,

    /// Raw cookie value (not URL-decoded).
    pub value: String,

    /// Domain without a leading dot, lowercased.
    pub domain: String,

    /// `true` when the cookie was set without a `Domain` attribute and only
    /// matches the exact host.
    pub host_only: bool,

    /// Path scoping. Always absolute (starts with `/`).
    pub path: String,

    /// Expiration instant. Session cookies have `None`.
    #[serde(with = "time::serde::rfc3339::option")]
    pub expires: Option<OffsetDateTime>,

    /// If `true`, cookie is sent only over HTTPS.
    pub secure: bool,

    /// If `true`, cookie is hidden from `document.cookie`.
    pub http_only: bool,

    /// SameSite policy, if one was given.
    pub same_site: Option<SameSite>,
}

impl Cookie {
    /// Creates a host-only session cookie for `domain` at path `/`.
    pub fn new(name: impl Into<String>, value: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: normalize_domain(&domain.into()),
            host_only: true,
            path: "/".to_string(),
            expires: None,
            secure: false,
            http_only: false,
            same_site: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_expires(mut self, expires: OffsetDateTime) -> Self {
        self.expires = Some(expires);
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    /// Marks the cookie as a domain cookie (matches subdomains too).
    pub fn domain_wide(mut self) -> Self {
        self.host_only = false;
        self
    }

    /// Store identity of this cookie.
    pub fn key(&self) -> CookieKey {
        CookieKey {
            domain: self.domain.clone(),
            path: self.path.clone(),
            name: self.name.clone(),
        }
    }

    /// `true` when `other` has the same [`key`](Self::key), without building one.
    pub fn same_key(&self, other: &Cookie) -> bool {
        self.domain == other.domain && self.path == other.path && self.name == other.name
    }

    /// Returns `true` when the cookie has an expiry at or before `now`.
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        matches!(self.expires, Some(exp) if exp <= now)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(OffsetDateTime::now_utc())
    }

    /// Domain as a browser would render it in a `domain=` attribute.
    /// Domain cookies carry a leading dot.
    pub fn domain_attribute(&self) -> String {
        if self.host_only {
            self.domain.clone()
        } else {
            format!(".{}", self.domain)
        }
    }

    /// Builds a cookie out of a loose property map.
    ///
    /// `Name`, `Value` and `Domain` (or `OriginUrl`) are required; `None` is
    /// returned when any of them is missing or unusable.
    pub fn from_properties(properties: &HashMap<CookieProperty, String>) -> Option<Cookie> {
        let name = properties.get(&CookieProperty::Name)?.trim();
        if name.is_empty() || name.contains(['=', ';']) {
            return None;
        }
        let value = properties.get(&CookieProperty::Value)?;
        if value.contains(';') {
            return None;
        }

        let (domain, host_only) = match properties.get(&CookieProperty::Domain) {
            Some(d) if !d.trim().is_empty() => {
                let d = d.trim();
                (normalize_domain(d), !d.starts_with('.'))
            }
            _ => {
                let origin = properties.get(&CookieProperty::OriginUrl)?;
                let url = url::Url::parse(origin).ok()?;
                (normalize_domain(url.host_str()?), true)
            }
        };
        if domain.is_empty() {
            return None;
        }

        let path = match properties.get(&CookieProperty::Path) {
            Some(p) if p.starts_with('/') => p.clone(),
            Some(_) => return None,
            None => "/".to_string(),
        };

        let expires = match properties.get(&CookieProperty::Expires) {
            Some(raw) => Some(crate::cookies::parse_http_date(raw)?),
            None => None,
        };

        let flag = |key: CookieProperty| {
            properties
                .get(&key)
                .map(|v| v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes") || v == "1")
                .unwrap_or(false)
        };

        Some(Cookie {
            name: name.to_string(),
            value: value.clone(),
            domain,
            host_only,
            path,
            expires,
            secure: flag(CookieProperty::Secure),
            http_only: flag(CookieProperty::HttpOnly),
            same_site: properties.get(&CookieProperty::SameSite).and_then(|v| SameSite::parse(v)),
        })
    }
}

/// Keys accepted by [`Cookie::from_properties`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CookieProperty {
    Name,
    Value,
    Domain,
    OriginUrl,
    Path,
    Expires,
    Secure,
    HttpOnly,
    SameSite,
}

pub(crate) fn normalize_domain(domain: &str) -> String {
    domain.trim().trim_start_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn props(pairs: &[(CookieProperty, &str)]) -> HashMap<CookieProperty, String> {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn domain_attribute_has_dot_only_for_domain_cookies() {
        let c = Cookie::new("a", "1", "Example.COM");
        assert_eq!(c.domain, "example.com");
        assert_eq!(c.domain_attribute(), "example.com");
        assert_eq!(c.domain_wide().domain_attribute(), ".example.com");
    }

    #[test]
    fn same_key_matches_key_equality() {
        let a = Cookie::new("sid", "1", "example.com");
        let pairs = [
            Cookie::new("sid", "2", "EXAMPLE.com"),
            Cookie::new("sid", "1", "example.com").with_path("/app"),
            Cookie::new("other", "1", "example.com"),
            Cookie::new("sid", "1", "example.org"),
        ];
        for b in &pairs {
            assert_eq!(a.same_key(b), a.key() == b.key(), "{b:?}");
        }
        assert!(a.same_key(&pairs[0]));
    }

    #[test]
    fn expiry_is_checked_against_given_instant() {
        let c = Cookie::new("a", "1", "example.com").with_expires(datetime!(2020-01-01 0:00 UTC));
        assert!(c.is_expired_at(datetime!(2021-01-01 0:00 UTC)));
        assert!(!c.is_expired_at(datetime!(2019-01-01 0:00 UTC)));
        assert!(!Cookie::new("b", "2", "example.com").is_expired());
    }

    #[test]
    fn properties_build_a_domain_cookie() {
        let c = Cookie::from_properties(&props(&[
            (CookieProperty::Name, "sid"),
            (CookieProperty::Value, "xyz"),
            (CookieProperty::Domain, ".example.com"),
            (CookieProperty::Path, "/app"),
            (CookieProperty::Secure, "TRUE"),
            (CookieProperty::Expires, "Wed, 21 Oct 2037 07:28:00 GMT"),
        ]))
        .expect("valid properties");

        assert_eq!(c.domain, "example.com");
        assert!(!c.host_only);
        assert_eq!(c.path, "/app");
        assert!(c.secure);
        assert!(!c.http_only);
        assert_eq!(c.expires, Some(datetime!(2037-10-21 07:28:00 UTC)));
    }

    #[test]
    fn properties_fall_back_to_origin_url() {
        let c = Cookie::from_properties(&props(&[
            (CookieProperty::Name, "sid"),
            (CookieProperty::Value, "xyz"),
            (CookieProperty::OriginUrl, "https://shop.example.com/cart"),
        ]))
        .unwrap();
        assert_eq!(c.domain, "shop.example.com");
        assert!(c.host_only);
        assert_eq!(c.path, "/");
    }

    #[test]
    fn malformed_properties_yield_none() {
        assert!(Cookie::from_properties(&props(&[(CookieProperty::Name, "sid")])).is_none());
        assert!(Cookie::from_properties(&props(&[
            (CookieProperty::Name, "sid"),
            (CookieProperty::Value, "1"),
        ]))
        .is_none());
        assert!(Cookie::from_properties(&props(&[
            (CookieProperty::Name, "sid"),
            (CookieProperty::Value, "1"),
            (CookieProperty::Domain, "example.com"),
            (CookieProperty::Path, "relative"),
        ]))
        .is_none());
        assert!(Cookie::from_properties(&props(&[
            (CookieProperty::Name, "sid"),
            (CookieProperty::Value, "1"),
            (CookieProperty::Domain, "example.com"),
            (CookieProperty::Expires, "not a date"),
        ]))
        .is_none());
    }
}
