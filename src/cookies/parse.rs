//! Cookie text formats.
//!
//! - `Set-Cookie` parsing for a request URL (a practical subset of RFC 6265 §5.2).
//! - `Cookie` request header joining (`name=value; name=value`).
//! - HTTP-date parsing and the `Wed, 1 Jan 2025 00:00:00 GMT` rendering used by
//!   generated `document.cookie` statements.
//!
//! Domain and path matching helpers live here as well, so the jar and the
//! parser agree on the rules.

use crate::cookies::cookies::normalize_domain;
use crate::cookies::{Cookie, SameSite};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Duration, OffsetDateTime, PrimitiveDateTime};
use url::{Host, Url};

/// Joins cookies into a `Cookie` request header value.
///
/// Order is preserved. Returns `None` when `cookies` is empty.
pub fn request_header_value(cookies: &[Cookie]) -> Option<String> {
    if cookies.is_empty() {
        return None;
    }

    Some(
        cookies
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; "),
    )
}

/// Parses a single `Set-Cookie` header value received for `url`.
///
/// Returns `None` when the header has no `name=value` pair, an empty name, or
/// a `Domain` attribute that does not cover the request host.
pub fn parse_set_cookie(header: &str, url: &Url) -> Option<Cookie> {
    parse_set_cookie_at(header, url, OffsetDateTime::now_utc())
}

pub(crate) fn parse_set_cookie_at(header: &str, url: &Url, now: OffsetDateTime) -> Option<Cookie> {
    let host = normalize_domain(url.host_str()?);
    let mut parts = header.split(';');

    let (name, value) = parts.next()?.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let mut cookie = Cookie {
        name: name.to_string(),
        value: value.trim().to_string(),
        domain: host.clone(),
        host_only: true,
        path: default_path(url),
        expires: None,
        secure: false,
        http_only: false,
        same_site: None,
    };

    let mut max_age: Option<OffsetDateTime> = None;

    for part in parts {
        let part = part.trim();
        let (k, v) = match part.split_once('=') {
            Some((k, v)) => (k.trim(), v.trim()),
            None => (part, ""),
        };

        match k.to_ascii_lowercase().as_str() {
            "expires" => {
                if let Some(at) = parse_http_date(v) {
                    cookie.expires = Some(at);
                }
            }
            "max-age" => {
                if let Ok(secs) = v.parse::<i64>() {
                    max_age = Some(if secs <= 0 {
                        OffsetDateTime::UNIX_EPOCH
                    } else {
                        now.saturating_add(Duration::seconds(secs))
                    });
                }
            }
            "domain" => {
                let domain = normalize_domain(v);
                if domain.is_empty() {
                    continue;
                }
                if !domain_matches(&host, &domain) {
                    return None;
                }
                cookie.domain = domain;
                cookie.host_only = is_ip_address(&host);
            }
            "path" => {
                if v.starts_with('/') {
                    cookie.path = v.to_string();
                }
            }
            "secure" => cookie.secure = true,
            "httponly" => cookie.http_only = true,
            "samesite" => cookie.same_site = SameSite::parse(v),
            _ => {}
        }
    }

    // Max-Age wins over Expires
    if max_age.is_some() {
        cookie.expires = max_age;
    }

    Some(cookie)
}

/// Parses an HTTP-date (`Sun, 06 Nov 1994 08:49:37 GMT`), the Netscape
/// dashed variant, or an RFC 3339 timestamp.
pub fn parse_http_date(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();

    let padded = format_description!(
        "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
    );
    let unpadded = format_description!(
        "[weekday repr:short], [day padding:none] [month repr:short] [year] [hour]:[minute]:[second] GMT"
    );
    let dashed = format_description!(
        "[weekday repr:short], [day]-[month repr:short]-[year] [hour]:[minute]:[second] GMT"
    );

    for fmt in [padded, unpadded, dashed] {
        if let Ok(dt) = PrimitiveDateTime::parse(raw, fmt) {
            return Some(dt.assume_utc());
        }
    }

    OffsetDateTime::parse(raw, &Rfc3339).ok()
}

/// Renders `at` in UTC as `Wed, 1 Jan 2025 00:00:00 GMT`.
///
/// This is the rendering browsers accept in a `document.cookie` `expires=` attribute.
pub fn format_http_date(at: OffsetDateTime) -> String {
    let fmt = format_description!(
        "[weekday repr:short], [day padding:none] [month repr:short] [year] [hour]:[minute]:[second] GMT"
    );
    let utc = at.to_offset(time::UtcOffset::UTC);
    utc.format(fmt).unwrap_or_default()
}

/// RFC 6265 default-path of a request URL.
pub(crate) fn default_path(url: &Url) -> String {
    let path = url.path();
    if !path.starts_with('/') {
        return "/".to_string();
    }
    match path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => path[..idx].to_string(),
    }
}

/// `true` when `host` is `domain` or a subdomain of it.
pub(crate) fn domain_matches(host: &str, domain: &str) -> bool {
    if host == domain {
        return true;
    }
    if is_ip_address(host) {
        return false;
    }
    host.len() > domain.len()
        && host.ends_with(domain)
        && host.as_bytes()[host.len() - domain.len() - 1] == b'.'
}

/// RFC 6265 path-match.
pub(crate) fn path_matches(request_path: &str, cookie_path: &str) -> bool {
    if request_path == cookie_path {
        return true;
    }
    if !request_path.starts_with(cookie_path) {
        return false;
    }
    cookie_path.ends_with('/') || request_path.as_bytes()[cookie_path.len()] == b'/'
}

fn is_ip_address(host: &str) -> bool {
    matches!(Host::parse(host), Ok(Host::Ipv4(_)) | Ok(Host::Ipv6(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn header_value_joins_in_order() {
        let cookies = vec![
            Cookie::new("b", "2", "example.com"),
            Cookie::new("a", "1", "example.com"),
        ];
        assert_eq!(request_header_value(&cookies).as_deref(), Some("b=2; a=1"));
        assert_eq!(request_header_value(&[]), None);
    }

    #[test]
    fn parses_all_attributes() {
        let c = parse_set_cookie(
            "sid=abc; Path=/app; Domain=.example.com; Expires=Wed, 21 Oct 2037 07:28:00 GMT; Secure; HttpOnly; SameSite=lax",
            &url("https://www.example.com/app/page"),
        )
        .unwrap();

        assert_eq!(c.name, "sid");
        assert_eq!(c.value, "abc");
        assert_eq!(c.domain, "example.com");
        assert!(!c.host_only);
        assert_eq!(c.path, "/app");
        assert_eq!(c.expires, Some(datetime!(2037-10-21 07:28:00 UTC)));
        assert!(c.secure);
        assert!(c.http_only);
        assert_eq!(c.same_site, Some(SameSite::Lax));
    }

    #[test]
    fn defaults_to_host_only_and_default_path() {
        let c = parse_set_cookie("a=1", &url("https://Example.com/dir/page.html")).unwrap();
        assert_eq!(c.domain, "example.com");
        assert!(c.host_only);
        assert_eq!(c.path, "/dir");

        let c = parse_set_cookie("a=1; Path=relative", &url("https://example.com/page")).unwrap();
        assert_eq!(c.path, "/");
    }

    #[test]
    fn foreign_domain_is_rejected() {
        assert!(parse_set_cookie("a=1; Domain=other.com", &url("https://example.com/")).is_none());
        assert!(parse_set_cookie("a=1; Domain=ample.com", &url("https://example.com/")).is_none());
    }

    #[test]
    fn nameless_pairs_are_rejected() {
        assert!(parse_set_cookie("novalue", &url("https://example.com/")).is_none());
        assert!(parse_set_cookie("=1", &url("https://example.com/")).is_none());
    }

    #[test]
    fn max_age_overrides_expires() {
        let now = datetime!(2030-01-01 0:00 UTC);
        let c = parse_set_cookie_at(
            "a=1; Max-Age=60; Expires=Wed, 21 Oct 2037 07:28:00 GMT",
            &url("https://example.com/"),
            now,
        )
        .unwrap();
        assert_eq!(c.expires, Some(datetime!(2030-01-01 0:01 UTC)));

        let c = parse_set_cookie_at("a=1; Max-Age=0", &url("https://example.com/"), now).unwrap();
        assert!(c.is_expired_at(now));
    }

    #[test]
    fn http_dates_in_common_shapes() {
        let expected = datetime!(1994-11-06 08:49:37 UTC);
        assert_eq!(parse_http_date("Sun, 06 Nov 1994 08:49:37 GMT"), Some(expected));
        assert_eq!(parse_http_date("Sun, 6 Nov 1994 08:49:37 GMT"), Some(expected));
        assert_eq!(parse_http_date("Sun, 06-Nov-1994 08:49:37 GMT"), Some(expected));
        assert_eq!(parse_http_date("1994-11-06T08:49:37Z"), Some(expected));
        assert_eq!(parse_http_date("yesterday"), None);
    }

    #[test]
    fn formats_http_date_without_day_padding() {
        assert_eq!(
            format_http_date(datetime!(2025-01-09 13:05:00 UTC)),
            "Thu, 9 Jan 2025 13:05:00 GMT"
        );
        assert_eq!(
            format_http_date(datetime!(2025-01-09 15:05:00 +2)),
            "Thu, 9 Jan 2025 13:05:00 GMT"
        );
    }

    #[test]
    fn domain_and_path_matching() {
        assert!(domain_matches("example.com", "example.com"));
        assert!(domain_matches("a.example.com", "example.com"));
        assert!(!domain_matches("badexample.com", "example.com"));
        assert!(!domain_matches("10.0.0.1", "0.0.1"));

        assert!(path_matches("/", "/"));
        assert!(path_matches("/app/x", "/app"));
        assert!(path_matches("/app/x", "/app/"));
        assert!(!path_matches("/application", "/app"));
        assert!(!path_matches("/", "/app"));
    }
}
