// src/cookies.rs
//! Native cookies: [`Cookie`], [`CookieJar`], parsing helpers and persistence backends.
//!
//! The [`CookieJar`] is the *native* cookie store: the process-wide jar that
//! ordinary HTTP requests use. It is injected into the synchronizer and the
//! web views as a [`CookieJarHandle`] instead of being reached through a global.

mod cookies;
mod cookie_jar;
mod parse;
mod persistent_cookie_jar;
mod store;

pub use cookies::Cookie;
pub use cookies::CookieJarHandle;
pub use cookies::CookieKey;
pub use cookies::CookieProperty;
pub use cookies::SameSite;

pub use cookie_jar::CookieJar;
pub use cookie_jar::DefaultCookieJar;
pub use persistent_cookie_jar::PersistentCookieJar;

pub use parse::{format_http_date, parse_http_date, parse_set_cookie, request_header_value};

pub use store::CookieStore;
pub use store::CookieStoreError;
pub use store::CookieStoreHandle;
pub use store::InMemoryCookieStore;
pub use store::JsonCookieStore;
