use crate::cookies::Cookie;
use async_trait::async_trait;
use std::sync::Arc;

/// A handle to an engine cookie store.
pub type EngineCookieStoreHandle = Arc<dyn EngineCookieStore + Send + Sync>;

/// The browser engine's cookie jar.
///
/// Every call is asynchronous and resolves once the engine has applied it.
/// Invalid cookies are dropped by the engine without a signal.
#[async_trait]
pub trait EngineCookieStore: Send + Sync {
    /// Every cookie currently known to the engine.
    async fn all_cookies(&self) -> Vec<Cookie>;

    /// Stores `cookie`, replacing one with the same `(domain, path, name)`.
    async fn set_cookie(&self, cookie: Cookie);

    /// Removes the cookie with the same `(domain, path, name)` as `cookie`.
    async fn delete_cookie(&self, cookie: Cookie);
}
