//! Cookie persistence.
//!
//! A **cookie store** is the durable backing of the native jar. The jar itself
//! stays an in-memory [`DefaultCookieJar`]; a [`PersistentCookieJar`] decorator
//! hands a snapshot to the store after every mutation.
//!
//! Two implementations are provided:
//! - [`JsonCookieStore`]: one JSON file on disk.
//! - [`InMemoryCookieStore`]: keeps the last snapshot in memory (tests, private sessions).
//!
//! ```rust,no_run
//! use managed_webview::cookies::{JsonCookieStore, PersistentCookieJar};
//!
//! let store = JsonCookieStore::new("cookies.json".into());
//! let jar = PersistentCookieJar::open(store).expect("cookie file is readable");
//! ```
//!
//! [`PersistentCookieJar`]: crate::cookies::PersistentCookieJar
mod in_memory;
mod json;

use crate::cookies::DefaultCookieJar;
use std::sync::Arc;

pub use in_memory::InMemoryCookieStore;
pub use json::JsonCookieStore;

/// A handle to a cookie store trait.
pub type CookieStoreHandle = Arc<dyn CookieStore + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum CookieStoreError {
    #[error("cookie store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cookie store is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable storage for the native jar.
///
/// Implementations must be `Send + Sync` and safe for concurrent use.
pub trait CookieStore: Send + Sync {
    /// Loads the last persisted jar. An empty jar is returned when nothing was persisted yet.
    fn load(&self) -> Result<DefaultCookieJar, CookieStoreError>;

    /// Replaces the persisted state with `snapshot`.
    fn persist(&self, snapshot: &DefaultCookieJar) -> Result<(), CookieStoreError>;

    /// Removes all persisted cookie data. Idempotent.
    fn remove_all(&self) -> Result<(), CookieStoreError>;
}
