//! Engine configuration handed to [`EngineFactory::create`](crate::engine::EngineFactory::create).
//!
//! One [`EngineConfiguration`] is built per web view. All web views share the
//! same [`ProcessPool`] so the engine can reuse its network and content processes.
use crate::cookies::CookieKey;
use crate::engine::WebsiteDataStoreHandle;
use lazy_static::lazy_static;
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

lazy_static! {
    static ref SHARED_PROCESS_POOL: ProcessPool = ProcessPool::new();
}

/// Identity of an engine process pool. Engines created with the same pool
/// share processes and in-memory network state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProcessPool(Arc<Uuid>);

impl ProcessPool {
    pub fn new() -> Self {
        Self(Arc::new(Uuid::new_v4()))
    }

    /// The process-wide pool used by every web view unless told otherwise.
    pub fn shared() -> Self {
        SHARED_PROCESS_POOL.clone()
    }

    pub fn id(&self) -> Uuid {
        *self.0
    }
}

impl Default for ProcessPool {
    fn default() -> Self {
        Self::shared()
    }
}

/// Which flavour of content the engine should request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentMode {
    /// Let the engine decide from the platform.
    Recommended,
    #[default]
    Mobile,
    Desktop,
}

/// When a user script runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionTime {
    AtDocumentStart,
    AtDocumentEnd,
}

/// A script the engine injects into every document it loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserScript {
    pub source: String,
    pub injection_time: InjectionTime,
    pub main_frame_only: bool,
}

impl UserScript {
    /// A script that runs at document start in every frame.
    pub fn at_document_start(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            injection_time: InjectionTime::AtDocumentStart,
            main_frame_only: false,
        }
    }
}

/// The list of user scripts of one engine instance.
///
/// Scripts can be added anonymously (they accumulate forever) or under a
/// cookie key, in which case a newer script replaces the older one for the
/// same key while keeping its position.
#[derive(Debug, Default)]
pub struct UserContentController {
    scripts: Mutex<Vec<(Option<CookieKey>, UserScript)>>,
}

impl UserContentController {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_user_script(&self, script: UserScript) {
        self.lock().push((None, script));
    }

    /// Adds `script` for `key`, replacing the script previously added for it.
    pub fn set_cookie_script(&self, key: CookieKey, script: UserScript) {
        let mut scripts = self.lock();
        match scripts.iter_mut().find(|(k, _)| k.as_ref() == Some(&key)) {
            Some(entry) => entry.1 = script,
            None => scripts.push((Some(key), script)),
        }
    }

    /// Scripts in injection order.
    pub fn user_scripts(&self) -> Vec<UserScript> {
        self.lock().iter().map(|(_, s)| s.clone()).collect()
    }

    pub fn remove_all_user_scripts(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(Option<CookieKey>, UserScript)>> {
        self.scripts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Everything an engine instance is created with.
#[derive(Clone)]
pub struct EngineConfiguration {
    pub process_pool: ProcessPool,
    /// Persistent (or ephemeral) data store holding the engine cookie store.
    pub data_store: WebsiteDataStoreHandle,
    pub user_content_controller: Arc<UserContentController>,
    pub allows_inline_media_playback: bool,
    pub preferred_content_mode: ContentMode,
    pub allows_back_forward_navigation_gestures: bool,
}

impl std::fmt::Debug for EngineConfiguration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfiguration")
            .field("process_pool", &self.process_pool)
            .field("persistent", &self.data_store.is_persistent())
            .field("allows_inline_media_playback", &self.allows_inline_media_playback)
            .field("preferred_content_mode", &self.preferred_content_mode)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> CookieKey {
        CookieKey {
            domain: "example.com".into(),
            path: "/".into(),
            name: name.into(),
        }
    }

    #[test]
    fn shared_pool_is_shared() {
        assert_eq!(ProcessPool::shared(), ProcessPool::shared());
        assert_eq!(ProcessPool::default(), ProcessPool::shared());
        assert_ne!(ProcessPool::new(), ProcessPool::shared());
    }

    #[test]
    fn anonymous_scripts_accumulate() {
        let c = UserContentController::new();
        c.add_user_script(UserScript::at_document_start("a"));
        c.add_user_script(UserScript::at_document_start("a"));
        assert_eq!(c.user_scripts().len(), 2);
    }

    #[test]
    fn keyed_scripts_replace_in_place() {
        let c = UserContentController::new();
        c.set_cookie_script(key("a"), UserScript::at_document_start("a=1"));
        c.set_cookie_script(key("b"), UserScript::at_document_start("b=1"));
        c.set_cookie_script(key("a"), UserScript::at_document_start("a=2"));

        let sources: Vec<_> = c.user_scripts().into_iter().map(|s| s.source).collect();
        assert_eq!(sources, vec!["a=2", "b=1"]);

        c.remove_all_user_scripts();
        assert!(c.user_scripts().is_empty());
    }
}
