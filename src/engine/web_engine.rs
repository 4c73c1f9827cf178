use crate::engine::EngineConfiguration;
use crate::net::Request;
use crate::rect::Rect;
use crate::webview::NavigationDelegate;
use std::sync::Arc;
use uuid::Uuid;

/// Identifies one navigation started by an engine.
///
/// Treat it as an opaque handle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NavigationId(Uuid);

impl NavigationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NavigationId {
    fn default() -> Self {
        Self::new()
    }
}

/// A handle to an engine instance.
pub type WebEngineHandle = Arc<dyn WebEngine + Send + Sync>;

/// One embedded browser engine instance.
///
/// The engine reports navigation and UI events through the
/// [`NavigationDelegate`] it was created with.
pub trait WebEngine: Send + Sync {
    /// The configuration this instance was created with.
    fn configuration(&self) -> &EngineConfiguration;

    /// The engine's own navigation loader. Starts loading `request` right away.
    fn load(&self, request: Request) -> Option<NavigationId>;
}

/// Creates the engine instance backing a web view.
pub trait EngineFactory {
    fn create(&self, frame: Rect, configuration: EngineConfiguration, delegate: NavigationDelegate) -> WebEngineHandle;
}

impl<F> EngineFactory for F
where
    F: Fn(Rect, EngineConfiguration, NavigationDelegate) -> WebEngineHandle,
{
    fn create(&self, frame: Rect, configuration: EngineConfiguration, delegate: NavigationDelegate) -> WebEngineHandle {
        self(frame, configuration, delegate)
    }
}
