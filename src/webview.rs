//! The managed web view.
//!
//! A [`ManagedWebView`] wraps one engine instance. It pre-flights every
//! [`load`](ManagedWebView::load) through a background session so native
//! cookies and a single redirect hop are settled before the engine sees the
//! request, and it relays engine events to the user handlers in its
//! [`HandlerTable`], pushing native cookies into the engine first at each
//! lifecycle step.
//!
//! All of this happens on a worker task owned by the view. The handle only
//! queues commands, so every method returns immediately.
//!
//! # Example
//!
//! ```no_run
//! use managed_webview::cookies::DefaultCookieJar;
//! use managed_webview::engine::headless::{HeadlessEngineFactory, InMemoryWebsiteDataStore};
//! use managed_webview::net::Request;
//! use managed_webview::rect::Rect;
//! use managed_webview::sync::CookieSynchronizer;
//! use managed_webview::webview::ManagedWebView;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let sync = CookieSynchronizer::new(DefaultCookieJar::new().into(), InMemoryWebsiteDataStore::new());
//! let factory = HeadlessEngineFactory::new();
//!
//! let view = ManagedWebView::builder(Rect::sized(390, 844), sync).build(&factory)?;
//! view.update_handlers(|h| {
//!     h.on_did_finish_navigation(|_| println!("page loaded"));
//! });
//! view.load(Request::parse("https://example.com/")?);
//! # Ok(()) }
//! ```

mod command;
mod delegate;
mod handlers;
mod preflight;
mod worker;


pub use delegate::NavigationDelegate;
pub use handlers::{
    AlertPanelHandler, ConfirmPanelHandler, CreateWebViewHandler, HandlerTable, NavigationActionHandler,
    NavigationFailureHandler, NavigationHandler, NavigationResponseHandler,
};

use crate::config::{self, WebViewConfig};
use crate::engine::{EngineConfiguration, EngineFactory, NavigationId, ProcessPool, UserContentController, WebEngineHandle, WebsiteDataStoreHandle};
use crate::errors::WebViewError;
use crate::events::WebViewId;
use crate::net::{BackgroundSession, HttpClientHandle, ReqwestClient, Request};
use crate::rect::Rect;
use crate::sync::CookieSynchronizer;
use command::WebViewCommand;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use worker::{WebViewWorker, WorkerArgs};

/// Handle to a managed web view.
///
/// Dropping the handle destroys the view: the active background session is
/// cancelled and, unless configured otherwise, the site data of the view's
/// data store is cleared. Use [`close`](Self::close) to wait for that.
pub struct ManagedWebView {
    id: WebViewId,
    cmd_tx: mpsc::UnboundedSender<WebViewCommand>,
    handlers: Arc<RwLock<HandlerTable>>,
    engine: WebEngineHandle,
    synchronizer: CookieSynchronizer,
    shutdown: CancellationToken,
    worker: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for ManagedWebView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagedWebView")
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl ManagedWebView {
    pub fn builder(frame: Rect, synchronizer: CookieSynchronizer) -> WebViewBuilder {
        WebViewBuilder::new(frame, synchronizer)
    }

    pub fn id(&self) -> WebViewId {
        self.id
    }

    /// Starts loading `request`.
    ///
    /// The navigation starts later, once the pre-flight has finished, so no
    /// navigation handle is ever returned. Failures never reach the caller:
    /// whatever goes wrong during pre-flight, the engine gets the request.
    pub fn load(&self, request: Request) -> Option<NavigationId> {
        if self.cmd_tx.send(WebViewCommand::Load(request)).is_err() {
            log::warn!("web view {}: load after destruction ignored", self.id);
        }
        None
    }

    /// Replaces the background session. The previous session, if any, is
    /// invalidated before `session` becomes active.
    pub fn set_session(&self, session: Option<BackgroundSession>) -> Result<(), WebViewError> {
        self.cmd_tx
            .send(WebViewCommand::AssignSession(session))
            .map_err(|_| WebViewError::Closed)
    }

    /// Edits the handler table. Changes apply to events processed afterwards.
    pub fn update_handlers(&self, f: impl FnOnce(&mut HandlerTable)) {
        let mut table = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut table);
    }

    pub fn engine(&self) -> &WebEngineHandle {
        &self.engine
    }

    pub fn configuration(&self) -> &EngineConfiguration {
        self.engine.configuration()
    }

    pub fn synchronizer(&self) -> &CookieSynchronizer {
        &self.synchronizer
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled() || self.cmd_tx.is_closed()
    }

    /// Destroys the view and waits until teardown has finished.
    pub async fn close(mut self) {
        self.shutdown.cancel();
        if let Some(worker) = self.worker.take() {
            if let Err(e) = worker.await {
                log::error!("web view {} worker failed: {e}", self.id);
            }
        }
    }
}

impl Drop for ManagedWebView {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Builder for [`ManagedWebView`].
pub struct WebViewBuilder {
    frame: Rect,
    synchronizer: CookieSynchronizer,
    config: WebViewConfig,
    http_client: Option<HttpClientHandle>,
    data_store: Option<WebsiteDataStoreHandle>,
    process_pool: Option<ProcessPool>,
}

impl WebViewBuilder {
    pub fn new(frame: Rect, synchronizer: CookieSynchronizer) -> Self {
        Self {
            frame,
            synchronizer,
            config: WebViewConfig::default(),
            http_client: None,
            data_store: None,
            process_pool: None,
        }
    }

    pub fn config(mut self, config: WebViewConfig) -> Self {
        self.config = config;
        self
    }

    /// Transport for pre-flight fetches. Defaults to a [`ReqwestClient`].
    pub fn http_client(mut self, client: HttpClientHandle) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Data store of the engine. Defaults to the synchronizer's default store.
    pub fn data_store(mut self, store: WebsiteDataStoreHandle) -> Self {
        self.data_store = Some(store);
        self
    }

    /// Process pool of the engine. Defaults to [`ProcessPool::shared`].
    pub fn process_pool(mut self, pool: ProcessPool) -> Self {
        self.process_pool = Some(pool);
        self
    }

    /// Creates the engine through `factory` and starts the view's worker on
    /// the current Tokio runtime.
    pub fn build<F: EngineFactory + ?Sized>(self, factory: &F) -> Result<ManagedWebView, WebViewError> {
        config::validate(&self.config)?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| WebViewError::NoRuntime)?;

        let client: HttpClientHandle = match self.http_client {
            Some(c) => c,
            None => Arc::new(ReqwestClient::new()?) as HttpClientHandle,
        };

        let engine_config = EngineConfiguration {
            process_pool: self.process_pool.unwrap_or_default(),
            data_store: self
                .data_store
                .unwrap_or_else(|| self.synchronizer.default_data_store().clone()),
            user_content_controller: UserContentController::new(),
            allows_inline_media_playback: self.config.allows_inline_media_playback,
            preferred_content_mode: self.config.content_mode,
            allows_back_forward_navigation_gestures: self.config.allows_back_forward_gestures,
        };

        let id = WebViewId::new();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let engine = factory.create(self.frame, engine_config, NavigationDelegate::new(cmd_tx.clone()));

        let handlers = Arc::new(RwLock::new(HandlerTable::default()));
        let shutdown = CancellationToken::new();

        let worker = WebViewWorker::new(WorkerArgs {
            id,
            config: self.config,
            synchronizer: self.synchronizer.clone(),
            engine: engine.clone(),
            client,
            handlers: handlers.clone(),
            cmd_tx: cmd_tx.clone(),
            cmd_rx,
            shutdown: shutdown.clone(),
        });
        let join_handle = runtime.spawn(worker.run());

        log::debug!("created web view {id} ({:?})", self.frame);
        Ok(ManagedWebView {
            id,
            cmd_tx,
            handlers,
            engine,
            synchronizer: self.synchronizer,
            shutdown,
            worker: Some(join_handle),
        })
    }
}
