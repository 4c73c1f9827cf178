use crate::config::WebViewConfig;
use crate::errors::NetError;
use crate::events::{Decision, NewWindowPolicy, WebViewId};
use crate::engine::WebEngineHandle;
use crate::net::{BackgroundSession, HttpClientHandle, Request, Response, SessionSlot};
use crate::sync::CookieSynchronizer;
use crate::webview::command::{DelegateEvent, LifecycleStep, WebViewCommand};
use crate::webview::handlers::HandlerTable;
use crate::webview::preflight::{redirect_request, Preflight, Step};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Everything a worker is started with.
pub(crate) struct WorkerArgs {
    pub id: WebViewId,
    pub config: WebViewConfig,
    pub synchronizer: CookieSynchronizer,
    pub engine: WebEngineHandle,
    pub client: HttpClientHandle,
    pub handlers: Arc<RwLock<HandlerTable>>,
    pub cmd_tx: mpsc::UnboundedSender<WebViewCommand>,
    pub cmd_rx: mpsc::UnboundedReceiver<WebViewCommand>,
    pub shutdown: CancellationToken,
}

/// The serial execution context of one web view.
///
/// Session changes, engine cookie pushes and handler calls all happen here,
/// one command at a time. Background fetches run on their own tasks and
/// report back through the command queue.
pub(crate) struct WebViewWorker {
    id: WebViewId,
    config: WebViewConfig,
    sync: CookieSynchronizer,
    engine: WebEngineHandle,
    client: HttpClientHandle,
    handlers: Arc<RwLock<HandlerTable>>,
    cmd_tx: mpsc::UnboundedSender<WebViewCommand>,
    cmd_rx: mpsc::UnboundedReceiver<WebViewCommand>,
    shutdown: CancellationToken,
    sessions: SessionSlot,
    preflight: Option<Preflight>,
    generation: u64,
}

impl WebViewWorker {
    pub fn new(args: WorkerArgs) -> Self {
        Self {
            id: args.id,
            config: args.config,
            sync: args.synchronizer,
            engine: args.engine,
            client: args.client,
            handlers: args.handlers,
            cmd_tx: args.cmd_tx,
            cmd_rx: args.cmd_rx,
            shutdown: args.shutdown,
            sessions: SessionSlot::new(),
            preflight: None,
            generation: 0,
        }
    }

    pub async fn run(mut self) {
        log::debug!("web view {} started", self.id);

        // Seed the engine store before anything else runs
        self.push_native_cookies().await;

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                msg = self.cmd_rx.recv() => {
                    let Some(cmd) = msg else {
                        break;
                    };
                    self.handle_command(cmd).await;
                }
            }
        }

        self.teardown().await;
    }

    async fn teardown(&mut self) {
        self.preflight = None;
        self.sessions.release();
        if self.config.clear_site_data_on_drop {
            let store = self.engine.configuration().data_store.clone();
            self.sync.clear_site_data(Some(&store)).await;
        }
        log::debug!("web view {} destroyed", self.id);
    }

    async fn handle_command(&mut self, cmd: WebViewCommand) {
        log::trace!("web view {} handling {:?}", self.id, cmd);

        match cmd {
            WebViewCommand::Load(request) => self.start_load(request),
            WebViewCommand::AssignSession(session) => self.sessions.assign(session),
            WebViewCommand::PreflightFinished { generation, result } => {
                self.preflight_finished(generation, result).await
            }
            WebViewCommand::Delegate(event) => self.handle_delegate(event).await,
        }
    }

    fn attach(&self, request: &Request) -> Request {
        self.sync.attach_native_cookies(request, self.config.user_agent.as_deref())
    }

    async fn push_native_cookies(&self) {
        self.sync
            .push_native_cookies(self.engine.configuration(), self.config.script_injection)
            .await;
    }

    fn handlers(&self) -> HandlerTable {
        self.handlers.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    // ---------- Pre-flight ----------

    fn start_load(&mut self, request: Request) {
        let attached = self.attach(&request);
        let Some(url) = attached.url.clone() else {
            log::debug!("web view {}: request without URL goes straight to the engine", self.id);
            self.engine.load(attached);
            return;
        };

        self.generation += 1;
        let session = BackgroundSession::new(self.client.clone());
        self.sessions.assign(Some(session.clone()));

        log::debug!("web view {}: pre-flight #{} for {}", self.id, self.generation, url);
        self.spawn_fetch(self.generation, session.clone(), attached.clone());
        self.preflight = Some(Preflight::new(self.generation, attached, session));
    }

    fn spawn_fetch(&self, generation: u64, session: BackgroundSession, request: Request) {
        let tx = self.cmd_tx.clone();
        tokio::spawn(async move {
            let result = session.data_task(request).await;
            let _ = tx.send(WebViewCommand::PreflightFinished { generation, result });
        });
    }

    async fn preflight_finished(&mut self, generation: u64, result: Result<Response, NetError>) {
        let mut preflight = match self.preflight.take() {
            Some(p) if p.generation == generation => p,
            other => {
                log::debug!("web view {}: dropping result of superseded pre-flight #{}", self.id, generation);
                self.preflight = other;
                return;
            }
        };

        if let Ok(response) = &result {
            self.sync.store_from_response_headers(&response.headers, &response.url);
        }

        match preflight.next_step(&result) {
            Step::FollowRedirect(location) => {
                log::debug!("web view {}: following redirect to {}", self.id, location);
                let request = self.attach(&redirect_request(location, self.config.redirect_timeout));
                self.spawn_fetch(generation, preflight.session.clone(), request.clone());
                preflight.follow(request);
                self.preflight = Some(preflight);
            }
            Step::Complete => {
                self.push_native_cookies().await;
                let request = self.attach(&preflight.current);
                self.engine.load(request);
            }
            Step::Fallback(reason) => {
                log::warn!("web view {}: pre-flight failed ({reason}), loading original request", self.id);
                self.engine.load(preflight.original);
            }
        }
    }

    // ---------- Delegate relay ----------

    async fn handle_delegate(&mut self, event: DelegateEvent) {
        let handlers = self.handlers();

        match event {
            DelegateEvent::DecidePolicyForNavigation { action, reply } => {
                match handlers.decide_policy_for_navigation {
                    Some(h) => h(&action, Decision::new(reply)),
                    None => {
                        let _ = reply.send(Default::default());
                    }
                }
            }
            DelegateEvent::DecidePolicyForResponse { response, reply } => {
                match handlers.decide_policy_for_response {
                    Some(h) => h(&response, Decision::new(reply)),
                    None => {
                        let _ = reply.send(Default::default());
                    }
                }
                if response.is_http() {
                    let store = self.engine.configuration().data_store.cookie_store();
                    // Runs in the background; nothing waits for it
                    drop(self.sync.store_from_engine_navigation(&response, store));
                }
            }
            DelegateEvent::Lifecycle { step, navigation, done } => {
                self.push_native_cookies().await;
                let handler = match step {
                    LifecycleStep::StartProvisional => handlers.did_start_provisional_navigation,
                    LifecycleStep::Commit => handlers.did_commit_navigation,
                    LifecycleStep::Finish => handlers.did_finish_navigation,
                };
                if let Some(h) = handler {
                    h(navigation);
                }
                let _ = done.send(());
            }
            DelegateEvent::ServerRedirect { navigation } => {
                if let Some(h) = handlers.did_receive_server_redirect {
                    h(navigation);
                }
            }
            DelegateEvent::ProvisionalFailure { navigation, error } => {
                log::debug!("web view {}: {}", self.id, error);
                if let Some(h) = handlers.did_fail_provisional_navigation {
                    h(navigation, &error);
                }
            }
            DelegateEvent::ConfirmPanel { message, frame, reply } => match handlers.run_javascript_confirm_panel {
                Some(h) => h(&message, &frame, Decision::new(reply)),
                None => {
                    let _ = reply.send(true);
                }
            },
            DelegateEvent::AlertPanel { message, frame, reply } => match handlers.run_javascript_alert_panel {
                Some(h) => h(&message, &frame, Decision::new(reply)),
                None => {
                    let _ = reply.send(());
                }
            },
            DelegateEvent::CreateWebView { action, features, reply } => {
                let policy = match handlers.create_web_view {
                    Some(h) => h(&action, &features),
                    None => NewWindowPolicy::default_for(&action),
                };
                if policy == NewWindowPolicy::NavigateInPlace {
                    self.start_load(action.request);
                }
                let _ = reply.send(policy);
            }
            DelegateEvent::WillPerformRedirect { request, reply } => {
                let _ = reply.send(self.attach(&request));
            }
        }
    }
}
