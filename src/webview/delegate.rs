use crate::engine::NavigationId;
use crate::events::{
    FrameInfo, NavigationAction, NavigationActionPolicy, NavigationError, NavigationResponse,
    NavigationResponsePolicy, NewWindowPolicy, WindowFeatures,
};
use crate::net::Request;
use crate::webview::command::{DelegateEvent, LifecycleStep, WebViewCommand};
use tokio::sync::{mpsc, oneshot};

/// The channel an engine reports navigation and UI events on.
///
/// Every method hands the event to the owning web view and resolves once the
/// web view has dealt with it. When the web view is gone, or a handler drops
/// its decision, the default policy is returned.
#[derive(Clone)]
pub struct NavigationDelegate {
    tx: mpsc::UnboundedSender<WebViewCommand>,
}

impl std::fmt::Debug for NavigationDelegate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationDelegate").field("closed", &self.tx.is_closed()).finish()
    }
}

impl NavigationDelegate {
    pub(crate) fn new(tx: mpsc::UnboundedSender<WebViewCommand>) -> Self {
        Self { tx }
    }

    async fn ask<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> DelegateEvent) -> Option<T> {
        let (tx, rx) = oneshot::channel();
        let event = make(tx);
        let name = event.name();
        if self.tx.send(WebViewCommand::Delegate(event)).is_err() {
            log::debug!("{name}: web view is gone, using default");
            return None;
        }
        rx.await.ok()
    }

    fn tell(&self, event: DelegateEvent) {
        let name = event.name();
        if self.tx.send(WebViewCommand::Delegate(event)).is_err() {
            log::debug!("{name}: web view is gone");
        }
    }

    pub async fn decide_policy_for_navigation(&self, action: NavigationAction) -> NavigationActionPolicy {
        self.ask(|reply| DelegateEvent::DecidePolicyForNavigation { action, reply })
            .await
            .unwrap_or_default()
    }

    /// Also copies the response's cookies (and the engine's) into the native jar.
    pub async fn decide_policy_for_response(&self, response: NavigationResponse) -> NavigationResponsePolicy {
        self.ask(|reply| DelegateEvent::DecidePolicyForResponse { response, reply })
            .await
            .unwrap_or_default()
    }

    /// Resolves after native cookies were pushed and the user handler ran.
    pub async fn did_start_provisional_navigation(&self, navigation: Option<NavigationId>) {
        self.lifecycle(LifecycleStep::StartProvisional, navigation).await
    }

    pub async fn did_commit_navigation(&self, navigation: Option<NavigationId>) {
        self.lifecycle(LifecycleStep::Commit, navigation).await
    }

    pub async fn did_finish_navigation(&self, navigation: Option<NavigationId>) {
        self.lifecycle(LifecycleStep::Finish, navigation).await
    }

    async fn lifecycle(&self, step: LifecycleStep, navigation: Option<NavigationId>) {
        let _ = self
            .ask(|done| DelegateEvent::Lifecycle { step, navigation, done })
            .await;
    }

    pub fn did_receive_server_redirect(&self, navigation: Option<NavigationId>) {
        self.tell(DelegateEvent::ServerRedirect { navigation });
    }

    pub fn did_fail_provisional_navigation(&self, navigation: Option<NavigationId>, error: NavigationError) {
        self.tell(DelegateEvent::ProvisionalFailure { navigation, error });
    }

    /// `true` when the user confirmed.
    pub async fn run_javascript_confirm_panel(&self, message: impl Into<String>, frame: FrameInfo) -> bool {
        let message = message.into();
        self.ask(|reply| DelegateEvent::ConfirmPanel { message, frame, reply })
            .await
            .unwrap_or(true)
    }

    /// Resolves when the alert was dismissed.
    pub async fn run_javascript_alert_panel(&self, message: impl Into<String>, frame: FrameInfo) {
        let message = message.into();
        let _ = self
            .ask(|reply| DelegateEvent::AlertPanel { message, frame, reply })
            .await;
    }

    /// The engine never gets a second view back. With
    /// [`NewWindowPolicy::NavigateInPlace`] the web view has already started
    /// loading the request itself.
    pub async fn create_web_view(&self, action: NavigationAction, features: WindowFeatures) -> NewWindowPolicy {
        self.ask(|reply| DelegateEvent::CreateWebView { action, features, reply })
            .await
            .unwrap_or(NewWindowPolicy::Suppress)
    }

    /// Returns `request` with native cookies re-attached. Engines call this
    /// for every server redirect of a regular navigation.
    pub async fn will_perform_redirect(&self, request: Request) -> Request {
        let original = request.clone();
        self.ask(|reply| DelegateEvent::WillPerformRedirect { request, reply })
            .await
            .unwrap_or(original)
    }
}
