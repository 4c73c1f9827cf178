use crate::engine::NavigationId;
use crate::errors::NetError;
use crate::events::{
    FrameInfo, NavigationAction, NavigationActionPolicy, NavigationError, NavigationResponse,
    NavigationResponsePolicy, NewWindowPolicy, WindowFeatures,
};
use crate::net::{BackgroundSession, Request, Response};
use tokio::sync::oneshot;

/// Lifecycle checkpoints at which cookies are pushed before the user handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LifecycleStep {
    StartProvisional,
    Commit,
    Finish,
}

/// Work items processed, in order, by the web view worker.
pub(crate) enum WebViewCommand {
    Load(Request),
    AssignSession(Option<BackgroundSession>),
    PreflightFinished {
        generation: u64,
        result: Result<Response, NetError>,
    },
    Delegate(DelegateEvent),
}

/// An engine report waiting for the worker.
pub(crate) enum DelegateEvent {
    DecidePolicyForNavigation {
        action: NavigationAction,
        reply: oneshot::Sender<NavigationActionPolicy>,
    },
    DecidePolicyForResponse {
        response: NavigationResponse,
        reply: oneshot::Sender<NavigationResponsePolicy>,
    },
    Lifecycle {
        step: LifecycleStep,
        navigation: Option<NavigationId>,
        done: oneshot::Sender<()>,
    },
    ServerRedirect {
        navigation: Option<NavigationId>,
    },
    ProvisionalFailure {
        navigation: Option<NavigationId>,
        error: NavigationError,
    },
    ConfirmPanel {
        message: String,
        frame: FrameInfo,
        reply: oneshot::Sender<bool>,
    },
    AlertPanel {
        message: String,
        frame: FrameInfo,
        reply: oneshot::Sender<()>,
    },
    CreateWebView {
        action: NavigationAction,
        features: WindowFeatures,
        reply: oneshot::Sender<NewWindowPolicy>,
    },
    WillPerformRedirect {
        request: Request,
        reply: oneshot::Sender<Request>,
    },
}

impl std::fmt::Debug for WebViewCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WebViewCommand::Load(req) => write!(f, "Load({:?})", req.url.as_ref().map(|u| u.as_str())),
            WebViewCommand::AssignSession(s) => write!(f, "AssignSession({:?})", s.as_ref().map(|s| s.id())),
            WebViewCommand::PreflightFinished { generation, result } => write!(
                f,
                "PreflightFinished {{ generation: {generation}, status: {:?} }}",
                result.as_ref().map(|r| r.status)
            ),
            WebViewCommand::Delegate(ev) => write!(f, "Delegate({})", ev.name()),
        }
    }
}

impl DelegateEvent {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            DelegateEvent::DecidePolicyForNavigation { .. } => "decide_policy_for_navigation",
            DelegateEvent::DecidePolicyForResponse { .. } => "decide_policy_for_response",
            DelegateEvent::Lifecycle { step: LifecycleStep::StartProvisional, .. } => "did_start_provisional_navigation",
            DelegateEvent::Lifecycle { step: LifecycleStep::Commit, .. } => "did_commit_navigation",
            DelegateEvent::Lifecycle { step: LifecycleStep::Finish, .. } => "did_finish_navigation",
            DelegateEvent::ServerRedirect { .. } => "did_receive_server_redirect",
            DelegateEvent::ProvisionalFailure { .. } => "did_fail_provisional_navigation",
            DelegateEvent::ConfirmPanel { .. } => "run_javascript_confirm_panel",
            DelegateEvent::AlertPanel { .. } => "run_javascript_alert_panel",
            DelegateEvent::CreateWebView { .. } => "create_web_view",
            DelegateEvent::WillPerformRedirect { .. } => "will_perform_redirect",
        }
    }
}
