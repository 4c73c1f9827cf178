use crate::engine::NavigationId;
use crate::events::{
    Decision, FrameInfo, NavigationAction, NavigationActionPolicy, NavigationError, NavigationResponse,
    NavigationResponsePolicy, NewWindowPolicy, WindowFeatures,
};
use std::sync::Arc;

pub type NavigationActionHandler = Arc<dyn Fn(&NavigationAction, Decision<NavigationActionPolicy>) + Send + Sync>;
pub type NavigationResponseHandler = Arc<dyn Fn(&NavigationResponse, Decision<NavigationResponsePolicy>) + Send + Sync>;
pub type NavigationHandler = Arc<dyn Fn(Option<NavigationId>) + Send + Sync>;
pub type NavigationFailureHandler = Arc<dyn Fn(Option<NavigationId>, &NavigationError) + Send + Sync>;
pub type ConfirmPanelHandler = Arc<dyn Fn(&str, &FrameInfo, Decision<bool>) + Send + Sync>;
pub type AlertPanelHandler = Arc<dyn Fn(&str, &FrameInfo, Decision<()>) + Send + Sync>;
pub type CreateWebViewHandler = Arc<dyn Fn(&NavigationAction, &WindowFeatures) -> NewWindowPolicy + Send + Sync>;

/// Optional user callbacks, one per navigation and UI event.
///
/// An empty slot means the default policy applies:
///
/// | slot | default |
/// |------|---------|
/// | `decide_policy_for_navigation` | allow |
/// | `decide_policy_for_response` | allow |
/// | `run_javascript_confirm_panel` | confirmed (`true`) |
/// | `run_javascript_alert_panel` | dismissed immediately |
/// | `create_web_view` | [`NewWindowPolicy::default_for`] |
/// | everything else | nothing happens |
///
/// Handlers that receive a [`Decision`] may answer it later; a decision that
/// is dropped unanswered resolves to the default.
#[derive(Clone, Default)]
pub struct HandlerTable {
    pub decide_policy_for_navigation: Option<NavigationActionHandler>,
    pub decide_policy_for_response: Option<NavigationResponseHandler>,
    pub did_start_provisional_navigation: Option<NavigationHandler>,
    pub did_commit_navigation: Option<NavigationHandler>,
    pub did_finish_navigation: Option<NavigationHandler>,
    pub did_receive_server_redirect: Option<NavigationHandler>,
    pub did_fail_provisional_navigation: Option<NavigationFailureHandler>,
    pub run_javascript_confirm_panel: Option<ConfirmPanelHandler>,
    pub run_javascript_alert_panel: Option<AlertPanelHandler>,
    pub create_web_view: Option<CreateWebViewHandler>,
}

impl HandlerTable {
    pub fn on_decide_policy_for_navigation(
        &mut self,
        f: impl Fn(&NavigationAction, Decision<NavigationActionPolicy>) + Send + Sync + 'static,
    ) -> &mut Self {
        self.decide_policy_for_navigation = Some(Arc::new(f));
        self
    }

    pub fn on_decide_policy_for_response(
        &mut self,
        f: impl Fn(&NavigationResponse, Decision<NavigationResponsePolicy>) + Send + Sync + 'static,
    ) -> &mut Self {
        self.decide_policy_for_response = Some(Arc::new(f));
        self
    }

    pub fn on_did_start_provisional_navigation(
        &mut self,
        f: impl Fn(Option<NavigationId>) + Send + Sync + 'static,
    ) -> &mut Self {
        self.did_start_provisional_navigation = Some(Arc::new(f));
        self
    }

    pub fn on_did_commit_navigation(&mut self, f: impl Fn(Option<NavigationId>) + Send + Sync + 'static) -> &mut Self {
        self.did_commit_navigation = Some(Arc::new(f));
        self
    }

    pub fn on_did_finish_navigation(&mut self, f: impl Fn(Option<NavigationId>) + Send + Sync + 'static) -> &mut Self {
        self.did_finish_navigation = Some(Arc::new(f));
        self
    }

    pub fn on_did_receive_server_redirect(
        &mut self,
        f: impl Fn(Option<NavigationId>) + Send + Sync + 'static,
    ) -> &mut Self {
        self.did_receive_server_redirect = Some(Arc::new(f));
        self
    }

    pub fn on_did_fail_provisional_navigation(
        &mut self,
        f: impl Fn(Option<NavigationId>, &NavigationError) + Send + Sync + 'static,
    ) -> &mut Self {
        self.did_fail_provisional_navigation = Some(Arc::new(f));
        self
    }

    pub fn on_run_javascript_confirm_panel(
        &mut self,
        f: impl Fn(&str, &FrameInfo, Decision<bool>) + Send + Sync + 'static,
    ) -> &mut Self {
        self.run_javascript_confirm_panel = Some(Arc::new(f));
        self
    }

    pub fn on_run_javascript_alert_panel(
        &mut self,
        f: impl Fn(&str, &FrameInfo, Decision<()>) + Send + Sync + 'static,
    ) -> &mut Self {
        self.run_javascript_alert_panel = Some(Arc::new(f));
        self
    }

    pub fn on_create_web_view(
        &mut self,
        f: impl Fn(&NavigationAction, &WindowFeatures) -> NewWindowPolicy + Send + Sync + 'static,
    ) -> &mut Self {
        self.create_web_view = Some(Arc::new(f));
        self
    }
}

impl std::fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut set = Vec::new();
        let slots = [
            ("decide_policy_for_navigation", self.decide_policy_for_navigation.is_some()),
            ("decide_policy_for_response", self.decide_policy_for_response.is_some()),
            ("did_start_provisional_navigation", self.did_start_provisional_navigation.is_some()),
            ("did_commit_navigation", self.did_commit_navigation.is_some()),
            ("did_finish_navigation", self.did_finish_navigation.is_some()),
            ("did_receive_server_redirect", self.did_receive_server_redirect.is_some()),
            ("did_fail_provisional_navigation", self.did_fail_provisional_navigation.is_some()),
            ("run_javascript_confirm_panel", self.run_javascript_confirm_panel.is_some()),
            ("run_javascript_alert_panel", self.run_javascript_alert_panel.is_some()),
            ("create_web_view", self.create_web_view.is_some()),
        ];
        for (name, present) in slots {
            if present {
                set.push(name);
            }
        }
        f.debug_struct("HandlerTable").field("set", &set).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_fill_slots() {
        let mut table = HandlerTable::default();
        assert!(format!("{table:?}").contains("set: []"));

        table
            .on_did_finish_navigation(|_| {})
            .on_run_javascript_confirm_panel(|_, _, d| d.decide(false));

        assert!(table.did_finish_navigation.is_some());
        assert!(table.run_javascript_confirm_panel.is_some());
        assert!(table.did_commit_navigation.is_none());
        assert!(format!("{table:?}").contains("did_finish_navigation"));
    }
}
