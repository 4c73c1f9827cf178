use crate::errors::NetError;
use crate::net::{HttpClientHandle, Request, Response};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// A short-lived network session owned by one web view.
///
/// Cloning yields another handle to the same session. Invalidating any handle
/// cancels every in-flight task started through the session, and tasks started
/// afterwards fail immediately with [`NetError::Cancelled`].
#[derive(Clone)]
pub struct BackgroundSession {
    id: Uuid,
    client: HttpClientHandle,
    cancel: CancellationToken,
}

impl std::fmt::Debug for BackgroundSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundSession")
            .field("id", &self.id)
            .field("invalidated", &self.is_invalidated())
            .finish_non_exhaustive()
    }
}

impl BackgroundSession {
    pub fn new(client: HttpClientHandle) -> Self {
        Self {
            id: Uuid::new_v4(),
            client,
            cancel: CancellationToken::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Runs `request` through the session's transport.
    pub async fn data_task(&self, request: Request) -> Result<Response, NetError> {
        if self.cancel.is_cancelled() {
            return Err(NetError::Cancelled);
        }

        tokio::select! {
            _ = self.cancel.cancelled() => Err(NetError::Cancelled),
            res = self.client.execute(request) => res,
        }
    }

    /// Cancels outstanding tasks and refuses new ones.
    pub fn invalidate_and_cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_invalidated(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Holds the single active [`BackgroundSession`] of a web view.
#[derive(Debug, Default)]
pub struct SessionSlot {
    current: Option<BackgroundSession>,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `session`. Any session already in the slot is invalidated
    /// before the new one becomes visible.
    pub fn assign(&mut self, session: Option<BackgroundSession>) {
        if let Some(old) = self.current.take() {
            log::debug!("invalidating background session {}", old.id);
            old.invalidate_and_cancel();
        }
        self.current = session;
    }

    /// Invalidates and drops the active session, if any.
    pub fn release(&mut self) {
        self.assign(None);
    }

    pub fn current(&self) -> Option<&BackgroundSession> {
        self.current.as_ref()
    }
}
