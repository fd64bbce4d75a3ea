//! CommandDispatcher: best-effort control, authoritative status.
//!
//! Goal and risk saves are fire-and-forget: the response body is ignored and no
//! refresh follows, so the displayed status can lag until the next reload. The
//! heartbeat toggle is the one command confirmed by re-reading status, because the
//! start/pause affordance depends on it.

use std::sync::Arc;

use crate::backend::AgentBackend;
use crate::error::BackendResult;
use crate::shared::{GoalDrafts, HeartbeatAction, RiskDraft};
use crate::status::StatusStore;

#[derive(Clone)]
pub struct CommandDispatcher {
    backend: Arc<dyn AgentBackend>,
}

impl CommandDispatcher {
    pub fn new(backend: Arc<dyn AgentBackend>) -> Self {
        Self { backend }
    }

    /// Sends all three goals. Failures are logged; presentation does not surface them.
    pub async fn save_goals(&self, goals: &GoalDrafts) -> BackendResult<()> {
        tracing::info!(goals = ?goals.as_slice(), "saving directive goals");
        self.backend
            .save_goals(goals.as_slice())
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "goal save failed"))
    }

    /// Sends the risk tolerance. Same contract as `save_goals`.
    pub async fn save_risk(&self, risk: RiskDraft) -> BackendResult<()> {
        tracing::info!(risk_tolerance = risk.value(), "saving risk tolerance");
        self.backend
            .save_risk(risk)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "risk save failed"))
    }

    /// Request half of a heartbeat toggle, without the follow-up refresh.
    pub async fn send_heartbeat(&self, action: HeartbeatAction) -> BackendResult<()> {
        tracing::info!(%action, "sending heartbeat command");
        self.backend
            .heartbeat(action)
            .await
            .inspect_err(|e| tracing::warn!(%action, error = %e, "heartbeat command failed"))
    }

    /// Flips the heartbeat relative to `current_running`, then refreshes `store`
    /// whether or not the command succeeded. Returns the action that was sent.
    ///
    /// The decision uses the value the caller saw; it is not re-read mid-flight.
    pub async fn toggle_heartbeat(
        &self,
        current_running: bool,
        store: &mut StatusStore,
    ) -> HeartbeatAction {
        let action = HeartbeatAction::toggle_from(current_running);
        let _ = self.send_heartbeat(action).await;
        store.refresh().await;
        action
    }
}
