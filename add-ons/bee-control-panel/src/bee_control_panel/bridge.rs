//! bee_bridge: async channel between the control panel UI and the panel worker.
//!
//! The UI thread sends `PanelIntent`s with `try_send` (non-blocking) and reads the
//! latest `PanelView` from a watch channel. The worker owns the `HivePanel`, keeps
//! in-flight requests in a `JoinSet`, and applies completions on its own task so
//! overlapping requests go through the sequence guards in bee-core.

use std::sync::Arc;

use bee_core::{
    BackendResult, ConversationMetaDraft, Drafts, GoalDrafts, HeartbeatAction, HivePanel,
    MemoryQueryState, MetaCompletion, MetaNotice, MetaOp, RefreshCompletion, RiskDraft,
    SearchCompletion, StatusSnapshot,
};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;

/// Operator action forwarded from the UI.
#[derive(Debug, Clone)]
pub enum PanelIntent {
    Refresh,
    ToggleHeartbeat,
    SaveRisk(RiskDraft),
    SaveGoals(GoalDrafts),
    Search(String),
    Meta {
        op: MetaOp,
        draft: ConversationMetaDraft,
    },
}

/// Everything the UI renders, published by the worker after each step.
#[derive(Debug, Clone, Default)]
pub struct PanelView {
    pub status: Option<Arc<StatusSnapshot>>,
    /// Seeded drafts; only meaningful once `drafts_seeded` is true.
    pub drafts: Drafts,
    pub drafts_seeded: bool,
    pub heartbeat_pending: bool,
    pub search: MemoryQueryState,
    pub meta_draft: ConversationMetaDraft,
    /// Bumped whenever `meta_draft` changed on the worker side.
    pub meta_revision: u64,
    pub meta_notice: Option<MetaNotice>,
}

pub type BeeIntentSender = mpsc::Sender<PanelIntent>;
pub type BeeIntentReceiver = mpsc::Receiver<PanelIntent>;

/// Creates a bounded intent channel.
pub fn bee_control_panel_channel(capacity: usize) -> (BeeIntentSender, BeeIntentReceiver) {
    mpsc::channel(capacity)
}

/// Creates the view channel the worker publishes into.
pub fn bee_view_channel() -> (watch::Sender<PanelView>, watch::Receiver<PanelView>) {
    watch::channel(PanelView::default())
}

enum Completion {
    Refresh(RefreshCompletion),
    Heartbeat(HeartbeatAction, BackendResult<()>),
    Saved,
    Search(SearchCompletion),
    Meta(MetaCompletion),
}

struct Worker {
    panel: HivePanel,
    inflight: JoinSet<Completion>,
    heartbeat_pending: bool,
    meta_revision: u64,
}

impl Worker {
    fn dispatch(&mut self, intent: PanelIntent) {
        match intent {
            PanelIntent::Refresh => self.spawn_refresh(),
            PanelIntent::ToggleHeartbeat => {
                let Some(status) = self.panel.status.current() else {
                    tracing::debug!("heartbeat toggle ignored: no status loaded");
                    return;
                };
                let action = HeartbeatAction::toggle_from(status.heartbeat_running);
                let commands = self.panel.commands.clone();
                self.heartbeat_pending = true;
                self.inflight.spawn(async move {
                    Completion::Heartbeat(action, commands.send_heartbeat(action).await)
                });
            }
            PanelIntent::SaveRisk(risk) => {
                self.panel.status.drafts_mut().risk = risk;
                let commands = self.panel.commands.clone();
                self.inflight.spawn(async move {
                    let _ = commands.save_risk(risk).await;
                    Completion::Saved
                });
            }
            PanelIntent::SaveGoals(goals) => {
                self.panel.status.drafts_mut().goals = goals.clone();
                let commands = self.panel.commands.clone();
                self.inflight.spawn(async move {
                    let _ = commands.save_goals(&goals).await;
                    Completion::Saved
                });
            }
            PanelIntent::Search(query) => {
                if let Some(ticket) = self.panel.search.submit(&query) {
                    self.inflight
                        .spawn(async move { Completion::Search(ticket.run().await) });
                }
            }
            PanelIntent::Meta { op, draft } => {
                *self.panel.meta.draft_mut() = draft;
                if let Some(ticket) = self.panel.meta.begin(op) {
                    self.inflight
                        .spawn(async move { Completion::Meta(ticket.run().await) });
                }
            }
        }
    }

    fn spawn_refresh(&mut self) {
        let ticket = self.panel.status.begin_refresh();
        self.inflight
            .spawn(async move { Completion::Refresh(ticket.run().await) });
    }

    fn apply(&mut self, completion: Completion) {
        match completion {
            Completion::Refresh(done) => {
                self.panel.status.apply_refresh(done);
            }
            Completion::Heartbeat(action, _) => {
                // Refresh regardless of the command outcome.
                tracing::debug!(%action, "heartbeat command settled, refreshing status");
                self.heartbeat_pending = false;
                self.spawn_refresh();
            }
            Completion::Saved => {}
            Completion::Search(done) => {
                self.panel.search.complete(done);
            }
            Completion::Meta(done) => {
                let loaded = done.op == MetaOp::Load;
                if self.panel.meta.complete(done)
                    && loaded
                    && self.panel.meta.notice() == Some(&MetaNotice::Done(MetaOp::Load))
                {
                    self.meta_revision += 1;
                }
            }
        }
    }

    fn view(&self) -> PanelView {
        PanelView {
            status: self.panel.status.current(),
            drafts: self.panel.status.drafts().clone(),
            drafts_seeded: self.panel.status.is_seeded(),
            heartbeat_pending: self.heartbeat_pending,
            search: self.panel.search.state().clone(),
            meta_draft: self.panel.meta.draft().clone(),
            meta_revision: self.meta_revision,
            meta_notice: self.panel.meta.notice().cloned(),
        }
    }
}

/// Runs until the UI drops its intent sender or its view receiver.
///
/// Performs the initial load first, then serves intents and completions as they
/// arrive.
pub async fn run_panel_worker(
    mut panel: HivePanel,
    mut intents: BeeIntentReceiver,
    view: watch::Sender<PanelView>,
) {
    panel.load().await;
    let mut worker = Worker {
        panel,
        inflight: JoinSet::new(),
        heartbeat_pending: false,
        meta_revision: 1,
    };
    if view.send(worker.view()).is_err() {
        return;
    }

    loop {
        tokio::select! {
            intent = intents.recv() => match intent {
                Some(intent) => worker.dispatch(intent),
                None => break,
            },
            Some(joined) = worker.inflight.join_next(), if !worker.inflight.is_empty() => {
                match joined {
                    Ok(completion) => worker.apply(completion),
                    Err(e) => tracing::warn!(error = %e, "panel request task failed"),
                }
            }
        }
        if view.send(worker.view()).is_err() {
            break;
        }
    }
    tracing::info!("control panel closed, worker stopping");
}
