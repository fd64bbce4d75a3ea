//! HivePanel: the components a presentation layer holds, sharing one backend.

use std::sync::Arc;

use crate::backend::{AgentBackend, HttpBackend};
use crate::commands::CommandDispatcher;
use crate::config::PanelConfig;
use crate::conversation_meta::ConversationMetaEditor;
use crate::error::BackendResult;
use crate::memory_search::MemorySearchController;
use crate::shared::HeartbeatAction;
use crate::status::StatusStore;

pub struct HivePanel {
    backend: Arc<dyn AgentBackend>,
    pub status: StatusStore,
    pub commands: CommandDispatcher,
    pub search: MemorySearchController,
    pub meta: ConversationMetaEditor,
}

impl HivePanel {
    pub fn new(backend: Arc<dyn AgentBackend>, search_result_limit: u32) -> Self {
        Self {
            status: StatusStore::new(Arc::clone(&backend)),
            commands: CommandDispatcher::new(Arc::clone(&backend)),
            search: MemorySearchController::new(Arc::clone(&backend), search_result_limit),
            meta: ConversationMetaEditor::new(Arc::clone(&backend)),
            backend,
        }
    }

    /// Panel over HTTP to the agent named in `config`.
    pub fn connect(config: &PanelConfig) -> Self {
        tracing::info!(base_url = %config.base_url, "connecting to agent backend");
        Self::new(
            Arc::new(HttpBackend::from_config(config)),
            config.search_result_limit,
        )
    }

    pub fn backend(&self) -> Arc<dyn AgentBackend> {
        Arc::clone(&self.backend)
    }

    /// Initial load: one status read, then the meta group seeded from it.
    pub async fn load(&mut self) {
        self.status.refresh().await;
        if let Some(snapshot) = self.status.current() {
            self.meta.seed_group_id(&snapshot);
        }
    }

    /// Heartbeat toggle against whatever status is currently displayed.
    /// Without a snapshot there is nothing to toggle from and nothing is sent.
    pub async fn toggle_heartbeat(&mut self) -> Option<HeartbeatAction> {
        let running = self.status.current()?.heartbeat_running;
        Some(
            self.commands
                .toggle_heartbeat(running, &mut self.status)
                .await,
        )
    }

    pub async fn save_risk(&self) -> BackendResult<()> {
        self.commands.save_risk(self.status.drafts().risk).await
    }

    pub async fn save_goals(&self) -> BackendResult<()> {
        self.commands.save_goals(&self.status.drafts().goals).await
    }

    pub async fn health(&self) -> BackendResult<bool> {
        self.backend.health().await
    }
}
