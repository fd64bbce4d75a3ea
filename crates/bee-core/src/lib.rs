//! bee-core: the state-synchronization layer of the B.E.E. Hive Manager.
//!
//! Keeps the operator's view of the agent in step with the agent itself:
//! `StatusStore` owns the authoritative snapshot, `CommandDispatcher` issues
//! writes (and re-reads status after a heartbeat toggle), and
//! `MemorySearchController` runs the one request whose failure the operator sees.
//! `HivePanel` bundles them over a single `AgentBackend`.

mod backend;
mod commands;
mod config;
mod conversation_meta;
mod error;
mod memory_search;
mod panel;
mod sequence;
mod shared;
mod status;
pub mod view;

pub use backend::{AgentBackend, HttpBackend};
pub use commands::CommandDispatcher;
pub use config::{
    PanelConfig, DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SEARCH_RESULT_LIMIT,
};
pub use conversation_meta::{
    unwrap_meta, ConversationMeta, ConversationMetaDraft, ConversationMetaEditor,
    ConversationMetaPatch, MetaCompletion, MetaDraftError, MetaNotice, MetaOp, MetaTicket,
    DEFAULT_SCENE,
};
pub use error::{BackendError, BackendResult};
pub use memory_search::{
    extract_results, MemoryQueryState, MemoryResult, MemorySearchController, SearchCompletion,
    SearchTicket, SEARCH_FAILED_MESSAGE,
};
pub use panel::HivePanel;
pub use sequence::RequestSequence;
pub use shared::{
    Drafts, GoalDrafts, GoalSet, GoalsUpdate, HeartbeatAction, MemorySearchRequest, RiskDraft,
    RiskUpdate, StatusSnapshot, Timestamp, GOAL_COUNT,
};
pub use status::{RefreshApplied, RefreshCompletion, RefreshTicket, StatusStore};
