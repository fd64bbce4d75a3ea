//! In-memory agent backend for integration tests.
//!
//! Behaves like a stale-but-honest agent: heartbeat commands flip the reported
//! flag, while goal and risk writes are recorded but never reflected in status.

#![allow(dead_code)]

use async_trait::async_trait;
use bee_core::{
    AgentBackend, BackendError, BackendResult, ConversationMeta, ConversationMetaPatch, GoalSet,
    HeartbeatAction, MemorySearchRequest, RiskDraft, StatusSnapshot,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Status,
    Goals(Vec<String>),
    Risk(u8),
    Heartbeat(HeartbeatAction),
    Search(MemorySearchRequest),
    Health,
    MetaGet(Option<String>),
    MetaSave(ConversationMeta),
    MetaPatch(ConversationMetaPatch),
}

#[derive(Default)]
struct FakeState {
    status: Option<StatusSnapshot>,
    fail_status: bool,
    fail_commands: bool,
    search_replies: HashMap<String, Value>,
    meta_reply: Option<Value>,
    calls: Vec<Call>,
}

#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
}

pub fn snapshot(running: bool, risk: i64, goals: &[&str]) -> StatusSnapshot {
    StatusSnapshot {
        heartbeat_running: running,
        heartbeat_interval_sec: 60,
        risk_tolerance: risk,
        memory_goals: GoalSet {
            goals: goals.iter().map(|g| g.to_string()).collect(),
            ..GoalSet::default()
        },
        personality_summary: "Curious, disciplined, slightly sarcastic.".into(),
        evermem_enabled: true,
        evermem_endpoint: Some("http://evermem.local:1995".into()),
        evermem_group_id: Some("bee-hive".into()),
        last_tick: None,
    }
}

impl FakeBackend {
    pub fn with_status(status: StatusSnapshot) -> Arc<Self> {
        let fake = Self::default();
        fake.set_status(status);
        Arc::new(fake)
    }

    pub fn offline() -> Arc<Self> {
        let fake = Self::default();
        fake.state.lock().unwrap().fail_status = true;
        Arc::new(fake)
    }

    pub fn set_status(&self, status: StatusSnapshot) {
        let mut state = self.state.lock().unwrap();
        state.status = Some(status);
        state.fail_status = false;
    }

    pub fn set_status_failing(&self, failing: bool) {
        self.state.lock().unwrap().fail_status = failing;
    }

    pub fn set_commands_failing(&self, failing: bool) {
        self.state.lock().unwrap().fail_commands = failing;
    }

    pub fn reply_to_search(&self, query: &str, reply: Value) {
        self.state
            .lock()
            .unwrap()
            .search_replies
            .insert(query.to_string(), reply);
    }

    pub fn reply_to_meta(&self, reply: Value) {
        self.state.lock().unwrap().meta_reply = Some(reply);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) -> bool {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        state.fail_commands
    }

    fn command_result(failing: bool) -> BackendResult<()> {
        if failing {
            Err(BackendError::Rejected("fake command failure".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl AgentBackend for FakeBackend {
    async fn fetch_status(&self) -> BackendResult<StatusSnapshot> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Status);
        match (&state.status, state.fail_status) {
            (Some(status), false) => Ok(status.clone()),
            _ => Err(BackendError::Rejected("fake status unavailable".into())),
        }
    }

    async fn save_goals(&self, goals: &[String]) -> BackendResult<()> {
        let failing = self.record(Call::Goals(goals.to_vec()));
        Self::command_result(failing)
    }

    async fn save_risk(&self, risk: RiskDraft) -> BackendResult<()> {
        let failing = self.record(Call::Risk(risk.value()));
        Self::command_result(failing)
    }

    async fn heartbeat(&self, action: HeartbeatAction) -> BackendResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Heartbeat(action));
        if state.fail_commands {
            return Self::command_result(true);
        }
        if let Some(status) = state.status.as_mut() {
            status.heartbeat_running = action == HeartbeatAction::Start;
        }
        Ok(())
    }

    async fn search_memories(&self, request: &MemorySearchRequest) -> BackendResult<Value> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Search(request.clone()));
        if state.fail_commands {
            return Err(BackendError::Rejected("fake search transport failure".into()));
        }
        Ok(state
            .search_replies
            .get(&request.search_query)
            .cloned()
            .unwrap_or_else(|| json!({"ok": true, "result": {"memory_list": []}})))
    }

    async fn health(&self) -> BackendResult<bool> {
        let failing = self.record(Call::Health);
        Ok(!failing)
    }

    async fn conversation_meta(&self, group_id: Option<&str>) -> BackendResult<Value> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::MetaGet(group_id.map(str::to_string)));
        Ok(state.meta_reply.clone().unwrap_or_else(|| json!({"ok": false})))
    }

    async fn save_conversation_meta(&self, meta: &ConversationMeta) -> BackendResult<Value> {
        let failing = self.record(Call::MetaSave(meta.clone()));
        Ok(json!({ "ok": !failing }))
    }

    async fn patch_conversation_meta(&self, patch: &ConversationMetaPatch) -> BackendResult<Value> {
        let failing = self.record(Call::MetaPatch(patch.clone()));
        Ok(json!({ "ok": !failing }))
    }
}
