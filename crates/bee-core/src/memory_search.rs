//! Memory search against EvermemOS, proxied through the agent.
//!
//! ```text
//! Idle ──submit(non-blank)──▶ Loading ──ok:true──────────▶ Success(results)
//!                               │
//!                               └──ok≠true / failure──▶ Error(generic message)
//! ```
//!
//! A new submission from any state goes back to Loading and drops the previous
//! results. Completions are sequenced: only the latest submission may land.

use serde_json::Value;
use std::sync::Arc;

use crate::backend::AgentBackend;
use crate::error::{BackendError, BackendResult};
use crate::sequence::RequestSequence;
use crate::shared::{MemorySearchRequest, Timestamp};

/// Shown for every search failure. The upstream detail is not actionable for the operator.
pub const SEARCH_FAILED_MESSAGE: &str = "Unable to query EvermemOS right now.";

/// One memory returned by the memory service. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryResult {
    pub title: Option<String>,
    pub content: Option<String>,
    pub create_time: Option<Timestamp>,
}

impl MemoryResult {
    /// Reads a list entry. Fields of the wrong type count as absent; a non-object
    /// entry yields an empty result that still keeps its place in the list.
    pub fn from_value(value: &Value) -> Self {
        let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
        let create_time = match value.get("create_time") {
            Some(Value::String(s)) => Some(Timestamp::parse(s)),
            Some(Value::Number(n)) => n.as_i64().map(Timestamp::from_millis),
            _ => None,
        };
        Self {
            title: text("title"),
            content: text("content"),
            create_time,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum MemoryQueryState {
    #[default]
    Idle,
    Loading,
    Success(Vec<MemoryResult>),
    Error(String),
}

impl MemoryQueryState {
    pub fn is_loading(&self) -> bool {
        matches!(self, MemoryQueryState::Loading)
    }

    /// Results to show; empty for every state but `Success`.
    pub fn results(&self) -> &[MemoryResult] {
        match self {
            MemoryQueryState::Success(results) => results.as_slice(),
            _ => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            MemoryQueryState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Interprets the `{ok, result: {memory_list}}` envelope.
///
/// `ok` must be literally `true`. A missing or non-array `memory_list` is an empty
/// answer, not a failure.
pub fn extract_results(envelope: &Value) -> BackendResult<Vec<MemoryResult>> {
    if envelope.get("ok").and_then(Value::as_bool) != Some(true) {
        return Err(BackendError::Rejected("memory search returned ok=false".into()));
    }
    let results = envelope
        .pointer("/result/memory_list")
        .and_then(Value::as_array)
        .map(|list| list.iter().map(MemoryResult::from_value).collect())
        .unwrap_or_default();
    Ok(results)
}

/// A submitted search that has not run yet.
pub struct SearchTicket {
    seq: u64,
    request: MemorySearchRequest,
    backend: Arc<dyn AgentBackend>,
}

impl SearchTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn request(&self) -> &MemorySearchRequest {
        &self.request
    }

    pub async fn run(self) -> SearchCompletion {
        let result = match self.backend.search_memories(&self.request).await {
            Ok(envelope) => extract_results(&envelope),
            Err(e) => Err(e),
        };
        SearchCompletion {
            seq: self.seq,
            result,
        }
    }
}

#[derive(Debug)]
pub struct SearchCompletion {
    pub seq: u64,
    pub result: BackendResult<Vec<MemoryResult>>,
}

pub struct MemorySearchController {
    backend: Arc<dyn AgentBackend>,
    state: MemoryQueryState,
    sequence: RequestSequence,
    result_limit: u32,
}

impl MemorySearchController {
    pub fn new(backend: Arc<dyn AgentBackend>, result_limit: u32) -> Self {
        Self {
            backend,
            state: MemoryQueryState::Idle,
            sequence: RequestSequence::new(),
            result_limit,
        }
    }

    pub fn state(&self) -> &MemoryQueryState {
        &self.state
    }

    /// Starts a search. Blank queries are ignored: no request, no state change.
    pub fn submit(&mut self, query: &str) -> Option<SearchTicket> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        self.state = MemoryQueryState::Loading;
        Some(SearchTicket {
            seq: self.sequence.issue(),
            request: MemorySearchRequest {
                search_query: query.to_string(),
                result_limit: self.result_limit,
            },
            backend: Arc::clone(&self.backend),
        })
    }

    /// Lands a completion. Returns false when it was superseded and dropped.
    pub fn complete(&mut self, completion: SearchCompletion) -> bool {
        if !self.sequence.is_latest(completion.seq) {
            tracing::debug!(
                seq = completion.seq,
                latest = self.sequence.latest(),
                "discarding superseded memory search"
            );
            return false;
        }
        self.state = match completion.result {
            Ok(results) => MemoryQueryState::Success(results),
            Err(e) => {
                tracing::warn!(error = %e, "memory search failed");
                MemoryQueryState::Error(SEARCH_FAILED_MESSAGE.to_string())
            }
        };
        true
    }

    /// Submit, run and complete in one go.
    pub async fn search(&mut self, query: &str) -> &MemoryQueryState {
        if let Some(ticket) = self.submit(query) {
            let completion = ticket.run().await;
            self.complete(completion);
        }
        &self.state
    }
}
