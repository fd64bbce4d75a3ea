//! Conversation metadata for the agent's EvermemOS group.
//!
//! The operator edits a text-only draft; `user_details` is typed as JSON and
//! `tags` as a comma-separated list. Validation happens before any request, so an
//! invalid draft never reaches the backend.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

use crate::backend::AgentBackend;
use crate::error::BackendResult;
use crate::sequence::RequestSequence;
use crate::shared::StatusSnapshot;

/// Scene the agent registers by default.
pub const DEFAULT_SCENE: &str = "assistant";

/// Body of `POST /api/evermem/conversation-meta`. Absent fields are sent as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationMeta {
    pub group_id: Option<String>,
    pub scene: Option<String>,
    pub scene_desc: Option<Value>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub default_timezone: Option<String>,
    pub tags: Option<Vec<String>>,
    pub user_details: Option<Map<String, Value>>,
}

/// Body of `PATCH /api/evermem/conversation-meta`: `group_id` plus whatever changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConversationMetaPatch {
    pub group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene_desc: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_details: Option<Map<String, Value>>,
}

/// Why a draft could not be turned into a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetaDraftError {
    #[error("User Details must be valid JSON.")]
    DetailsNotJson,
    #[error("User Details JSON must be an object.")]
    DetailsNotObject,
}

/// Text-field mirror of `ConversationMeta`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationMetaDraft {
    pub group_id: String,
    pub scene: String,
    pub name: String,
    pub description: String,
    /// The `description` inside `scene_desc`.
    pub scene_desc: String,
    pub timezone: String,
    /// Comma-separated.
    pub tags: String,
    /// JSON object text.
    pub user_details: String,
}

impl Default for ConversationMetaDraft {
    fn default() -> Self {
        Self {
            group_id: String::new(),
            scene: DEFAULT_SCENE.to_string(),
            name: String::new(),
            description: String::new(),
            scene_desc: String::new(),
            timezone: String::new(),
            tags: String::new(),
            user_details: String::new(),
        }
    }
}

fn non_blank(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn value_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

impl ConversationMetaDraft {
    /// Replaces every field from a metadata object as returned by the backend.
    /// Tolerates loosely typed fields rather than rejecting the whole record.
    pub fn load(&mut self, meta: &Value) {
        let text = |key: &str| value_text(meta.get(key));
        self.group_id = text("group_id");
        self.scene = text("scene");
        self.name = text("name");
        self.description = text("description");
        self.timezone = text("default_timezone");

        self.scene_desc = match meta.get("scene_desc") {
            Some(Value::Object(desc)) => match desc.get("description").and_then(Value::as_str) {
                Some(d) if !d.is_empty() => d.to_string(),
                _ => Value::Object(desc.clone()).to_string(),
            },
            other => value_text(other),
        };

        self.tags = match meta.get("tags") {
            Some(Value::Array(tags)) => tags
                .iter()
                .map(|t| value_text(Some(t)))
                .collect::<Vec<_>>()
                .join(", "),
            other => value_text(other),
        };

        self.user_details = match meta.get("user_details") {
            Some(Value::Object(details)) if !details.is_empty() => {
                serde_json::to_string_pretty(details).unwrap_or_default()
            }
            _ => String::new(),
        };
    }

    /// Fills `group_id` from the status snapshot when the operator has not set one.
    pub fn seed_group_id(&mut self, snapshot: &StatusSnapshot) {
        if self.group_id.trim().is_empty() {
            if let Some(group) = &snapshot.evermem_group_id {
                self.group_id = group.clone();
            }
        }
    }

    pub fn parse_tags(&self) -> Option<Vec<String>> {
        if self.tags.trim().is_empty() {
            return None;
        }
        Some(
            self.tags
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// `None` for blank text; an error for text that is not a JSON object.
    pub fn parse_user_details(&self) -> Result<Option<Map<String, Value>>, MetaDraftError> {
        let raw = self.user_details.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Ok(Some(map)),
            Ok(_) => Err(MetaDraftError::DetailsNotObject),
            Err(_) => Err(MetaDraftError::DetailsNotJson),
        }
    }

    fn scene_desc_value(&self) -> Option<Value> {
        non_blank(&self.scene_desc).map(|d| serde_json::json!({ "description": d }))
    }

    pub fn to_meta(&self) -> Result<ConversationMeta, MetaDraftError> {
        Ok(ConversationMeta {
            group_id: non_blank(&self.group_id),
            scene: non_blank(&self.scene),
            scene_desc: self.scene_desc_value(),
            name: non_blank(&self.name),
            description: non_blank(&self.description),
            default_timezone: non_blank(&self.timezone),
            tags: self.parse_tags(),
            user_details: self.parse_user_details()?,
        })
    }

    pub fn to_patch(&self) -> Result<ConversationMetaPatch, MetaDraftError> {
        Ok(ConversationMetaPatch {
            group_id: non_blank(&self.group_id),
            name: non_blank(&self.name),
            description: non_blank(&self.description),
            scene_desc: self.scene_desc_value(),
            default_timezone: non_blank(&self.timezone),
            tags: self.parse_tags(),
            user_details: self.parse_user_details()?,
        })
    }
}

/// Pulls the metadata object out of a `{ok, result}` envelope.
///
/// The memory service nests its own `{result: {...}}` inside the agent's; either
/// layer may carry the record. Returns `None` unless `ok` is true.
pub fn unwrap_meta(envelope: &Value) -> Option<Value> {
    if envelope.get("ok").and_then(Value::as_bool) != Some(true) {
        return None;
    }
    let outer = envelope.get("result").filter(|v| v.is_object());
    let inner = outer.and_then(|o| o.get("result")).filter(|v| v.is_object());
    Some(
        inner
            .or(outer)
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new())),
    )
}

fn envelope_ok(envelope: &Value) -> bool {
    envelope.get("ok").and_then(Value::as_bool) == Some(true)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaOp {
    Load,
    Save,
    Patch,
}

/// Operator-facing result of the last metadata operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaNotice {
    Pending(MetaOp),
    Done(MetaOp),
    Failed(MetaOp),
    Invalid(MetaDraftError),
}

impl MetaNotice {
    pub fn is_error(&self) -> bool {
        matches!(self, MetaNotice::Failed(_) | MetaNotice::Invalid(_))
    }
}

impl fmt::Display for MetaNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            MetaNotice::Pending(MetaOp::Load) => "Loading conversation meta...",
            MetaNotice::Pending(MetaOp::Save) => "Saving conversation meta...",
            MetaNotice::Pending(MetaOp::Patch) => "Updating conversation meta...",
            MetaNotice::Done(MetaOp::Load) => "Conversation meta loaded.",
            MetaNotice::Done(MetaOp::Save) => "Conversation meta saved.",
            MetaNotice::Done(MetaOp::Patch) => "Conversation meta updated.",
            MetaNotice::Failed(MetaOp::Load) => "Failed to load conversation meta.",
            MetaNotice::Failed(MetaOp::Save) => "Failed to save conversation meta.",
            MetaNotice::Failed(MetaOp::Patch) => "Failed to update conversation meta.",
            MetaNotice::Invalid(e) => return write!(f, "{e}"),
        };
        f.write_str(text)
    }
}

enum MetaRequest {
    Load(Option<String>),
    Save(ConversationMeta),
    Patch(ConversationMetaPatch),
}

/// A validated metadata request waiting to run.
pub struct MetaTicket {
    seq: u64,
    request: MetaRequest,
    backend: Arc<dyn AgentBackend>,
}

impl MetaTicket {
    pub fn op(&self) -> MetaOp {
        match self.request {
            MetaRequest::Load(_) => MetaOp::Load,
            MetaRequest::Save(_) => MetaOp::Save,
            MetaRequest::Patch(_) => MetaOp::Patch,
        }
    }

    pub async fn run(self) -> MetaCompletion {
        let op = self.op();
        let result = match &self.request {
            MetaRequest::Load(group_id) => self.backend.conversation_meta(group_id.as_deref()).await,
            MetaRequest::Save(meta) => self.backend.save_conversation_meta(meta).await,
            MetaRequest::Patch(patch) => self.backend.patch_conversation_meta(patch).await,
        };
        MetaCompletion {
            seq: self.seq,
            op,
            result,
        }
    }
}

#[derive(Debug)]
pub struct MetaCompletion {
    pub seq: u64,
    pub op: MetaOp,
    pub result: BackendResult<Value>,
}

pub struct ConversationMetaEditor {
    backend: Arc<dyn AgentBackend>,
    draft: ConversationMetaDraft,
    notice: Option<MetaNotice>,
    sequence: RequestSequence,
}

impl ConversationMetaEditor {
    pub fn new(backend: Arc<dyn AgentBackend>) -> Self {
        Self {
            backend,
            draft: ConversationMetaDraft::default(),
            notice: None,
            sequence: RequestSequence::new(),
        }
    }

    pub fn draft(&self) -> &ConversationMetaDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut ConversationMetaDraft {
        &mut self.draft
    }

    pub fn notice(&self) -> Option<&MetaNotice> {
        self.notice.as_ref()
    }

    /// Validates the draft for `op` and issues a ticket. An invalid draft sets an
    /// `Invalid` notice and returns `None` without touching the backend.
    pub fn begin(&mut self, op: MetaOp) -> Option<MetaTicket> {
        let request = match op {
            MetaOp::Load => Ok(MetaRequest::Load(non_blank(&self.draft.group_id))),
            MetaOp::Save => self.draft.to_meta().map(MetaRequest::Save),
            MetaOp::Patch => self.draft.to_patch().map(MetaRequest::Patch),
        };
        match request {
            Ok(request) => {
                self.notice = Some(MetaNotice::Pending(op));
                Some(MetaTicket {
                    seq: self.sequence.issue(),
                    request,
                    backend: Arc::clone(&self.backend),
                })
            }
            Err(e) => {
                self.notice = Some(MetaNotice::Invalid(e));
                None
            }
        }
    }

    /// Lands a completion; superseded ones are dropped and return false.
    pub fn complete(&mut self, completion: MetaCompletion) -> bool {
        if !self.sequence.is_latest(completion.seq) {
            tracing::debug!(seq = completion.seq, "discarding superseded conversation-meta reply");
            return false;
        }
        let op = completion.op;
        let notice = match completion.result {
            Ok(envelope) => match op {
                MetaOp::Load => match unwrap_meta(&envelope) {
                    Some(meta) => {
                        self.draft.load(&meta);
                        MetaNotice::Done(op)
                    }
                    None => MetaNotice::Failed(op),
                },
                _ if envelope_ok(&envelope) => MetaNotice::Done(op),
                _ => MetaNotice::Failed(op),
            },
            Err(e) => {
                tracing::warn!(?op, error = %e, "conversation-meta request failed");
                MetaNotice::Failed(op)
            }
        };
        self.notice = Some(notice);
        true
    }

    /// Begin, run and complete in one go.
    pub async fn run(&mut self, op: MetaOp) -> Option<&MetaNotice> {
        if let Some(ticket) = self.begin(op) {
            let completion = ticket.run().await;
            self.complete(completion);
        }
        self.notice.as_ref()
    }

    pub fn seed_group_id(&mut self, snapshot: &StatusSnapshot) {
        self.draft.seed_group_id(snapshot);
    }
}
