//! Agent backend seam: the HTTP surface the panel consumes.
//!
//! `AgentBackend` is the trait the stores and controllers talk to; `HttpBackend`
//! is the reqwest implementation against a running agent. Tests substitute an
//! in-memory backend.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use crate::config::PanelConfig;
use crate::conversation_meta::{ConversationMeta, ConversationMetaPatch};
use crate::error::{BackendError, BackendResult};
use crate::shared::{
    GoalsUpdate, HeartbeatAction, MemorySearchRequest, RiskDraft, RiskUpdate, StatusSnapshot,
};

/// Everything the Hive Manager asks of the agent.
///
/// Command methods only report transport-level success; their response bodies are
/// not part of the contract. Search and conversation-meta calls hand back the raw
/// `{ok, result}` envelope because the memory service behind them has no fixed shape.
#[async_trait]
pub trait AgentBackend: Send + Sync {
    /// `GET /api/status`
    async fn fetch_status(&self) -> BackendResult<StatusSnapshot>;

    /// `POST /api/memory/goals`
    async fn save_goals(&self, goals: &[String]) -> BackendResult<()>;

    /// `POST /api/config`
    async fn save_risk(&self, risk: RiskDraft) -> BackendResult<()>;

    /// `POST /api/heartbeat/start` or `/stop`
    async fn heartbeat(&self, action: HeartbeatAction) -> BackendResult<()>;

    /// `POST /api/evermem/search`
    async fn search_memories(&self, request: &MemorySearchRequest) -> BackendResult<Value>;

    /// `GET /api/health`; true when the agent answers `{"status": "ok"}`.
    async fn health(&self) -> BackendResult<bool>;

    /// `GET /api/evermem/conversation-meta`
    async fn conversation_meta(&self, group_id: Option<&str>) -> BackendResult<Value>;

    /// `POST /api/evermem/conversation-meta`
    async fn save_conversation_meta(&self, meta: &ConversationMeta) -> BackendResult<Value>;

    /// `PATCH /api/evermem/conversation-meta`
    async fn patch_conversation_meta(&self, patch: &ConversationMetaPatch) -> BackendResult<Value>;
}

/// reqwest client for a running agent.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn from_config(config: &PanelConfig) -> Self {
        Self::new(&config.base_url, config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, format!("{}{}", self.base_url, path))
    }

    /// Sends and returns the body text of a 2xx response.
    async fn send(&self, req: RequestBuilder) -> BackendResult<String> {
        let resp = req.send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(BackendError::status(status, &body));
        }
        Ok(body)
    }

    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> BackendResult<T> {
        let body = self.send(req).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl AgentBackend for HttpBackend {
    async fn fetch_status(&self) -> BackendResult<StatusSnapshot> {
        self.send_json(self.request(Method::GET, "/api/status")).await
    }

    async fn save_goals(&self, goals: &[String]) -> BackendResult<()> {
        let req = self
            .request(Method::POST, "/api/memory/goals")
            .json(&GoalsUpdate { goals });
        self.send(req).await.map(drop)
    }

    async fn save_risk(&self, risk: RiskDraft) -> BackendResult<()> {
        let req = self
            .request(Method::POST, "/api/config")
            .json(&RiskUpdate { risk_tolerance: risk });
        self.send(req).await.map(drop)
    }

    async fn heartbeat(&self, action: HeartbeatAction) -> BackendResult<()> {
        self.send(self.request(Method::POST, action.path()))
            .await
            .map(drop)
    }

    async fn search_memories(&self, request: &MemorySearchRequest) -> BackendResult<Value> {
        let req = self
            .request(Method::POST, "/api/evermem/search")
            .json(request);
        self.send_json(req).await
    }

    async fn health(&self) -> BackendResult<bool> {
        let body: Value = self.send_json(self.request(Method::GET, "/api/health")).await?;
        Ok(body.get("status").and_then(Value::as_str) == Some("ok"))
    }

    async fn conversation_meta(&self, group_id: Option<&str>) -> BackendResult<Value> {
        let mut req = self.request(Method::GET, "/api/evermem/conversation-meta");
        if let Some(id) = group_id.map(str::trim).filter(|id| !id.is_empty()) {
            req = req.query(&[("group_id", id)]);
        }
        self.send_json(req).await
    }

    async fn save_conversation_meta(&self, meta: &ConversationMeta) -> BackendResult<Value> {
        let req = self
            .request(Method::POST, "/api/evermem/conversation-meta")
            .json(meta);
        self.send_json(req).await
    }

    async fn patch_conversation_meta(&self, patch: &ConversationMetaPatch) -> BackendResult<Value> {
        let req = self
            .request(Method::PATCH, "/api/evermem/conversation-meta")
            .json(patch);
        self.send_json(req).await
    }
}
