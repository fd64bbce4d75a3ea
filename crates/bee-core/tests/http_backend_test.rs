//! Integration test: HttpBackend against a mock agent.
//!
//! ## Scenarios
//! 1. Status decodes with optional fields absent and a naive `last_tick`.
//! 2. Commands hit the right paths with the right bodies.
//! 3. Search posts the query and limit and returns the raw envelope.
//! 4. Conversation-meta GET forwards `group_id` only when set.
//! 5. Non-2xx is a `Status` error with a truncated body; bad JSON is `Decode`.
//! 6. Health is true only for `{"status": "ok"}`.
//! 7. Full panel flow: toggle sends the command then re-reads status.

use std::time::Duration;

use bee_core::{
    AgentBackend, BackendError, ConversationMetaPatch, HeartbeatAction, HivePanel, HttpBackend,
    MemorySearchRequest, RiskDraft,
};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend(server: &MockServer) -> HttpBackend {
    HttpBackend::new(&format!("{}/", server.uri()), Duration::from_secs(5))
}

fn status_body(running: bool) -> serde_json::Value {
    json!({
        "heartbeat_running": running,
        "heartbeat_interval_sec": 300,
        "risk_tolerance": 5,
        "memory_goals": {"goals": ["a", "b", "c"]},
        "personality_summary": "Curious.",
        "evermem_enabled": false,
        "last_tick": "2024-05-01T12:30:00.123456"
    })
}

#[tokio::test]
async fn status_decodes_sparse_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body(true)))
        .expect(1)
        .mount(&server)
        .await;

    let status = backend(&server).fetch_status().await.unwrap();
    assert!(status.heartbeat_running);
    assert_eq!(status.heartbeat_interval_sec, 300);
    assert_eq!(status.evermem_endpoint, None);
    assert_eq!(status.evermem_group_id, None);
    let tick = status.last_tick.unwrap();
    assert_eq!(tick.to_string(), "2024-05-01 12:30:00 UTC");
}

#[tokio::test]
async fn commands_post_expected_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/memory/goals"))
        .and(body_json(json!({"goals": ["one", "two", "three"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/config"))
        .and(body_json(json!({"risk_tolerance": 7})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/heartbeat/stop"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let http = backend(&server);
    let goals = vec!["one".to_string(), "two".to_string(), "three".to_string()];
    http.save_goals(&goals).await.unwrap();
    http.save_risk(RiskDraft::new(7)).await.unwrap();
    http.heartbeat(HeartbeatAction::Stop).await.unwrap();
}

#[tokio::test]
async fn search_returns_raw_envelope() {
    let server = MockServer::start().await;
    let envelope = json!({"ok": true, "result": {"memory_list": [{"title": "A"}]}});
    Mock::given(method("POST"))
        .and(path("/api/evermem/search"))
        .and(body_json(json!({"search_query": "project status", "result_limit": 6})))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let request = MemorySearchRequest {
        search_query: "project status".into(),
        result_limit: 6,
    };
    assert_eq!(backend(&server).search_memories(&request).await.unwrap(), envelope);
}

#[tokio::test]
async fn meta_get_forwards_group_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/evermem/conversation-meta"))
        .and(query_param("group_id", "bee-hive"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let reply = backend(&server)
        .conversation_meta(Some(" bee-hive "))
        .await
        .unwrap();
    assert_eq!(reply["ok"], true);
}

#[tokio::test]
async fn meta_patch_sends_changed_fields_only() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/evermem/conversation-meta"))
        .and(body_json(json!({"group_id": "bee-hive", "name": "Hive"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let patch = ConversationMetaPatch {
        group_id: Some("bee-hive".into()),
        name: Some("Hive".into()),
        ..ConversationMetaPatch::default()
    };
    backend(&server).patch_conversation_meta(&patch).await.unwrap();
}

#[tokio::test]
async fn non_success_is_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/heartbeat/start"))
        .respond_with(ResponseTemplate::new(503).set_body_string("x".repeat(1000)))
        .mount(&server)
        .await;

    let err = backend(&server)
        .heartbeat(HeartbeatAction::Start)
        .await
        .unwrap_err();
    match err {
        BackendError::Status { status, body } => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(body.len(), BackendError::BODY_EXCERPT_LEN);
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_status_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>starting</html>"))
        .mount(&server)
        .await;

    let err = backend(&server).fetch_status().await.unwrap_err();
    assert!(matches!(err, BackendError::Decode(_)));
}

#[tokio::test]
async fn health_requires_ok_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "degraded"})))
        .mount(&server)
        .await;

    let http = backend(&server);
    assert!(http.health().await.unwrap());
    assert!(!http.health().await.unwrap());
}

#[tokio::test]
async fn unreachable_agent_is_transport_error() {
    let http = HttpBackend::new("http://127.0.0.1:9", Duration::from_millis(500));
    let err = http.fetch_status().await.unwrap_err();
    assert!(matches!(err, BackendError::Transport(_)));
}

#[tokio::test]
async fn panel_toggle_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body(true)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/heartbeat/stop"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body(false)))
        .mount(&server)
        .await;

    let mut panel = HivePanel::new(std::sync::Arc::new(backend(&server)), 6);
    panel.load().await;
    assert_eq!(panel.toggle_heartbeat().await, Some(HeartbeatAction::Stop));
    assert!(!panel.status.current().unwrap().heartbeat_running);
    assert_eq!(panel.status.drafts().goals.as_slice(), ["a", "b", "c"]);
}
