//! Integration test: CommandDispatcher sequencing and best-effort contract.

mod common;

use bee_core::{CommandDispatcher, GoalDrafts, HeartbeatAction, HivePanel, RiskDraft, StatusStore};
use common::{snapshot, Call, FakeBackend};

#[tokio::test]
async fn double_toggle_restores_heartbeat() {
    let backend = FakeBackend::with_status(snapshot(true, 5, &["a", "b", "c"]));
    let mut store = StatusStore::new(backend.clone());
    let dispatcher = CommandDispatcher::new(backend.clone());
    store.refresh().await;

    let running = store.current().unwrap().heartbeat_running;
    let action = dispatcher.toggle_heartbeat(running, &mut store).await;
    assert_eq!(action, HeartbeatAction::Stop);
    assert!(!store.current().unwrap().heartbeat_running);

    let running = store.current().unwrap().heartbeat_running;
    let action = dispatcher.toggle_heartbeat(running, &mut store).await;
    assert_eq!(action, HeartbeatAction::Start);
    assert!(store.current().unwrap().heartbeat_running);
}

#[tokio::test]
async fn toggle_sends_command_before_refresh() {
    let backend = FakeBackend::with_status(snapshot(false, 5, &["a", "b", "c"]));
    let mut store = StatusStore::new(backend.clone());
    let dispatcher = CommandDispatcher::new(backend.clone());

    dispatcher.toggle_heartbeat(false, &mut store).await;

    assert_eq!(
        backend.calls(),
        vec![Call::Heartbeat(HeartbeatAction::Start), Call::Status]
    );
}

#[tokio::test]
async fn failed_toggle_still_refreshes() {
    let backend = FakeBackend::with_status(snapshot(true, 5, &["a", "b", "c"]));
    let mut store = StatusStore::new(backend.clone());
    let dispatcher = CommandDispatcher::new(backend.clone());
    store.refresh().await;

    backend.set_commands_failing(true);
    dispatcher.toggle_heartbeat(true, &mut store).await;

    assert_eq!(backend.call_count(|c| *c == Call::Status), 2);
    // Authoritative status still says running: the failed stop is visible as "no change".
    assert!(store.current().unwrap().heartbeat_running);
}

#[tokio::test]
async fn toggle_uses_caller_view_not_server_state() {
    let backend = FakeBackend::with_status(snapshot(true, 5, &["a", "b", "c"]));
    let mut store = StatusStore::new(backend.clone());
    let dispatcher = CommandDispatcher::new(backend.clone());

    // Caller believes the heartbeat is paused even though the agent runs it.
    let action = dispatcher.toggle_heartbeat(false, &mut store).await;
    assert_eq!(action, HeartbeatAction::Start);
}

#[tokio::test]
async fn saves_are_fire_and_forget() {
    let backend = FakeBackend::with_status(snapshot(true, 5, &["a", "b", "c"]));
    let dispatcher = CommandDispatcher::new(backend.clone());

    let goals = GoalDrafts::new(["one".into(), "two".into(), "three".into()]);
    dispatcher.save_goals(&goals).await.unwrap();
    dispatcher.save_risk(RiskDraft::new(8)).await.unwrap();

    assert_eq!(
        backend.calls(),
        vec![
            Call::Goals(vec!["one".into(), "two".into(), "three".into()]),
            Call::Risk(8),
        ]
    );
}

#[tokio::test]
async fn save_failures_reach_the_caller_only() {
    let backend = FakeBackend::with_status(snapshot(true, 5, &["a", "b", "c"]));
    let dispatcher = CommandDispatcher::new(backend.clone());
    backend.set_commands_failing(true);

    assert!(dispatcher.save_risk(RiskDraft::new(2)).await.is_err());
    assert_eq!(backend.call_count(|c| *c == Call::Status), 0);
}

#[tokio::test]
async fn panel_toggle_without_snapshot_sends_nothing() {
    let backend = FakeBackend::offline();
    let mut panel = HivePanel::new(backend.clone(), 6);
    panel.load().await;

    assert_eq!(panel.toggle_heartbeat().await, None);
    assert_eq!(backend.call_count(|c| matches!(c, Call::Heartbeat(_))), 0);
}

#[tokio::test]
async fn panel_saves_use_store_drafts() {
    let backend = FakeBackend::with_status(snapshot(true, 5, &["a", "b", "c"]));
    let mut panel = HivePanel::new(backend.clone(), 6);
    panel.load().await;

    panel.status.drafts_mut().goals.set(2, "c2");
    panel.status.drafts_mut().risk.set(9);
    panel.save_goals().await.unwrap();
    panel.save_risk().await.unwrap();

    let calls = backend.calls();
    assert!(calls.contains(&Call::Goals(vec!["a".into(), "b".into(), "c2".into()])));
    assert!(calls.contains(&Call::Risk(9)));
    assert_eq!(panel.meta.draft().group_id, "bee-hive");
}
