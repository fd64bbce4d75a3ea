//! Display labels shared by the control panel and the CLI.
//!
//! Every label has a fallback so an absent field renders as text, never as an error.

use crate::memory_search::{MemoryQueryState, MemoryResult};
use crate::shared::StatusSnapshot;

/// Backend prerequisites the operator provisions in the agent's `.env`.
pub const ONBOARDING_STEPS: [(&str, &str); 3] = [
    ("TELEGRAM_BOT_TOKEN", "Connect Telegram"),
    ("OPENAI_API_KEY", "Main model provider"),
    ("ELEVENLABS_API_KEY", "Voice output"),
];

pub fn last_tick_label(status: Option<&StatusSnapshot>) -> String {
    status
        .and_then(|s| s.last_tick.as_ref())
        .map(|t| t.to_string())
        .unwrap_or_else(|| "Never".to_string())
}

pub fn interval_label(status: Option<&StatusSnapshot>) -> String {
    status
        .map(|s| s.heartbeat_interval_sec.to_string())
        .unwrap_or_else(|| "?".to_string())
}

/// Verb for the heartbeat button: "Pause" while running, "Start" otherwise (and before load).
pub fn heartbeat_verb(status: Option<&StatusSnapshot>) -> &'static str {
    if status.is_some_and(|s| s.heartbeat_running) {
        "Pause"
    } else {
        "Start"
    }
}

pub fn heartbeat_state_label(status: Option<&StatusSnapshot>) -> &'static str {
    match status {
        Some(s) if s.heartbeat_running => "Running",
        Some(_) => "Paused",
        None => "Loading...",
    }
}

pub fn evermem_label(status: Option<&StatusSnapshot>) -> &'static str {
    if status.is_some_and(|s| s.evermem_enabled) {
        "Connected"
    } else {
        "Disabled"
    }
}

pub fn endpoint_label(status: Option<&StatusSnapshot>) -> &str {
    status
        .and_then(|s| s.evermem_endpoint.as_deref())
        .unwrap_or("Not configured")
}

pub fn group_label(status: Option<&StatusSnapshot>) -> &str {
    status
        .and_then(|s| s.evermem_group_id.as_deref())
        .unwrap_or("Default")
}

pub fn personality_label(status: Option<&StatusSnapshot>) -> &str {
    status
        .map(|s| s.personality_summary.as_str())
        .unwrap_or("Loading personality...")
}

pub fn search_button_label(state: &MemoryQueryState) -> &'static str {
    if state.is_loading() {
        "Searching..."
    } else {
        "Search"
    }
}

/// Title, body and optional timestamp for one result card; `index` is 0-based.
pub fn memory_card(index: usize, result: &MemoryResult) -> (String, String, Option<String>) {
    let title = result
        .title
        .clone()
        .unwrap_or_else(|| format!("Memory {}", index + 1));
    let content = result
        .content
        .clone()
        .unwrap_or_else(|| "No content returned.".to_string());
    let stamp = result.create_time.as_ref().map(|t| t.to_string());
    (title, content, stamp)
}
