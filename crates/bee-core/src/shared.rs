//! Shared types used across the Hive Manager crates.
//!
//! `StatusSnapshot` is the server's view of the agent. `Drafts` is the operator's
//! local, editable view of the two settings the panel can write back (risk and
//! the three directive goals). The two are only ever joined on first load.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of directive goals the agent tracks.
pub const GOAL_COUNT: usize = 3;

// -----------------------------------------------------------------------------
// Timestamps
// -----------------------------------------------------------------------------

/// Timestamp as reported by the backend or the memory service.
///
/// Accepts RFC 3339, naive ISO-8601 (read as UTC, which is what the agent emits
/// for `last_tick`) and integer epoch milliseconds. Anything else is kept raw so
/// it can still be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
    raw: String,
    parsed: Option<DateTime<Utc>>,
}

impl Timestamp {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let parsed = DateTime::parse_from_rfc3339(trimmed)
            .map(|d| d.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
                    .iter()
                    .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
                    .map(|naive| Utc.from_utc_datetime(&naive))
            });
        Self {
            raw: raw.to_string(),
            parsed,
        }
    }

    pub fn from_millis(millis: i64) -> Self {
        Self {
            raw: millis.to_string(),
            parsed: Utc.timestamp_millis_opt(millis).single(),
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        self.parsed
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.parsed {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S UTC")),
            None => f.write_str(&self.raw),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Text(String),
    Millis(i64),
    Float(f64),
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawTimestamp::deserialize(deserializer)? {
            RawTimestamp::Text(s) => Timestamp::parse(&s),
            RawTimestamp::Millis(ms) => Timestamp::from_millis(ms),
            RawTimestamp::Float(ms) => Timestamp::from_millis(ms as i64),
        })
    }
}

impl Serialize for Timestamp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

// -----------------------------------------------------------------------------
// Server state
// -----------------------------------------------------------------------------

/// Directive goals plus the pre/post tick notes written by the heartbeat.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalSet {
    /// Usually three entries; the server does not enforce the length on read.
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub before_tick: Option<String>,
    #[serde(default)]
    pub tick_state: Option<String>,
    #[serde(default)]
    pub after_tick: Option<String>,
}

/// Body of `GET /api/status`. Immutable once received; the store swaps it whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub heartbeat_running: bool,
    pub heartbeat_interval_sec: u64,
    /// Nominally 1..=10. Kept as reported; `RiskDraft` does the clamping.
    pub risk_tolerance: i64,
    pub memory_goals: GoalSet,
    pub personality_summary: String,
    pub evermem_enabled: bool,
    #[serde(default)]
    pub evermem_endpoint: Option<String>,
    #[serde(default)]
    pub evermem_group_id: Option<String>,
    #[serde(default)]
    pub last_tick: Option<Timestamp>,
}

/// Heartbeat command; the path is chosen from the state the operator was looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatAction {
    Start,
    Stop,
}

impl HeartbeatAction {
    /// `Stop` if the heartbeat is running, `Start` otherwise.
    pub fn toggle_from(running: bool) -> Self {
        if running {
            HeartbeatAction::Stop
        } else {
            HeartbeatAction::Start
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HeartbeatAction::Start => "start",
            HeartbeatAction::Stop => "stop",
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            HeartbeatAction::Start => "/api/heartbeat/start",
            HeartbeatAction::Stop => "/api/heartbeat/stop",
        }
    }
}

impl fmt::Display for HeartbeatAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// -----------------------------------------------------------------------------
// Local drafts
// -----------------------------------------------------------------------------

/// Editable risk tolerance, always within `MIN..=MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RiskDraft(u8);

impl RiskDraft {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;
    pub const DEFAULT: u8 = 5;

    /// Clamps into `MIN..=MAX`.
    pub fn new(value: i64) -> Self {
        Self(value.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn set(&mut self, value: i64) {
        *self = Self::new(value);
    }
}

impl Default for RiskDraft {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

/// The three editable directive goals. Length is fixed by the type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalDrafts([String; GOAL_COUNT]);

impl GoalDrafts {
    pub fn new(goals: [String; GOAL_COUNT]) -> Self {
        Self(goals)
    }

    /// Adopts the server's goals when it reports exactly `GOAL_COUNT` of them.
    /// Any other length leaves the drafts as they are. Returns whether they were adopted.
    pub fn adopt(&mut self, goals: &GoalSet) -> bool {
        match <&[String; GOAL_COUNT]>::try_from(goals.goals.as_slice()) {
            Ok(exact) => {
                self.0 = exact.clone();
                true
            }
            Err(_) => false,
        }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn slot_mut(&mut self, index: usize) -> Option<&mut String> {
        self.0.get_mut(index)
    }

    /// Replaces one goal; out-of-range indices are ignored.
    pub fn set(&mut self, index: usize, value: impl Into<String>) {
        if let Some(slot) = self.0.get_mut(index) {
            *slot = value.into();
        }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<[String; GOAL_COUNT]> for GoalDrafts {
    fn from(goals: [String; GOAL_COUNT]) -> Self {
        Self(goals)
    }
}

/// Operator drafts seeded from the first snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Drafts {
    pub risk: RiskDraft,
    pub goals: GoalDrafts,
}

impl Drafts {
    /// Risk is always taken (clamped); goals only when the server reports exactly three.
    pub fn seed_from(&mut self, snapshot: &StatusSnapshot) {
        self.risk = RiskDraft::new(snapshot.risk_tolerance);
        self.goals.adopt(&snapshot.memory_goals);
    }
}

// -----------------------------------------------------------------------------
// Request bodies
// -----------------------------------------------------------------------------

/// Body of `POST /api/memory/goals`.
#[derive(Debug, Clone, Serialize)]
pub struct GoalsUpdate<'a> {
    pub goals: &'a [String],
}

/// Body of `POST /api/config`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RiskUpdate {
    pub risk_tolerance: RiskDraft,
}

/// Body of `POST /api/evermem/search`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemorySearchRequest {
    pub search_query: String,
    pub result_limit: u32,
}
