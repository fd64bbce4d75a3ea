//! StatusStore: the single owner of the server-reported snapshot.
//!
//! The snapshot is replaced whole on every successful refresh and left alone on
//! failure, so consumers always see either the last good status or nothing.
//! Operator drafts are seeded from the first snapshot only; later refreshes never
//! touch them.

use std::sync::Arc;

use crate::backend::AgentBackend;
use crate::error::BackendResult;
use crate::sequence::RequestSequence;
use crate::shared::{Drafts, StatusSnapshot};

/// What `apply_refresh` did with a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshApplied {
    /// Snapshot replaced. `seeded` is true when this was the first load and drafts were seeded.
    Replaced { seeded: bool },
    /// Request failed; previous snapshot kept.
    Failed,
    /// A newer refresh was issued after this one; result dropped.
    Superseded,
}

/// A status read that has been issued but not yet run.
///
/// Owns its backend handle so it can be awaited without borrowing the store.
pub struct RefreshTicket {
    seq: u64,
    backend: Arc<dyn AgentBackend>,
}

impl RefreshTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub async fn run(self) -> RefreshCompletion {
        RefreshCompletion {
            seq: self.seq,
            result: self.backend.fetch_status().await,
        }
    }
}

/// Outcome of a `RefreshTicket`, to be handed back to `StatusStore::apply_refresh`.
#[derive(Debug)]
pub struct RefreshCompletion {
    pub seq: u64,
    pub result: BackendResult<StatusSnapshot>,
}

pub struct StatusStore {
    backend: Arc<dyn AgentBackend>,
    snapshot: Option<Arc<StatusSnapshot>>,
    drafts: Drafts,
    seeded: bool,
    sequence: RequestSequence,
}

impl StatusStore {
    pub fn new(backend: Arc<dyn AgentBackend>) -> Self {
        Self {
            backend,
            snapshot: None,
            drafts: Drafts::default(),
            seeded: false,
            sequence: RequestSequence::new(),
        }
    }

    /// Latest snapshot, or `None` before the first successful load.
    pub fn current(&self) -> Option<Arc<StatusSnapshot>> {
        self.snapshot.clone()
    }

    pub fn drafts(&self) -> &Drafts {
        &self.drafts
    }

    /// Operator edits go through here. Refreshes never write drafts after the first load.
    pub fn drafts_mut(&mut self) -> &mut Drafts {
        &mut self.drafts
    }

    /// True once drafts have been seeded from a snapshot.
    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// Reads status once and applies it.
    pub async fn refresh(&mut self) -> RefreshApplied {
        let completion = self.begin_refresh().run().await;
        self.apply_refresh(completion)
    }

    /// Issues a sequenced status read. Any ticket issued earlier becomes stale.
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        RefreshTicket {
            seq: self.sequence.issue(),
            backend: Arc::clone(&self.backend),
        }
    }

    pub fn apply_refresh(&mut self, completion: RefreshCompletion) -> RefreshApplied {
        if !self.sequence.is_latest(completion.seq) {
            tracing::debug!(
                seq = completion.seq,
                latest = self.sequence.latest(),
                "discarding superseded status refresh"
            );
            return RefreshApplied::Superseded;
        }
        match completion.result {
            Ok(snapshot) => {
                let seeded = !self.seeded;
                if seeded {
                    self.drafts.seed_from(&snapshot);
                    self.seeded = true;
                }
                self.snapshot = Some(Arc::new(snapshot));
                RefreshApplied::Replaced { seeded }
            }
            Err(e) => {
                tracing::warn!(error = %e, "status refresh failed; keeping last snapshot");
                RefreshApplied::Failed
            }
        }
    }
}
