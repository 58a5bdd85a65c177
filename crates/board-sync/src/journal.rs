//! Operation journal
//!
//! Records every backend call the store dispatches:
//! - Time-sortable operation ids (ULID)
//! - Kind and target request
//! - Outcome, including the failure message
//!
//! The shared error slot only keeps the latest failure; the journal keeps
//! all of them until pruned. Once the journal reaches its capacity, the
//! oldest settled entries are dropped to make room; pending entries are
//! never dropped.

use board_core::{now, RequestId, Timestamp};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::fmt;
use ulid::{Generator, Ulid};

/// Default number of entries kept before settled ones are dropped
pub const DEFAULT_JOURNAL_CAPACITY: usize = 1024;

/// Journal entry id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationId(Ulid);

impl OperationId {
    /// Underlying ULID
    #[inline]
    #[must_use]
    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// What kind of backend call an entry covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Full collection fetch
    Load,
    /// New request
    Create,
    /// Status change
    UpdateStatus,
    /// Single delete
    Delete,
    /// One id of a batch delete
    BatchDelete,
}

impl OperationKind {
    /// Kebab-case name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Load => "load",
            OperationKind::Create => "create",
            OperationKind::UpdateStatus => "update-status",
            OperationKind::Delete => "delete",
            OperationKind::BatchDelete => "batch-delete",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Still running
    Pending,
    /// Finished successfully
    Succeeded,
    /// Finished with an error
    Failed(String),
}

impl Outcome {
    /// Check if the operation finished
    #[inline]
    #[must_use]
    pub fn is_settled(&self) -> bool {
        !matches!(self, Outcome::Pending)
    }
}

/// Journal entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRecord {
    /// Entry id
    pub id: OperationId,
    /// Call kind
    pub kind: OperationKind,
    /// Target request; `None` for loads
    pub target: Option<RequestId>,
    /// Dispatch time
    pub started_at: Timestamp,
    /// Completion time
    pub finished_at: Option<Timestamp>,
    /// Current outcome
    pub outcome: Outcome,
}

/// Concurrent operation journal
pub struct OperationJournal {
    entries: DashMap<OperationId, OperationRecord>,
    ids: Mutex<Generator>,
    capacity: usize,
}

impl fmt::Debug for OperationJournal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationJournal")
            .field("entries", &self.entries.len())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl Default for OperationJournal {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationJournal {
    /// Create new empty journal
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_JOURNAL_CAPACITY)
    }

    /// Create new empty journal holding about `capacity` entries
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            ids: Mutex::new(Generator::new()),
            capacity: capacity.max(2),
        }
    }

    /// Entry count that triggers trimming
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop the oldest settled entries, keeping the newest half of capacity
    fn trim(&self) {
        if self.entries.len() < self.capacity {
            return;
        }

        let mut settled: Vec<OperationId> = self
            .entries
            .iter()
            .filter(|r| r.outcome.is_settled())
            .map(|r| *r.key())
            .collect();
        settled.sort_unstable();

        let excess = settled.len().saturating_sub(self.capacity / 2);
        for id in &settled[..excess] {
            self.entries.remove(id);
        }
        tracing::trace!("Trimmed {} settled journal entries", excess);
    }

    fn next_id(&self) -> OperationId {
        let ulid = self.ids.lock().generate().unwrap_or_else(|_| Ulid::new());
        OperationId(ulid)
    }

    /// Record a dispatched operation
    pub fn begin(&self, kind: OperationKind, target: Option<RequestId>) -> OperationId {
        self.trim();
        let id = self.next_id();
        self.entries.insert(
            id,
            OperationRecord {
                id,
                kind,
                target,
                started_at: now(),
                finished_at: None,
                outcome: Outcome::Pending,
            },
        );
        id
    }

    /// Mark operation succeeded
    pub fn succeed(&self, id: OperationId) {
        self.settle(id, Outcome::Succeeded);
    }

    /// Mark operation failed
    pub fn fail(&self, id: OperationId, message: impl Into<String>) {
        self.settle(id, Outcome::Failed(message.into()));
    }

    fn settle(&self, id: OperationId, outcome: Outcome) {
        if let Some(mut record) = self.entries.get_mut(&id) {
            record.finished_at = Some(now());
            record.outcome = outcome;
        }
    }

    /// Look up one entry
    #[must_use]
    pub fn get(&self, id: OperationId) -> Option<OperationRecord> {
        self.entries.get(&id).map(|r| r.value().clone())
    }

    /// All entries in dispatch order
    #[must_use]
    pub fn records(&self) -> Vec<OperationRecord> {
        let mut records: Vec<_> = self.entries.iter().map(|r| r.value().clone()).collect();
        records.sort_by_key(|r| r.id);
        records
    }

    /// Failed entries in dispatch order
    #[must_use]
    pub fn failed(&self) -> Vec<OperationRecord> {
        self.records()
            .into_iter()
            .filter(|r| matches!(r.outcome, Outcome::Failed(_)))
            .collect()
    }

    /// Number of entries still running
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|r| !r.outcome.is_settled())
            .count()
    }

    /// Drop settled entries; returns how many were removed
    pub fn prune_settled(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, r| !r.outcome.is_settled());
        before - self.entries.len()
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is recorded
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
