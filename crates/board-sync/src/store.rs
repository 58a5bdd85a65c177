//! Optimistic request store
//!
//! Commands change the in-memory state synchronously and return; the
//! matching backend call runs as a detached Tokio task. Failures never roll
//! back local changes; they land in the shared error slot and the journal.
//!
//! Fallback slot writes (`stage`) run one at a time in command order. Each
//! task waits for its predecessor's stage to finish before staging, then
//! pushes without waiting for anyone.
//!
//! Commands that dispatch backend calls must run inside a Tokio runtime.

use crate::error::StoreError;
use crate::journal::{OperationId, OperationJournal, OperationKind};
use crate::state::{Action, BoardState};
use board_core::{
    now, BoardConfig, LoadPolicy, NewRequest, Request, RequestId, RequestStatus, StatusUpdate,
    ValidationError,
};
use board_persistence::{BackendMode, Change, OptimizeError, SharedBackend};
use futures::future::join_all;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

#[derive(Debug)]
struct Inner {
    backend: SharedBackend,
    state: watch::Sender<BoardState>,
    in_flight: Mutex<Vec<JoinHandle<()>>>,
    // Completion signal of the most recently dispatched stage
    last_stage: Mutex<Option<oneshot::Receiver<()>>>,
    journal: OperationJournal,
    load_policy: LoadPolicy,
}

impl Inner {
    fn apply(&self, action: Action) -> bool {
        self.state.send_if_modified(|state| state.reduce(action))
    }

    /// Take the next place in the stage order
    fn stage_turn(&self) -> StageTurn {
        let (done, next) = oneshot::channel();
        let previous = self.last_stage.lock().replace(next);
        StageTurn { previous, done }
    }
}

/// Place in the stage order; dropping it releases the next task
struct StageTurn {
    previous: Option<oneshot::Receiver<()>>,
    done: oneshot::Sender<()>,
}

impl StageTurn {
    async fn wait(&mut self) {
        if let Some(previous) = self.previous.take() {
            // A dropped sender also means the predecessor is done.
            let _ = previous.await;
        }
    }

    fn release(self) {
        let _ = self.done.send(());
    }
}

/// Request store synchronized with a persistence backend
#[derive(Debug, Clone)]
pub struct RequestStore {
    inner: Arc<Inner>,
}

impl RequestStore {
    /// Create new store with the default load policy
    #[must_use]
    pub fn new(backend: SharedBackend) -> Self {
        Self::with_policy(backend, LoadPolicy::default())
    }

    /// Create new store with an explicit load policy
    #[must_use]
    pub fn with_policy(backend: SharedBackend, load_policy: LoadPolicy) -> Self {
        let (state, _) = watch::channel(BoardState::default());
        Self {
            inner: Arc::new(Inner {
                backend,
                state,
                in_flight: Mutex::new(Vec::new()),
                last_stage: Mutex::new(None),
                journal: OperationJournal::new(),
                load_policy,
            }),
        }
    }

    /// Build the store and backend described by `config`
    pub fn connect(config: &BoardConfig) -> Result<Self, StoreError> {
        config.validate()?;
        let backend = board_persistence::connect(config)?;
        Ok(Self::with_policy(backend, config.load_policy))
    }

    /// Backend kind
    #[inline]
    #[must_use]
    pub fn mode(&self) -> BackendMode {
        self.inner.backend.mode()
    }

    /// Load policy in effect
    #[inline]
    #[must_use]
    pub fn load_policy(&self) -> LoadPolicy {
        self.inner.load_policy
    }

    /// Current state
    #[must_use]
    pub fn snapshot(&self) -> BoardState {
        self.inner.state.borrow().clone()
    }

    /// Current collection
    #[must_use]
    pub fn requests(&self) -> Vec<Request> {
        self.inner.state.borrow().requests.clone()
    }

    /// Shared error, if any
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.inner.state.borrow().error.clone()
    }

    /// Receiver notified after every state change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<BoardState> {
        self.inner.state.subscribe()
    }

    /// Operation journal
    #[inline]
    #[must_use]
    pub fn operations(&self) -> &OperationJournal {
        &self.inner.journal
    }

    /// Dismiss the shared error
    pub fn clear_error(&self) {
        self.inner.apply(Action::ClearError);
    }

    /// Replace the collection with the backend's
    ///
    /// With `LoadPolicy::DrainPending` every call dispatched so far finishes
    /// first. A failed fetch leaves the collection unchanged and sets the
    /// shared error; a degraded snapshot replaces the collection and sets it
    /// too.
    pub async fn load(&self) {
        if self.inner.load_policy == LoadPolicy::DrainPending {
            self.settle().await;
        }

        self.inner.apply(Action::LoadStarted);
        let op = self.inner.journal.begin(OperationKind::Load, None);

        match self.inner.backend.get_all().await {
            Ok(snapshot) => {
                match &snapshot.warning {
                    Some(warning) => {
                        tracing::warn!("Loaded {} requests from fallback", snapshot.requests.len());
                        self.inner.journal.fail(op, warning.as_str());
                    }
                    None => {
                        tracing::info!("Loaded {} requests", snapshot.requests.len());
                        self.inner.journal.succeed(op);
                    }
                }
                self.inner.apply(Action::Loaded {
                    requests: snapshot.requests,
                    warning: snapshot.warning,
                });
            }
            Err(e) => {
                let message = e.to_string();
                tracing::error!("Load failed: {}", message);
                self.inner.journal.fail(op, message.as_str());
                self.inner.apply(Action::LoadFailed(message));
            }
        }
    }

    /// Add a pending request at the front
    ///
    /// Blank fields reject the command without touching state.
    pub fn create(
        &self,
        requester: impl AsRef<str>,
        description: impl AsRef<str>,
    ) -> Result<Request, ValidationError> {
        let request = Request::create(NewRequest::new(requester, description)?, now());
        self.inner.apply(Action::Add(request.clone()));

        let op = self
            .inner
            .journal
            .begin(OperationKind::Create, Some(request.id.clone()));
        self.dispatch(op, Change::Create(request.clone()));

        Ok(request)
    }

    /// Move a request to `status`; returns false for unknown ids
    pub fn change_status(&self, id: &RequestId, status: RequestStatus) -> bool {
        let update = StatusUpdate::stamped(id.clone(), status, now());
        if !self.inner.apply(Action::UpdateStatus(update.clone())) {
            tracing::debug!("Ignoring status change for unknown request {}", id);
            return false;
        }

        let op = self
            .inner
            .journal
            .begin(OperationKind::UpdateStatus, Some(id.clone()));
        self.dispatch(op, Change::Update(update));
        true
    }

    /// Remove a request; the backend delete is issued even for absent ids
    pub fn remove(&self, id: &RequestId) {
        self.inner.apply(Action::Remove(id.clone()));

        let op = self
            .inner
            .journal
            .begin(OperationKind::Delete, Some(id.clone()));
        self.dispatch(op, Change::Delete(id.clone()));
    }

    /// Remove several requests in one step
    ///
    /// Stages run in id order as one step; remote deletes run concurrently.
    /// Any failure sets one generic error; per-id outcomes are in the journal.
    pub fn remove_batch(&self, ids: &[RequestId]) {
        let mut seen = HashSet::new();
        let ids: Vec<RequestId> = ids
            .iter()
            .filter(|id| seen.insert(*id))
            .cloned()
            .collect();
        if ids.is_empty() {
            return;
        }

        self.inner.apply(Action::RemoveBatch(ids.clone()));

        let ops: Vec<(OperationId, RequestId)> = ids
            .into_iter()
            .map(|id| {
                let op = self
                    .inner
                    .journal
                    .begin(OperationKind::BatchDelete, Some(id.clone()));
                (op, id)
            })
            .collect();

        let inner = Arc::clone(&self.inner);
        let mut turn = inner.stage_turn();
        self.track(tokio::spawn(async move {
            let total = ops.len();
            let changes: Vec<Change> = ops
                .iter()
                .map(|(_, id)| Change::Delete(id.clone()))
                .collect();

            turn.wait().await;
            let mut staged = Vec::with_capacity(total);
            for change in &changes {
                staged.push(inner.backend.stage(change).await);
            }
            turn.release();

            let results = join_all(changes.iter().zip(staged).map(|(change, staged)| {
                let backend = &inner.backend;
                async move {
                    match staged {
                        Ok(()) => backend.push(change).await,
                        Err(e) => Err(e),
                    }
                }
            }))
            .await;

            let mut failed = 0;
            for ((op, id), result) in ops.iter().zip(results) {
                match result {
                    Ok(()) => inner.journal.succeed(*op),
                    Err(e) => {
                        tracing::error!("Batch delete of {} failed: {}", id, e);
                        inner.journal.fail(*op, e.to_string());
                        failed += 1;
                    }
                }
            }

            if failed > 0 {
                inner.apply(Action::SetError(format!(
                    "failed to delete {failed} of {total} requests"
                )));
            }
        }));
    }

    /// Rewrite a description through the backend
    ///
    /// Never touches the shared error.
    pub async fn optimize(&self, description: &str) -> Result<String, OptimizeError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(OptimizeError::EmptyDescription);
        }
        self.inner.backend.optimize(description).await
    }

    /// Wait for every dispatched backend call, including ones dispatched
    /// while waiting
    pub async fn settle(&self) {
        loop {
            let handles = std::mem::take(&mut *self.inner.in_flight.lock());
            if handles.is_empty() {
                break;
            }
            for result in join_all(handles).await {
                if let Err(e) = result {
                    tracing::warn!("Sync task ended abnormally: {}", e);
                }
            }
        }
    }

    /// Number of dispatched calls not yet finished
    #[must_use]
    pub fn pending_syncs(&self) -> usize {
        self.inner
            .in_flight
            .lock()
            .iter()
            .filter(|h| !h.is_finished())
            .count()
    }

    fn dispatch(&self, op: OperationId, change: Change) {
        let inner = Arc::clone(&self.inner);
        let mut turn = inner.stage_turn();
        self.track(tokio::spawn(async move {
            turn.wait().await;
            let staged = inner.backend.stage(&change).await;
            turn.release();

            let result = match staged {
                Ok(()) => inner.backend.push(&change).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(()) => {
                    tracing::debug!("Operation {} synced", op);
                    inner.journal.succeed(op);
                }
                Err(e) => {
                    let message = e.to_string();
                    tracing::error!("Operation {} failed: {}", op, message);
                    inner.journal.fail(op, message.as_str());
                    inner.apply(Action::SetError(message));
                }
            }
        }));
    }

    fn track(&self, handle: JoinHandle<()>) {
        let mut in_flight = self.inner.in_flight.lock();
        in_flight.retain(|h| !h.is_finished());
        in_flight.push(handle);
    }
}
