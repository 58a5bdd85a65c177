//! Testing utilities for the request board workspace
//!
//! Shared fixtures and a scriptable in-memory backend.

#![allow(missing_docs)]

use async_trait::async_trait;
use board_core::{now, BoardConfig, NewRequest, Request, RequestId, RequestStatus, StatusUpdate};
use board_persistence::{
    BackendMode, Change, GatewayError, OptimizeError, PersistenceBackend, Snapshot, SnapshotSource,
    SyncError,
};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::watch;

pub fn sample_request(requester: &str, description: &str) -> Request {
    Request::create(NewRequest::new(requester, description).unwrap(), now())
}

pub fn sample_with_status(description: &str, status: RequestStatus) -> Request {
    let mut request = sample_request("Alice", description);
    request.apply(&StatusUpdate::stamped(request.id.clone(), status, now()));
    request
}

/// Config pointing the fallback slot into a fresh temp dir
pub fn local_config() -> (TempDir, BoardConfig) {
    let dir = TempDir::new().unwrap();
    let config = BoardConfig::new().with_fallback_path(dir.path().join("colleague-requests.json"));
    (dir, config)
}

/// Backend call as observed by `ScriptedBackend`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetAll,
    Create(RequestId),
    Update(StatusUpdate),
    Delete(RequestId),
    Optimize(String),
}

/// In-memory backend with failure toggles and a pause gate
#[derive(Debug)]
pub struct ScriptedBackend {
    mode: BackendMode,
    stored: Mutex<Vec<Request>>,
    calls: Mutex<Vec<Call>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    failing_ids: Mutex<HashSet<RequestId>>,
    fallback: Mutex<Option<Vec<Request>>>,
    optimize_reply: Mutex<Result<String, String>>,
    gate: watch::Sender<bool>,
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedBackend {
    pub fn new() -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            mode: BackendMode::RemoteWithFallback,
            stored: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            failing_ids: Mutex::new(HashSet::new()),
            fallback: Mutex::new(None),
            optimize_reply: Mutex::new(Err("optimization failed, please try again later".into())),
            gate,
        }
    }

    /// Behave like local-only mode: optimize is unavailable
    pub fn local_only() -> Self {
        Self {
            mode: BackendMode::LocalOnly,
            ..Self::new()
        }
    }

    pub fn with_requests(self, requests: Vec<Request>) -> Self {
        *self.stored.lock() = requests;
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Fail every write that targets `id`
    pub fn fail_id(&self, id: &RequestId) {
        self.failing_ids.lock().insert(id.clone());
    }

    /// Failed reads answer with a degraded snapshot of `requests`
    pub fn fall_back_to(&self, requests: Vec<Request>) {
        *self.fallback.lock() = Some(requests);
    }

    pub fn reply_to_optimize(&self, reply: Result<&str, &str>) {
        *self.optimize_reply.lock() = reply.map(str::to_string).map_err(str::to_string);
    }

    /// Hold every call at the gate until `resume`
    pub fn pause(&self) {
        self.gate.send_replace(false);
    }

    pub fn resume(&self) {
        self.gate.send_replace(true);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn stored(&self) -> Vec<Request> {
        self.stored.lock().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }

    async fn pass_gate(&self) {
        let mut open = self.gate.subscribe();
        let _ = open.wait_for(|open| *open).await;
    }

    fn check_write(&self, id: &RequestId) -> Result<(), SyncError> {
        if self.fail_writes.load(Ordering::SeqCst) || self.failing_ids.lock().contains(id) {
            return Err(GatewayError::Rejected(format!("scripted failure for {id}")).into());
        }
        Ok(())
    }
}

#[async_trait]
impl PersistenceBackend for ScriptedBackend {
    fn mode(&self) -> BackendMode {
        self.mode
    }

    async fn get_all(&self) -> Result<Snapshot, SyncError> {
        self.record(Call::GetAll);
        self.pass_gate().await;

        if self.fail_reads.load(Ordering::SeqCst) {
            let outage: SyncError = GatewayError::Status {
                status: 503,
                body: "scripted outage".to_string(),
            }
            .into();
            return match self.fallback.lock().clone() {
                Some(requests) => Ok(Snapshot::degraded(requests, outage.to_string())),
                None => Err(outage),
            };
        }

        let source = match self.mode {
            BackendMode::LocalOnly => SnapshotSource::Local,
            BackendMode::RemoteWithFallback => SnapshotSource::Remote,
        };
        Ok(Snapshot::new(self.stored(), source))
    }

    async fn push(&self, change: &Change) -> Result<(), SyncError> {
        self.record(match change {
            Change::Create(request) => Call::Create(request.id.clone()),
            Change::Update(update) => Call::Update(update.clone()),
            Change::Delete(id) => Call::Delete(id.clone()),
        });
        self.pass_gate().await;
        self.check_write(change.target())?;

        let mut stored = self.stored.lock();
        match change {
            Change::Create(request) => stored.insert(0, request.clone()),
            Change::Update(update) => {
                if let Some(request) = stored.iter_mut().find(|r| r.id == update.id) {
                    request.apply(update);
                }
            }
            Change::Delete(id) => stored.retain(|r| &r.id != id),
        }
        Ok(())
    }

    async fn optimize(&self, description: &str) -> Result<String, OptimizeError> {
        self.record(Call::Optimize(description.to_string()));
        if self.mode == BackendMode::LocalOnly {
            return Err(OptimizeError::Unavailable);
        }
        self.pass_gate().await;
        self.optimize_reply.lock().clone().map_err(OptimizeError::Failed)
    }
}
