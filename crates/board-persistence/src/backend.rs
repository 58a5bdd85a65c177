//! Persistence backend abstraction
//!
//! A backend is selected once from configuration:
//! - `LocalBackend` when no remote endpoint is set
//! - `MirroredBackend` otherwise, which writes the fallback slot first and
//!   then the remote endpoint

use crate::error::{GatewayError, OptimizeError, SyncError};
use crate::local::{LocalBackend, LocalStore};
use crate::mirrored::MirroredBackend;
use crate::remote::RemoteGateway;
use async_trait::async_trait;
use board_core::{BoardConfig, Request, RequestId, StatusUpdate};
use std::fmt;
use std::sync::Arc;

/// Which kind of backend is in use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    /// Fallback slot only
    LocalOnly,
    /// Remote endpoint mirrored into the fallback slot
    RemoteWithFallback,
}

/// Where a snapshot came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    /// Remote endpoint answered
    Remote,
    /// Local-only mode
    Local,
    /// Remote endpoint failed, fallback slot was read instead
    Fallback,
}

/// Result of a `get_all` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Full collection, most recent first
    pub requests: Vec<Request>,
    /// Origin of `requests`
    pub source: SnapshotSource,
    /// Set when the snapshot is a degraded substitute
    pub warning: Option<String>,
}

impl Snapshot {
    /// Create snapshot without warning
    #[inline]
    #[must_use]
    pub fn new(requests: Vec<Request>, source: SnapshotSource) -> Self {
        Self {
            requests,
            source,
            warning: None,
        }
    }

    /// Create fallback snapshot carrying the remote failure
    #[inline]
    #[must_use]
    pub fn degraded(requests: Vec<Request>, warning: impl Into<String>) -> Self {
        Self {
            requests,
            source: SnapshotSource::Fallback,
            warning: Some(warning.into()),
        }
    }

    /// Check if the snapshot came from the fallback after a failure
    #[inline]
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.warning.is_some()
    }
}

/// One write against the collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// Store a new request
    Create(Request),
    /// Apply status fields
    Update(StatusUpdate),
    /// Delete by id
    Delete(RequestId),
}

impl Change {
    /// Request the change targets
    #[inline]
    #[must_use]
    pub fn target(&self) -> &RequestId {
        match self {
            Change::Create(request) => &request.id,
            Change::Update(update) => &update.id,
            Change::Delete(id) => id,
        }
    }
}

/// Persistence backend
///
/// A write runs in two steps. `stage` records the change in the fallback
/// slot and must be called in command order; `push` sends it to the
/// primary store and may run concurrently with other pushes.
#[async_trait]
pub trait PersistenceBackend: fmt::Debug + Send + Sync {
    /// Backend kind
    fn mode(&self) -> BackendMode;

    /// Fetch the full collection
    async fn get_all(&self) -> Result<Snapshot, SyncError>;

    /// Record `change` in the fallback slot
    async fn stage(&self, _change: &Change) -> Result<(), SyncError> {
        Ok(())
    }

    /// Send a staged `change` to the primary store
    async fn push(&self, change: &Change) -> Result<(), SyncError>;

    /// Stage then push a change
    async fn apply(&self, change: &Change) -> Result<(), SyncError> {
        self.stage(change).await?;
        self.push(change).await
    }

    /// Store a new request
    async fn create(&self, request: &Request) -> Result<(), SyncError> {
        self.apply(&Change::Create(request.clone())).await
    }

    /// Apply a status change
    async fn update(&self, update: &StatusUpdate) -> Result<(), SyncError> {
        self.apply(&Change::Update(update.clone())).await
    }

    /// Delete by id; absent ids succeed
    async fn delete(&self, id: &RequestId) -> Result<(), SyncError> {
        self.apply(&Change::Delete(id.clone())).await
    }

    /// Rewrite a description
    async fn optimize(&self, description: &str) -> Result<String, OptimizeError>;
}

/// Shared backend handle
pub type SharedBackend = Arc<dyn PersistenceBackend>;

/// Build the backend `config` selects
pub fn connect(config: &BoardConfig) -> Result<SharedBackend, GatewayError> {
    let local = LocalStore::new(&config.fallback_path);

    match config.remote_endpoint() {
        None => {
            tracing::info!(
                "No remote endpoint configured, using local store at {}",
                local.path().display()
            );
            Ok(Arc::new(LocalBackend::new(local)))
        }
        Some(endpoint) => {
            let remote = RemoteGateway::new(endpoint, config.request_timeout())?;
            tracing::info!("Using remote endpoint: {}", remote.endpoint());
            Ok(Arc::new(
                MirroredBackend::new(remote, local)
                    .with_refresh_on_load(config.refresh_fallback_on_load),
            ))
        }
    }
}
