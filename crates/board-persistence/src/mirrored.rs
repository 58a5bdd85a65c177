//! Remote endpoint with a local mirror
//!
//! Every write goes to the fallback slot first and then to the remote
//! endpoint. A failed mirror write is logged and does not change the
//! outcome; the remote result decides success.

use crate::backend::{BackendMode, Change, PersistenceBackend, Snapshot, SnapshotSource};
use crate::error::{OptimizeError, SyncError};
use crate::local::LocalStore;
use crate::remote::RemoteGateway;
use async_trait::async_trait;

/// Remote backend mirrored into the fallback slot
#[derive(Debug)]
pub struct MirroredBackend {
    remote: RemoteGateway,
    local: LocalStore,
    refresh_on_load: bool,
}

impl MirroredBackend {
    /// Create new mirrored backend
    #[must_use]
    pub fn new(remote: RemoteGateway, local: LocalStore) -> Self {
        Self {
            remote,
            local,
            refresh_on_load: true,
        }
    }

    /// Rewrite the slot with each successful remote snapshot
    #[inline]
    #[must_use]
    pub fn with_refresh_on_load(mut self, refresh: bool) -> Self {
        self.refresh_on_load = refresh;
        self
    }

    /// Remote gateway
    #[inline]
    #[must_use]
    pub fn remote(&self) -> &RemoteGateway {
        &self.remote
    }

    /// Fallback slot
    #[inline]
    #[must_use]
    pub fn local(&self) -> &LocalStore {
        &self.local
    }
}

#[async_trait]
impl PersistenceBackend for MirroredBackend {
    fn mode(&self) -> BackendMode {
        BackendMode::RemoteWithFallback
    }

    async fn get_all(&self) -> Result<Snapshot, SyncError> {
        match self.remote.get_all().await {
            Ok(requests) => {
                if self.refresh_on_load {
                    if let Err(e) = self.local.write_all(&requests).await {
                        tracing::warn!("Fallback refresh after load failed: {}", e);
                    }
                }
                Ok(Snapshot::new(requests, SnapshotSource::Remote))
            }
            Err(e) => {
                let warning = SyncError::from(e).to_string();
                tracing::warn!("Remote load failed, reading fallback: {}", warning);
                let requests = self.local.read_all().await?;
                Ok(Snapshot::degraded(requests, warning))
            }
        }
    }

    async fn stage(&self, change: &Change) -> Result<(), SyncError> {
        if let Err(e) = self.local.apply(change).await {
            tracing::warn!("Fallback mirror for {} failed: {}", change.target(), e);
        }
        Ok(())
    }

    async fn push(&self, change: &Change) -> Result<(), SyncError> {
        match change {
            Change::Create(request) => self.remote.create(request).await?,
            Change::Update(update) => self.remote.update(update).await?,
            Change::Delete(id) => self.remote.delete(id).await?,
        }
        Ok(())
    }

    async fn optimize(&self, description: &str) -> Result<String, OptimizeError> {
        if description.trim().is_empty() {
            return Err(OptimizeError::EmptyDescription);
        }
        self.remote.optimize(description).await
    }
}
