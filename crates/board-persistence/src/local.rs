//! File-backed fallback slot
//!
//! The slot holds the whole collection as one JSON array. Writes are
//! serialized through an async mutex and land via temp file + rename, so a
//! reader never sees a half-written slot.

use crate::backend::{BackendMode, Change, PersistenceBackend, Snapshot, SnapshotSource};
use crate::error::{LocalStoreError, OptimizeError, SyncError};
use async_trait::async_trait;
use board_core::{Request, RequestId, StatusUpdate};
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Fallback slot on disk
#[derive(Debug)]
pub struct LocalStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl LocalStore {
    /// Create new store at `path`; the file is created on first write
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Slot path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the collection; a missing or blank slot is empty
    pub async fn read_all(&self) -> Result<Vec<Request>, LocalStoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| {
                LocalStoreError::Corrupt {
                    path: self.path.clone(),
                    source,
                }
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(LocalStoreError::io_error(&self.path, e)),
        }
    }

    /// Replace the collection
    pub async fn write_all(&self, requests: &[Request]) -> Result<(), LocalStoreError> {
        let _guard = self.write_lock.lock().await;
        self.persist(requests).await
    }

    /// Insert at the front unless the id is already stored
    pub async fn prepend(&self, request: &Request) -> Result<(), LocalStoreError> {
        self.mutate(|all| {
            if all.iter().any(|r| r.id == request.id) {
                return false;
            }
            all.insert(0, request.clone());
            true
        })
        .await
    }

    /// Apply status fields to the matching request
    pub async fn apply_update(&self, update: &StatusUpdate) -> Result<(), LocalStoreError> {
        self.mutate(|all| match all.iter_mut().find(|r| r.id == update.id) {
            Some(request) => {
                request.apply(update);
                true
            }
            None => false,
        })
        .await
    }

    /// Drop the matching request
    pub async fn remove(&self, id: &RequestId) -> Result<(), LocalStoreError> {
        self.mutate(|all| {
            let before = all.len();
            all.retain(|r| &r.id != id);
            all.len() != before
        })
        .await
    }

    /// Apply one change
    pub async fn apply(&self, change: &Change) -> Result<(), LocalStoreError> {
        match change {
            Change::Create(request) => self.prepend(request).await,
            Change::Update(update) => self.apply_update(update).await,
            Change::Delete(id) => self.remove(id).await,
        }
    }

    /// Read-modify-write under the write lock; `edit` reports whether anything changed
    async fn mutate<F>(&self, edit: F) -> Result<(), LocalStoreError>
    where
        F: FnOnce(&mut Vec<Request>) -> bool + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut all = self.read_all().await?;
        if edit(&mut all) {
            self.persist(&all).await?;
        }
        Ok(())
    }

    async fn persist(&self, requests: &[Request]) -> Result<(), LocalStoreError> {
        let bytes = serde_json::to_vec_pretty(requests).map_err(|source| {
            LocalStoreError::Encode {
                path: self.path.clone(),
                source,
            }
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| LocalStoreError::io_error(parent, e))?;
        }

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| LocalStoreError::io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| LocalStoreError::io_error(&self.path, e))?;

        tracing::trace!(
            "Wrote {} requests to {}",
            requests.len(),
            self.path.display()
        );
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}

/// Backend that only uses the fallback slot
#[derive(Debug)]
pub struct LocalBackend {
    store: LocalStore,
}

impl LocalBackend {
    /// Create new local backend
    #[inline]
    #[must_use]
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    /// Underlying slot
    #[inline]
    #[must_use]
    pub fn store(&self) -> &LocalStore {
        &self.store
    }
}

#[async_trait]
impl PersistenceBackend for LocalBackend {
    fn mode(&self) -> BackendMode {
        BackendMode::LocalOnly
    }

    async fn get_all(&self) -> Result<Snapshot, SyncError> {
        let requests = self.store.read_all().await?;
        Ok(Snapshot::new(requests, SnapshotSource::Local))
    }

    async fn stage(&self, change: &Change) -> Result<(), SyncError> {
        Ok(self.store.apply(change).await?)
    }

    // The slot is the primary store; staging already wrote it.
    async fn push(&self, _change: &Change) -> Result<(), SyncError> {
        Ok(())
    }

    async fn optimize(&self, _description: &str) -> Result<String, OptimizeError> {
        Err(OptimizeError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use board_core::{now, NewRequest, RequestStatus};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn request(description: &str) -> Request {
        Request::create(NewRequest::new("Alice", description).unwrap(), now())
    }

    fn store_in(dir: &TempDir) -> LocalStore {
        LocalStore::new(dir.path().join("colleague-requests.json"))
    }

    #[tokio::test]
    async fn missing_slot_reads_empty() {
        let dir = TempDir::new().unwrap();
        assert!(store_in(&dir).read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_slot_reads_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "  \n").unwrap();
        assert!(store.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_slot_is_reported() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "{not json").unwrap();
        assert!(matches!(
            store.read_all().await,
            Err(LocalStoreError::Corrupt { .. })
        ));
    }

    #[tokio::test]
    async fn prepend_keeps_most_recent_first() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let first = request("first");
        let second = request("second");

        store.prepend(&first).await.unwrap();
        store.prepend(&second).await.unwrap();
        store.prepend(&first).await.unwrap();

        assert_eq!(store.read_all().await.unwrap(), vec![second, first]);
    }

    #[tokio::test]
    async fn update_touches_only_status_fields() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let original = request("Fix login bug");
        store.prepend(&original).await.unwrap();

        let update = StatusUpdate::stamped(original.id.clone(), RequestStatus::Completed, now());
        store.apply_update(&update).await.unwrap();

        let stored = store.read_all().await.unwrap().remove(0);
        assert_eq!(stored.status, RequestStatus::Completed);
        assert_eq!(stored.completed_at, update.completed_at);
        assert_eq!(stored.description, original.description);
        assert_eq!(stored.created_at, original.created_at);
    }

    #[tokio::test]
    async fn update_and_remove_unknown_are_noops() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let kept = request("kept");
        store.prepend(&kept).await.unwrap();

        let ghost = RequestId::from("ghost");
        store
            .apply_update(&StatusUpdate::stamped(ghost.clone(), RequestStatus::InProgress, now()))
            .await
            .unwrap();
        store.remove(&ghost).await.unwrap();

        assert_eq!(store.read_all().await.unwrap(), vec![kept]);
    }

    #[tokio::test]
    async fn write_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.write_all(&[request("a")]).await.unwrap();

        assert!(store.path().exists());
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn write_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path().join("nested").join("slot.json"));
        store.write_all(&[request("a")]).await.unwrap();
        assert_eq!(store.read_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_prepends_are_not_lost() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(store_in(&dir));

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.prepend(&request(&format!("r{i}"))).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.read_all().await.unwrap().len(), 16);
    }

    #[tokio::test]
    async fn apply_dispatches_each_change() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let kept = request("kept");
        let dropped = request("dropped");

        store.apply(&Change::Create(kept.clone())).await.unwrap();
        store.apply(&Change::Create(dropped.clone())).await.unwrap();
        store
            .apply(&Change::Update(StatusUpdate::stamped(
                kept.id.clone(),
                RequestStatus::InProgress,
                now(),
            )))
            .await
            .unwrap();
        store.apply(&Change::Delete(dropped.id)).await.unwrap();

        let stored = store.read_all().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, kept.id);
        assert_eq!(stored[0].status, RequestStatus::InProgress);
    }

    #[tokio::test]
    async fn local_backend_cannot_optimize() {
        let dir = TempDir::new().unwrap();
        let backend = LocalBackend::new(store_in(&dir));
        assert!(backend
            .optimize("make this better")
            .await
            .unwrap_err()
            .is_unavailable());
    }

    #[tokio::test]
    async fn local_backend_snapshot_is_local() {
        let dir = TempDir::new().unwrap();
        let backend = LocalBackend::new(store_in(&dir));
        backend.create(&request("a")).await.unwrap();

        let snapshot = backend.get_all().await.unwrap();
        assert_eq!(snapshot.source, SnapshotSource::Local);
        assert!(!snapshot.is_degraded());
        assert_eq!(snapshot.requests.len(), 1);
    }
}
