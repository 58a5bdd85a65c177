//! Mirrored backend: fallback slot written first, remote result decides.

use board_core::{now, NewRequest, Request, RequestStatus, StatusUpdate};
use board_persistence::{
    BackendMode, Change, LocalStore, MirroredBackend, OptimizeError, PersistenceBackend, RemoteGateway,
    SnapshotSource, SyncError,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sample(description: &str) -> Request {
    Request::create(NewRequest::new("Alice", description).unwrap(), now())
}

fn backend(server: &MockServer, dir: &TempDir) -> MirroredBackend {
    let remote = RemoteGateway::new(&server.uri(), None).unwrap();
    MirroredBackend::new(remote, LocalStore::new(dir.path().join("slot.json")))
}

async fn accept_all(server: &MockServer) {
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(server)
        .await;
}

async fn fail_all(server: &MockServer) {
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(server)
        .await;
}

#[tokio::test]
async fn create_writes_slot_and_remote() {
    let server = MockServer::start().await;
    accept_all(&server).await;
    let dir = TempDir::new().unwrap();
    let backend = backend(&server, &dir);

    let request = sample("Fix login bug");
    backend.create(&request).await.unwrap();

    assert_eq!(backend.mode(), BackendMode::RemoteWithFallback);
    assert_eq!(backend.local().read_all().await.unwrap(), vec![request]);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn stage_touches_only_the_slot() {
    let server = MockServer::start().await;
    accept_all(&server).await;
    let dir = TempDir::new().unwrap();
    let backend = backend(&server, &dir);

    let request = sample("Book room");
    backend.stage(&Change::Create(request.clone())).await.unwrap();

    assert_eq!(backend.local().read_all().await.unwrap(), vec![request.clone()]);
    assert!(server.received_requests().await.unwrap().is_empty());

    backend.push(&Change::Delete(request.id)).await.unwrap();
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
    assert_eq!(backend.local().read_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn slot_is_written_even_when_remote_fails() {
    let server = MockServer::start().await;
    fail_all(&server).await;
    let dir = TempDir::new().unwrap();
    let backend = backend(&server, &dir);

    let request = sample("Order monitors");
    let err = backend.create(&request).await.unwrap_err();
    assert!(err.is_remote());
    assert_eq!(backend.local().read_all().await.unwrap(), vec![request.clone()]);

    let update = StatusUpdate::stamped(request.id.clone(), RequestStatus::InProgress, now());
    assert!(backend.update(&update).await.is_err());
    let stored = backend.local().read_all().await.unwrap();
    assert_eq!(stored[0].status, RequestStatus::InProgress);

    assert!(backend.delete(&request.id).await.is_err());
    assert!(backend.local().read_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn load_falls_back_with_warning() {
    let server = MockServer::start().await;
    fail_all(&server).await;
    let dir = TempDir::new().unwrap();
    let backend = backend(&server, &dir);

    let cached = vec![sample("cached")];
    backend.local().write_all(&cached).await.unwrap();

    let snapshot = backend.get_all().await.unwrap();

    assert_eq!(snapshot.source, SnapshotSource::Fallback);
    assert_eq!(snapshot.requests, cached);
    assert!(snapshot
        .warning
        .as_deref()
        .is_some_and(|w| w.contains("HTTP 503")));
}

#[tokio::test]
async fn load_refreshes_slot_from_remote() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("action", "getAll"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "requests": [{
                "id": "r-1",
                "requester": "Bob",
                "description": "Renew licence",
                "status": "in-progress",
                "createdAt": "2024-05-01T09:00:00.000Z",
                "completedAt": ""
            }]
        })))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let backend = backend(&server, &dir);
    backend.local().write_all(&[sample("stale")]).await.unwrap();

    let snapshot = backend.get_all().await.unwrap();

    assert_eq!(snapshot.source, SnapshotSource::Remote);
    assert!(!snapshot.is_degraded());
    assert_eq!(backend.local().read_all().await.unwrap(), snapshot.requests);
}

#[tokio::test]
async fn load_without_refresh_leaves_slot_alone() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"requests": []})))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let backend = backend(&server, &dir).with_refresh_on_load(false);
    let stale = vec![sample("stale")];
    backend.local().write_all(&stale).await.unwrap();

    assert!(backend.get_all().await.unwrap().requests.is_empty());
    assert_eq!(backend.local().read_all().await.unwrap(), stale);
}

#[tokio::test]
async fn corrupt_slot_after_remote_failure_is_local_error() {
    let server = MockServer::start().await;
    fail_all(&server).await;
    let dir = TempDir::new().unwrap();
    let backend = backend(&server, &dir);
    std::fs::write(backend.local().path(), "[{").unwrap();

    assert!(matches!(
        backend.get_all().await,
        Err(SyncError::Local(_))
    ));
}

#[tokio::test]
async fn optimize_rejects_blank_description() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let err = backend(&server, &dir).optimize("   ").await.unwrap_err();

    assert!(matches!(err, OptimizeError::EmptyDescription));
    assert!(server.received_requests().await.unwrap().is_empty());
}
