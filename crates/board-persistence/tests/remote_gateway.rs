//! Remote gateway against a mock spreadsheet endpoint.

use board_core::{now, NewRequest, Request, RequestId, RequestStatus, StatusUpdate};
use board_persistence::{GatewayError, OptimizeError, RemoteGateway, OPTIMIZE_FALLBACK_MESSAGE};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn gateway(server: &MockServer) -> RemoteGateway {
    RemoteGateway::new(&format!("{}/exec", server.uri()), Some(Duration::from_secs(5))).unwrap()
}

fn sample() -> Request {
    Request::create(NewRequest::new("Alice", "Fix login bug").unwrap(), now())
}

async fn sent_params(server: &MockServer) -> HashMap<String, String> {
    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    received[0]
        .url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

#[tokio::test]
async fn get_all_parses_collection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/exec"))
        .and(query_param("action", "getAll"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "requests": [
                {
                    "id": "r-2",
                    "requester": "Bob",
                    "description": "Order monitors",
                    "status": "completed",
                    "createdAt": "2024-05-01T09:00:00.000Z",
                    "completedAt": "2024-05-02T10:00:00.000Z"
                },
                {
                    "id": "r-1",
                    "requester": "Alice",
                    "description": "Fix login bug",
                    "status": "pending",
                    "createdAt": "2024-04-30T08:00:00.000Z",
                    "completedAt": ""
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let requests = gateway(&server).await.get_all().await.unwrap();

    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].id, RequestId::from("r-2"));
    assert!(requests[0].completed_at.is_some());
    assert_eq!(requests[1].status, RequestStatus::Pending);
    assert_eq!(requests[1].completed_at, None);
}

#[tokio::test]
async fn get_all_accepts_hand_edited_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "requests": [{
                "id": "r-5",
                "requester": "Gus",
                "description": "Fix printer",
                "status": "In_Progress",
                "createdAt": "2024-05-01T09:00:00.000Z",
                "completedAt": ""
            }]
        })))
        .mount(&server)
        .await;

    let requests = gateway(&server).await.get_all().await.unwrap();
    assert_eq!(requests[0].status, RequestStatus::InProgress);
}

#[tokio::test]
async fn get_all_without_requests_field_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    assert!(gateway(&server).await.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_sends_every_field() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("action", "add"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let request = sample();
    gateway(&server).await.create(&request).await.unwrap();

    let params = sent_params(&server).await;
    assert_eq!(params["id"], request.id.as_str());
    assert_eq!(params["requester"], "Alice");
    assert_eq!(params["description"], "Fix login bug");
    assert_eq!(params["status"], "pending");
    assert!(!params["createdAt"].is_empty());
    assert_eq!(params["completedAt"], "");
}

#[tokio::test]
async fn update_sends_status_fields_only() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("action", "update"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let update = StatusUpdate::stamped("r-9".into(), RequestStatus::Completed, now());
    gateway(&server).await.update(&update).await.unwrap();

    let params = sent_params(&server).await;
    let mut keys: Vec<&str> = params.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["action", "completedAt", "id", "status"]);
    assert_eq!(params["status"], "completed");
    assert!(!params["completedAt"].is_empty());
}

#[tokio::test]
async fn delete_sends_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("action", "delete"))
        .and(query_param("id", "r-3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    gateway(&server)
        .await
        .delete(&RequestId::from("r-3"))
        .await
        .unwrap();
}

#[tokio::test]
async fn rejection_carries_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": false, "error": "sheet is locked"})),
        )
        .mount(&server)
        .await;

    let err = gateway(&server)
        .await
        .delete(&RequestId::from("r-1"))
        .await
        .unwrap_err();

    assert!(matches!(&err, GatewayError::Rejected(msg) if msg == "sheet is locked"));
}

#[tokio::test]
async fn http_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = gateway(&server).await.get_all().await.unwrap_err();

    assert!(err.is_transport());
    assert!(matches!(err, GatewayError::Status { status: 500, .. }));
}

#[tokio::test]
async fn html_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let err = gateway(&server).await.get_all().await.unwrap_err();
    assert!(matches!(err, GatewayError::Decode(_)));
}

#[tokio::test]
async fn unreachable_endpoint_is_transport_error() {
    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };

    let gateway = RemoteGateway::new(&uri, Some(Duration::from_secs(2))).unwrap();
    let err = gateway.get_all().await.unwrap_err();

    assert!(matches!(err, GatewayError::Transport(_)));
}

#[tokio::test]
async fn optimize_returns_rewritten_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("action", "optimize"))
        .and(query_param("description", "fix the thing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "optimized": "Fix the login timeout on the staff portal"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let text = gateway(&server)
        .await
        .optimize("fix the thing")
        .await
        .unwrap();
    assert_eq!(text, "Fix the login timeout on the staff portal");
}

#[tokio::test]
async fn optimize_failure_uses_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": false, "error": "quota"})),
        )
        .mount(&server)
        .await;

    let err = gateway(&server).await.optimize("x").await.unwrap_err();
    assert!(matches!(&err, OptimizeError::Failed(msg) if msg == "quota"));
}

#[tokio::test]
async fn optimize_failure_without_message_uses_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
        .mount(&server)
        .await;

    let err = gateway(&server).await.optimize("x").await.unwrap_err();
    assert_eq!(err.to_string(), OPTIMIZE_FALLBACK_MESSAGE);
}
