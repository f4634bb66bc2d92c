//! Integration tests for racer-intake API endpoints

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use racer_common::{Answer, Result};
use racer_intake::{build_router, AppState, Forwarder, ForwarderConfig, Relay};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tower::util::ServiceExt; // for `oneshot` method

#[derive(Default)]
struct RecordingRelay {
    relayed: Mutex<Vec<Answer>>,
}

#[async_trait]
impl Relay for RecordingRelay {
    fn target(&self) -> &str {
        "recording"
    }

    async fn relay(&self, answer: &Answer) -> Result<()> {
        self.relayed.lock().await.push(answer.clone());
        Ok(())
    }
}

fn setup_app() -> (axum::Router, Arc<Forwarder>, Arc<RecordingRelay>) {
    let relay = Arc::new(RecordingRelay::default());
    let forwarder = Arc::new(Forwarder::start(
        ForwarderConfig { capacity: 10, workers: 1 },
        relay.clone(),
    ));
    let app = build_router(AppState::new(Arc::clone(&forwarder)));
    (app, forwarder, relay)
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<String>) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(body.map(Body::from).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    (status, bytes.to_vec())
}

fn as_json(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).expect("Should parse JSON")
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _, _) = setup_app();
    let (status, body) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    let body = as_json(&body);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "racer-intake");
}

#[tokio::test]
async fn test_banner() {
    let (app, _, _) = setup_app();
    let (status, body) = send(&app, "GET", "/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("POST to /submit"));
}

#[tokio::test]
async fn test_submit_acknowledges_and_relays() {
    let (app, forwarder, relay) = setup_app();
    // No content-type header: the body is decoded regardless
    let payload = json!({"user_id": 3, "response": "yes", "delay_ms": 10}).to_string();
    let (status, body) = send(&app, "POST", "/submit", Some(payload)).await;

    assert_eq!(status, StatusCode::OK);
    let body = as_json(&body);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["msg"], "Received response from user 3");

    forwarder.shutdown().await;
    let relayed = relay.relayed.lock().await;
    assert_eq!(relayed.as_slice(), &[Answer::new(3, "yes", 10)]);
}

#[tokio::test]
async fn test_non_post_is_rejected() {
    let (app, forwarder, _) = setup_app();
    for method in ["GET", "PUT", "DELETE"] {
        let (status, body) = send(&app, method, "/submit", None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(String::from_utf8(body).unwrap(), "Only POST allowed");
    }
    assert_eq!(forwarder.stats().submitted, 0);
}

#[tokio::test]
async fn test_invalid_json_never_enters_buffer() {
    let (app, forwarder, _) = setup_app();
    let (status, body) = send(&app, "POST", "/submit", Some("user_id=3".to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(String::from_utf8(body).unwrap(), "Invalid JSON");
    assert_eq!(forwarder.stats().submitted, 0);
}

#[tokio::test]
async fn test_submit_during_shutdown_is_unavailable() {
    let (app, forwarder, _) = setup_app();
    forwarder.shutdown().await;

    let payload = json!({"user_id": 1, "response": "no", "delay_ms": 5}).to_string();
    let (status, _) = send(&app, "POST", "/submit", Some(payload)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_stats_endpoint() {
    let (app, forwarder, _) = setup_app();
    let payload = json!({"user_id": 1, "response": "no"}).to_string();
    send(&app, "POST", "/submit", Some(payload)).await;
    forwarder.shutdown().await;

    let (status, body) = send(&app, "GET", "/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    let body = as_json(&body);
    assert_eq!(body["submitted"], 1);
    assert_eq!(body["relayed"], 1);
    assert_eq!(body["workers"], 1);
}
