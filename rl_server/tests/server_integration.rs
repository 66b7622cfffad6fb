//! Integration tests for the HTTP API.
//!
//! Drives the router in-process with `oneshot` requests.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use rl_server::api::{AppState, create_router, request_id::REQUEST_ID_HEADER};
use serde_json::{Value, json};
use tower::ServiceExt; // For `oneshot` method

/// Helper to create a router over a fresh ledger
fn create_test_server() -> (axum::Router, AppState) {
    let state = AppState::new();
    (create_router(state.clone()), state)
}

/// Helper to send a request and decode the JSON body
async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, value)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn end_recording(id: &str, start: &str, end: &str, participants: &[&str]) -> Request<Body> {
    post_json(
        "/recording/end",
        json!({
            "recordingId": id,
            "start": start,
            "end": end,
            "participants": participants,
        }),
    )
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check_endpoint() {
    let (app, _) = create_test_server();

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["users"], 0);
}

#[tokio::test]
async fn test_request_id_propagated() {
    let (app, _) = create_test_server();

    let request = Request::builder()
        .uri("/health")
        .header(REQUEST_ID_HEADER, "abc-123")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.headers()[REQUEST_ID_HEADER], "abc-123");
}

// ============================================================================
// End Recording Tests
// ============================================================================

#[tokio::test]
async fn test_end_recording_credits_participants() {
    let (app, state) = create_test_server();

    let (status, body) = send(
        &app,
        end_recording(
            "rec1",
            "2023-01-01T10:00:00Z",
            "2023-01-01T11:30:00Z",
            &["alice", "bob", "alice"],
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["credited"], json!({"alice": 150, "bob": 150}));
    assert_eq!(body["fraudUsers"], json!([]));
    assert_eq!(state.ledger.balance("alice"), 150);
}

#[tokio::test]
async fn test_end_recording_flags_fraud() {
    let (app, _) = create_test_server();

    send(
        &app,
        end_recording(
            "rec1",
            "2023-01-01T10:00:00Z",
            "2023-02-04T11:01:00Z",
            &["user1", "user2"],
        ),
    )
    .await;

    let (status, body) = send(
        &app,
        end_recording(
            "rec2",
            "2023-01-01T10:30:00Z",
            "2023-02-04T11:30:00Z",
            &["user1", "user3"],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["credited"]["user1"], 0);
    assert_eq!(body["fraudUsers"], json!(["user1"]));

    let (_, balance) = send(&app, get("/balance/user1")).await;
    assert_eq!(balance, json!({"userid": "user1", "balance": "0.00"}));
}

#[tokio::test]
async fn test_end_recording_validation_errors() {
    let (app, state) = create_test_server();

    let cases = [
        (
            end_recording("", "2023-01-01T10:00:00Z", "2023-01-01T11:00:00Z", &["a"]),
            "invalid input",
        ),
        (
            end_recording("r", "2023-01-01T11:00:00Z", "2023-01-01T10:00:00Z", &["a"]),
            "end must be after start",
        ),
        (
            end_recording("r", "2023-01-01T10:00:00Z", "2023-01-01T11:00:00Z", &["", ""]),
            "no valid participants",
        ),
        (
            end_recording("r", "yesterday", "2023-01-01T11:00:00Z", &["a"]),
            "invalid start time",
        ),
        (
            end_recording("r", "2023-01-01T10:00:00Z", "", &["a"]),
            "invalid end time",
        ),
    ];

    for (request, expected) in cases {
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], expected);
    }
    assert!(state.ledger.store().is_empty());
}

#[tokio::test]
async fn test_end_recording_malformed_json() {
    let (app, _) = create_test_server();

    let request = Request::builder()
        .method("POST")
        .uri("/recording/end")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid request");
}

#[tokio::test]
async fn test_wrong_method_rejected() {
    let (app, _) = create_test_server();

    let (status, _) = send(&app, get("/recording/end")).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

// ============================================================================
// Balance & Withdraw Tests
// ============================================================================

#[tokio::test]
async fn test_balance_unknown_user_is_zero() {
    let (app, _) = create_test_server();

    let (status, body) = send(&app, get("/api/v1/balance/nobody")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"userid": "nobody", "balance": "0.00"}));
}

#[tokio::test]
async fn test_balance_missing_user_id() {
    let (app, _) = create_test_server();

    let (status, body) = send(&app, get("/balance/")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "missing userId");
}

#[tokio::test]
async fn test_withdraw_flow() {
    let (app, _) = create_test_server();

    send(
        &app,
        end_recording(
            "rec1",
            "2023-01-01T10:00:00Z",
            "2023-01-01T12:00:00Z",
            &["alice"],
        ),
    )
    .await;

    let (status, body) = send(
        &app,
        post_json("/withdraw", json!({"userId": "alice", "amount": ".5"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"userid": "alice", "balance": "1.50"}));

    let (status, body) = send(
        &app,
        post_json("/api/v1/withdraw", json!({"userId": "alice", "amount": "2"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"error": "insufficient balance", "balance": "1.50"})
    );

    let (_, body) = send(&app, get("/balance/alice")).await;
    assert_eq!(body["balance"], "1.50");
}

#[tokio::test]
async fn test_withdraw_validation_errors() {
    let (app, _) = create_test_server();

    let cases = [
        (json!({"amount": "1.00"}), "missing userId"),
        (json!({"userId": "a", "amount": "1.2.3"}), "invalid amount"),
        (json!({"userId": "a", "amount": "abc"}), "invalid amount"),
        (json!({"userId": "a", "amount": ""}), "invalid amount"),
        (json!({"userId": "a", "amount": "0.00"}), "invalid amount"),
    ];

    for (body, expected) in cases {
        let (status, response) = send(&app, post_json("/withdraw", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], expected);
        assert!(response.get("balance").is_none());
    }
}

// ============================================================================
// Concurrency Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_stay_consistent() {
    let (app, state) = create_test_server();

    let mut handles = Vec::new();
    for i in 0..40 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            // Disjoint hours per request; pairs rotate through four users
            let users = ["u0", "u1", "u2", "u3"];
            let pair = [users[i % 4], users[(i + 1) % 4]];
            let start = format!("2023-01-02T{:02}:00:00Z", i % 24);
            let end = format!("2023-01-02T{:02}:30:00Z", i % 24);
            send(&app, end_recording(&format!("r{i}"), &start, &end, &pair)).await
        }));
    }
    for handle in handles {
        let (status, _) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK);
    }

    for user in ["u0", "u1", "u2", "u3"] {
        let ledger = state.ledger.store().get_or_create(user);
        let ledger = ledger.lock();
        let good: i64 = ledger
            .recordings()
            .iter()
            .filter(|r| !r.is_fraud())
            .map(|r| r.paid_amount())
            .sum();
        assert_eq!(ledger.current_balance(), good);
        assert_eq!(ledger.recordings().len(), 20);
    }
}
