//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{body_json, get};
use imagen_store::{MemoryTaskStore, TaskStore};
use uuid::Uuid;

fn test_store() -> Arc<dyn TaskStore> {
    Arc::new(MemoryTaskStore::new())
}

// ---------------------------------------------------------------------------
// Test: GET /health returns 200 with expected JSON fields
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_returns_ok_with_json() {
    let store = test_store();
    let app = common::build_test_app(Arc::clone(&store), &common::unreachable_worker_url());

    let response = get(&app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;

    // The response must contain "status", "version", and "activeTasks" fields.
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["activeTasks"], 0);
}

// ---------------------------------------------------------------------------
// Test: active task count reflects non-terminal tasks only
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_counts_only_non_terminal_tasks() {
    let store = test_store();
    let app = common::build_test_app(Arc::clone(&store), &common::unreachable_worker_url());

    let user = Uuid::new_v4();
    let active = store.create(user, "still running").await.unwrap();
    let done = store.create(user, "finished").await.unwrap();
    store.mark_processing(active.task_id).await.unwrap();
    store.complete(done.task_id, "data").await.unwrap();

    let json = body_json(get(&app, "/health").await).await;
    assert_eq!(json["activeTasks"], 1);
}

// ---------------------------------------------------------------------------
// Test: Unknown route returns 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = common::build_test_app(test_store(), &common::unreachable_worker_url());
    let response = get(&app, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: x-request-id header is present in response
// ---------------------------------------------------------------------------

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let app = common::build_test_app(test_store(), &common::unreachable_worker_url());
    let response = get(&app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let request_id = response.headers().get("x-request-id");
    assert!(
        request_id.is_some(),
        "Response must contain an x-request-id header"
    );

    // The value should be a valid UUID (36 chars with hyphens).
    let id_str = request_id.unwrap().to_str().unwrap();
    assert_eq!(id_str.len(), 36, "x-request-id should be a UUID string");
}
