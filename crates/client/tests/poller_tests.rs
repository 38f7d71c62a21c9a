//! Poll loop and session behaviour against canned in-process servers.
//!
//! Each test spins an axum server on a random port that plays the imagen
//! API with scripted responses, then drives the real client over HTTP.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use imagen_client::{ApiClient, GenerationSession, PollConfig, PollOutcome, SessionOutcome};

/// Bind a scripted server and return its base URL.
async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind stub server");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Status body for a non-terminal or terminal state.
fn status_body(
    task_id: Uuid,
    status: &str,
    payload: Option<&str>,
    error: Option<&str>,
) -> serde_json::Value {
    json!({
        "taskId": task_id,
        "status": status,
        "resultPayload": payload,
        "errorDetail": error,
        "createdAt": "2024-01-01T00:00:00Z",
    })
}

/// Fast poll settings so tests finish in milliseconds.
fn fast_config(max_attempts: u32) -> PollConfig {
    PollConfig {
        interval: Duration::from_millis(10),
        max_attempts,
    }
}

/// A status route that runs `script` with the 1-based hit count.
fn scripted_status<F>(hits: Arc<AtomicU32>, script: F) -> Router
where
    F: Fn(u32, Uuid) -> Response + Clone + Send + Sync + 'static,
{
    Router::new().route(
        "/api/v1/status/{task_id}",
        get(move |Path(task_id): Path<Uuid>| {
            let hits = hits.clone();
            let script = script.clone();
            async move {
                let n = hits.fetch_add(1, Ordering::SeqCst) + 1;
                script(n, task_id)
            }
        }),
    )
}

// ---------------------------------------------------------------------------
// Poll loop
// ---------------------------------------------------------------------------

#[tokio::test]
async fn poll_resolves_when_task_completes() {
    let hits = Arc::new(AtomicU32::new(0));
    let app = scripted_status(hits, |n, id| {
        if n < 3 {
            Json(status_body(id, "processing", None, None)).into_response()
        } else {
            Json(status_body(id, "completed", Some("aGVsbG8="), None)).into_response()
        }
    });
    let api = ApiClient::new(&spawn_server(app).await, None);

    let mut percents = Vec::new();
    let outcome = imagen_client::poller::poll_until_terminal(
        &api,
        Uuid::new_v4(),
        &fast_config(10),
        &CancellationToken::new(),
        &mut |p| percents.push(p.percent),
    )
    .await;

    assert_eq!(
        outcome,
        PollOutcome::Completed {
            payload: "aGVsbG8=".to_string()
        }
    );
    // Progress never moves backwards and ends at 100.
    assert!(percents.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(*percents.last().unwrap(), 100);
}

#[tokio::test]
async fn poll_surfaces_server_side_failure() {
    let hits = Arc::new(AtomicU32::new(0));
    let app = scripted_status(hits, |_, id| {
        Json(status_body(id, "error", None, Some("model exploded"))).into_response()
    });
    let api = ApiClient::new(&spawn_server(app).await, None);

    let outcome = imagen_client::poller::poll_until_terminal(
        &api,
        Uuid::new_v4(),
        &fast_config(10),
        &CancellationToken::new(),
        &mut |_| {},
    )
    .await;

    assert_eq!(
        outcome,
        PollOutcome::Failed {
            message: "model exploded".to_string()
        }
    );
}

#[tokio::test]
async fn poll_times_out_after_attempt_ceiling() {
    let hits = Arc::new(AtomicU32::new(0));
    let app = scripted_status(hits.clone(), |_, id| {
        Json(status_body(id, "pending", None, None)).into_response()
    });
    let api = ApiClient::new(&spawn_server(app).await, None);

    let mut calls = 0u32;
    let outcome = imagen_client::poller::poll_until_terminal(
        &api,
        Uuid::new_v4(),
        &fast_config(3),
        &CancellationToken::new(),
        &mut |p| {
            calls += 1;
            assert!(p.percent < 100);
        },
    )
    .await;

    assert_eq!(outcome, PollOutcome::TimedOut);
    assert_eq!(calls, 3);
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn poll_continues_through_transient_errors() {
    let hits = Arc::new(AtomicU32::new(0));
    let app = scripted_status(hits, |n, id| {
        if n < 3 {
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        } else {
            Json(status_body(id, "completed", Some("ZGF0YQ=="), None)).into_response()
        }
    });
    let api = ApiClient::new(&spawn_server(app).await, None);

    let mut failed_polls = 0u32;
    let outcome = imagen_client::poller::poll_until_terminal(
        &api,
        Uuid::new_v4(),
        &fast_config(10),
        &CancellationToken::new(),
        &mut |p| {
            if p.status.is_none() {
                failed_polls += 1;
            }
        },
    )
    .await;

    assert_eq!(
        outcome,
        PollOutcome::Completed {
            payload: "ZGF0YQ==".to_string()
        }
    );
    assert_eq!(failed_polls, 2, "failed polls still count toward the budget");
}

#[tokio::test]
async fn poll_stops_when_cancelled() {
    let hits = Arc::new(AtomicU32::new(0));
    let app = scripted_status(hits, |_, id| {
        Json(status_body(id, "pending", None, None)).into_response()
    });
    let api = ApiClient::new(&spawn_server(app).await, None);

    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        cancel_clone.cancel();
    });

    let outcome = imagen_client::poller::poll_until_terminal(
        &api,
        Uuid::new_v4(),
        &fast_config(1000),
        &cancel,
        &mut |_| {},
    )
    .await;

    assert_eq!(outcome, PollOutcome::Cancelled);
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A server whose tasks never leave `pending`, with a working submit route.
fn never_finishing_api() -> Router {
    Router::new()
        .route(
            "/api/v1/generate",
            post(|| async {
                (
                    StatusCode::ACCEPTED,
                    Json(json!({
                        "taskId": Uuid::new_v4(),
                        "status": "pending",
                        "message": "Image generation started",
                    })),
                )
            }),
        )
        .route(
            "/api/v1/status/{task_id}",
            get(|Path(task_id): Path<Uuid>| async move {
                Json(status_body(task_id, "pending", None, None))
            }),
        )
}

#[tokio::test]
async fn session_failure_when_submission_rejected() {
    let app = Router::new().route(
        "/api/v1/generate",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Prompt is required", "code": "VALIDATION_ERROR"})),
            )
        }),
    );
    let api = ApiClient::new(&spawn_server(app).await, None);
    let session = GenerationSession::new(api, fast_config(5));

    let outcome = session.start("", &mut |_| {}).await;

    match outcome {
        SessionOutcome::Failed { message } => {
            assert!(message.contains("Prompt is required"), "got: {message}");
        }
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn session_times_out_on_never_finishing_task() {
    let api = ApiClient::new(&spawn_server(never_finishing_api()).await, None);
    let session = GenerationSession::new(api, fast_config(3));

    let outcome = session.start("a red fox", &mut |_| {}).await;

    assert!(matches!(outcome, SessionOutcome::TimedOut { .. }));
}

#[tokio::test]
async fn starting_a_new_run_cancels_the_previous_one() {
    let base_url = spawn_server(never_finishing_api()).await;
    let session = Arc::new(GenerationSession::new(
        ApiClient::new(&base_url, None),
        PollConfig {
            interval: Duration::from_millis(10),
            // Large enough that the first run can only end by cancellation.
            max_attempts: 10_000,
        },
    ));

    let first = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.start("first", &mut |_| {}).await })
    };

    // Let the first run submit and begin polling.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let second = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.start("second", &mut |_| {}).await })
    };

    let first_outcome = first.await.unwrap();
    assert_eq!(first_outcome, SessionOutcome::Cancelled);

    // The second run keeps polling the never-finishing server.
    second.abort();
}
