#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, Response, StatusCode};
use axum::Router;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use imagen_api::auth::jwt::{generate_access_token, JwtConfig};
use imagen_api::config::{ServerConfig, StoreBackend};
use imagen_api::engine::Dispatcher;
use imagen_api::routes;
use imagen_api::state::AppState;
use imagen_core::task::TaskStatus;
use imagen_core::types::{TaskId, UserId};
use imagen_store::models::task::Task;
use imagen_store::TaskStore;

/// Fixed signing secret for test tokens.
pub const TEST_JWT_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

/// Build a test `JwtConfig` with the fixed secret.
pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: TEST_JWT_SECRET.to_string(),
        access_token_expiry_mins: 15,
    }
}

/// Build a test `ServerConfig` pointed at the given worker URL.
pub fn test_config(worker_url: &str) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        worker_webhook_url: worker_url.to_string(),
        callback_base_url: "http://localhost:3000".to_string(),
        store_backend: StoreBackend::Memory,
        jwt: test_jwt_config(),
    }
}

/// Generate a valid bearer token for `user_id` against the test secret.
pub fn auth_token(user_id: UserId) -> String {
    generate_access_token(user_id, &test_jwt_config()).expect("token generation should succeed")
}

/// Build the full application router with all middleware layers, using the
/// given task store.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (CORS, request ID, timeout, tracing,
/// panic recovery) that production uses.
pub fn build_test_app(store: Arc<dyn TaskStore>, worker_url: &str) -> Router {
    let config = test_config(worker_url);

    let dispatcher = Arc::new(Dispatcher::new(
        worker_url,
        &config.callback_base_url,
        Arc::clone(&store),
    ));

    let state = AppState {
        store,
        config: Arc::new(config),
        dispatcher,
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

/// Issue a GET request without authentication.
pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

/// Issue a GET request with a bearer token.
pub async fn get_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

/// Issue a POST request with a JSON body and optional bearer token.
pub async fn post_json(
    app: &Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();
    app.clone().oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    use http_body_util::BodyExt;
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Spawn an in-process stub worker that accepts every dispatch with 200.
///
/// Returns the URL the dispatcher should POST to. The server lives until
/// the test process exits.
pub async fn spawn_stub_worker() -> String {
    use axum::routing::post;

    let app = Router::new().route(
        "/webhook/image",
        post(|| async { axum::Json(serde_json::json!({})) }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind stub worker");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}/webhook/image")
}

/// A worker URL that refuses connections immediately (discard port).
pub fn unreachable_worker_url() -> String {
    "http://127.0.0.1:9/webhook/image".to_string()
}

/// Wait until the task reaches `expected` or the deadline passes.
///
/// Used where a detached dispatch must settle before the assertion.
pub async fn wait_for_status(
    store: &Arc<dyn TaskStore>,
    task_id: TaskId,
    expected: TaskStatus,
    deadline: Duration,
) -> Task {
    let result = tokio::time::timeout(deadline, async {
        loop {
            if let Some(task) = store.get(task_id).await.unwrap() {
                if task.status == expected {
                    return task;
                }
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
    })
    .await;

    result.unwrap_or_else(|_| panic!("task {task_id} never reached {expected}"))
}
