use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Number of non-terminal (pending + processing) tasks.
    pub active_tasks: i64,
}

/// GET /health -- liveness/readiness via the task store.
///
/// 200 with the active task count when the store responds; 503 when it
/// does not.
async fn health_check(State(state): State<AppState>) -> Response {
    match state.store.count_active().await {
        Ok(active_tasks) => Json(HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
            active_tasks,
        })
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "status": "unhealthy",
                    "reason": "Failed to reach task store",
                })),
            )
                .into_response()
        }
    }
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
