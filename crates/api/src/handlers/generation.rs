//! Handlers for generation submission and status polling.
//!
//! Routes:
//! - `POST /generate`          -- submit a prompt, returns 202 + task id
//! - `GET  /status/{task_id}`  -- poll a task's current state

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use imagen_core::error::CoreError;
use imagen_core::task::TaskStatus;
use imagen_core::types::{TaskId, Timestamp};
use imagen_store::models::task::Task;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Request body for `POST /generate`.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
}

/// Response body for `POST /generate`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub task_id: TaskId,
    pub status: TaskStatus,
    pub message: &'static str,
}

/// Response body for `GET /status/{task_id}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub task_id: TaskId,
    pub status: TaskStatus,
    pub result_payload: Option<String>,
    pub error_detail: Option<String>,
    pub created_at: Timestamp,
}

impl From<Task> for StatusResponse {
    fn from(task: Task) -> Self {
        Self {
            task_id: task.task_id,
            status: task.status,
            result_payload: task.result_payload,
            error_detail: task.error_detail,
            created_at: task.created_at,
        }
    }
}

/// POST /api/v1/generate
///
/// Creates the task record (awaited, so the record is visible to status
/// polls before the response goes out), then detaches the dispatch to the
/// external worker and returns immediately with 202.
pub async fn submit_generation(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<GenerateRequest>,
) -> AppResult<impl IntoResponse> {
    let task = state.store.create(auth.user_id, &input.prompt).await?;

    tracing::info!(
        task_id = %task.task_id,
        user_id = %auth.user_id,
        prompt = %task.prompt,
        "Starting image generation",
    );

    Arc::clone(&state.dispatcher).spawn(task.task_id, task.prompt.clone());

    Ok((
        StatusCode::ACCEPTED,
        Json(GenerateResponse {
            task_id: task.task_id,
            status: task.status,
            message: "Image generation started",
        }),
    ))
}

/// GET /api/v1/status/{task_id}
///
/// Read-only poll target. No auth: the task id is an unguessable UUID
/// capability, matching the submission response.
pub async fn get_status(
    State(state): State<AppState>,
    Path(task_id): Path<TaskId>,
) -> AppResult<Json<StatusResponse>> {
    let task = state
        .store
        .get(task_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Task",
            id: task_id,
        })?;

    Ok(Json(StatusResponse::from(task)))
}
