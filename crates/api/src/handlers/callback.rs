//! Handler for the worker's result callback.
//!
//! The external worker is fire-and-forget on our side, so this endpoint
//! is the only writer of terminal task state. It must stay safe under
//! re-delivery: a duplicate callback finds the task already terminal and
//! the history row already present, performs no writes, and still
//! acknowledges success so the worker never re-delivers on our account.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use imagen_core::error::CoreError;

use crate::error::AppResult;
use crate::extract::CallbackPayload;
use crate::state::AppState;

/// Fallback error message when the worker reports failure without detail.
const DEFAULT_GENERATION_ERROR: &str = "Unknown error occurred during generation";

/// Acknowledgment body returned to the worker.
#[derive(Debug, Serialize)]
pub struct CallbackAck {
    pub success: bool,
    pub message: &'static str,
}

/// POST /api/v1/webhook/result
///
/// Accepts multipart or JSON (see [`CallbackPayload`]). 400 on a missing
/// or malformed task id, 404 on an unknown task; callbacks never create
/// tasks.
pub async fn result_callback(
    State(state): State<AppState>,
    payload: CallbackPayload,
) -> AppResult<impl IntoResponse> {
    let task_id = payload.task_id;

    tracing::info!(%task_id, success = payload.success, "Received result callback");

    let task = state
        .store
        .get(task_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Task",
            id: task_id,
        })?;

    match (payload.success, payload.payload) {
        (true, Some(data)) => {
            let transitioned = state.store.complete(task_id, &data).await?;
            if !transitioned {
                tracing::debug!(%task_id, "Task already terminal, callback is a no-op");
            }

            let archived = state
                .store
                .archive(task_id, task.user_id, &task.prompt, &data)
                .await?;
            if archived {
                tracing::info!(%task_id, "Result stored and archived to history");
            } else {
                tracing::debug!(%task_id, "History record already exists, skipping");
            }
        }
        _ => {
            // Failure report, or a success flag with no attached payload.
            let detail = payload
                .error
                .unwrap_or_else(|| DEFAULT_GENERATION_ERROR.to_string());
            let transitioned = state.store.fail(task_id, &detail).await?;
            if transitioned {
                tracing::info!(%task_id, error = %detail, "Generation failed");
            } else {
                tracing::debug!(%task_id, "Task already terminal, failure report ignored");
            }
        }
    }

    Ok(Json(CallbackAck {
        success: true,
        message: "Result processed",
    }))
}
