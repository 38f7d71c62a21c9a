//! Callback payload extractor for the worker's result delivery.
//!
//! The worker reports results either as `multipart/form-data` (text fields
//! `taskId`, `success`, `error` plus a binary `imageData` file) or as
//! plain JSON with the file already base64-encoded. Both shapes normalize
//! into [`CallbackPayload`].

use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;
use uuid::Uuid;

use imagen_core::types::TaskId;

use crate::error::AppError;
use crate::state::AppState;

/// Normalized callback body from the external worker.
#[derive(Debug)]
pub struct CallbackPayload {
    pub task_id: TaskId,
    pub success: bool,
    /// Base64-encoded result data, when the worker attached one.
    pub payload: Option<String>,
    pub error: Option<String>,
}

/// JSON form of the callback body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CallbackBody {
    task_id: Option<String>,
    success: Option<SuccessFlag>,
    image_data: Option<String>,
    error: Option<String>,
}

/// The worker sends `success` as a JSON bool or as the literal string
/// `"true"` / `"false"` depending on delivery mode.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SuccessFlag {
    Bool(bool),
    Text(String),
}

impl SuccessFlag {
    fn as_bool(&self) -> bool {
        match self {
            SuccessFlag::Bool(b) => *b,
            SuccessFlag::Text(s) => s == "true",
        }
    }
}

/// Parse and validate the `taskId` field.
fn parse_task_id(raw: Option<String>) -> Result<TaskId, AppError> {
    let raw = raw.ok_or_else(|| AppError::BadRequest("Task ID is required".into()))?;
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::BadRequest(format!("Invalid task ID '{raw}'")))
}

impl FromRequest<AppState> for CallbackPayload {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?;
            Self::from_multipart(multipart).await
        } else {
            let Json(body) = Json::<CallbackBody>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))?;

            Ok(CallbackPayload {
                task_id: parse_task_id(body.task_id)?,
                success: body.success.map(|f| f.as_bool()).unwrap_or(false),
                payload: body.image_data,
                error: body.error,
            })
        }
    }
}

impl CallbackPayload {
    /// Drain the multipart stream, base64-encoding the attached file.
    async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut task_id: Option<String> = None;
        let mut success = false;
        let mut payload: Option<String> = None;
        let mut error: Option<String> = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid multipart field: {e}")))?
        {
            match field.name() {
                Some("taskId") => {
                    task_id = Some(field.text().await.map_err(|e| {
                        AppError::BadRequest(format!("Invalid taskId field: {e}"))
                    })?);
                }
                Some("success") => {
                    let text = field.text().await.map_err(|e| {
                        AppError::BadRequest(format!("Invalid success field: {e}"))
                    })?;
                    success = text == "true";
                }
                Some("error") => {
                    error = Some(field.text().await.map_err(|e| {
                        AppError::BadRequest(format!("Invalid error field: {e}"))
                    })?);
                }
                Some("imageData") => {
                    let bytes = field.bytes().await.map_err(|e| {
                        AppError::BadRequest(format!("Invalid imageData field: {e}"))
                    })?;
                    payload = Some(BASE64.encode(&bytes));
                }
                // Unknown fields are ignored rather than rejected.
                _ => {}
            }
        }

        Ok(CallbackPayload {
            task_id: parse_task_id(task_id)?,
            success,
            payload,
            error,
        })
    }
}
