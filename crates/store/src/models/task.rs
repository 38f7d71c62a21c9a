use serde::Serialize;
use sqlx::FromRow;

use imagen_core::task::TaskStatus;
use imagen_core::types::{TaskId, Timestamp, UserId};

/// A row from the `tasks` table (or an entry in the in-memory map).
///
/// `result_payload` and `error_detail` are mutually exclusive; once
/// `status` is terminal no field changes again.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub task_id: TaskId,
    pub user_id: UserId,
    pub prompt: String,
    #[sqlx(try_from = "String")]
    pub status: TaskStatus,
    pub result_payload: Option<String>,
    pub error_detail: Option<String>,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}
