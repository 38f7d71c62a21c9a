use serde::Serialize;
use sqlx::FromRow;

use imagen_core::types::{TaskId, Timestamp, UserId};

/// A row from the `task_history` table: the durable archive of one
/// successfully completed task.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct HistoryRecord {
    pub id: i64,
    pub task_id: TaskId,
    pub user_id: UserId,
    pub prompt: String,
    pub result_payload: String,
    pub created_at: Timestamp,
}
