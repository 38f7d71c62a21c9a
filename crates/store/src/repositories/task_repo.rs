//! Repository for the `tasks` table.
//!
//! Every terminal transition is a conditional UPDATE guarded on the
//! current status, so re-delivered callbacks and late dispatch results
//! can never overwrite a terminal row.

use sqlx::PgPool;
use uuid::Uuid;

use imagen_core::task::TaskStatus;
use imagen_core::types::{TaskId, UserId};

use crate::models::task::Task;

/// Column list for `tasks` queries.
const COLUMNS: &str = "\
    task_id, user_id, prompt, status, result_payload, error_detail, \
    created_at, completed_at";

/// Provides CRUD operations for generation tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a new pending task and return the created row.
    ///
    /// The `task_id` is generated here; callers receive it from the
    /// returned row.
    pub async fn create(
        pool: &PgPool,
        user_id: UserId,
        prompt: &str,
    ) -> Result<Task, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks (task_id, user_id, prompt, status) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(prompt)
            .bind(TaskStatus::Pending.as_str())
            .fetch_one(pool)
            .await
    }

    /// Find a task by its id.
    pub async fn find_by_id(pool: &PgPool, task_id: TaskId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE task_id = $1");
        sqlx::query_as::<_, Task>(&query)
            .bind(task_id)
            .fetch_optional(pool)
            .await
    }

    /// Transition `pending -> processing` after a successful dispatch.
    ///
    /// Returns `false` when the task is missing or no longer `pending`
    /// (e.g. the callback already landed).
    pub async fn mark_processing(pool: &PgPool, task_id: TaskId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE tasks SET status = $2 \
             WHERE task_id = $1 AND status = $3",
        )
        .bind(task_id)
        .bind(TaskStatus::Processing.as_str())
        .bind(TaskStatus::Pending.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark a task as completed with its result payload.
    ///
    /// Guarded against terminal rows; returns `false` on a no-op.
    pub async fn complete(
        pool: &PgPool,
        task_id: TaskId,
        payload: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE tasks \
             SET status = $2, result_payload = $3, error_detail = NULL, \
                 completed_at = NOW() \
             WHERE task_id = $1 AND status NOT IN ($4, $5)",
        )
        .bind(task_id)
        .bind(TaskStatus::Completed.as_str())
        .bind(payload)
        .bind(TaskStatus::Completed.as_str())
        .bind(TaskStatus::Error.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark a task as failed with an error message.
    ///
    /// Guarded against terminal rows; returns `false` on a no-op.
    pub async fn fail(pool: &PgPool, task_id: TaskId, error: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE tasks \
             SET status = $2, error_detail = $3, result_payload = NULL, \
                 completed_at = NOW() \
             WHERE task_id = $1 AND status NOT IN ($4, $5)",
        )
        .bind(task_id)
        .bind(TaskStatus::Error.as_str())
        .bind(error)
        .bind(TaskStatus::Completed.as_str())
        .bind(TaskStatus::Error.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count non-terminal tasks for the health endpoint.
    pub async fn count_active(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tasks WHERE status IN ($1, $2)",
        )
        .bind(TaskStatus::Pending.as_str())
        .bind(TaskStatus::Processing.as_str())
        .fetch_one(pool)
        .await
    }
}
