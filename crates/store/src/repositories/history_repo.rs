//! Repository for the `task_history` table.

use sqlx::PgPool;

use imagen_core::types::{TaskId, UserId};

use crate::models::history::HistoryRecord;

/// Column list for `task_history` queries.
const COLUMNS: &str = "id, task_id, user_id, prompt, result_payload, created_at";

/// Provides append and listing operations for the history archive.
pub struct HistoryRepo;

impl HistoryRepo {
    /// Insert a history record unless one already exists for `task_id`.
    ///
    /// Uses `ON CONFLICT DO NOTHING` so a re-delivered callback archives
    /// exactly once. Returns `true` when a row was inserted.
    pub async fn insert_if_absent(
        pool: &PgPool,
        task_id: TaskId,
        user_id: UserId,
        prompt: &str,
        payload: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO task_history (task_id, user_id, prompt, result_payload) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (task_id) DO NOTHING",
        )
        .bind(task_id)
        .bind(user_id)
        .bind(prompt)
        .bind(payload)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List a user's history records, newest first.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: UserId,
    ) -> Result<Vec<HistoryRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM task_history \
             WHERE user_id = $1 \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, HistoryRecord>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
