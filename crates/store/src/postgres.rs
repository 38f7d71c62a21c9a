//! Durable [`TaskStore`] backend over Postgres.

use async_trait::async_trait;

use imagen_core::task::validate_prompt;
use imagen_core::types::{TaskId, Timestamp, UserId};

use crate::error::StoreError;
use crate::models::history::HistoryRecord;
use crate::models::task::Task;
use crate::repositories::{HistoryRepo, TaskRepo};
use crate::store::TaskStore;
use crate::DbPool;

/// Task store backed by the `tasks` / `task_history` tables.
#[derive(Clone)]
pub struct PgTaskStore {
    pool: DbPool,
}

impl PgTaskStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn create(&self, user_id: UserId, prompt: &str) -> Result<Task, StoreError> {
        let prompt = validate_prompt(prompt)
            .map_err(|e| StoreError::Validation(e.to_string()))?;
        Ok(TaskRepo::create(&self.pool, user_id, prompt).await?)
    }

    async fn get(&self, task_id: TaskId) -> Result<Option<Task>, StoreError> {
        Ok(TaskRepo::find_by_id(&self.pool, task_id).await?)
    }

    async fn mark_processing(&self, task_id: TaskId) -> Result<bool, StoreError> {
        Ok(TaskRepo::mark_processing(&self.pool, task_id).await?)
    }

    async fn complete(&self, task_id: TaskId, payload: &str) -> Result<bool, StoreError> {
        Ok(TaskRepo::complete(&self.pool, task_id, payload).await?)
    }

    async fn fail(&self, task_id: TaskId, error: &str) -> Result<bool, StoreError> {
        Ok(TaskRepo::fail(&self.pool, task_id, error).await?)
    }

    async fn archive(
        &self,
        task_id: TaskId,
        user_id: UserId,
        prompt: &str,
        payload: &str,
    ) -> Result<bool, StoreError> {
        Ok(HistoryRepo::insert_if_absent(&self.pool, task_id, user_id, prompt, payload).await?)
    }

    async fn history(&self, user_id: UserId) -> Result<Vec<HistoryRecord>, StoreError> {
        Ok(HistoryRepo::list_by_user(&self.pool, user_id).await?)
    }

    async fn count_active(&self) -> Result<i64, StoreError> {
        Ok(TaskRepo::count_active(&self.pool).await?)
    }

    /// The durable store retains tasks indefinitely; history outliving
    /// task rows is a property of the ephemeral variant only.
    async fn evict_expired(&self, _now: Timestamp) -> Result<u64, StoreError> {
        Ok(0)
    }
}
