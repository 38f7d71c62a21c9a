//! The [`TaskStore`] trait: the single seam between the HTTP layer and
//! whichever backend holds task state.
//!
//! Terminal-state immutability is enforced here, not in callers: every
//! terminal transition is conditional and reports via its `bool` return
//! whether it actually fired. A duplicate callback therefore degrades to
//! a sequence of no-ops instead of corrupting state.

use async_trait::async_trait;

use imagen_core::types::{TaskId, Timestamp, UserId};

use crate::error::StoreError;
use crate::models::history::HistoryRecord;
use crate::models::task::Task;

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Create a new `pending` task for `user_id`.
    ///
    /// Fails with [`StoreError::Validation`] if the prompt is empty after
    /// trimming. The returned task is visible to [`get`](Self::get) before
    /// this call resolves.
    async fn create(&self, user_id: UserId, prompt: &str) -> Result<Task, StoreError>;

    /// Look up a task by id. `None` if absent or (ephemeral backend)
    /// expired.
    async fn get(&self, task_id: TaskId) -> Result<Option<Task>, StoreError>;

    /// Transition `pending -> processing`. Returns `false` if the task is
    /// missing or not `pending`.
    async fn mark_processing(&self, task_id: TaskId) -> Result<bool, StoreError>;

    /// Transition to `completed` with a result payload, stamping
    /// `completed_at`. Returns `false` if the task is missing or already
    /// terminal.
    async fn complete(&self, task_id: TaskId, payload: &str) -> Result<bool, StoreError>;

    /// Transition to `error` with a failure message, stamping
    /// `completed_at`. Returns `false` if the task is missing or already
    /// terminal.
    async fn fail(&self, task_id: TaskId, error: &str) -> Result<bool, StoreError>;

    /// Archive a completed task's prompt and payload under its `task_id`.
    ///
    /// Returns `false` when a record for that `task_id` already exists --
    /// duplicate archives are a success-shaped no-op, not an error.
    async fn archive(
        &self,
        task_id: TaskId,
        user_id: UserId,
        prompt: &str,
        payload: &str,
    ) -> Result<bool, StoreError>;

    /// The caller's history records, newest first.
    async fn history(&self, user_id: UserId) -> Result<Vec<HistoryRecord>, StoreError>;

    /// Number of non-terminal (`pending` + `processing`) tasks.
    async fn count_active(&self) -> Result<i64, StoreError>;

    /// Evict expired tasks (ephemeral backend only; the durable backend
    /// retains everything and returns 0). Returns the evicted count.
    async fn evict_expired(&self, now: Timestamp) -> Result<u64, StoreError>;
}
