//! Ephemeral in-process [`TaskStore`] backend.
//!
//! State lives in a single `RwLock`-guarded map, which serializes
//! concurrent updates to the same task. Expired tasks are removed lazily
//! when a lookup touches them and proactively by the hourly retention
//! sweep; history entries are never evicted with their task.

use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use imagen_core::task::{is_expired, validate_prompt, TaskStatus};
use imagen_core::types::{TaskId, Timestamp, UserId};

use crate::error::StoreError;
use crate::models::history::HistoryRecord;
use crate::models::task::Task;
use crate::store::TaskStore;

use async_trait::async_trait;

#[derive(Default)]
struct Inner {
    tasks: HashMap<TaskId, Task>,
    history: Vec<HistoryRecord>,
    next_history_id: i64,
}

/// Task store holding everything in process memory.
#[derive(Default)]
pub struct MemoryTaskStore {
    inner: RwLock<Inner>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn create(&self, user_id: UserId, prompt: &str) -> Result<Task, StoreError> {
        let prompt = validate_prompt(prompt)
            .map_err(|e| StoreError::Validation(e.to_string()))?;

        let task = Task {
            task_id: Uuid::new_v4(),
            user_id,
            prompt: prompt.to_string(),
            status: TaskStatus::Pending,
            result_payload: None,
            error_detail: None,
            created_at: chrono::Utc::now(),
            completed_at: None,
        };

        let mut inner = self.inner.write().await;
        inner.tasks.insert(task.task_id, task.clone());
        Ok(task)
    }

    async fn get(&self, task_id: TaskId) -> Result<Option<Task>, StoreError> {
        let now = chrono::Utc::now();

        let expired = {
            let inner = self.inner.read().await;
            match inner.tasks.get(&task_id) {
                None => return Ok(None),
                Some(task) => {
                    if !is_expired(task.status, task.created_at, task.completed_at, now) {
                        return Ok(Some(task.clone()));
                    }
                    true
                }
            }
        };

        if expired {
            let mut inner = self.inner.write().await;
            // Re-check under the write lock; another caller may have
            // evicted or replaced the entry in between.
            if let Some(task) = inner.tasks.get(&task_id) {
                if is_expired(task.status, task.created_at, task.completed_at, now) {
                    inner.tasks.remove(&task_id);
                    tracing::debug!(%task_id, "Evicted expired task on lookup");
                }
            }
        }
        Ok(None)
    }

    async fn mark_processing(&self, task_id: TaskId) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        match inner.tasks.get_mut(&task_id) {
            Some(task) if task.status == TaskStatus::Pending => {
                task.status = TaskStatus::Processing;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn complete(&self, task_id: TaskId, payload: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        match inner.tasks.get_mut(&task_id) {
            Some(task) if !task.status.is_terminal() => {
                task.status = TaskStatus::Completed;
                task.result_payload = Some(payload.to_string());
                task.error_detail = None;
                task.completed_at = Some(chrono::Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn fail(&self, task_id: TaskId, error: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        match inner.tasks.get_mut(&task_id) {
            Some(task) if !task.status.is_terminal() => {
                task.status = TaskStatus::Error;
                task.error_detail = Some(error.to_string());
                task.result_payload = None;
                task.completed_at = Some(chrono::Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn archive(
        &self,
        task_id: TaskId,
        user_id: UserId,
        prompt: &str,
        payload: &str,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.history.iter().any(|r| r.task_id == task_id) {
            return Ok(false);
        }
        inner.next_history_id += 1;
        let record = HistoryRecord {
            id: inner.next_history_id,
            task_id,
            user_id,
            prompt: prompt.to_string(),
            result_payload: payload.to_string(),
            created_at: chrono::Utc::now(),
        };
        inner.history.push(record);
        Ok(true)
    }

    async fn history(&self, user_id: UserId) -> Result<Vec<HistoryRecord>, StoreError> {
        let inner = self.inner.read().await;
        let mut records: Vec<HistoryRecord> = inner
            .history
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn count_active(&self) -> Result<i64, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .tasks
            .values()
            .filter(|t| !t.status.is_terminal())
            .count() as i64)
    }

    async fn evict_expired(&self, now: Timestamp) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;
        let before = inner.tasks.len();
        inner
            .tasks
            .retain(|_, t| !is_expired(t.status, t.created_at, t.completed_at, now));
        Ok((before - inner.tasks.len()) as u64)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
