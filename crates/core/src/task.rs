//! Task status state machine, prompt validation, and the expiry decision.
//!
//! Status values travel as lowercase text on the wire and in the database,
//! matching the callback protocol spoken by the external worker.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a generation task.
///
/// `Completed` and `Error` are terminal: once a task reaches either, no
/// further field updates are permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Created, dispatch not yet confirmed.
    Pending,
    /// The external worker accepted the dispatch.
    Processing,
    /// The callback delivered a result payload.
    Completed,
    /// Dispatch or generation failed.
    Error,
}

impl TaskStatus {
    /// Lowercase wire/database representation.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Processing => "processing",
            TaskStatus::Completed => "completed",
            TaskStatus::Error => "error",
        }
    }

    /// Whether this status permits no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Error)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "processing" => Ok(TaskStatus::Processing),
            "completed" => Ok(TaskStatus::Completed),
            "error" => Ok(TaskStatus::Error),
            other => Err(CoreError::Validation(format!(
                "Unknown task status '{other}'"
            ))),
        }
    }
}

/// Conversion used by sqlx's `try_from` field attribute when decoding a
/// TEXT status column.
impl TryFrom<String> for TaskStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, CoreError> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// Prompt validation
// ---------------------------------------------------------------------------

/// Validate a submitted prompt and return the trimmed text.
///
/// The prompt is the only user-supplied field on a task; it must be
/// non-empty after trimming.
pub fn validate_prompt(prompt: &str) -> Result<&str, CoreError> {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Prompt is required and must be a non-empty string".to_string(),
        ));
    }
    Ok(trimmed)
}

// ---------------------------------------------------------------------------
// Expiry (ephemeral store variant)
// ---------------------------------------------------------------------------

/// Terminal tasks are retained for this long after `completed_at`.
pub const COMPLETED_RETENTION_HOURS: i64 = 24;

/// Absolute age ceiling: a task still non-terminal this long after
/// `created_at` is considered stuck and eligible for eviction.
pub const MAX_TASK_AGE_HOURS: i64 = 48;

/// Decide whether the ephemeral store may evict a task.
///
/// Terminal tasks expire [`COMPLETED_RETENTION_HOURS`] after completion.
/// Non-terminal tasks are kept regardless of age until the
/// [`MAX_TASK_AGE_HOURS`] ceiling passes.
pub fn is_expired(
    status: TaskStatus,
    created_at: Timestamp,
    completed_at: Option<Timestamp>,
    now: Timestamp,
) -> bool {
    if status.is_terminal() {
        completed_at
            .is_some_and(|done| now - done > chrono::Duration::hours(COMPLETED_RETENTION_HOURS))
    } else {
        now - created_at > chrono::Duration::hours(MAX_TASK_AGE_HOURS)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
