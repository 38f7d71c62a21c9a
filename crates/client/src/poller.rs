//! Cancellable fixed-interval poll loop over the status endpoint.
//!
//! Transient request failures do not abort the loop; they consume attempts
//! like any other poll. After the attempt ceiling the loop reports
//! [`PollOutcome::TimedOut`] -- the server-side task may still complete
//! after the client gives up, which is an accepted limitation of the
//! protocol, not an error.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use imagen_core::progress::{
    poll_progress, MAX_POLL_ATTEMPTS, POLL_INTERVAL_SECS, SUBMITTED_PROGRESS,
};
use imagen_core::task::TaskStatus;
use imagen_core::types::TaskId;

use crate::api::{ApiClient, ClientError};

/// Poll loop tuning.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay between status polls.
    pub interval: Duration,
    /// Attempts before giving up.
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(POLL_INTERVAL_SECS),
            max_attempts: MAX_POLL_ATTEMPTS,
        }
    }
}

/// Terminal result of a poll loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The task completed; `payload` is the base64-encoded result.
    Completed { payload: String },
    /// The task failed server-side.
    Failed { message: String },
    /// No terminal state within the attempt budget.
    TimedOut,
    /// The owning session started a newer submission.
    Cancelled,
}

/// Progress snapshot handed to the caller after every poll.
#[derive(Debug, Clone, Copy)]
pub struct PollProgress {
    pub attempt: u32,
    /// `None` when the poll itself failed.
    pub status: Option<TaskStatus>,
    /// Heuristic display percentage, monotonic and below 100 until
    /// completion.
    pub percent: u8,
}

/// Poll `task_id` until a terminal state, the attempt ceiling, or
/// cancellation.
pub async fn poll_until_terminal(
    api: &ApiClient,
    task_id: TaskId,
    config: &PollConfig,
    cancel: &CancellationToken,
    on_progress: &mut (dyn FnMut(PollProgress) + Send),
) -> PollOutcome {
    let mut percent = SUBMITTED_PROGRESS;

    for attempt in 1..=config.max_attempts {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!(%task_id, attempt, "Poll loop cancelled");
                return PollOutcome::Cancelled;
            }
            _ = tokio::time::sleep(config.interval) => {}
        }

        match api.status(task_id).await {
            Ok(state) => {
                percent = poll_progress(state.status, attempt, percent);
                on_progress(PollProgress {
                    attempt,
                    status: Some(state.status),
                    percent,
                });

                match state.status {
                    TaskStatus::Completed => {
                        return match state.result_payload {
                            Some(payload) => PollOutcome::Completed { payload },
                            None => PollOutcome::Failed {
                                message: "Task completed without a result payload".to_string(),
                            },
                        };
                    }
                    TaskStatus::Error => {
                        return PollOutcome::Failed {
                            message: state
                                .error_detail
                                .unwrap_or_else(|| "Image generation failed".to_string()),
                        };
                    }
                    TaskStatus::Pending | TaskStatus::Processing => {}
                }
            }
            Err(e) => {
                // Transient failure: keep polling, the attempt still counts.
                log_poll_failure(task_id, attempt, &e);
                on_progress(PollProgress {
                    attempt,
                    status: None,
                    percent,
                });
            }
        }
    }

    tracing::warn!(
        %task_id,
        attempts = config.max_attempts,
        "Poll budget exhausted without a terminal state",
    );
    PollOutcome::TimedOut
}

fn log_poll_failure(task_id: TaskId, attempt: u32, error: &ClientError) {
    if attempt % 10 == 0 {
        tracing::warn!(%task_id, attempt, error = %error, "Status poll failing, continuing");
    } else {
        tracing::debug!(%task_id, attempt, error = %error, "Status poll failed, continuing");
    }
}
