//! Polling cadence constants and the progress-bar heuristic.
//!
//! Progress is purely cosmetic: the server reports no completion fraction,
//! so the client estimates one from the poll attempt count. The estimate
//! is monotonic and saturates below 100% until a terminal status arrives.

use crate::task::TaskStatus;

/// Seconds between status polls.
pub const POLL_INTERVAL_SECS: u64 = 5;

/// Poll attempts before the client gives up (~10 minutes at 5s).
pub const MAX_POLL_ATTEMPTS: u32 = 120;

/// Progress shown as soon as the submission request is accepted.
pub const SUBMITTED_PROGRESS: u8 = 30;

/// Ceiling for the `pending` ramp.
const PENDING_CAP: u32 = 70;

/// Ceiling for the `processing` ramp.
const PROCESSING_CAP: u32 = 85;

/// Estimate display progress for a poll attempt.
///
/// `processing` ramps faster than `pending`, and the result never drops
/// below `previous` even when the status regresses or a poll fails.
pub fn poll_progress(status: TaskStatus, attempt: u32, previous: u8) -> u8 {
    let target: u32 = match status {
        TaskStatus::Completed => 100,
        TaskStatus::Error => previous as u32,
        TaskStatus::Processing => (40 + attempt).min(PROCESSING_CAP),
        TaskStatus::Pending => (30 + attempt / 2).min(PENDING_CAP),
    };
    (target as u8).max(previous)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_ramps_slowly_and_caps() {
        assert_eq!(poll_progress(TaskStatus::Pending, 2, 0), 31);
        assert_eq!(poll_progress(TaskStatus::Pending, 200, 0), 70);
    }

    #[test]
    fn processing_ramps_faster_and_caps() {
        assert_eq!(poll_progress(TaskStatus::Processing, 1, 0), 41);
        assert_eq!(poll_progress(TaskStatus::Processing, 120, 0), 85);
    }

    #[test]
    fn progress_is_monotonic() {
        let mut prev = SUBMITTED_PROGRESS;
        // A processing ramp followed by a regression to pending must not
        // move the bar backwards.
        for attempt in 1..=50 {
            let next = poll_progress(TaskStatus::Processing, attempt, prev);
            assert!(next >= prev);
            prev = next;
        }
        assert_eq!(poll_progress(TaskStatus::Pending, 1, prev), prev);
    }

    #[test]
    fn saturates_below_100_until_completion() {
        let p = poll_progress(TaskStatus::Processing, MAX_POLL_ATTEMPTS, 0);
        assert!(p < 100);
        assert_eq!(poll_progress(TaskStatus::Completed, 1, p), 100);
    }

    #[test]
    fn error_keeps_previous_progress() {
        assert_eq!(poll_progress(TaskStatus::Error, 10, 55), 55);
    }
}
