//! Submit-then-poll generation sessions.
//!
//! One session owns at most one live poll loop. Starting a new run cancels
//! the previous run's token before anything else happens, so two loops can
//! never race on progress reporting.

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use imagen_core::progress::SUBMITTED_PROGRESS;
use imagen_core::types::TaskId;

use crate::api::ApiClient;
use crate::poller::{poll_until_terminal, PollConfig, PollOutcome, PollProgress};

/// Terminal result of one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Generation finished; `payload` is the base64-encoded result.
    Succeeded { task_id: TaskId, payload: String },
    /// Submission was rejected or generation failed server-side.
    Failed { message: String },
    /// The poll budget ran out. The server-side task may still finish;
    /// the id is kept so the result stays pollable.
    TimedOut { task_id: TaskId },
    /// A newer submission superseded this run.
    Cancelled,
}

/// A client-side generation driver with single-flight polling.
pub struct GenerationSession {
    api: ApiClient,
    config: PollConfig,
    current: Mutex<Option<CancellationToken>>,
}

impl GenerationSession {
    pub fn new(api: ApiClient, config: PollConfig) -> Self {
        Self {
            api,
            config,
            current: Mutex::new(None),
        }
    }

    /// Submit `prompt` and poll to a terminal outcome.
    ///
    /// Any still-running previous call on this session is cancelled first.
    pub async fn start(
        &self,
        prompt: &str,
        on_progress: &mut (dyn FnMut(PollProgress) + Send),
    ) -> SessionOutcome {
        let cancel = {
            let mut current = self.current.lock().await;
            if let Some(previous) = current.take() {
                tracing::debug!("Cancelling previous poll loop");
                previous.cancel();
            }
            let token = CancellationToken::new();
            *current = Some(token.clone());
            token
        };

        let submitted = match self.api.generate(prompt).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Submission failed");
                return SessionOutcome::Failed {
                    message: e.to_string(),
                };
            }
        };

        let task_id = submitted.task_id;
        tracing::info!(%task_id, "Image generation started");
        on_progress(PollProgress {
            attempt: 0,
            status: Some(submitted.status),
            percent: SUBMITTED_PROGRESS,
        });

        match poll_until_terminal(&self.api, task_id, &self.config, &cancel, on_progress).await {
            PollOutcome::Completed { payload } => SessionOutcome::Succeeded { task_id, payload },
            PollOutcome::Failed { message } => SessionOutcome::Failed { message },
            PollOutcome::TimedOut => SessionOutcome::TimedOut { task_id },
            PollOutcome::Cancelled => SessionOutcome::Cancelled,
        }
    }
}
