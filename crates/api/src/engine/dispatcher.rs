//! Fire-and-forget dispatch to the external generation worker.
//!
//! [`Dispatcher::spawn`] detaches a Tokio task so the submission handler
//! returns to the client without waiting on the worker. The spawned task
//! routes every outcome into the task store: a 2xx handshake moves the
//! task to `processing`, anything else (connect error, timeout, non-2xx)
//! fails it terminally. Dispatch failures are never retried; the client
//! resubmits for a fresh task.

use std::sync::Arc;
use std::time::Duration;

use imagen_core::types::TaskId;
use imagen_store::TaskStore;

/// Timeout for the dispatch handshake. Bounds only the initial request to
/// the worker, not the generation itself (the client's polling budget
/// covers that).
const DISPATCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Error type for dispatch failures.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The worker returned a non-2xx status code.
    #[error("Worker returned HTTP {0}")]
    HttpStatus(u16),
}

/// Hands new tasks to the external worker webhook.
pub struct Dispatcher {
    client: reqwest::Client,
    worker_url: String,
    callback_url: String,
    store: Arc<dyn TaskStore>,
}

impl Dispatcher {
    /// Create a dispatcher with a pre-configured HTTP client.
    ///
    /// The callback URL handed to the worker is derived from
    /// `callback_base_url`; its only correlation key is the task id.
    pub fn new(worker_url: &str, callback_base_url: &str, store: Arc<dyn TaskStore>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DISPATCH_TIMEOUT)
            .user_agent(concat!("imagen/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to build reqwest HTTP client");

        let callback_url = format!(
            "{}/api/v1/webhook/result",
            callback_base_url.trim_end_matches('/')
        );

        Self {
            client,
            worker_url: worker_url.to_string(),
            callback_url,
            store,
        }
    }

    /// Dispatch a task without blocking the caller.
    ///
    /// The submission handler's response cycle never waits on this; all
    /// failures are recorded into task state and observed by the client
    /// on its next status poll.
    pub fn spawn(self: Arc<Self>, task_id: TaskId, prompt: String) {
        tokio::spawn(async move {
            self.dispatch_and_record(task_id, &prompt).await;
        });
    }

    /// Send the dispatch request and fold the outcome into the task store.
    async fn dispatch_and_record(&self, task_id: TaskId, prompt: &str) {
        match self.send(task_id, prompt).await {
            Ok(()) => {
                tracing::info!(%task_id, url = %self.worker_url, "Dispatched task to worker");
                match self.store.mark_processing(task_id).await {
                    Ok(true) => {}
                    Ok(false) => {
                        // The callback can land before the dispatch
                        // response; a task already past `pending` stays
                        // where it is.
                        tracing::debug!(%task_id, "Task no longer pending after dispatch");
                    }
                    Err(e) => {
                        tracing::error!(%task_id, error = %e, "Failed to mark task processing");
                    }
                }
            }
            Err(e) => {
                tracing::warn!(%task_id, error = %e, "Dispatch to worker failed");
                let detail = format!("Failed to dispatch to worker: {e}");
                if let Err(store_err) = self.store.fail(task_id, &detail).await {
                    tracing::error!(
                        %task_id,
                        error = %store_err,
                        "Failed to record dispatch failure",
                    );
                }
            }
        }
    }

    /// Execute the dispatch POST and check the response status.
    async fn send(&self, task_id: TaskId, prompt: &str) -> Result<(), DispatchError> {
        let payload = serde_json::json!({
            "taskId": task_id,
            "prompt": prompt,
            "callbackUrl": self.callback_url,
        });

        let response = self
            .client
            .post(&self.worker_url)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DispatchError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imagen_store::MemoryTaskStore;

    #[test]
    fn callback_url_strips_trailing_slash() {
        let store = Arc::new(MemoryTaskStore::new());
        let d = Dispatcher::new("http://worker/webhook", "http://example.com/", store);
        assert_eq!(d.callback_url, "http://example.com/api/v1/webhook/result");
    }

    #[test]
    fn dispatch_error_display_http_status() {
        let err = DispatchError::HttpStatus(502);
        assert_eq!(err.to_string(), "Worker returned HTTP 502");
    }
}
