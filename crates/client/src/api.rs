//! Typed HTTP wrapper for the imagen server API.

use std::time::Duration;

use serde::Deserialize;

use imagen_core::task::TaskStatus;
use imagen_core::types::{TaskId, Timestamp};

/// Timeout for a single API request. Generation itself is not bounded by
/// this; the poll loop owns the overall budget.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Error type for API client failures.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("Server returned HTTP {status}: {message}")]
    Api { status: u16, message: String },
}

/// Response to a submission request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub task_id: TaskId,
    pub status: TaskStatus,
}

/// Snapshot of a task from the status endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskState {
    pub task_id: TaskId,
    pub status: TaskStatus,
    pub result_payload: Option<String>,
    pub error_detail: Option<String>,
    pub created_at: Timestamp,
}

/// One archived generation from the history endpoint.
#[derive(Debug, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub task_id: TaskId,
    pub prompt: String,
    pub result_payload: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    history: Vec<HistoryEntry>,
}

/// Thin typed client over the server's HTTP surface.
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl ApiClient {
    /// Create a client for the server at `base_url` (no trailing slash
    /// needed). `token` authenticates submission and history calls.
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("imagen-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to build reqwest HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            http,
        }
    }

    /// POST /api/v1/generate -- submit a prompt, returning the new task id.
    pub async fn generate(&self, prompt: &str) -> Result<SubmitResponse, ClientError> {
        let mut request = self
            .http
            .post(format!("{}/api/v1/generate", self.base_url))
            .json(&serde_json::json!({ "prompt": prompt }));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        Self::check(response).await
    }

    /// GET /api/v1/status/{task_id} -- poll a task's current state.
    pub async fn status(&self, task_id: TaskId) -> Result<TaskState, ClientError> {
        let response = self
            .http
            .get(format!("{}/api/v1/status/{task_id}", self.base_url))
            .send()
            .await?;
        Self::check(response).await
    }

    /// GET /api/v1/history -- the caller's archived results, newest first.
    pub async fn history(&self) -> Result<Vec<HistoryEntry>, ClientError> {
        let mut request = self.http.get(format!("{}/api/v1/history", self.base_url));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let body: HistoryResponse = Self::check(response).await?;
        Ok(body.history)
    }

    /// Deserialize a 2xx body, or surface the server's error message.
    async fn check<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let message = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
            .unwrap_or_else(|| status.to_string());

        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }
}
