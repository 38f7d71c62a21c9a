pub mod callback;
pub mod generation;
pub mod health;
pub mod history;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /generate            submit a generation task (POST, auth)
/// /status/{task_id}    poll task state (GET, public)
/// /webhook/result      worker result callback (POST, public)
/// /history             caller's archived results (GET, auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(generation::router())
        .merge(callback::router())
        .merge(history::router())
}
