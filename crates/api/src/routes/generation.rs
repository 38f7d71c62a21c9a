//! Route definitions for generation submission and polling.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::generation;
use crate::state::AppState;

/// Routes mounted at the API root.
///
/// ```text
/// POST   /generate           -> submit_generation
/// GET    /status/{task_id}   -> get_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(generation::submit_generation))
        .route("/status/{task_id}", get(generation::get_status))
}
