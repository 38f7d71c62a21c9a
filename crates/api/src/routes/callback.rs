//! Route definition for the worker result callback.

use axum::routing::post;
use axum::Router;

use crate::handlers::callback;
use crate::state::AppState;

/// Routes mounted at the API root.
///
/// ```text
/// POST   /webhook/result   -> result_callback
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/webhook/result", post(callback::result_callback))
}
