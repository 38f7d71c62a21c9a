//! Route definition for the generation history listing.

use axum::routing::get;
use axum::Router;

use crate::handlers::history;
use crate::state::AppState;

/// Routes mounted at the API root.
///
/// ```text
/// GET    /history   -> list_history
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/history", get(history::list_history))
}
