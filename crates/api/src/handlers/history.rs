//! Handler for the authenticated user's generation history.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use imagen_store::models::history::HistoryRecord;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Response body for `GET /history`.
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<HistoryRecord>,
}

/// GET /api/v1/history
///
/// Returns the caller's archived results, newest first. History records
/// outlive task expiry, so completed work remains listable after the
/// task record itself is gone.
pub async fn list_history(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let history = state.store.history(auth.user_id).await?;

    tracing::debug!(
        user_id = %auth.user_id,
        count = history.len(),
        "Fetched generation history",
    );

    Ok(Json(HistoryResponse { history }))
}
