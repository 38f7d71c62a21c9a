use std::sync::Arc;

use imagen_store::TaskStore;

use crate::config::ServerConfig;
use crate::engine::Dispatcher;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Task store backend (Postgres or in-memory).
    pub store: Arc<dyn TaskStore>,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Fire-and-forget dispatcher to the external worker.
    pub dispatcher: Arc<Dispatcher>,
}
