//! Periodic eviction of expired tasks from the ephemeral store.
//!
//! Spawned only when the server runs on the in-memory backend; the
//! durable backend retains tasks and its `evict_expired` is a no-op.
//! Runs on a fixed interval using `tokio::time::interval`, complementing
//! the lazy eviction that happens on lookup.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use imagen_store::TaskStore;

/// How often the retention sweep runs.
const SWEEP_INTERVAL: Duration = Duration::from_secs(3600); // 1 hour

/// Run the task retention sweep loop until `cancel` is triggered.
pub async fn run(store: Arc<dyn TaskStore>, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = SWEEP_INTERVAL.as_secs(),
        "Task retention sweep started"
    );

    let mut interval = tokio::time::interval(SWEEP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Task retention sweep stopping");
                break;
            }
            _ = interval.tick() => {
                match store.evict_expired(Utc::now()).await {
                    Ok(evicted) => {
                        if evicted > 0 {
                            tracing::info!(evicted, "Task retention: evicted expired tasks");
                        } else {
                            tracing::debug!("Task retention: nothing to evict");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Task retention: sweep failed");
                    }
                }
            }
        }
    }
}
