/// Error type shared by all [`TaskStore`](crate::TaskStore) backends.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Rejected input (empty prompt).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The Postgres backend failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The backing store cannot be reached.
    #[error("Task store unavailable: {0}")]
    Unavailable(String),
}
