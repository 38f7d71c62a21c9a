//! Task Store: persistence for generation tasks and their history.
//!
//! The [`TaskStore`] trait abstracts over two backends:
//! - [`PgTaskStore`]: durable, backed by Postgres via sqlx.
//! - [`MemoryTaskStore`]: ephemeral, in-process, with a 24-hour retention
//!   window for terminal tasks.

use sqlx::postgres::PgPoolOptions;

pub mod error;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repositories;
pub mod store;

pub use error::StoreError;
pub use memory::MemoryTaskStore;
pub use postgres::PgTaskStore;
pub use store::TaskStore;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Verify the database answers a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply any pending migrations embedded at compile time.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
