//! Postgres catalog for the generation backend.
//!
//! Owns the `videos` table (the generation catalog) and the `downloads`
//! ledger. The pool is constructed once at process start and passed down;
//! every query acquires and releases its connection within the call, so
//! nothing is held across the orchestrator's poll waits.

pub mod downloads;
pub mod error;
pub mod videos;

pub use downloads::DownloadLedger;
pub use error::{DbError, DbResult};
pub use videos::VideoCatalog;

use sqlx::postgres::PgPoolOptions;

/// Default connection pool capacity.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 100;

/// Shared connection pool handle.
pub type DbPool = sqlx::PgPool;

/// Create a bounded connection pool from a database URL.
pub async fn create_pool(database_url: &str, max_connections: u32) -> DbResult<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Apply embedded migrations.
pub async fn run_migrations(pool: &DbPool) -> DbResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
