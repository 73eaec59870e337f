//! Catalog error types.

use thiserror::Error;

/// Result type for catalog operations.
pub type DbResult<T> = Result<T, DbError>;

/// Errors that can occur during catalog operations.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// The unique index on `generation_id` rejected an insert. This is the
    /// sole concurrency-safety mechanism for two orchestrator runs racing
    /// on the same external job; the loser lands here.
    #[error("A video for generation {0} already exists")]
    DuplicateGeneration(String),

    /// A row violated the single-owner shape (both or neither owner column
    /// set). The CHECK constraint makes this unreachable through this
    /// crate's own writes.
    #[error("Inconsistent row: {0}")]
    Inconsistent(String),

    #[error("Migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

impl DbError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, DbError::DuplicateGeneration(_))
    }
}
