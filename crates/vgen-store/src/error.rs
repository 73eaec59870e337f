//! Storage error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while persisting or removing artifacts.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The storage medium rejected the write (disk full, permissions).
    /// Fatal to the orchestration attempt; the caller decides whether to
    /// surface it or re-run the whole job.
    #[error("Failed to write artifact {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to delete artifact {path}: {source}")]
    DeleteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
