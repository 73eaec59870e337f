//! Pipeline error types.

use thiserror::Error;

use vgen_db::DbError;
use vgen_stability::StabilityError;
use vgen_store::StoreError;

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Terminal outcomes of an orchestration attempt, other than success.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required correlation input was absent or blank.
    #[error("Missing parameters: {0}")]
    MissingParameters(&'static str),

    /// The external service rejected or errored the job. Status and body
    /// are carried verbatim for client-side retry decisions; an explicit
    /// failure is never retried here.
    #[error("Generation {generation_id} failed upstream with status {status}")]
    UpstreamFailed {
        generation_id: String,
        status: u16,
        body: String,
    },

    /// The retry budget ran out while the job was still pending. Distinct
    /// from `UpstreamFailed`: the external job may yet complete, and the
    /// caller can re-initiate.
    #[error("Generation {generation_id} still pending after {attempts} attempts")]
    UpstreamTimeout {
        generation_id: String,
        attempts: u32,
    },

    /// Another orchestration already catalogued this generation.
    #[error("A video for generation {0} already exists")]
    DuplicateGeneration(String),

    /// Transport-level failure talking to the external service.
    #[error(transparent)]
    Upstream(#[from] StabilityError),

    /// The artifact write itself failed; nothing was persisted.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Bytes are on disk but the catalog write failed. The artifact is
    /// left in place and logged; a later successful run overwrites it.
    #[error("Artifact stored but catalog write failed for generation {generation_id}: {source}")]
    Persistence {
        generation_id: String,
        #[source]
        source: DbError,
    },
}
