//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::{error, warn};

use vgen_db::DbError;
use vgen_media::MediaError;
use vgen_pipeline::PipelineError;
use vgen_stability::StabilityError;

use crate::respond::Envelope;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Bounded polling ran out while the external job was still pending.
    /// A valid intermediate state, answered 202; the client re-initiates.
    #[error("Generation still pending after {attempts} attempts")]
    GenerationPending { attempts: u32 },

    /// The external service rejected or errored the job; its status and
    /// body are passed through for the client's retry decision.
    #[error("Response {status}: {body}")]
    UpstreamFailed { status: u16, body: String },

    /// No transport response from the external service at all.
    #[error("No response from the generation service: {0}")]
    UpstreamUnavailable(String),

    #[error("Persistence failed: {0}")]
    Persistence(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Db(DbError),
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::GenerationPending { .. } => StatusCode::ACCEPTED,
            ApiError::UpstreamFailed { .. } | ApiError::UpstreamUnavailable(_) => {
                StatusCode::BAD_GATEWAY
            }
            ApiError::Persistence(_) | ApiError::Internal(_) | ApiError::Db(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(what) => ApiError::NotFound(what),
            DbError::DuplicateGeneration(id) => {
                ApiError::Conflict(format!("A video for generation {id} already exists"))
            }
            other => ApiError::Db(other),
        }
    }
}

impl From<MediaError> for ApiError {
    fn from(e: MediaError) -> Self {
        match e {
            MediaError::InvalidParameters(msg) => ApiError::Validation(msg),
            MediaError::SourceNotFound(path) => {
                ApiError::Validation(format!("source image not found: {}", path.display()))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<StabilityError> for ApiError {
    fn from(e: StabilityError) -> Self {
        match e {
            StabilityError::Unreachable(e) => ApiError::UpstreamUnavailable(e.to_string()),
            StabilityError::Body(e) => ApiError::UpstreamUnavailable(e.to_string()),
            StabilityError::Config(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::MissingParameters(what) => {
                ApiError::Validation(format!("missing parameter: {what}"))
            }
            PipelineError::UpstreamFailed { status, body, .. } => {
                ApiError::UpstreamFailed { status, body }
            }
            PipelineError::UpstreamTimeout { attempts, .. } => {
                ApiError::GenerationPending { attempts }
            }
            PipelineError::DuplicateGeneration(id) => {
                ApiError::Conflict(format!("A video for generation {id} already exists"))
            }
            PipelineError::Upstream(e) => e.into(),
            PipelineError::Store(e) => ApiError::Persistence(e.to_string()),
            PipelineError::Persistence { source, .. } => ApiError::Persistence(source.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            // Still running; the envelope stays positive.
            ApiError::GenerationPending { .. } => {
                Envelope::message(1, "Video generation in process.")
            }
            ApiError::Unauthorized(_)
            | ApiError::NotFound(_)
            | ApiError::Validation(_)
            | ApiError::Conflict(_) => Envelope::message(0, self.to_string()),
            _ => Envelope::error(self.to_string()),
        };

        if status.is_server_error() {
            error!(status = %status, "{}", self);
        } else if status != StatusCode::ACCEPTED {
            warn!(status = %status, "{}", self);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_error_mapping() {
        let e: ApiError = PipelineError::UpstreamTimeout {
            generation_id: "abc".into(),
            attempts: 10,
        }
        .into();
        assert_eq!(e.status_code(), StatusCode::ACCEPTED);

        let e: ApiError = PipelineError::UpstreamFailed {
            generation_id: "abc".into(),
            status: 500,
            body: "boom".into(),
        }
        .into();
        assert_eq!(e.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(e.to_string(), "Response 500: boom");

        let e: ApiError = PipelineError::DuplicateGeneration("abc".into()).into();
        assert_eq!(e.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_db_error_mapping() {
        let e: ApiError = DbError::not_found("video 9").into();
        assert_eq!(e.status_code(), StatusCode::NOT_FOUND);

        let e: ApiError = DbError::DuplicateGeneration("abc".into()).into();
        assert_eq!(e.status_code(), StatusCode::CONFLICT);
    }
}
