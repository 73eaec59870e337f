//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur during image preprocessing.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Source image not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("Image decode/encode failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MediaError {
    pub fn invalid_parameters(msg: impl Into<String>) -> Self {
        Self::InvalidParameters(msg.into())
    }
}
