//! Generation client error types.

use thiserror::Error;

pub type StabilityResult<T> = Result<T, StabilityError>;

#[derive(Debug, Error)]
pub enum StabilityError {
    /// No transport response at all; the service is down or unroutable.
    /// Surfaced to clients as a gateway failure, never a generic error.
    #[error("Generation service unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    #[error("Failed to read response body: {0}")]
    Body(#[source] reqwest::Error),

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl StabilityError {
    pub fn is_unreachable(&self) -> bool {
        matches!(self, StabilityError::Unreachable(_))
    }
}
