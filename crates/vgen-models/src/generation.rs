//! Generation identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a generation identifier fails validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerationIdError {
    #[error("generation id is empty")]
    Empty,
}

/// Opaque identifier issued by the external generation service.
///
/// Correlates a submission with its eventual result. The backend never
/// interprets the contents; it only requires the id to be non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationId(String);

impl GenerationId {
    /// Create from an externally issued string, rejecting blanks.
    pub fn new(s: impl Into<String>) -> Result<Self, GenerationIdError> {
        let s = s.into();
        if s.trim().is_empty() {
            return Err(GenerationIdError::Empty);
        }
        Ok(Self(s))
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The deterministic artifact file name for this generation.
    pub fn artifact_name(&self) -> String {
        format!("{}.mp4", self.0)
    }
}

impl fmt::Display for GenerationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for GenerationId {
    type Error = GenerationIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl TryFrom<&str> for GenerationId {
    type Error = GenerationIdError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}
