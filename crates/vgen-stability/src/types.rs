//! Wire-level outcomes of generation service calls.

use serde::Serialize;

/// Raw result of a submission call.
///
/// The external API encodes "accepted" as a non-error status, so the raw
/// status and body are handed back on every response and the caller
/// inspects them; transport-level success is not job-level success.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitOutcome {
    /// HTTP status the service answered with
    pub status: u16,
    /// Response body; JSON when the service sent JSON, a plain string otherwise
    pub body: serde_json::Value,
}

impl SubmitOutcome {
    /// The generation identifier embedded in an accepted response.
    pub fn generation_id(&self) -> Option<&str> {
        self.body.get("id").and_then(|v| v.as_str())
    }
}

/// Outcome of a single status/result check for one generation.
#[derive(Debug, Clone)]
pub enum GenerationPoll {
    /// 202: the job is still running
    Pending,
    /// 200: finished, with the video bytes
    Ready(Vec<u8>),
    /// Any other status: the service rejected or errored the job
    Failed { status: u16, body: String },
}

impl GenerationPoll {
    pub fn is_pending(&self) -> bool {
        matches!(self, GenerationPoll::Pending)
    }
}
