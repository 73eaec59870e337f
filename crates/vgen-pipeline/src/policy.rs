//! Polling policy.

use std::time::Duration;

/// Bounds for the poll loop: how many times to ask, and how long to
/// suspend between asks.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    /// Maximum number of result checks per orchestration
    pub max_attempts: u32,
    /// Fixed delay between consecutive checks
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            interval: Duration::from_secs(5),
        }
    }
}

impl PollPolicy {
    /// Create policy from environment variables, falling back to the
    /// defaults (10 attempts, 5 seconds apart).
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_attempts: std::env::var("GENERATION_POLL_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(defaults.max_attempts),
            interval: std::env::var("GENERATION_POLL_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.interval),
        }
    }
}
