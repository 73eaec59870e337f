//! Generation service HTTP client.
//!
//! Wraps the external image-to-video API: submit a prepared still and
//! check a generation for completion. The caller owns all status
//! interpretation; this crate only distinguishes "got a response" from
//! "no response at all".

pub mod client;
pub mod error;
pub mod types;

pub use client::{StabilityClient, StabilityConfig};
pub use error::{StabilityError, StabilityResult};
pub use types::{GenerationPoll, SubmitOutcome};
