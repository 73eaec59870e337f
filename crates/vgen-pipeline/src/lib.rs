//! Poll-and-persist orchestration.
//!
//! Drives a submitted generation from pending to a catalogued video: ask
//! the external service for the result on a fixed cadence, stop early on
//! an explicit failure, persist the bytes, then create the catalog row.

pub mod error;
pub mod orchestrator;
pub mod policy;

pub use error::{PipelineError, PipelineResult};
pub use orchestrator::{GenerationSource, PollOrchestrator, VideoSink};
pub use policy::PollPolicy;
