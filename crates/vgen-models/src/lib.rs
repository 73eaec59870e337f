//! Shared data models for the StillMotion generation backend.
//!
//! This crate provides Serde-serializable types for:
//! - Generation identifiers issued by the external service
//! - Owner references (image-owned vs. user-owned deployments)
//! - Catalogued video records and their lineage views
//! - Download (access grant) records

pub mod download;
pub mod generation;
pub mod owner;
pub mod video;

// Re-export common types
pub use download::{DownloadRecord, NewDownload};
pub use generation::{GenerationId, GenerationIdError};
pub use owner::{OwnerKind, OwnerRef};
pub use video::{ImageSummary, NewVideo, UserSummary, VideoLineage, VideoRecord};
