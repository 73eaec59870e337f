//! Catalogued video records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::generation::GenerationId;
use crate::owner::OwnerRef;

/// A finished, catalogued video.
///
/// A record exists only after the artifact bytes are durably on disk;
/// `video_url` is the file name under the artifact root. Records are never
/// mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Catalog row id
    pub video_id: i64,

    /// Artifact file name (e.g. `abc123.mp4`)
    pub video_url: String,

    /// External generation identifier, unique across the catalog
    pub generation_id: GenerationId,

    /// Creation timestamp
    pub generated_on: DateTime<Utc>,

    /// Owning entity
    #[serde(flatten)]
    pub owner: OwnerRef,
}

/// Input for catalog creation, produced by the orchestrator once the
/// artifact write has succeeded.
#[derive(Debug, Clone)]
pub struct NewVideo {
    pub video_url: String,
    pub generation_id: GenerationId,
    pub owner: OwnerRef,
}

/// Owning image, as returned by the lineage read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSummary {
    pub image_id: i64,
    pub image_url: String,
    pub user_id: i64,
}

/// Owning user, as returned by the lineage read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub user_id: i64,
    pub email_address: String,
}

/// Enriched read: a video joined with its owning image and that image's
/// owning user, saving the caller two round trips.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoLineage {
    pub video: VideoRecord,
    pub image: ImageSummary,
    pub user: UserSummary,
}
