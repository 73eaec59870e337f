//! Download (access grant) records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An access/entitlement grant to a finished video, independent of the
/// generation workflow that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadRecord {
    /// Ledger row id
    pub download_id: i64,

    /// Payment status, if a payment is attached
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<String>,

    /// Price paid, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,

    /// When the grant was recorded
    pub downloaded_on: DateTime<Utc>,

    /// The video this grant refers to
    pub video_id: i64,
}

/// Input for recording a new download grant.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDownload {
    pub video_id: i64,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
}
