//! Download ledger repository.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tracing::info;

use vgen_models::{DownloadRecord, NewDownload};

use crate::error::{DbError, DbResult};
use crate::DbPool;

const SELECT_DOWNLOAD: &str =
    "SELECT download_id, payment_status, price, downloaded_on, video_id FROM downloads";

/// Repository for the `downloads` table.
#[derive(Debug, Clone)]
pub struct DownloadLedger {
    pool: DbPool,
}

#[derive(FromRow)]
struct DownloadRow {
    download_id: i64,
    payment_status: Option<String>,
    price: Option<f64>,
    downloaded_on: DateTime<Utc>,
    video_id: i64,
}

impl From<DownloadRow> for DownloadRecord {
    fn from(row: DownloadRow) -> Self {
        DownloadRecord {
            download_id: row.download_id,
            payment_status: row.payment_status,
            price: row.price,
            downloaded_on: row.downloaded_on,
            video_id: row.video_id,
        }
    }
}

impl DownloadLedger {
    /// Create a ledger backed by the shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Record a new download grant against an existing video.
    pub async fn create(&self, new: &NewDownload) -> DbResult<DownloadRecord> {
        let row: DownloadRow = sqlx::query_as(
            "INSERT INTO downloads (payment_status, price, video_id) \
             VALUES ($1, $2, $3) \
             RETURNING download_id, payment_status, price, downloaded_on, video_id",
        )
        .bind(&new.payment_status)
        .bind(new.price)
        .bind(new.video_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_missing_video(e, new.video_id))?;

        info!(download_id = row.download_id, video_id = row.video_id, "Recorded download");
        Ok(row.into())
    }

    /// Fetch one download by id.
    pub async fn find_by_id(&self, download_id: i64) -> DbResult<Option<DownloadRecord>> {
        let row: Option<DownloadRow> =
            sqlx::query_as(&format!("{SELECT_DOWNLOAD} WHERE download_id = $1"))
                .bind(download_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Into::into))
    }

    /// Fetch all downloads recorded against one video.
    pub async fn find_by_video(&self, video_id: i64) -> DbResult<Vec<DownloadRecord>> {
        let rows: Vec<DownloadRow> =
            sqlx::query_as(&format!("{SELECT_DOWNLOAD} WHERE video_id = $1 ORDER BY download_id"))
                .bind(video_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Update the payment status of one download.
    pub async fn update_payment_status(
        &self,
        download_id: i64,
        payment_status: Option<String>,
    ) -> DbResult<Option<DownloadRecord>> {
        let row: Option<DownloadRow> = sqlx::query_as(
            "UPDATE downloads SET payment_status = $1 WHERE download_id = $2 \
             RETURNING download_id, payment_status, price, downloaded_on, video_id",
        )
        .bind(&payment_status)
        .bind(download_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Delete one download. Returns whether a row was removed.
    pub async fn remove(&self, download_id: i64) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM downloads WHERE download_id = $1")
            .bind(download_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_missing_video(e: sqlx::Error, video_id: i64) -> DbError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_foreign_key_violation() {
            return DbError::not_found(format!("video {video_id}"));
        }
    }
    DbError::Sqlx(e)
}
