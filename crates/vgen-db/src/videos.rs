//! Video catalog repository.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tracing::info;

use vgen_models::{
    GenerationId, ImageSummary, NewVideo, OwnerRef, UserSummary, VideoLineage, VideoRecord,
};

use crate::error::{DbError, DbResult};
use crate::DbPool;

const SELECT_VIDEO: &str =
    "SELECT video_id, video_url, generation_id, generated_on, image_id, user_id FROM videos";

/// Repository for the `videos` table.
///
/// The catalog is the only component allowed to write video rows, and the
/// orchestrator is its only creator, so a row always refers to bytes that
/// are already on disk.
#[derive(Debug, Clone)]
pub struct VideoCatalog {
    pool: DbPool,
}

#[derive(FromRow)]
struct VideoRow {
    video_id: i64,
    video_url: String,
    generation_id: String,
    generated_on: DateTime<Utc>,
    image_id: Option<i64>,
    user_id: Option<i64>,
}

impl VideoRow {
    fn into_record(self) -> DbResult<VideoRecord> {
        let owner = OwnerRef::from_column_pair(self.image_id, self.user_id).ok_or_else(|| {
            DbError::Inconsistent(format!("video {} has no single owner", self.video_id))
        })?;
        let generation_id = GenerationId::new(self.generation_id)
            .map_err(|e| DbError::Inconsistent(format!("video {}: {}", self.video_id, e)))?;

        Ok(VideoRecord {
            video_id: self.video_id,
            video_url: self.video_url,
            generation_id,
            generated_on: self.generated_on,
            owner,
        })
    }
}

impl VideoCatalog {
    /// Create a catalog backed by the shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert a new video record.
    ///
    /// The unique index on `generation_id` turns a same-id race into a
    /// `DuplicateGeneration` error for the losing caller.
    pub async fn create(&self, new: &NewVideo) -> DbResult<VideoRecord> {
        let (image_id, user_id) = new.owner.column_pair();

        let row: VideoRow = sqlx::query_as(
            "INSERT INTO videos (video_url, generation_id, image_id, user_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING video_id, video_url, generation_id, generated_on, image_id, user_id",
        )
        .bind(&new.video_url)
        .bind(new.generation_id.as_str())
        .bind(image_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, &new.generation_id))?;

        let record = row.into_record()?;
        info!(
            video_id = record.video_id,
            generation_id = %record.generation_id,
            owner = %record.owner,
            "Catalogued video"
        );
        Ok(record)
    }

    /// Fetch one video by row id.
    pub async fn find_by_id(&self, video_id: i64) -> DbResult<Option<VideoRecord>> {
        let row: Option<VideoRow> =
            sqlx::query_as(&format!("{SELECT_VIDEO} WHERE video_id = $1"))
                .bind(video_id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(VideoRow::into_record).transpose()
    }

    /// Fetch one video by its external generation identifier.
    pub async fn find_by_generation_id(
        &self,
        generation_id: &GenerationId,
    ) -> DbResult<Option<VideoRecord>> {
        let row: Option<VideoRow> =
            sqlx::query_as(&format!("{SELECT_VIDEO} WHERE generation_id = $1"))
                .bind(generation_id.as_str())
                .fetch_optional(&self.pool)
                .await?;

        row.map(VideoRow::into_record).transpose()
    }

    /// Fetch all videos scoped to one owning entity.
    pub async fn find_by_owner(&self, owner: OwnerRef) -> DbResult<Vec<VideoRecord>> {
        let query = match owner {
            OwnerRef::Image(_) => format!("{SELECT_VIDEO} WHERE image_id = $1 ORDER BY video_id"),
            OwnerRef::User(_) => format!("{SELECT_VIDEO} WHERE user_id = $1 ORDER BY video_id"),
        };

        let rows: Vec<VideoRow> = sqlx::query_as(&query)
            .bind(owner.id())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(VideoRow::into_record).collect()
    }

    /// Enriched read for the image-owned variant: each video joined with
    /// its owning image and that image's owning user, one query.
    pub async fn find_lineage_by_image(&self, image_id: i64) -> DbResult<Vec<VideoLineage>> {
        #[derive(FromRow)]
        struct LineageRow {
            video_id: i64,
            video_url: String,
            generation_id: String,
            generated_on: DateTime<Utc>,
            image_id: i64,
            image_url: String,
            user_id: i64,
            email_address: String,
        }

        let rows: Vec<LineageRow> = sqlx::query_as(
            "SELECT v.video_id, v.video_url, v.generation_id, v.generated_on, \
                    i.image_id, i.image_url, u.user_id, u.email_address \
             FROM videos v \
             JOIN images i ON v.image_id = i.image_id \
             JOIN users u ON i.user_id = u.user_id \
             WHERE v.image_id = $1 \
             ORDER BY v.video_id",
        )
        .bind(image_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let generation_id = GenerationId::new(row.generation_id)
                    .map_err(|e| DbError::Inconsistent(format!("video {}: {}", row.video_id, e)))?;
                Ok(VideoLineage {
                    video: VideoRecord {
                        video_id: row.video_id,
                        video_url: row.video_url,
                        generation_id,
                        generated_on: row.generated_on,
                        owner: OwnerRef::Image(row.image_id),
                    },
                    image: ImageSummary {
                        image_id: row.image_id,
                        image_url: row.image_url,
                        user_id: row.user_id,
                    },
                    user: UserSummary {
                        user_id: row.user_id,
                        email_address: row.email_address,
                    },
                })
            })
            .collect()
    }

    /// Delete a video row, returning the stored file name so the caller
    /// can remove the artifact afterwards. Returns `None` when the row
    /// did not exist.
    pub async fn remove(&self, video_id: i64) -> DbResult<Option<String>> {
        let row: Option<(String,)> =
            sqlx::query_as("DELETE FROM videos WHERE video_id = $1 RETURNING video_url")
                .bind(video_id)
                .fetch_optional(&self.pool)
                .await?;

        if row.is_some() {
            info!(video_id, "Removed video from catalog");
        }
        Ok(row.map(|(url,)| url))
    }
}

fn map_unique_violation(e: sqlx::Error, generation_id: &GenerationId) -> DbError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return DbError::DuplicateGeneration(generation_id.to_string());
        }
    }
    DbError::Sqlx(e)
}

// These tests exercise the real constraint behavior and run only against a
// live database (DATABASE_URL), like the workspace's other integration
// tests.
#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool() -> DbPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL for catalog tests");
        let pool = crate::create_pool(&url, 5).await.unwrap();
        crate::run_migrations(&pool).await.unwrap();
        pool
    }

    async fn seed_user(pool: &DbPool, email: &str) -> i64 {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO users (email_address) VALUES ($1) \
             ON CONFLICT (email_address) DO UPDATE SET email_address = EXCLUDED.email_address \
             RETURNING user_id",
        )
        .bind(email)
        .fetch_one(pool)
        .await
        .unwrap();
        id
    }

    fn new_video(generation_id: &str, owner: OwnerRef) -> NewVideo {
        NewVideo {
            video_url: format!("{generation_id}.mp4"),
            generation_id: GenerationId::new(generation_id).unwrap(),
            owner,
        }
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_duplicate_generation_id_single_winner() {
        let pool = test_pool().await;
        let catalog = VideoCatalog::new(pool.clone());
        let user_id = seed_user(&pool, "catalog-test@example.com").await;

        let gen = format!("dup-{}", std::process::id());
        let a = new_video(&gen, OwnerRef::User(user_id));
        let b = new_video(&gen, OwnerRef::User(user_id));

        let (first, second) = tokio::join!(catalog.create(&a), catalog.create(&b));
        let outcomes = [first, second];

        let winners = outcomes.iter().filter(|r| r.is_ok()).count();
        let conflicts = outcomes
            .iter()
            .filter(|r| matches!(r, Err(e) if e.is_duplicate()))
            .count();

        assert_eq!(winners, 1, "exactly one concurrent insert must win");
        assert_eq!(conflicts, 1, "the loser must see DuplicateGeneration");
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_create_and_reads_round_trip() {
        let pool = test_pool().await;
        let catalog = VideoCatalog::new(pool.clone());
        let user_id = seed_user(&pool, "catalog-reads@example.com").await;

        let gen = format!("read-{}", std::process::id());
        let created = catalog
            .create(&new_video(&gen, OwnerRef::User(user_id)))
            .await
            .unwrap();

        let by_id = catalog.find_by_id(created.video_id).await.unwrap().unwrap();
        assert_eq!(by_id.generation_id, created.generation_id);

        let by_gen = catalog
            .find_by_generation_id(&created.generation_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_gen.video_id, created.video_id);

        let owned = catalog.find_by_owner(OwnerRef::User(user_id)).await.unwrap();
        assert!(owned.iter().any(|v| v.video_id == created.video_id));

        let url = catalog.remove(created.video_id).await.unwrap();
        assert_eq!(url.as_deref(), Some(created.video_url.as_str()));
        assert!(catalog.find_by_id(created.video_id).await.unwrap().is_none());
    }
}
