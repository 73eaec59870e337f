//! Artifact persistence.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};

use vgen_models::GenerationId;

use crate::error::{StoreError, StoreResult};

/// On-disk store for finished videos, rooted at a single directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at `root`. The directory is created lazily
    /// on the first write, not here.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The path an artifact for `generation_id` lives at, whether or not
    /// it exists yet.
    pub fn path_for(&self, generation_id: &GenerationId) -> PathBuf {
        self.root.join(generation_id.artifact_name())
    }

    /// Persist the video bytes for a generation.
    ///
    /// The file name is derived solely from the generation identifier, so
    /// saving twice for the same id overwrites the same file. Returns the
    /// stored path.
    pub async fn save(&self, generation_id: &GenerationId, bytes: &[u8]) -> StoreResult<PathBuf> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|source| StoreError::WriteFailed {
                path: self.root.clone(),
                source,
            })?;

        let path = self.path_for(generation_id);
        fs::write(&path, bytes)
            .await
            .map_err(|source| StoreError::WriteFailed {
                path: path.clone(),
                source,
            })?;

        info!(
            generation_id = %generation_id,
            path = %path.display(),
            size = bytes.len(),
            "Stored video artifact"
        );

        Ok(path)
    }

    /// Best-effort artifact removal.
    ///
    /// Returns `true` if a file was deleted, `false` if nothing was there;
    /// absence is a logged no-op, not an error.
    pub async fn delete(&self, path: impl AsRef<Path>) -> StoreResult<bool> {
        let path = path.as_ref();

        match fs::remove_file(path).await {
            Ok(()) => {
                info!(path = %path.display(), "Deleted video artifact");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Artifact already absent, nothing to delete");
                Ok(false)
            }
            Err(source) => Err(StoreError::DeleteFailed {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gen_id(s: &str) -> GenerationId {
        GenerationId::new(s).unwrap()
    }

    #[tokio::test]
    async fn test_save_uses_deterministic_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("videos"));

        let path = store.save(&gen_id("abc123"), b"video-bytes").await.unwrap();
        assert_eq!(path.file_name().unwrap(), "abc123.mp4");
        assert_eq!(std::fs::read(&path).unwrap(), b"video-bytes");
    }

    #[tokio::test]
    async fn test_save_twice_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("videos"));
        let id = gen_id("abc123");

        store.save(&id, b"first").await.unwrap();
        let path = store.save(&id, b"second").await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path().join("videos"))
            .unwrap()
            .collect();
        assert_eq!(entries.len(), 1, "same id must not duplicate files");
        assert_eq!(std::fs::read(&path).unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_delete_missing_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        let deleted = store.delete(dir.path().join("nope.mp4")).await.unwrap();
        assert!(!deleted);
    }

    #[tokio::test]
    async fn test_delete_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let path = store.save(&gen_id("gone"), b"x").await.unwrap();

        assert!(store.delete(&path).await.unwrap());
        assert!(!path.exists());
    }
}
