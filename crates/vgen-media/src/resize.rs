//! Cover-fit resizing of uploaded stills.

use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use tokio::fs;
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Validated target dimensions for a generation submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetDimensions {
    width: u32,
    height: u32,
}

impl TargetDimensions {
    /// Validate raw request values. Both sides must be positive.
    pub fn new(width: i64, height: i64) -> MediaResult<Self> {
        if width <= 0 || height <= 0 {
            return Err(MediaError::invalid_parameters(format!(
                "width and height must be positive, got {}x{}",
                width, height
            )));
        }
        Ok(Self {
            width: width as u32,
            height: height as u32,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Resize `source` to exactly `target` using a cover fit and stage the
/// result as a PNG next to neither the original nor the final artifacts.
///
/// Cover fit fills the whole target box, cropping overflow while keeping
/// the aspect ratio; the output is never letterboxed or distorted. The
/// staging directory is created on first use and the original file is left
/// untouched, so upload cleanup can run independently.
///
/// Returns the path of the staged image.
pub async fn cover_resize(
    source: impl AsRef<Path>,
    target: TargetDimensions,
    staging_dir: impl AsRef<Path>,
) -> MediaResult<PathBuf> {
    let source = source.as_ref().to_path_buf();
    let staging_dir = staging_dir.as_ref().to_path_buf();

    if !fs::try_exists(&source).await.unwrap_or(false) {
        return Err(MediaError::SourceNotFound(source));
    }

    fs::create_dir_all(&staging_dir).await?;

    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    let staged = staging_dir.join(format!("resized-{}.png", stem));

    // Decode, resample and encode are CPU-bound; keep them off the runtime.
    let output = staged.clone();
    tokio::task::spawn_blocking(move || -> MediaResult<()> {
        let img = image::open(&source)?;
        let resized = img.resize_to_fill(target.width, target.height, FilterType::Lanczos3);
        resized.save(&output)?;
        Ok(())
    })
    .await
    .map_err(|e| MediaError::Internal(format!("resize task panicked: {}", e)))??;

    debug!(
        staged = %staged.display(),
        width = target.width,
        height = target.height,
        "Staged resized image"
    );

    Ok(staged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GenericImageView, Rgb, RgbImage};

    fn write_test_image(path: &Path, width: u32, height: u32) {
        let mut img = RgbImage::new(width, height);
        // Left half red, right half blue, so cropping is observable.
        for (x, _, pixel) in img.enumerate_pixels_mut() {
            *pixel = if x < width / 2 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            };
        }
        DynamicImage::ImageRgb8(img).save(path).unwrap();
    }

    #[test]
    fn test_rejects_non_positive_dimensions() {
        assert!(TargetDimensions::new(0, 512).is_err());
        assert!(TargetDimensions::new(512, 0).is_err());
        assert!(TargetDimensions::new(-1, 512).is_err());
        assert!(TargetDimensions::new(512, 512).is_ok());
    }

    #[tokio::test]
    async fn test_cover_resize_is_exact_and_cropped() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("photo.png");
        write_test_image(&source, 800, 600);

        let staging = dir.path().join("staging");
        let target = TargetDimensions::new(512, 512).unwrap();
        let staged = cover_resize(&source, target, &staging).await.unwrap();

        assert_eq!(staged, staging.join("resized-photo.png"));

        let out = image::open(&staged).unwrap();
        // Exactly the target box, no letterboxing.
        assert_eq!(out.dimensions(), (512, 512));
        // Cover crops the 800px width down to the central 600px band, so
        // both halves of the source survive at the output edges.
        let left = out.get_pixel(0, 256);
        let right = out.get_pixel(511, 256);
        assert!(left[0] > left[2], "left edge should stay red");
        assert!(right[2] > right[0], "right edge should stay blue");
    }

    #[tokio::test]
    async fn test_staging_dir_created_lazily_and_original_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("photo.png");
        write_test_image(&source, 400, 400);
        let original_len = std::fs::metadata(&source).unwrap().len();

        let staging = dir.path().join("deep").join("staging");
        assert!(!staging.exists());

        let target = TargetDimensions::new(256, 256).unwrap();
        cover_resize(&source, target, &staging).await.unwrap();
        assert!(staging.exists());

        // Running again reuses the directory.
        cover_resize(&source, target, &staging).await.unwrap();

        assert_eq!(std::fs::metadata(&source).unwrap().len(), original_len);
    }

    #[tokio::test]
    async fn test_missing_source_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let target = TargetDimensions::new(64, 64).unwrap();
        let err = cover_resize(dir.path().join("absent.png"), target, dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::SourceNotFound(_)));
    }
}
