//! Video API handlers: submission, orchestrated collection, catalog reads.

use std::path::Path as FsPath;

use axum::extract::multipart::Field;
use axum::extract::{Multipart, Path, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use vgen_media::{cover_resize, TargetDimensions};
use vgen_models::OwnerRef;
use vgen_pipeline::PipelineError;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::respond::{ok_data, ok_message};
use crate::state::AppState;

/// Mimetypes the upload boundary admits.
const ALLOWED_IMAGE_TYPES: [&str; 3] = ["image/png", "image/jpg", "image/jpeg"];

struct UploadedImage {
    filename: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

/// `POST /api/videos/generate`: resize the uploaded still and forward it
/// to the generation service.
///
/// The raw external response (status + body, with the embedded generation
/// id) comes back as `data` for any upstream status; only a missing
/// response entirely is an error here.
pub async fn generate(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> ApiResult<Response> {
    let mut image: Option<UploadedImage> = None;
    let mut width: Option<i64> = None;
    let mut height: Option<i64> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("invalid multipart payload: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("image") => {
                let filename = field
                    .file_name()
                    .map(sanitize_filename)
                    .unwrap_or_else(|| "upload.png".to_string());
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::validation(format!("failed to read image field: {e}")))?;
                image = Some(UploadedImage {
                    filename,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            Some("width") => width = Some(dimension_field(field, "width").await?),
            Some("height") => height = Some(dimension_field(field, "height").await?),
            _ => {}
        }
    }

    let image = image.ok_or_else(|| ApiError::validation("Image file is missing..."))?;
    let (width, height) = match (width, height) {
        (Some(w), Some(h)) => (w, h),
        _ => return Err(ApiError::validation("Image parameters are missing...")),
    };

    match image.content_type.as_deref() {
        Some(ct) if ALLOWED_IMAGE_TYPES.contains(&ct) => {}
        other => {
            return Err(ApiError::validation(format!(
                "unsupported image type: {}",
                other.unwrap_or("none")
            )))
        }
    }

    let target = TargetDimensions::new(width, height)?;

    // Land the original next to other uploads; staging keeps its own copy
    // so original cleanup stays independent.
    tokio::fs::create_dir_all(&state.config.image_dir)
        .await
        .map_err(|e| ApiError::internal(format!("failed to create upload dir: {e}")))?;
    let upload_path = state
        .config
        .image_dir
        .join(format!("{}-{}", Uuid::new_v4(), image.filename));
    tokio::fs::write(&upload_path, &image.bytes)
        .await
        .map_err(|e| ApiError::internal(format!("failed to store upload: {e}")))?;

    let staged = cover_resize(&upload_path, target, &state.config.staging_dir).await?;
    let resized = tokio::fs::read(&staged)
        .await
        .map_err(|e| ApiError::internal(format!("failed to read staged image: {e}")))?;

    let outcome = state
        .stability
        .submit(resized, &format!("resized-{}", image.filename))
        .await?;

    metrics::record_submission(outcome.status);
    info!(
        user_id = %user.user_id,
        upstream_status = outcome.status,
        generation_id = outcome.generation_id().unwrap_or("<none>"),
        "Forwarded generation submission"
    );

    Ok(ok_data(outcome))
}

/// `POST /api/videos`: run the orchestrated poll-and-persist for a
/// previously submitted generation.
#[derive(Debug, Deserialize, Validate)]
pub struct CollectRequest {
    #[validate(length(min = 1, message = "generation_id is required"))]
    pub generation_id: String,
    pub owner: OwnerRef,
}

pub async fn collect(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CollectRequest>,
) -> ApiResult<Response> {
    req.validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;

    info!(
        user_id = %user.user_id,
        generation_id = %req.generation_id,
        owner = %req.owner,
        "Starting poll-and-persist"
    );

    match state.orchestrator.run(&req.generation_id, req.owner).await {
        Ok(record) => {
            metrics::record_generation_outcome("ready");
            Ok(ok_data(record))
        }
        Err(e) => {
            metrics::record_generation_outcome(match &e {
                PipelineError::UpstreamTimeout { .. } => "timed_out",
                PipelineError::UpstreamFailed { .. } => "failed",
                PipelineError::DuplicateGeneration(_) => "duplicate",
                _ => "error",
            });
            Err(e.into())
        }
    }
}

/// `GET /api/videos/:id`
pub async fn find_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Response> {
    let video = state
        .catalog
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Video not found..."))?;

    Ok(ok_data(video))
}

/// `GET /api/videos/image/:id`
pub async fn find_by_image(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Response> {
    let videos = state.catalog.find_by_owner(OwnerRef::Image(id)).await?;
    Ok(ok_data(videos))
}

/// `GET /api/videos/user/:id`
pub async fn find_by_user(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Response> {
    let videos = state.catalog.find_by_owner(OwnerRef::User(id)).await?;
    Ok(ok_data(videos))
}

/// `GET /api/videos/image/:id/lineage`: videos joined with the owning
/// image and its owning user.
pub async fn find_lineage(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Response> {
    let lineage = state.catalog.find_lineage_by_image(id).await?;
    Ok(ok_data(lineage))
}

/// `DELETE /api/videos/:id`: the catalog row goes first; only once it is
/// confirmed gone is the artifact removed, and a missing file does not
/// fail the removal.
pub async fn remove(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Response> {
    let Some(video_url) = state.catalog.remove(id).await? else {
        return Err(ApiError::not_found("Video not found..."));
    };

    let artifact = state.config.video_dir.join(&video_url);
    if let Err(e) = state.store.delete(&artifact).await {
        warn!(video_id = id, error = %e, "Row removed but artifact deletion failed");
    }

    Ok(ok_message("Video removed successfully!"))
}

async fn dimension_field(field: Field<'_>, name: &str) -> ApiResult<i64> {
    let text = field
        .text()
        .await
        .map_err(|e| ApiError::validation(format!("failed to read {name}: {e}")))?;
    text.trim()
        .parse()
        .map_err(|_| ApiError::validation(format!("{name} must be an integer")))
}

/// Keep only the final path component of a client-supplied file name.
fn sanitize_filename(name: &str) -> String {
    FsPath::new(name)
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.png".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename_strips_paths() {
        assert_eq!(sanitize_filename("photo.png"), "photo.png");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("dir/photo.png"), "photo.png");
    }

    #[test]
    fn test_collect_request_validation() {
        let req = CollectRequest {
            generation_id: String::new(),
            owner: OwnerRef::Image(1),
        };
        assert!(req.validate().is_err());

        let req = CollectRequest {
            generation_id: "abc123".into(),
            owner: OwnerRef::Image(1),
        };
        assert!(req.validate().is_ok());
    }
}
