//! Download ledger handlers.

use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use vgen_models::NewDownload;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::respond::{ok_data, ok_message};
use crate::state::AppState;

/// `POST /api/downloads`
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDownloadRequest {
    pub video_id: i64,
    pub payment_status: Option<String>,
    #[validate(range(min = 0.0, message = "price cannot be negative"))]
    pub price: Option<f64>,
}

pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateDownloadRequest>,
) -> ApiResult<Response> {
    req.validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;

    let download = state
        .downloads
        .create(&NewDownload {
            video_id: req.video_id,
            payment_status: req.payment_status,
            price: req.price,
        })
        .await?;

    info!(
        user_id = %user.user_id,
        download_id = download.download_id,
        video_id = download.video_id,
        "Recorded download"
    );

    Ok(ok_data(download))
}

/// `GET /api/downloads/:id`
pub async fn find_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Response> {
    let download = state
        .downloads
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Download not found..."))?;

    Ok(ok_data(download))
}

/// `GET /api/downloads/video/:id`
pub async fn find_by_video(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Response> {
    let downloads = state.downloads.find_by_video(id).await?;
    Ok(ok_data(downloads))
}

/// `PUT /api/downloads/:id`
#[derive(Debug, Deserialize)]
pub struct UpdateDownloadRequest {
    pub payment_status: Option<String>,
}

pub async fn update(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdateDownloadRequest>,
) -> ApiResult<Response> {
    let download = state
        .downloads
        .update_payment_status(id, req.payment_status)
        .await?
        .ok_or_else(|| ApiError::not_found("Download not found..."))?;

    Ok(ok_data(download))
}

/// `DELETE /api/downloads/:id`
pub async fn remove(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Response> {
    if !state.downloads.remove(id).await? {
        return Err(ApiError::not_found("Download not found..."));
    }

    Ok(ok_message("Download removed successfully!"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_price_rejected() {
        let req = CreateDownloadRequest {
            video_id: 1,
            payment_status: None,
            price: Some(-1.0),
        };
        assert!(req.validate().is_err());

        let req = CreateDownloadRequest {
            video_id: 1,
            payment_status: Some("paid".into()),
            price: Some(4.99),
        };
        assert!(req.validate().is_ok());
    }
}
