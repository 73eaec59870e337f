//! API routes.

use axum::middleware;
use axum::routing::{delete, get, post, put};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::health::health;
use crate::handlers::{downloads, videos};
use crate::metrics::track_requests;
use crate::middleware::{cors_layer, request_id, request_logging};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let video_routes = Router::new()
        // Submission and orchestrated collection
        .route("/videos/generate", post(videos::generate))
        .route("/videos", post(videos::collect))
        // Catalog reads
        .route("/videos/image/:id/lineage", get(videos::find_lineage))
        .route("/videos/image/:id", get(videos::find_by_image))
        .route("/videos/user/:id", get(videos::find_by_user))
        .route("/videos/:id", get(videos::find_by_id))
        .route("/videos/:id", delete(videos::remove));

    let download_routes = Router::new()
        .route("/downloads", post(downloads::create))
        .route("/downloads/video/:id", get(downloads::find_by_video))
        .route("/downloads/:id", get(downloads::find_by_id))
        .route("/downloads/:id", put(downloads::update))
        .route("/downloads/:id", delete(downloads::remove));

    let health_routes = Router::new().route("/health", get(health));

    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .nest("/api", video_routes.merge(download_routes))
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(track_requests))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
