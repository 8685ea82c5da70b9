//! Router configuration.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, put},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{services::ServeFile, trace::TraceLayer};

use super::error::ApiError;
use super::handlers::{browse_page, download_file, list_entries, upload_file, AppState};
use super::middleware::{make_request_span, security_headers};

/// Create the main router.
pub fn create_router(app_state: Arc<AppState>, favicon: impl AsRef<Path>) -> Router {
    // Upload size is enforced while streaming, not by the extractor limit
    let upload_routes = Router::new()
        .route("/upload/:token/*file_path", put(upload_file))
        .layer(DefaultBodyLimit::disable());

    Router::new()
        .route("/", get(browse_page))
        .route("/api/entries", get(list_entries))
        .route("/download/*file_path", get(download_file))
        .merge(upload_routes)
        .route_service("/favicon.ico", ServeFile::new(favicon.as_ref()))
        .with_state(app_state)
        .merge(create_health_router())
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
                .layer(middleware::from_fn(security_headers)),
        )
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Unmatched paths, `/download/` included, get the same 404 as a missing file.
async fn not_found() -> ApiError {
    ApiError::not_found("Not found")
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
