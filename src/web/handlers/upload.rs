//! Token-gated upload handler.

use axum::{
    body::Body,
    extract::{rejection::PathRejection, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::web::dto::{ApiResponse, UploadResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::html::download_href;
use crate::FileAccessError;

/// Declared body length, if the client sent one.
fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

/// PUT /upload/:token/*file_path - Store the request body at a path.
///
/// The token is checked before the filesystem is touched. The upload token is
/// rotated only after the file has been fully written.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    params: Result<Path<(String, String)>, PathRejection>,
    headers: HeaderMap,
    body: Body,
) -> Result<Response, ApiError> {
    let Path((token, file_path)) = params.map_err(ApiError::upload_rejection)?;

    let permit = state.tokens.begin_upload(&token).await.map_err(|e| {
        if matches!(e, FileAccessError::Unauthorized) {
            tracing::warn!("Upload rejected: invalid token");
        }
        ApiError::for_upload(e)
    })?;

    // Checked before any parent directory is created
    let limit = state.catalog.max_upload_bytes();
    if declared_length(&headers).is_some_and(|len| len > limit) {
        return Err(ApiError::for_upload(FileAccessError::PayloadTooLarge(limit)));
    }

    let target = state
        .catalog
        .prepare_upload_target(&file_path)
        .await
        .map_err(ApiError::for_upload)?;

    let writer = state
        .catalog
        .open_writer(&target)
        .await
        .map_err(ApiError::for_upload)?;
    let size = writer
        .write_stream(body.into_data_stream())
        .await
        .map_err(|e| {
            tracing::warn!(path = %target.relative(), error = %e, "Upload aborted");
            ApiError::for_upload(e)
        })?;

    let by_super = permit.is_super();
    permit.complete();

    tracing::info!(
        path = %target.relative(),
        size,
        super_token = by_super,
        "File uploaded"
    );

    let path = target.relative().to_string();
    let location = download_href(&path);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(ApiResponse::new(UploadResponse { path, size })),
    )
        .into_response())
}
