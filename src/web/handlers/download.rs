//! File download handler.

use axum::{
    body::Body,
    extract::{rejection::PathRejection, Path, State},
    http::header,
    response::Response,
};
use std::sync::Arc;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Generate a safe Content-Disposition header value for file downloads.
///
/// Control characters (CR and LF included) are dropped, quotes and
/// backslashes are replaced, and non-ASCII names get an RFC 5987
/// `filename*` parameter.
pub(crate) fn content_disposition_header(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            _ => c,
        })
        .collect();

    if filename.is_ascii() && sanitized == filename {
        return format!("attachment; filename=\"{}\"", filename);
    }

    // Plain parameter must stay ASCII
    let fallback: String = sanitized
        .chars()
        .map(|c| if c.is_ascii() { c } else { '_' })
        .collect();
    let encoded = urlencoding::encode(filename);

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback, encoded
    )
}

/// GET /download/*file_path - Stream a file.
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    file_path: Result<Path<String>, PathRejection>,
) -> Result<Response<Body>, ApiError> {
    let Path(file_path) = file_path.map_err(ApiError::read_rejection)?;
    let resolved = state.catalog.resolve_download(&file_path).await?;

    let file = File::open(resolved.as_path()).await.map_err(|e| {
        tracing::error!("Failed to open file: {}", e);
        ApiError::internal("Failed to open file")
    })?;
    let size = file
        .metadata()
        .await
        .map_err(|e| {
            tracing::error!("Failed to read file metadata: {}", e);
            ApiError::internal("Failed to open file")
        })?
        .len();

    let filename = resolved.file_name().unwrap_or("download");
    let content_type = mime_guess::from_path(filename)
        .first_or_octet_stream()
        .to_string();

    tracing::debug!(path = %resolved.relative(), size, "Serving download");

    Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(filename),
        )
        .header(header::CONTENT_LENGTH, size)
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })
}
