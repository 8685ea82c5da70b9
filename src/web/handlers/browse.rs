//! Directory browsing handlers.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::web::dto::{ApiResponse, ListingResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::html::ListingTemplate;

/// Query parameters for listing endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct BrowseQuery {
    /// Directory to list, relative to the storage root.
    #[serde(default)]
    pub path: String,
}

/// GET / - Browse a directory as an HTML page.
pub async fn browse_page(
    State(state): State<Arc<AppState>>,
    query: Result<Query<BrowseQuery>, QueryRejection>,
) -> Result<ListingTemplate, ApiError> {
    let Query(query) = query.map_err(ApiError::read_rejection)?;
    let listing = state.catalog.list_directory(&query.path).await?;
    Ok(ListingTemplate::from(&listing))
}

/// GET /api/entries - List a directory as JSON.
pub async fn list_entries(
    State(state): State<Arc<AppState>>,
    query: Result<Query<BrowseQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<ListingResponse>>, ApiError> {
    let Query(query) = query.map_err(ApiError::read_rejection)?;
    let listing = state.catalog.list_directory(&query.path).await?;
    Ok(Json(ApiResponse::new(listing.into())))
}
