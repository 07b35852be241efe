//! Cached content endpoints
//!
//! - GET /api/content/{type}/{id} - Slide, video or study tool via the content cache
//! - GET /api/admin/cache/stats - Content cache statistics
//! - DELETE /api/admin/cache - Clear all caches

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use crate::api::middleware::{cache_control_public, ApiError, AppState};
use crate::api::responses::ApiResponse;
use crate::cache::ContentCacheStats;
use crate::models::ContentType;

pub fn public_router() -> Router<AppState> {
    Router::new().route("/content/{content_type}/{id}", get(get_content))
}

/// Cache administration, mounted under `/admin`
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/cache/stats", get(cache_stats))
        .route("/cache", axum::routing::delete(clear_cache))
}

async fn get_content(
    State(state): State<AppState>,
    Path((content_type, id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let content_type: ContentType = content_type
        .parse()
        .map_err(|e: anyhow::Error| ApiError::validation_error(e.to_string()))?;

    let lookup = state.content_service.get(content_type, &id).await?;
    let x_cache = if lookup.cached { "HIT" } else { "MISS" };

    Ok((
        [
            (header::CACHE_CONTROL, cache_control_public(60)),
            (header::HeaderName::from_static("x-cache"), x_cache.to_string()),
        ],
        ApiResponse::ok(lookup),
    )
        .into_response())
}

async fn cache_stats(State(state): State<AppState>) -> ApiResponse<ContentCacheStats> {
    ApiResponse::ok(state.content_service.stats())
}

async fn clear_cache(State(state): State<AppState>) -> Result<ApiResponse<ContentCacheStats>, ApiError> {
    state.content_service.clear().await?;
    Ok(ApiResponse::with_message(state.content_service.stats(), "Cache cleared"))
}
