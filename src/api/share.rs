//! Share link endpoint
//!
//! GET /api/share?type=video&id=abc123 returns the public URL of a content item.
//! GET /api/share?url=... resolves a share URL back to its item.

use axum::{
    extract::{Query, State},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::ApiResponse;
use crate::models::ContentType;
use crate::services::{generate_share_url, is_shareable_id, parse_share_url, share_path};

#[derive(Debug, Deserialize)]
pub struct ShareQuery {
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    pub id: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ShareLink {
    pub content_type: ContentType,
    pub id: String,
    pub path: String,
    pub url: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/share", get(share_link))
}

async fn share_link(
    State(state): State<AppState>,
    Query(query): Query<ShareQuery>,
) -> Result<ApiResponse<ShareLink>, ApiError> {
    let (content_type, id) = match (query.content_type, query.id, query.url) {
        (Some(content_type), Some(id), _) => {
            let content_type: ContentType = content_type
                .parse()
                .map_err(|e: anyhow::Error| ApiError::validation_error(e.to_string()))?;
            (content_type, id.trim().to_string())
        }
        (_, _, Some(url)) => {
            let item = parse_share_url(&url)
                .ok_or_else(|| ApiError::validation_error(format!("Not a share URL: {}", url)))?;
            (item.content_type, item.id)
        }
        _ => return Err(ApiError::validation_error("type and id are required")),
    };

    if id.is_empty() {
        return Err(ApiError::validation_error("id is required"));
    }
    if !is_shareable_id(&id) {
        return Err(ApiError::validation_error(
            "id must not contain '/', '?', '#' or whitespace",
        ));
    }

    Ok(ApiResponse::ok(ShareLink {
        path: share_path(content_type, &id),
        url: generate_share_url(&state.public_url, content_type, &id),
        content_type,
        id,
    }))
}
