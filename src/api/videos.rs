//! Video API endpoints
//!
//! - GET /api/videos?topic_id=, GET /api/videos/{id}
//! - POST /api/videos, PUT|PATCH|DELETE /api/videos/{id}

use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::{get, post, put},
    Extension, Router,
};

use crate::api::common::{filter, ApiJson, TopicQuery};
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::{created, ApiResponse, Deleted};
use crate::models::{CreateVideoInput, UpdateVideoInput, Video};

pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/videos", get(list_videos))
        .route("/videos/{id}", get(get_video))
}

pub fn protected_router() -> Router<AppState> {
    Router::new().route("/videos", post(create_video)).route(
        "/videos/{id}",
        put(update_video).patch(update_video).delete(delete_video),
    )
}

async fn list_videos(
    State(state): State<AppState>,
    Query(query): Query<TopicQuery>,
) -> Result<ApiResponse<Vec<Video>>, ApiError> {
    let videos = state.video_service.list(filter(&query.topic_id)).await?;
    Ok(ApiResponse::ok(videos))
}

async fn get_video(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Video>, ApiError> {
    Ok(ApiResponse::ok(state.video_service.get(&id).await?))
}

async fn create_video(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    ApiJson(body): ApiJson<CreateVideoInput>,
) -> Result<Response, ApiError> {
    Ok(created(state.video_service.create(&user, body).await?))
}

async fn update_video(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateVideoInput>,
) -> Result<ApiResponse<Video>, ApiError> {
    Ok(ApiResponse::ok(state.video_service.update(&user, &id, body).await?))
}

async fn delete_video(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Deleted>, ApiError> {
    state.video_service.delete(&user, &id).await?;
    Ok(ApiResponse::with_message(Deleted { id }, "Video deleted"))
}
