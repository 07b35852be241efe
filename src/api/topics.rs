//! Topic API endpoints
//!
//! - GET /api/topics?course_id= - List topics in order
//! - GET /api/topics/{id} - Topic with its slides and videos
//! - POST /api/topics, PUT|PATCH|DELETE /api/topics/{id} - Authenticated writes

use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::{get, post, put},
    Extension, Router,
};

use crate::api::common::{filter, ApiJson, CourseQuery};
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::{created, ApiResponse, Deleted};
use crate::models::{CreateTopicInput, Topic, TopicDetail, UpdateTopicInput};

pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/topics", get(list_topics))
        .route("/topics/{id}", get(get_topic))
}

pub fn protected_router() -> Router<AppState> {
    Router::new().route("/topics", post(create_topic)).route(
        "/topics/{id}",
        put(update_topic).patch(update_topic).delete(delete_topic),
    )
}

async fn list_topics(
    State(state): State<AppState>,
    Query(query): Query<CourseQuery>,
) -> Result<ApiResponse<Vec<Topic>>, ApiError> {
    let topics = state.topic_service.list(filter(&query.course_id)).await?;
    Ok(ApiResponse::ok(topics))
}

async fn get_topic(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<TopicDetail>, ApiError> {
    Ok(ApiResponse::ok(state.topic_service.detail(&id).await?))
}

async fn create_topic(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    ApiJson(body): ApiJson<CreateTopicInput>,
) -> Result<Response, ApiError> {
    Ok(created(state.topic_service.create(&user, body).await?))
}

async fn update_topic(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateTopicInput>,
) -> Result<ApiResponse<Topic>, ApiError> {
    Ok(ApiResponse::ok(state.topic_service.update(&user, &id, body).await?))
}

async fn delete_topic(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Deleted>, ApiError> {
    state.topic_service.delete(&user, &id).await?;
    Ok(ApiResponse::with_message(Deleted { id }, "Topic deleted"))
}
