//! Slide API endpoints
//!
//! - GET /api/slides?topic_id=, GET /api/slides/{id}
//! - POST /api/slides, PUT|PATCH|DELETE /api/slides/{id}

use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::{get, post, put},
    Extension, Router,
};

use crate::api::common::{filter, ApiJson, TopicQuery};
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::{created, ApiResponse, Deleted};
use crate::models::{CreateSlideInput, Slide, UpdateSlideInput};

pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/slides", get(list_slides))
        .route("/slides/{id}", get(get_slide))
}

pub fn protected_router() -> Router<AppState> {
    Router::new().route("/slides", post(create_slide)).route(
        "/slides/{id}",
        put(update_slide).patch(update_slide).delete(delete_slide),
    )
}

async fn list_slides(
    State(state): State<AppState>,
    Query(query): Query<TopicQuery>,
) -> Result<ApiResponse<Vec<Slide>>, ApiError> {
    let slides = state.slide_service.list(filter(&query.topic_id)).await?;
    Ok(ApiResponse::ok(slides))
}

async fn get_slide(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Slide>, ApiError> {
    Ok(ApiResponse::ok(state.slide_service.get(&id).await?))
}

async fn create_slide(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    ApiJson(body): ApiJson<CreateSlideInput>,
) -> Result<Response, ApiError> {
    Ok(created(state.slide_service.create(&user, body).await?))
}

async fn update_slide(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateSlideInput>,
) -> Result<ApiResponse<Slide>, ApiError> {
    Ok(ApiResponse::ok(state.slide_service.update(&user, &id, body).await?))
}

async fn delete_slide(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Deleted>, ApiError> {
    state.slide_service.delete(&user, &id).await?;
    Ok(ApiResponse::with_message(Deleted { id }, "Slide deleted"))
}
