//! Study tool API endpoints
//!
//! - GET /api/study-tools?course_id=, GET /api/study-tools/{id}
//! - POST /api/study-tools, PUT|PATCH|DELETE /api/study-tools/{id}

use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::{get, post, put},
    Extension, Router,
};

use crate::api::common::{filter, ApiJson, CourseQuery};
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::{created, ApiResponse, Deleted};
use crate::models::{CreateStudyToolInput, StudyTool, UpdateStudyToolInput};

pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/study-tools", get(list_study_tools))
        .route("/study-tools/{id}", get(get_study_tool))
}

pub fn protected_router() -> Router<AppState> {
    Router::new().route("/study-tools", post(create_study_tool)).route(
        "/study-tools/{id}",
        put(update_study_tool)
            .patch(update_study_tool)
            .delete(delete_study_tool),
    )
}

async fn list_study_tools(
    State(state): State<AppState>,
    Query(query): Query<CourseQuery>,
) -> Result<ApiResponse<Vec<StudyTool>>, ApiError> {
    let tools = state.study_tool_service.list(filter(&query.course_id)).await?;
    Ok(ApiResponse::ok(tools))
}

async fn get_study_tool(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<StudyTool>, ApiError> {
    Ok(ApiResponse::ok(state.study_tool_service.get(&id).await?))
}

async fn create_study_tool(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    ApiJson(body): ApiJson<CreateStudyToolInput>,
) -> Result<Response, ApiError> {
    Ok(created(state.study_tool_service.create(&user, body).await?))
}

async fn update_study_tool(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateStudyToolInput>,
) -> Result<ApiResponse<StudyTool>, ApiError> {
    Ok(ApiResponse::ok(
        state.study_tool_service.update(&user, &id, body).await?,
    ))
}

async fn delete_study_tool(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Deleted>, ApiError> {
    state.study_tool_service.delete(&user, &id).await?;
    Ok(ApiResponse::with_message(Deleted { id }, "Study tool deleted"))
}
