//! Course API endpoints
//!
//! - GET /api/courses?semester_id= - List courses
//! - GET /api/courses/{id} - Course with its semester, topics and study tools
//! - POST /api/courses, PUT|PATCH|DELETE /api/courses/{id} - Authenticated writes

use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::{get, post, put},
    Extension, Router,
};

use crate::api::common::{filter, ApiJson, SemesterQuery};
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::{created, ApiResponse, Deleted};
use crate::models::{Course, CourseDetail, CreateCourseInput, UpdateCourseInput};

pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/courses", get(list_courses))
        .route("/courses/{id}", get(get_course))
}

pub fn protected_router() -> Router<AppState> {
    Router::new().route("/courses", post(create_course)).route(
        "/courses/{id}",
        put(update_course).patch(update_course).delete(delete_course),
    )
}

async fn list_courses(
    State(state): State<AppState>,
    Query(query): Query<SemesterQuery>,
) -> Result<ApiResponse<Vec<Course>>, ApiError> {
    let courses = state.course_service.list(filter(&query.semester_id)).await?;
    Ok(ApiResponse::ok(courses))
}

async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<CourseDetail>, ApiError> {
    Ok(ApiResponse::ok(state.course_service.detail(&id).await?))
}

async fn create_course(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    ApiJson(body): ApiJson<CreateCourseInput>,
) -> Result<Response, ApiError> {
    Ok(created(state.course_service.create(&user, body).await?))
}

async fn update_course(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateCourseInput>,
) -> Result<ApiResponse<Course>, ApiError> {
    Ok(ApiResponse::ok(state.course_service.update(&user, &id, body).await?))
}

async fn delete_course(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Deleted>, ApiError> {
    state.course_service.delete(&user, &id).await?;
    Ok(ApiResponse::with_message(Deleted { id }, "Course deleted"))
}
