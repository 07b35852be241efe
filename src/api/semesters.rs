//! Semester API endpoints
//!
//! Public:
//! - GET /api/semesters?section= - List semesters
//! - GET /api/semesters/{id} - Get a semester
//!
//! Authenticated (section scoped):
//! - POST /api/semesters
//! - PUT|PATCH|DELETE /api/semesters/{id}
//! - GET /api/admin/semesters?section= - Back-office list

use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::{get, post, put},
    Extension, Router,
};

use crate::api::common::{filter, ApiJson, SectionQuery};
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::{created, ApiResponse, Deleted};
use crate::models::{CreateSemesterInput, Semester, UpdateSemesterInput};

pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/semesters", get(list_semesters))
        .route("/semesters/{id}", get(get_semester))
}

pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/semesters", post(create_semester))
        .route(
            "/semesters/{id}",
            put(update_semester)
                .patch(update_semester)
                .delete(delete_semester),
        )
        .route("/admin/semesters", get(list_semesters_admin))
}

/// GET /api/semesters
async fn list_semesters(
    State(state): State<AppState>,
    Query(query): Query<SectionQuery>,
) -> Result<ApiResponse<Vec<Semester>>, ApiError> {
    let semesters = state.semester_service.list(filter(&query.section)).await?;
    Ok(ApiResponse::ok(semesters))
}

/// GET /api/semesters/{id}
async fn get_semester(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Semester>, ApiError> {
    Ok(ApiResponse::ok(state.semester_service.get(&id).await?))
}

/// GET /api/admin/semesters
async fn list_semesters_admin(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Query(query): Query<SectionQuery>,
) -> Result<ApiResponse<Vec<Semester>>, ApiError> {
    let semesters = state
        .semester_service
        .list_for_admin(&user, filter(&query.section))
        .await?;
    Ok(ApiResponse::ok(semesters))
}

/// POST /api/semesters
async fn create_semester(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    ApiJson(body): ApiJson<CreateSemesterInput>,
) -> Result<Response, ApiError> {
    let semester = state.semester_service.create(&user, body).await?;
    Ok(created(semester))
}

/// PUT|PATCH /api/semesters/{id}
async fn update_semester(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateSemesterInput>,
) -> Result<ApiResponse<Semester>, ApiError> {
    let semester = state.semester_service.update(&user, &id, body).await?;
    Ok(ApiResponse::ok(semester))
}

/// DELETE /api/semesters/{id}
///
/// Courses, topics and their content go with it.
async fn delete_semester(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Deleted>, ApiError> {
    state.semester_service.delete(&user, &id).await?;
    Ok(ApiResponse::with_message(Deleted { id }, "Semester deleted"))
}
