//! Admin user management endpoints
//!
//! Mounted behind `require_auth` + `require_user_manager`:
//! - GET /api/admin/users
//! - POST /api/admin/users
//! - PUT|PATCH /api/admin/users/{id}
//! - DELETE /api/admin/users/{id} (super admin only)

use axum::{
    extract::{Path, State},
    response::Response,
    routing::{get, put},
    Extension, Router,
};

use crate::api::common::ApiJson;
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::{created, ApiResponse, Deleted};
use crate::models::{AdminUser, CreateAdminUserInput, UpdateAdminUserInput};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            put(update_user).patch(update_user).delete(delete_user),
        )
}

async fn list_users(State(state): State<AppState>) -> Result<ApiResponse<Vec<AdminUser>>, ApiError> {
    Ok(ApiResponse::ok(state.admin_user_service.list().await?))
}

async fn create_user(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    ApiJson(body): ApiJson<CreateAdminUserInput>,
) -> Result<Response, ApiError> {
    Ok(created(state.admin_user_service.create(&actor, body).await?))
}

async fn update_user(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateAdminUserInput>,
) -> Result<ApiResponse<AdminUser>, ApiError> {
    let user = state.admin_user_service.update(&actor, &id, body).await?;
    Ok(ApiResponse::ok(user))
}

async fn delete_user(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Deleted>, ApiError> {
    if !actor.is_super_admin() {
        return Err(ApiError::forbidden("Super admin privileges required"));
    }
    state.admin_user_service.delete(&actor, &id).await?;
    Ok(ApiResponse::with_message(Deleted { id }, "Admin user deleted"))
}
