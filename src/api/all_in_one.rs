//! All-in-one creator endpoint
//!
//! POST /api/admin/all-in-one creates a semester with its courses, topics,
//! slides, videos and study tools in one transaction.

use axum::{extract::State, routing::post, Extension, Router};

use crate::api::common::ApiJson;
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::ApiResponse;
use crate::models::{AllInOneInput, AllInOneResult};

pub fn router() -> Router<AppState> {
    Router::new().route("/all-in-one", post(create_all_in_one))
}

async fn create_all_in_one(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    ApiJson(body): ApiJson<AllInOneInput>,
) -> Result<ApiResponse<AllInOneResult>, ApiError> {
    let result = state.bulk_service.create_all(&user, body).await?;
    let message = format!(
        "Created semester '{}' with {} courses",
        result.semester.title, result.summary.courses_created
    );
    Ok(ApiResponse::with_message(result, message))
}
