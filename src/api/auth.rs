//! Authentication API endpoints
//!
//! - POST /api/auth/login - Admin login, sets the `admin_token` cookie
//! - GET /api/auth/me - Current admin
//! - POST /api/auth/logout - End all sessions of the current admin

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::common::{client_info, ApiJson};
use crate::api::middleware::{
    auth_cookie, clear_auth_cookie, extract_token, no_store_headers, ApiError, AppState,
};
use crate::api::responses::ApiResponse;
use crate::models::AdminUser;
use crate::services::LoginInput;

/// Body of a successful login
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: AdminUser,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/me", get(me))
        .route("/logout", post(logout))
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(body): ApiJson<LoginInput>,
) -> Result<Response, ApiError> {
    let outcome = state.auth_service.login(body, client_info(&headers)).await?;

    let cookie = auth_cookie(
        &outcome.token,
        state.auth_service.token_ttl().num_seconds(),
        state.secure_cookies,
    );
    let body = ApiResponse::with_message(
        LoginResponse {
            user: outcome.user,
            token: outcome.token,
            expires_at: outcome.expires_at,
        },
        "Login successful",
    );

    Ok(([(header::SET_COOKIE, cookie)], no_store_headers(), body).into_response())
}

/// GET /api/auth/me
///
/// Checks the token and its session on every call; never cached.
async fn me(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
    let token = extract_token(&headers);
    let user = state.auth_service.current_user(token.as_deref()).await?;
    Ok((no_store_headers(), ApiResponse::ok(user)).into_response())
}

/// POST /api/auth/logout
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
    let token = extract_token(&headers);
    let ended = state.auth_service.logout(token.as_deref()).await?;

    let body = ApiResponse::with_message(
        serde_json::json!({ "sessions_ended": ended }),
        "Logged out",
    );
    Ok((
        [(header::SET_COOKIE, clear_auth_cookie(state.secure_cookies))],
        no_store_headers(),
        body,
    )
        .into_response())
}
