//! API middleware
//!
//! Contains:
//! - Shared application state
//! - The JSON error type and its mapping from service errors
//! - Authentication (access token from `Authorization: Bearer` or the
//!   `admin_token` cookie) and role checks
//! - Cookie and cache-control helpers

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::config::Config;
use crate::db::repositories::{
    SqlxAdminUserRepository, SqlxBulkRepository, SqlxCourseRepository, SqlxSemesterRepository,
    SqlxSessionRepository, SqlxSlideRepository, SqlxStudyToolRepository, SqlxTopicRepository,
    SqlxVideoRepository,
};
use crate::db::DynDatabasePool;
use crate::models::{AdminRole, AdminUser};
use crate::services::{
    AdminUserError, AdminUserService, AuthError, AuthService, BulkCreateError, BulkService,
    ContentCaches, ContentError, ContentService, CourseService, SemesterService, SlideService,
    StudyToolService, TokenIssuer, TopicService, VideoService,
};

/// Name of the cookie carrying the access token
pub const AUTH_COOKIE: &str = "admin_token";

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub pool: DynDatabasePool,
    pub auth_service: Arc<AuthService>,
    pub admin_user_service: Arc<AdminUserService>,
    pub semester_service: Arc<SemesterService>,
    pub course_service: Arc<CourseService>,
    pub topic_service: Arc<TopicService>,
    pub slide_service: Arc<SlideService>,
    pub video_service: Arc<VideoService>,
    pub study_tool_service: Arc<StudyToolService>,
    pub bulk_service: Arc<BulkService>,
    pub content_service: Arc<ContentService>,
    /// Origin used to build share URLs
    pub public_url: String,
    /// Adds `Secure` to the auth cookie
    pub secure_cookies: bool,
}

impl AppState {
    /// Wire repositories and services over one pool and shared caches
    pub fn new(pool: DynDatabasePool, config: &Config, caches: ContentCaches) -> Self {
        let semesters = SqlxSemesterRepository::boxed(pool.clone());
        let courses = SqlxCourseRepository::boxed(pool.clone());
        let topics = SqlxTopicRepository::boxed(pool.clone());
        let slides = SqlxSlideRepository::boxed(pool.clone());
        let videos = SqlxVideoRepository::boxed(pool.clone());
        let study_tools = SqlxStudyToolRepository::boxed(pool.clone());
        let users = SqlxAdminUserRepository::boxed(pool.clone());
        let sessions = SqlxSessionRepository::boxed(pool.clone());

        let tokens = TokenIssuer::new(
            &config.auth.jwt_secret,
            chrono::Duration::hours(config.auth.token_ttl_hours),
        );

        Self {
            auth_service: Arc::new(AuthService::new(users.clone(), sessions.clone(), tokens)),
            admin_user_service: Arc::new(AdminUserService::new(users, sessions)),
            semester_service: Arc::new(SemesterService::new(semesters.clone(), caches.clone())),
            course_service: Arc::new(CourseService::new(
                courses.clone(),
                semesters,
                topics.clone(),
                study_tools.clone(),
                caches.clone(),
            )),
            topic_service: Arc::new(TopicService::new(
                topics.clone(),
                courses.clone(),
                slides.clone(),
                videos.clone(),
                caches.clone(),
            )),
            slide_service: Arc::new(SlideService::new(slides.clone(), topics.clone(), caches.clone())),
            video_service: Arc::new(VideoService::new(videos.clone(), topics, caches.clone())),
            study_tool_service: Arc::new(StudyToolService::new(
                study_tools.clone(),
                courses,
                caches.clone(),
            )),
            bulk_service: Arc::new(BulkService::new(
                SqlxBulkRepository::boxed(pool.clone()),
                caches.clone(),
            )),
            content_service: Arc::new(ContentService::new(slides, videos, study_tools, caches)),
            public_url: config.server.public_url.clone(),
            secure_cookies: config.environment.is_production(),
            pool,
        }
    }
}

/// Authenticated admin extracted from request
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub AdminUser);

/// Error response for API errors
///
/// Serialized as `{success: false, error, code, details?}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub success: bool,
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
            code: code.into(),
            details: None,
        }
    }

    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            details: Some(details),
            ..Self::new(code, message)
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("CONFLICT", message)
    }

    /// Log the cause and return a sanitized 500
    pub fn internal(err: &anyhow::Error) -> Self {
        tracing::error!("Internal error: {:#}", err);
        Self::new("INTERNAL_ERROR", "Internal server error")
    }

    pub fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "FORBIDDEN" => StatusCode::FORBIDDEN,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "CONFLICT" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ApiError::unauthorized("Invalid credentials"),
            AuthError::Unauthenticated => ApiError::unauthorized("Authentication required"),
            AuthError::SessionExpired => ApiError::unauthorized("Session expired"),
            AuthError::Forbidden => ApiError::forbidden("Insufficient permissions"),
            AuthError::InternalError(e) => ApiError::internal(&e),
        }
    }
}

impl From<ContentError> for ApiError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::Validation(msg) => ApiError::validation_error(msg),
            ContentError::NotFound(what) => ApiError::not_found(format!("{} not found", what)),
            ContentError::Forbidden(msg) => ApiError::forbidden(msg),
            ContentError::InternalError(e) => ApiError::internal(&e),
        }
    }
}

impl From<AdminUserError> for ApiError {
    fn from(err: AdminUserError) -> Self {
        match err {
            AdminUserError::Validation(msg) => ApiError::validation_error(msg),
            AdminUserError::NotFound(id) => ApiError::not_found(format!("Admin user {} not found", id)),
            AdminUserError::Conflict(email) => {
                ApiError::conflict(format!("Email {} is already registered", email))
            }
            AdminUserError::Forbidden(msg) => ApiError::forbidden(msg),
            AdminUserError::InternalError(e) => ApiError::internal(&e),
        }
    }
}

impl From<BulkCreateError> for ApiError {
    fn from(err: BulkCreateError) -> Self {
        match err {
            BulkCreateError::Validation(msg) => ApiError::validation_error(msg),
            BulkCreateError::Forbidden(msg) => ApiError::forbidden(msg),
            BulkCreateError::Failed { stage, source } => {
                tracing::error!("Bulk creation failed at {}: {:#}", stage, source);
                ApiError::with_details(
                    "BULK_CREATE_FAILED",
                    "Bulk creation failed; no changes were saved",
                    json!({ "rolled_back": true, "stage": stage.as_str() }),
                )
            }
            BulkCreateError::InternalError(e) => ApiError::internal(&e),
        }
    }
}

/// Extract the access token: bearer header first, then the auth cookie
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.trim().to_string());
            }
        }
    }

    let cookie_str = headers.get(header::COOKIE)?.to_str().ok()?;
    cookie_str
        .split(';')
        .filter_map(|cookie| cookie.trim().split_once('='))
        .find(|(name, _)| *name == AUTH_COOKIE)
        .map(|(_, value)| value.to_string())
}

/// Authentication middleware for content editing routes
///
/// Accepts any admin role; section checks happen in the services.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(request.headers());
    let user = state
        .auth_service
        .authorize(token.as_deref(), AdminRole::CONTENT_EDITORS)
        .await?;

    request.extensions_mut().insert(AuthenticatedUser(user));
    Ok(next.run(request).await)
}

/// Role check for user management routes; runs after [`require_auth`]
pub async fn require_user_manager(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !user.0.can_manage_users() {
        return Err(ApiError::forbidden("Admin privileges required"));
    }

    Ok(next.run(request).await)
}

/// `Set-Cookie` value carrying the access token
pub fn auth_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        AUTH_COOKIE, token, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value removing the access token
pub fn clear_auth_cookie(secure: bool) -> String {
    auth_cookie("", 0, secure)
}

/// Headers that stop browsers and proxies from caching a response
pub fn no_store_headers() -> [(HeaderName, &'static str); 3] {
    [
        (header::CACHE_CONTROL, "no-store, no-cache, must-revalidate"),
        (header::PRAGMA, "no-cache"),
        (header::EXPIRES, "0"),
    ]
}

/// Cache-Control value for public read endpoints
pub fn cache_control_public(max_age: u32) -> String {
    format!("public, max-age={}", max_age)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::BulkStage;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_extract_token_from_bearer() {
        let map = headers(&[(header::AUTHORIZATION, "Bearer abc.def.ghi")]);
        assert_eq!(extract_token(&map).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_extract_token_from_cookie() {
        let map = headers(&[(header::COOKIE, "theme=dark; admin_token=tok123; other=1")]);
        assert_eq!(extract_token(&map).as_deref(), Some("tok123"));
    }

    #[test]
    fn test_bearer_takes_priority() {
        let map = headers(&[
            (header::AUTHORIZATION, "Bearer from-header"),
            (header::COOKIE, "admin_token=from-cookie"),
        ]);
        assert_eq!(extract_token(&map).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_extract_token_none() {
        assert!(extract_token(&HeaderMap::new()).is_none());
        let map = headers(&[(header::AUTHORIZATION, "Basic xyz"), (header::COOKIE, "session=x")]);
        assert!(extract_token(&map).is_none());
    }

    #[test]
    fn test_auth_cookie_attributes() {
        let cookie = auth_cookie("tok", 86400, false);
        assert_eq!(cookie, "admin_token=tok; Path=/; HttpOnly; SameSite=Lax; Max-Age=86400");
        assert!(auth_cookie("tok", 86400, true).ends_with("; Secure"));
        assert!(clear_auth_cookie(false).contains("Max-Age=0"));
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(ApiError::from(AuthError::InvalidCredentials).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::from(AuthError::Forbidden).status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::from(ContentError::NotFound("Slide x".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(AdminUserError::Conflict("a@b.c".into())).status(),
            StatusCode::CONFLICT
        );
        let internal = ApiError::from(ContentError::InternalError(anyhow::anyhow!("db down")));
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(internal.error, "Internal server error");
    }

    #[test]
    fn test_bulk_failure_details() {
        let err = ApiError::from(BulkCreateError::Failed {
            stage: BulkStage::Topics,
            source: anyhow::anyhow!("constraint"),
        });
        assert_eq!(err.code, "BULK_CREATE_FAILED");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.details, Some(json!({"rolled_back": true, "stage": "topics"})));

        let body = serde_json::to_value(&err).unwrap();
        assert_eq!(body["success"], false);
    }
}
