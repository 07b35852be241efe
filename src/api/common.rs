//! Common API utilities and shared types

use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::{header, HeaderMap},
};
use serde::Deserialize;

use crate::api::middleware::ApiError;
use crate::services::ClientInfo;

/// JSON body extractor whose rejections use the API error shape
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation_error(rejection.body_text())
    }
}

// ============================================================================
// Parent filters
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct SectionQuery {
    pub section: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SemesterQuery {
    pub semester_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CourseQuery {
    pub course_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TopicQuery {
    pub topic_id: Option<String>,
}

/// Treat `?x=` the same as an absent filter
pub fn filter(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Client address and agent for the session row.
///
/// The address comes from `X-Forwarded-For` (first hop) or `X-Real-IP`.
pub fn client_info(headers: &HeaderMap) -> ClientInfo {
    let header_str = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    let ip_address = header_str("x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .or_else(|| header_str("x-real-ip").map(String::from));
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    ClientInfo {
        ip_address,
        user_agent,
    }
}
