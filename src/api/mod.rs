//! API layer - HTTP handlers and routing
//!
//! All endpoints live under `/api`:
//! - Auth (login, me, logout)
//! - Semesters, courses, topics, slides, videos and study tools
//! - Admin users, the all-in-one creator and cache administration
//! - Cached content lookup, share links and health

pub mod admin_users;
pub mod all_in_one;
pub mod auth;
pub mod common;
pub mod content;
pub mod courses;
pub mod health;
pub mod middleware;
pub mod responses;
pub mod semesters;
pub mod share;
pub mod slides;
pub mod study_tools;
pub mod topics;
pub mod videos;

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

pub use middleware::{ApiError, AppState, AuthenticatedUser};
pub use responses::ApiResponse;

/// Build the `/api` router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // User management and cache administration (admin, super_admin)
    let admin_routes = Router::new()
        .nest(
            "/admin",
            admin_users::router().merge(content::admin_router()),
        )
        .route_layer(axum_middleware::from_fn(middleware::require_user_manager))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Content editing (any admin role, section checks in the services)
    let protected_routes = Router::new()
        .merge(semesters::protected_router())
        .merge(courses::protected_router())
        .merge(topics::protected_router())
        .merge(slides::protected_router())
        .merge(videos::protected_router())
        .merge(study_tools::protected_router())
        .nest("/admin", all_in_one::router())
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::require_auth,
        ));

    // Public routes
    Router::new()
        .nest("/auth", auth::router())
        .merge(semesters::public_router())
        .merge(courses::public_router())
        .merge(topics::public_router())
        .merge(slides::public_router())
        .merge(videos::public_router())
        .merge(study_tools::public_router())
        .merge(content::public_router())
        .merge(share::router())
        .merge(health::router())
        .merge(admin_routes)
        .merge(protected_routes)
}

fn cors_layer(cors_origin: &str) -> anyhow::Result<CorsLayer> {
    // Credentials rule out a literal `*`; echo the caller's origin instead.
    let origin = if cors_origin.trim() == "*" {
        AllowOrigin::mirror_request()
    } else {
        let value = cors_origin
            .parse::<HeaderValue>()
            .with_context(|| format!("Invalid CORS origin: {}", cors_origin))?;
        AllowOrigin::exact(value)
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true))
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> anyhow::Result<Router> {
    let cors = cors_layer(cors_origin)?;

    Ok(Router::new()
        .nest("/api", build_api_router(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
