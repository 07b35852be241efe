//! CSE LMS server

use anyhow::Result;
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cse_lms::{
    api::{self, AppState},
    cache::{create_cache, create_content_cache},
    config::Config,
    db,
    services::ContentCaches,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cse_lms=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting CSE LMS...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded ({:?})", config.environment);

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {:?}", config.database.driver);

    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Initialize caches
    let caches = ContentCaches::new(
        create_cache(&config.cache),
        create_content_cache(&config.content_cache),
    );
    let _sweeper = caches.content().spawn_sweeper(Duration::from_secs(
        config.content_cache.sweep_interval_seconds.max(1),
    ));

    let state = AppState::new(pool.clone(), &config, caches);

    // First start: create the super admin if credentials are configured
    match (&config.auth.bootstrap_email, &config.auth.bootstrap_password) {
        (Some(email), Some(password)) => {
            if state
                .admin_user_service
                .ensure_bootstrap_admin(email, password)
                .await?
                .is_none()
            {
                tracing::debug!("Admin accounts exist; bootstrap skipped");
            }
        }
        _ => tracing::warn!("No bootstrap admin configured (LMS_BOOTSTRAP_EMAIL / LMS_BOOTSTRAP_PASSWORD)"),
    }

    // Build router
    let app = api::build_router(state, &config.server.cors_origin)?;

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
