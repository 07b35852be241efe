//! Database layer
//!
//! This module provides database abstraction for the LMS backend.
//! It supports:
//! - SQLite (default, for local development and tests)
//! - Postgres (for hosted deployments)
//!
//! The database driver is selected based on configuration. Repositories match
//! on [`PoolRef`] to run the driver-specific query path.
//!
//! # Usage
//!
//! ```ignore
//! use cse_lms::config::DatabaseConfig;
//! use cse_lms::db::{create_pool, migrations};
//!
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//! migrations::run_migrations(&pool).await?;
//! pool.ping().await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{
    create_pool, create_test_pool, DatabasePool, DynDatabasePool, PoolRef, PostgresDatabase,
    SqliteDatabase,
};
