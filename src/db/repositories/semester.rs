//! Semester repository
//!
//! This module provides:
//! - `SemesterRepository` trait defining the interface for semester data access
//! - `SqlxSemesterRepository` implementing the trait for SQLite and Postgres

use crate::db::{DynDatabasePool, PoolRef};
use crate::models::Semester;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{postgres::PgRow, sqlite::SqliteRow, PgExecutor, PgPool, Row, SqliteExecutor, SqlitePool};
use std::sync::Arc;

const SEMESTER_COLUMNS: &str =
    "id, title, description, section, start_date, end_date, is_active, created_at, updated_at";

const INSERT_SEMESTER: &str = r#"
    INSERT INTO semesters (id, title, description, section, start_date, end_date, is_active, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
"#;

const UPDATE_SEMESTER: &str = r#"
    UPDATE semesters
    SET title = $1, description = $2, section = $3, start_date = $4, end_date = $5,
        is_active = $6, updated_at = $7
    WHERE id = $8
"#;

/// Semester repository trait
#[async_trait]
pub trait SemesterRepository: Send + Sync {
    /// Insert a new semester
    async fn create(&self, semester: &Semester) -> Result<Semester>;

    /// Get semester by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<Semester>>;

    /// List semesters, newest first, optionally limited to one section
    async fn list(&self, section: Option<&str>) -> Result<Vec<Semester>>;

    /// Persist all mutable fields of an existing semester
    async fn update(&self, semester: &Semester) -> Result<Semester>;

    /// Delete a semester (cascades to its courses). Returns false if absent.
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// SQLx-based semester repository implementation
pub struct SqlxSemesterRepository {
    pool: DynDatabasePool,
}

impl SqlxSemesterRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn SemesterRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl SemesterRepository for SqlxSemesterRepository {
    async fn create(&self, semester: &Semester) -> Result<Semester> {
        match self.pool.backend() {
            PoolRef::Sqlite(pool) => insert_semester_sqlite(pool, semester).await?,
            PoolRef::Postgres(pool) => insert_semester_postgres(pool, semester).await?,
        }
        Ok(semester.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Semester>> {
        match self.pool.backend() {
            PoolRef::Sqlite(pool) => get_semester_sqlite(pool, id).await,
            PoolRef::Postgres(pool) => get_semester_postgres(pool, id).await,
        }
    }

    async fn list(&self, section: Option<&str>) -> Result<Vec<Semester>> {
        match self.pool.backend() {
            PoolRef::Sqlite(pool) => list_semesters_sqlite(pool, section).await,
            PoolRef::Postgres(pool) => list_semesters_postgres(pool, section).await,
        }
    }

    async fn update(&self, semester: &Semester) -> Result<Semester> {
        match self.pool.backend() {
            PoolRef::Sqlite(pool) => update_semester_sqlite(pool, semester).await?,
            PoolRef::Postgres(pool) => update_semester_postgres(pool, semester).await?,
        }
        Ok(semester.clone())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let affected = match self.pool.backend() {
            PoolRef::Sqlite(pool) => sqlx::query("DELETE FROM semesters WHERE id = $1")
                .bind(id)
                .execute(pool)
                .await
                .context("Failed to delete semester")?
                .rows_affected(),
            PoolRef::Postgres(pool) => sqlx::query("DELETE FROM semesters WHERE id = $1")
                .bind(id)
                .execute(pool)
                .await
                .context("Failed to delete semester")?
                .rows_affected(),
        };
        Ok(affected > 0)
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

pub(crate) async fn insert_semester_sqlite<'e, E: SqliteExecutor<'e>>(
    executor: E,
    semester: &Semester,
) -> Result<()> {
    sqlx::query(INSERT_SEMESTER)
        .bind(&semester.id)
        .bind(&semester.title)
        .bind(&semester.description)
        .bind(&semester.section)
        .bind(semester.start_date)
        .bind(semester.end_date)
        .bind(semester.is_active)
        .bind(semester.created_at)
        .bind(semester.updated_at)
        .execute(executor)
        .await
        .context("Failed to create semester")?;
    Ok(())
}

async fn get_semester_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<Semester>> {
    let row = sqlx::query(&format!("SELECT {SEMESTER_COLUMNS} FROM semesters WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get semester by ID")?;

    row.as_ref().map(row_to_semester_sqlite).transpose()
}

async fn list_semesters_sqlite(pool: &SqlitePool, section: Option<&str>) -> Result<Vec<Semester>> {
    let rows = match section {
        Some(section) => {
            sqlx::query(&format!(
                "SELECT {SEMESTER_COLUMNS} FROM semesters WHERE section = $1 ORDER BY created_at DESC"
            ))
            .bind(section)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query(&format!("SELECT {SEMESTER_COLUMNS} FROM semesters ORDER BY created_at DESC"))
                .fetch_all(pool)
                .await
        }
    }
    .context("Failed to list semesters")?;

    rows.iter().map(row_to_semester_sqlite).collect()
}

async fn update_semester_sqlite(pool: &SqlitePool, semester: &Semester) -> Result<()> {
    sqlx::query(UPDATE_SEMESTER)
        .bind(&semester.title)
        .bind(&semester.description)
        .bind(&semester.section)
        .bind(semester.start_date)
        .bind(semester.end_date)
        .bind(semester.is_active)
        .bind(semester.updated_at)
        .bind(&semester.id)
        .execute(pool)
        .await
        .context("Failed to update semester")?;
    Ok(())
}

fn row_to_semester_sqlite(row: &SqliteRow) -> Result<Semester> {
    Ok(Semester {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        section: row.try_get("section")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

// ============================================================================
// Postgres implementations
// ============================================================================

pub(crate) async fn insert_semester_postgres<'e, E: PgExecutor<'e>>(
    executor: E,
    semester: &Semester,
) -> Result<()> {
    sqlx::query(INSERT_SEMESTER)
        .bind(&semester.id)
        .bind(&semester.title)
        .bind(&semester.description)
        .bind(&semester.section)
        .bind(semester.start_date)
        .bind(semester.end_date)
        .bind(semester.is_active)
        .bind(semester.created_at)
        .bind(semester.updated_at)
        .execute(executor)
        .await
        .context("Failed to create semester")?;
    Ok(())
}

async fn get_semester_postgres(pool: &PgPool, id: &str) -> Result<Option<Semester>> {
    let row = sqlx::query(&format!("SELECT {SEMESTER_COLUMNS} FROM semesters WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get semester by ID")?;

    row.as_ref().map(row_to_semester_postgres).transpose()
}

async fn list_semesters_postgres(pool: &PgPool, section: Option<&str>) -> Result<Vec<Semester>> {
    let rows = match section {
        Some(section) => {
            sqlx::query(&format!(
                "SELECT {SEMESTER_COLUMNS} FROM semesters WHERE section = $1 ORDER BY created_at DESC"
            ))
            .bind(section)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query(&format!("SELECT {SEMESTER_COLUMNS} FROM semesters ORDER BY created_at DESC"))
                .fetch_all(pool)
                .await
        }
    }
    .context("Failed to list semesters")?;

    rows.iter().map(row_to_semester_postgres).collect()
}

async fn update_semester_postgres(pool: &PgPool, semester: &Semester) -> Result<()> {
    sqlx::query(UPDATE_SEMESTER)
        .bind(&semester.title)
        .bind(&semester.description)
        .bind(&semester.section)
        .bind(semester.start_date)
        .bind(semester.end_date)
        .bind(semester.is_active)
        .bind(semester.updated_at)
        .bind(&semester.id)
        .execute(pool)
        .await
        .context("Failed to update semester")?;
    Ok(())
}

fn row_to_semester_postgres(row: &PgRow) -> Result<Semester> {
    Ok(Semester {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        section: row.try_get("section")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations::run_migrations};

    async fn setup() -> Arc<dyn SemesterRepository> {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        run_migrations(&pool).await.expect("Failed to run migrations");
        SqlxSemesterRepository::boxed(pool)
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = setup().await;
        let mut semester = Semester::new("Spring 2025".to_string(), "63_G".to_string());
        semester.start_date = chrono::NaiveDate::from_ymd_opt(2025, 1, 15);

        repo.create(&semester).await.unwrap();
        let found = repo.get_by_id(&semester.id).await.unwrap().unwrap();

        assert_eq!(found.title, "Spring 2025");
        assert_eq!(found.section, "63_G");
        assert_eq!(found.start_date, semester.start_date);
        assert!(found.is_active);
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let repo = setup().await;
        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_filters_by_section() {
        let repo = setup().await;
        repo.create(&Semester::new("A1".into(), "A".into())).await.unwrap();
        repo.create(&Semester::new("A2".into(), "A".into())).await.unwrap();
        repo.create(&Semester::new("B1".into(), "B".into())).await.unwrap();

        assert_eq!(repo.list(None).await.unwrap().len(), 3);
        let only_a = repo.list(Some("A")).await.unwrap();
        assert_eq!(only_a.len(), 2);
        assert!(only_a.iter().all(|s| s.section == "A"));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let repo = setup().await;
        let mut semester = Semester::new("Fall".into(), "A".into());
        repo.create(&semester).await.unwrap();

        semester.title = "Fall 2025".into();
        semester.is_active = false;
        repo.update(&semester).await.unwrap();

        let found = repo.get_by_id(&semester.id).await.unwrap().unwrap();
        assert_eq!(found.title, "Fall 2025");
        assert!(!found.is_active);

        assert!(repo.delete(&semester.id).await.unwrap());
        assert!(!repo.delete(&semester.id).await.unwrap());
        assert!(repo.get_by_id(&semester.id).await.unwrap().is_none());
    }
}
