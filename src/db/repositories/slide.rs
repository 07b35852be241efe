//! Slide repository

use crate::db::{DynDatabasePool, PoolRef};
use crate::models::Slide;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{postgres::PgRow, sqlite::SqliteRow, PgExecutor, PgPool, Row, SqliteExecutor, SqlitePool};
use std::sync::Arc;

const SLIDE_COLUMNS: &str =
    "id, topic_id, title, url, description, order_index, created_at, updated_at";

const INSERT_SLIDE: &str = r#"
    INSERT INTO slides (id, topic_id, title, url, description, order_index, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
"#;

const UPDATE_SLIDE: &str = r#"
    UPDATE slides
    SET topic_id = $1, title = $2, url = $3, description = $4, order_index = $5, updated_at = $6
    WHERE id = $7
"#;

const SECTION_OF_SLIDE: &str = r#"
    SELECT s.section
    FROM slides sl
    JOIN topics t ON t.id = sl.topic_id
    JOIN courses c ON c.id = t.course_id
    JOIN semesters s ON s.id = c.semester_id
    WHERE sl.id = $1
"#;

/// Slide repository trait
#[async_trait]
pub trait SlideRepository: Send + Sync {
    async fn create(&self, slide: &Slide) -> Result<Slide>;

    async fn get_by_id(&self, id: &str) -> Result<Option<Slide>>;

    /// List slides in display order, optionally limited to one topic
    async fn list(&self, topic_id: Option<&str>) -> Result<Vec<Slide>>;

    async fn update(&self, slide: &Slide) -> Result<Slide>;

    async fn delete(&self, id: &str) -> Result<bool>;

    /// Section code resolved through topic, course and semester
    async fn section_of(&self, id: &str) -> Result<Option<String>>;
}

pub struct SqlxSlideRepository {
    pool: DynDatabasePool,
}

impl SqlxSlideRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn SlideRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl SlideRepository for SqlxSlideRepository {
    async fn create(&self, slide: &Slide) -> Result<Slide> {
        match self.pool.backend() {
            PoolRef::Sqlite(pool) => insert_slide_sqlite(pool, slide).await?,
            PoolRef::Postgres(pool) => insert_slide_postgres(pool, slide).await?,
        }
        Ok(slide.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Slide>> {
        match self.pool.backend() {
            PoolRef::Sqlite(pool) => get_slide_sqlite(pool, id).await,
            PoolRef::Postgres(pool) => get_slide_postgres(pool, id).await,
        }
    }

    async fn list(&self, topic_id: Option<&str>) -> Result<Vec<Slide>> {
        match self.pool.backend() {
            PoolRef::Sqlite(pool) => list_slides_sqlite(pool, topic_id).await,
            PoolRef::Postgres(pool) => list_slides_postgres(pool, topic_id).await,
        }
    }

    async fn update(&self, slide: &Slide) -> Result<Slide> {
        match self.pool.backend() {
            PoolRef::Sqlite(pool) => update_slide_sqlite(pool, slide).await?,
            PoolRef::Postgres(pool) => update_slide_postgres(pool, slide).await?,
        }
        Ok(slide.clone())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let affected = match self.pool.backend() {
            PoolRef::Sqlite(pool) => sqlx::query("DELETE FROM slides WHERE id = $1")
                .bind(id)
                .execute(pool)
                .await
                .context("Failed to delete slide")?
                .rows_affected(),
            PoolRef::Postgres(pool) => sqlx::query("DELETE FROM slides WHERE id = $1")
                .bind(id)
                .execute(pool)
                .await
                .context("Failed to delete slide")?
                .rows_affected(),
        };
        Ok(affected > 0)
    }

    async fn section_of(&self, id: &str) -> Result<Option<String>> {
        let section = match self.pool.backend() {
            PoolRef::Sqlite(pool) => sqlx::query_scalar::<_, String>(SECTION_OF_SLIDE)
                .bind(id)
                .fetch_optional(pool)
                .await,
            PoolRef::Postgres(pool) => sqlx::query_scalar::<_, String>(SECTION_OF_SLIDE)
                .bind(id)
                .fetch_optional(pool)
                .await,
        }
        .context("Failed to resolve slide section")?;
        Ok(section)
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

pub(crate) async fn insert_slide_sqlite<'e, E: SqliteExecutor<'e>>(
    executor: E,
    slide: &Slide,
) -> Result<()> {
    sqlx::query(INSERT_SLIDE)
        .bind(&slide.id)
        .bind(&slide.topic_id)
        .bind(&slide.title)
        .bind(&slide.url)
        .bind(&slide.description)
        .bind(slide.order_index)
        .bind(slide.created_at)
        .bind(slide.updated_at)
        .execute(executor)
        .await
        .context("Failed to create slide")?;
    Ok(())
}

async fn get_slide_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<Slide>> {
    let row = sqlx::query(&format!("SELECT {SLIDE_COLUMNS} FROM slides WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get slide by ID")?;

    row.as_ref().map(row_to_slide_sqlite).transpose()
}

async fn list_slides_sqlite(pool: &SqlitePool, topic_id: Option<&str>) -> Result<Vec<Slide>> {
    let rows = match topic_id {
        Some(topic_id) => {
            sqlx::query(&format!(
                "SELECT {SLIDE_COLUMNS} FROM slides WHERE topic_id = $1 ORDER BY order_index, created_at"
            ))
            .bind(topic_id)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query(&format!(
                "SELECT {SLIDE_COLUMNS} FROM slides ORDER BY topic_id, order_index, created_at"
            ))
            .fetch_all(pool)
            .await
        }
    }
    .context("Failed to list slides")?;

    rows.iter().map(row_to_slide_sqlite).collect()
}

async fn update_slide_sqlite(pool: &SqlitePool, slide: &Slide) -> Result<()> {
    sqlx::query(UPDATE_SLIDE)
        .bind(&slide.topic_id)
        .bind(&slide.title)
        .bind(&slide.url)
        .bind(&slide.description)
        .bind(slide.order_index)
        .bind(slide.updated_at)
        .bind(&slide.id)
        .execute(pool)
        .await
        .context("Failed to update slide")?;
    Ok(())
}

fn row_to_slide_sqlite(row: &SqliteRow) -> Result<Slide> {
    Ok(Slide {
        id: row.try_get("id")?,
        topic_id: row.try_get("topic_id")?,
        title: row.try_get("title")?,
        url: row.try_get("url")?,
        description: row.try_get("description")?,
        order_index: row.try_get("order_index")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

// ============================================================================
// Postgres implementations
// ============================================================================

pub(crate) async fn insert_slide_postgres<'e, E: PgExecutor<'e>>(
    executor: E,
    slide: &Slide,
) -> Result<()> {
    sqlx::query(INSERT_SLIDE)
        .bind(&slide.id)
        .bind(&slide.topic_id)
        .bind(&slide.title)
        .bind(&slide.url)
        .bind(&slide.description)
        .bind(slide.order_index)
        .bind(slide.created_at)
        .bind(slide.updated_at)
        .execute(executor)
        .await
        .context("Failed to create slide")?;
    Ok(())
}

async fn get_slide_postgres(pool: &PgPool, id: &str) -> Result<Option<Slide>> {
    let row = sqlx::query(&format!("SELECT {SLIDE_COLUMNS} FROM slides WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get slide by ID")?;

    row.as_ref().map(row_to_slide_postgres).transpose()
}

async fn list_slides_postgres(pool: &PgPool, topic_id: Option<&str>) -> Result<Vec<Slide>> {
    let rows = match topic_id {
        Some(topic_id) => {
            sqlx::query(&format!(
                "SELECT {SLIDE_COLUMNS} FROM slides WHERE topic_id = $1 ORDER BY order_index, created_at"
            ))
            .bind(topic_id)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query(&format!(
                "SELECT {SLIDE_COLUMNS} FROM slides ORDER BY topic_id, order_index, created_at"
            ))
            .fetch_all(pool)
            .await
        }
    }
    .context("Failed to list slides")?;

    rows.iter().map(row_to_slide_postgres).collect()
}

async fn update_slide_postgres(pool: &PgPool, slide: &Slide) -> Result<()> {
    sqlx::query(UPDATE_SLIDE)
        .bind(&slide.topic_id)
        .bind(&slide.title)
        .bind(&slide.url)
        .bind(&slide.description)
        .bind(slide.order_index)
        .bind(slide.updated_at)
        .bind(&slide.id)
        .execute(pool)
        .await
        .context("Failed to update slide")?;
    Ok(())
}

fn row_to_slide_postgres(row: &PgRow) -> Result<Slide> {
    Ok(Slide {
        id: row.try_get("id")?,
        topic_id: row.try_get("topic_id")?,
        title: row.try_get("title")?,
        url: row.try_get("url")?,
        description: row.try_get("description")?,
        order_index: row.try_get("order_index")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
