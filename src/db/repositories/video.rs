//! Video repository

use crate::db::{DynDatabasePool, PoolRef};
use crate::models::Video;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{postgres::PgRow, sqlite::SqliteRow, PgExecutor, PgPool, Row, SqliteExecutor, SqlitePool};
use std::sync::Arc;

const VIDEO_COLUMNS: &str =
    "id, topic_id, title, url, description, duration, order_index, created_at, updated_at";

const INSERT_VIDEO: &str = r#"
    INSERT INTO videos (id, topic_id, title, url, description, duration, order_index, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
"#;

const UPDATE_VIDEO: &str = r#"
    UPDATE videos
    SET topic_id = $1, title = $2, url = $3, description = $4, duration = $5,
        order_index = $6, updated_at = $7
    WHERE id = $8
"#;

const SECTION_OF_VIDEO: &str = r#"
    SELECT s.section
    FROM videos v
    JOIN topics t ON t.id = v.topic_id
    JOIN courses c ON c.id = t.course_id
    JOIN semesters s ON s.id = c.semester_id
    WHERE v.id = $1
"#;

/// Video repository trait
#[async_trait]
pub trait VideoRepository: Send + Sync {
    async fn create(&self, video: &Video) -> Result<Video>;

    async fn get_by_id(&self, id: &str) -> Result<Option<Video>>;

    /// List videos in display order, optionally limited to one topic
    async fn list(&self, topic_id: Option<&str>) -> Result<Vec<Video>>;

    async fn update(&self, video: &Video) -> Result<Video>;

    async fn delete(&self, id: &str) -> Result<bool>;

    async fn section_of(&self, id: &str) -> Result<Option<String>>;
}

pub struct SqlxVideoRepository {
    pool: DynDatabasePool,
}

impl SqlxVideoRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn VideoRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl VideoRepository for SqlxVideoRepository {
    async fn create(&self, video: &Video) -> Result<Video> {
        match self.pool.backend() {
            PoolRef::Sqlite(pool) => insert_video_sqlite(pool, video).await?,
            PoolRef::Postgres(pool) => insert_video_postgres(pool, video).await?,
        }
        Ok(video.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Video>> {
        match self.pool.backend() {
            PoolRef::Sqlite(pool) => get_video_sqlite(pool, id).await,
            PoolRef::Postgres(pool) => get_video_postgres(pool, id).await,
        }
    }

    async fn list(&self, topic_id: Option<&str>) -> Result<Vec<Video>> {
        match self.pool.backend() {
            PoolRef::Sqlite(pool) => list_videos_sqlite(pool, topic_id).await,
            PoolRef::Postgres(pool) => list_videos_postgres(pool, topic_id).await,
        }
    }

    async fn update(&self, video: &Video) -> Result<Video> {
        match self.pool.backend() {
            PoolRef::Sqlite(pool) => update_video_sqlite(pool, video).await?,
            PoolRef::Postgres(pool) => update_video_postgres(pool, video).await?,
        }
        Ok(video.clone())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let affected = match self.pool.backend() {
            PoolRef::Sqlite(pool) => sqlx::query("DELETE FROM videos WHERE id = $1")
                .bind(id)
                .execute(pool)
                .await
                .context("Failed to delete video")?
                .rows_affected(),
            PoolRef::Postgres(pool) => sqlx::query("DELETE FROM videos WHERE id = $1")
                .bind(id)
                .execute(pool)
                .await
                .context("Failed to delete video")?
                .rows_affected(),
        };
        Ok(affected > 0)
    }

    async fn section_of(&self, id: &str) -> Result<Option<String>> {
        let section = match self.pool.backend() {
            PoolRef::Sqlite(pool) => sqlx::query_scalar::<_, String>(SECTION_OF_VIDEO)
                .bind(id)
                .fetch_optional(pool)
                .await,
            PoolRef::Postgres(pool) => sqlx::query_scalar::<_, String>(SECTION_OF_VIDEO)
                .bind(id)
                .fetch_optional(pool)
                .await,
        }
        .context("Failed to resolve video section")?;
        Ok(section)
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

pub(crate) async fn insert_video_sqlite<'e, E: SqliteExecutor<'e>>(
    executor: E,
    video: &Video,
) -> Result<()> {
    sqlx::query(INSERT_VIDEO)
        .bind(&video.id)
        .bind(&video.topic_id)
        .bind(&video.title)
        .bind(&video.url)
        .bind(&video.description)
        .bind(&video.duration)
        .bind(video.order_index)
        .bind(video.created_at)
        .bind(video.updated_at)
        .execute(executor)
        .await
        .context("Failed to create video")?;
    Ok(())
}

async fn get_video_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<Video>> {
    let row = sqlx::query(&format!("SELECT {VIDEO_COLUMNS} FROM videos WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get video by ID")?;

    row.as_ref().map(row_to_video_sqlite).transpose()
}

async fn list_videos_sqlite(pool: &SqlitePool, topic_id: Option<&str>) -> Result<Vec<Video>> {
    let rows = match topic_id {
        Some(topic_id) => {
            sqlx::query(&format!(
                "SELECT {VIDEO_COLUMNS} FROM videos WHERE topic_id = $1 ORDER BY order_index, created_at"
            ))
            .bind(topic_id)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query(&format!(
                "SELECT {VIDEO_COLUMNS} FROM videos ORDER BY topic_id, order_index, created_at"
            ))
            .fetch_all(pool)
            .await
        }
    }
    .context("Failed to list videos")?;

    rows.iter().map(row_to_video_sqlite).collect()
}

async fn update_video_sqlite(pool: &SqlitePool, video: &Video) -> Result<()> {
    sqlx::query(UPDATE_VIDEO)
        .bind(&video.topic_id)
        .bind(&video.title)
        .bind(&video.url)
        .bind(&video.description)
        .bind(&video.duration)
        .bind(video.order_index)
        .bind(video.updated_at)
        .bind(&video.id)
        .execute(pool)
        .await
        .context("Failed to update video")?;
    Ok(())
}

fn row_to_video_sqlite(row: &SqliteRow) -> Result<Video> {
    Ok(Video {
        id: row.try_get("id")?,
        topic_id: row.try_get("topic_id")?,
        title: row.try_get("title")?,
        url: row.try_get("url")?,
        description: row.try_get("description")?,
        duration: row.try_get("duration")?,
        order_index: row.try_get("order_index")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

// ============================================================================
// Postgres implementations
// ============================================================================

pub(crate) async fn insert_video_postgres<'e, E: PgExecutor<'e>>(
    executor: E,
    video: &Video,
) -> Result<()> {
    sqlx::query(INSERT_VIDEO)
        .bind(&video.id)
        .bind(&video.topic_id)
        .bind(&video.title)
        .bind(&video.url)
        .bind(&video.description)
        .bind(&video.duration)
        .bind(video.order_index)
        .bind(video.created_at)
        .bind(video.updated_at)
        .execute(executor)
        .await
        .context("Failed to create video")?;
    Ok(())
}

async fn get_video_postgres(pool: &PgPool, id: &str) -> Result<Option<Video>> {
    let row = sqlx::query(&format!("SELECT {VIDEO_COLUMNS} FROM videos WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get video by ID")?;

    row.as_ref().map(row_to_video_postgres).transpose()
}

async fn list_videos_postgres(pool: &PgPool, topic_id: Option<&str>) -> Result<Vec<Video>> {
    let rows = match topic_id {
        Some(topic_id) => {
            sqlx::query(&format!(
                "SELECT {VIDEO_COLUMNS} FROM videos WHERE topic_id = $1 ORDER BY order_index, created_at"
            ))
            .bind(topic_id)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query(&format!(
                "SELECT {VIDEO_COLUMNS} FROM videos ORDER BY topic_id, order_index, created_at"
            ))
            .fetch_all(pool)
            .await
        }
    }
    .context("Failed to list videos")?;

    rows.iter().map(row_to_video_postgres).collect()
}

async fn update_video_postgres(pool: &PgPool, video: &Video) -> Result<()> {
    sqlx::query(UPDATE_VIDEO)
        .bind(&video.topic_id)
        .bind(&video.title)
        .bind(&video.url)
        .bind(&video.description)
        .bind(&video.duration)
        .bind(video.order_index)
        .bind(video.updated_at)
        .bind(&video.id)
        .execute(pool)
        .await
        .context("Failed to update video")?;
    Ok(())
}

fn row_to_video_postgres(row: &PgRow) -> Result<Video> {
    Ok(Video {
        id: row.try_get("id")?,
        topic_id: row.try_get("topic_id")?,
        title: row.try_get("title")?,
        url: row.try_get("url")?,
        description: row.try_get("description")?,
        duration: row.try_get("duration")?,
        order_index: row.try_get("order_index")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
