//! Topic repository

use crate::db::{DynDatabasePool, PoolRef};
use crate::models::Topic;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{postgres::PgRow, sqlite::SqliteRow, PgExecutor, PgPool, Row, SqliteExecutor, SqlitePool};
use std::sync::Arc;

const TOPIC_COLUMNS: &str = "id, course_id, title, description, order_index, created_at, updated_at";

const INSERT_TOPIC: &str = r#"
    INSERT INTO topics (id, course_id, title, description, order_index, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
"#;

const UPDATE_TOPIC: &str = r#"
    UPDATE topics
    SET course_id = $1, title = $2, description = $3, order_index = $4, updated_at = $5
    WHERE id = $6
"#;

const SECTION_OF_TOPIC: &str = r#"
    SELECT s.section
    FROM topics t
    JOIN courses c ON c.id = t.course_id
    JOIN semesters s ON s.id = c.semester_id
    WHERE t.id = $1
"#;

/// Topic repository trait
#[async_trait]
pub trait TopicRepository: Send + Sync {
    async fn create(&self, topic: &Topic) -> Result<Topic>;

    async fn get_by_id(&self, id: &str) -> Result<Option<Topic>>;

    /// List topics in display order, optionally limited to one course
    async fn list(&self, course_id: Option<&str>) -> Result<Vec<Topic>>;

    async fn update(&self, topic: &Topic) -> Result<Topic>;

    async fn delete(&self, id: &str) -> Result<bool>;

    /// Section code of the semester that owns the topic's course
    async fn section_of(&self, id: &str) -> Result<Option<String>>;
}

/// SQLx-based topic repository implementation
pub struct SqlxTopicRepository {
    pool: DynDatabasePool,
}

impl SqlxTopicRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn TopicRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl TopicRepository for SqlxTopicRepository {
    async fn create(&self, topic: &Topic) -> Result<Topic> {
        match self.pool.backend() {
            PoolRef::Sqlite(pool) => insert_topic_sqlite(pool, topic).await?,
            PoolRef::Postgres(pool) => insert_topic_postgres(pool, topic).await?,
        }
        Ok(topic.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Topic>> {
        match self.pool.backend() {
            PoolRef::Sqlite(pool) => get_topic_sqlite(pool, id).await,
            PoolRef::Postgres(pool) => get_topic_postgres(pool, id).await,
        }
    }

    async fn list(&self, course_id: Option<&str>) -> Result<Vec<Topic>> {
        match self.pool.backend() {
            PoolRef::Sqlite(pool) => list_topics_sqlite(pool, course_id).await,
            PoolRef::Postgres(pool) => list_topics_postgres(pool, course_id).await,
        }
    }

    async fn update(&self, topic: &Topic) -> Result<Topic> {
        match self.pool.backend() {
            PoolRef::Sqlite(pool) => update_topic_sqlite(pool, topic).await?,
            PoolRef::Postgres(pool) => update_topic_postgres(pool, topic).await?,
        }
        Ok(topic.clone())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let affected = match self.pool.backend() {
            PoolRef::Sqlite(pool) => sqlx::query("DELETE FROM topics WHERE id = $1")
                .bind(id)
                .execute(pool)
                .await
                .context("Failed to delete topic")?
                .rows_affected(),
            PoolRef::Postgres(pool) => sqlx::query("DELETE FROM topics WHERE id = $1")
                .bind(id)
                .execute(pool)
                .await
                .context("Failed to delete topic")?
                .rows_affected(),
        };
        Ok(affected > 0)
    }

    async fn section_of(&self, id: &str) -> Result<Option<String>> {
        let section = match self.pool.backend() {
            PoolRef::Sqlite(pool) => sqlx::query_scalar::<_, String>(SECTION_OF_TOPIC)
                .bind(id)
                .fetch_optional(pool)
                .await,
            PoolRef::Postgres(pool) => sqlx::query_scalar::<_, String>(SECTION_OF_TOPIC)
                .bind(id)
                .fetch_optional(pool)
                .await,
        }
        .context("Failed to resolve topic section")?;
        Ok(section)
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

pub(crate) async fn insert_topic_sqlite<'e, E: SqliteExecutor<'e>>(
    executor: E,
    topic: &Topic,
) -> Result<()> {
    sqlx::query(INSERT_TOPIC)
        .bind(&topic.id)
        .bind(&topic.course_id)
        .bind(&topic.title)
        .bind(&topic.description)
        .bind(topic.order_index)
        .bind(topic.created_at)
        .bind(topic.updated_at)
        .execute(executor)
        .await
        .context("Failed to create topic")?;
    Ok(())
}

async fn get_topic_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<Topic>> {
    let row = sqlx::query(&format!("SELECT {TOPIC_COLUMNS} FROM topics WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get topic by ID")?;

    row.as_ref().map(row_to_topic_sqlite).transpose()
}

async fn list_topics_sqlite(pool: &SqlitePool, course_id: Option<&str>) -> Result<Vec<Topic>> {
    let rows = match course_id {
        Some(course_id) => {
            sqlx::query(&format!(
                "SELECT {TOPIC_COLUMNS} FROM topics WHERE course_id = $1 ORDER BY order_index, created_at"
            ))
            .bind(course_id)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query(&format!(
                "SELECT {TOPIC_COLUMNS} FROM topics ORDER BY course_id, order_index, created_at"
            ))
            .fetch_all(pool)
            .await
        }
    }
    .context("Failed to list topics")?;

    rows.iter().map(row_to_topic_sqlite).collect()
}

async fn update_topic_sqlite(pool: &SqlitePool, topic: &Topic) -> Result<()> {
    sqlx::query(UPDATE_TOPIC)
        .bind(&topic.course_id)
        .bind(&topic.title)
        .bind(&topic.description)
        .bind(topic.order_index)
        .bind(topic.updated_at)
        .bind(&topic.id)
        .execute(pool)
        .await
        .context("Failed to update topic")?;
    Ok(())
}

fn row_to_topic_sqlite(row: &SqliteRow) -> Result<Topic> {
    Ok(Topic {
        id: row.try_get("id")?,
        course_id: row.try_get("course_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        order_index: row.try_get("order_index")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

// ============================================================================
// Postgres implementations
// ============================================================================

pub(crate) async fn insert_topic_postgres<'e, E: PgExecutor<'e>>(
    executor: E,
    topic: &Topic,
) -> Result<()> {
    sqlx::query(INSERT_TOPIC)
        .bind(&topic.id)
        .bind(&topic.course_id)
        .bind(&topic.title)
        .bind(&topic.description)
        .bind(topic.order_index)
        .bind(topic.created_at)
        .bind(topic.updated_at)
        .execute(executor)
        .await
        .context("Failed to create topic")?;
    Ok(())
}

async fn get_topic_postgres(pool: &PgPool, id: &str) -> Result<Option<Topic>> {
    let row = sqlx::query(&format!("SELECT {TOPIC_COLUMNS} FROM topics WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get topic by ID")?;

    row.as_ref().map(row_to_topic_postgres).transpose()
}

async fn list_topics_postgres(pool: &PgPool, course_id: Option<&str>) -> Result<Vec<Topic>> {
    let rows = match course_id {
        Some(course_id) => {
            sqlx::query(&format!(
                "SELECT {TOPIC_COLUMNS} FROM topics WHERE course_id = $1 ORDER BY order_index, created_at"
            ))
            .bind(course_id)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query(&format!(
                "SELECT {TOPIC_COLUMNS} FROM topics ORDER BY course_id, order_index, created_at"
            ))
            .fetch_all(pool)
            .await
        }
    }
    .context("Failed to list topics")?;

    rows.iter().map(row_to_topic_postgres).collect()
}

async fn update_topic_postgres(pool: &PgPool, topic: &Topic) -> Result<()> {
    sqlx::query(UPDATE_TOPIC)
        .bind(&topic.course_id)
        .bind(&topic.title)
        .bind(&topic.description)
        .bind(topic.order_index)
        .bind(topic.updated_at)
        .bind(&topic.id)
        .execute(pool)
        .await
        .context("Failed to update topic")?;
    Ok(())
}

fn row_to_topic_postgres(row: &PgRow) -> Result<Topic> {
    Ok(Topic {
        id: row.try_get("id")?,
        course_id: row.try_get("course_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        order_index: row.try_get("order_index")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
