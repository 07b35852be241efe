//! Study tool repository

use crate::db::{DynDatabasePool, PoolRef};
use crate::models::{ExamType, StudyTool, ToolType};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{postgres::PgRow, sqlite::SqliteRow, PgExecutor, PgPool, Row, SqliteExecutor, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

const STUDY_TOOL_COLUMNS: &str =
    "id, course_id, title, tool_type, exam_type, content_url, description, created_at, updated_at";

const INSERT_STUDY_TOOL: &str = r#"
    INSERT INTO study_tools (id, course_id, title, tool_type, exam_type, content_url, description, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
"#;

const UPDATE_STUDY_TOOL: &str = r#"
    UPDATE study_tools
    SET course_id = $1, title = $2, tool_type = $3, exam_type = $4, content_url = $5,
        description = $6, updated_at = $7
    WHERE id = $8
"#;

const SECTION_OF_STUDY_TOOL: &str = r#"
    SELECT s.section
    FROM study_tools st
    JOIN courses c ON c.id = st.course_id
    JOIN semesters s ON s.id = c.semester_id
    WHERE st.id = $1
"#;

/// Study tool repository trait
#[async_trait]
pub trait StudyToolRepository: Send + Sync {
    async fn create(&self, tool: &StudyTool) -> Result<StudyTool>;

    async fn get_by_id(&self, id: &str) -> Result<Option<StudyTool>>;

    /// List study tools, optionally limited to one course
    async fn list(&self, course_id: Option<&str>) -> Result<Vec<StudyTool>>;

    async fn update(&self, tool: &StudyTool) -> Result<StudyTool>;

    async fn delete(&self, id: &str) -> Result<bool>;

    async fn section_of(&self, id: &str) -> Result<Option<String>>;
}

pub struct SqlxStudyToolRepository {
    pool: DynDatabasePool,
}

impl SqlxStudyToolRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn StudyToolRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl StudyToolRepository for SqlxStudyToolRepository {
    async fn create(&self, tool: &StudyTool) -> Result<StudyTool> {
        match self.pool.backend() {
            PoolRef::Sqlite(pool) => insert_study_tool_sqlite(pool, tool).await?,
            PoolRef::Postgres(pool) => insert_study_tool_postgres(pool, tool).await?,
        }
        Ok(tool.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<StudyTool>> {
        match self.pool.backend() {
            PoolRef::Sqlite(pool) => get_study_tool_sqlite(pool, id).await,
            PoolRef::Postgres(pool) => get_study_tool_postgres(pool, id).await,
        }
    }

    async fn list(&self, course_id: Option<&str>) -> Result<Vec<StudyTool>> {
        match self.pool.backend() {
            PoolRef::Sqlite(pool) => list_study_tools_sqlite(pool, course_id).await,
            PoolRef::Postgres(pool) => list_study_tools_postgres(pool, course_id).await,
        }
    }

    async fn update(&self, tool: &StudyTool) -> Result<StudyTool> {
        match self.pool.backend() {
            PoolRef::Sqlite(pool) => update_study_tool_sqlite(pool, tool).await?,
            PoolRef::Postgres(pool) => update_study_tool_postgres(pool, tool).await?,
        }
        Ok(tool.clone())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let affected = match self.pool.backend() {
            PoolRef::Sqlite(pool) => sqlx::query("DELETE FROM study_tools WHERE id = $1")
                .bind(id)
                .execute(pool)
                .await
                .context("Failed to delete study tool")?
                .rows_affected(),
            PoolRef::Postgres(pool) => sqlx::query("DELETE FROM study_tools WHERE id = $1")
                .bind(id)
                .execute(pool)
                .await
                .context("Failed to delete study tool")?
                .rows_affected(),
        };
        Ok(affected > 0)
    }

    async fn section_of(&self, id: &str) -> Result<Option<String>> {
        let section = match self.pool.backend() {
            PoolRef::Sqlite(pool) => sqlx::query_scalar::<_, String>(SECTION_OF_STUDY_TOOL)
                .bind(id)
                .fetch_optional(pool)
                .await,
            PoolRef::Postgres(pool) => sqlx::query_scalar::<_, String>(SECTION_OF_STUDY_TOOL)
                .bind(id)
                .fetch_optional(pool)
                .await,
        }
        .context("Failed to resolve study tool section")?;
        Ok(section)
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

pub(crate) async fn insert_study_tool_sqlite<'e, E: SqliteExecutor<'e>>(
    executor: E,
    tool: &StudyTool,
) -> Result<()> {
    sqlx::query(INSERT_STUDY_TOOL)
        .bind(&tool.id)
        .bind(&tool.course_id)
        .bind(&tool.title)
        .bind(tool.tool_type.to_string())
        .bind(tool.exam_type.to_string())
        .bind(&tool.content_url)
        .bind(&tool.description)
        .bind(tool.created_at)
        .bind(tool.updated_at)
        .execute(executor)
        .await
        .context("Failed to create study tool")?;
    Ok(())
}

async fn get_study_tool_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<StudyTool>> {
    let row = sqlx::query(&format!("SELECT {STUDY_TOOL_COLUMNS} FROM study_tools WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get study tool by ID")?;

    row.as_ref().map(row_to_study_tool_sqlite).transpose()
}

async fn list_study_tools_sqlite(
    pool: &SqlitePool,
    course_id: Option<&str>,
) -> Result<Vec<StudyTool>> {
    let rows = match course_id {
        Some(course_id) => {
            sqlx::query(&format!(
                "SELECT {STUDY_TOOL_COLUMNS} FROM study_tools WHERE course_id = $1 ORDER BY created_at"
            ))
            .bind(course_id)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query(&format!(
                "SELECT {STUDY_TOOL_COLUMNS} FROM study_tools ORDER BY course_id, created_at"
            ))
            .fetch_all(pool)
            .await
        }
    }
    .context("Failed to list study tools")?;

    rows.iter().map(row_to_study_tool_sqlite).collect()
}

async fn update_study_tool_sqlite(pool: &SqlitePool, tool: &StudyTool) -> Result<()> {
    sqlx::query(UPDATE_STUDY_TOOL)
        .bind(&tool.course_id)
        .bind(&tool.title)
        .bind(tool.tool_type.to_string())
        .bind(tool.exam_type.to_string())
        .bind(&tool.content_url)
        .bind(&tool.description)
        .bind(tool.updated_at)
        .bind(&tool.id)
        .execute(pool)
        .await
        .context("Failed to update study tool")?;
    Ok(())
}

fn row_to_study_tool_sqlite(row: &SqliteRow) -> Result<StudyTool> {
    let tool_type: String = row.try_get("tool_type")?;
    let exam_type: String = row.try_get("exam_type")?;

    Ok(StudyTool {
        id: row.try_get("id")?,
        course_id: row.try_get("course_id")?,
        title: row.try_get("title")?,
        tool_type: ToolType::from_str(&tool_type)?,
        exam_type: ExamType::from_str(&exam_type)?,
        content_url: row.try_get("content_url")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

// ============================================================================
// Postgres implementations
// ============================================================================

pub(crate) async fn insert_study_tool_postgres<'e, E: PgExecutor<'e>>(
    executor: E,
    tool: &StudyTool,
) -> Result<()> {
    sqlx::query(INSERT_STUDY_TOOL)
        .bind(&tool.id)
        .bind(&tool.course_id)
        .bind(&tool.title)
        .bind(tool.tool_type.to_string())
        .bind(tool.exam_type.to_string())
        .bind(&tool.content_url)
        .bind(&tool.description)
        .bind(tool.created_at)
        .bind(tool.updated_at)
        .execute(executor)
        .await
        .context("Failed to create study tool")?;
    Ok(())
}

async fn get_study_tool_postgres(pool: &PgPool, id: &str) -> Result<Option<StudyTool>> {
    let row = sqlx::query(&format!("SELECT {STUDY_TOOL_COLUMNS} FROM study_tools WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get study tool by ID")?;

    row.as_ref().map(row_to_study_tool_postgres).transpose()
}

async fn list_study_tools_postgres(pool: &PgPool, course_id: Option<&str>) -> Result<Vec<StudyTool>> {
    let rows = match course_id {
        Some(course_id) => {
            sqlx::query(&format!(
                "SELECT {STUDY_TOOL_COLUMNS} FROM study_tools WHERE course_id = $1 ORDER BY created_at"
            ))
            .bind(course_id)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query(&format!(
                "SELECT {STUDY_TOOL_COLUMNS} FROM study_tools ORDER BY course_id, created_at"
            ))
            .fetch_all(pool)
            .await
        }
    }
    .context("Failed to list study tools")?;

    rows.iter().map(row_to_study_tool_postgres).collect()
}

async fn update_study_tool_postgres(pool: &PgPool, tool: &StudyTool) -> Result<()> {
    sqlx::query(UPDATE_STUDY_TOOL)
        .bind(&tool.course_id)
        .bind(&tool.title)
        .bind(tool.tool_type.to_string())
        .bind(tool.exam_type.to_string())
        .bind(&tool.content_url)
        .bind(&tool.description)
        .bind(tool.updated_at)
        .bind(&tool.id)
        .execute(pool)
        .await
        .context("Failed to update study tool")?;
    Ok(())
}

fn row_to_study_tool_postgres(row: &PgRow) -> Result<StudyTool> {
    let tool_type: String = row.try_get("tool_type")?;
    let exam_type: String = row.try_get("exam_type")?;

    Ok(StudyTool {
        id: row.try_get("id")?,
        course_id: row.try_get("course_id")?,
        title: row.try_get("title")?,
        tool_type: ToolType::from_str(&tool_type)?,
        exam_type: ExamType::from_str(&exam_type)?,
        content_url: row.try_get("content_url")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::test_support::seed_course;

    #[tokio::test]
    async fn test_study_tool_crud() {
        let (pool, course_id) = seed_course("63_G").await;
        let repo = SqlxStudyToolRepository::boxed(pool);

        let mut tool = StudyTool::new(
            course_id.clone(),
            "Midterm questions 2024".into(),
            ToolType::PreviousQuestions,
            ExamType::Midterm,
        );
        tool.content_url = Some("https://drive.example.com/q".into());
        repo.create(&tool).await.unwrap();

        let found = repo.get_by_id(&tool.id).await.unwrap().unwrap();
        assert_eq!(found.tool_type, ToolType::PreviousQuestions);
        assert_eq!(found.exam_type, ExamType::Midterm);
        assert_eq!(repo.list(Some(&course_id)).await.unwrap().len(), 1);
        assert_eq!(repo.section_of(&tool.id).await.unwrap().as_deref(), Some("63_G"));

        tool.exam_type = ExamType::Both;
        repo.update(&tool).await.unwrap();
        assert_eq!(
            repo.get_by_id(&tool.id).await.unwrap().unwrap().exam_type,
            ExamType::Both
        );

        assert!(repo.delete(&tool.id).await.unwrap());
        assert!(repo.list(None).await.unwrap().is_empty());
    }
}
