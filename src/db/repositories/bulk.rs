//! Transactional bulk insert for the all-in-one creator
//!
//! Inserts a prepared [`BulkPlan`] (semester, courses, topics, slides, videos,
//! study tools) inside a single transaction. Any failure rolls the whole plan
//! back and reports the stage that failed.

use crate::db::repositories::{
    course::{insert_course_postgres, insert_course_sqlite},
    semester::{insert_semester_postgres, insert_semester_sqlite},
    slide::{insert_slide_postgres, insert_slide_sqlite},
    study_tool::{insert_study_tool_postgres, insert_study_tool_sqlite},
    topic::{insert_topic_postgres, insert_topic_sqlite},
    video::{insert_video_postgres, insert_video_sqlite},
};
use crate::db::{DynDatabasePool, PoolRef};
use crate::models::BulkPlan;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Sqlite, SqlitePool, Transaction};
use std::fmt;
use std::sync::Arc;

/// Step of the bulk insert that was running when it failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkStage {
    Begin,
    Semester,
    Courses,
    Topics,
    Slides,
    Videos,
    StudyTools,
    Commit,
}

impl BulkStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            BulkStage::Begin => "begin",
            BulkStage::Semester => "semester",
            BulkStage::Courses => "courses",
            BulkStage::Topics => "topics",
            BulkStage::Slides => "slides",
            BulkStage::Videos => "videos",
            BulkStage::StudyTools => "study_tools",
            BulkStage::Commit => "commit",
        }
    }
}

impl fmt::Display for BulkStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed, rolled-back bulk insert
#[derive(Debug, thiserror::Error)]
#[error("bulk insert failed at stage '{stage}': {source}")]
pub struct BulkInsertError {
    pub stage: BulkStage,
    #[source]
    pub source: anyhow::Error,
}

impl BulkInsertError {
    fn at(stage: BulkStage) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| Self { stage, source }
    }
}

/// Bulk repository trait
#[async_trait]
pub trait BulkRepository: Send + Sync {
    /// Insert every row of the plan, or none of them
    async fn insert_plan(&self, plan: &BulkPlan) -> Result<(), BulkInsertError>;
}

/// SQLx-based bulk repository implementation
pub struct SqlxBulkRepository {
    pool: DynDatabasePool,
}

impl SqlxBulkRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn BulkRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl BulkRepository for SqlxBulkRepository {
    async fn insert_plan(&self, plan: &BulkPlan) -> Result<(), BulkInsertError> {
        match self.pool.backend() {
            PoolRef::Sqlite(pool) => insert_plan_sqlite(pool, plan).await,
            PoolRef::Postgres(pool) => insert_plan_postgres(pool, plan).await,
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn insert_plan_sqlite(pool: &SqlitePool, plan: &BulkPlan) -> Result<(), BulkInsertError> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| BulkInsertError::at(BulkStage::Begin)(e.into()))?;

    if let Err(err) = insert_rows_sqlite(&mut tx, plan).await {
        if let Err(rollback_err) = tx.rollback().await {
            tracing::error!("Failed to roll back bulk insert: {}", rollback_err);
        }
        return Err(err);
    }

    tx.commit()
        .await
        .map_err(|e| BulkInsertError::at(BulkStage::Commit)(e.into()))
}

async fn insert_rows_sqlite(
    tx: &mut Transaction<'_, Sqlite>,
    plan: &BulkPlan,
) -> Result<(), BulkInsertError> {
    insert_semester_sqlite(&mut **tx, &plan.semester)
        .await
        .map_err(BulkInsertError::at(BulkStage::Semester))?;
    for course in &plan.courses {
        insert_course_sqlite(&mut **tx, course)
            .await
            .map_err(BulkInsertError::at(BulkStage::Courses))?;
    }
    for topic in &plan.topics {
        insert_topic_sqlite(&mut **tx, topic)
            .await
            .map_err(BulkInsertError::at(BulkStage::Topics))?;
    }
    for slide in &plan.slides {
        insert_slide_sqlite(&mut **tx, slide)
            .await
            .map_err(BulkInsertError::at(BulkStage::Slides))?;
    }
    for video in &plan.videos {
        insert_video_sqlite(&mut **tx, video)
            .await
            .map_err(BulkInsertError::at(BulkStage::Videos))?;
    }
    for tool in &plan.study_tools {
        insert_study_tool_sqlite(&mut **tx, tool)
            .await
            .map_err(BulkInsertError::at(BulkStage::StudyTools))?;
    }
    Ok(())
}

// ============================================================================
// Postgres implementations
// ============================================================================

async fn insert_plan_postgres(pool: &PgPool, plan: &BulkPlan) -> Result<(), BulkInsertError> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| BulkInsertError::at(BulkStage::Begin)(e.into()))?;

    if let Err(err) = insert_rows_postgres(&mut tx, plan).await {
        if let Err(rollback_err) = tx.rollback().await {
            tracing::error!("Failed to roll back bulk insert: {}", rollback_err);
        }
        return Err(err);
    }

    tx.commit()
        .await
        .map_err(|e| BulkInsertError::at(BulkStage::Commit)(e.into()))
}

async fn insert_rows_postgres(
    tx: &mut Transaction<'_, Postgres>,
    plan: &BulkPlan,
) -> Result<(), BulkInsertError> {
    insert_semester_postgres(&mut **tx, &plan.semester)
        .await
        .map_err(BulkInsertError::at(BulkStage::Semester))?;
    for course in &plan.courses {
        insert_course_postgres(&mut **tx, course)
            .await
            .map_err(BulkInsertError::at(BulkStage::Courses))?;
    }
    for topic in &plan.topics {
        insert_topic_postgres(&mut **tx, topic)
            .await
            .map_err(BulkInsertError::at(BulkStage::Topics))?;
    }
    for slide in &plan.slides {
        insert_slide_postgres(&mut **tx, slide)
            .await
            .map_err(BulkInsertError::at(BulkStage::Slides))?;
    }
    for video in &plan.videos {
        insert_video_postgres(&mut **tx, video)
            .await
            .map_err(BulkInsertError::at(BulkStage::Videos))?;
    }
    for tool in &plan.study_tools {
        insert_study_tool_postgres(&mut **tx, tool)
            .await
            .map_err(BulkInsertError::at(BulkStage::StudyTools))?;
    }
    Ok(())
}
