//! Course repository
//!
//! Database operations for courses, including resolving the section a
//! course belongs to through its semester.

use crate::db::{DynDatabasePool, PoolRef};
use crate::models::Course;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{postgres::PgRow, sqlite::SqliteRow, PgExecutor, PgPool, Row, SqliteExecutor, SqlitePool};
use std::sync::Arc;

const COURSE_COLUMNS: &str = "id, semester_id, title, course_code, teacher_name, teacher_email, \
     credits, description, is_highlighted, created_at, updated_at";

const INSERT_COURSE: &str = r#"
    INSERT INTO courses (id, semester_id, title, course_code, teacher_name, teacher_email,
                         credits, description, is_highlighted, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
"#;

const UPDATE_COURSE: &str = r#"
    UPDATE courses
    SET semester_id = $1, title = $2, course_code = $3, teacher_name = $4, teacher_email = $5,
        credits = $6, description = $7, is_highlighted = $8, updated_at = $9
    WHERE id = $10
"#;

const SECTION_OF_COURSE: &str = r#"
    SELECT s.section
    FROM courses c
    JOIN semesters s ON s.id = c.semester_id
    WHERE c.id = $1
"#;

/// Course repository trait
#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn create(&self, course: &Course) -> Result<Course>;

    async fn get_by_id(&self, id: &str) -> Result<Option<Course>>;

    /// List courses, optionally limited to one semester
    async fn list(&self, semester_id: Option<&str>) -> Result<Vec<Course>>;

    async fn update(&self, course: &Course) -> Result<Course>;

    /// Delete a course. Returns false if it did not exist.
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Section code of the semester that owns the course
    async fn section_of(&self, id: &str) -> Result<Option<String>>;
}

/// SQLx-based course repository implementation
pub struct SqlxCourseRepository {
    pool: DynDatabasePool,
}

impl SqlxCourseRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CourseRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CourseRepository for SqlxCourseRepository {
    async fn create(&self, course: &Course) -> Result<Course> {
        match self.pool.backend() {
            PoolRef::Sqlite(pool) => insert_course_sqlite(pool, course).await?,
            PoolRef::Postgres(pool) => insert_course_postgres(pool, course).await?,
        }
        Ok(course.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Course>> {
        match self.pool.backend() {
            PoolRef::Sqlite(pool) => get_course_sqlite(pool, id).await,
            PoolRef::Postgres(pool) => get_course_postgres(pool, id).await,
        }
    }

    async fn list(&self, semester_id: Option<&str>) -> Result<Vec<Course>> {
        match self.pool.backend() {
            PoolRef::Sqlite(pool) => list_courses_sqlite(pool, semester_id).await,
            PoolRef::Postgres(pool) => list_courses_postgres(pool, semester_id).await,
        }
    }

    async fn update(&self, course: &Course) -> Result<Course> {
        match self.pool.backend() {
            PoolRef::Sqlite(pool) => update_course_sqlite(pool, course).await?,
            PoolRef::Postgres(pool) => update_course_postgres(pool, course).await?,
        }
        Ok(course.clone())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let affected = match self.pool.backend() {
            PoolRef::Sqlite(pool) => sqlx::query("DELETE FROM courses WHERE id = $1")
                .bind(id)
                .execute(pool)
                .await
                .context("Failed to delete course")?
                .rows_affected(),
            PoolRef::Postgres(pool) => sqlx::query("DELETE FROM courses WHERE id = $1")
                .bind(id)
                .execute(pool)
                .await
                .context("Failed to delete course")?
                .rows_affected(),
        };
        Ok(affected > 0)
    }

    async fn section_of(&self, id: &str) -> Result<Option<String>> {
        let section = match self.pool.backend() {
            PoolRef::Sqlite(pool) => sqlx::query_scalar::<_, String>(SECTION_OF_COURSE)
                .bind(id)
                .fetch_optional(pool)
                .await,
            PoolRef::Postgres(pool) => sqlx::query_scalar::<_, String>(SECTION_OF_COURSE)
                .bind(id)
                .fetch_optional(pool)
                .await,
        }
        .context("Failed to resolve course section")?;
        Ok(section)
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

pub(crate) async fn insert_course_sqlite<'e, E: SqliteExecutor<'e>>(
    executor: E,
    course: &Course,
) -> Result<()> {
    sqlx::query(INSERT_COURSE)
        .bind(&course.id)
        .bind(&course.semester_id)
        .bind(&course.title)
        .bind(&course.course_code)
        .bind(&course.teacher_name)
        .bind(&course.teacher_email)
        .bind(course.credits)
        .bind(&course.description)
        .bind(course.is_highlighted)
        .bind(course.created_at)
        .bind(course.updated_at)
        .execute(executor)
        .await
        .context("Failed to create course")?;
    Ok(())
}

async fn get_course_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<Course>> {
    let row = sqlx::query(&format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get course by ID")?;

    row.as_ref().map(row_to_course_sqlite).transpose()
}

async fn list_courses_sqlite(pool: &SqlitePool, semester_id: Option<&str>) -> Result<Vec<Course>> {
    let rows = match semester_id {
        Some(semester_id) => {
            sqlx::query(&format!(
                "SELECT {COURSE_COLUMNS} FROM courses WHERE semester_id = $1 ORDER BY course_code, created_at"
            ))
            .bind(semester_id)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query(&format!(
                "SELECT {COURSE_COLUMNS} FROM courses ORDER BY course_code, created_at"
            ))
            .fetch_all(pool)
            .await
        }
    }
    .context("Failed to list courses")?;

    rows.iter().map(row_to_course_sqlite).collect()
}

async fn update_course_sqlite(pool: &SqlitePool, course: &Course) -> Result<()> {
    sqlx::query(UPDATE_COURSE)
        .bind(&course.semester_id)
        .bind(&course.title)
        .bind(&course.course_code)
        .bind(&course.teacher_name)
        .bind(&course.teacher_email)
        .bind(course.credits)
        .bind(&course.description)
        .bind(course.is_highlighted)
        .bind(course.updated_at)
        .bind(&course.id)
        .execute(pool)
        .await
        .context("Failed to update course")?;
    Ok(())
}

fn row_to_course_sqlite(row: &SqliteRow) -> Result<Course> {
    Ok(Course {
        id: row.try_get("id")?,
        semester_id: row.try_get("semester_id")?,
        title: row.try_get("title")?,
        course_code: row.try_get("course_code")?,
        teacher_name: row.try_get("teacher_name")?,
        teacher_email: row.try_get("teacher_email")?,
        credits: row.try_get("credits")?,
        description: row.try_get("description")?,
        is_highlighted: row.try_get("is_highlighted")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

// ============================================================================
// Postgres implementations
// ============================================================================

pub(crate) async fn insert_course_postgres<'e, E: PgExecutor<'e>>(
    executor: E,
    course: &Course,
) -> Result<()> {
    sqlx::query(INSERT_COURSE)
        .bind(&course.id)
        .bind(&course.semester_id)
        .bind(&course.title)
        .bind(&course.course_code)
        .bind(&course.teacher_name)
        .bind(&course.teacher_email)
        .bind(course.credits)
        .bind(&course.description)
        .bind(course.is_highlighted)
        .bind(course.created_at)
        .bind(course.updated_at)
        .execute(executor)
        .await
        .context("Failed to create course")?;
    Ok(())
}

async fn get_course_postgres(pool: &PgPool, id: &str) -> Result<Option<Course>> {
    let row = sqlx::query(&format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get course by ID")?;

    row.as_ref().map(row_to_course_postgres).transpose()
}

async fn list_courses_postgres(pool: &PgPool, semester_id: Option<&str>) -> Result<Vec<Course>> {
    let rows = match semester_id {
        Some(semester_id) => {
            sqlx::query(&format!(
                "SELECT {COURSE_COLUMNS} FROM courses WHERE semester_id = $1 ORDER BY course_code, created_at"
            ))
            .bind(semester_id)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query(&format!(
                "SELECT {COURSE_COLUMNS} FROM courses ORDER BY course_code, created_at"
            ))
            .fetch_all(pool)
            .await
        }
    }
    .context("Failed to list courses")?;

    rows.iter().map(row_to_course_postgres).collect()
}

async fn update_course_postgres(pool: &PgPool, course: &Course) -> Result<()> {
    sqlx::query(UPDATE_COURSE)
        .bind(&course.semester_id)
        .bind(&course.title)
        .bind(&course.course_code)
        .bind(&course.teacher_name)
        .bind(&course.teacher_email)
        .bind(course.credits)
        .bind(&course.description)
        .bind(course.is_highlighted)
        .bind(course.updated_at)
        .bind(&course.id)
        .execute(pool)
        .await
        .context("Failed to update course")?;
    Ok(())
}

fn row_to_course_postgres(row: &PgRow) -> Result<Course> {
    Ok(Course {
        id: row.try_get("id")?,
        semester_id: row.try_get("semester_id")?,
        title: row.try_get("title")?,
        course_code: row.try_get("course_code")?,
        teacher_name: row.try_get("teacher_name")?,
        teacher_email: row.try_get("teacher_email")?,
        credits: row.try_get("credits")?,
        description: row.try_get("description")?,
        is_highlighted: row.try_get("is_highlighted")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SemesterRepository, SqlxSemesterRepository};
    use crate::db::{create_test_pool, migrations::run_migrations};
    use crate::models::{CreateCourseInput, Semester};

    async fn setup() -> (Arc<dyn SemesterRepository>, Arc<dyn CourseRepository>) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        run_migrations(&pool).await.expect("Failed to run migrations");
        (
            SqlxSemesterRepository::boxed(pool.clone()),
            SqlxCourseRepository::boxed(pool),
        )
    }

    fn course(semester_id: &str, code: &str) -> Course {
        Course::from_input(CreateCourseInput {
            semester_id: semester_id.to_string(),
            title: format!("Course {code}"),
            course_code: code.to_string(),
            teacher_name: "Dr. Rahman".to_string(),
            credits: Some(3),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_create_list_and_section() {
        let (semesters, courses) = setup().await;
        let semester = Semester::new("Spring".into(), "63_G".into());
        semesters.create(&semester).await.unwrap();

        let c1 = courses.create(&course(&semester.id, "CSE201")).await.unwrap();
        courses.create(&course(&semester.id, "CSE101")).await.unwrap();

        let listed = courses.list(Some(&semester.id)).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].course_code, "CSE101");

        let found = courses.get_by_id(&c1.id).await.unwrap().unwrap();
        assert_eq!(found.credits, Some(3));
        assert!(!found.is_highlighted);

        assert_eq!(courses.section_of(&c1.id).await.unwrap().as_deref(), Some("63_G"));
        assert!(courses.section_of("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_with_missing_semester_fails() {
        let (_, courses) = setup().await;
        assert!(courses.create(&course("missing", "CSE101")).await.is_err());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (semesters, courses) = setup().await;
        let semester = Semester::new("Spring".into(), "A".into());
        semesters.create(&semester).await.unwrap();
        let mut c = courses.create(&course(&semester.id, "CSE301")).await.unwrap();

        c.is_highlighted = true;
        c.teacher_email = Some("t@cse.edu".into());
        courses.update(&c).await.unwrap();

        let found = courses.get_by_id(&c.id).await.unwrap().unwrap();
        assert!(found.is_highlighted);
        assert_eq!(found.teacher_email.as_deref(), Some("t@cse.edu"));

        assert!(courses.delete(&c.id).await.unwrap());
        assert!(courses.get_by_id(&c.id).await.unwrap().is_none());
    }
}
