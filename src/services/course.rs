//! Course service

use crate::db::repositories::{
    CourseRepository, SemesterRepository, StudyToolRepository, TopicRepository,
};
use crate::models::{AdminUser, Course, CourseDetail, CreateCourseInput, UpdateCourseInput};
use crate::services::content::{ensure_section, require, ContentCaches, ContentError, Resource};
use anyhow::Context;
use std::sync::Arc;

pub struct CourseService {
    repo: Arc<dyn CourseRepository>,
    semesters: Arc<dyn SemesterRepository>,
    topics: Arc<dyn TopicRepository>,
    study_tools: Arc<dyn StudyToolRepository>,
    caches: ContentCaches,
}

impl CourseService {
    pub fn new(
        repo: Arc<dyn CourseRepository>,
        semesters: Arc<dyn SemesterRepository>,
        topics: Arc<dyn TopicRepository>,
        study_tools: Arc<dyn StudyToolRepository>,
        caches: ContentCaches,
    ) -> Self {
        Self {
            repo,
            semesters,
            topics,
            study_tools,
            caches,
        }
    }

    pub async fn list(&self, semester_id: Option<&str>) -> Result<Vec<Course>, ContentError> {
        let key = Resource::Courses.list_key(semester_id);
        self.caches
            .list_or_load(&key, || async {
                self.repo.list(semester_id).await.context("Failed to list courses")
            })
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Course, ContentError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| ContentError::NotFound(format!("Course {}", id)))
    }

    /// Course with its semester, topics and study tools
    pub async fn detail(&self, id: &str) -> Result<CourseDetail, ContentError> {
        let course = self.get(id).await?;

        let (semester, topics, study_tools) = tokio::try_join!(
            self.semesters.get_by_id(&course.semester_id),
            self.topics.list(Some(id)),
            self.study_tools.list(Some(id)),
        )
        .context("Failed to load course detail")?;

        Ok(CourseDetail {
            course,
            semester,
            topics,
            study_tools,
        })
    }

    /// Section of a semester, checked against the actor
    async fn ensure_semester(&self, actor: &AdminUser, semester_id: &str) -> Result<(), ContentError> {
        let section = self
            .semesters
            .get_by_id(semester_id)
            .await?
            .map(|semester| semester.section);
        ensure_section(actor, section, &format!("Semester {}", semester_id))?;
        Ok(())
    }

    pub async fn create(&self, actor: &AdminUser, input: CreateCourseInput) -> Result<Course, ContentError> {
        require("semester_id", &input.semester_id)?;
        require("title", &input.title)?;
        require("course_code", &input.course_code)?;
        require("teacher_name", &input.teacher_name)?;
        validate_credits(input.credits)?;
        self.ensure_semester(actor, &input.semester_id).await?;

        let course = self.repo.create(&Course::from_input(input)).await?;
        self.caches.invalidate_lists(Resource::Courses).await;
        tracing::info!("Course {} ({}) created by {}", course.id, course.course_code, actor.email);
        Ok(course)
    }

    pub async fn update(
        &self,
        actor: &AdminUser,
        id: &str,
        input: UpdateCourseInput,
    ) -> Result<Course, ContentError> {
        let section = self.repo.section_of(id).await?;
        ensure_section(actor, section, &format!("Course {}", id))?;
        let mut course = self.get(id).await?;

        for (field, value) in [
            ("title", &input.title),
            ("course_code", &input.course_code),
            ("teacher_name", &input.teacher_name),
        ] {
            if let Some(value) = value {
                require(field, value)?;
            }
        }
        validate_credits(input.credits)?;
        if let Some(semester_id) = &input.semester_id {
            self.ensure_semester(actor, semester_id).await?;
        }

        course.apply(input);
        let updated = self.repo.update(&course).await?;
        self.caches.invalidate_lists(Resource::Courses).await;
        Ok(updated)
    }

    pub async fn delete(&self, actor: &AdminUser, id: &str) -> Result<(), ContentError> {
        let section = self.repo.section_of(id).await?;
        ensure_section(actor, section, &format!("Course {}", id))?;

        if !self.repo.delete(id).await? {
            return Err(ContentError::NotFound(format!("Course {}", id)));
        }
        self.caches.invalidate_subtree(Resource::Courses).await;
        tracing::info!("Course {} deleted by {}", id, actor.email);
        Ok(())
    }
}

fn validate_credits(credits: Option<i32>) -> Result<(), ContentError> {
    match credits {
        Some(c) if c < 0 => Err(ContentError::Validation("credits must not be negative".into())),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::test_support::seed_course;
    use crate::db::repositories::{
        SqlxCourseRepository, SqlxSemesterRepository, SqlxStudyToolRepository, SqlxTopicRepository,
    };
    use crate::db::DynDatabasePool;
    use crate::models::{CreateTopicInput, Topic};
    use crate::services::test_support::{caches, section_admin, super_admin};

    fn service(pool: &DynDatabasePool) -> CourseService {
        CourseService::new(
            SqlxCourseRepository::boxed(pool.clone()),
            SqlxSemesterRepository::boxed(pool.clone()),
            SqlxTopicRepository::boxed(pool.clone()),
            SqlxStudyToolRepository::boxed(pool.clone()),
            caches(),
        )
    }

    #[tokio::test]
    async fn test_detail_includes_semester_and_topics() {
        let (pool, course_id) = seed_course("63_G").await;
        SqlxTopicRepository::new(pool.clone())
            .create(&Topic::from_input(CreateTopicInput {
                course_id: course_id.clone(),
                title: "Graphs".into(),
                ..Default::default()
            }))
            .await
            .unwrap();

        let detail = service(&pool).detail(&course_id).await.unwrap();
        assert_eq!(detail.course.id, course_id);
        assert_eq!(detail.semester.map(|s| s.section).as_deref(), Some("63_G"));
        assert_eq!(detail.topics.len(), 1);
        assert!(detail.study_tools.is_empty());
    }

    #[tokio::test]
    async fn test_create_validates_required_fields_and_parent() {
        let (pool, course_id) = seed_course("63_G").await;
        let service = service(&pool);
        let semester_id = service.get(&course_id).await.unwrap().semester_id;

        let missing_code = CreateCourseInput {
            semester_id: semester_id.clone(),
            title: "Algorithms".into(),
            teacher_name: "Dr. Rahman".into(),
            ..Default::default()
        };
        assert!(matches!(
            service.create(&super_admin(), missing_code).await,
            Err(ContentError::Validation(_))
        ));

        let orphan = CreateCourseInput {
            semester_id: "nope".into(),
            title: "Algorithms".into(),
            course_code: "CSE301".into(),
            teacher_name: "Dr. Rahman".into(),
            ..Default::default()
        };
        assert!(matches!(
            service.create(&super_admin(), orphan).await,
            Err(ContentError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_section_admin_cannot_touch_other_section() {
        let (pool, course_id) = seed_course("B").await;
        let service = service(&pool);
        let outsider = section_admin("A");

        let result = service
            .update(
                &outsider,
                &course_id,
                UpdateCourseInput {
                    title: Some("Renamed".into()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(ContentError::Forbidden(_))));
        assert!(matches!(
            service.delete(&outsider, &course_id).await,
            Err(ContentError::Forbidden(_))
        ));

        let insider = section_admin("B");
        let updated = service
            .update(
                &insider,
                &course_id,
                UpdateCourseInput {
                    is_highlighted: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.is_highlighted);
    }

    #[tokio::test]
    async fn test_delete_unknown_course_is_not_found() {
        let (pool, _) = seed_course("63_G").await;
        assert!(matches!(
            service(&pool).delete(&super_admin(), "missing").await,
            Err(ContentError::NotFound(_))
        ));
    }
}
