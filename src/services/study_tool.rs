//! Study tool service
//!
//! Tool and exam types arrive as strings and are parsed here so unknown
//! values surface as validation errors instead of body rejections.

use crate::db::repositories::{CourseRepository, StudyToolRepository};
use crate::models::{
    AdminUser, ContentType, CreateStudyToolInput, ExamType, StudyTool, ToolType,
    UpdateStudyToolInput,
};
use crate::services::content::{ensure_section, require, ContentCaches, ContentError, Resource};
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;

pub(crate) fn parse_tool_type(value: &str) -> Result<ToolType, ContentError> {
    require("tool_type", value)?;
    value
        .parse()
        .map_err(|e: anyhow::Error| ContentError::Validation(e.to_string()))
}

pub(crate) fn parse_exam_type(value: &str) -> Result<ExamType, ContentError> {
    require("exam_type", value)?;
    value
        .parse()
        .map_err(|e: anyhow::Error| ContentError::Validation(e.to_string()))
}

pub struct StudyToolService {
    repo: Arc<dyn StudyToolRepository>,
    courses: Arc<dyn CourseRepository>,
    caches: ContentCaches,
}

impl StudyToolService {
    pub fn new(
        repo: Arc<dyn StudyToolRepository>,
        courses: Arc<dyn CourseRepository>,
        caches: ContentCaches,
    ) -> Self {
        Self { repo, courses, caches }
    }

    pub async fn list(&self, course_id: Option<&str>) -> Result<Vec<StudyTool>, ContentError> {
        let key = Resource::StudyTools.list_key(course_id);
        self.caches
            .list_or_load(&key, || async {
                self.repo.list(course_id).await.context("Failed to list study tools")
            })
            .await
    }

    pub async fn get(&self, id: &str) -> Result<StudyTool, ContentError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| ContentError::NotFound(format!("Study tool {}", id)))
    }

    async fn ensure_course(&self, actor: &AdminUser, course_id: &str) -> Result<(), ContentError> {
        let section = self.courses.section_of(course_id).await?;
        ensure_section(actor, section, &format!("Course {}", course_id))?;
        Ok(())
    }

    pub async fn create(
        &self,
        actor: &AdminUser,
        input: CreateStudyToolInput,
    ) -> Result<StudyTool, ContentError> {
        require("course_id", &input.course_id)?;
        require("title", &input.title)?;
        let tool_type = parse_tool_type(&input.tool_type)?;
        let exam_type = parse_exam_type(&input.exam_type)?;
        self.ensure_course(actor, &input.course_id).await?;

        let mut tool = StudyTool::new(
            input.course_id,
            input.title.trim().to_string(),
            tool_type,
            exam_type,
        );
        tool.content_url = input.content_url;
        tool.description = input.description;

        let tool = self.repo.create(&tool).await?;
        self.caches.invalidate_lists(Resource::StudyTools).await;
        Ok(tool)
    }

    pub async fn update(
        &self,
        actor: &AdminUser,
        id: &str,
        input: UpdateStudyToolInput,
    ) -> Result<StudyTool, ContentError> {
        let section = self.repo.section_of(id).await?;
        ensure_section(actor, section, &format!("Study tool {}", id))?;
        let mut tool = self.get(id).await?;

        if let Some(course_id) = input.course_id {
            self.ensure_course(actor, &course_id).await?;
            tool.course_id = course_id;
        }
        if let Some(title) = input.title {
            require("title", &title)?;
            tool.title = title.trim().to_string();
        }
        if let Some(tool_type) = input.tool_type {
            tool.tool_type = parse_tool_type(&tool_type)?;
        }
        if let Some(exam_type) = input.exam_type {
            tool.exam_type = parse_exam_type(&exam_type)?;
        }
        if input.content_url.is_some() {
            tool.content_url = input.content_url;
        }
        if input.description.is_some() {
            tool.description = input.description;
        }
        tool.updated_at = Utc::now();

        let updated = self.repo.update(&tool).await?;
        self.caches.forget(ContentType::StudyTool, id);
        self.caches.invalidate_lists(Resource::StudyTools).await;
        Ok(updated)
    }

    pub async fn delete(&self, actor: &AdminUser, id: &str) -> Result<(), ContentError> {
        let section = self.repo.section_of(id).await?;
        ensure_section(actor, section, &format!("Study tool {}", id))?;

        if !self.repo.delete(id).await? {
            return Err(ContentError::NotFound(format!("Study tool {}", id)));
        }
        self.caches.forget(ContentType::StudyTool, id);
        self.caches.invalidate_subtree(Resource::StudyTools).await;
        Ok(())
    }
}
