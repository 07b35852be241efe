//! All-in-one creator
//!
//! Turns a nested semester → courses → topics → slides/videos (+ study tools)
//! request into a [`BulkPlan`], validating every level before anything is
//! written, then inserts the plan in one transaction.

use crate::db::repositories::{BulkInsertError, BulkRepository, BulkStage};
use crate::models::{
    AdminUser, AllInOneInput, AllInOneResult, BulkPlan, Course, CreateCourseInput,
    CreateSemesterInput, CreateSlideInput, CreateTopicInput, CreateVideoInput, Semester, Slide,
    StudyTool, Topic, Video,
};
use crate::services::content::{
    ensure_section, require, require_url, ContentCaches, ContentError, Resource,
};
use crate::services::study_tool::{parse_exam_type, parse_tool_type};
use std::sync::Arc;

/// Error types for the all-in-one creator
#[derive(Debug, thiserror::Error)]
pub enum BulkCreateError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Insert failed and was rolled back
    #[error("Bulk creation failed at stage '{stage}'")]
    Failed {
        stage: BulkStage,
        #[source]
        source: anyhow::Error,
    },

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl From<ContentError> for BulkCreateError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::Validation(msg) => BulkCreateError::Validation(msg),
            ContentError::Forbidden(msg) => BulkCreateError::Forbidden(msg),
            ContentError::NotFound(what) => BulkCreateError::Validation(format!("{} not found", what)),
            ContentError::InternalError(e) => BulkCreateError::InternalError(e),
        }
    }
}

impl From<BulkInsertError> for BulkCreateError {
    fn from(err: BulkInsertError) -> Self {
        BulkCreateError::Failed {
            stage: err.stage,
            source: err.source,
        }
    }
}

pub struct BulkService {
    repo: Arc<dyn BulkRepository>,
    caches: ContentCaches,
}

impl BulkService {
    pub fn new(repo: Arc<dyn BulkRepository>, caches: ContentCaches) -> Self {
        Self { repo, caches }
    }

    pub async fn create_all(
        &self,
        actor: &AdminUser,
        input: AllInOneInput,
    ) -> Result<AllInOneResult, BulkCreateError> {
        let plan = build_plan(input)?;
        ensure_section(actor, Some(plan.semester.section.clone()), "Section")?;

        if let Err(err) = self.repo.insert_plan(&plan).await {
            tracing::error!(
                "All-in-one creation of '{}' rolled back at stage {}: {:#}",
                plan.semester.title,
                err.stage,
                err.source
            );
            return Err(err.into());
        }

        self.caches.invalidate_subtree(Resource::Semesters).await;

        let summary = plan.summary();
        tracing::info!(
            "All-in-one semester {} created by {}: {} courses, {} topics, {} slides, {} videos, {} study tools",
            plan.semester.id,
            actor.email,
            summary.courses_created,
            summary.topics_created,
            summary.slides_created,
            summary.videos_created,
            summary.study_tools_created
        );

        Ok(AllInOneResult {
            semester: plan.semester,
            courses: plan.courses,
            summary,
        })
    }
}

/// Validate the nested input and assign ids and parent links.
///
/// Topic, slide and video order defaults to the position in the request.
pub fn build_plan(input: AllInOneInput) -> Result<BulkPlan, BulkCreateError> {
    let semester_input = input.semester;
    require("semester.title", &semester_input.title)?;
    require("semester.section", &semester_input.section)?;
    let semester = Semester::from_input(CreateSemesterInput {
        title: semester_input.title,
        section: semester_input.section,
        description: semester_input.description,
        start_date: semester_input.start_date,
        end_date: semester_input.end_date,
        is_active: semester_input.is_active,
    });

    let mut plan = BulkPlan {
        semester,
        courses: Vec::with_capacity(input.courses.len()),
        topics: Vec::new(),
        slides: Vec::new(),
        videos: Vec::new(),
        study_tools: Vec::new(),
    };

    for (ci, course_input) in input.courses.into_iter().enumerate() {
        let path = format!("courses[{}]", ci);
        require(&format!("{}.title", path), &course_input.title)?;
        require(&format!("{}.course_code", path), &course_input.course_code)?;
        require(&format!("{}.teacher_name", path), &course_input.teacher_name)?;

        let course = Course::from_input(CreateCourseInput {
            semester_id: plan.semester.id.clone(),
            title: course_input.title,
            course_code: course_input.course_code,
            teacher_name: course_input.teacher_name,
            teacher_email: course_input.teacher_email,
            credits: course_input.credits,
            description: course_input.description,
            is_highlighted: course_input.is_highlighted,
        });

        for (ti, topic_input) in course_input.topics.into_iter().enumerate() {
            let path = format!("{}.topics[{}]", path, ti);
            require(&format!("{}.title", path), &topic_input.title)?;

            let topic = Topic::from_input(CreateTopicInput {
                course_id: course.id.clone(),
                title: topic_input.title,
                description: topic_input.description,
                order_index: Some(topic_input.order_index.unwrap_or(position(ti))),
            });

            for (si, slide_input) in topic_input.slides.into_iter().enumerate() {
                let path = format!("{}.slides[{}]", path, si);
                require(&format!("{}.title", path), &slide_input.title)?;
                require_url(&format!("{}.url", path), &slide_input.url)?;
                plan.slides.push(Slide::from_input(CreateSlideInput {
                    topic_id: topic.id.clone(),
                    title: slide_input.title,
                    url: slide_input.url,
                    description: slide_input.description,
                    order_index: Some(position(si)),
                }));
            }

            for (vi, video_input) in topic_input.videos.into_iter().enumerate() {
                let path = format!("{}.videos[{}]", path, vi);
                require(&format!("{}.title", path), &video_input.title)?;
                require_url(&format!("{}.url", path), &video_input.url)?;
                plan.videos.push(Video::from_input(CreateVideoInput {
                    topic_id: topic.id.clone(),
                    title: video_input.title,
                    url: video_input.url,
                    description: video_input.description,
                    duration: video_input.duration,
                    order_index: Some(position(vi)),
                }));
            }

            plan.topics.push(topic);
        }

        for (si, tool_input) in course_input.study_tools.into_iter().enumerate() {
            let path = format!("{}.study_tools[{}]", path, si);
            require(&format!("{}.title", path), &tool_input.title)?;
            let tool_type = parse_tool_type(&tool_input.tool_type)?;
            let exam_type = parse_exam_type(&tool_input.exam_type)?;

            let mut tool = StudyTool::new(
                course.id.clone(),
                tool_input.title.trim().to_string(),
                tool_type,
                exam_type,
            );
            tool.content_url = tool_input.content_url;
            tool.description = tool_input.description;
            plan.study_tools.push(tool);
        }

        plan.courses.push(course);
    }

    Ok(plan)
}

fn position(index: usize) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}
