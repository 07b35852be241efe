//! Course model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Semester, StudyTool, Topic};

/// Course entity, owned by a semester
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub semester_id: String,
    pub title: String,
    pub course_code: String,
    pub teacher_name: String,
    pub teacher_email: Option<String>,
    pub credits: Option<i32>,
    pub description: Option<String>,
    pub is_highlighted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Course {
    /// Build a course from create input. Fields are expected to be validated.
    pub fn from_input(input: CreateCourseInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            semester_id: input.semester_id,
            title: input.title.trim().to_string(),
            course_code: input.course_code.trim().to_string(),
            teacher_name: input.teacher_name.trim().to_string(),
            teacher_email: input.teacher_email,
            credits: input.credits,
            description: input.description,
            is_highlighted: input.is_highlighted.unwrap_or(false),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update in place
    pub fn apply(&mut self, input: UpdateCourseInput) {
        if let Some(semester_id) = input.semester_id {
            self.semester_id = semester_id;
        }
        if let Some(title) = input.title {
            self.title = title.trim().to_string();
        }
        if let Some(code) = input.course_code {
            self.course_code = code.trim().to_string();
        }
        if let Some(name) = input.teacher_name {
            self.teacher_name = name.trim().to_string();
        }
        if input.teacher_email.is_some() {
            self.teacher_email = input.teacher_email;
        }
        if input.credits.is_some() {
            self.credits = input.credits;
        }
        if input.description.is_some() {
            self.description = input.description;
        }
        if let Some(highlighted) = input.is_highlighted {
            self.is_highlighted = highlighted;
        }
        self.updated_at = Utc::now();
    }
}

/// Input for creating a course
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCourseInput {
    #[serde(default)]
    pub semester_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub course_code: String,
    #[serde(default)]
    pub teacher_name: String,
    pub teacher_email: Option<String>,
    pub credits: Option<i32>,
    pub description: Option<String>,
    pub is_highlighted: Option<bool>,
}

/// Input for updating a course
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCourseInput {
    pub semester_id: Option<String>,
    pub title: Option<String>,
    pub course_code: Option<String>,
    pub teacher_name: Option<String>,
    pub teacher_email: Option<String>,
    pub credits: Option<i32>,
    pub description: Option<String>,
    pub is_highlighted: Option<bool>,
}

/// Course with its semester, topics and study tools
#[derive(Debug, Clone, Serialize)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    pub semester: Option<Semester>,
    pub topics: Vec<Topic>,
    pub study_tools: Vec<StudyTool>,
}
