//! Study tool model
//!
//! Study tools are course-level resources such as the syllabus, notes or
//! previous exam questions, tagged with the exam they relate to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Kind of study tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolType {
    Syllabus,
    StudyNotes,
    PreviousQuestions,
    MarkDistribution,
    Other,
}

impl fmt::Display for ToolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolType::Syllabus => write!(f, "syllabus"),
            ToolType::StudyNotes => write!(f, "study_notes"),
            ToolType::PreviousQuestions => write!(f, "previous_questions"),
            ToolType::MarkDistribution => write!(f, "mark_distribution"),
            ToolType::Other => write!(f, "other"),
        }
    }
}

impl FromStr for ToolType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "syllabus" => Ok(ToolType::Syllabus),
            "study_notes" => Ok(ToolType::StudyNotes),
            "previous_questions" => Ok(ToolType::PreviousQuestions),
            "mark_distribution" => Ok(ToolType::MarkDistribution),
            "other" => Ok(ToolType::Other),
            _ => Err(anyhow::anyhow!("Invalid tool type: {}", s)),
        }
    }
}

/// Exam a study tool relates to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamType {
    Midterm,
    Final,
    Both,
}

impl fmt::Display for ExamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExamType::Midterm => write!(f, "midterm"),
            ExamType::Final => write!(f, "final"),
            ExamType::Both => write!(f, "both"),
        }
    }
}

impl FromStr for ExamType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "midterm" => Ok(ExamType::Midterm),
            "final" => Ok(ExamType::Final),
            "both" => Ok(ExamType::Both),
            _ => Err(anyhow::anyhow!("Invalid exam type: {}", s)),
        }
    }
}

/// Study tool entity, owned by a course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyTool {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub tool_type: ToolType,
    pub exam_type: ExamType,
    pub content_url: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StudyTool {
    pub fn new(course_id: String, title: String, tool_type: ToolType, exam_type: ExamType) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            course_id,
            title,
            tool_type,
            exam_type,
            content_url: None,
            description: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for creating a study tool.
///
/// `tool_type` and `exam_type` arrive as strings and are parsed during
/// validation so bad values surface as validation errors.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateStudyToolInput {
    #[serde(default)]
    pub course_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tool_type: String,
    #[serde(default)]
    pub exam_type: String,
    pub content_url: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateStudyToolInput {
    pub course_id: Option<String>,
    pub title: Option<String>,
    pub tool_type: Option<String>,
    pub exam_type: Option<String>,
    pub content_url: Option<String>,
    pub description: Option<String>,
}
