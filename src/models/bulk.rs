//! All-in-one creation payloads
//!
//! A single request describing a semester with its courses, their topics
//! (each with slides and videos) and study tools.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Course, Semester, Slide, StudyTool, Topic, Video};

/// Request body for the all-in-one creator
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AllInOneInput {
    pub semester: BulkSemesterInput,
    #[serde(default)]
    pub courses: Vec<BulkCourseInput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BulkSemesterInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub section: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BulkCourseInput {
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
    #[serde(default)]
    pub topics: Vec<BulkTopicInput>,
    #[serde(default)]
    pub study_tools: Vec<BulkStudyToolInput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BulkTopicInput {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    /// Defaults to the topic's position in the list
    pub order_index: Option<i32>,
    #[serde(default)]
    pub slides: Vec<BulkSlideInput>,
    #[serde(default)]
    pub videos: Vec<BulkVideoInput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BulkSlideInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BulkVideoInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    pub description: Option<String>,
    pub duration: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BulkStudyToolInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tool_type: String,
    #[serde(default)]
    pub exam_type: String,
    pub content_url: Option<String>,
    pub description: Option<String>,
}

/// Fully built rows, ready to be inserted in one transaction
#[derive(Debug, Clone)]
pub struct BulkPlan {
    pub semester: Semester,
    pub courses: Vec<Course>,
    pub topics: Vec<Topic>,
    pub slides: Vec<Slide>,
    pub videos: Vec<Video>,
    pub study_tools: Vec<StudyTool>,
}

impl BulkPlan {
    pub fn summary(&self) -> BulkSummary {
        BulkSummary {
            courses_created: self.courses.len(),
            topics_created: self.topics.len(),
            slides_created: self.slides.len(),
            videos_created: self.videos.len(),
            study_tools_created: self.study_tools.len(),
        }
    }
}

/// Counts of created rows, by kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BulkSummary {
    pub courses_created: usize,
    pub topics_created: usize,
    pub slides_created: usize,
    pub videos_created: usize,
    pub study_tools_created: usize,
}

/// Result of a committed all-in-one creation
#[derive(Debug, Clone, Serialize)]
pub struct AllInOneResult {
    pub semester: Semester,
    pub courses: Vec<Course>,
    pub summary: BulkSummary,
}
