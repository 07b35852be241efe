//! Data models
//!
//! This module contains all data structures used throughout the LMS backend:
//! - Database entities (Semester, Course, Topic, Slide, Video, StudyTool, AdminUser, AdminSession)
//! - API request inputs
//! - Composite read models (course and topic details, all-in-one results)

mod admin_user;
mod bulk;
mod content;
mod course;
mod semester;
mod session;
mod slide;
mod study_tool;
mod topic;
mod video;

pub use admin_user::{normalize_email, AdminRole, AdminUser, CreateAdminUserInput, UpdateAdminUserInput};
pub use bulk::{
    AllInOneInput, AllInOneResult, BulkCourseInput, BulkPlan, BulkSemesterInput, BulkSlideInput,
    BulkStudyToolInput, BulkSummary, BulkTopicInput, BulkVideoInput,
};
pub use content::ContentType;
pub use course::{Course, CourseDetail, CreateCourseInput, UpdateCourseInput};
pub use semester::{CreateSemesterInput, Semester, UpdateSemesterInput};
pub use session::AdminSession;
pub use slide::{CreateSlideInput, Slide, UpdateSlideInput};
pub use study_tool::{CreateStudyToolInput, ExamType, StudyTool, ToolType, UpdateStudyToolInput};
pub use topic::{CreateTopicInput, Topic, TopicDetail, UpdateTopicInput};
pub use video::{CreateVideoInput, UpdateVideoInput, Video};
