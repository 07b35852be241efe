//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles CRUD operations for a specific entity; the bulk
//! repository inserts a whole all-in-one plan in one transaction.

pub mod admin_user;
pub mod bulk;
pub mod course;
pub mod semester;
pub mod session;
pub mod slide;
pub mod study_tool;
pub mod topic;
pub mod video;

#[cfg(test)]
pub(crate) mod test_support;

pub use admin_user::{AdminUserRepository, SqlxAdminUserRepository};
pub use bulk::{BulkInsertError, BulkRepository, BulkStage, SqlxBulkRepository};
pub use course::{CourseRepository, SqlxCourseRepository};
pub use semester::{SemesterRepository, SqlxSemesterRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
pub use slide::{SlideRepository, SqlxSlideRepository};
pub use study_tool::{SqlxStudyToolRepository, StudyToolRepository};
pub use topic::{SqlxTopicRepository, TopicRepository};
pub use video::{SqlxVideoRepository, VideoRepository};
