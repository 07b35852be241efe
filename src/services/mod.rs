//! Services layer - Business logic
//!
//! Services implement the business rules on top of the repositories:
//! validation, section-scoped authorization, cache maintenance and the
//! admin authentication flow.

pub mod admin_user;
pub mod auth;
pub mod bulk;
pub mod content;
pub mod course;
pub mod password;
pub mod semester;
pub mod share;
pub mod slide;
pub mod study_tool;
pub mod token;
pub mod topic;
pub mod video;

#[cfg(test)]
pub(crate) mod test_support;

pub use admin_user::{AdminUserError, AdminUserService};
pub use auth::{AuthError, AuthService, ClientInfo, LoginInput, LoginOutcome};
pub use bulk::{build_plan, BulkCreateError, BulkService};
pub use content::{ContentCaches, ContentError, ContentLookup, ContentService};
pub use course::CourseService;
pub use password::{hash_password, verify_password};
pub use semester::SemesterService;
pub use share::{generate_share_url, is_shareable_id, parse_share_url, share_path, SharedItem};
pub use slide::SlideService;
pub use study_tool::StudyToolService;
pub use token::{Claims, TokenIssuer, TokenKind};
pub use topic::TopicService;
pub use video::VideoService;
