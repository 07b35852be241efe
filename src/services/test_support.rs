//! Fixtures shared by service tests

use crate::cache::{ContentCache, MemoryCache};
use crate::models::{AdminRole, AdminUser};
use crate::services::ContentCaches;
use std::sync::Arc;
use std::time::Duration;

pub fn caches() -> ContentCaches {
    ContentCaches::new(
        Arc::new(MemoryCache::new()),
        Arc::new(ContentCache::new(10, 1024 * 1024, Duration::from_secs(60))),
    )
}

pub fn super_admin() -> AdminUser {
    AdminUser::new(
        "root@cse.edu",
        "Root".into(),
        "hash".into(),
        AdminRole::SuperAdmin,
        None,
    )
}

pub fn section_admin(department: &str) -> AdminUser {
    AdminUser::new(
        "section@cse.edu",
        "Section Admin".into(),
        "hash".into(),
        AdminRole::SectionAdmin,
        Some(department.into()),
    )
}
