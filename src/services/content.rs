//! Content services shared pieces
//!
//! - [`ContentError`]: error type of every content service
//! - [`ContentCaches`]: query cache + content cache handles with the list
//!   caching and invalidation rules
//! - [`ContentService`]: single slide/video/study-tool lookup through the
//!   bounded content cache

use crate::cache::{CacheKey, CacheLayer, ContentCache, ContentCacheStats, MemoryCache};
use crate::db::repositories::{SlideRepository, StudyToolRepository, VideoRepository};
use crate::models::{AdminUser, ContentType};
use anyhow::Context;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

/// Error types for content service operations
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// Missing or malformed input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Row (or its parent) does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Actor may not touch this section
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Fail with a validation error when `value` is blank
pub(crate) fn require(field: &str, value: &str) -> Result<(), ContentError> {
    if value.trim().is_empty() {
        return Err(ContentError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

/// Links must be absolute http(s) URLs
pub(crate) fn require_url(field: &str, value: &str) -> Result<(), ContentError> {
    require(field, value)?;
    let value = value.trim();
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        return Err(ContentError::Validation(format!(
            "{} must be an http(s) URL",
            field
        )));
    }
    Ok(())
}

/// Check that `actor` may manage rows of `section`.
///
/// `section` is `None` when the row (or its parent) was not found; `missing`
/// names it for the error.
pub(crate) fn ensure_section(
    actor: &AdminUser,
    section: Option<String>,
    missing: &str,
) -> Result<String, ContentError> {
    let section = section.ok_or_else(|| ContentError::NotFound(missing.to_string()))?;
    if !actor.can_manage_section(&section) {
        tracing::warn!(
            "Admin {} ({}) denied access to section {}",
            actor.email,
            actor.role,
            section
        );
        return Err(ContentError::Forbidden(format!(
            "You can only manage content in section {}",
            actor.department.as_deref().unwrap_or("(none)")
        )));
    }
    Ok(section)
}

/// Cached resource kinds, ordered parent to child
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resource {
    Semesters,
    Courses,
    Topics,
    Slides,
    Videos,
    StudyTools,
}

impl Resource {
    fn prefix(self) -> &'static str {
        match self {
            Resource::Semesters => "semesters:",
            Resource::Courses => "courses:",
            Resource::Topics => "topics:",
            Resource::Slides => "slides:",
            Resource::Videos => "videos:",
            Resource::StudyTools => "study_tools:",
        }
    }

    /// This resource and everything a delete cascades to
    fn subtree(self) -> &'static [Resource] {
        use Resource::*;
        match self {
            Semesters => &[Semesters, Courses, Topics, Slides, Videos, StudyTools],
            Courses => &[Courses, Topics, Slides, Videos, StudyTools],
            Topics => &[Topics, Slides, Videos],
            Slides => &[Slides],
            Videos => &[Videos],
            StudyTools => &[StudyTools],
        }
    }

    /// `{prefix}list` unfiltered, `{prefix}list:eq:{value}` filtered
    pub(crate) fn list_key(self, filter: Option<&str>) -> String {
        match filter {
            Some(value) => format!("{}list:eq:{}", self.prefix(), value),
            None => format!("{}list", self.prefix()),
        }
    }
}

/// Handles to both caches, shared by the content services
#[derive(Debug, Clone)]
pub struct ContentCaches {
    query: Arc<MemoryCache>,
    content: Arc<ContentCache>,
}

impl ContentCaches {
    pub fn new(query: Arc<MemoryCache>, content: Arc<ContentCache>) -> Self {
        Self { query, content }
    }

    pub fn content(&self) -> &Arc<ContentCache> {
        &self.content
    }

    /// Serve a list from the query cache, loading and storing it on a miss
    pub(crate) async fn list_or_load<T, F, Fut>(
        &self,
        key: &str,
        load: F,
    ) -> Result<Vec<T>, ContentError>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Vec<T>>>,
    {
        if let Ok(Some(cached)) = self.query.get::<Vec<T>>(key).await {
            return Ok(cached);
        }

        let items = load().await?;
        if let Err(e) = self.query.set(key, &items, self.query.default_ttl()).await {
            tracing::warn!("Failed to cache {}: {}", key, e);
        }
        Ok(items)
    }

    /// Drop cached lists of one resource after a create or update
    pub(crate) async fn invalidate_lists(&self, resource: Resource) {
        let pattern = format!("{}*", resource.prefix());
        if let Err(e) = self.query.delete_pattern(&pattern).await {
            tracing::warn!("Failed to invalidate {}: {}", pattern, e);
        }
    }

    /// Drop cached lists of a resource and its descendants after a delete.
    /// Deleting a parent also flushes the content cache, since the cascade
    /// removes items without naming them.
    pub(crate) async fn invalidate_subtree(&self, resource: Resource) {
        let subtree = resource.subtree();
        for child in subtree {
            self.invalidate_lists(*child).await;
        }
        if subtree.len() > 1 {
            self.content.clear();
        }
    }

    /// Forget one cached content item after it changed
    pub(crate) fn forget(&self, content_type: ContentType, id: &str) {
        self.content.remove(&CacheKey::new(content_type, id));
    }
}

/// Public lookup of single content items through the content cache
pub struct ContentService {
    slides: Arc<dyn SlideRepository>,
    videos: Arc<dyn VideoRepository>,
    study_tools: Arc<dyn StudyToolRepository>,
    caches: ContentCaches,
}

/// A content item and whether it came from the cache
#[derive(Debug, Clone, Serialize)]
pub struct ContentLookup {
    pub content_type: ContentType,
    pub data: Value,
    pub cached: bool,
}

impl ContentService {
    pub fn new(
        slides: Arc<dyn SlideRepository>,
        videos: Arc<dyn VideoRepository>,
        study_tools: Arc<dyn StudyToolRepository>,
        caches: ContentCaches,
    ) -> Self {
        Self {
            slides,
            videos,
            study_tools,
            caches,
        }
    }

    pub async fn get(&self, content_type: ContentType, id: &str) -> Result<ContentLookup, ContentError> {
        let key = CacheKey::new(content_type, id);
        if let Some(data) = self.caches.content.get(&key) {
            return Ok(ContentLookup {
                content_type,
                data,
                cached: true,
            });
        }

        let generation = self.caches.content.generation();
        let data = match content_type {
            ContentType::Slide => to_value(self.slides.get_by_id(id).await?)?,
            ContentType::Video => to_value(self.videos.get_by_id(id).await?)?,
            ContentType::StudyTool => to_value(self.study_tools.get_by_id(id).await?)?,
        }
        .ok_or_else(|| ContentError::NotFound(format!("{} {}", content_type, id)))?;

        self.caches
            .content
            .set_if_generation(key, data.clone(), None, generation);
        Ok(ContentLookup {
            content_type,
            data,
            cached: false,
        })
    }

    pub fn stats(&self) -> ContentCacheStats {
        self.caches.content.stats()
    }

    /// Empty both caches
    pub async fn clear(&self) -> Result<(), ContentError> {
        self.caches.content.clear();
        self.caches.query.clear().await?;
        tracing::info!("Caches cleared");
        Ok(())
    }
}

fn to_value<T: Serialize>(item: Option<T>) -> Result<Option<Value>, ContentError> {
    item.map(|item| serde_json::to_value(item).context("Failed to serialize content item"))
        .transpose()
        .map_err(ContentError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::test_support::seed_topic;
    use crate::db::repositories::{SqlxSlideRepository, SqlxStudyToolRepository, SqlxVideoRepository};
    use crate::models::{CreateSlideInput, Slide};
    use crate::services::test_support::{caches, section_admin};

    #[test]
    fn test_require_and_require_url() {
        assert!(matches!(require("title", "  "), Err(ContentError::Validation(_))));
        assert!(require("title", "Trees").is_ok());
        assert!(require_url("url", "https://drive.example.com/x").is_ok());
        assert!(matches!(require_url("url", "ftp://x"), Err(ContentError::Validation(_))));
    }

    #[test]
    fn test_ensure_section() {
        let admin = section_admin("63_G");
        assert_eq!(ensure_section(&admin, Some("63_G".into()), "Topic").unwrap(), "63_G");
        assert!(matches!(
            ensure_section(&admin, Some("64_A".into()), "Topic"),
            Err(ContentError::Forbidden(_))
        ));
        assert!(matches!(
            ensure_section(&admin, None, "Topic"),
            Err(ContentError::NotFound(_))
        ));
    }

    #[test]
    fn test_list_keys_keep_filters_apart() {
        assert_eq!(Resource::Semesters.list_key(None), "semesters:list");
        assert_eq!(Resource::Semesters.list_key(Some("all")), "semesters:list:eq:all");
        assert_ne!(Resource::Topics.list_key(None), Resource::Topics.list_key(Some("")));
    }

    #[tokio::test]
    async fn test_list_or_load_serves_cached_value() {
        let caches = caches();
        let key = Resource::Semesters.list_key(None);

        let first: Vec<i32> = caches.list_or_load(&key, || async { Ok(vec![1, 2]) }).await.unwrap();
        let second: Vec<i32> = caches.list_or_load(&key, || async { Ok(vec![9]) }).await.unwrap();
        assert_eq!(first, vec![1, 2]);
        assert_eq!(second, vec![1, 2]);

        caches.invalidate_lists(Resource::Semesters).await;
        let third: Vec<i32> = caches.list_or_load(&key, || async { Ok(vec![9]) }).await.unwrap();
        assert_eq!(third, vec![9]);
    }

    #[tokio::test]
    async fn test_subtree_invalidation_reaches_children() {
        let caches = caches();
        let topics_key = Resource::Topics.list_key(Some("c1"));
        let _: Vec<i32> = caches.list_or_load(&topics_key, || async { Ok(vec![1]) }).await.unwrap();
        caches.content.set(CacheKey::new(ContentType::Slide, "s1"), serde_json::json!(1), None);

        caches.invalidate_subtree(Resource::Courses).await;

        let reloaded: Vec<i32> = caches.list_or_load(&topics_key, || async { Ok(vec![2]) }).await.unwrap();
        assert_eq!(reloaded, vec![2]);
        assert_eq!(caches.content.stats().entries, 0);
    }

    #[tokio::test]
    async fn test_content_lookup_hits_cache_on_second_read() {
        let (pool, topic_id) = seed_topic("63_G").await;
        let slides = SqlxSlideRepository::boxed(pool.clone());
        let slide = Slide::from_input(CreateSlideInput {
            topic_id,
            title: "Heaps".into(),
            url: "https://example.com/heaps".into(),
            ..Default::default()
        });
        slides.create(&slide).await.unwrap();

        let service = ContentService::new(
            slides,
            SqlxVideoRepository::boxed(pool.clone()),
            SqlxStudyToolRepository::boxed(pool),
            caches(),
        );

        let first = service.get(ContentType::Slide, &slide.id).await.unwrap();
        let second = service.get(ContentType::Slide, &slide.id).await.unwrap();
        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(second.data["title"], "Heaps");

        let stats = service.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);

        assert!(matches!(
            service.get(ContentType::Video, &slide.id).await,
            Err(ContentError::NotFound(_))
        ));
    }
}
