//! Cache layer
//!
//! Two caches live here:
//! - [`MemoryCache`]: moka-backed query cache for public listings, keyed by
//!   resource prefix (`semesters:list:...`, `courses:detail:...`)
//! - [`ContentCache`]: bounded TTL + LRU cache for single content items
//!
//! # Usage
//!
//! ```rust,ignore
//! use cse_lms::cache::{create_cache, CacheLayer};
//! use cse_lms::config::CacheConfig;
//!
//! let cache = create_cache(&CacheConfig::default());
//! cache.set("semesters:list", &semesters, cache.default_ttl()).await?;
//! cache.delete_pattern("semesters:*").await?;
//! ```

pub mod content;
pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::CacheConfig;

pub use content::{CacheKey, ContentCache, ContentCacheStats};
pub use memory::MemoryCache;

/// Cache layer trait
///
/// Generic methods keep this trait out of `dyn` use; callers hold the
/// concrete cache behind an `Arc`.
#[async_trait]
pub trait CacheLayer: Send + Sync {
    /// Get a value from cache
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>>;

    /// Set a value in cache with TTL
    async fn set<T: Serialize + Send + Sync>(&self, key: &str, value: &T, ttl: Duration) -> Result<()>;

    /// Delete a value from cache
    async fn delete(&self, key: &str) -> Result<()>;

    /// Delete all values matching a `prefix*` pattern
    async fn delete_pattern(&self, pattern: &str) -> Result<()>;

    /// Clear all cache entries
    async fn clear(&self) -> Result<()>;
}

/// Build the query cache from configuration
pub fn create_cache(config: &CacheConfig) -> Arc<MemoryCache> {
    tracing::info!(
        "Using in-memory query cache (capacity: {}, ttl: {}s)",
        config.max_capacity,
        config.ttl_seconds
    );
    Arc::new(MemoryCache::with_capacity_and_ttl(
        config.max_capacity,
        Duration::from_secs(config.ttl_seconds),
    ))
}

/// Build the content cache from configuration
pub fn create_content_cache(config: &crate::config::ContentCacheConfig) -> Arc<ContentCache> {
    tracing::info!(
        "Using content cache (max entries: {}, max bytes: {}, ttl: {}s)",
        config.max_entries,
        config.max_bytes,
        config.ttl_seconds
    );
    Arc::new(ContentCache::from_config(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_cache_uses_configured_ttl() {
        let config = CacheConfig {
            max_capacity: 10,
            ttl_seconds: 42,
        };
        let cache = create_cache(&config);
        assert_eq!(cache.default_ttl(), Duration::from_secs(42));

        cache.set("k", &"v", cache.default_ttl()).await.unwrap();
        let value: Option<String> = cache.get("k").await.unwrap();
        assert_eq!(value.as_deref(), Some("v"));
    }
}
