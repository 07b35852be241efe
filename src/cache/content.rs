//! Bounded content cache
//!
//! Caches individual slides, videos and study tools for the public content
//! endpoint. Entries expire after a TTL and the cache stays under both an
//! entry-count limit and an estimated byte budget by evicting the least
//! recently accessed entries first. Hit, miss and eviction counters are kept
//! for the admin stats endpoint.

use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

use crate::config::ContentCacheConfig;
use crate::models::ContentType;

/// Cache key: a content kind plus its id
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub content_type: ContentType,
    pub id: String,
}

impl CacheKey {
    pub fn new(content_type: ContentType, id: impl Into<String>) -> Self {
        Self {
            content_type,
            id: id.into(),
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    data: Value,
    inserted_at: Instant,
    ttl: Duration,
    /// Logical clock value of the last read or write
    last_accessed: u64,
    access_count: u64,
    size_bytes: usize,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.inserted_at) >= self.ttl
    }
}

#[derive(Debug, Default)]
struct State {
    entries: HashMap<CacheKey, Entry>,
    /// `last_accessed` tick of every entry, oldest first
    recency: BTreeMap<u64, CacheKey>,
    total_bytes: usize,
    clock: u64,
    /// Bumped by every explicit remove or clear
    generation: u64,
}

impl State {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn insert(&mut self, key: CacheKey, entry: Entry) {
        self.total_bytes += entry.size_bytes;
        self.recency.insert(entry.last_accessed, key.clone());
        self.entries.insert(key, entry);
    }

    fn remove(&mut self, key: &CacheKey) -> Option<Entry> {
        let entry = self.entries.remove(key)?;
        self.recency.remove(&entry.last_accessed);
        self.total_bytes = self.total_bytes.saturating_sub(entry.size_bytes);
        Some(entry)
    }

    /// Mark an entry as just read and return its value
    fn touch(&mut self, key: &CacheKey) -> Option<Value> {
        let tick = self.tick();
        let entry = self.entries.get_mut(key)?;
        self.recency.remove(&entry.last_accessed);
        self.recency.insert(tick, key.clone());
        entry.last_accessed = tick;
        entry.access_count += 1;
        Some(entry.data.clone())
    }

    fn evict_least_recently_accessed(&mut self) -> bool {
        let Some((_, key)) = self.recency.pop_first() else {
            return false;
        };
        self.remove(&key);
        true
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
        self.total_bytes = 0;
    }
}

/// Snapshot of cache usage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentCacheStats {
    pub entries: usize,
    pub total_bytes: usize,
    pub max_entries: usize,
    pub max_bytes: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    /// hits / (hits + misses), 0 when nothing was read yet
    pub hit_rate: f64,
}

/// TTL + LRU content cache
#[derive(Debug)]
pub struct ContentCache {
    state: Mutex<State>,
    max_entries: usize,
    max_bytes: usize,
    default_ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl ContentCache {
    pub fn new(max_entries: usize, max_bytes: usize, default_ttl: Duration) -> Self {
        Self {
            state: Mutex::new(State::default()),
            max_entries: max_entries.max(1),
            max_bytes,
            default_ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &ContentCacheConfig) -> Self {
        Self::new(
            config.max_entries,
            config.max_bytes,
            Duration::from_secs(config.ttl_seconds),
        )
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A poisoned lock only means another thread panicked mid-update;
        // the map itself is still usable.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Get a fresh entry, counting a hit or a miss
    pub fn get(&self, key: &CacheKey) -> Option<Value> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&self, key: &CacheKey, now: Instant) -> Option<Value> {
        let mut state = self.lock();

        let expired = match state.entries.get(key) {
            Some(entry) => entry.is_expired(now),
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        };

        if expired {
            state.remove(key);
            self.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        }

        let data = state.touch(key)?;
        self.hits.fetch_add(1, Ordering::Relaxed);
        Some(data)
    }

    /// Insert or overwrite an entry, then evict until within bounds.
    ///
    /// Returns false when the value alone exceeds the byte budget; such
    /// values are not stored.
    pub fn set(&self, key: CacheKey, value: Value, ttl: Option<Duration>) -> bool {
        self.set_at(key, value, ttl, Instant::now())
    }

    /// Invalidation counter, read before loading a value to cache
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// [`set`](Self::set) unless an entry was removed or the cache cleared
    /// since `generation` was read. A fill that lost the race to a writer's
    /// invalidation is dropped instead of caching the old value.
    pub fn set_if_generation(
        &self,
        key: CacheKey,
        value: Value,
        ttl: Option<Duration>,
        generation: u64,
    ) -> bool {
        let mut state = self.lock();
        if state.generation != generation {
            return false;
        }
        self.store(&mut state, key, value, ttl, Instant::now())
    }

    fn set_at(&self, key: CacheKey, value: Value, ttl: Option<Duration>, now: Instant) -> bool {
        let mut state = self.lock();
        self.store(&mut state, key, value, ttl, now)
    }

    fn store(
        &self,
        state: &mut State,
        key: CacheKey,
        value: Value,
        ttl: Option<Duration>,
        now: Instant,
    ) -> bool {
        let size_bytes = value.to_string().len();

        state.remove(&key);
        if size_bytes > self.max_bytes {
            return false;
        }

        let tick = state.tick();
        state.insert(
            key,
            Entry {
                data: value,
                inserted_at: now,
                ttl: ttl.unwrap_or(self.default_ttl),
                last_accessed: tick,
                access_count: 0,
                size_bytes,
            },
        );

        while state.entries.len() > self.max_entries || state.total_bytes > self.max_bytes {
            if !state.evict_least_recently_accessed() {
                break;
            }
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }

        true
    }

    /// Remove one entry. Returns true if it was present.
    pub fn remove(&self, key: &CacheKey) -> bool {
        let mut state = self.lock();
        state.generation += 1;
        state.remove(key).is_some()
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.generation += 1;
        state.clear();
    }

    pub fn stats(&self) -> ContentCacheStats {
        let (entries, total_bytes) = {
            let state = self.lock();
            (state.entries.len(), state.total_bytes)
        };
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let reads = hits + misses;

        ContentCacheStats {
            entries,
            total_bytes,
            max_entries: self.max_entries,
            max_bytes: self.max_bytes,
            hits,
            misses,
            evictions: self.evictions.load(Ordering::Relaxed),
            hit_rate: if reads == 0 {
                0.0
            } else {
                hits as f64 / reads as f64
            },
        }
    }

    /// Remove all expired entries. Returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(Instant::now())
    }

    fn sweep_expired_at(&self, now: Instant) -> usize {
        let mut state = self.lock();
        let expired: Vec<CacheKey> = state
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            state.remove(key);
        }
        expired.len()
    }

    /// Run [`sweep_expired`](Self::sweep_expired) on an interval until the
    /// cache is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let cache = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // First tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(cache) = cache.upgrade() else {
                    break;
                };
                let removed = cache.sweep_expired();
                if removed > 0 {
                    tracing::debug!("Content cache sweep removed {} expired entries", removed);
                }
            }
        })
    }
}
