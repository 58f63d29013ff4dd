//! Bounded slug cache with least-recently-used eviction

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use lru::LruCache;
use parking_lot::Mutex;
use plook_core::types::RepositorySlug;

/// Default number of package names kept in the cache
pub const DEFAULT_CAPACITY: usize = 500;

/// In-memory name → slug cache shared by every request.
///
/// A package's repository does not move without a new release, so entries
/// never expire; they are only evicted once the cache is full.
#[derive(Debug)]
pub struct SlugCache {
    /// Cache storage
    entries: Mutex<LruCache<String, RepositorySlug>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SlugCache {
    /// Create a cache with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a cache holding at most `capacity` entries (at least one)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Get a cached slug, marking it most recently used
    pub fn get(&self, package_name: &str) -> Option<RepositorySlug> {
        let slug = self.entries.lock().get(package_name).cloned();
        let counter = if slug.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        slug
    }

    /// Store a slug, evicting the least recently used entry when full
    pub fn insert(&self, package_name: String, slug: RepositorySlug) {
        self.entries.lock().put(package_name, slug);
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock();
        CacheStats {
            total_entries: entries.len(),
            capacity: entries.cap().get(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of entries
    pub total_entries: usize,
    /// Maximum number of entries
    pub capacity: usize,
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that had to go to the registry
    pub misses: u64,
}

impl Default for SlugCache {
    fn default() -> Self {
        Self::new()
    }
}
