//! Replay cache keyed by fixture metadata file name

use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;

use crate::exchange::ResponseRecord;

/// Cache of decoded responses
pub struct FixtureCache {
    /// Map of metadata file name to recorded response
    cache: DashMap<String, ResponseRecord>,
    /// Cache hit counter
    hits: AtomicUsize,
    /// Cache miss counter
    misses: AtomicUsize,
}

impl FixtureCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: DashMap::new(),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Look up a response by metadata file name
    #[must_use]
    pub fn lookup(&self, metadata_name: &str) -> Option<ResponseRecord> {
        if let Some(response) = self.cache.get(metadata_name) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            Some(response.clone())
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            None
        }
    }

    /// Store a response loaded from disk
    pub fn insert(&self, metadata_name: String, response: ResponseRecord) {
        self.cache.insert(metadata_name, response);
    }

    /// Get cache hit count
    #[must_use]
    pub fn hit_count(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    /// Get cache miss count
    #[must_use]
    pub fn miss_count(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    /// Get cache hit rate (0.0 to 1.0)
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hit_count();
        let misses = self.miss_count();
        let total = hits + misses;

        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    /// Get the number of cached responses
    #[must_use]
    pub fn size(&self) -> usize {
        self.cache.len()
    }

    /// Clear entries and counters
    pub fn clear(&self) {
        self.cache.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}

impl Default for FixtureCache {
    fn default() -> Self {
        Self::new()
    }
}
