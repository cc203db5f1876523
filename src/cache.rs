//! Verdict caching for the pattern matcher.
//!
//! [`MatchCache`] is an LRU memo of `path -> bool` verdicts. It is gated
//! behind the `cache` feature flag and uses the [`lru`] crate internally.
//! A pattern is deterministic, so a cached verdict is always identical to a
//! fresh one; the cache only saves repeated matcher work when the same few
//! locations are checked on every navigation and every render.
//!
//! # Examples
//!
//! ```
//! use nav_confine::MatchCache;
//!
//! let mut cache = MatchCache::with_capacity(16).unwrap();
//! assert_eq!(cache.get("/flow/abc"), None);
//! cache.insert("/flow/abc", true);
//!
//! assert_eq!(cache.get("/flow/abc"), Some(true));
//! assert_eq!(cache.stats().hits, 1);
//! assert_eq!(cache.stats().misses, 1);
//! ```

use crate::error::ConfigError;
use crate::trace_log;
use lru::LruCache;
use std::num::NonZeroUsize;

/// Counters tracking cache hit/miss rates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of lookups answered from the cache.
    pub hits: usize,
    /// Number of lookups that fell through to the matcher.
    pub misses: usize,
}

impl CacheStats {
    /// Return the hit rate as a value in `0.0..=1.0`.
    ///
    /// Returns `0.0` if no lookups have been performed.
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// LRU memo of matcher verdicts keyed by path.
#[derive(Debug)]
pub struct MatchCache {
    entries: LruCache<String, bool>,
    stats: CacheStats,
}

impl MatchCache {
    /// Default number of remembered paths.
    pub const DEFAULT_CAPACITY: usize = 256;

    /// Create a cache with the default capacity.
    pub fn new() -> Self {
        let cap = NonZeroUsize::new(Self::DEFAULT_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(cap),
            stats: CacheStats::default(),
        }
    }

    /// Create a cache holding at most `capacity` verdicts.
    pub fn with_capacity(capacity: usize) -> Result<Self, ConfigError> {
        let cap = NonZeroUsize::new(capacity).ok_or(ConfigError::InvalidCacheCapacity)?;
        Ok(Self {
            entries: LruCache::new(cap),
            stats: CacheStats::default(),
        })
    }

    /// Look up the verdict for `path`, updating hit/miss stats.
    pub fn get(&mut self, path: &str) -> Option<bool> {
        if let Some(verdict) = self.entries.get(path) {
            self.stats.hits += 1;
            trace_log!("Verdict cache hit for '{}'", path);
            Some(*verdict)
        } else {
            self.stats.misses += 1;
            None
        }
    }

    /// Remember the verdict for `path`, evicting the least recent entry when full.
    pub fn insert(&mut self, path: impl Into<String>, verdict: bool) {
        self.entries.push(path.into(), verdict);
    }

    /// Return the current cache statistics.
    pub const fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Number of remembered verdicts.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of remembered verdicts.
    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }
}

impl Default for MatchCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_creation() {
        let cache = MatchCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), MatchCache::DEFAULT_CAPACITY);
        assert_eq!(cache.stats(), CacheStats::default());
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        assert_eq!(
            MatchCache::with_capacity(0).unwrap_err(),
            ConfigError::InvalidCacheCapacity
        );
    }

    #[test]
    fn test_lru_eviction() {
        let mut cache = MatchCache::with_capacity(2).unwrap();
        cache.insert("/a", true);
        cache.insert("/b", false);
        // Touch /a so /b becomes least recent.
        assert_eq!(cache.get("/a"), Some(true));
        cache.insert("/c", true);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("/b"), None);
        assert_eq!(cache.get("/c"), Some(true));
    }

    #[test]
    fn test_hit_rate_calculation() {
        let mut cache = MatchCache::new();
        cache.get("/a");
        cache.get("/b");
        cache.get("/c");

        cache.insert("/a", true);
        cache.insert("/b", false);

        cache.get("/a");
        cache.get("/b");

        assert_eq!(cache.stats().hits, 2);
        assert_eq!(cache.stats().misses, 3);
        assert!((cache.stats().hit_rate() - 0.4).abs() < 0.001);
    }
}
