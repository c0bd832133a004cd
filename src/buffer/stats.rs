//! Node cache statistics.

use std::fmt;

/// Counters kept by the node cache.
///
/// The cache is only ever touched through `&mut`, so plain integers are
/// enough; copy the struct to take a snapshot.
///
/// # Example
/// ```
/// use diskbtree::CacheStats;
///
/// let mut stats = CacheStats::default();
/// stats.hits += 3;
/// stats.misses += 1;
/// assert_eq!(stats.hit_rate(), 0.75);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups served from memory.
    pub hits: u64,

    /// Lookups that had to read the block from disk.
    pub misses: u64,

    /// Entries written back and dropped because the cache was over capacity.
    pub evictions: u64,

    /// Blocks read from disk.
    pub blocks_read: u64,

    /// Blocks written to disk, by eviction or flush.
    pub blocks_written: u64,
}

impl CacheStats {
    /// Calculate cache hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ hits: {}, misses: {}, evictions: {}, written: {}, hit_rate: {:.2}% }}",
            self.hits,
            self.misses,
            self.evictions,
            self.blocks_written,
            self.hit_rate() * 100.0
        )
    }
}
