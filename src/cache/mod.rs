//! LRU cache of kernel values keyed by training-sample index
//!
//! Kernel matrices are symmetric, so (i, j) and (j, i) share one entry.

use lru::LruCache;
use std::num::NonZeroUsize;

/// Bytes per entry: two indices, the value and bookkeeping
const ENTRY_BYTES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PairKey(usize, usize);

impl PairKey {
    fn new(i: usize, j: usize) -> Self {
        if i <= j {
            PairKey(i, j)
        } else {
            PairKey(j, i)
        }
    }
}

/// Kernel value cache with hit/miss accounting
pub struct KernelCache {
    entries: LruCache<PairKey, f64>,
    hits: u64,
    misses: u64,
}

impl KernelCache {
    /// Cache holding at most `capacity` values (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Cache sized from a memory budget in bytes
    pub fn with_memory_limit(memory_bytes: usize) -> Self {
        Self::new(memory_bytes / ENTRY_BYTES)
    }

    /// Cached K(i, j), computing and storing it on a miss
    pub fn get_or_insert_with<F>(&mut self, i: usize, j: usize, compute: F) -> f64
    where
        F: FnOnce() -> f64,
    {
        let key = PairKey::new(i, j);
        if let Some(&value) = self.entries.get(&key) {
            self.hits += 1;
            return value;
        }
        self.misses += 1;
        let value = compute();
        self.entries.put(key, value);
        value
    }

    pub fn contains(&self, i: usize, j: usize) -> bool {
        self.entries.contains(&PairKey::new(i, j))
    }

    pub fn stats(&self) -> CacheStats {
        let lookups = self.hits + self.misses;
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            hit_rate: if lookups == 0 {
                0.0
            } else {
                self.hits as f64 / lookups as f64
            },
            capacity: self.entries.cap().get(),
            len: self.entries.len(),
        }
    }
}

/// Snapshot of cache usage
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub capacity: usize,
    pub len: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_symmetric_pairs_share_an_entry() {
        let mut cache = KernelCache::new(4);
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            7.0
        };

        assert_eq!(cache.get_or_insert_with(1, 5, compute), 7.0);
        assert_eq!(cache.get_or_insert_with(5, 1, || unreachable!()), 7.0);
        assert_eq!(calls.get(), 1);
        assert!(cache.contains(5, 1));

        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.len), (1, 1, 1));
        assert_eq!(stats.hit_rate, 0.5);
    }

    #[test]
    fn test_least_recently_used_is_evicted() {
        let mut cache = KernelCache::new(2);
        cache.get_or_insert_with(0, 1, || 1.0);
        cache.get_or_insert_with(1, 2, || 2.0);
        // touch (0, 1) so that (1, 2) becomes the oldest
        cache.get_or_insert_with(0, 1, || unreachable!());
        cache.get_or_insert_with(2, 3, || 3.0);

        assert!(cache.contains(0, 1));
        assert!(!cache.contains(1, 2));
        assert!(cache.contains(2, 3));
    }

    #[test]
    fn test_memory_limit_gives_at_least_one_slot() {
        assert_eq!(KernelCache::with_memory_limit(0).stats().capacity, 1);
        assert_eq!(KernelCache::with_memory_limit(3200).stats().capacity, 100);
        assert_eq!(KernelCache::new(0).stats().hit_rate, 0.0);
    }
}
