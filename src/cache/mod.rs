//! Bounded storage for kernel values between training sequences
//!
//! Training from raw sequences never materializes the N x N Gram matrix.
//! `CachedGram` evaluates the WD kernel for a pair of training sequences on
//! first use and keeps the result in `KernelCache`, an LRU map keyed by the
//! unordered pair of row indices into the `SequenceStore`. Self-similarities
//! are cheap to keep for every sequence and bypass the cache.

use crate::core::{GramMatrix, Result};
use crate::features::SequenceStore;
use crate::kernel::Kernel;
use lru::LruCache;
use std::num::NonZeroUsize;

/// Approximate bytes held per cached pair (key, value and LRU links)
pub const ENTRY_BYTES: usize = 16;

/// Unordered pair of sequence indices, stored with the smaller index first
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

/// LRU store of kernel values between pairs of training sequences
pub struct KernelCache {
    entries: LruCache<PairKey, f64>,
    hits: u64,
    misses: u64,
}

impl KernelCache {
    /// Cache holding at most `capacity` sequence pairs (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Cache sized to roughly `memory_bytes` of kernel values
    pub fn with_memory_limit(memory_bytes: usize) -> Self {
        Self::new(memory_bytes / ENTRY_BYTES)
    }

    /// K(seq_i, seq_j) if it is cached; either index order finds the entry
    pub fn get(&mut self, i: usize, j: usize) -> Option<f64> {
        let value = self.entries.get(&PairKey::new(i, j)).copied();
        match value {
            Some(_) => self.hits += 1,
            None => self.misses += 1,
        }
        value
    }

    /// Record K(seq_i, seq_j), evicting the least recently used pair if full
    pub fn put(&mut self, i: usize, j: usize, value: f64) {
        self.entries.put(PairKey::new(i, j), value);
    }

    /// Fraction of lookups served from the cache
    pub fn hit_rate(&self) -> f64 {
        match self.hits + self.misses {
            0 => 0.0,
            total => self.hits as f64 / total as f64,
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            capacity: self.entries.cap().get(),
            size: self.entries.len(),
        }
    }

    /// Drop all pairs and reset the counters
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

/// Cache counters, logged after training
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Maximum number of sequence pairs
    pub capacity: usize,
    /// Sequence pairs currently held
    pub size: usize,
}

/// Gram matrix evaluated on demand from a kernel and a sequence store
///
/// Diagonal entries are computed up front; everything else goes through the
/// LRU cache, so memory stays bounded by the cache size.
pub struct CachedGram<'a, K: Kernel> {
    kernel: &'a K,
    store: &'a SequenceStore,
    cache: KernelCache,
    diagonal: Vec<f64>,
}

impl<'a, K: Kernel> CachedGram<'a, K> {
    /// Fails if the kernel cannot be evaluated on the store's sequence length
    pub fn new(kernel: &'a K, store: &'a SequenceStore, cache_bytes: usize) -> Result<Self> {
        kernel.validate(store.seq_len())?;
        let diagonal = store.iter().map(|x| kernel.compute(x, x)).collect();
        Ok(Self {
            kernel,
            store,
            cache: KernelCache::with_memory_limit(cache_bytes),
            diagonal,
        })
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn hit_rate(&self) -> f64 {
        self.cache.hit_rate()
    }
}

impl<K: Kernel> GramMatrix for CachedGram<'_, K> {
    fn size(&self) -> usize {
        self.store.len()
    }

    fn get(&mut self, i: usize, j: usize) -> f64 {
        if i == j {
            return self.diagonal[i];
        }
        if let Some(value) = self.cache.get(i, j) {
            value
        } else {
            let value = self.kernel.compute(self.store.get(i), self.store.get(j));
            self.cache.put(i, j, value);
            value
        }
    }

    fn diagonal(&mut self, i: usize) -> f64 {
        self.diagonal[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::Alphabet;
    use crate::kernel::{KernelMatrix, WeightedDegreeKernel};

    #[test]
    fn test_pair_order_is_irrelevant() {
        assert_eq!(PairKey::new(4, 1), PairKey(1, 4));

        let mut cache = KernelCache::new(4);
        assert_eq!(cache.get(2, 7), None);
        cache.put(7, 2, 9.0);
        assert_eq!(cache.get(2, 7), Some(9.0));
        assert_eq!(cache.get(7, 2), Some(9.0));

        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.size), (2, 1, 1));
    }

    #[test]
    fn test_least_recently_used_pair_is_evicted() {
        let mut cache = KernelCache::new(2);
        cache.put(0, 1, 1.0);
        cache.put(0, 2, 2.0);
        // Touch (0, 1) so (0, 2) becomes the eviction candidate
        assert_eq!(cache.get(1, 0), Some(1.0));
        cache.put(1, 2, 3.0);

        assert_eq!(cache.get(0, 2), None);
        assert_eq!(cache.get(0, 1), Some(1.0));
        assert_eq!(cache.get(2, 1), Some(3.0));
        assert_eq!(cache.stats().size, 2);
    }

    #[test]
    fn test_memory_limit_and_clear() {
        assert_eq!(KernelCache::with_memory_limit(1000).stats().capacity, 1000 / ENTRY_BYTES);
        assert_eq!(KernelCache::with_memory_limit(0).stats().capacity, 1);

        let mut cache = KernelCache::new(8);
        assert_eq!(cache.hit_rate(), 0.0);
        cache.put(0, 1, 1.0);
        cache.get(0, 1);
        cache.get(0, 3);
        assert_eq!(cache.hit_rate(), 0.5);

        cache.clear();
        assert_eq!(cache.get(0, 1), None);
        assert_eq!(cache.stats().hits, 0);
        assert_eq!(cache.stats().size, 0);
    }

    #[test]
    fn test_cached_gram_matches_precomputed() {
        let kernel = WeightedDegreeKernel::new(3).unwrap();
        let store =
            SequenceStore::new(&["ACGTAC", "ACGTTC", "GGGTAC", "ACCTAC"], Alphabet::Dna).unwrap();
        let matrix = KernelMatrix::compute(&kernel, &store).unwrap();
        let mut gram = CachedGram::new(&kernel, &store, 1 << 20).unwrap();

        assert_eq!(gram.size(), 4);
        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(gram.get(i, j), matrix.get(i, j));
            }
        }
        // Second pass over the off-diagonal entries is served from the cache
        for i in 0..4 {
            for j in 0..4 {
                gram.get(i, j);
            }
        }
        assert!(gram.stats().hits >= 12);
        assert!(gram.hit_rate() > 0.5);
    }

    #[test]
    fn test_cached_gram_rejects_long_degree() {
        let kernel = WeightedDegreeKernel::new(8).unwrap();
        let store = SequenceStore::new(&["ACGT"], Alphabet::Dna).unwrap();
        assert!(CachedGram::new(&kernel, &store, 1024).is_err());
    }
}
