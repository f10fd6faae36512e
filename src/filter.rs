//! This mod implements a Counting Bloom Filter with two hash functions.
use crate::error::{table_length, SketchError};
use crate::hash::{index, DefaultKeyHasher, KeyHasher};
use crate::{Count, Filter};
use alloc::vec;
use alloc::vec::Vec;
use core::hash::Hash;
use core::marker::PhantomData;

const HASH_NUM: u32 = 2;

/// `CountingBloomFilter` estimates key frequencies with a flat array of
/// saturating 16-bit counters addressed by two hashes.
///
/// The estimate is the smaller of the two counters, so it never undercounts.
/// Counters only grow: there is no eviction.
///
/// # Example
/// ```rust
/// use heavy_sketches::{CountingBloomFilter, Filter};
///
/// let mut filter: CountingBloomFilter<&str> = CountingBloomFilter::new(1024).unwrap();
/// assert_eq!(filter.insert(&"a"), 1);
/// assert_eq!(filter.insert(&"a"), 2);
/// assert!(filter.query(&"a") >= 2);
/// ```
pub struct CountingBloomFilter<K, H = DefaultKeyHasher<K>> {
    cells: Vec<u16>,
    key_hasher: H,
    marker: PhantomData<K>,
}

impl<K: Hash + Eq> CountingBloomFilter<K> {
    /// Creates a filter from a memory budget in bytes, one 16-bit counter per two bytes.
    pub fn new(memory: usize) -> Result<Self, SketchError> {
        Self::with_key_hasher(memory, DefaultKeyHasher::default())
    }
}

impl<K: Hash + Eq, H: KeyHasher<K>> CountingBloomFilter<K, H> {
    /// Creates a filter from a memory budget in bytes and a custom key hasher.
    pub fn with_key_hasher(memory: usize, key_hasher: H) -> Result<Self, SketchError> {
        let length = table_length(memory, core::mem::size_of::<u16>())?;
        tracing::debug!(
            name = "CountingBloomFilter",
            length,
            bytes = length * core::mem::size_of::<u16>(),
            "counting filter constructed"
        );
        Ok(Self {
            cells: vec![0; length],
            key_hasher,
            marker: PhantomData,
        })
    }

    /// Returns the number of counters.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns the bytes held by the counters.
    pub fn memory_bytes(&self) -> usize {
        self.cells.len() * core::mem::size_of::<u16>()
    }

    #[inline]
    fn position(&self, key: &K, seed: u32) -> usize {
        index(&self.key_hasher, key, seed, self.cells.len())
    }
}

impl<K: Hash + Eq, H: KeyHasher<K>> Filter<K> for CountingBloomFilter<K, H> {
    fn insert(&mut self, key: &K) -> Count {
        for seed in 0..HASH_NUM {
            let pos = self.position(key, seed);
            self.cells[pos] = self.cells[pos].saturating_add(1);
        }
        self.query(key)
    }

    fn query(&self, key: &K) -> Count {
        (0..HASH_NUM)
            .map(|seed| self.cells[self.position(key, seed)])
            .min()
            .map_or(0, Count::from)
    }

    fn name(&self) -> &str {
        "CountingBloomFilter"
    }

    fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = 0);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hash::test::PassthroughKeyHasher;

    #[test]
    fn test_counting_bloom_filter_sizing() {
        let filter: CountingBloomFilter<u64> = CountingBloomFilter::new(1025).unwrap();
        assert_eq!(filter.len(), 512);
        assert_eq!(filter.memory_bytes(), 1024);
        assert_eq!(filter.name(), "CountingBloomFilter");

        assert_eq!(
            CountingBloomFilter::<u64>::new(1).err(),
            Some(SketchError::InsufficientMemory {
                memory: 1,
                required: 2
            })
        );
    }

    #[test]
    fn test_estimate_is_min_of_both_cells() {
        // key k lands on cells k and k + 1
        let mut filter = CountingBloomFilter::<u64, _>::with_key_hasher(16, PassthroughKeyHasher).unwrap();
        assert_eq!(filter.insert(&0), 1);
        assert_eq!(filter.insert(&0), 2);
        assert_eq!(filter.insert(&0), 3);

        // key 1 shares cell 1 with key 0
        assert_eq!(filter.query(&1), 0);
        assert_eq!(filter.insert(&1), 1);
        assert_eq!(filter.cells[1], 4);
        assert_eq!(filter.query(&0), 3);

        assert_eq!(filter.query(&5), 0);
    }

    #[test]
    fn test_monotonic_estimate() {
        let mut filter: CountingBloomFilter<u64> = CountingBloomFilter::new(64).unwrap();
        let mut last = 0;
        for i in 0..500u64 {
            filter.insert(&(i % 97));
            let est = filter.query(&3);
            assert!(est >= last);
            last = est;
        }
        assert!(last >= 5);
    }

    #[test]
    fn test_saturation_and_clear() {
        let mut filter = CountingBloomFilter::<u64, _>::with_key_hasher(2, PassthroughKeyHasher).unwrap();
        filter.cells[0] = u16::MAX - 1;
        // one cell only: both hashes hit it
        assert_eq!(filter.insert(&7), u16::MAX as Count);
        assert_eq!(filter.insert(&7), u16::MAX as Count);

        filter.clear();
        assert_eq!(filter.query(&7), 0);
        assert_eq!(filter.len(), 1);
    }
}
