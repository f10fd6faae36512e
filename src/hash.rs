//! The hash family shared by every sketch.
//!
//! A sketch never hashes keys itself: it asks an injected [`KeyHasher`] for
//! `hash(key, seed)` and reduces the result modulo its table length. Seed `0`
//! is the default hash; every other seed must give an independent-looking
//! bucket choice.
//!
//! [`KeyHasher`]: trait.KeyHasher.html
use crate::DefaultHashBuilder;
use core::hash::{BuildHasher, Hash, Hasher};
use core::marker::PhantomData;

/// KeyHasher is used to hash keys for the sketches and the counting filter
pub trait KeyHasher<K: Hash + ?Sized> {
    /// hash the key with the given seed
    fn hash_key(&self, key: &K, seed: u32) -> u32;
}

/// `DefaultKeyHasher` derives a seeded 32-bit hash from any [`BuildHasher`].
///
/// The seed is written into the hasher before the key, and the 64-bit digest
/// is folded down to 32 bits.
///
/// [`BuildHasher`]: https://doc.rust-lang.org/core/hash/trait.BuildHasher.html
pub struct DefaultKeyHasher<K: ?Sized, S = DefaultHashBuilder> {
    marker: PhantomData<fn(&K)>,
    hasher: S,
}

impl<K: Hash + ?Sized> Default for DefaultKeyHasher<K> {
    fn default() -> Self {
        Self {
            marker: Default::default(),
            hasher: DefaultHashBuilder::default(),
        }
    }
}

impl<K: Hash + ?Sized, S: BuildHasher> DefaultKeyHasher<K, S> {
    /// Create a `DefaultKeyHasher` on top of a custom hash builder.
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            marker: Default::default(),
            hasher,
        }
    }
}

impl<K: ?Sized, S: Clone> Clone for DefaultKeyHasher<K, S> {
    fn clone(&self) -> Self {
        Self {
            marker: Default::default(),
            hasher: self.hasher.clone(),
        }
    }
}

impl<K: Hash + ?Sized, S: BuildHasher> KeyHasher<K> for DefaultKeyHasher<K, S> {
    fn hash_key(&self, key: &K, seed: u32) -> u32 {
        let mut s = self.hasher.build_hasher();
        s.write_u32(seed);
        key.hash(&mut s);
        let h = s.finish();
        (h ^ (h >> 32)) as u32
    }
}

#[inline]
pub(crate) fn index<K, H>(hasher: &H, key: &K, seed: u32, len: usize) -> usize
where
    K: Hash + ?Sized,
    H: KeyHasher<K>,
{
    hasher.hash_key(key, seed) as usize % len
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use fnv::FnvBuildHasher;

    /// Places key `k` hashed with seed `s` at `k + s`, so tests can aim keys
    /// at known buckets.
    #[derive(Clone, Copy, Default)]
    pub(crate) struct PassthroughKeyHasher;

    impl KeyHasher<u64> for PassthroughKeyHasher {
        fn hash_key(&self, key: &u64, seed: u32) -> u32 {
            (*key as u32).wrapping_add(seed)
        }
    }

    #[test]
    fn test_default_key_hasher_is_stable() {
        let kh = DefaultKeyHasher::<u64>::default();
        assert_eq!(kh.hash_key(&42, 0), kh.hash_key(&42, 0));
        assert_eq!(kh.hash_key(&42, 3), kh.clone().hash_key(&42, 3));
    }

    #[test]
    fn test_seeds_give_different_hashes() {
        let kh = DefaultKeyHasher::<u64, FnvBuildHasher>::with_hasher(FnvBuildHasher::default());
        let differ = (0..64u64)
            .filter(|k| kh.hash_key(k, 0) != kh.hash_key(k, 1))
            .count();
        assert!(differ > 60);
    }

    #[test]
    fn test_index_in_range() {
        let kh = DefaultKeyHasher::<str>::default();
        for len in 1..20 {
            assert!(index(&kh, "flow", 0, len) < len);
        }
        assert_eq!(index(&PassthroughKeyHasher, &7, 2, 100), 9);
        assert_eq!(index(&PassthroughKeyHasher, &7, 0, 4), 3);
    }
}
