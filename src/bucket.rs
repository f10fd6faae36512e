//! Single-hash sketches: one table of buckets, each holding `C` counters.
//!
//! A key hashes to exactly one bucket. A match increments, an empty slot is
//! claimed, and a full bucket hands its weakest counter to the sketch's
//! [`DecayPolicy`].
//!
//! [`DecayPolicy`]: trait.DecayPolicy.html
mod policy;
pub(crate) mod slots;

pub use policy::{DecayPolicy, ExponentialDecay, LinearDecay, NoDecay};

use crate::error::{table_length, SketchError};
use crate::hash::{index, DefaultKeyHasher, KeyHasher};
use crate::{Count, Sketch};
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::hash::Hash;
use core::marker::PhantomData;
use rand::RngCore;
use slots::{Bucket, Probe};

/// HeavyGuardian: buckets of 8 counters with exponential decay.
pub type HeavyGuardian<K, R, H = DefaultKeyHasher<K>> = BucketSketch<K, ExponentialDecay, 8, R, H>;

/// Buckets of 4 counters with linear decay.
pub type LinearDecaySketch<K, R, H = DefaultKeyHasher<K>> = BucketSketch<K, LinearDecay, 4, R, H>;

/// Buckets of 4 counters that never evict: the first keys of a bucket keep it.
pub type NoDecaySketch<K, R, H = DefaultKeyHasher<K>> = BucketSketch<K, NoDecay, 4, R, H>;

/// `BucketSketchBuilder` is used to help build a [`BucketSketch`] with custom configurations.
///
/// [`BucketSketch`]: struct.BucketSketch.html
pub struct BucketSketchBuilder<K, P, const C: usize, H = DefaultKeyHasher<K>> {
    memory: usize,
    stage1_bias: Count,
    name: Option<String>,
    policy: P,
    key_hasher: H,
    marker: PhantomData<K>,
}

impl<K: Hash + Eq + Clone, P: DecayPolicy + Default, const C: usize> BucketSketchBuilder<K, P, C> {
    /// The constructor of BucketSketchBuilder, `memory` is the budget in bytes.
    pub fn new(memory: usize) -> Self {
        Self {
            memory,
            stage1_bias: 0,
            name: None,
            policy: P::default(),
            key_hasher: DefaultKeyHasher::default(),
            marker: PhantomData,
        }
    }
}

impl<K: Hash + Eq + Clone, P: DecayPolicy, const C: usize, H: KeyHasher<K>>
    BucketSketchBuilder<K, P, C, H>
{
    /// Set the constant added to every count reported by `all_query`
    pub fn set_stage1_bias(self, stage1_bias: Count) -> Self {
        Self {
            stage1_bias,
            ..self
        }
    }

    /// Set the name of the sketch
    pub fn set_name(self, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..self
        }
    }

    /// Set the decay policy
    pub fn set_policy(self, policy: P) -> Self {
        Self { policy, ..self }
    }

    /// Set the key hasher
    pub fn set_key_hasher<NH: KeyHasher<K>>(self, hasher: NH) -> BucketSketchBuilder<K, P, C, NH> {
        BucketSketchBuilder {
            memory: self.memory,
            stage1_bias: self.stage1_bias,
            name: self.name,
            policy: self.policy,
            key_hasher: hasher,
            marker: self.marker,
        }
    }

    /// Finalize the builder to [`BucketSketch`], drawing randomness from `rng`.
    ///
    /// [`BucketSketch`]: struct.BucketSketch.html
    pub fn finalize_with_rng<R: RngCore>(
        self,
        rng: R,
    ) -> Result<BucketSketch<K, P, C, R, H>, SketchError> {
        let length = table_length(self.memory, BucketSketch::<K, P, C, R, H>::bucket_bytes())?;
        let buckets = (0..length).map(|_| Bucket::new()).collect::<Vec<_>>();
        let name = self.name.unwrap_or_else(|| P::NAME.to_string());

        tracing::debug!(
            name = %name,
            length,
            bucket_size = C,
            bytes = length * BucketSketch::<K, P, C, R, H>::bucket_bytes(),
            "bucket sketch constructed"
        );

        Ok(BucketSketch {
            buckets,
            stage1_bias: self.stage1_bias,
            name,
            policy: self.policy,
            key_hasher: self.key_hasher,
            rng,
        })
    }

    /// Finalize the builder to [`BucketSketch`], seeding a [`DefaultRng`] from entropy.
    ///
    /// [`BucketSketch`]: struct.BucketSketch.html
    /// [`DefaultRng`]: type.DefaultRng.html
    #[cfg(feature = "std")]
    #[cfg_attr(docsrs, doc(cfg(feature = "std")))]
    pub fn finalize(self) -> Result<BucketSketch<K, P, C, crate::DefaultRng, H>, SketchError> {
        use rand::SeedableRng;
        self.finalize_with_rng(crate::DefaultRng::from_entropy())
    }
}

/// `BucketSketch` is a single-hash table of buckets holding `C` counters each.
///
/// The eviction behavior comes from the policy `P`; see [`HeavyGuardian`],
/// [`LinearDecaySketch`] and [`NoDecaySketch`] for the configured variants.
///
/// # Example
/// ```rust
/// use heavy_sketches::{HeavyGuardian, Sketch};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut sketch: HeavyGuardian<u64, StdRng> =
///     HeavyGuardian::with_rng(4096, StdRng::seed_from_u64(1)).unwrap();
///
/// for _ in 0..10 {
///     sketch.insert(&7);
/// }
/// sketch.insert(&8);
///
/// assert_eq!(sketch.query(&7), 10);
/// assert_eq!(sketch.query(&8), 1);
/// assert_eq!(sketch.query(&9), 0);
/// assert_eq!(sketch.all_query().len(), 2);
/// ```
///
/// [`HeavyGuardian`]: type.HeavyGuardian.html
/// [`LinearDecaySketch`]: type.LinearDecaySketch.html
/// [`NoDecaySketch`]: type.NoDecaySketch.html
pub struct BucketSketch<K, P, const C: usize, R, H = DefaultKeyHasher<K>> {
    buckets: Vec<Bucket<K, C>>,
    stage1_bias: Count,
    name: String,
    policy: P,
    key_hasher: H,
    rng: R,
}

impl<K: Hash + Eq + Clone, P: DecayPolicy + Default, const C: usize, R: RngCore>
    BucketSketch<K, P, C, R>
{
    /// Creates a sketch from a memory budget in bytes and a random generator.
    pub fn with_rng(memory: usize, rng: R) -> Result<Self, SketchError> {
        BucketSketchBuilder::new(memory).finalize_with_rng(rng)
    }
}

cfg_std!(
    impl<K: Hash + Eq + Clone, P: DecayPolicy + Default, const C: usize>
        BucketSketch<K, P, C, crate::DefaultRng>
    {
        /// Creates a sketch from a memory budget in bytes, seeding its generator from entropy.
        pub fn new(memory: usize) -> Result<Self, SketchError> {
            BucketSketchBuilder::new(memory).finalize()
        }
    }
);

impl<K: Hash + Eq + Clone, P: DecayPolicy + Default, const C: usize, R, H> BucketSketch<K, P, C, R, H> {
    /// Returns a [`BucketSketchBuilder`] with default configurations.
    ///
    /// [`BucketSketchBuilder`]: struct.BucketSketchBuilder.html
    pub fn builder(memory: usize) -> BucketSketchBuilder<K, P, C> {
        BucketSketchBuilder::new(memory)
    }
}

impl<K, P, const C: usize, R, H> BucketSketch<K, P, C, R, H> {
    /// The number of bytes one bucket occupies; the memory budget is divided by it.
    pub fn bucket_bytes() -> usize {
        core::mem::size_of::<Bucket<K, C>>()
    }

    /// Returns the number of buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the total number of counter slots.
    pub fn capacity(&self) -> usize {
        self.buckets.len() * C
    }

    /// Returns the bytes held by the table.
    pub fn memory_bytes(&self) -> usize {
        self.buckets.len() * Self::bucket_bytes()
    }

    /// Returns the constant added to every count reported by `all_query`.
    pub fn stage1_bias(&self) -> Count {
        self.stage1_bias
    }

    /// Returns the decay policy.
    pub fn policy(&self) -> &P {
        &self.policy
    }
}

impl<K: Hash + Eq + Clone, P: DecayPolicy, const C: usize, R: RngCore, H: KeyHasher<K>> Sketch<K>
    for BucketSketch<K, P, C, R, H>
{
    fn insert(&mut self, key: &K) {
        let pos = index(&self.key_hasher, key, 0, self.buckets.len());
        let bucket = &mut self.buckets[pos];

        if let Probe::Full { min } = bucket.offer(key) {
            if self.policy.collide(bucket.count_mut(min), &mut self.rng) {
                bucket.replace(min, key, 1);
                tracing::trace!(bucket = pos, slot = min, "slot taken over");
            }
        }
    }

    fn query(&self, key: &K) -> Count {
        self.buckets[index(&self.key_hasher, key, 0, self.buckets.len())].query(key)
    }

    fn entries(&self) -> Vec<(K, Count)> {
        self.buckets
            .iter()
            .flat_map(|bucket| bucket.iter())
            .map(|(id, count)| (id.clone(), count.saturating_add(self.stage1_bias)))
            .collect()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn clear(&mut self) {
        self.buckets.iter_mut().for_each(|b| b.clear());
    }
}
