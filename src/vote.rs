//! The two-hash vote sketch.
//!
//! Buckets of eight counters, each guarded by a vote counter. A key that
//! meets a full bucket does not evict anyone by chance: it casts a vote, and
//! only when the votes catch up with the weakest counter does a replacement
//! happen. Keys whose bucket is already strong (weakest counter at or above
//! half the threshold) get a second bucket from an independent hash.
use crate::bucket::slots::{Bucket, Probe};
use crate::error::{table_length, SketchError};
use crate::hash::{index, DefaultKeyHasher, KeyHasher};
use crate::{Count, Sketch};
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::hash::Hash;
use core::marker::PhantomData;

const BUCKET_SIZE: usize = 8;
const DEFAULT_THRESHOLD: Count = 3216;
const SECONDARY_SEED: u32 = 101;
const NAME: &str = "TwoFASketch";

struct VoteBucket<K> {
    slots: Bucket<K, BUCKET_SIZE>,
    vote: Count,
}

impl<K: Eq + Clone> VoteBucket<K> {
    fn new() -> Self {
        Self {
            slots: Bucket::new(),
            vote: 0,
        }
    }

    /// Returns `true` when the key took over `min`.
    fn vote(&mut self, min: usize, key: &K) -> bool {
        self.vote = self.vote.saturating_add(1);
        if self.vote >= self.slots.count(min) {
            self.slots.replace(min, key, self.vote);
            self.vote = 0;
            return true;
        }
        false
    }

    fn clear(&mut self) {
        self.slots.clear();
        self.vote = 0;
    }
}

/// `TwoFaSketchBuilder` is used to help build a [`TwoFaSketch`] with custom configurations.
///
/// [`TwoFaSketch`]: struct.TwoFaSketch.html
pub struct TwoFaSketchBuilder<K, H = DefaultKeyHasher<K>> {
    memory: usize,
    threshold: Count,
    stage1_bias: Count,
    name: Option<String>,
    key_hasher: H,
    marker: PhantomData<K>,
}

impl<K: Hash + Eq + Clone> TwoFaSketchBuilder<K> {
    /// The constructor of TwoFaSketchBuilder, `memory` is the budget in bytes.
    pub fn new(memory: usize) -> Self {
        Self {
            memory,
            threshold: DEFAULT_THRESHOLD,
            stage1_bias: 0,
            name: None,
            key_hasher: DefaultKeyHasher::default(),
            marker: PhantomData,
        }
    }
}

impl<K: Hash + Eq + Clone, H: KeyHasher<K>> TwoFaSketchBuilder<K, H> {
    /// Set the heavy-hitter threshold; buckets whose weakest counter reaches
    /// half of it send challengers to the secondary bucket
    pub fn set_threshold(self, threshold: Count) -> Self {
        Self { threshold, ..self }
    }

    /// Set the constant added to reported counts
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

    /// Set the key hasher
    pub fn set_key_hasher<NH: KeyHasher<K>>(self, hasher: NH) -> TwoFaSketchBuilder<K, NH> {
        TwoFaSketchBuilder {
            memory: self.memory,
            threshold: self.threshold,
            stage1_bias: self.stage1_bias,
            name: self.name,
            key_hasher: hasher,
            marker: self.marker,
        }
    }

    /// Finalize the builder to [`TwoFaSketch`]
    ///
    /// [`TwoFaSketch`]: struct.TwoFaSketch.html
    pub fn finalize(self) -> Result<TwoFaSketch<K, H>, SketchError> {
        let length = table_length(self.memory, TwoFaSketch::<K, H>::bucket_bytes())?;
        let buckets = (0..length).map(|_| VoteBucket::new()).collect::<Vec<_>>();
        let name = self.name.unwrap_or_else(|| NAME.to_string());

        tracing::debug!(
            name = %name,
            length,
            bucket_size = BUCKET_SIZE,
            threshold = self.threshold,
            bytes = length * TwoFaSketch::<K, H>::bucket_bytes(),
            "vote sketch constructed"
        );

        Ok(TwoFaSketch {
            buckets,
            threshold: self.threshold,
            stage1_bias: self.stage1_bias,
            name,
            key_hasher: self.key_hasher,
        })
    }
}

/// `TwoFaSketch` is a single-hash table of eight-counter buckets where
/// replacements are decided by vote rather than by chance.
///
/// The sketch draws no randomness. `query` looks at the primary bucket only,
/// so a key parked in its secondary bucket is reported by `all_query` but not
/// by `query`.
///
/// # Example
/// ```rust
/// use heavy_sketches::{Sketch, TwoFaSketch};
///
/// let mut sketch: TwoFaSketch<u64> = TwoFaSketch::new(4096).unwrap();
/// for _ in 0..3 {
///     sketch.insert(&42);
/// }
/// assert_eq!(sketch.name(), "TwoFASketch");
/// assert_eq!(sketch.query(&42), 3);
/// assert_eq!(sketch.query(&43), 0);
/// ```
pub struct TwoFaSketch<K, H = DefaultKeyHasher<K>> {
    buckets: Vec<VoteBucket<K>>,
    threshold: Count,
    stage1_bias: Count,
    name: String,
    key_hasher: H,
}

impl<K: Hash + Eq + Clone> TwoFaSketch<K> {
    /// Creates a sketch from a memory budget in bytes with the default threshold.
    pub fn new(memory: usize) -> Result<Self, SketchError> {
        TwoFaSketchBuilder::new(memory).finalize()
    }

    /// Returns a [`TwoFaSketchBuilder`] with default configurations.
    ///
    /// [`TwoFaSketchBuilder`]: struct.TwoFaSketchBuilder.html
    pub fn builder(memory: usize) -> TwoFaSketchBuilder<K> {
        TwoFaSketchBuilder::new(memory)
    }
}

impl<K, H> TwoFaSketch<K, H> {
    /// The number of bytes one bucket, vote counter included, occupies.
    pub fn bucket_bytes() -> usize {
        core::mem::size_of::<VoteBucket<K>>()
    }

    /// Returns the number of buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the total number of counter slots.
    pub fn capacity(&self) -> usize {
        self.buckets.len() * BUCKET_SIZE
    }

    /// Returns the bytes held by the table.
    pub fn memory_bytes(&self) -> usize {
        self.buckets.len() * Self::bucket_bytes()
    }

    /// Returns the heavy-hitter threshold.
    pub fn threshold(&self) -> Count {
        self.threshold
    }

    /// Returns the constant added to reported counts.
    pub fn stage1_bias(&self) -> Count {
        self.stage1_bias
    }
}

impl<K: Hash + Eq + Clone, H: KeyHasher<K>> Sketch<K> for TwoFaSketch<K, H> {
    fn insert(&mut self, key: &K) {
        let len = self.buckets.len();
        let mut pos = index(&self.key_hasher, key, 0, len);
        let mut min = match self.buckets[pos].slots.offer(key) {
            Probe::Full { min } => min,
            _ => return,
        };

        if self.buckets[pos].slots.count(min) >= self.threshold / 2 {
            pos = index(&self.key_hasher, key, SECONDARY_SEED, len);
            min = match self.buckets[pos].slots.offer(key) {
                Probe::Full { min } => min,
                _ => return,
            };
        }

        if self.buckets[pos].vote(min, key) {
            tracing::trace!(bucket = pos, slot = min, "vote committed");
        }
    }

    fn query(&self, key: &K) -> Count {
        let pos = index(&self.key_hasher, key, 0, self.buckets.len());
        match self.buckets[pos].slots.query(key) {
            0 => 0,
            count => count.saturating_add(self.stage1_bias),
        }
    }

    fn entries(&self) -> Vec<(K, Count)> {
        self.buckets
            .iter()
            .flat_map(|bucket| bucket.slots.iter())
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
