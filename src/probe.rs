//! Multi-hash sketches: `d` independent tables of single-counter slots.
//!
//! A key has one candidate slot per table. Probing goes table by table: the
//! first empty slot is claimed, a match is incremented, and otherwise the
//! candidate with the smallest counter is offered to the sketch's
//! [`ProbePolicy`] for decay.
//!
//! [`ProbePolicy`]: trait.ProbePolicy.html
mod policy;

pub use policy::{ArrivalStrength, PlainDecay, ProbePolicy, Stability};

use crate::error::{table_length, SketchError};
use crate::hash::{index, DefaultKeyHasher, KeyHasher};
use crate::{Count, Sketch};
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::hash::Hash;
use core::marker::PhantomData;
use rand::RngCore;

const DEFAULT_HASH_NUM: usize = 4;

/// Plain multi-hash decay sketch.
pub type DecaySketch<K, R, H = DefaultKeyHasher<K>> = ProbeSketch<K, PlainDecay, R, H>;

/// StableSketch: multi-hash slots weighted by hit stability.
pub type StableSketch<K, R, H = DefaultKeyHasher<K>> = ProbeSketch<K, Stability, R, H>;

/// TightSketch: multi-hash slots weighted by arrival strength.
pub type TightSketch<K, R, H = DefaultKeyHasher<K>> = ProbeSketch<K, ArrivalStrength, R, H>;

struct Cell<K, A> {
    id: Option<K>,
    counter: Count,
    aux: A,
}

impl<K, A: Default> Cell<K, A> {
    fn empty() -> Self {
        Self {
            id: None,
            counter: 0,
            aux: A::default(),
        }
    }
}

/// `ProbeSketchBuilder` is used to help build a [`ProbeSketch`] with custom configurations.
///
/// [`ProbeSketch`]: struct.ProbeSketch.html
pub struct ProbeSketchBuilder<K, P, H = DefaultKeyHasher<K>> {
    memory: usize,
    hash_num: usize,
    stage1_bias: Count,
    name: Option<String>,
    policy: P,
    key_hasher: H,
    marker: PhantomData<K>,
}

impl<K: Hash + Eq + Clone, P: ProbePolicy + Default> ProbeSketchBuilder<K, P> {
    /// The constructor of ProbeSketchBuilder, `memory` is the budget in bytes.
    pub fn new(memory: usize) -> Self {
        Self {
            memory,
            hash_num: DEFAULT_HASH_NUM,
            stage1_bias: 0,
            name: None,
            policy: P::default(),
            key_hasher: DefaultKeyHasher::default(),
            marker: PhantomData,
        }
    }
}

impl<K: Hash + Eq + Clone, P: ProbePolicy, H: KeyHasher<K>> ProbeSketchBuilder<K, P, H> {
    /// Set the number of hash functions (and tables)
    pub fn set_hash_num(self, hash_num: usize) -> Self {
        Self { hash_num, ..self }
    }

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

    /// Set the eviction policy
    pub fn set_policy(self, policy: P) -> Self {
        Self { policy, ..self }
    }

    /// Set the key hasher
    pub fn set_key_hasher<NH: KeyHasher<K>>(self, hasher: NH) -> ProbeSketchBuilder<K, P, NH> {
        ProbeSketchBuilder {
            memory: self.memory,
            hash_num: self.hash_num,
            stage1_bias: self.stage1_bias,
            name: self.name,
            policy: self.policy,
            key_hasher: hasher,
            marker: self.marker,
        }
    }

    /// Finalize the builder to [`ProbeSketch`], drawing randomness from `rng`.
    ///
    /// [`ProbeSketch`]: struct.ProbeSketch.html
    pub fn finalize_with_rng<R: RngCore>(
        self,
        rng: R,
    ) -> Result<ProbeSketch<K, P, R, H>, SketchError> {
        if self.hash_num == 0 {
            return Err(SketchError::InvalidHashNum(self.hash_num));
        }

        let slot_bytes = ProbeSketch::<K, P, R, H>::slot_bytes();
        let length = table_length(self.memory, slot_bytes * self.hash_num)?;
        let tables = (0..self.hash_num)
            .map(|_| (0..length).map(|_| Cell::empty()).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        let name = self.name.unwrap_or_else(|| P::NAME.to_string());

        tracing::debug!(
            name = %name,
            hash_num = self.hash_num,
            length,
            bytes = length * self.hash_num * slot_bytes,
            "probe sketch constructed"
        );

        Ok(ProbeSketch {
            tables,
            length,
            stage1_bias: self.stage1_bias,
            name,
            policy: self.policy,
            key_hasher: self.key_hasher,
            rng,
        })
    }

    /// Finalize the builder to [`ProbeSketch`], seeding a [`DefaultRng`] from entropy.
    ///
    /// [`ProbeSketch`]: struct.ProbeSketch.html
    /// [`DefaultRng`]: type.DefaultRng.html
    #[cfg(feature = "std")]
    #[cfg_attr(docsrs, doc(cfg(feature = "std")))]
    pub fn finalize(self) -> Result<ProbeSketch<K, P, crate::DefaultRng, H>, SketchError> {
        use rand::SeedableRng;
        self.finalize_with_rng(crate::DefaultRng::from_entropy())
    }
}

/// `ProbeSketch` keeps `hash_num` tables of `(id, counter, aux)` slots, one
/// hash function per table.
///
/// A key is stored in at most one slot across all tables. See
/// [`DecaySketch`], [`StableSketch`] and [`TightSketch`] for the configured
/// variants.
///
/// # Example
/// ```rust
/// use heavy_sketches::{ProbeSketchBuilder, Sketch, Stability};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut sketch = ProbeSketchBuilder::<&str, Stability>::new(8192)
///     .set_hash_num(2)
///     .set_stage1_bias(100)
///     .finalize_with_rng(StdRng::seed_from_u64(7))
///     .unwrap();
///
/// sketch.insert(&"10.0.0.1");
/// sketch.insert(&"10.0.0.1");
///
/// assert_eq!(sketch.name(), "StableSketch");
/// assert_eq!(sketch.query(&"10.0.0.1"), 2);
/// assert_eq!(sketch.all_query().get(&"10.0.0.1"), Some(&102));
/// ```
///
/// [`DecaySketch`]: type.DecaySketch.html
/// [`StableSketch`]: type.StableSketch.html
/// [`TightSketch`]: type.TightSketch.html
pub struct ProbeSketch<K, P: ProbePolicy, R, H = DefaultKeyHasher<K>> {
    tables: Vec<Vec<Cell<K, P::Aux>>>,
    length: usize,
    stage1_bias: Count,
    name: String,
    policy: P,
    key_hasher: H,
    rng: R,
}

impl<K: Hash + Eq + Clone, P: ProbePolicy + Default, R: RngCore> ProbeSketch<K, P, R> {
    /// Creates a sketch from a memory budget in bytes and a random generator.
    pub fn with_rng(memory: usize, rng: R) -> Result<Self, SketchError> {
        ProbeSketchBuilder::new(memory).finalize_with_rng(rng)
    }
}

cfg_std!(
    impl<K: Hash + Eq + Clone, P: ProbePolicy + Default> ProbeSketch<K, P, crate::DefaultRng> {
        /// Creates a sketch from a memory budget in bytes, seeding its generator from entropy.
        pub fn new(memory: usize) -> Result<Self, SketchError> {
            ProbeSketchBuilder::new(memory).finalize()
        }
    }
);

impl<K: Hash + Eq + Clone, P: ProbePolicy + Default, R, H> ProbeSketch<K, P, R, H> {
    /// Returns a [`ProbeSketchBuilder`] with default configurations.
    ///
    /// [`ProbeSketchBuilder`]: struct.ProbeSketchBuilder.html
    pub fn builder(memory: usize) -> ProbeSketchBuilder<K, P> {
        ProbeSketchBuilder::new(memory)
    }
}

impl<K, P: ProbePolicy, R, H> ProbeSketch<K, P, R, H> {
    /// The number of bytes one slot occupies.
    pub fn slot_bytes() -> usize {
        core::mem::size_of::<Cell<K, P::Aux>>()
    }

    /// Returns the number of slots per table.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Returns the number of hash functions (and tables).
    pub fn hash_num(&self) -> usize {
        self.tables.len()
    }

    /// Returns the total number of slots.
    pub fn capacity(&self) -> usize {
        self.length * self.tables.len()
    }

    /// Returns the bytes held by the tables.
    pub fn memory_bytes(&self) -> usize {
        self.capacity() * Self::slot_bytes()
    }

    /// Returns the constant added to every count reported by `all_query`.
    pub fn stage1_bias(&self) -> Count {
        self.stage1_bias
    }

    /// Returns the eviction policy.
    pub fn policy(&self) -> &P {
        &self.policy
    }
}

impl<K: Hash + Eq, P: ProbePolicy, R, H: KeyHasher<K>> ProbeSketch<K, P, R, H> {
    /// Returns the first table whose candidate slot holds `key`.
    fn first_table(&self, key: &K) -> Option<usize> {
        self.tables.iter().enumerate().position(|(i, table)| {
            table[index(&self.key_hasher, key, i as u32, self.length)].id.as_ref() == Some(key)
        })
    }
}

impl<K: Hash + Eq + Clone, P: ProbePolicy, R: RngCore, H: KeyHasher<K>> Sketch<K>
    for ProbeSketch<K, P, R, H>
{
    fn insert(&mut self, key: &K) {
        let mut min = Count::MAX;
        let mut target = None;

        for (i, table) in self.tables.iter_mut().enumerate() {
            let pos = index(&self.key_hasher, key, i as u32, self.length);
            let cell = &mut table[pos];
            match &cell.id {
                None => {
                    cell.id = Some(key.clone());
                    cell.counter = 1;
                    self.policy.on_claim(&mut cell.aux);
                    return;
                }
                Some(id) if id == key => {
                    cell.counter = cell.counter.saturating_add(1);
                    self.policy.on_hit(&mut cell.aux);
                    return;
                }
                Some(_) => {
                    if cell.counter < min {
                        min = cell.counter;
                        target = Some((i, pos));
                    }
                    self.policy.on_pass(&mut cell.aux);
                }
            }
        }

        // every candidate is saturated
        let (i, pos) = match target {
            Some(t) => t,
            None => return,
        };

        let cell = &mut self.tables[i][pos];
        if self.policy.decays(cell.counter, cell.aux, &mut self.rng) {
            cell.counter = cell.counter.saturating_sub(1);
        }
        if cell.counter == 0 {
            cell.id = Some(key.clone());
            cell.counter = 1;
            self.policy.on_replace(&mut cell.aux);
            tracing::trace!(table = i, slot = pos, "slot taken over");
        }
    }

    fn query(&self, key: &K) -> Count {
        self.first_table(key).map_or(0, |i| {
            self.tables[i][index(&self.key_hasher, key, i as u32, self.length)].counter
        })
    }

    fn entries(&self) -> Vec<(K, Count)> {
        let mut ret = Vec::new();
        for (i, table) in self.tables.iter().enumerate() {
            for cell in table {
                let id = match &cell.id {
                    Some(id) => id,
                    None => continue,
                };
                // a key seen by an earlier table was already reported there
                if self.first_table(id) == Some(i) {
                    ret.push((id.clone(), cell.counter.saturating_add(self.stage1_bias)));
                }
            }
        }
        ret
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn clear(&mut self) {
        self.tables
            .iter_mut()
            .flat_map(|t| t.iter_mut())
            .for_each(|cell| *cell = Cell::empty());
    }
}
