//! Fixed-memory frequency sketches that keep heavy hitters alive under
//! collisions (support no_std).
//!
//! Every sketch is sized once from a memory budget and never grows. Keys are
//! hashed into buckets (or into one slot per hash function); when a new key
//! meets a full bucket, a randomized decay policy decides whether the weakest
//! resident gives way. The larger a key's counter (and, for some sketches,
//! its stability), the harder it is to evict, so the table converges on the
//! most frequent keys of the stream.
//!
//! - [`HeavyGuardian`], [`LinearDecaySketch`], [`NoDecaySketch`]: one hash,
//!   buckets of several counters ([`BucketSketch`] with a [`DecayPolicy`]).
//! - [`DecaySketch`], [`StableSketch`], [`TightSketch`]: `d` hash functions,
//!   one counter per slot ([`ProbeSketch`] with a [`ProbePolicy`]).
//! - [`TwoFaSketch`]: buckets guarded by a vote counter, with a secondary hash.
//! - [`CountingBloomFilter`] and [`TwoStage`]: a cheap filter cascaded in front
//!   of any [`Sketch`].
//!
//! ## Acknowledgments
//! - Tong Yang et al. -- [HeavyGuardian: Separate and Guard Hot Items in Data Streams]
//!
//! [HeavyGuardian: Separate and Guard Hot Items in Data Streams]: https://dl.acm.org/doi/10.1145/3219819.3219978
//! [`HeavyGuardian`]: type.HeavyGuardian.html
//! [`LinearDecaySketch`]: type.LinearDecaySketch.html
//! [`NoDecaySketch`]: type.NoDecaySketch.html
//! [`BucketSketch`]: struct.BucketSketch.html
//! [`DecayPolicy`]: trait.DecayPolicy.html
//! [`DecaySketch`]: type.DecaySketch.html
//! [`StableSketch`]: type.StableSketch.html
//! [`TightSketch`]: type.TightSketch.html
//! [`ProbeSketch`]: struct.ProbeSketch.html
//! [`ProbePolicy`]: trait.ProbePolicy.html
//! [`TwoFaSketch`]: struct.TwoFaSketch.html
//! [`CountingBloomFilter`]: struct.CountingBloomFilter.html
//! [`TwoStage`]: struct.TwoStage.html
//! [`Sketch`]: trait.Sketch.html
#![no_std]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]
extern crate alloc;
#[cfg(feature = "hashbrown")]
extern crate hashbrown;

#[cfg(any(test, feature = "std", not(feature = "hashbrown")))]
extern crate std;

#[macro_use]
mod macros;
mod polyfill;

mod bucket;
mod error;
mod filter;
pub mod hash;
pub mod metrics;
mod probe;
mod sketch_api;
mod two_stage;
mod vote;

pub use bucket::{
    BucketSketch, BucketSketchBuilder, DecayPolicy, ExponentialDecay, HeavyGuardian,
    LinearDecay, LinearDecaySketch, NoDecay, NoDecaySketch,
};
pub use error::SketchError;
pub use filter::CountingBloomFilter;
pub use hash::{DefaultKeyHasher, KeyHasher};
pub use probe::{
    ArrivalStrength, DecaySketch, PlainDecay, ProbePolicy, ProbeSketch, ProbeSketchBuilder,
    Stability, StableSketch, TightSketch,
};
pub use sketch_api::{Filter, Sketch};
pub use two_stage::{TwoStage, TwoStageBuilder};
pub use vote::{TwoFaSketch, TwoFaSketchBuilder};

import_hashbrown!(HashMap);
import_std!(HashMap);

/// The counter type of every sketch. Increments saturate at `Count::MAX`.
pub type Count = u32;

/// The mapping returned by [`Sketch::all_query`].
///
/// [`Sketch::all_query`]: trait.Sketch.html#method.all_query
pub type HeavyHitters<K> = HashMap<K, Count>;

/// The hash builder behind [`DefaultKeyHasher`].
///
/// [`DefaultKeyHasher`]: hash/struct.DefaultKeyHasher.html
#[cfg(feature = "hashbrown")]
pub type DefaultHashBuilder = hashbrown::hash_map::DefaultHashBuilder;

/// The hash builder behind [`DefaultKeyHasher`].
///
/// [`DefaultKeyHasher`]: hash/struct.DefaultKeyHasher.html
#[cfg(not(feature = "hashbrown"))]
pub type DefaultHashBuilder =
    core::hash::BuildHasherDefault<std::collections::hash_map::DefaultHasher>;

cfg_std!(
    /// The generator seeded from entropy by the convenience constructors.
    pub type DefaultRng = rand::rngs::StdRng;
);
