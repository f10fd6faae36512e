//! Two-stage composition: a counting filter cascaded in front of a sketch.
use crate::error::{check_ratio, SketchError};
use crate::filter::CountingBloomFilter;
use crate::probe::{ProbeSketchBuilder, TightSketch};
use crate::{Count, Filter, Sketch};
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::hash::Hash;
use core::marker::PhantomData;
use rand::RngCore;

const DEFAULT_FILTER_RATIO: f64 = 0.5;
const DEFAULT_SKETCH_RATIO: f64 = 0.5;
const DEFAULT_STAGE1_THRESHOLD_RATIO: f64 = 0.5;

/// `TwoStageBuilder` splits a memory budget and a heavy-hitter threshold
/// between the two stages of a [`TwoStage`].
///
/// [`TwoStage`]: struct.TwoStage.html
pub struct TwoStageBuilder<K> {
    memory: usize,
    threshold: Count,
    filter_ratio: f64,
    sketch_ratio: f64,
    stage1_threshold_ratio: f64,
    marker: PhantomData<K>,
}

impl<K: Hash + Eq + Clone> TwoStageBuilder<K> {
    /// The constructor of TwoStageBuilder. `memory` is the total budget in
    /// bytes and `threshold` the heavy-hitter threshold of the measurement.
    pub fn new(memory: usize, threshold: Count) -> Self {
        Self {
            memory,
            threshold,
            filter_ratio: DEFAULT_FILTER_RATIO,
            sketch_ratio: DEFAULT_SKETCH_RATIO,
            stage1_threshold_ratio: DEFAULT_STAGE1_THRESHOLD_RATIO,
            marker: PhantomData,
        }
    }

    /// Set the share of the budget given to the filter
    pub fn set_filter_ratio(self, ratio: f64) -> Self {
        Self {
            filter_ratio: ratio,
            ..self
        }
    }

    /// Set the share of the budget given to the sketch
    pub fn set_sketch_ratio(self, ratio: f64) -> Self {
        Self {
            sketch_ratio: ratio,
            ..self
        }
    }

    /// Set the share of the threshold a key must reach in the filter before
    /// it is promoted to the sketch
    pub fn set_stage1_threshold_ratio(self, ratio: f64) -> Self {
        Self {
            stage1_threshold_ratio: ratio,
            ..self
        }
    }

    /// Returns the filter budget, the sketch budget and the stage-1 threshold.
    fn split(&self) -> Result<(usize, usize, Count), SketchError> {
        let filter_memory = (self.memory as f64 * check_ratio(self.filter_ratio)?) as usize;
        let sketch_memory = (self.memory as f64 * check_ratio(self.sketch_ratio)?) as usize;
        // both stages together must fit the budget
        check_ratio(self.filter_ratio + self.sketch_ratio)?;
        let stage1_threshold =
            (self.threshold as f64 * check_ratio(self.stage1_threshold_ratio)?) as Count;
        Ok((filter_memory, sketch_memory, stage1_threshold))
    }

    /// Finalize the builder with a custom second stage.
    ///
    /// `sketch` receives the sketch budget in bytes and the stage-1 threshold,
    /// which the sketch should use as its stage-1 bias.
    pub fn finalize_with<S, C>(
        self,
        sketch: C,
    ) -> Result<TwoStage<K, CountingBloomFilter<K>, S>, SketchError>
    where
        S: Sketch<K>,
        C: FnOnce(usize, Count) -> Result<S, SketchError>,
    {
        let (filter_memory, sketch_memory, stage1_threshold) = self.split()?;
        let filter = CountingBloomFilter::new(filter_memory)?;
        let sketch = sketch(sketch_memory, stage1_threshold)?;
        Ok(TwoStage::from_parts(filter, sketch, stage1_threshold))
    }

    /// Finalize the builder with a [`TightSketch`] second stage drawing randomness from `rng`.
    ///
    /// [`TightSketch`]: type.TightSketch.html
    pub fn finalize_with_rng<R: RngCore>(
        self,
        rng: R,
    ) -> Result<TwoStage<K, CountingBloomFilter<K>, TightSketch<K, R>>, SketchError> {
        self.finalize_with(|memory, bias| {
            ProbeSketchBuilder::new(memory)
                .set_stage1_bias(bias)
                .finalize_with_rng(rng)
        })
    }

    /// Finalize the builder with a [`TightSketch`] second stage seeded from entropy.
    ///
    /// [`TightSketch`]: type.TightSketch.html
    #[cfg(feature = "std")]
    #[cfg_attr(docsrs, doc(cfg(feature = "std")))]
    pub fn finalize(
        self,
    ) -> Result<TwoStage<K, CountingBloomFilter<K>, TightSketch<K, crate::DefaultRng>>, SketchError>
    {
        use rand::SeedableRng;
        self.finalize_with_rng(crate::DefaultRng::from_entropy())
    }
}

/// `TwoStage` cascades a cheap [`Filter`] in front of a [`Sketch`].
///
/// Every key is counted by the filter; only keys whose filter estimate has
/// reached the stage-1 threshold are forwarded to the sketch. Light keys thus
/// never compete for sketch slots, and `all_query` reports the sketch alone.
///
/// # Example
/// ```rust
/// use heavy_sketches::{Sketch, TwoStageBuilder};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut two_stage = TwoStageBuilder::<u64>::new(1 << 16, 10)
///     .finalize_with_rng(StdRng::seed_from_u64(0))
///     .unwrap();
///
/// assert_eq!(two_stage.name(), "TwoStage ( CountingBloomFilter + TightSketch )");
/// assert_eq!(two_stage.stage1_threshold(), 5);
///
/// for _ in 0..4 {
///     two_stage.insert(&1);
/// }
/// assert!(two_stage.all_query().is_empty());
///
/// two_stage.insert(&1);
/// assert_eq!(two_stage.all_query().get(&1), Some(&6));
/// ```
///
/// [`Filter`]: trait.Filter.html
/// [`Sketch`]: trait.Sketch.html
pub struct TwoStage<K, F, S> {
    filter: F,
    sketch: S,
    stage1_threshold: Count,
    name: String,
    marker: PhantomData<K>,
}

impl<K: Hash + Eq, F: Filter<K>, S: Sketch<K>> TwoStage<K, F, S> {
    /// Composes an existing filter and sketch. Keys are promoted once their
    /// filter estimate reaches `stage1_threshold`.
    pub fn from_parts(filter: F, sketch: S, stage1_threshold: Count) -> Self {
        let name = format!("TwoStage ( {} + {} )", filter.name(), sketch.name());
        tracing::debug!(name = %name, stage1_threshold, "two-stage sketch constructed");
        Self {
            filter,
            sketch,
            stage1_threshold,
            name,
            marker: PhantomData,
        }
    }

    /// Returns the promotion threshold of the filter stage.
    pub fn stage1_threshold(&self) -> Count {
        self.stage1_threshold
    }

    /// Returns the filter stage.
    pub fn filter(&self) -> &F {
        &self.filter
    }

    /// Returns the sketch stage.
    pub fn sketch(&self) -> &S {
        &self.sketch
    }

    /// An insert promotes a key when it lifts the filter estimate from below
    /// the threshold to at or above it, by any step.
    fn crosses(&self, before: Count, after: Count) -> bool {
        before < self.stage1_threshold && after >= self.stage1_threshold
    }
}

impl<K: Hash + Eq, F: Filter<K>, S: Sketch<K>> Sketch<K> for TwoStage<K, F, S> {
    fn insert(&mut self, key: &K) {
        let before = self.filter.query(key);
        let estimate = self.filter.insert(key);
        if estimate >= self.stage1_threshold {
            if self.crosses(before, estimate) {
                tracing::debug!(before, estimate, "key promoted to stage 2");
            }
            self.sketch.insert(key);
        }
    }

    fn query(&self, key: &K) -> Count {
        let estimate = self.filter.query(key);
        if estimate < self.stage1_threshold {
            return estimate;
        }
        estimate.saturating_add(self.sketch.query(key))
    }

    fn entries(&self) -> Vec<(K, Count)> {
        self.sketch.entries()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn clear(&mut self) {
        self.filter.clear();
        self.sketch.clear();
    }
}
