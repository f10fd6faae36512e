//! The basic APIs for sketch implementation.
use crate::{Count, HeavyHitters};
use alloc::vec::Vec;
use core::hash::Hash;

/// Sketch contains the basic APIs for a heavy-hitter sketch.
/// All of sketches in this crate implement this trait, and so does
/// [`TwoStage`], which accepts any of them as its second stage.
///
/// [`TwoStage`]: struct.TwoStage.html
pub trait Sketch<K: Hash + Eq> {
    /// Records one occurrence of the key.
    fn insert(&mut self, key: &K);

    /// Returns the estimated count of the key, or 0 if the key is not resident.
    fn query(&self, key: &K) -> Count;

    /// Returns every resident key with its count, stage-1 bias included, in
    /// table scan order. Each key appears once even when several hash
    /// functions can see it.
    fn entries(&self) -> Vec<(K, Count)>;

    /// Returns every resident key with its count, stage-1 bias included.
    fn all_query(&self) -> HeavyHitters<K> {
        self.entries().into_iter().collect()
    }

    /// Returns the name of the sketch.
    fn name(&self) -> &str;

    /// Empties every slot. The table keeps its length and allocation.
    fn clear(&mut self);

    /// Returns the resident keys whose reported count is at least `threshold`.
    fn heavy_hitters(&self, threshold: Count) -> HeavyHitters<K> {
        let mut all = self.all_query();
        all.retain(|_, c| *c >= threshold);
        all
    }

    /// Returns the `k` resident keys with the largest reported counts, largest
    /// first. Equal counts keep their scan order.
    fn top_k(&self, k: usize) -> Vec<(K, Count)> {
        let mut all = self.entries();
        all.sort_by(|a, b| b.1.cmp(&a.1));
        all.truncate(k);
        all
    }
}

/// Filter is the cheap first stage of a [`TwoStage`] composition.
///
/// [`TwoStage`]: struct.TwoStage.html
pub trait Filter<K: Hash + Eq> {
    /// Records one occurrence of the key and returns the estimate after the update.
    fn insert(&mut self, key: &K) -> Count;

    /// Returns the estimate of the key without updating the filter.
    fn query(&self, key: &K) -> Count;

    /// Returns the name of the filter.
    fn name(&self) -> &str;

    /// Zeroes every counter.
    fn clear(&mut self);
}
