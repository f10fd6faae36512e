use crate::Count;

/// Outcome of offering a key to a bucket.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Probe {
    /// The key was resident, its counter was incremented.
    Hit,
    /// The key took an empty slot with count 1.
    Claimed,
    /// The bucket is full and the key is absent. `min` is the first slot in
    /// scan order holding the smallest counter.
    Full { min: usize },
}

/// A fixed-capacity group of `C` counter slots addressed by one hash.
///
/// A slot is empty iff its id is `None`; no key value is reserved.
pub(crate) struct Bucket<K, const C: usize> {
    ids: [Option<K>; C],
    counts: [Count; C],
}

impl<K: Eq + Clone, const C: usize> Bucket<K, C> {
    pub(crate) fn new() -> Self {
        Self {
            ids: core::array::from_fn(|_| None),
            counts: [0; C],
        }
    }

    /// Scans the bucket for `key`: increments it on a match, claims the first
    /// empty slot otherwise, and reports the weakest slot when full.
    pub(crate) fn offer(&mut self, key: &K) -> Probe {
        let mut min = 0;
        let mut min_val = Count::MAX;

        for i in 0..C {
            match &self.ids[i] {
                Some(id) if id == key => {
                    self.counts[i] = self.counts[i].saturating_add(1);
                    return Probe::Hit;
                }
                None => {
                    self.ids[i] = Some(key.clone());
                    self.counts[i] = 1;
                    return Probe::Claimed;
                }
                Some(_) => {
                    if self.counts[i] < min_val {
                        min = i;
                        min_val = self.counts[i];
                    }
                }
            }
        }

        Probe::Full { min }
    }

    pub(crate) fn query(&self, key: &K) -> Count {
        self.ids
            .iter()
            .position(|id| id.as_ref() == Some(key))
            .map_or(0, |i| self.counts[i])
    }

    pub(crate) fn count(&self, slot: usize) -> Count {
        self.counts[slot]
    }

    pub(crate) fn count_mut(&mut self, slot: usize) -> &mut Count {
        &mut self.counts[slot]
    }

    /// Swaps the occupant of `slot` for `key`, starting it at `count`.
    pub(crate) fn replace(&mut self, slot: usize, key: &K, count: Count) {
        self.ids[slot] = Some(key.clone());
        self.counts[slot] = count;
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&K, Count)> + '_ {
        self.ids
            .iter()
            .zip(self.counts.iter())
            .filter_map(|(id, c)| id.as_ref().map(|id| (id, *c)))
    }

    pub(crate) fn clear(&mut self) {
        self.ids.iter_mut().for_each(|id| *id = None);
        self.counts.iter_mut().for_each(|c| *c = 0);
    }
}
