use crate::error::SketchError;
use crate::Count;
use rand::{Rng, RngCore};

// heavy-hitter threshold 3216 times ratio 0.05, truncated
const DEFAULT_DECAY_CONST: Count = 160;
const DEFAULT_DECAY_THRESHOLD: Count = 10;

/// `ProbePolicy` is the eviction heuristic of a [`ProbeSketch`].
///
/// Every slot carries an auxiliary value `Aux` next to its counter. The sketch
/// calls the hooks while it probes the `d` candidate slots of a key, then asks
/// [`decays`] whether the weakest candidate loses one count. A slot whose
/// counter reaches zero is handed to the incoming key.
///
/// [`ProbeSketch`]: struct.ProbeSketch.html
/// [`decays`]: trait.ProbePolicy.html#tymethod.decays
pub trait ProbePolicy {
    /// Per-slot state used by the heuristic.
    type Aux: Copy + Default;

    /// The default name of a sketch using this policy.
    const NAME: &'static str;

    /// Called when the key claims an empty slot.
    fn on_claim(&self, _aux: &mut Self::Aux) {}

    /// Called when the key is found in a slot.
    fn on_hit(&self, _aux: &mut Self::Aux) {}

    /// Called for every probed slot held by another key.
    fn on_pass(&self, _aux: &mut Self::Aux) {}

    /// Returns `true` when the weakest candidate should be decremented.
    fn decays<R: RngCore>(&self, count: Count, aux: Self::Aux, rng: &mut R) -> bool;

    /// Called after a slot was handed to a new key.
    fn on_replace(&self, _aux: &mut Self::Aux) {}
}

/// Plain decay: decrement with probability `1 / (count * max(count / decay_const, 1))`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PlainDecay {
    decay_const: Count,
}

impl PlainDecay {
    /// Creates a plain decay with the given constant, which must be at least 1.
    pub fn new(decay_const: Count) -> Result<Self, SketchError> {
        if decay_const == 0 {
            return Err(SketchError::InvalidDecayConst(decay_const));
        }
        Ok(Self { decay_const })
    }

    /// Returns the decay constant.
    pub fn decay_const(&self) -> Count {
        self.decay_const
    }
}

impl Default for PlainDecay {
    fn default() -> Self {
        Self {
            decay_const: DEFAULT_DECAY_CONST,
        }
    }
}

impl ProbePolicy for PlainDecay {
    type Aux = ();

    const NAME: &'static str = "DecaySketch";

    fn decays<R: RngCore>(&self, count: Count, _aux: (), rng: &mut R) -> bool {
        let scale = core::cmp::max(count / self.decay_const, 1) as u64;
        rng.gen_range(0..(count as u64 * scale).max(1)) == 0
    }
}

/// Stability weighting, as in StableSketch.
///
/// Every hit raises the slot's stability; the weakest candidate is decremented
/// with probability `1 / (count * stability + 1)`. A replaced slot keeps the
/// stability of its previous occupant minus one.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Stability;

impl ProbePolicy for Stability {
    type Aux = Count;

    const NAME: &'static str = "StableSketch";

    fn on_claim(&self, stability: &mut Count) {
        *stability = 1;
    }

    fn on_hit(&self, stability: &mut Count) {
        *stability = stability.saturating_add(1);
    }

    fn decays<R: RngCore>(&self, count: Count, stability: Count, rng: &mut R) -> bool {
        rng.gen_range(0..=count as u64 * stability as u64) == 0
    }

    fn on_replace(&self, stability: &mut Count) {
        *stability = stability.saturating_sub(1);
    }
}

/// Arrival-strength weighting, as in TightSketch.
///
/// A slot's arrival strength grows on hits and fades by one every time a
/// different key probes it. Below `decay_threshold` the weakest candidate is
/// decremented with probability `1 / (count + 1)`; from the threshold on,
/// with probability `1 / (count * arrival_strength + 1)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ArrivalStrength {
    decay_threshold: Count,
}

impl ArrivalStrength {
    /// Creates an arrival-strength policy switching behavior at `decay_threshold`.
    pub fn new(decay_threshold: Count) -> Self {
        Self { decay_threshold }
    }

    /// Returns the decay threshold.
    pub fn decay_threshold(&self) -> Count {
        self.decay_threshold
    }
}

impl Default for ArrivalStrength {
    fn default() -> Self {
        Self::new(DEFAULT_DECAY_THRESHOLD)
    }
}

impl ProbePolicy for ArrivalStrength {
    type Aux = Count;

    const NAME: &'static str = "TightSketch";

    fn on_claim(&self, strength: &mut Count) {
        *strength = 1;
    }

    fn on_hit(&self, strength: &mut Count) {
        *strength = strength.saturating_add(1);
    }

    fn on_pass(&self, strength: &mut Count) {
        *strength = strength.saturating_sub(1);
    }

    fn decays<R: RngCore>(&self, count: Count, strength: Count, rng: &mut R) -> bool {
        let weight = if count < self.decay_threshold {
            1
        } else {
            strength as u64
        };
        rng.gen_range(0..=count as u64 * weight) == 0
    }
}
