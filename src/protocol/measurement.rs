// src/protocol/measurement.rs

//! Bell-measurement outcome sampling.

use crate::core::MeasurementOutcome;
use rand::rngs::StdRng;
use rand::{Rng, RngExt, SeedableRng};

/// Draws one of the four outcomes uniformly from `rng`.
pub fn sample_outcome<R: Rng>(rng: &mut R) -> MeasurementOutcome {
    MeasurementOutcome::from_index(rng.random_range(0..4u8))
}

/// Anything that can produce the result of a Bell measurement.
///
/// The sender depends on this seam rather than on a concrete RNG, so tests can
/// force a particular outcome.
pub trait OutcomeSource {
    fn sample_outcome(&mut self) -> MeasurementOutcome;
}

/// Uniform sampler over the four outcomes, backed by an explicit RNG.
pub struct OutcomeSampler<R = StdRng> {
    rng: R,
}

impl OutcomeSampler<StdRng> {
    /// Deterministic sampler for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl<R: Rng> OutcomeSampler<R> {
    pub fn from_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> OutcomeSource for OutcomeSampler<R> {
    fn sample_outcome(&mut self) -> MeasurementOutcome {
        sample_outcome(&mut self.rng)
    }
}

/// Always yields the same outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedOutcome(pub MeasurementOutcome);

impl OutcomeSource for FixedOutcome {
    fn sample_outcome(&mut self) -> MeasurementOutcome {
        self.0
    }
}
