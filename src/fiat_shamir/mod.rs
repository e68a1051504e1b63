//! Sources of verifier randomness.
//!
//! Every protocol in this crate draws its challenges through [`ChallengeSampler`]. The
//! interactive model uses [`TrustedRandomness`]; a non-interactive deployment wraps a
//! Plonky3 challenger in [`ChallengerTranscript`] so that each draw depends on every prover
//! message observed so far.

use p3_challenger::FieldChallenger;
use p3_field::{Field, TwoAdicField};
use p3_util::log2_ceil_usize;
use rand::{
    Rng,
    distr::{Distribution, StandardUniform},
};

use crate::domain::EvaluationDomain;

#[cfg(test)]
mod tests;

/// A stream of verifier challenges.
pub trait ChallengeSampler<F> {
    /// Draws a uniformly random field element.
    fn sample(&mut self) -> F;

    /// Draws a uniformly random index in `[0, bound)`.
    ///
    /// # Panics
    ///
    /// Implementations panic when `bound == 0`.
    fn sample_index(&mut self, bound: usize) -> usize;

    /// Absorbs prover messages. Sources that do not bind to the transcript ignore them.
    fn observe(&mut self, values: &[F]);
}

/// Challenges drawn from a trusted random number generator.
#[derive(Debug, Clone)]
pub struct TrustedRandomness<R>(pub R);

impl<F, R> ChallengeSampler<F> for TrustedRandomness<R>
where
    R: Rng,
    StandardUniform: Distribution<F>,
{
    fn sample(&mut self) -> F {
        self.0.random()
    }

    fn sample_index(&mut self, bound: usize) -> usize {
        assert!(bound > 0, "cannot sample from an empty range");
        self.0.random_range(0..bound)
    }

    fn observe(&mut self, _values: &[F]) {}
}

/// A duplex-sponge transcript: observes prover messages and squeezes challenges from them.
#[derive(Debug, Clone)]
pub struct ChallengerTranscript<C>(pub C);

impl<F, C> ChallengeSampler<F> for ChallengerTranscript<C>
where
    F: Field,
    C: FieldChallenger<F>,
{
    fn sample(&mut self) -> F {
        self.0.sample()
    }

    fn sample_index(&mut self, bound: usize) -> usize {
        assert!(bound > 0, "cannot sample from an empty range");
        let bits = log2_ceil_usize(bound);
        // Rejection sampling keeps the index uniform when the bound is not a power of two.
        loop {
            let index = self.0.sample_bits(bits);
            if index < bound {
                return index;
            }
        }
    }

    fn observe(&mut self, values: &[F]) {
        self.0.observe_slice(values);
    }
}

/// Draws a point outside `domain`, resampling while `z^N = 1`.
pub fn sample_outside_domain<F, S>(sampler: &mut S, domain: &EvaluationDomain<F>) -> F
where
    F: TwoAdicField,
    S: ChallengeSampler<F> + ?Sized,
{
    loop {
        let z = sampler.sample();
        if !domain.contains(z) {
            return z;
        }
    }
}

/// Draws `count` distinct points outside `domain`.
pub fn sample_distinct_outside_domain<F, S>(
    sampler: &mut S,
    domain: &EvaluationDomain<F>,
    count: usize,
) -> Vec<F>
where
    F: TwoAdicField,
    S: ChallengeSampler<F> + ?Sized,
{
    let mut points = Vec::with_capacity(count);
    while points.len() < count {
        let z = sample_outside_domain(sampler, domain);
        if !points.contains(&z) {
            points.push(z);
        }
    }
    points
}
