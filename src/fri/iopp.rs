use p3_field::TwoAdicField;
use tracing::{debug, instrument};

use super::{
    errors::FriError,
    round::{DeepResponse, FriRound, OracleHook},
};
use crate::{
    fiat_shamir::{ChallengeSampler, sample_distinct_outside_domain},
    parameters::{FriParameters, errors::ConfigError},
    poly::dense::DensePolynomial,
};

/// A layer of the fold chain together with the randomness that produced it.
#[derive(Debug, Clone)]
pub struct FriRoundRecord<F> {
    pub round: FriRound<F>,
    /// The fold challenge that produced this layer; `None` for the first layer.
    pub fold_challenge: Option<F>,
    /// The DEEP correction applied when producing this layer.
    pub deep: Option<DeepResponse<F>>,
}

/// A FRI interactive oracle proof of proximity.
///
/// Layer `i` of the chain lives at index `i`; layer `i + 1` is the fold of layer `i`.
#[derive(Debug, Clone)]
pub struct FriIopp<F> {
    rounds: Vec<FriRoundRecord<F>>,
}

impl<F: TwoAdicField> FriIopp<F> {
    /// Folds `poly` until its degree is at most the folding factor.
    ///
    /// Each fold draws a fresh challenge and, when `params.ood_samples > 0`, that many
    /// distinct out-of-domain points. DEEP numerators are absorbed into the sampler before
    /// the next draw.
    #[instrument(skip_all, fields(degree = ?poly.degree(), k = params.folding_factor, ood = params.ood_samples))]
    pub fn new<S>(
        poly: DensePolynomial<F>,
        generator: F,
        params: &FriParameters,
        sampler: &mut S,
    ) -> Result<Self, ConfigError>
    where
        S: ChallengeSampler<F> + ?Sized,
    {
        let first = FriRound::new(poly, generator, params.rate_factor, params.folding_factor)?;
        let mut rounds = vec![FriRoundRecord {
            round: first,
            fold_challenge: None,
            deep: None,
        }];

        loop {
            let current = &rounds[rounds.len() - 1].round;
            if current
                .poly()
                .degree()
                .is_none_or(|d| d <= params.folding_factor)
            {
                break;
            }

            let challenge = sampler.sample();
            let ood = (params.ood_samples > 0).then(|| {
                sample_distinct_outside_domain(sampler, current.domain(), params.ood_samples)
            });
            let (round, deep) = current.fold(challenge, ood.as_deref())?;
            if let Some(response) = &deep {
                sampler.observe(response.numerator.coeffs());
            }
            debug!(
                layer = rounds.len(),
                degree = ?round.poly().degree(),
                order = round.domain().size(),
                "folded"
            );
            rounds.push(FriRoundRecord {
                round,
                fold_challenge: Some(challenge),
                deep,
            });
        }

        Ok(Self { rounds })
    }

    /// The layers, first to last.
    #[must_use]
    pub fn rounds(&self) -> &[FriRoundRecord<F>] {
        &self.rounds
    }

    /// Number of layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    /// The first layer, whose codeword is the committed oracle.
    #[must_use]
    pub fn proof_oracle(&self) -> &FriRound<F> {
        &self.rounds[0].round
    }

    /// Replaces the codeword served by layer `index` with a corrupted copy.
    pub fn corrupt_layer(&mut self, index: usize, corrupt: OracleHook<'_, F>) -> Result<(), FriError> {
        let len = self.rounds.len();
        let record = self
            .rounds
            .get_mut(index)
            .ok_or(FriError::LayerOutOfRange { index, len })?;
        record.round = record.round.clone().with_corrupted_oracle(corrupt);
        Ok(())
    }

    /// Tests that the committed oracle is close to a polynomial of degree `< max_degree`.
    ///
    /// Runs the fold consistency check between consecutive layers, shrinking the tracked
    /// degree bound to `⌊bound / k⌋ + 1` (minus the DEEP denominator degree) per layer and
    /// stopping once it is at most `k`. The layer reached is then interpolated in full and
    /// must have degree at most `k`.
    #[instrument(skip_all, fields(max_degree = max_degree, query_count = query_count), level = "debug")]
    pub fn verify_proximity<S>(&self, max_degree: usize, query_count: usize, sampler: &mut S) -> bool
    where
        S: ChallengeSampler<F> + ?Sized,
    {
        let first = self.proof_oracle();
        if first.dimension() < max_degree {
            debug!(
                dimension = first.dimension(),
                max_degree, "degree bound exceeds the code dimension"
            );
            return false;
        }

        let mut bound = max_degree;
        let mut last = 0;
        for (i, pair) in self.rounds.windows(2).enumerate() {
            let (prev, this) = (&pair[0], &pair[1]);
            let Some(challenge) = this.fold_challenge else {
                return false;
            };
            if !FriRound::consistency_cross_check(
                &this.round,
                &prev.round,
                challenge,
                query_count,
                this.deep.as_ref(),
                sampler,
            ) {
                debug!(layer = i + 1, "fold consistency failed");
                return false;
            }

            last = i + 1;
            bound = bound / this.round.folding_factor() + 1;
            if let Some(deep) = &this.deep {
                bound = bound.saturating_sub(deep.denominator.degree().unwrap_or(0));
            }
            if bound <= this.round.folding_factor() {
                break;
            }
        }

        let final_round = &self.rounds[last].round;
        let final_poly = final_round.code().interpolate(final_round.oracle());
        let accepted = final_poly
            .degree()
            .is_none_or(|d| d <= final_round.folding_factor());
        if !accepted {
            debug!(
                layer = last,
                degree = ?final_poly.degree(),
                "final layer is not low degree"
            );
        }
        accepted
    }
}
