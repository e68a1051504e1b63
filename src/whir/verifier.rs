use itertools::izip;
use p3_field::TwoAdicField;
use p3_maybe_rayon::prelude::*;
use tracing::{debug, instrument};

use super::{errors::WhirError, round::WhirRound, weights::Weights};
use crate::{
    domain::EvaluationDomain,
    fiat_shamir::{ChallengeSampler, sample_outside_domain},
    parameters::{WhirParameters, errors::ConfigError},
    poly::multilinear::MultilinearPoint,
    utils::solve_vandermonde,
};

/// Drives a chain of [`WhirRound`]s and checks the claim `Σ_x f(x)·w(x) = σ`.
///
/// The verifier tracks its own weight, domain, and running claim. The values it needs from
/// a folded layer at the shift queries are recomputed from the previous committed oracle
/// rather than taken from the prover.
#[derive(Debug, Clone)]
pub struct WhirVerifier<F> {
    weights: Weights<F>,
    domain: EvaluationDomain<F>,
    claimed_sum: F,
    /// `log2` of the folding factor.
    sumcheck_rounds: usize,
    shift_query_count: usize,
    /// Challenges bound in the current fold.
    challenges: Vec<F>,
}

impl<F: TwoAdicField> WhirVerifier<F> {
    pub fn new(
        weights: Weights<F>,
        generator: F,
        claimed_sum: F,
        params: &WhirParameters,
    ) -> Result<Self, WhirError> {
        params.validate()?;
        Ok(Self {
            weights,
            domain: EvaluationDomain::new(generator)?,
            claimed_sum,
            sumcheck_rounds: params.folding_rounds(),
            shift_query_count: params.shift_queries,
            challenges: Vec::new(),
        })
    }

    #[must_use]
    pub const fn claimed_sum(&self) -> F {
        self.claimed_sum
    }

    #[must_use]
    pub const fn weights(&self) -> &Weights<F> {
        &self.weights
    }

    #[must_use]
    pub const fn domain(&self) -> &EvaluationDomain<F> {
        &self.domain
    }

    #[must_use]
    pub const fn folding_factor(&self) -> usize {
        1 << self.sumcheck_rounds
    }

    /// Runs `log2(K) + 1` sumcheck rounds against `round`.
    ///
    /// Each round polynomial must sum to the running claim over `{0, 1}`; the claim then
    /// becomes its value at a fresh challenge. Returns the specialized round, or `None` when
    /// a round polynomial is inconsistent.
    #[instrument(skip_all, fields(rounds = self.sumcheck_rounds + 1), level = "debug")]
    pub fn do_sumcheck<S>(
        &mut self,
        round: &WhirRound<F>,
        sampler: &mut S,
    ) -> Result<Option<WhirRound<F>>, WhirError>
    where
        S: ChallengeSampler<F> + ?Sized,
    {
        self.challenges.clear();
        let mut claim = self.claimed_sum;

        let (mut state, mut poly) = round.sumcheck_prover_round(None)?;
        for i in 0..=self.sumcheck_rounds {
            if i > 0 {
                let challenge = sampler.sample();
                claim = poly.evaluate(challenge);
                self.challenges.push(challenge);
                (state, poly) = state.sumcheck_prover_round(Some(challenge))?;
            }
            if poly.sum_over_boolean_hypercube() != claim {
                debug!(round = i, "round polynomial does not match the claim");
                return Ok(None);
            }
            sampler.observe(poly.evaluations());
        }

        self.claimed_sum = claim;
        for &r in &self.challenges {
            self.weights = self.weights.fix_first_variable(r);
        }
        Ok(Some(state))
    }

    /// Draws the fold randomness, drives `specialized.fold_round`, and absorbs the new
    /// constraints into the verifier's weight and claim.
    ///
    /// `committed` is the round as committed, before its sumcheck; its codeword provides the
    /// shift responses through [`Self::fold_virtually`].
    #[instrument(skip_all, fields(shift_queries = self.shift_query_count), level = "debug")]
    pub fn fold_check<S>(
        &mut self,
        committed: &WhirRound<F>,
        specialized: &WhirRound<F>,
        sampler: &mut S,
    ) -> Result<WhirRound<F>, WhirError>
    where
        S: ChallengeSampler<F> + ?Sized,
    {
        if committed.domain() != &self.domain {
            return Err(ConfigError::DomainMismatch.into());
        }
        let folding_factor = 1 << self.challenges.len();
        let folded_domain = self.domain.fold(folding_factor)?;

        let gamma = sampler.sample();
        let ood_sample = sample_outside_domain(sampler, &folded_domain);
        let indices: Vec<usize> = (0..self.shift_query_count)
            .map(|_| sampler.sample_index(folded_domain.size()))
            .collect();
        let shift_queries: Vec<F> = indices.iter().map(|&i| folded_domain.element(i)).collect();

        let folded = specialized.fold_round(gamma, ood_sample, &shift_queries)?;
        if folded.next_round.domain() != &folded_domain {
            return Err(ConfigError::DomainMismatch.into());
        }
        sampler.observe(&[folded.ood_response]);

        let virtual_responses = self.fold_virtually(committed, &indices);
        let num_variables = self.weights.num_variables();
        let mut scale = gamma;

        self.weights.add_term(
            scale,
            MultilinearPoint::expand_from_univariate(ood_sample, num_variables),
        );
        self.claimed_sum += scale * folded.ood_response;
        for (&query, &response) in izip!(&shift_queries, &virtual_responses) {
            scale *= gamma;
            self.weights.add_term(
                scale,
                MultilinearPoint::expand_from_univariate(query, num_variables),
            );
            self.claimed_sum += scale * response;
        }

        self.domain = folded_domain;
        Ok(folded.next_round)
    }

    /// The fold of `committed`'s codeword at the current challenges, read at `ω^{K·i}` for
    /// each index `i`.
    ///
    /// The `K` entries `i + a·N/K` lie on the coset `ω^i·⟨α⟩`. Their interpolant has
    /// coefficients `c_m = part_m(ω^{K·i})`, and binding `X_0 … X_{k-1}` scales `c_m` by
    /// `Π_t r_t^{bit t of m}`.
    #[must_use]
    pub fn fold_virtually(&self, committed: &WhirRound<F>, indices: &[usize]) -> Vec<F> {
        let oracle = committed.fri_oracle();
        let points = committed.evaluation_points();
        let folding_factor = 1 << self.challenges.len();
        let step = oracle.len() / folding_factor;

        let scales = self.challenges.iter().fold(vec![F::ONE], |table, &r| {
            let high: Vec<F> = table.iter().map(|&s| s * r).collect();
            table.into_iter().chain(high).collect()
        });

        indices
            .par_iter()
            .map(|&index| {
                let (nodes, values): (Vec<F>, Vec<F>) = (0..folding_factor)
                    .map(|a| {
                        let j = index + a * step;
                        (points[j], oracle[j])
                    })
                    .unzip();
                solve_vandermonde(&nodes, &values)
                    .iter()
                    .zip(&scales)
                    .map(|(&c, &s)| c * s)
                    .sum()
            })
            .collect()
    }

    /// Alternates sumcheck and fold until the code dimension is at most `K`, then checks
    /// the final witness against the accumulated weight and claim.
    #[instrument(skip_all, fields(vars = first_round.num_variables(), k = self.folding_factor()))]
    pub fn validate_pcs_claim<S>(
        &mut self,
        first_round: &WhirRound<F>,
        sampler: &mut S,
    ) -> Result<bool, WhirError>
    where
        S: ChallengeSampler<F> + ?Sized,
    {
        let mut current = first_round.clone();
        let mut fold = 0;
        while current.dimension() > self.folding_factor() {
            let Some(specialized) = self.do_sumcheck(&current, sampler)? else {
                debug!(fold, "sumcheck rejected");
                return Ok(false);
            };
            current = self.fold_check(&current, &specialized, sampler)?;
            fold += 1;
        }

        if current.num_variables() != self.weights.num_variables() {
            debug!(
                witness = current.num_variables(),
                weight = self.weights.num_variables(),
                "final witness has the wrong arity"
            );
            return Ok(false);
        }
        let expected = self
            .weights
            .weighted_sum(&current.witness().to_evaluations());
        let accepted = expected == self.claimed_sum;
        if !accepted {
            debug!(folds = fold, "final weighted sum does not match the claim");
        }
        Ok(accepted)
    }
}
