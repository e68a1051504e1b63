use std::sync::OnceLock;

use p3_field::TwoAdicField;
use p3_maybe_rayon::prelude::*;
use tracing::instrument;

use super::{errors::WhirError, weights::Weights};
use crate::{
    domain::{EvaluationDomain, reed_solomon::ReedSolomonCode},
    parameters::errors::ConfigError,
    poly::{
        coeffs::CoefficientList, dense::DensePolynomial, evals::EvaluationsList,
        multilinear::MultilinearPoint,
    },
    sumcheck::SumcheckPolynomial,
};

/// Where a [`WhirRound`] stands in its sumcheck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    /// No round polynomial sent yet.
    Created,
    /// At least one round polynomial sent; the next round binds a challenge.
    Sumcheck,
    /// Every variable is bound.
    FullySpecialized,
}

/// The result of folding a round after its sumcheck.
#[derive(Debug, Clone)]
pub struct FoldedRound<F> {
    pub next_round: WhirRound<F>,
    /// The folded witness at the out-of-domain sample.
    pub ood_response: F,
    /// The folded witness at each shift query.
    pub shift_responses: Vec<F>,
    /// `Σ_i response_i · γ^{i+1}`, added to the claim carried into the next round.
    pub claim_correction: F,
}

/// One WHIR layer: a multilinear witness, the weight constraining it, and the
/// Reed–Solomon code over which its univariate form is committed.
///
/// Every sumcheck step is a pure transition returning the next state, so a round can be
/// replayed from any intermediate point.
#[derive(Debug, Clone)]
pub struct WhirRound<F> {
    witness: CoefficientList<F>,
    witness_evals: EvaluationsList<F>,
    weights: Weights<F>,
    weight_evals: EvaluationsList<F>,
    code: ReedSolomonCode<F>,
    claimed_sum: F,
    sumcheck_challenges: Vec<F>,
    state: RoundState,
    codeword: OnceLock<Vec<F>>,
}

impl<F: TwoAdicField> WhirRound<F> {
    /// Builds a round over the subgroup generated by `generator`.
    ///
    /// The code has dimension `2^ℓ` and needs a domain of order at least `2^{ℓ+1}`. Without
    /// an explicit claim, the honest sum `Σ_x f(x)·w(x)` is used.
    pub fn new(
        witness: CoefficientList<F>,
        weights: Weights<F>,
        generator: F,
        claimed_sum: Option<F>,
    ) -> Result<Self, WhirError> {
        if weights.num_variables() != witness.num_variables() {
            return Err(ConfigError::WeightArity {
                weight: weights.num_variables(),
                witness: witness.num_variables(),
            }
            .into());
        }

        let domain = EvaluationDomain::new(generator)?;
        let dimension = witness.num_coeffs();
        if 2 * dimension > domain.size() {
            return Err(ConfigError::DomainTooSmall {
                dimension,
                order: domain.size(),
            }
            .into());
        }
        let code = ReedSolomonCode::new(domain, dimension)?;

        let witness_evals = witness.to_evaluations();
        let weight_evals = weights.to_evaluations();
        let claimed_sum = claimed_sum.unwrap_or_else(|| weight_evals.dot_product(&witness_evals));
        debug_assert_eq!(
            claimed_sum,
            weight_evals.dot_product(&witness_evals),
            "claimed sum does not match the witness"
        );

        Ok(Self {
            witness,
            witness_evals,
            weights,
            weight_evals,
            code,
            claimed_sum,
            sumcheck_challenges: Vec::new(),
            state: RoundState::Created,
            codeword: OnceLock::new(),
        })
    }

    #[must_use]
    pub const fn state(&self) -> RoundState {
        self.state
    }

    /// Variables of the witness still free.
    #[must_use]
    pub const fn num_variables(&self) -> usize {
        self.witness.num_variables()
    }

    #[must_use]
    pub const fn witness(&self) -> &CoefficientList<F> {
        &self.witness
    }

    #[must_use]
    pub const fn weights(&self) -> &Weights<F> {
        &self.weights
    }

    /// The running claim: `Σ_x f(x)·w(x)` over the free variables.
    #[must_use]
    pub const fn claimed_sum(&self) -> F {
        self.claimed_sum
    }

    #[must_use]
    pub fn sumcheck_challenges(&self) -> &[F] {
        &self.sumcheck_challenges
    }

    #[must_use]
    pub const fn code(&self) -> &ReedSolomonCode<F> {
        &self.code
    }

    #[must_use]
    pub const fn domain(&self) -> &EvaluationDomain<F> {
        self.code.domain()
    }

    /// The code dimension fixed when the round was created.
    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.code.dimension()
    }

    #[must_use]
    pub fn evaluation_points(&self) -> &[F] {
        self.code.evaluation_points()
    }

    /// The univariate form of the current witness.
    #[must_use]
    pub fn folded_poly(&self) -> DensePolynomial<F> {
        self.witness.to_univariate()
    }

    /// The codeword of [`Self::folded_poly`] over the round's domain, encoded once.
    pub fn fri_oracle(&self) -> &[F] {
        self.codeword
            .get_or_init(|| self.code.encode_coeffs(&self.witness))
    }

    /// Runs one prover step of the sumcheck.
    ///
    /// The first call takes no challenge and returns the round polynomial of `X_0`. Each
    /// later call binds the next free variable to `challenge` in both witness and weight
    /// and returns the round polynomial of the variable after it. Once every variable is
    /// bound the constant `f·w` is returned, whatever the challenge.
    #[instrument(skip_all, fields(round = self.sumcheck_challenges.len(), vars = self.num_variables()), level = "debug")]
    pub fn sumcheck_prover_round(
        &self,
        challenge: Option<F>,
    ) -> Result<(Self, SumcheckPolynomial<F>), WhirError> {
        match (self.state, challenge) {
            (RoundState::FullySpecialized, _) => {
                Ok((self.clone(), SumcheckPolynomial::constant(self.claimed_sum)))
            }
            (RoundState::Created, Some(_)) => Err(WhirError::UnexpectedChallenge),
            (RoundState::Sumcheck, None) => Err(WhirError::MissingChallenge {
                round: self.sumcheck_challenges.len() + 1,
            }),
            (RoundState::Created, None) => Ok(self.clone().advance()),
            (RoundState::Sumcheck, Some(r)) => {
                let mut sumcheck_challenges = self.sumcheck_challenges.clone();
                sumcheck_challenges.push(r);
                let bound = Self {
                    witness: self.witness.fix_first_variable(r),
                    witness_evals: self.witness_evals.fix_first_variable(r),
                    weights: self.weights.fix_first_variable(r),
                    weight_evals: self.weight_evals.fix_first_variable(r),
                    code: self.code.clone(),
                    claimed_sum: self.claimed_sum,
                    sumcheck_challenges,
                    state: self.state,
                    codeword: OnceLock::new(),
                };
                Ok(bound.advance())
            }
        }
    }

    /// Computes the round polynomial of the first free variable and records its sum as the
    /// new claim.
    fn advance(mut self) -> (Self, SumcheckPolynomial<F>) {
        let poly = if self.num_variables() == 0 {
            self.state = RoundState::FullySpecialized;
            let value = self.witness_evals[0] * self.weight_evals[0];
            self.claimed_sum = value;
            SumcheckPolynomial::constant(value)
        } else {
            self.state = RoundState::Sumcheck;
            let poly = SumcheckPolynomial::from_product(&self.witness_evals, &self.weight_evals);
            self.claimed_sum = poly.sum_over_boolean_hypercube();
            poly
        };
        (self, poly)
    }

    /// Folds the round into the next one.
    ///
    /// Binding `m` variables during the sumcheck is `m` factor-2 FRI folds of the univariate
    /// witness, so the next domain is generated by `ω^{2^m}`. The next weight gains
    /// `γ·eq(X, ood)` and `γ^{i+2}·eq(X, q_i)` with each point lifted by
    /// [`MultilinearPoint::expand_from_univariate`], and the claim grows by the matching
    /// combination of the witness values.
    #[instrument(skip_all, fields(bound = self.sumcheck_challenges.len(), queries = shift_queries.len()), level = "debug")]
    pub fn fold_round(
        &self,
        gamma: F,
        ood_sample: F,
        shift_queries: &[F],
    ) -> Result<FoldedRound<F>, WhirError> {
        if self.sumcheck_challenges.is_empty() {
            return Err(WhirError::NothingToFold);
        }

        let num_variables = self.num_variables();
        let next_generator = self
            .domain()
            .generator()
            .exp_power_of_2(self.sumcheck_challenges.len());

        let ood_response = self.witness.evaluate_univariate(ood_sample);
        let shift_responses: Vec<F> = shift_queries
            .par_iter()
            .map(|&q| self.witness.evaluate_univariate(q))
            .collect();

        let mut weights = self.weights.clone();
        let mut scale = gamma;
        let mut claim_correction = F::ZERO;
        for (&point, &response) in std::iter::once(&ood_sample)
            .chain(shift_queries)
            .zip(std::iter::once(&ood_response).chain(&shift_responses))
        {
            weights.add_term(
                scale,
                MultilinearPoint::expand_from_univariate(point, num_variables),
            );
            claim_correction += scale * response;
            scale *= gamma;
        }

        let next_round = Self::new(
            self.witness.clone(),
            weights,
            next_generator,
            Some(self.claimed_sum + claim_correction),
        )?;

        Ok(FoldedRound {
            next_round,
            ood_response,
            shift_responses,
            claim_correction,
        })
    }
}

#[cfg(test)]
mod tests {
    use p3_baby_bear::BabyBear;
    use p3_field::PrimeCharacteristicRing;
    use rand::{Rng, SeedableRng, rngs::SmallRng};

    use super::*;

    type F = BabyBear;

    fn honest_round(num_variables: usize, log_order: usize, seed: u64) -> (WhirRound<F>, MultilinearPoint<F>) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let witness = CoefficientList::random(num_variables, &mut rng);
        let point = MultilinearPoint::rand(&mut rng, num_variables);
        let claim = witness.evaluate(&point);
        let round = WhirRound::new(
            witness,
            Weights::evaluation(point.clone()),
            F::two_adic_generator(log_order),
            Some(claim),
        )
        .unwrap();
        (round, point)
    }

    #[test]
    fn test_new_validates_sizes() {
        let mut rng = SmallRng::seed_from_u64(1);
        let witness = CoefficientList::<F>::random(4, &mut rng);

        let mismatched = Weights::evaluation(MultilinearPoint::rand(&mut rng, 3));
        assert_eq!(
            WhirRound::new(witness.clone(), mismatched, F::two_adic_generator(6), None).unwrap_err(),
            WhirError::Config(ConfigError::WeightArity {
                weight: 3,
                witness: 4
            })
        );

        let weights = Weights::evaluation(MultilinearPoint::rand(&mut rng, 4));
        assert_eq!(
            WhirRound::new(witness.clone(), weights.clone(), F::two_adic_generator(4), None)
                .unwrap_err(),
            WhirError::Config(ConfigError::DomainTooSmall {
                dimension: 16,
                order: 16
            })
        );
        assert!(WhirRound::new(witness, weights, F::two_adic_generator(5), None).is_ok());
    }

    #[test]
    fn test_default_claim_is_the_evaluation() {
        let (round, point) = honest_round(5, 8, 2);
        let unclaimed = WhirRound::new(
            round.witness().clone(),
            round.weights().clone(),
            F::two_adic_generator(8),
            None,
        )
        .unwrap();
        assert_eq!(unclaimed.claimed_sum(), round.witness().evaluate(&point));
        assert_eq!(unclaimed.state(), RoundState::Created);
    }

    #[test]
    fn test_sumcheck_state_machine() {
        let (round, _) = honest_round(3, 6, 3);
        let claim = round.claimed_sum();

        assert_eq!(
            round.sumcheck_prover_round(Some(F::ONE)).unwrap_err(),
            WhirError::UnexpectedChallenge
        );

        let (round, h0) = round.sumcheck_prover_round(None).unwrap();
        assert_eq!(round.state(), RoundState::Sumcheck);
        assert_eq!(h0.sum_over_boolean_hypercube(), claim);
        assert_eq!(
            round.sumcheck_prover_round(None).unwrap_err(),
            WhirError::MissingChallenge { round: 1 }
        );

        let mut rng = SmallRng::seed_from_u64(30);
        let mut state = round;
        let mut previous = h0;
        for _ in 0..3 {
            let r: F = rng.random();
            let (next, h) = state.sumcheck_prover_round(Some(r)).unwrap();
            assert_eq!(next.claimed_sum(), previous.evaluate(r));
            state = next;
            previous = h;
        }
        assert_eq!(state.state(), RoundState::FullySpecialized);
        assert_eq!(state.num_variables(), 0);
        assert_eq!(state.sumcheck_challenges().len(), 3);

        // Further calls return the same constant.
        let (again, h) = state.sumcheck_prover_round(Some(F::TWO)).unwrap();
        assert_eq!(h, previous);
        assert_eq!(again.sumcheck_challenges().len(), 3);
    }

    #[test]
    fn test_fold_round_updates_claim_and_domain() {
        let (round, _) = honest_round(6, 8, 4);
        let mut rng = SmallRng::seed_from_u64(40);

        assert!(matches!(
            round.fold_round(F::ONE, F::TWO, &[]),
            Err(WhirError::NothingToFold)
        ));

        let (round, _) = round.sumcheck_prover_round(None).unwrap();
        let (round, _) = round.sumcheck_prover_round(Some(rng.random())).unwrap();
        let (round, _) = round.sumcheck_prover_round(Some(rng.random())).unwrap();
        assert_eq!(round.num_variables(), 4);

        let gamma: F = rng.random();
        let ood: F = rng.random();
        let queries: Vec<F> = (0..3).map(|_| rng.random()).collect();
        let folded = round.fold_round(gamma, ood, &queries).unwrap();

        assert_eq!(folded.ood_response, round.folded_poly().evaluate(ood));
        for (&q, &resp) in queries.iter().zip(&folded.shift_responses) {
            assert_eq!(resp, round.folded_poly().evaluate(q));
        }
        let expected_correction = gamma * folded.ood_response
            + folded
                .shift_responses
                .iter()
                .zip(1..)
                .map(|(&resp, i)| gamma.exp_u64(i + 1) * resp)
                .sum::<F>();
        assert_eq!(folded.claim_correction, expected_correction);

        let next = &folded.next_round;
        assert_eq!(next.state(), RoundState::Created);
        assert_eq!(next.claimed_sum(), round.claimed_sum() + expected_correction);
        assert_eq!(next.domain().size(), 1 << 6);
        assert_eq!(
            next.domain().generator(),
            F::two_adic_generator(8).exp_u64(4)
        );
        assert_eq!(next.dimension(), 16);
    }

    #[test]
    fn test_fri_oracle_encodes_folded_poly() {
        let (round, _) = honest_round(4, 6, 5);
        let oracle = round.fri_oracle();
        let poly = round.folded_poly();
        for (&x, &y) in round.evaluation_points().iter().zip(oracle) {
            assert_eq!(poly.evaluate(x), y);
        }
    }
}
