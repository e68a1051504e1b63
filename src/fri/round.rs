use std::sync::OnceLock;

use p3_field::TwoAdicField;
use p3_maybe_rayon::prelude::*;
use tracing::{debug, instrument};

use crate::{
    domain::{EvaluationDomain, reed_solomon::ReedSolomonCode},
    fiat_shamir::ChallengeSampler,
    parameters::{FriParameters, errors::ConfigError},
    poly::dense::{DensePolynomial, horner_evaluate},
    utils::{is_overwhelming_majority, solve_vandermonde},
};

/// Rewrites selected codeword entries: `Some(v)` replaces the value at that index.
pub type OracleHook<'a, F> = &'a (dyn Fn(usize) -> Option<F> + Sync);

/// The rational DEEP correction carried from one layer to the next.
///
/// The folded polynomial `g` satisfies `g = denominator · next + numerator`, where
/// `numerator` interpolates `g` on the out-of-domain points and `denominator` vanishes on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeepResponse<F> {
    pub numerator: DensePolynomial<F>,
    pub denominator: DensePolynomial<F>,
}

impl<F: TwoAdicField> DeepResponse<F> {
    /// Reconstructs the folded value at `y` from the next layer's value there.
    #[must_use]
    pub fn reconstruct(&self, y: F, next_value: F) -> F {
        self.denominator.evaluate(y) * next_value + self.numerator.evaluate(y)
    }
}

/// One layer of FRI: a polynomial and its Reed–Solomon codeword over `⟨ω⟩`.
#[derive(Debug, Clone)]
pub struct FriRound<F> {
    poly: DensePolynomial<F>,
    code: ReedSolomonCode<F>,
    rate_factor: usize,
    folding_factor: usize,
    /// `ω^{N / folding_factor}`, of order exactly `folding_factor`.
    folding_root: F,
    codeword: OnceLock<Vec<F>>,
}

impl<F: TwoAdicField> FriRound<F> {
    /// Builds a layer over the subgroup generated by `generator`.
    ///
    /// Fails unless the generator has power-of-two order `N`, both factors are powers of
    /// two with `folding_factor ≤ rate_factor ≤ N`, and `deg(poly) < N / rate_factor`.
    pub fn new(
        poly: DensePolynomial<F>,
        generator: F,
        rate_factor: usize,
        folding_factor: usize,
    ) -> Result<Self, ConfigError> {
        let domain = EvaluationDomain::new(generator)?;
        let order = domain.size();
        FriParameters {
            rate_factor,
            folding_factor,
            ood_samples: 0,
        }
        .validate(order)?;

        let folding_root = generator.exp_u64((order / folding_factor) as u64);
        if folding_root.exp_u64(folding_factor as u64) != F::ONE
            || folding_root.exp_u64((folding_factor / 2) as u64) == F::ONE
        {
            return Err(ConfigError::FoldingRootOrder { folding_factor });
        }

        let code = ReedSolomonCode::new(domain, order / rate_factor)?;
        if let Some(degree) = poly.degree().filter(|&d| d >= code.dimension()) {
            return Err(ConfigError::DegreeExceedsDimension {
                degree,
                dimension: code.dimension(),
            });
        }

        Ok(Self {
            poly,
            code,
            rate_factor,
            folding_factor,
            folding_root,
            codeword: OnceLock::new(),
        })
    }

    #[must_use]
    pub const fn poly(&self) -> &DensePolynomial<F> {
        &self.poly
    }

    #[must_use]
    pub const fn code(&self) -> &ReedSolomonCode<F> {
        &self.code
    }

    #[must_use]
    pub const fn domain(&self) -> &EvaluationDomain<F> {
        self.code.domain()
    }

    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.code.dimension()
    }

    #[must_use]
    pub const fn rate_factor(&self) -> usize {
        self.rate_factor
    }

    #[must_use]
    pub const fn folding_factor(&self) -> usize {
        self.folding_factor
    }

    #[must_use]
    pub const fn folding_root(&self) -> F {
        self.folding_root
    }

    #[must_use]
    pub fn evaluation_points(&self) -> &[F] {
        self.code.evaluation_points()
    }

    /// The codeword this layer answers queries from, encoded on first use.
    pub fn oracle(&self) -> &[F] {
        self.codeword
            .get_or_init(|| self.code.encode_coeffs(self.poly.coeffs()))
    }

    /// A copy of the codeword, with entries rewritten by `corrupt` when given.
    #[must_use]
    pub fn gen_proof(&self, corrupt: Option<OracleHook<'_, F>>) -> Vec<F> {
        let mut codeword = self.oracle().to_vec();
        if let Some(hook) = corrupt {
            codeword
                .par_iter_mut()
                .enumerate()
                .for_each(|(i, value)| {
                    if let Some(replacement) = hook(i) {
                        *value = replacement;
                    }
                });
        }
        codeword
    }

    /// Replaces the served codeword by a corrupted copy.
    #[must_use]
    pub fn with_corrupted_oracle(self, corrupt: OracleHook<'_, F>) -> Self {
        let codeword = OnceLock::from(self.gen_proof(Some(corrupt)));
        Self { codeword, ..self }
    }

    /// The indices `index + j·N/k` of the coset of `index` under the folding subgroup.
    #[must_use]
    pub fn conjugate_indices(&self, index: usize) -> Vec<usize> {
        let order = self.code.length();
        let step = order / self.folding_factor;
        let indices: Vec<usize> = (0..self.folding_factor)
            .map(|j| (index + j * step) % order)
            .collect();
        debug_assert!(indices.iter().all(|&i| {
            self.evaluation_points()[i]
                == self.evaluation_points()[index]
                    * self
                        .folding_root
                        .exp_u64((((i + order - index) % order) / step) as u64)
        }));
        indices
    }

    /// Folds the polynomial with `challenge` into the next layer over `⟨ω^k⟩`.
    ///
    /// When `ood_points` are given, the interpolant of the folded polynomial on them is
    /// divided out and returned as the DEEP response.
    #[instrument(skip_all, fields(degree = ?self.poly.degree(), k = self.folding_factor), level = "debug")]
    pub fn fold(
        &self,
        challenge: F,
        ood_points: Option<&[F]>,
    ) -> Result<(Self, Option<DeepResponse<F>>), ConfigError> {
        let folded = self.poly.fold(challenge, self.folding_factor);
        let next_generator = self.domain().generator().exp_u64(self.folding_factor as u64);

        let Some(points) = ood_points.filter(|p| !p.is_empty()) else {
            let next = Self::new(folded, next_generator, self.rate_factor, self.folding_factor)?;
            return Ok((next, None));
        };

        let evaluations: Vec<(F, F)> = points.iter().map(|&z| (z, folded.evaluate(z))).collect();
        let numerator = DensePolynomial::lagrange_interpolate(&evaluations);
        let denominator = DensePolynomial::vanishing(points);
        let (quotient, remainder) = (&folded - &numerator).divide_with_remainder(&denominator);
        debug_assert!(remainder.is_zero(), "DEEP quotient must be exact");

        let next = Self::new(quotient, next_generator, self.rate_factor, self.folding_factor)?;
        Ok((
            next,
            Some(DeepResponse {
                numerator,
                denominator,
            }),
        ))
    }

    /// Checks that `this` is the fold of `prev` at `challenge` on `queries` random cosets.
    ///
    /// For each query the `k` conjugate values of `prev` determine, through a Vandermonde
    /// solve, the coefficients `c_j = split_j(x^k)`; their combination `Σ c_j·challenge^j`
    /// must match `this` at `x^k`, after undoing the DEEP division if one was applied.
    /// Accepts when strictly more than two thirds of the queries match.
    #[instrument(skip_all, fields(queries = queries, k = prev.folding_factor), level = "debug")]
    pub fn consistency_cross_check<S>(
        this: &Self,
        prev: &Self,
        challenge: F,
        queries: usize,
        deep: Option<&DeepResponse<F>>,
        sampler: &mut S,
    ) -> bool
    where
        S: ChallengeSampler<F> + ?Sized,
    {
        let prev_oracle = prev.oracle();
        let this_oracle = this.oracle();
        let prev_points = prev.evaluation_points();
        let this_points = this.evaluation_points();
        let this_order = this_oracle.len();

        let alphas: Vec<F> = std::iter::successors(Some(F::ONE), |&a| Some(a * prev.folding_root))
            .take(prev.folding_factor)
            .collect();

        let indices: Vec<usize> = (0..queries)
            .map(|_| sampler.sample_index(prev_oracle.len()))
            .collect();

        let accepted = indices
            .par_iter()
            .filter(|&&index| {
                let x = prev_points[index];
                let nodes: Vec<F> = alphas.iter().map(|&alpha| x * alpha).collect();
                let values: Vec<F> = prev
                    .conjugate_indices(index)
                    .into_iter()
                    .map(|i| prev_oracle[i])
                    .collect();
                let coeffs = solve_vandermonde(&nodes, &values);
                let expected = horner_evaluate(&coeffs, challenge);

                let next_index = index % this_order;
                debug_assert_eq!(
                    this_points[next_index],
                    x.exp_u64(prev.folding_factor as u64)
                );
                let actual = deep.map_or(this_oracle[next_index], |response| {
                    response.reconstruct(this_points[next_index], this_oracle[next_index])
                });
                actual == expected
            })
            .count();

        let passed = is_overwhelming_majority(accepted, queries);
        if !passed {
            debug!(accepted, queries, "fold consistency check rejected");
        }
        passed
    }
}

#[cfg(test)]
mod tests {
    use p3_baby_bear::BabyBear;
    use p3_field::PrimeCharacteristicRing;
    use rand::{SeedableRng, rngs::SmallRng};

    use super::*;
    use crate::fiat_shamir::{TrustedRandomness, sample_distinct_outside_domain};

    type F = BabyBear;

    fn first_round(log_order: usize, degree: usize, rate: usize, k: usize, seed: u64) -> FriRound<F> {
        let mut rng = SmallRng::seed_from_u64(seed);
        let poly = DensePolynomial::random(degree, &mut rng);
        FriRound::new(poly, F::two_adic_generator(log_order), rate, k).unwrap()
    }

    #[test]
    fn test_new_validates_configuration() {
        let generator = F::two_adic_generator(8);
        let poly = DensePolynomial::constant(F::ONE);

        assert!(FriRound::new(poly.clone(), generator, 4, 4).is_ok());
        assert!(matches!(
            FriRound::new(poly.clone(), generator, 3, 2),
            Err(ConfigError::NotPowerOfTwo { .. })
        ));
        assert!(matches!(
            FriRound::new(poly.clone(), generator, 2, 4),
            Err(ConfigError::FoldingExceedsRate { .. })
        ));
        assert!(matches!(
            FriRound::new(poly.clone(), generator, 512, 4),
            Err(ConfigError::InvalidRateFactor { .. })
        ));
        assert!(matches!(
            FriRound::new(poly, F::from_u64(3), 4, 4),
            Err(ConfigError::NonPowerOfTwoOrder)
        ));

        // Dimension is 256 / 4 = 64.
        let mut rng = SmallRng::seed_from_u64(0);
        let too_big = DensePolynomial::random(64, &mut rng);
        assert_eq!(
            FriRound::new(too_big, generator, 4, 4).unwrap_err(),
            ConfigError::DegreeExceedsDimension {
                degree: 64,
                dimension: 64
            }
        );
    }

    #[test]
    fn test_oracle_is_the_encoding() {
        let round = first_round(7, 31, 4, 2, 1);
        let oracle = round.oracle();
        assert_eq!(oracle.len(), 128);
        for (i, &value) in oracle.iter().enumerate() {
            assert_eq!(value, round.poly().evaluate(round.evaluation_points()[i]));
        }
        // The cached codeword is reused.
        assert_eq!(round.oracle().as_ptr(), oracle.as_ptr());
    }

    #[test]
    fn test_gen_proof_applies_corruption() {
        let round = first_round(6, 7, 4, 2, 2);
        let hook: OracleHook<'_, F> = &|i| (i % 2 == 0).then_some(F::ZERO);
        let corrupted = round.gen_proof(Some(hook));
        for (i, (&c, &o)) in corrupted.iter().zip(round.oracle()).enumerate() {
            if i % 2 == 0 {
                assert_eq!(c, F::ZERO);
            } else {
                assert_eq!(c, o);
            }
        }
    }

    #[test]
    fn test_conjugate_indices() {
        let round = first_round(6, 7, 4, 4, 3);
        assert_eq!(round.conjugate_indices(5), vec![5, 21, 37, 53]);
        assert_eq!(round.conjugate_indices(50), vec![50, 2, 18, 34]);
    }

    #[test]
    fn test_fold_degree_and_domain() {
        let round = first_round(10, 255, 4, 4, 4);
        let (next, deep) = round.fold(F::from_u64(9), None).unwrap();
        assert!(deep.is_none());
        assert_eq!(next.poly().degree(), Some(63));
        assert_eq!(next.domain().size(), 256);
        assert_eq!(
            next.domain().generator(),
            round.domain().generator().exp_u64(4)
        );
    }

    #[test]
    fn test_fold_round_consistency_with_deep() {
        let mut sampler = TrustedRandomness(SmallRng::seed_from_u64(5));
        let round = first_round(11, 511, 4, 2, 5);
        let challenge = sampler.sample();
        let ood = sample_distinct_outside_domain(&mut sampler, round.domain(), 5);

        let (next, deep) = round.fold(challenge, Some(ood.as_slice())).unwrap();
        let deep = deep.unwrap();
        assert_eq!(next.poly().degree(), Some(255 - 5));

        // The folded polynomial is recovered from the quotient.
        let folded = round.poly().fold(challenge, 2);
        let z: F = sampler.sample();
        assert_eq!(deep.reconstruct(z, next.poly().evaluate(z)), folded.evaluate(z));

        assert!(FriRound::consistency_cross_check(
            &next,
            &round,
            challenge,
            5,
            Some(&deep),
            &mut sampler
        ));
    }

    #[test]
    fn test_fold_round_consistency_without_deep() {
        let mut sampler = TrustedRandomness(SmallRng::seed_from_u64(6));
        let round = first_round(10, 100, 8, 8, 6);
        let challenge = sampler.sample();
        let (next, _) = round.fold(challenge, None).unwrap();

        assert!(FriRound::consistency_cross_check(
            &next,
            &round,
            challenge,
            10,
            None,
            &mut sampler
        ));
    }

    #[test]
    fn test_consistency_detects_wrong_challenge_and_corruption() {
        let mut sampler = TrustedRandomness(SmallRng::seed_from_u64(7));
        let round = first_round(10, 255, 4, 4, 7);
        let challenge: F = sampler.sample();
        let (next, _) = round.fold(challenge, None).unwrap();

        assert!(!FriRound::consistency_cross_check(
            &next,
            &round,
            challenge + F::ONE,
            10,
            None,
            &mut sampler
        ));

        let corrupted = next.with_corrupted_oracle(&|_| Some(F::from_u64(17)));
        assert!(!FriRound::consistency_cross_check(
            &corrupted,
            &round,
            challenge,
            10,
            None,
            &mut sampler
        ));
    }
}
