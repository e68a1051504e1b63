use std::ops::Deref;

use p3_field::Field;
use p3_maybe_rayon::prelude::*;
use p3_util::log2_strict_usize;
use rand::{
    Rng,
    distr::{Distribution, StandardUniform},
};

use super::{
    dense::DensePolynomial, evals::EvaluationsList, multilinear::MultilinearPoint,
    wavelet::wavelet_transform,
};

/// A multilinear polynomial in coefficient form.
///
/// The coefficient at index `j` multiplies the monomial `Π_{i : bit i of j set} X_i`.
/// Reading the same vector as univariate coefficients gives the polynomial
/// `g(y) = Σ_j c_j · y^j`, which agrees with the multilinear one at `(y, y^2, y^4, …)`.
/// This is the univariate bridge used to Reed–Solomon encode multilinear witnesses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoefficientList<F> {
    coeffs: Vec<F>,
    num_variables: usize,
}

impl<F: Field> CoefficientList<F> {
    /// Wraps `coeffs` as a multilinear polynomial in `log2(len)` variables.
    ///
    /// # Panics
    ///
    /// Panics if the length is not a power of two.
    #[must_use]
    pub fn new(coeffs: Vec<F>) -> Self {
        let num_variables = log2_strict_usize(coeffs.len());
        Self {
            coeffs,
            num_variables,
        }
    }

    /// A polynomial with independent uniformly random coefficients.
    pub fn random<R: Rng>(num_variables: usize, rng: &mut R) -> Self
    where
        StandardUniform: Distribution<F>,
    {
        Self::new((0..1 << num_variables).map(|_| rng.random()).collect())
    }

    /// Reinterprets a univariate polynomial of degree `< 2^num_variables` as multilinear.
    ///
    /// # Panics
    ///
    /// Panics if the degree does not fit.
    #[must_use]
    pub fn from_univariate(poly: &DensePolynomial<F>, num_variables: usize) -> Self {
        Self::new(poly.padded_coeffs(1 << num_variables))
    }

    #[must_use]
    pub const fn num_variables(&self) -> usize {
        self.num_variables
    }

    #[must_use]
    pub fn num_coeffs(&self) -> usize {
        self.coeffs.len()
    }

    /// The univariate form `Σ_j c_j · y^j`.
    #[must_use]
    pub fn to_univariate(&self) -> DensePolynomial<F> {
        DensePolynomial::new(self.coeffs.clone())
    }

    /// Evaluates the polynomial at an arbitrary point of `F^n`.
    ///
    /// Variables are eliminated from `X_0` upwards, halving the table each time.
    ///
    /// # Panics
    ///
    /// Panics if the point has the wrong number of coordinates.
    #[must_use]
    pub fn evaluate(&self, point: &MultilinearPoint<F>) -> F {
        assert_eq!(point.num_variables(), self.num_variables);
        let mut table = self.coeffs.clone();
        for &x in point.iter() {
            table = table
                .chunks_exact(2)
                .map(|pair| pair[0] + x * pair[1])
                .collect();
        }
        table[0]
    }

    /// Evaluates the univariate form at `y`, i.e. the multilinear polynomial at
    /// `expand_from_univariate(y)`.
    #[must_use]
    pub fn evaluate_univariate(&self, y: F) -> F {
        super::dense::horner_evaluate(&self.coeffs, y)
    }

    /// Substitutes `X_0 = r`, leaving a polynomial in the remaining variables.
    ///
    /// On the univariate form this is exactly a factor-2 FRI fold with challenge `r`.
    ///
    /// # Panics
    ///
    /// Panics on a constant polynomial.
    #[must_use]
    pub fn fix_first_variable(&self, r: F) -> Self {
        assert!(self.num_variables > 0, "no variable left to fix");
        let coeffs = self
            .coeffs
            .par_chunks_exact(2)
            .map(|pair| pair[0] + r * pair[1])
            .collect();
        Self {
            coeffs,
            num_variables: self.num_variables - 1,
        }
    }

    /// Returns `self + X_n · high`, adding one variable on top.
    ///
    /// # Panics
    ///
    /// Panics if `high` does not have the same number of variables.
    #[must_use]
    pub fn extend_with(&self, high: &Self) -> Self {
        assert_eq!(self.num_variables, high.num_variables);
        let mut coeffs = self.coeffs.clone();
        coeffs.extend_from_slice(&high.coeffs);
        Self {
            coeffs,
            num_variables: self.num_variables + 1,
        }
    }

    /// Computes `scalar · self + other`.
    ///
    /// # Panics
    ///
    /// Panics if the number of variables differ.
    #[must_use]
    pub fn scale_and_add(&self, scalar: F, other: &Self) -> Self {
        assert_eq!(self.num_variables, other.num_variables);
        let coeffs = self
            .coeffs
            .par_iter()
            .zip(other.coeffs.par_iter())
            .map(|(&a, &b)| scalar * a + b)
            .collect();
        Self {
            coeffs,
            num_variables: self.num_variables,
        }
    }

    /// Evaluations over the boolean hypercube.
    #[must_use]
    pub fn to_evaluations(&self) -> EvaluationsList<F> {
        let mut evals = self.coeffs.clone();
        wavelet_transform(&mut evals);
        EvaluationsList::new(evals)
    }
}

impl<F> Deref for CoefficientList<F> {
    type Target = [F];

    fn deref(&self) -> &Self::Target {
        &self.coeffs
    }
}

#[cfg(test)]
mod tests {
    use p3_baby_bear::BabyBear;
    use p3_field::PrimeCharacteristicRing;
    use proptest::prelude::*;
    use rand::{SeedableRng, rngs::SmallRng};

    use super::*;

    type F = BabyBear;

    #[test]
    fn test_coefficient_list_initialization() {
        let coeffs = vec![
            F::from_u64(3),
            F::from_u64(1),
            F::from_u64(4),
            F::from_u64(1),
        ];
        let coeff_list = CoefficientList::new(coeffs.clone());

        assert_eq!(&*coeff_list, &coeffs);
        assert_eq!(coeff_list.num_variables(), 2);
    }

    #[test]
    fn test_evaluate_multilinear() {
        let c = [8, 2, 3, 1].map(F::from_u64);
        let coeff_list = CoefficientList::new(c.to_vec());

        let x0 = F::from_u64(2);
        let x1 = F::from_u64(3);
        let point = MultilinearPoint::new(vec![x0, x1]);

        // Index bit 0 is X0, bit 1 is X1.
        let expected = c[0] + c[1] * x0 + c[2] * x1 + c[3] * x0 * x1;
        assert_eq!(coeff_list.evaluate(&point), expected);
    }

    #[test]
    fn test_fix_first_variable_is_partial_evaluation() {
        let mut rng = SmallRng::seed_from_u64(11);
        let poly = CoefficientList::<F>::random(5, &mut rng);
        let point = MultilinearPoint::<F>::rand(&mut rng, 5);

        let fixed = poly.fix_first_variable(point[0]);
        assert_eq!(fixed.num_variables(), 4);
        assert_eq!(fixed.evaluate(&point.without_first()), poly.evaluate(&point));
    }

    #[test]
    fn test_fix_first_variable_is_fri_fold() {
        let mut rng = SmallRng::seed_from_u64(12);
        let poly = CoefficientList::<F>::random(6, &mut rng);
        let r: F = rng.random();

        assert_eq!(
            poly.fix_first_variable(r).to_univariate(),
            poly.to_univariate().fold(r, 2)
        );
    }

    #[test]
    fn test_extend_with_vanishes_on_zero() {
        let mut rng = SmallRng::seed_from_u64(13);
        let low = CoefficientList::<F>::random(3, &mut rng);
        let high = CoefficientList::<F>::random(3, &mut rng);
        let joined = low.extend_with(&high);
        let point = MultilinearPoint::<F>::rand(&mut rng, 3);

        assert_eq!(joined.evaluate(&point.with_trailing(F::ZERO)), low.evaluate(&point));
        assert_eq!(
            joined.evaluate(&point.with_trailing(F::ONE)),
            low.evaluate(&point) + high.evaluate(&point)
        );
    }

    proptest! {
        #[test]
        fn prop_univariate_bridge(seed in any::<u64>(), num_variables in 0usize..=8) {
            let mut rng = SmallRng::seed_from_u64(seed);
            let poly = CoefficientList::<F>::random(num_variables, &mut rng);
            let y: F = rng.random();

            let lifted = MultilinearPoint::expand_from_univariate(y, num_variables);
            prop_assert_eq!(poly.evaluate(&lifted), poly.to_univariate().evaluate(y));
            prop_assert_eq!(poly.evaluate_univariate(y), poly.to_univariate().evaluate(y));
        }

        #[test]
        fn prop_to_evaluations_matches_pointwise(seed in any::<u64>(), num_variables in 0usize..=6) {
            let mut rng = SmallRng::seed_from_u64(seed);
            let poly = CoefficientList::<F>::random(num_variables, &mut rng);
            let evals = poly.to_evaluations();

            for (index, &value) in evals.iter().enumerate() {
                let point = MultilinearPoint::from_binary_index(index, num_variables);
                prop_assert_eq!(value, poly.evaluate(&point));
            }
        }
    }
}
