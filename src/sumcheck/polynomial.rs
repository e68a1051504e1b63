use p3_field::Field;
use p3_maybe_rayon::prelude::*;

use super::lagrange::extrapolate_012;
use crate::poly::evals::EvaluationsList;

/// A sumcheck round polynomial `h(X) = Σ_b f(X, b)·w(X, b)`, of degree at most two.
///
/// Stored as its values at `0`, `1` and `2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SumcheckPolynomial<F> {
    evaluations: [F; 3],
}

impl<F: Field> SumcheckPolynomial<F> {
    #[must_use]
    pub const fn new(evaluations: [F; 3]) -> Self {
        Self { evaluations }
    }

    /// The constant polynomial `value`.
    #[must_use]
    pub const fn constant(value: F) -> Self {
        Self::new([value; 3])
    }

    /// The round polynomial for the first variable of `Σ_x f(x)·w(x)`.
    ///
    /// Entries `2j` and `2j + 1` of each table differ only in `X_0`, so
    /// `h(0) = Σ f_0·w_0`, `h(1) = Σ f_1·w_1` and `h(2) = Σ (2f_1 - f_0)(2w_1 - w_0)`.
    ///
    /// # Panics
    ///
    /// Panics if the tables have no variables or disagree in size.
    #[must_use]
    pub fn from_product(witness: &EvaluationsList<F>, weights: &EvaluationsList<F>) -> Self {
        assert!(witness.num_variables() > 0, "no variable left to sum over");
        assert_eq!(witness.num_variables(), weights.num_variables());

        let evaluations = witness
            .par_chunks_exact(2)
            .zip(weights.par_chunks_exact(2))
            .map(|(f, w)| {
                let f2 = f[1].double() - f[0];
                let w2 = w[1].double() - w[0];
                [f[0] * w[0], f[1] * w[1], f2 * w2]
            })
            .reduce(
                || [F::ZERO; 3],
                |a, b| [a[0] + b[0], a[1] + b[1], a[2] + b[2]],
            );
        Self::new(evaluations)
    }

    #[must_use]
    pub const fn evaluations(&self) -> &[F; 3] {
        &self.evaluations
    }

    /// `h(0) + h(1)`.
    #[must_use]
    pub fn sum_over_boolean_hypercube(&self) -> F {
        self.evaluations[0] + self.evaluations[1]
    }

    #[must_use]
    pub fn evaluate(&self, r: F) -> F {
        let [e0, e1, e2] = self.evaluations;
        extrapolate_012(e0, e1, e2, r)
    }
}
