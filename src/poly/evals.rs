use std::ops::Deref;

use p3_field::Field;
use p3_maybe_rayon::prelude::*;
use p3_util::log2_strict_usize;

use super::{coeffs::CoefficientList, multilinear::MultilinearPoint, wavelet::inverse_wavelet_transform};

/// Evaluations of a multilinear polynomial over the boolean hypercube `{0,1}^n`.
///
/// Entry `j` holds `f(b_0, …, b_{n-1})` with `b_i = (j >> i) & 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationsList<F> {
    evals: Vec<F>,
    num_variables: usize,
}

impl<F: Field> EvaluationsList<F> {
    /// Wraps a table of `2^n` hypercube evaluations.
    ///
    /// # Panics
    ///
    /// Panics if the length is not a power of two.
    #[must_use]
    pub fn new(evals: Vec<F>) -> Self {
        let num_variables = log2_strict_usize(evals.len());
        Self {
            evals,
            num_variables,
        }
    }

    /// The table of `scale · eq(x, point)` over all `x ∈ {0,1}^n`.
    #[must_use]
    pub fn new_from_point(point: &MultilinearPoint<F>, scale: F) -> Self {
        let mut table = vec![F::ZERO; 1 << point.num_variables()];
        table[0] = scale;
        // After processing coordinate i the first 2^{i+1} entries hold the eq table of
        // the first i+1 coordinates.
        for (i, &p) in point.iter().enumerate() {
            let half = 1 << i;
            let (lo, hi) = table[..2 * half].split_at_mut(half);
            for (l, h) in lo.iter_mut().zip(hi.iter_mut()) {
                *h = *l * p;
                *l -= *h;
            }
        }
        Self::new(table)
    }

    #[must_use]
    pub const fn num_variables(&self) -> usize {
        self.num_variables
    }

    #[must_use]
    pub fn num_evals(&self) -> usize {
        self.evals.len()
    }

    /// Adds `scale · eq(·, point)` to every entry.
    ///
    /// # Panics
    ///
    /// Panics on a dimension mismatch.
    pub fn accumulate(&mut self, point: &MultilinearPoint<F>, scale: F) {
        assert_eq!(point.num_variables(), self.num_variables);
        let eq = Self::new_from_point(point, scale);
        self.evals
            .par_iter_mut()
            .zip(eq.evals.par_iter())
            .for_each(|(acc, &e)| *acc += e);
    }

    /// Substitutes `X_0 = r` in the multilinear extension of the table.
    ///
    /// # Panics
    ///
    /// Panics on a table with no variables.
    #[must_use]
    pub fn fix_first_variable(&self, r: F) -> Self {
        assert!(self.num_variables > 0, "no variable left to fix");
        let evals = self
            .evals
            .par_chunks_exact(2)
            .map(|pair| pair[0] + r * (pair[1] - pair[0]))
            .collect();
        Self {
            evals,
            num_variables: self.num_variables - 1,
        }
    }

    /// Evaluates the multilinear extension at an arbitrary point.
    #[must_use]
    pub fn evaluate(&self, point: &MultilinearPoint<F>) -> F {
        assert_eq!(point.num_variables(), self.num_variables);
        point
            .iter()
            .fold(self.clone(), |table, &x| table.fix_first_variable(x))
            .evals[0]
    }

    /// `Σ_x self(x)`.
    #[must_use]
    pub fn sum(&self) -> F {
        self.evals.par_iter().copied().sum()
    }

    /// `Σ_x self(x) · other(x)`.
    ///
    /// # Panics
    ///
    /// Panics on a dimension mismatch.
    #[must_use]
    pub fn dot_product(&self, other: &Self) -> F {
        assert_eq!(self.num_variables, other.num_variables);
        self.evals
            .par_iter()
            .zip(other.evals.par_iter())
            .map(|(&a, &b)| a * b)
            .sum()
    }

    /// Recovers the coefficient form.
    #[must_use]
    pub fn to_coefficients(&self) -> CoefficientList<F> {
        let mut coeffs = self.evals.clone();
        inverse_wavelet_transform(&mut coeffs);
        CoefficientList::new(coeffs)
    }
}

impl<F> Deref for EvaluationsList<F> {
    type Target = [F];

    fn deref(&self) -> &Self::Target {
        &self.evals
    }
}
