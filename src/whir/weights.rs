use p3_field::Field;

use crate::poly::{
    evals::EvaluationsList,
    multilinear::{MultilinearPoint, eq_1},
};

/// One equality constraint `scale · eq(X, point)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightTerm<F> {
    pub scale: F,
    pub point: MultilinearPoint<F>,
}

/// The weight polynomial `weight(Z, X) = Z · w(X)` of a WHIR round.
///
/// `w(X) = Σ_i scale_i · eq(X, p_i)` is kept as its list of terms. Substituting the
/// witness for `Z` gives the sumcheck polynomial `f(X)·w(X)`, so a claim
/// `Σ_x f(x)·w(x) = σ` bundles the evaluations `f(p_i)` with coefficients `scale_i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Weights<F> {
    num_variables: usize,
    terms: Vec<WeightTerm<F>>,
}

impl<F: Field> Weights<F> {
    /// The weight selecting the evaluation at `point`.
    #[must_use]
    pub fn evaluation(point: MultilinearPoint<F>) -> Self {
        Self {
            num_variables: point.num_variables(),
            terms: vec![WeightTerm {
                scale: F::ONE,
                point,
            }],
        }
    }

    #[must_use]
    pub const fn num_variables(&self) -> usize {
        self.num_variables
    }

    #[must_use]
    pub fn terms(&self) -> &[WeightTerm<F>] {
        &self.terms
    }

    /// Adds `scale · eq(X, point)`.
    ///
    /// # Panics
    ///
    /// Panics if the point has the wrong number of coordinates.
    pub fn add_term(&mut self, scale: F, point: MultilinearPoint<F>) {
        assert_eq!(point.num_variables(), self.num_variables);
        self.terms.push(WeightTerm { scale, point });
    }

    /// `w(point)`.
    #[must_use]
    pub fn evaluate(&self, point: &MultilinearPoint<F>) -> F {
        self.terms
            .iter()
            .map(|term| term.scale * term.point.eq_poly(point))
            .sum()
    }

    /// Substitutes `X_0 = r` in every term.
    ///
    /// `eq` factors per coordinate, so each term keeps its shape with
    /// `scale · eq_1(r, p_0)` as the new scale.
    ///
    /// # Panics
    ///
    /// Panics when no variable is left.
    #[must_use]
    pub fn fix_first_variable(&self, r: F) -> Self {
        assert!(self.num_variables > 0, "no variable left to fix");
        let terms = self
            .terms
            .iter()
            .map(|term| WeightTerm {
                scale: term.scale * eq_1(r, term.point[0]),
                point: term.point.without_first(),
            })
            .collect();
        Self {
            num_variables: self.num_variables - 1,
            terms,
        }
    }

    /// The values of `w` over the boolean hypercube.
    #[must_use]
    pub fn to_evaluations(&self) -> EvaluationsList<F> {
        let mut evals = EvaluationsList::new(vec![F::ZERO; 1 << self.num_variables]);
        for term in &self.terms {
            evals.accumulate(&term.point, term.scale);
        }
        evals
    }

    /// `Σ_x f(x)·w(x)` for the witness table `f`.
    ///
    /// # Panics
    ///
    /// Panics on a dimension mismatch.
    #[must_use]
    pub fn weighted_sum(&self, witness: &EvaluationsList<F>) -> F {
        self.to_evaluations().dot_product(witness)
    }
}
