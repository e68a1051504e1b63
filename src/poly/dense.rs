use std::{
    cmp::max,
    ops::{Add, Mul, Sub},
};

use p3_field::Field;
use p3_maybe_rayon::prelude::*;
use rand::{
    Rng,
    distr::{Distribution, StandardUniform},
};

// Set some minimum number of field elements to be worked on per thread
// to avoid per-thread costs dominating parallel execution time.
const MIN_ELEMENTS_PER_THREAD: usize = 16;

/// A univariate polynomial stored in dense coefficient form.
///
/// The coefficient of `x^i` is stored at index `i`. The representation is kept trimmed:
/// the last stored coefficient is never zero, and the zero polynomial has no coefficients.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DensePolynomial<F> {
    coeffs: Vec<F>,
}

impl<F: Field> DensePolynomial<F> {
    /// Constructs a polynomial from its coefficients, dropping trailing zeros.
    #[must_use]
    pub fn new(coeffs: Vec<F>) -> Self {
        let mut poly = Self { coeffs };
        poly.truncate_leading_zeros();
        poly
    }

    /// The zero polynomial.
    #[must_use]
    pub const fn zero() -> Self {
        Self { coeffs: Vec::new() }
    }

    /// The constant polynomial `c`.
    #[must_use]
    pub fn constant(c: F) -> Self {
        Self::new(vec![c])
    }

    /// The monic linear polynomial `X - root`.
    #[must_use]
    pub fn linear_root(root: F) -> Self {
        Self::new(vec![-root, F::ONE])
    }

    /// Samples a polynomial of exactly the given degree.
    ///
    /// The leading coefficient is resampled until it is non-zero.
    pub fn random<R: Rng>(degree: usize, rng: &mut R) -> Self
    where
        StandardUniform: Distribution<F>,
    {
        let mut coeffs: Vec<F> = (0..=degree).map(|_| rng.random()).collect();
        while coeffs[degree].is_zero() {
            coeffs[degree] = rng.random();
        }
        Self { coeffs }
    }

    fn truncate_leading_zeros(&mut self) {
        while self.coeffs.last().is_some_and(|c| c.is_zero()) {
            self.coeffs.pop();
        }
    }

    /// Returns `true` for the zero polynomial.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Degree of the polynomial, `None` for the zero polynomial.
    #[must_use]
    pub fn degree(&self) -> Option<usize> {
        self.coeffs.len().checked_sub(1)
    }

    /// Coefficient of `x^i` (zero past the degree).
    #[must_use]
    pub fn coeff(&self, i: usize) -> F {
        self.coeffs.get(i).copied().unwrap_or(F::ZERO)
    }

    /// The trimmed coefficient slice, lowest degree first.
    #[must_use]
    pub fn coeffs(&self) -> &[F] {
        &self.coeffs
    }

    /// Consumes the polynomial, returning its trimmed coefficients.
    #[must_use]
    pub fn into_coeffs(self) -> Vec<F> {
        self.coeffs
    }

    /// Coefficients padded with zeros up to `len` entries.
    ///
    /// # Panics
    ///
    /// Panics if the polynomial has more than `len` coefficients.
    #[must_use]
    pub fn padded_coeffs(&self, len: usize) -> Vec<F> {
        assert!(self.coeffs.len() <= len, "polynomial does not fit in {len} coefficients");
        let mut out = self.coeffs.clone();
        out.resize(len, F::ZERO);
        out
    }

    /// Evaluates `self` at `point`.
    #[must_use]
    pub fn evaluate(&self, point: F) -> F {
        if self.is_zero() {
            return F::ZERO;
        } else if point.is_zero() {
            return self.coeffs[0];
        }

        // Split the coefficients across threads, run Horner on each chunk, and shift every
        // partial result by `point^{chunk start}` before summing.
        let num_elem_per_thread = max(
            self.coeffs.len() / current_num_threads(),
            MIN_ELEMENTS_PER_THREAD,
        );
        self.coeffs
            .par_chunks(num_elem_per_thread)
            .enumerate()
            .map(|(i, chunk)| {
                horner_evaluate(chunk, point) * point.exp_u64((i * num_elem_per_thread) as u64)
            })
            .sum()
    }

    /// Multiplies every coefficient by `scalar`.
    #[must_use]
    pub fn scale(&self, scalar: F) -> Self {
        Self::new(self.coeffs.iter().map(|&c| c * scalar).collect())
    }

    /// Euclidean division: returns `(quotient, remainder)` with `deg(remainder) < deg(divisor)`.
    ///
    /// # Panics
    ///
    /// Panics if `divisor` is the zero polynomial.
    #[must_use]
    pub fn divide_with_remainder(&self, divisor: &Self) -> (Self, Self) {
        assert!(!divisor.is_zero(), "division by the zero polynomial");
        let divisor_degree = divisor.coeffs.len() - 1;
        let Some(degree) = self.degree() else {
            return (Self::zero(), Self::zero());
        };
        if degree < divisor_degree {
            return (Self::zero(), self.clone());
        }

        let lead_inv = divisor.coeffs[divisor_degree].inverse();
        let mut remainder = self.coeffs.clone();
        let mut quotient = vec![F::ZERO; degree - divisor_degree + 1];

        for shift in (0..quotient.len()).rev() {
            let factor = remainder[shift + divisor_degree] * lead_inv;
            quotient[shift] = factor;
            if factor.is_zero() {
                continue;
            }
            for (r, &d) in remainder[shift..=shift + divisor_degree]
                .iter_mut()
                .zip(&divisor.coeffs)
            {
                *r -= factor * d;
            }
        }

        remainder.truncate(divisor_degree);
        (Self::new(quotient), Self::new(remainder))
    }

    /// Synthetic division by `X - root`: returns the quotient and `self(root)`.
    #[must_use]
    pub fn divide_by_linear(&self, root: F) -> (Self, F) {
        if self.coeffs.len() < 2 {
            return (Self::zero(), self.coeff(0));
        }
        let mut quotient = vec![F::ZERO; self.coeffs.len() - 1];
        let mut carry = F::ZERO;
        for i in (1..self.coeffs.len()).rev() {
            carry = self.coeffs[i] + carry * root;
            quotient[i - 1] = carry;
        }
        let remainder = self.coeffs[0] + carry * root;
        (Self::new(quotient), remainder)
    }

    /// Splits the polynomial into `factor` parts by coefficient index modulo `factor`.
    ///
    /// Part `i` holds the coefficients at indices `i, i + factor, i + 2·factor, …`, so that
    /// `self(X) = Σ_i X^i · part_i(X^factor)`.
    #[must_use]
    pub fn split(&self, factor: usize) -> Vec<Self> {
        assert!(factor > 0, "split factor must be positive");
        (0..factor)
            .map(|residue| {
                Self::new(
                    self.coeffs
                        .iter()
                        .skip(residue)
                        .step_by(factor)
                        .copied()
                        .collect(),
                )
            })
            .collect()
    }

    /// Inverse of [`Self::split`].
    #[must_use]
    pub fn interleave(parts: &[Self]) -> Self {
        let factor = parts.len();
        let len = parts
            .iter()
            .enumerate()
            .map(|(residue, part)| {
                part.coeffs
                    .len()
                    .checked_sub(1)
                    .map_or(0, |last| last * factor + residue + 1)
            })
            .max()
            .unwrap_or(0);

        let mut coeffs = vec![F::ZERO; len];
        for (residue, part) in parts.iter().enumerate() {
            for (j, &c) in part.coeffs.iter().enumerate() {
                coeffs[j * factor + residue] = c;
            }
        }
        Self::new(coeffs)
    }

    /// One FRI fold: `Σ_i challenge^i · split_i`.
    ///
    /// The result has degree `⌊deg / factor⌋`.
    #[must_use]
    pub fn fold(&self, challenge: F, factor: usize) -> Self {
        assert!(factor > 0, "folding factor must be positive");
        let folded = self
            .coeffs
            .par_chunks(factor)
            .map(|chunk| horner_evaluate(chunk, challenge))
            .collect();
        Self::new(folded)
    }

    /// `Π (X - root)` over all given roots.
    #[must_use]
    pub fn vanishing(roots: &[F]) -> Self {
        let mut coeffs = vec![F::ONE];
        for &root in roots {
            let mut next = vec![F::ZERO; coeffs.len() + 1];
            for (i, &c) in coeffs.iter().enumerate() {
                next[i + 1] += c;
                next[i] -= root * c;
            }
            coeffs = next;
        }
        Self::new(coeffs)
    }

    /// The unique polynomial of degree `< points.len()` through the given `(x, y)` pairs.
    ///
    /// # Panics
    ///
    /// Panics if two points share an `x` coordinate.
    #[must_use]
    pub fn lagrange_interpolate(points: &[(F, F)]) -> Self {
        let xs: Vec<F> = points.iter().map(|&(x, _)| x).collect();
        let vanishing = Self::vanishing(&xs);

        let mut coeffs = vec![F::ZERO; points.len()];
        for (i, &(x_i, y_i)) in points.iter().enumerate() {
            // basis_i = vanishing / (X - x_i), normalised to be 1 at x_i.
            let (basis, _) = vanishing.divide_by_linear(x_i);
            let denom = xs
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, &x_j)| x_i - x_j)
                .product::<F>();
            assert!(!denom.is_zero(), "duplicate interpolation node");
            let weight = y_i * denom.inverse();
            for (acc, &b) in coeffs.iter_mut().zip(basis.coeffs()) {
                *acc += weight * b;
            }
        }
        Self::new(coeffs)
    }
}

/// Horner's method over a coefficient slice (lowest degree first).
#[inline]
pub(crate) fn horner_evaluate<F: Field>(coeffs: &[F], point: F) -> F {
    coeffs
        .iter()
        .rfold(F::ZERO, |acc, &coeff| acc * point + coeff)
}

impl<F: Field> Add for &DensePolynomial<F> {
    type Output = DensePolynomial<F>;

    fn add(self, rhs: Self) -> DensePolynomial<F> {
        let len = self.coeffs.len().max(rhs.coeffs.len());
        DensePolynomial::new((0..len).map(|i| self.coeff(i) + rhs.coeff(i)).collect())
    }
}

impl<F: Field> Sub for &DensePolynomial<F> {
    type Output = DensePolynomial<F>;

    fn sub(self, rhs: Self) -> DensePolynomial<F> {
        let len = self.coeffs.len().max(rhs.coeffs.len());
        DensePolynomial::new((0..len).map(|i| self.coeff(i) - rhs.coeff(i)).collect())
    }
}

impl<F: Field> Mul for &DensePolynomial<F> {
    type Output = DensePolynomial<F>;

    fn mul(self, rhs: Self) -> DensePolynomial<F> {
        if self.is_zero() || rhs.is_zero() {
            return DensePolynomial::zero();
        }
        let mut coeffs = vec![F::ZERO; self.coeffs.len() + rhs.coeffs.len() - 1];
        for (i, &a) in self.coeffs.iter().enumerate() {
            for (j, &b) in rhs.coeffs.iter().enumerate() {
                coeffs[i + j] += a * b;
            }
        }
        DensePolynomial::new(coeffs)
    }
}
