use std::ops::Deref;

use p3_field::Field;
use rand::{
    Rng,
    distr::{Distribution, StandardUniform},
};

/// A point `(x_0, …, x_{n-1})` at which a multilinear polynomial is evaluated.
///
/// Coordinate `i` is the value of variable `X_i`; variables are fixed in increasing order
/// during the sumcheck.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct MultilinearPoint<F>(pub Vec<F>);

impl<F> Deref for MultilinearPoint<F> {
    type Target = [F];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<F: Field> MultilinearPoint<F> {
    #[must_use]
    pub const fn new(coords: Vec<F>) -> Self {
        Self(coords)
    }

    /// Number of variables.
    #[must_use]
    pub fn num_variables(&self) -> usize {
        self.0.len()
    }

    /// A uniformly random point in `F^num_variables`.
    pub fn rand<R: Rng>(rng: &mut R, num_variables: usize) -> Self
    where
        StandardUniform: Distribution<F>,
    {
        Self((0..num_variables).map(|_| rng.random()).collect())
    }

    /// The point of the hypercube `{0,1}^num_variables` whose bit `i` is `index >> i & 1`.
    #[must_use]
    pub fn from_binary_index(index: usize, num_variables: usize) -> Self {
        Self(
            (0..num_variables)
                .map(|i| F::from_bool((index >> i) & 1 == 1))
                .collect(),
        )
    }

    /// Lifts a univariate point `y` to the multilinear point `(y, y^2, y^4, …, y^{2^{n-1}})`.
    ///
    /// With coefficient index `j` standing for the monomial `y^j`, evaluating a multilinear
    /// polynomial at this point equals evaluating its univariate form at `y`.
    #[must_use]
    pub fn expand_from_univariate(point: F, num_variables: usize) -> Self {
        let mut coords = Vec::with_capacity(num_variables);
        let mut current = point;
        for _ in 0..num_variables {
            coords.push(current);
            current = current.square();
        }
        Self(coords)
    }

    /// Appends one trailing coordinate.
    #[must_use]
    pub fn with_trailing(&self, coord: F) -> Self {
        let mut coords = self.0.clone();
        coords.push(coord);
        Self(coords)
    }

    /// Drops the first coordinate.
    #[must_use]
    pub fn without_first(&self) -> Self {
        Self(self.0.iter().skip(1).copied().collect())
    }

    /// Evaluates `eq(self, point) = Π_i (x_i·y_i + (1 - x_i)(1 - y_i))`.
    ///
    /// # Panics
    ///
    /// Panics if the points disagree in dimension.
    #[must_use]
    pub fn eq_poly(&self, point: &Self) -> F {
        assert_eq!(self.num_variables(), point.num_variables());
        self.iter()
            .zip(point.iter())
            .map(|(&x, &y)| eq_1(x, y))
            .product()
    }
}

/// The one-variable equality polynomial `x·y + (1 - x)(1 - y)`.
#[inline]
pub fn eq_1<F: Field>(x: F, y: F) -> F {
    x * y + (F::ONE - x) * (F::ONE - y)
}

#[cfg(test)]
mod tests {
    use p3_baby_bear::BabyBear;
    use p3_field::PrimeCharacteristicRing;
    use rand::{SeedableRng, rngs::SmallRng};

    use super::*;

    type F = BabyBear;

    #[test]
    fn test_expand_from_univariate() {
        let y = F::from_u64(3);
        let point = MultilinearPoint::expand_from_univariate(y, 4);
        assert_eq!(
            point.0,
            vec![
                F::from_u64(3),
                F::from_u64(9),
                F::from_u64(81),
                F::from_u64(6561)
            ]
        );
    }

    #[test]
    fn test_eq_poly_is_indicator_on_hypercube() {
        let n = 3;
        for a in 0..1 << n {
            for b in 0..1 << n {
                let x = MultilinearPoint::<F>::from_binary_index(a, n);
                let y = MultilinearPoint::<F>::from_binary_index(b, n);
                let expected = if a == b { F::ONE } else { F::ZERO };
                assert_eq!(x.eq_poly(&y), expected);
            }
        }
    }

    #[test]
    fn test_eq_poly_symmetric() {
        let mut rng = SmallRng::seed_from_u64(7);
        let x = MultilinearPoint::<F>::rand(&mut rng, 5);
        let y = MultilinearPoint::<F>::rand(&mut rng, 5);
        assert_eq!(x.eq_poly(&y), y.eq_poly(&x));
    }

    #[test]
    fn test_with_trailing_and_without_first() {
        let p = MultilinearPoint(vec![F::ONE, F::TWO]);
        assert_eq!(
            p.with_trailing(F::ZERO).0,
            vec![F::ONE, F::TWO, F::ZERO]
        );
        assert_eq!(p.without_first().0, vec![F::TWO]);
    }
}
