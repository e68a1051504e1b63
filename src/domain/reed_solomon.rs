use p3_dft::{Radix2Dit, TwoAdicSubgroupDft};
use p3_field::TwoAdicField;
use p3_maybe_rayon::prelude::*;
use tracing::instrument;

use super::EvaluationDomain;
use crate::{
    parameters::errors::ConfigError,
    poly::dense::{DensePolynomial, horner_evaluate},
    utils::solve_linear_system,
};

/// The Reed–Solomon code of polynomials of degree `< dimension` evaluated over a domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReedSolomonCode<F> {
    domain: EvaluationDomain<F>,
    dimension: usize,
}

impl<F: TwoAdicField> ReedSolomonCode<F> {
    /// Builds the code; requires `1 ≤ dimension ≤ |domain|`.
    pub fn new(domain: EvaluationDomain<F>, dimension: usize) -> Result<Self, ConfigError> {
        if dimension == 0 || dimension > domain.size() {
            return Err(ConfigError::DomainTooSmall {
                dimension,
                order: domain.size(),
            });
        }
        Ok(Self { domain, dimension })
    }

    #[must_use]
    pub const fn domain(&self) -> &EvaluationDomain<F> {
        &self.domain
    }

    /// Message length `k`: codewords are evaluations of polynomials of degree `< k`.
    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    /// Block length `n`.
    #[must_use]
    pub const fn length(&self) -> usize {
        self.domain.size()
    }

    /// The domain points, in codeword order.
    #[must_use]
    pub fn evaluation_points(&self) -> &[F] {
        self.domain.elements()
    }

    /// Encodes a polynomial of degree `< dimension`.
    pub fn encode(&self, poly: &DensePolynomial<F>) -> Result<Vec<F>, ConfigError> {
        if let Some(degree) = poly.degree().filter(|&d| d >= self.dimension) {
            return Err(ConfigError::DegreeExceedsDimension {
                degree,
                dimension: self.dimension,
            });
        }
        Ok(self.encode_coeffs(poly.coeffs()))
    }

    /// Evaluates the coefficient vector (lowest degree first) over the whole domain.
    ///
    /// # Panics
    ///
    /// Panics if there are more coefficients than domain points.
    #[must_use]
    #[instrument(skip_all, fields(n = self.length()), level = "debug")]
    pub fn encode_coeffs(&self, coeffs: &[F]) -> Vec<F> {
        let n = self.length();
        assert!(coeffs.len() <= n, "message longer than the block length");

        if self.domain.is_standard() {
            let mut padded = coeffs.to_vec();
            padded.resize(n, F::ZERO);
            return Radix2Dit::default().dft(padded);
        }

        self.evaluation_points()
            .par_iter()
            .map(|&x| horner_evaluate(coeffs, x))
            .collect()
    }

    /// Interpolates the unique polynomial of degree `< n` agreeing with `codeword`.
    ///
    /// # Panics
    ///
    /// Panics if the codeword does not have length `n`.
    #[must_use]
    #[instrument(skip_all, fields(n = self.length()), level = "debug")]
    pub fn interpolate(&self, codeword: &[F]) -> DensePolynomial<F> {
        let n = self.length();
        assert_eq!(codeword.len(), n, "codeword has the wrong length");

        if self.domain.is_standard() {
            return DensePolynomial::new(Radix2Dit::default().idft(codeword.to_vec()));
        }

        // c_j = n^{-1} Σ_i y_i ω^{-ij}
        let n_inv = F::from_usize(n).inverse();
        let inv_generator = self.domain.generator().inverse();
        let coeffs = (0..n)
            .into_par_iter()
            .map(|j| horner_evaluate(codeword, inv_generator.exp_u64(j as u64)) * n_inv)
            .collect();
        DensePolynomial::new(coeffs)
    }

    /// Maximum number of errors unique decoding corrects: `⌊(n - k) / 2⌋`.
    #[must_use]
    pub const fn unique_decoding_errors(&self) -> usize {
        (self.length() - self.dimension) / 2
    }

    /// Relative unique decoding radius `(1 - ρ) / 2`.
    #[must_use]
    pub fn unique_decoding_radius(&self) -> f64 {
        0.5 * (1. - self.rate())
    }

    /// Relative Johnson radius `1 - √ρ`.
    #[must_use]
    pub fn johnson_radius(&self) -> f64 {
        1. - self.rate().sqrt()
    }

    /// `ρ = k / n`.
    #[must_use]
    pub fn rate(&self) -> f64 {
        self.dimension as f64 / self.length() as f64
    }

    /// Berlekamp–Welch decoding.
    ///
    /// Returns the message polynomial when `received` lies within
    /// [`Self::unique_decoding_errors`] of a codeword, `None` otherwise.
    ///
    /// Solves for an error locator `E` (monic, degree `e`) and `Q = f·E` (degree `< e + k`)
    /// from `Q(x_i) = y_i·E(x_i)`. The system is dense, so this is meant for short codes.
    #[must_use]
    #[instrument(skip_all, fields(n = self.length(), k = self.dimension), level = "debug")]
    pub fn decode_unique(&self, received: &[F]) -> Option<DensePolynomial<F>> {
        if received.len() != self.length() {
            return None;
        }
        let e = self.unique_decoding_errors();
        let k = self.dimension;
        let points = self.evaluation_points();

        // Unknowns: Q_0..Q_{e+k-1}, then E_0..E_{e-1}.
        let (matrix, rhs): (Vec<_>, Vec<_>) = points
            .iter()
            .zip(received)
            .map(|(&x, &y)| {
                let mut row = Vec::with_capacity(2 * e + k);
                let mut power = F::ONE;
                for _ in 0..e + k {
                    row.push(power);
                    power *= x;
                }
                let mut power = F::ONE;
                for _ in 0..e {
                    row.push(-y * power);
                    power *= x;
                }
                (row, y * x.exp_u64(e as u64))
            })
            .unzip();

        let solution = solve_linear_system(matrix, rhs)?;
        let q = DensePolynomial::new(solution[..e + k].to_vec());
        let mut locator = solution[e + k..].to_vec();
        locator.push(F::ONE);
        let locator = DensePolynomial::new(locator);

        let (message, remainder) = q.divide_with_remainder(&locator);
        if !remainder.is_zero() || message.degree().is_some_and(|d| d >= k) {
            return None;
        }

        let errors = self
            .encode_coeffs(message.coeffs())
            .iter()
            .zip(received)
            .filter(|(a, b)| a != b)
            .count();
        (errors <= e).then_some(message)
    }
}

#[cfg(test)]
mod tests {
    use p3_baby_bear::BabyBear;
    use p3_field::PrimeCharacteristicRing;
    use rand::{Rng, SeedableRng, rngs::SmallRng};

    use super::*;

    type F = BabyBear;

    fn code(log_n: usize, k: usize) -> ReedSolomonCode<F> {
        ReedSolomonCode::new(EvaluationDomain::standard(log_n).unwrap(), k).unwrap()
    }

    #[test]
    fn test_encode_matches_pointwise_evaluation() {
        let mut rng = SmallRng::seed_from_u64(31);
        let code = code(6, 16);
        let poly = DensePolynomial::<F>::random(15, &mut rng);
        let codeword = code.encode(&poly).unwrap();

        for (&x, &y) in code.evaluation_points().iter().zip(&codeword) {
            assert_eq!(poly.evaluate(x), y);
        }
    }

    #[test]
    fn test_non_standard_generator_encoding() {
        let mut rng = SmallRng::seed_from_u64(32);
        let generator = F::two_adic_generator(5).exp_u64(7);
        let domain = EvaluationDomain::new(generator).unwrap();
        assert!(!domain.is_standard());
        let code = ReedSolomonCode::new(domain, 8).unwrap();

        let poly = DensePolynomial::<F>::random(7, &mut rng);
        let codeword = code.encode(&poly).unwrap();
        assert_eq!(codeword[3], poly.evaluate(generator.exp_u64(3)));
        assert_eq!(code.interpolate(&codeword), poly);
    }

    #[test]
    fn test_interpolate_inverts_encode() {
        let mut rng = SmallRng::seed_from_u64(33);
        let code = code(7, 32);
        let poly = DensePolynomial::<F>::random(31, &mut rng);
        assert_eq!(code.interpolate(&code.encode(&poly).unwrap()), poly);
    }

    #[test]
    fn test_encode_rejects_large_degree() {
        let mut rng = SmallRng::seed_from_u64(34);
        let code = code(5, 8);
        let poly = DensePolynomial::<F>::random(8, &mut rng);
        assert_eq!(
            code.encode(&poly),
            Err(ConfigError::DegreeExceedsDimension {
                degree: 8,
                dimension: 8
            })
        );
    }

    #[test]
    fn test_decode_unique_corrects_errors() {
        let mut rng = SmallRng::seed_from_u64(35);
        let code = code(4, 4);
        assert_eq!(code.unique_decoding_errors(), 6);

        let poly = DensePolynomial::<F>::random(3, &mut rng);
        let mut received = code.encode(&poly).unwrap();
        for i in [0, 3, 5, 8, 11, 15] {
            received[i] += F::from_u64(i as u64 + 1);
        }
        // At most six positions differ from the codeword.
        assert_eq!(code.decode_unique(&received), Some(poly));
    }

    #[test]
    fn test_decode_unique_clean_codeword() {
        let mut rng = SmallRng::seed_from_u64(36);
        let code = code(5, 8);
        let poly = DensePolynomial::<F>::random(5, &mut rng);
        let received = code.encode(&poly).unwrap();
        assert_eq!(code.decode_unique(&received), Some(poly));
    }

    #[test]
    fn test_decode_unique_fails_far_from_code() {
        let mut rng = SmallRng::seed_from_u64(37);
        let code = code(4, 4);
        // A uniformly random word is far from every codeword with overwhelming probability.
        let received: Vec<F> = (0..16).map(|_| rng.random()).collect();
        assert_eq!(code.decode_unique(&received), None);
    }

    #[test]
    fn test_radii() {
        let code = code(4, 4);
        assert!((code.unique_decoding_radius() - 0.375).abs() < 1e-12);
        assert!((code.johnson_radius() - 0.5).abs() < 1e-12);
    }
}
