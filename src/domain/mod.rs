use std::sync::OnceLock;

use p3_field::TwoAdicField;
use p3_maybe_rayon::prelude::*;

use crate::parameters::errors::ConfigError;

pub mod reed_solomon;

/// Minimum number of points generated per thread when materialising a domain.
const MIN_POINTS_PER_THREAD: usize = 1 << 10;

/// A multiplicative subgroup `⟨ω⟩` of power-of-two order.
///
/// The points `ω^0, ω^1, …, ω^{N-1}` are materialised on first use and cached.
#[derive(Debug, Clone)]
pub struct EvaluationDomain<F> {
    generator: F,
    log_size: usize,
    elements: OnceLock<Vec<F>>,
}

impl<F: TwoAdicField> EvaluationDomain<F> {
    /// Builds the domain generated by `generator`, whose order must be a power of two.
    pub fn new(generator: F) -> Result<Self, ConfigError> {
        let mut power = generator;
        for log_size in 0..=F::TWO_ADICITY {
            if power == F::ONE {
                return Ok(Self {
                    generator,
                    log_size,
                    elements: OnceLock::new(),
                });
            }
            power = power.square();
        }
        Err(ConfigError::NonPowerOfTwoOrder)
    }

    /// The subgroup of order `2^log_size` generated by the field's canonical root of unity.
    pub fn standard(log_size: usize) -> Result<Self, ConfigError> {
        if log_size > F::TWO_ADICITY {
            return Err(ConfigError::ExceedsTwoAdicity {
                log_size,
                two_adicity: F::TWO_ADICITY,
            });
        }
        Ok(Self {
            generator: F::two_adic_generator(log_size),
            log_size,
            elements: OnceLock::new(),
        })
    }

    #[must_use]
    pub const fn generator(&self) -> F {
        self.generator
    }

    #[must_use]
    pub const fn size(&self) -> usize {
        1 << self.log_size
    }

    #[must_use]
    pub const fn log_size(&self) -> usize {
        self.log_size
    }

    /// `ω^index`.
    #[must_use]
    pub fn element(&self, index: usize) -> F {
        self.elements.get().map_or_else(
            || self.generator.exp_u64(index as u64),
            |points| points[index % points.len()],
        )
    }

    /// All points in order, computed once.
    pub fn elements(&self) -> &[F] {
        self.elements.get_or_init(|| {
            let size = self.size();
            let chunk = size.div_ceil(current_num_threads()).max(MIN_POINTS_PER_THREAD);
            let mut points = vec![F::ZERO; size];
            points
                .par_chunks_mut(chunk)
                .enumerate()
                .for_each(|(i, out)| {
                    let mut current = self.generator.exp_u64((i * chunk) as u64);
                    for p in out {
                        *p = current;
                        current *= self.generator;
                    }
                });
            points
        })
    }

    /// Whether the generator is the field's canonical `2^log_size`-th root of unity, so
    /// that radix-2 DFTs apply directly.
    #[must_use]
    pub fn is_standard(&self) -> bool {
        self.log_size <= F::TWO_ADICITY && self.generator == F::two_adic_generator(self.log_size)
    }

    /// Whether `x` lies in the subgroup.
    #[must_use]
    pub fn contains(&self, x: F) -> bool {
        x.exp_power_of_2(self.log_size) == F::ONE
    }

    /// The subgroup `⟨ω^factor⟩` of order `N / factor`.
    pub fn fold(&self, factor: usize) -> Result<Self, ConfigError> {
        crate::parameters::ensure_power_of_two("folding factor", factor)?;
        let log_factor = factor.trailing_zeros() as usize;
        if log_factor > self.log_size {
            return Err(ConfigError::InvalidRateFactor {
                rate_factor: factor,
                order: self.size(),
            });
        }
        Ok(Self {
            generator: self.generator.exp_power_of_2(log_factor),
            log_size: self.log_size - log_factor,
            elements: OnceLock::new(),
        })
    }
}

impl<F: PartialEq> PartialEq for EvaluationDomain<F> {
    fn eq(&self, other: &Self) -> bool {
        self.generator == other.generator && self.log_size == other.log_size
    }
}

impl<F: Eq> Eq for EvaluationDomain<F> {}

#[cfg(test)]
mod tests {
    use p3_baby_bear::BabyBear;
    use p3_field::PrimeCharacteristicRing;

    use super::*;

    type F = BabyBear;

    #[test]
    fn test_order_is_detected() {
        let domain = EvaluationDomain::new(F::two_adic_generator(10)).unwrap();
        assert_eq!(domain.size(), 1 << 10);
        assert!(domain.is_standard());

        // A non-canonical generator of the same subgroup.
        let other = EvaluationDomain::new(F::two_adic_generator(10).exp_u64(3)).unwrap();
        assert_eq!(other.size(), 1 << 10);
        assert!(!other.is_standard());
    }

    #[test]
    fn test_rejects_non_power_of_two_order() {
        // 3 lies outside the subgroup of order 2^27.
        assert_eq!(
            EvaluationDomain::new(F::from_u64(3)).unwrap_err(),
            ConfigError::NonPowerOfTwoOrder
        );
        assert!(EvaluationDomain::<F>::standard(28).is_err());
    }

    #[test]
    fn test_elements_and_contains() {
        let domain = EvaluationDomain::<F>::standard(6).unwrap();
        let points = domain.elements();
        assert_eq!(points.len(), 64);
        assert_eq!(points[0], F::ONE);
        for (i, &p) in points.iter().enumerate() {
            assert_eq!(p, domain.generator().exp_u64(i as u64));
            assert!(domain.contains(p));
        }
        assert_eq!(domain.element(65), points[1]);
        assert!(!domain.contains(F::from_u64(3)));
    }

    #[test]
    fn test_fold() {
        let domain = EvaluationDomain::<F>::standard(8).unwrap();
        let folded = domain.fold(4).unwrap();
        assert_eq!(folded.size(), 64);
        assert_eq!(folded.generator(), domain.generator().exp_u64(4));
        // Canonical generators square into canonical generators.
        assert!(folded.is_standard());
        assert!(domain.fold(3).is_err());
        assert!(domain.fold(512).is_err());
    }
}
