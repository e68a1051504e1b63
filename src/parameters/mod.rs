use errors::ConfigError;

use crate::constant::{
    DEFAULT_FOLDING_FACTOR, DEFAULT_OOD_SAMPLES, DEFAULT_QUERY_THRESHOLD, DEFAULT_RATE_FACTOR,
    DEFAULT_SHIFT_QUERIES,
};

pub mod errors;
pub mod security;

/// Checks that `value` is a non-zero power of two.
pub const fn ensure_power_of_two(name: &'static str, value: usize) -> Result<(), ConfigError> {
    if value.is_power_of_two() {
        Ok(())
    } else {
        Err(ConfigError::NotPowerOfTwo { name, value })
    }
}

/// Parameters of a FRI fold chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FriParameters {
    /// Inverse rate of the first code: `domain_order / dimension`.
    pub rate_factor: usize,
    /// Number of sub-polynomials combined per fold.
    pub folding_factor: usize,
    /// Number of DEEP out-of-domain points per fold (0 disables DEEP).
    pub ood_samples: usize,
}

impl Default for FriParameters {
    fn default() -> Self {
        Self {
            rate_factor: DEFAULT_RATE_FACTOR,
            folding_factor: DEFAULT_FOLDING_FACTOR,
            ood_samples: DEFAULT_OOD_SAMPLES,
        }
    }
}

impl FriParameters {
    /// Validates the parameters against a domain of the given order.
    ///
    /// Requires both factors to be powers of two and
    /// `2 ≤ folding_factor ≤ rate_factor ≤ order`.
    pub fn validate(&self, order: usize) -> Result<(), ConfigError> {
        ensure_power_of_two("rate factor", self.rate_factor)?;
        ensure_power_of_two("folding factor", self.folding_factor)?;
        if self.folding_factor < 2 {
            return Err(ConfigError::FoldingFactorTooSmall {
                folding_factor: self.folding_factor,
            });
        }
        if self.rate_factor > order {
            return Err(ConfigError::InvalidRateFactor {
                rate_factor: self.rate_factor,
                order,
            });
        }
        if self.folding_factor > self.rate_factor {
            return Err(ConfigError::FoldingExceedsRate {
                folding_factor: self.folding_factor,
                rate_factor: self.rate_factor,
            });
        }
        Ok(())
    }
}

/// Parameters of the WHIR sumcheck-and-fold loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WhirParameters {
    /// `2^k`, where `k` variables are eliminated between two folds.
    pub folding_factor: usize,
    /// In-domain shift queries per fold.
    pub shift_queries: usize,
}

impl Default for WhirParameters {
    fn default() -> Self {
        Self {
            folding_factor: DEFAULT_FOLDING_FACTOR,
            shift_queries: DEFAULT_SHIFT_QUERIES,
        }
    }
}

impl WhirParameters {
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if !self.folding_factor.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                name: "folding factor",
                value: self.folding_factor,
            });
        }
        if self.folding_factor < 2 {
            return Err(ConfigError::FoldingFactorTooSmall {
                folding_factor: self.folding_factor,
            });
        }
        Ok(())
    }

    /// Number of sumcheck challenges between two folds.
    #[must_use]
    pub const fn folding_rounds(&self) -> usize {
        self.folding_factor.trailing_zeros() as usize
    }
}

/// Parameters of the zero-knowledge WHIR wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZkWhirParameters {
    /// Maximum number of shift queries made against the masked witness.
    pub query_threshold: usize,
    /// WHIR folding factor.
    pub folding_factor: usize,
    /// WHIR shift queries per fold.
    pub shift_queries: usize,
}

impl Default for ZkWhirParameters {
    fn default() -> Self {
        Self {
            query_threshold: DEFAULT_QUERY_THRESHOLD,
            folding_factor: DEFAULT_FOLDING_FACTOR,
            shift_queries: DEFAULT_SHIFT_QUERIES,
        }
    }
}

impl ZkWhirParameters {
    /// The parameters handed to the inner WHIR verifier.
    #[must_use]
    pub const fn whir(&self) -> WhirParameters {
        WhirParameters {
            folding_factor: self.folding_factor,
            shift_queries: self.shift_queries,
        }
    }
}
