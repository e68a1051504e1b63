use thiserror::Error;

/// Errors raised while validating protocol parameters and domains.
///
/// These are never protocol outcomes: a verifier only sees them when it was configured
/// inconsistently with the prover, or with values that cannot form a Reed–Solomon code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The generator does not have a power-of-two multiplicative order.
    #[error("domain generator does not have a power-of-two order")]
    NonPowerOfTwoOrder,

    /// The field has no subgroup of the requested order.
    #[error("field has no subgroup of order 2^{log_size} (two-adicity {two_adicity})")]
    ExceedsTwoAdicity { log_size: usize, two_adicity: usize },

    /// The factor is zero or not a power of two.
    #[error("{name} must be a non-zero power of two, got {value}")]
    NotPowerOfTwo { name: &'static str, value: usize },

    /// A folding factor of one would never shrink the polynomial.
    #[error("folding factor must be at least 2, got {folding_factor}")]
    FoldingFactorTooSmall { folding_factor: usize },

    /// The inverse rate does not fit in the domain.
    #[error("rate factor {rate_factor} exceeds the domain order {order}")]
    InvalidRateFactor { rate_factor: usize, order: usize },

    /// FRI requires `folding_factor ≤ rate_factor`.
    #[error("folding factor {folding_factor} exceeds the rate factor {rate_factor}")]
    FoldingExceedsRate {
        folding_factor: usize,
        rate_factor: usize,
    },

    /// The folding root `ω^{N/k}` does not have order `k`.
    #[error("folding root does not have order {folding_factor}")]
    FoldingRootOrder { folding_factor: usize },

    /// The message does not fit in the code.
    #[error("polynomial degree {degree} does not fit in a code of dimension {dimension}")]
    DegreeExceedsDimension { degree: usize, dimension: usize },

    /// The code dimension must not exceed half of the domain.
    #[error("domain of order {order} is too small for dimension {dimension}")]
    DomainTooSmall { dimension: usize, order: usize },

    /// Two oracles that must be read over the same domain were not.
    #[error("oracles are defined over different evaluation domains")]
    DomainMismatch,

    /// A weight polynomial and a witness disagree on the number of variables.
    #[error("weight has {weight} variables but the witness has {witness}")]
    WeightArity { weight: usize, witness: usize },

    /// `query_threshold · folding_factor` masked evaluations cannot be hidden by the mask.
    #[error("cannot hide {revealed} evaluations of a {num_coeffs}-coefficient witness")]
    MaskTooLarge { revealed: usize, num_coeffs: usize },
}
