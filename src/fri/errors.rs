use thiserror::Error;

use crate::parameters::errors::ConfigError;

/// Errors surfaced by the FRI prover and verifiers.
///
/// A failed proximity or opening check is not an error: verifiers report it as `false`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FriError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// `open` was called before `commit`.
    #[error("no polynomial has been committed")]
    NotCommitted,

    /// A layer index past the end of the fold chain.
    #[error("layer {index} does not exist in a chain of {len} layers")]
    LayerOutOfRange { index: usize, len: usize },
}
