use thiserror::Error;

use crate::parameters::errors::ConfigError;

/// Misuse of the WHIR round state machine, or an inconsistent configuration.
///
/// Verifiers report a failed sumcheck or final check as `false`, never as one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WhirError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The first sumcheck round takes no challenge.
    #[error("the first sumcheck round does not take a challenge")]
    UnexpectedChallenge,

    /// Every sumcheck round after the first binds the challenge of the previous one.
    #[error("sumcheck round {round} requires a challenge")]
    MissingChallenge { round: usize },

    /// `fold_round` needs at least one bound variable.
    #[error("no sumcheck challenge has been consumed; nothing to fold")]
    NothingToFold,
}

/// Errors of the zero-knowledge WHIR commitment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ZkError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Whir(#[from] WhirError),

    /// The first WHIR round does not encode `challenge · masked + mask`.
    #[error("the first WHIR oracle differs from the virtual combination of the commitments")]
    VirtualOracleMismatch,

    /// `verify` was called on a commitment that was never opened.
    #[error("the commitment has not been opened")]
    NotOpened,
}
