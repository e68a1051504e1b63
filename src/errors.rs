//! Crate-level error type.

use thiserror::Error;

use crate::{
    fri::errors::FriError,
    parameters::errors::ConfigError,
    whir::errors::{WhirError, ZkError},
};

/// Any error raised by the protocols of this crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fri(#[from] FriError),

    #[error(transparent)]
    Whir(#[from] WhirError),

    #[error(transparent)]
    Zk(#[from] ZkError),
}
