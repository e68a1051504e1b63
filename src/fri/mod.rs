//! Univariate FRI: fold layers, the proximity proof built from them, and the polynomial
//! commitment derived from two proximity proofs.

pub mod errors;
pub mod iopp;
pub mod pcs;
pub mod round;
