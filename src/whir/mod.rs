//! Multilinear commitments by sumcheck and domain folding.
//!
//! A [`round::WhirRound`] holds a witness `f` in `ℓ` variables and a weight `w`, with the
//! claim `Σ_x f(x)·w(x) = σ`. The [`verifier::WhirVerifier`] binds `log2(K)` variables
//! by sumcheck, folds the witness into a code over a domain `K` times smaller, and adds
//! out-of-domain and shift-query constraints to the weight, until the witness is small
//! enough to check directly.

pub mod errors;
pub mod round;
pub mod verifier;
pub mod weights;
pub mod zk;
