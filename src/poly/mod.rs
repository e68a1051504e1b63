pub mod coeffs;
pub mod dense;
pub mod evals;
pub mod multilinear;
pub mod wavelet;
