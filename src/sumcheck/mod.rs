pub mod lagrange;
pub mod polynomial;

pub use polynomial::SumcheckPolynomial;
