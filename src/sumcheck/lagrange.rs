//! Interpolation of quadratic round polynomials given on `{0, 1, 2}`.

use p3_field::Field;

/// The Lagrange basis for `{0, 1, 2}` evaluated at `r`.
///
/// ```text
/// L_0(r) = (r - 1)(r - 2) / 2
/// L_1(r) = r(2 - r)
/// L_2(r) = r(r - 1) / 2
/// ```
pub fn lagrange_weights_012<F: Field>(r: F) -> [F; 3] {
    let inv_two = F::TWO.inverse();
    let l0 = (r - F::ONE) * (r - F::TWO) * inv_two;
    let l1 = r * (F::TWO - r);
    let l2 = r * (r - F::ONE) * inv_two;
    [l0, l1, l2]
}

/// Evaluates at `r` the quadratic polynomial with values `e0, e1, e2` at `0, 1, 2`.
pub fn extrapolate_012<F: Field>(e0: F, e1: F, e2: F, r: F) -> F {
    let [w0, w1, w2] = lagrange_weights_012(r);
    e0 * w0 + e1 * w1 + e2 * w2
}
