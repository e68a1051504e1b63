use p3_field::Field;

use crate::poly::dense::DensePolynomial;

/// Acceptance rule shared by every query-based check: strictly more than two thirds of the
/// queries must pass.
#[must_use]
pub const fn is_overwhelming_majority(accepted: usize, total: usize) -> bool {
    accepted > 2 * total / 3
}

/// Solves `Σ_j coeffs[j] · nodes[i]^j = values[i]` for `coeffs`.
///
/// The nodes must be distinct; the solution is the coefficient vector of the interpolating
/// polynomial padded to `nodes.len()` entries.
///
/// # Panics
///
/// Panics on length mismatch or repeated nodes.
#[must_use]
pub fn solve_vandermonde<F: Field>(nodes: &[F], values: &[F]) -> Vec<F> {
    assert_eq!(nodes.len(), values.len());
    let points: Vec<_> = nodes.iter().copied().zip(values.iter().copied()).collect();
    DensePolynomial::lagrange_interpolate(&points).padded_coeffs(nodes.len())
}

/// Solves the linear system `matrix · x = rhs` by Gaussian elimination.
///
/// The system may be under- or over-determined: free variables are set to zero, and
/// `None` is returned when the system is inconsistent.
///
/// # Panics
///
/// Panics if the rows do not all have the same length or `rhs` has the wrong length.
#[must_use]
pub fn solve_linear_system<F: Field>(mut matrix: Vec<Vec<F>>, mut rhs: Vec<F>) -> Option<Vec<F>> {
    assert_eq!(matrix.len(), rhs.len());
    let num_cols = matrix.first().map_or(0, Vec::len);
    assert!(matrix.iter().all(|row| row.len() == num_cols));

    let mut pivot_cols = Vec::new();
    let mut row = 0;
    for col in 0..num_cols {
        let Some(pivot) = (row..matrix.len()).find(|&r| !matrix[r][col].is_zero()) else {
            continue;
        };
        matrix.swap(row, pivot);
        rhs.swap(row, pivot);

        let inv = matrix[row][col].inverse();
        for entry in &mut matrix[row][col..] {
            *entry *= inv;
        }
        rhs[row] *= inv;

        for r in 0..matrix.len() {
            if r == row || matrix[r][col].is_zero() {
                continue;
            }
            let factor = matrix[r][col];
            for c in col..num_cols {
                let delta = factor * matrix[row][c];
                matrix[r][c] -= delta;
            }
            let delta = factor * rhs[row];
            rhs[r] -= delta;
        }

        pivot_cols.push(col);
        row += 1;
        if row == matrix.len() {
            break;
        }
    }

    // Rows below the last pivot are all-zero on the left; they must be zero on the right.
    if rhs[row..].iter().any(|v| !v.is_zero()) {
        return None;
    }

    let mut solution = vec![F::ZERO; num_cols];
    for (r, &col) in pivot_cols.iter().enumerate() {
        solution[col] = rhs[r];
    }
    Some(solution)
}
