//! Subset-sum ("wavelet") transform between multilinear coefficients and hypercube evaluations.
//!
//! For a table indexed by `j ∈ [0, 2^n)`, the forward transform computes
//! `out[j] = Σ_{i ⊆ j} in[i]` where `⊆` is bitwise inclusion. Applied to the coefficients of a
//! multilinear polynomial it produces the evaluations over `{0,1}^n`; the inverse replaces the
//! sums with differences.

use p3_field::Field;
use p3_maybe_rayon::prelude::*;

/// Blocks smaller than this are processed on the current thread.
const PARALLEL_THRESHOLD: usize = 1 << 12;

/// In-place forward transform: coefficients to hypercube evaluations.
///
/// # Panics
///
/// Panics if the length is not a power of two.
pub fn wavelet_transform<F: Field>(values: &mut [F]) {
    butterfly_layers(values, |lo, hi| *hi += lo);
}

/// In-place inverse transform: hypercube evaluations to coefficients.
///
/// # Panics
///
/// Panics if the length is not a power of two.
pub fn inverse_wavelet_transform<F: Field>(values: &mut [F]) {
    butterfly_layers(values, |lo, hi| *hi -= lo);
}

fn butterfly_layers<F, Op>(values: &mut [F], op: Op)
where
    F: Field,
    Op: Fn(F, &mut F) + Sync,
{
    assert!(
        values.len().is_power_of_two(),
        "wavelet transform needs a power-of-two length"
    );

    let mut half = 1;
    while half < values.len() {
        let block = 2 * half;
        let apply = |chunk: &mut [F]| {
            let (lo, hi) = chunk.split_at_mut(half);
            for (l, h) in lo.iter().zip(hi.iter_mut()) {
                op(*l, h);
            }
        };
        if values.len() >= PARALLEL_THRESHOLD {
            values.par_chunks_exact_mut(block).for_each(apply);
        } else {
            values.chunks_exact_mut(block).for_each(apply);
        }
        half = block;
    }
}

#[cfg(test)]
mod tests {
    use p3_baby_bear::BabyBear;
    use p3_field::PrimeCharacteristicRing;
    use proptest::prelude::*;

    use super::*;

    type F = BabyBear;

    #[test]
    fn test_two_variable_transform() {
        // f(X0, X1) = c0 + c1·X0 + c2·X1 + c3·X0·X1
        let (c0, c1, c2, c3) = (
            F::from_u64(1),
            F::from_u64(2),
            F::from_u64(3),
            F::from_u64(4),
        );
        let mut values = vec![c0, c1, c2, c3];
        wavelet_transform(&mut values);

        // Index bit i is the value of X_i.
        assert_eq!(values, vec![c0, c0 + c1, c0 + c2, c0 + c1 + c2 + c3]);
    }

    #[test]
    fn test_large_transform_uses_parallel_path() {
        let original: Vec<F> = (0..1u64 << 13).map(F::from_u64).collect();
        let mut values = original.clone();
        wavelet_transform(&mut values);
        // The last entry sums every coefficient.
        assert_eq!(values[values.len() - 1], original.iter().copied().sum::<F>());
        inverse_wavelet_transform(&mut values);
        assert_eq!(values, original);
    }

    proptest! {
        #[test]
        fn prop_inverse_undoes_forward(
            log_len in 0usize..=9,
            raw in prop::collection::vec(any::<u32>(), 1 << 9),
        ) {
            let original: Vec<F> = raw
                .into_iter()
                .take(1 << log_len)
                .map(|v| F::from_u64(u64::from(v)))
                .collect();
            let mut values = original.clone();
            wavelet_transform(&mut values);
            inverse_wavelet_transform(&mut values);
            prop_assert_eq!(values, original);
        }
    }
}
