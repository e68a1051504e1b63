use p3_baby_bear::{BabyBear, Poseidon2BabyBear};
use p3_challenger::DuplexChallenger;
use p3_field::PrimeCharacteristicRing;
use proptest::prelude::*;
use rand::{SeedableRng, rngs::SmallRng};

use super::*;

type F = BabyBear;
type Perm = Poseidon2BabyBear<16>;
type MyChallenger = DuplexChallenger<F, Perm, 16, 8>;

fn make_transcript() -> ChallengerTranscript<MyChallenger> {
    let perm = Perm::new_from_rng_128(&mut SmallRng::seed_from_u64(42));
    ChallengerTranscript(DuplexChallenger::new(perm))
}

#[test]
fn test_transcript_is_deterministic() {
    let mut a = make_transcript();
    let mut b = make_transcript();

    let message = [F::from_u64(7), F::from_u64(11)];
    ChallengeSampler::<F>::observe(&mut a, &message);
    ChallengeSampler::<F>::observe(&mut b, &message);

    let x: F = a.sample();
    let y: F = b.sample();
    assert_eq!(x, y);
    assert_eq!(
        ChallengeSampler::<F>::sample_index(&mut a, 1000),
        ChallengeSampler::<F>::sample_index(&mut b, 1000)
    );
}

#[test]
fn test_transcript_binds_to_observed_messages() {
    let mut a = make_transcript();
    let mut b = make_transcript();

    ChallengeSampler::<F>::observe(&mut a, &[F::ONE]);
    ChallengeSampler::<F>::observe(&mut b, &[F::TWO]);

    let x: F = a.sample();
    let y: F = b.sample();
    assert_ne!(x, y);
}

#[test]
fn test_outside_domain_points() {
    let domain = EvaluationDomain::<F>::standard(10).unwrap();
    let mut sampler = TrustedRandomness(SmallRng::seed_from_u64(3));
    let points = sample_distinct_outside_domain(&mut sampler, &domain, 8);

    assert_eq!(points.len(), 8);
    for (i, &z) in points.iter().enumerate() {
        assert!(!domain.contains(z));
        assert!(!points[..i].contains(&z));
    }
}

proptest! {
    #[test]
    fn prop_sample_index_in_range(seed in any::<u64>(), bound in 1usize..5000) {
        let mut trusted = TrustedRandomness(SmallRng::seed_from_u64(seed));
        let mut transcript = make_transcript();
        ChallengeSampler::<F>::observe(&mut transcript, &[F::from_u64(seed)]);

        for _ in 0..8 {
            prop_assert!(ChallengeSampler::<F>::sample_index(&mut trusted, bound) < bound);
            prop_assert!(ChallengeSampler::<F>::sample_index(&mut transcript, bound) < bound);
        }
    }
}
