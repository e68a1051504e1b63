use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use fri_and_friends::{
    fiat_shamir::TrustedRandomness,
    parameters::WhirParameters,
    poly::{coeffs::CoefficientList, multilinear::MultilinearPoint},
    whir::{round::WhirRound, verifier::WhirVerifier, weights::Weights},
};
use p3_baby_bear::BabyBear;
use p3_field::TwoAdicField;
use rand::{SeedableRng, rngs::SmallRng};

type F = BabyBear;

const LOG_RATE: usize = 2;

fn whir_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("WHIR validate");
    let mut rng = SmallRng::seed_from_u64(42);
    let params = WhirParameters {
        folding_factor: 4,
        shift_queries: 10,
    };

    for num_variables in [8, 12, 16] {
        let witness = CoefficientList::<F>::random(num_variables, &mut rng);
        let point = MultilinearPoint::rand(&mut rng, num_variables);
        let claim = witness.evaluate(&point);
        let generator = F::two_adic_generator(num_variables + LOG_RATE);
        let round =
            WhirRound::new(witness, Weights::evaluation(point.clone()), generator, Some(claim))
                .unwrap();

        group.bench_with_input(
            BenchmarkId::from_parameter(num_variables),
            &num_variables,
            |b, _| {
                b.iter(|| {
                    let mut sampler = TrustedRandomness(SmallRng::seed_from_u64(1));
                    let mut verifier =
                        WhirVerifier::new(Weights::evaluation(point.clone()), generator, claim, &params)
                            .unwrap();
                    verifier.validate_pcs_claim(black_box(&round), &mut sampler)
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, whir_benchmark);
criterion_main!(benches);
