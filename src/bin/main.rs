use std::time::Instant;

use clap::{Parser, Subcommand};
use fri_and_friends::{
    errors::Error,
    fiat_shamir::TrustedRandomness,
    fri::pcs::{FriPcsProver, FriPcsVerifier},
    parameters::{
        FriParameters, WhirParameters, ZkWhirParameters, security::SecurityAssumption,
    },
    poly::{coeffs::CoefficientList, dense::DensePolynomial, multilinear::MultilinearPoint},
    whir::{round::WhirRound, verifier::WhirVerifier, weights::Weights, zk::ZkWhirPcs},
};
use p3_baby_bear::BabyBear;
use p3_field::TwoAdicField;
use rand::{Rng, SeedableRng, rngs::SmallRng};
use tracing_forest::{ForestLayer, util::LevelFilter};
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

type F = BabyBear;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    protocol: Protocol,

    #[arg(short = 'l', long = "security-bits", default_value = "100")]
    security_level: usize,

    /// Overrides the query count derived from the security level.
    #[arg(short = 'q', long)]
    queries: Option<usize>,

    /// log2 of the inverse rate.
    #[arg(short = 'r', long, default_value = "2")]
    rate: usize,

    #[arg(short = 'k', long = "fold", default_value = "4")]
    folding_factor: usize,

    #[arg(long = "sec", default_value = "CapacityBound")]
    soundness_type: SecurityAssumption,

    #[arg(long, default_value = "0")]
    seed: u64,
}

#[derive(Subcommand, Debug)]
enum Protocol {
    /// Commit to a random univariate polynomial with FRI and open it.
    Fri {
        /// log2 of the number of coefficients.
        #[arg(short = 'd', long, default_value = "12")]
        log_degree: usize,

        #[arg(long, default_value = "0")]
        ood_samples: usize,
    },
    /// Prove an evaluation of a random multilinear polynomial with WHIR.
    Whir {
        #[arg(short = 'd', long, default_value = "16")]
        num_variables: usize,
    },
    /// Commit, open and verify with the zero-knowledge WHIR wrapper.
    Zk {
        #[arg(short = 'd', long, default_value = "12")]
        num_variables: usize,

        #[arg(short = 't', long, default_value = "2")]
        query_threshold: usize,
    },
}

fn main() -> Result<(), Error> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    Registry::default()
        .with(env_filter)
        .with(ForestLayer::default())
        .init();

    let args = Args::parse();
    let queries = args.queries.unwrap_or_else(|| {
        args.soundness_type
            .queries(args.security_level, args.rate)
    });

    println!("=========================================");
    println!("Protocol: {:?}", args.protocol);
    println!(
        "Security level: {} bits using {} security, {} queries",
        args.security_level, args.soundness_type, queries
    );

    let mut rng = SmallRng::seed_from_u64(args.seed);
    let mut sampler = TrustedRandomness(SmallRng::seed_from_u64(args.seed.wrapping_add(1)));

    let start = Instant::now();
    let accepted = match args.protocol {
        Protocol::Fri {
            log_degree,
            ood_samples,
        } => {
            let params = FriParameters {
                rate_factor: 1 << args.rate,
                folding_factor: args.folding_factor,
                ood_samples,
            };
            let degree = 1 << log_degree;
            let generator = F::two_adic_generator(log_degree + args.rate);

            let mut prover = FriPcsProver::new(generator, params)?;
            let original = prover.commit(DensePolynomial::random(degree - 1, &mut rng), &mut sampler)?;
            let point: F = rng.random();
            let (value, quotient) = prover.open(point, &mut sampler)?;

            FriPcsVerifier::new(degree, queries).verify_proof(
                &original,
                &quotient,
                point,
                value,
                &mut sampler,
            )?
        }
        Protocol::Whir { num_variables } => {
            let witness = CoefficientList::<F>::random(num_variables, &mut rng);
            let point = MultilinearPoint::rand(&mut rng, num_variables);
            let claim = witness.evaluate(&point);
            let generator = F::two_adic_generator(num_variables + args.rate);
            let params = WhirParameters {
                folding_factor: args.folding_factor,
                shift_queries: queries,
            };

            let round = WhirRound::new(witness, Weights::evaluation(point.clone()), generator, None)?;
            let mut verifier =
                WhirVerifier::new(Weights::evaluation(point), generator, claim, &params)?;
            verifier.validate_pcs_claim(&round, &mut sampler)?
        }
        Protocol::Zk {
            num_variables,
            query_threshold,
        } => {
            let input = CoefficientList::<F>::random(num_variables, &mut rng);
            let point = MultilinearPoint::rand(&mut rng, num_variables);
            let params = ZkWhirParameters {
                query_threshold,
                folding_factor: args.folding_factor,
                shift_queries: queries,
            };
            let generator = F::two_adic_generator(num_variables + 1 + args.rate);

            let pcs = ZkWhirPcs::new(input, generator, params, &mut rng)?;
            let challenge: F = rng.random();
            let commitment = pcs.open(&point, challenge, pcs.commit())?;
            pcs.verify(&point, challenge, &commitment, &mut sampler)?
        }
    };

    println!("Verification: {}", if accepted { "accepted" } else { "rejected" });
    println!("Total time: {:.1?}", start.elapsed());
    Ok(())
}
