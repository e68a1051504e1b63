//! Zero-knowledge wrapper around WHIR.
//!
//! The witness gains one variable `X_ℓ` carrying a random mask, `masked(x, X_ℓ) =
//! f(x) + X_ℓ·m(x)`, so evaluations at `X_ℓ = 0` are unchanged. A second random multilinear
//! polynomial blinds the sumcheck: WHIR runs on `c·masked + mask` for a verifier
//! challenge `c`.
//!
//! The mask is not proven to make the revealed evaluations uniformly random; treat the
//! hiding property as heuristic.

use p3_field::TwoAdicField;
use p3_maybe_rayon::prelude::*;
use rand::{
    Rng,
    distr::{Distribution, StandardUniform},
};
use tracing::{debug, instrument};

use super::{
    errors::ZkError,
    round::WhirRound,
    verifier::WhirVerifier,
    weights::Weights,
};
use crate::{
    domain::{EvaluationDomain, reed_solomon::ReedSolomonCode},
    fiat_shamir::ChallengeSampler,
    parameters::{ZkWhirParameters, errors::ConfigError},
    poly::{coeffs::CoefficientList, dense::DensePolynomial, multilinear::MultilinearPoint},
};

/// Masks `input` with a random univariate polynomial placed on the new top variable.
///
/// Revealing `query_threshold · folding_factor` evaluations requires a mask of degree
/// `2^⌈log2(2^ℓ + t·K)⌉ - 2^ℓ - 1`, which must fit in `ℓ` variables.
pub fn mask_polynomial<F, R>(
    input: &CoefficientList<F>,
    query_threshold: usize,
    folding_factor: usize,
    rng: &mut R,
) -> Result<CoefficientList<F>, ConfigError>
where
    F: TwoAdicField,
    R: Rng,
    StandardUniform: Distribution<F>,
{
    let num_coeffs = input.num_coeffs();
    let revealed = query_threshold * folding_factor;
    if revealed > num_coeffs {
        return Err(ConfigError::MaskTooLarge {
            revealed,
            num_coeffs,
        });
    }

    let mask_len = (num_coeffs + revealed).next_power_of_two() - num_coeffs;
    let mask = DensePolynomial::new((0..mask_len).map(|_| rng.random()).collect());
    Ok(input.extend_with(&CoefficientList::from_univariate(
        &mask,
        input.num_variables(),
    )))
}

/// The public side of a ZK-WHIR commitment, filled in as the protocol advances.
#[derive(Debug, Clone)]
pub struct CommitmentData<F> {
    /// Codeword of the masked witness.
    pub masked_oracle: Vec<F>,
    /// Codeword of the sumcheck mask.
    pub sumcheck_mask_oracle: Vec<F>,
    /// `f(point)`, once opened.
    pub pcs_evaluation: Option<F>,
    /// `mask(point, 0)`, once opened.
    pub sumcheck_evaluation: Option<F>,
    /// The WHIR round over `c·masked + mask`, once opened.
    pub whir_first_round: Option<WhirRound<F>>,
}

/// Prover for the zero-knowledge WHIR commitment.
#[derive(Debug, Clone)]
pub struct ZkWhirPcs<F> {
    input: CoefficientList<F>,
    masked: CoefficientList<F>,
    sumcheck_mask: CoefficientList<F>,
    code: ReedSolomonCode<F>,
    params: ZkWhirParameters,
}

impl<F> ZkWhirPcs<F>
where
    F: TwoAdicField,
    StandardUniform: Distribution<F>,
{
    /// Draws both masks for `input` and fixes the commitment domain `⟨generator⟩`.
    ///
    /// The domain must hold at least `2^{ℓ+2}` points: the masked witness has `ℓ + 1`
    /// variables and WHIR needs rate at most one half.
    pub fn new<R: Rng>(
        input: CoefficientList<F>,
        generator: F,
        params: ZkWhirParameters,
        rng: &mut R,
    ) -> Result<Self, ZkError> {
        params.whir().validate()?;
        let masked = mask_polynomial(&input, params.query_threshold, params.folding_factor, rng)?;
        let sumcheck_mask = CoefficientList::random(masked.num_variables(), rng);

        let domain = EvaluationDomain::new(generator)?;
        let dimension = masked.num_coeffs();
        if 2 * dimension > domain.size() {
            return Err(ConfigError::DomainTooSmall {
                dimension,
                order: domain.size(),
            }
            .into());
        }
        let code = ReedSolomonCode::new(domain, dimension)?;

        Ok(Self {
            input,
            masked,
            sumcheck_mask,
            code,
            params,
        })
    }

    #[must_use]
    pub const fn masked_polynomial(&self) -> &CoefficientList<F> {
        &self.masked
    }

    #[must_use]
    pub const fn sumcheck_mask(&self) -> &CoefficientList<F> {
        &self.sumcheck_mask
    }

    /// RS-encodes the masked witness and the sumcheck mask.
    #[instrument(skip_all, fields(vars = self.masked.num_variables()), level = "debug")]
    pub fn commit(&self) -> CommitmentData<F> {
        CommitmentData {
            masked_oracle: self.code.encode_coeffs(&self.masked),
            sumcheck_mask_oracle: self.code.encode_coeffs(&self.sumcheck_mask),
            pcs_evaluation: None,
            sumcheck_evaluation: None,
            whir_first_round: None,
        }
    }

    /// Opens at `point` for the verifier challenge `challenge`.
    ///
    /// Evaluates at `(point, 0)`, which the mask does not affect, and builds the first WHIR
    /// round over `challenge·masked + mask` with claim `challenge·f(point) + mask(point, 0)`.
    /// Fails with [`ZkError::VirtualOracleMismatch`] if that round's codeword is not the
    /// same combination of the committed codewords.
    #[instrument(skip_all, level = "debug")]
    pub fn open(
        &self,
        point: &MultilinearPoint<F>,
        challenge: F,
        mut commitment: CommitmentData<F>,
    ) -> Result<CommitmentData<F>, ZkError> {
        if point.num_variables() != self.input.num_variables() {
            return Err(ConfigError::WeightArity {
                weight: point.num_variables(),
                witness: self.input.num_variables(),
            }
            .into());
        }
        let value = self.input.evaluate(point);
        let extended = point.with_trailing(F::ZERO);
        debug_assert_eq!(self.masked.evaluate(&extended), value);
        let mask_value = self.sumcheck_mask.evaluate(&extended);

        let combined = self.masked.scale_and_add(challenge, &self.sumcheck_mask);
        let first_round = WhirRound::new(
            combined,
            Weights::evaluation(extended),
            self.code.domain().generator(),
            Some(challenge * value + mask_value),
        )?;

        let virtual_oracle = combine_oracles(&commitment, challenge);
        if first_round.fri_oracle() != virtual_oracle.as_slice() {
            return Err(ZkError::VirtualOracleMismatch);
        }

        commitment.pcs_evaluation = Some(value);
        commitment.sumcheck_evaluation = Some(mask_value);
        commitment.whir_first_round = Some(first_round);
        Ok(commitment)
    }

    /// Checks an opened commitment.
    ///
    /// Recomputes the combined claim from the revealed values, checks that the first WHIR
    /// oracle is the virtual combination of the committed ones, then runs the WHIR verifier
    /// with the weight `eq(X, (point, 0))`.
    #[instrument(skip_all, level = "debug")]
    pub fn verify<S>(
        &self,
        point: &MultilinearPoint<F>,
        challenge: F,
        commitment: &CommitmentData<F>,
        sampler: &mut S,
    ) -> Result<bool, ZkError>
    where
        S: ChallengeSampler<F> + ?Sized,
    {
        let (Some(value), Some(mask_value), Some(first_round)) = (
            commitment.pcs_evaluation,
            commitment.sumcheck_evaluation,
            commitment.whir_first_round.as_ref(),
        ) else {
            return Err(ZkError::NotOpened);
        };

        if first_round.fri_oracle() != combine_oracles(commitment, challenge).as_slice() {
            debug!("first round oracle is not the virtual combination");
            return Ok(false);
        }

        let mut verifier = WhirVerifier::new(
            Weights::evaluation(point.with_trailing(F::ZERO)),
            self.code.domain().generator(),
            challenge * value + mask_value,
            &self.params.whir(),
        )?;
        Ok(verifier.validate_pcs_claim(first_round, sampler)?)
    }
}

/// `challenge · masked_oracle + sumcheck_mask_oracle`, entry by entry.
fn combine_oracles<F: TwoAdicField>(commitment: &CommitmentData<F>, challenge: F) -> Vec<F> {
    commitment
        .masked_oracle
        .par_iter()
        .zip(commitment.sumcheck_mask_oracle.par_iter())
        .map(|(&masked, &mask)| challenge * masked + mask)
        .collect()
}
