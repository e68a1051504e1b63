use p3_field::TwoAdicField;
use tracing::{debug, instrument};

use super::{errors::FriError, iopp::FriIopp};
use crate::{
    constant::DEFAULT_QUERY_COUNT,
    domain::EvaluationDomain,
    fiat_shamir::ChallengeSampler,
    parameters::{FriParameters, errors::ConfigError},
    poly::dense::DensePolynomial,
    utils::is_overwhelming_majority,
};

/// Prover side of the FRI polynomial commitment.
#[derive(Debug, Clone)]
pub struct FriPcsProver<F> {
    generator: F,
    params: FriParameters,
    committed: Option<DensePolynomial<F>>,
}

impl<F: TwoAdicField> FriPcsProver<F> {
    /// Validates the domain and parameters up front.
    pub fn new(generator: F, params: FriParameters) -> Result<Self, ConfigError> {
        let domain = EvaluationDomain::new(generator)?;
        params.validate(domain.size())?;
        Ok(Self {
            generator,
            params,
            committed: None,
        })
    }

    /// The committed polynomial, if any.
    #[must_use]
    pub const fn committed(&self) -> Option<&DensePolynomial<F>> {
        self.committed.as_ref()
    }

    /// Commits to `poly` by building its FRI oracle.
    pub fn commit<S>(&mut self, poly: DensePolynomial<F>, sampler: &mut S) -> Result<FriIopp<F>, FriError>
    where
        S: ChallengeSampler<F> + ?Sized,
    {
        let oracle = FriIopp::new(poly.clone(), self.generator, &self.params, sampler)?;
        self.committed = Some(poly);
        Ok(oracle)
    }

    /// Opens the commitment at `point`.
    ///
    /// Returns `v = f(point)` and a FRI oracle for the quotient `(f - v) / (X - point)`.
    #[instrument(skip_all, level = "debug")]
    pub fn open<S>(&self, point: F, sampler: &mut S) -> Result<(F, FriIopp<F>), FriError>
    where
        S: ChallengeSampler<F> + ?Sized,
    {
        let poly = self.committed.as_ref().ok_or(FriError::NotCommitted)?;
        let (quotient, value) = poly.divide_by_linear(point);
        let oracle = FriIopp::new(quotient, self.generator, &self.params, sampler)?;
        Ok((value, oracle))
    }
}

/// Verifier side of the FRI polynomial commitment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FriPcsVerifier {
    /// The committed polynomial has degree `< poly_degree`.
    pub poly_degree: usize,
    pub query_count: usize,
}

impl FriPcsVerifier {
    #[must_use]
    pub const fn new(poly_degree: usize, query_count: usize) -> Self {
        Self {
            poly_degree,
            query_count,
        }
    }

    #[must_use]
    pub const fn with_default_queries(poly_degree: usize) -> Self {
        Self::new(poly_degree, DEFAULT_QUERY_COUNT)
    }

    /// Checks the opening `f(point) = value`.
    ///
    /// Both oracles must be over the same domain (an `Err` otherwise). They must be close
    /// to degree `< d` and `< d - 1`, and on random indices
    /// `value + q(x_i)·(x_i - point) = f(x_i)` must hold for more than two thirds of queries.
    #[instrument(skip_all, fields(poly_degree = self.poly_degree), level = "debug")]
    pub fn verify_proof<F, S>(
        &self,
        original: &FriIopp<F>,
        quotient: &FriIopp<F>,
        point: F,
        value: F,
        sampler: &mut S,
    ) -> Result<bool, FriError>
    where
        F: TwoAdicField,
        S: ChallengeSampler<F> + ?Sized,
    {
        let f_round = original.proof_oracle();
        let q_round = quotient.proof_oracle();
        if f_round.domain() != q_round.domain() {
            return Err(ConfigError::DomainMismatch.into());
        }

        if !original.verify_proximity(self.poly_degree, self.query_count, sampler) {
            debug!("committed oracle failed the proximity test");
            return Ok(false);
        }
        if !quotient.verify_proximity(self.poly_degree.saturating_sub(1), self.query_count, sampler)
        {
            debug!("quotient oracle failed the proximity test");
            return Ok(false);
        }

        let f_oracle = f_round.oracle();
        let q_oracle = q_round.oracle();
        let points = f_round.evaluation_points();
        let accepted = (0..self.query_count)
            .map(|_| sampler.sample_index(f_oracle.len()))
            .filter(|&i| value + q_oracle[i] * (points[i] - point) == f_oracle[i])
            .count();

        let passed = is_overwhelming_majority(accepted, self.query_count);
        if !passed {
            debug!(accepted, queries = self.query_count, "opening check rejected");
        }
        Ok(passed)
    }
}
