use std::{f64::consts::LOG2_10, fmt::Display, str::FromStr};

/// Which proximity regime the query-count estimates assume.
///
/// The consistency checks only catch a far-from-code oracle with probability equal to its
/// relative distance `δ` from the code, so the number of queries needed for `λ` bits of
/// security is `⌈λ / -log2(1 - δ)⌉` with `δ` taken from the assumed regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityAssumption {
    /// Every oracle is within the unique decoding radius `(1 - ρ) / 2`.
    /// Requires no conjecture.
    UniqueDecoding,

    /// Oracles may be up to the Johnson bound `1 - √ρ` away.
    JohnsonBound,

    /// Oracles may be up to capacity `1 - ρ` away. Conjectural.
    CapacityBound,
}

impl SecurityAssumption {
    /// log2 of the slack `η` left below the JB and CB bounds.
    ///
    /// JB uses `η = √ρ / 20`, CB uses `η = ρ / 20`; UD has no slack.
    #[must_use]
    pub const fn log_eta(&self, log_inv_rate: usize) -> f64 {
        match self {
            Self::UniqueDecoding => 0.,
            Self::JohnsonBound => -(0.5 * log_inv_rate as f64 + LOG2_10 + 1.),
            Self::CapacityBound => -(log_inv_rate as f64 + LOG2_10 + 1.),
        }
    }

    /// The proximity parameter `δ` for a code of rate `2^-log_inv_rate`.
    #[must_use]
    pub fn proximity(&self, log_inv_rate: usize) -> f64 {
        let rate = (-(log_inv_rate as f64)).exp2();
        let eta = self.log_eta(log_inv_rate).exp2();
        match self {
            Self::UniqueDecoding => 0.5 * (1. - rate),
            Self::JohnsonBound => 1. - rate.sqrt() - eta,
            Self::CapacityBound => 1. - rate - eta,
        }
    }

    /// `log2(1 - δ)`, the per-query soundness error in bits (negative).
    #[must_use]
    pub fn log_1_delta(&self, log_inv_rate: usize) -> f64 {
        (1. - self.proximity(log_inv_rate)).log2()
    }

    /// Number of queries so that `(1 - δ)^t ≤ 2^-security_level`.
    #[must_use]
    pub fn queries(&self, security_level: usize, log_inv_rate: usize) -> usize {
        (-(security_level as f64) / self.log_1_delta(log_inv_rate)).ceil() as usize
    }

    /// Bits of security reached with `num_queries` queries.
    #[must_use]
    pub fn queries_error(&self, log_inv_rate: usize, num_queries: usize) -> f64 {
        -(num_queries as f64) * self.log_1_delta(log_inv_rate)
    }
}

impl Display for SecurityAssumption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::UniqueDecoding => "UniqueDecoding",
            Self::JohnsonBound => "JohnsonBound",
            Self::CapacityBound => "CapacityBound",
        })
    }
}

impl FromStr for SecurityAssumption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UniqueDecoding" => Ok(Self::UniqueDecoding),
            "JohnsonBound" => Ok(Self::JohnsonBound),
            "CapacityBound" => Ok(Self::CapacityBound),
            _ => Err(format!("Invalid soundness specification: {s}")),
        }
    }
}
