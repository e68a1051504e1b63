/// Number of consistency queries the verifiers issue when none is configured.
pub const DEFAULT_QUERY_COUNT: usize = 10;

/// Default number of in-domain shift queries per WHIR fold round.
pub const DEFAULT_SHIFT_QUERIES: usize = 2;

/// Default inverse rate of the first Reed–Solomon code.
pub const DEFAULT_RATE_FACTOR: usize = 4;

/// Default number of sub-polynomials per FRI fold.
pub const DEFAULT_FOLDING_FACTOR: usize = 4;

/// Default number of DEEP out-of-domain samples per FRI fold.
pub const DEFAULT_OOD_SAMPLES: usize = 0;

/// Default bound on the number of evaluations of the masked witness a ZK-WHIR verifier reads.
pub const DEFAULT_QUERY_THRESHOLD: usize = 2;
