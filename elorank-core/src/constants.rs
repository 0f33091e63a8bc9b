/// Default K-factor: the largest rating change a single comparison can cause.
pub const DEFAULT_K_FACTOR: f64 = 32.0;

/// Rating assigned to items that arrive without any prior.
pub const STANDARD_RATING: f64 = 1000.0;

/// Lower bound of the range that external prior ratings are scaled into.
pub const SCALED_RATING_MIN: f64 = 1000.0;

/// Upper bound of the range that external prior ratings are scaled into.
pub const SCALED_RATING_MAX: f64 = 2000.0;

/// Rating difference at which the stronger item is expected to score ten times
/// as often as the weaker one.
pub const ELO_SCALE: f64 = 400.0;

/// Every item must have been judged at least this many times before the
/// matchmaker leaves the coverage phase.
///
/// Expected scores are meaningless while ratings still sit at their priors, so
/// coverage pairs items at random. Two comparisons per item is enough for the
/// matrix to start separating the field.
pub const DEFAULT_MIN_COMPARISONS: usize = 2;

/// Number of pairs selected per refinement batch.
///
/// Selection scans every unordered pair (O(n^2)), so it runs once per batch
/// instead of once per comparison. Only two ratings move per comparison, so a
/// batch of 10 rarely goes stale before it is exhausted.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Tolerance used when checking that two expected scores sum to one.
pub const PROBABILITY_TOLERANCE: f64 = 1e-9;
