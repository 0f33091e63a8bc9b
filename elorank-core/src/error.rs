//! Error types for elorank-core.

use thiserror::Error;

/// Everything that can go wrong inside the rating core.
///
/// None of these are recovered from internally. A failed call leaves the
/// `RatingStore` exactly as it was before the call.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EloError {
    /// A name that is not part of the store was used.
    #[error("Unknown item: {0:?}")]
    UnknownItem(String),

    /// The same name appears twice in the item list.
    #[error("Duplicate item name: {0:?}")]
    DuplicateItem(String),

    /// The item at this position has an empty name.
    #[error("Item at index {0} has an empty name")]
    EmptyName(usize),

    /// Ranking needs something to compare.
    #[error("At least two items are required, got {0}")]
    TooFewItems(usize),

    /// A persisted matrix does not match the item count.
    #[error("Malformed expected-score matrix: expected {expected}x{expected}, got {rows}x{cols}")]
    MalformedMatrix {
        expected: usize,
        rows: usize,
        cols: usize,
    },

    /// A persisted matrix holds a value that cannot be a probability.
    #[error("Expected-score matrix entry [{row}][{col}] = {value} is not a probability")]
    MatrixEntryOutOfRange { row: usize, col: usize, value: f64 },

    /// A persisted matrix whose two entries for a pair do not sum to one.
    #[error("Expected-score matrix entries [{row}][{col}] and [{col}][{row}] sum to {sum}, not 1")]
    MatrixNotComplementary { row: usize, col: usize, sum: f64 },

    /// Ratings must be finite numbers.
    #[error("Item {name:?} has a non-finite rating: {rating}")]
    NonFiniteRating { name: String, rating: f64 },

    /// Scores must be one of (1, 0), (0, 1) or (0.5, 0.5).
    #[error("Invalid judgment: scores ({score_a}, {score_b}) are not a win, loss or draw")]
    InvalidJudgment { score_a: f64, score_b: f64 },

    /// An item was paired with itself.
    #[error("Item {0:?} cannot be compared with itself")]
    SelfComparison(String),

    /// Matchmaker parameters out of range.
    #[error("Invalid matchmaker configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, EloError>;
