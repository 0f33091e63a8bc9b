/// Elo rating engine.
///
/// Stateless, pure functions. The `RatingStore` owns the data; these functions
/// only compute from it.
use crate::constants::ELO_SCALE;
use crate::matrix::ExpectedScoreMatrix;

/// Expected scores `(p_a, p_b)` for a game between ratings `a` and `b`.
///
/// `p_a = 1 / (1 + 10^((b - a) / 400))` and `p_b = 1 - p_a`.
pub fn expected_score(rating_a: f64, rating_b: f64) -> (f64, f64) {
    let p_a = 1.0 / (1.0 + 10f64.powf((rating_b - rating_a) / ELO_SCALE));
    (p_a, 1.0 - p_a)
}

/// Move `old_rating` toward the observed result by `k * (actual - expected)`.
pub fn update_rating(old_rating: f64, expected: f64, actual: f64, k: f64) -> f64 {
    old_rating + k * (actual - expected)
}

/// Build the full expected-score matrix from a rating vector. O(n^2).
///
/// Only used when a session starts without a persisted matrix.
pub fn build_matrix(ratings: &[f64]) -> ExpectedScoreMatrix {
    let n = ratings.len();
    let mut matrix = ExpectedScoreMatrix::zeros(n);
    for i in 0..n {
        for j in (i + 1)..n {
            fill_pair(&mut matrix, ratings, i, j);
        }
    }
    matrix
}

/// Recompute rows and columns `i` and `j` after their ratings changed. O(n).
///
/// Every other entry already agrees with `ratings`, so this is all that is
/// needed to keep the matrix in sync after a comparison.
pub fn refresh_matrix_row_col(matrix: &mut ExpectedScoreMatrix, ratings: &[f64], i: usize, j: usize) {
    refresh_row_col(matrix, ratings, i);
    if j != i {
        refresh_row_col(matrix, ratings, j);
    }
}

fn refresh_row_col(matrix: &mut ExpectedScoreMatrix, ratings: &[f64], idx: usize) {
    for other in 0..ratings.len() {
        if other != idx {
            fill_pair(matrix, ratings, idx.min(other), idx.max(other));
        }
    }
}

/// Write both directions of one pair. Always evaluated from the lower index so
/// that a refresh produces bit-identical values to a full build.
fn fill_pair(matrix: &mut ExpectedScoreMatrix, ratings: &[f64], lo: usize, hi: usize) {
    let (p_lo, p_hi) = expected_score(ratings[lo], ratings[hi]);
    matrix.set(lo, hi, p_lo);
    matrix.set(hi, lo, p_hi);
}
