/// Dense n×n cache of pairwise expected scores.
///
/// `get(i, j)` is the probability that item `i` beats item `j` under the
/// current ratings. Off-diagonal entries always satisfy
/// `get(i, j) + get(j, i) == 1`. The diagonal is never read.
use crate::constants::PROBABILITY_TOLERANCE;
use crate::error::{EloError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct ExpectedScoreMatrix {
    size: usize,
    /// Row-major, `size * size` entries.
    values: Vec<f64>,
}

impl ExpectedScoreMatrix {
    /// All-zero matrix. Callers fill it through `engine::build_matrix`.
    pub(crate) fn zeros(size: usize) -> Self {
        ExpectedScoreMatrix {
            size,
            values: vec![0.0; size * size],
        }
    }

    /// Rebuild a matrix from persisted rows.
    ///
    /// The shape must be exactly `expected × expected`. Off-diagonal entries must
    /// be finite probabilities, and the two entries of every pair must sum to one
    /// within `PROBABILITY_TOLERANCE`. Nothing is truncated, padded or clamped.
    pub fn from_rows(rows: Vec<Vec<f64>>, expected: usize) -> Result<Self> {
        let malformed = |rows: usize, cols: usize| EloError::MalformedMatrix { expected, rows, cols };

        if rows.len() != expected {
            let cols = rows.first().map_or(0, Vec::len);
            return Err(malformed(rows.len(), cols));
        }

        let mut values = Vec::with_capacity(expected * expected);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != expected {
                return Err(malformed(expected, row.len()));
            }
            for (j, &value) in row.iter().enumerate() {
                if i != j && !(value.is_finite() && (0.0..=1.0).contains(&value)) {
                    return Err(EloError::MatrixEntryOutOfRange { row: i, col: j, value });
                }
            }
            values.extend(row);
        }

        for i in 0..expected {
            for j in (i + 1)..expected {
                let sum = values[i * expected + j] + values[j * expected + i];
                if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
                    return Err(EloError::MatrixNotComplementary { row: i, col: j, sum });
                }
            }
        }

        Ok(ExpectedScoreMatrix { size: expected, values })
    }

    /// Number of items (rows).
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.size + j]
    }

    pub(crate) fn set(&mut self, i: usize, j: usize, value: f64) {
        self.values[i * self.size + j] = value;
    }

    /// Copy out as nested rows, for persistence.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.values.chunks(self.size.max(1)).map(<[f64]>::to_vec).collect()
    }
}
