/// Pair selection for the two matchmaking phases.
///
/// Public functions take a `RatingStore` and return `Pair` (name, name).
/// Internal functions use `usize` positions for efficient array indexing.
use rand::seq::SliceRandom;
use rand::Rng;

use crate::matrix::ExpectedScoreMatrix;
use crate::store::RatingStore;
use crate::types::{IndexedPair, Pair};

/// Matchmaking phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    /// Random pairings until every item has enough comparisons.
    Coverage,
    /// Pairs whose expected outcome is closest to a coin flip.
    Refinement,
    /// Stop signal observed. Terminal.
    Stopped,
}

/// Determine the phase the session is in.
///
///   Stopped: the stop signal has been raised, regardless of counts.
///   Coverage: some item has fewer than `min_comparisons` comparisons.
///   Refinement: everything else.
pub fn get_phase(comparison_counts: &[usize], min_comparisons: usize, stopped: bool) -> Phase {
    if stopped {
        return Phase::Stopped;
    }
    if comparison_counts.iter().any(|&c| c < min_comparisons) {
        return Phase::Coverage;
    }
    Phase::Refinement
}

/// Distance of an expected score from an even contest.
pub fn informativeness_distance(expected: f64) -> f64 {
    (expected - 0.5).abs()
}

// ---------------------------------------------------------------------------
// Public pairing functions (work with names)
// ---------------------------------------------------------------------------

/// One coverage round over all items of `store`.
pub fn generate_coverage_pairings(store: &RatingStore, rng: &mut impl Rng) -> Vec<Pair> {
    let items = store.items();
    generate_coverage_pairings_indexed(items.len(), rng)
        .into_iter()
        .map(|(a, b)| (items[a].name.clone(), items[b].name.clone()))
        .collect()
}

/// The `batch_size` pairs of `store` closest to a 50/50 expected outcome.
pub fn select_refinement_batch(store: &RatingStore, batch_size: usize) -> Vec<Pair> {
    let items = store.items();
    select_refinement_batch_indexed(store.matrix(), batch_size)
        .into_iter()
        .map(|(a, b)| (items[a].name.clone(), items[b].name.clone()))
        .collect()
}

// ---------------------------------------------------------------------------
// Internal indexed pairing functions (work with usize positions)
// ---------------------------------------------------------------------------

/// Shuffle, then pair neighbours. With an odd count the leftover item is paired
/// with a uniformly random item from the rest, so every item appears at least
/// once and no pair repeats an item.
pub(crate) fn generate_coverage_pairings_indexed(num_items: usize, rng: &mut impl Rng) -> Vec<IndexedPair> {
    if num_items < 2 {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..num_items).collect();
    order.shuffle(rng);

    let mut pairs: Vec<IndexedPair> = order.chunks_exact(2).map(|c| (c[0], c[1])).collect();

    if num_items % 2 == 1 {
        let leftover = order[num_items - 1];
        let partner = order[rng.random_range(0..num_items - 1)];
        pairs.push((leftover, partner));
    }

    pairs
}

/// Scan every unordered pair `i < j`, rank by `|m[i][j] - 0.5|` ascending and
/// keep the first `batch_size`. The sort is stable, so ties keep `(i, j)`
/// enumeration order and the result is fully determined by the matrix.
pub(crate) fn select_refinement_batch_indexed(matrix: &ExpectedScoreMatrix, batch_size: usize) -> Vec<IndexedPair> {
    let n = matrix.len();
    let mut candidates: Vec<(f64, usize, usize)> = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            candidates.push((informativeness_distance(matrix.get(i, j)), i, j));
        }
    }

    candidates.sort_by(|a, b| a.0.total_cmp(&b.0));

    candidates
        .into_iter()
        .take(batch_size)
        .map(|(_, i, j)| (i, j))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::build_matrix;
    use crate::types::Item;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_phase_stopped_wins() {
        assert_eq!(get_phase(&[0, 0], 2, true), Phase::Stopped);
        assert_eq!(get_phase(&[5, 5], 2, true), Phase::Stopped);
    }

    #[test]
    fn test_phase_coverage_until_minimum() {
        assert_eq!(get_phase(&[2, 1, 3], 2, false), Phase::Coverage);
        assert_eq!(get_phase(&[2, 2, 3], 2, false), Phase::Refinement);
        assert_eq!(get_phase(&[0, 0], 0, false), Phase::Refinement);
    }

    #[test]
    fn test_coverage_even_count_is_a_perfect_matching() {
        let mut rng = StdRng::seed_from_u64(7);
        let pairs = generate_coverage_pairings_indexed(10, &mut rng);
        assert_eq!(pairs.len(), 5);

        let mut seen = vec![0; 10];
        for &(a, b) in &pairs {
            assert_ne!(a, b);
            seen[a] += 1;
            seen[b] += 1;
        }
        assert!(seen.iter().all(|&c| c == 1));
    }

    #[test]
    fn test_coverage_odd_count_pairs_leftover() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let pairs = generate_coverage_pairings_indexed(7, &mut rng);
            assert_eq!(pairs.len(), 4);

            let mut seen = vec![0; 7];
            for &(a, b) in &pairs {
                assert_ne!(a, b);
                seen[a] += 1;
                seen[b] += 1;
            }
            assert!(seen.iter().all(|&c| c >= 1));
            assert_eq!(seen.iter().sum::<usize>(), 8);
        }
    }

    #[test]
    fn test_coverage_two_items() {
        let mut rng = StdRng::seed_from_u64(3);
        let pairs = generate_coverage_pairings_indexed(2, &mut rng);
        assert_eq!(pairs.len(), 1);
        assert_ne!(pairs[0].0, pairs[0].1);
    }

    #[test]
    fn test_refinement_picks_closest_to_even() {
        // 0 and 1 are level, 2 is 10 points off, 3 is far away
        let m = build_matrix(&[1000.0, 1000.0, 1010.0, 1600.0]);
        let batch = select_refinement_batch_indexed(&m, 3);
        assert_eq!(batch, vec![(0, 1), (0, 2), (1, 2)]);
    }

    #[test]
    fn test_refinement_ties_follow_enumeration_order() {
        let m = build_matrix(&[1000.0; 4]);
        let batch = select_refinement_batch_indexed(&m, 10);
        assert_eq!(batch, vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
    }

    #[test]
    fn test_refinement_sorts_unusable_entries_last() {
        let mut m = build_matrix(&[1000.0, 1000.0, 1300.0]);
        m.set(0, 1, f64::NAN);
        m.set(1, 0, f64::NAN);
        let batch = select_refinement_batch_indexed(&m, 3);
        assert_eq!(batch, vec![(0, 2), (1, 2), (0, 1)]);
    }

    #[test]
    fn test_refinement_batch_is_deterministic() {
        let items: Vec<Item> = (0..30)
            .map(|i| Item::new(format!("item{i}"), 1000.0 + (i * 37 % 11) as f64 * 15.0))
            .collect();
        let store = RatingStore::new(items, None).unwrap();
        let first = select_refinement_batch(&store, 10);
        let second = select_refinement_batch(&store, 10);
        assert_eq!(first.len(), 10);
        assert_eq!(first, second);
    }

    #[test]
    fn test_named_coverage_pairings_use_item_names() {
        let items: Vec<Item> = ["x", "y", "z"].iter().map(|n| Item::new(*n, 1000.0)).collect();
        let store = RatingStore::new(items, None).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for (a, b) in generate_coverage_pairings(&store, &mut rng) {
            assert!(["x", "y", "z"].contains(&a.as_str()));
            assert!(["x", "y", "z"].contains(&b.as_str()));
            assert_ne!(a, b);
        }
    }
}
