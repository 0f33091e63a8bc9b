/// Rating store: per-item ratings, comparison counts and the expected-score cache.
///
/// `apply_judgment` is the only way to change a rating, a count or the matrix,
/// which keeps the matrix a faithful function of the rating vector.
use std::collections::HashMap;

use crate::engine::{build_matrix, refresh_matrix_row_col, update_rating};
use crate::error::{EloError, Result};
use crate::matrix::ExpectedScoreMatrix;
use crate::types::{Item, Judgment, NameMap, Outcome, RankChange, RankDelta, RatingSnapshot, RatingUpdate};

#[derive(Debug, Clone)]
pub struct RatingStore {
    names: NameMap,
    items: Vec<Item>,
    /// Same values as `items[i].rating`, kept contiguous for the engine.
    ratings: Vec<f64>,
    matrix: ExpectedScoreMatrix,
}

impl RatingStore {
    /// Build a store for a fixed item list.
    ///
    /// Positions are assigned from the order of `items` and never change. When
    /// `matrix` is `None` it is built from the ratings; a supplied matrix must
    /// be exactly `n × n`.
    pub fn new(items: Vec<Item>, matrix: Option<ExpectedScoreMatrix>) -> Result<Self> {
        if items.len() < 2 {
            return Err(EloError::TooFewItems(items.len()));
        }
        let names = NameMap::from_items(&items)?;
        if let Some(item) = items.iter().find(|item| !item.rating.is_finite()) {
            return Err(EloError::NonFiniteRating {
                name: item.name.clone(),
                rating: item.rating,
            });
        }
        let ratings: Vec<f64> = items.iter().map(|item| item.rating).collect();

        let matrix = match matrix {
            Some(m) if m.len() == items.len() => m,
            Some(m) => {
                return Err(EloError::MalformedMatrix {
                    expected: items.len(),
                    rows: m.len(),
                    cols: m.len(),
                })
            }
            None => build_matrix(&ratings),
        };

        Ok(RatingStore {
            names,
            items,
            ratings,
            matrix,
        })
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Current `(rating, comparisons)` for `name`.
    pub fn get(&self, name: &str) -> Result<(f64, usize)> {
        let idx = self.names.to_idx(name)?;
        Ok((self.ratings[idx], self.items[idx].comparisons))
    }

    /// Fixed position of `name`.
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.names.to_idx(name)
    }

    /// Items in positional order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn ratings(&self) -> &[f64] {
        &self.ratings
    }

    pub fn matrix(&self) -> &ExpectedScoreMatrix {
        &self.matrix
    }

    /// Lowest comparison count across all items.
    pub fn min_comparisons(&self) -> usize {
        self.items.iter().map(|item| item.comparisons).min().unwrap_or(0)
    }

    /// Apply one judged comparison between `name_a` and `name_b`.
    ///
    /// All validation happens before the first write, so on error the store is
    /// untouched. On success both ratings move, both counts go up by one and the
    /// two affected matrix rows and columns are refreshed.
    pub fn apply_judgment(
        &mut self,
        name_a: &str,
        name_b: &str,
        score_a: f64,
        score_b: f64,
        k: f64,
    ) -> Result<RatingUpdate> {
        let judgment = Judgment::new(score_a, score_b)?;
        if !(k.is_finite() && k > 0.0) {
            return Err(EloError::InvalidConfig(format!("K-factor must be positive, got {k}")));
        }
        let a = self.names.to_idx(name_a)?;
        let b = self.names.to_idx(name_b)?;
        if a == b {
            return Err(EloError::SelfComparison(name_a.to_string()));
        }
        Ok(self.apply_indexed(a, b, judgment, k))
    }

    /// Same as `apply_judgment`, taking a typed outcome.
    pub fn apply_outcome(&mut self, name_a: &str, name_b: &str, outcome: Outcome, k: f64) -> Result<RatingUpdate> {
        let (score_a, score_b) = outcome.scores();
        self.apply_judgment(name_a, name_b, score_a, score_b, k)
    }

    /// Infallible part of the update. Indices must be valid and distinct.
    pub(crate) fn apply_indexed(&mut self, a: usize, b: usize, judgment: Judgment, k: f64) -> RatingUpdate {
        let expected_a = self.matrix.get(a, b);
        let expected_b = 1.0 - expected_a;

        let before_a = self.ratings[a];
        let before_b = self.ratings[b];
        let after_a = update_rating(before_a, expected_a, judgment.score_a(), k);
        let after_b = update_rating(before_b, expected_b, judgment.score_b(), k);

        self.ratings[a] = after_a;
        self.ratings[b] = after_b;
        self.items[a].rating = after_a;
        self.items[b].rating = after_b;
        self.items[a].comparisons += 1;
        self.items[b].comparisons += 1;

        refresh_matrix_row_col(&mut self.matrix, &self.ratings, a, b);

        RatingUpdate {
            first: self.items[a].name.clone(),
            second: self.items[b].name.clone(),
            first_before: before_a,
            first_after: after_a,
            second_before: before_b,
            second_after: after_b,
        }
    }

    /// Copy of the current ratings, to diff against later.
    pub fn snapshot(&self) -> RatingSnapshot {
        RatingSnapshot {
            entries: self
                .items
                .iter()
                .map(|item| (item.name.clone(), item.rating))
                .collect(),
        }
    }

    /// Items sorted by rating, highest first. Equal ratings keep positional order.
    pub fn standings(&self) -> Vec<&Item> {
        rank_order(&self.ratings)
            .into_iter()
            .map(|idx| &self.items[idx])
            .collect()
    }

    /// Current ranks plus movement since `previous`, in standings order.
    ///
    /// Without a snapshot every item reports `RankChange::Unchanged` and an
    /// `elo_change` of zero. Items the snapshot does not know about are treated
    /// the same way.
    pub fn rank_and_delta(&self, previous: Option<&RatingSnapshot>) -> Vec<RankDelta> {
        let previous_ranks: HashMap<&str, (usize, f64)> = match previous {
            Some(snapshot) => {
                let ratings: Vec<f64> = snapshot.entries.iter().map(|(_, r)| *r).collect();
                rank_order(&ratings)
                    .into_iter()
                    .enumerate()
                    .map(|(pos, idx)| {
                        let (name, rating) = &snapshot.entries[idx];
                        (name.as_str(), (pos + 1, *rating))
                    })
                    .collect()
            }
            None => HashMap::new(),
        };

        rank_order(&self.ratings)
            .into_iter()
            .enumerate()
            .map(|(pos, idx)| {
                let item = &self.items[idx];
                let rank = pos + 1;
                let (rank_change, elo_change) = match previous_ranks.get(item.name.as_str()) {
                    Some(&(prev_rank, prev_rating)) => (
                        RankChange::from_delta(prev_rank as i64 - rank as i64),
                        item.rating - prev_rating,
                    ),
                    None => (RankChange::Unchanged, 0.0),
                };
                RankDelta {
                    name: item.name.clone(),
                    rank,
                    rating: item.rating,
                    rank_change,
                    elo_change,
                }
            })
            .collect()
    }
}

/// Positions sorted by rating descending. Stable, so ties stay in positional order.
fn rank_order(ratings: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..ratings.len()).collect();
    order.sort_by(|&a, &b| ratings[b].total_cmp(&ratings[a]));
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::expected_score;

    const K: f64 = 32.0;

    fn store(ratings: &[(&str, f64)]) -> RatingStore {
        let items = ratings.iter().map(|&(name, r)| Item::new(name, r)).collect();
        RatingStore::new(items, None).unwrap()
    }

    fn assert_complementary(store: &RatingStore) {
        let m = store.matrix();
        for i in 0..store.len() {
            for j in 0..store.len() {
                if i != j {
                    assert!((m.get(i, j) + m.get(j, i) - 1.0).abs() < 1e-9, "m[{i}][{j}] + m[{j}][{i}] != 1");
                }
            }
        }
    }

    #[test]
    fn test_requires_two_items() {
        let err = RatingStore::new(vec![Item::new("only", 1000.0)], None).unwrap_err();
        assert_eq!(err, EloError::TooFewItems(1));
    }

    #[test]
    fn test_rejects_mismatched_matrix() {
        let items = vec![Item::new("a", 1000.0), Item::new("b", 1000.0), Item::new("c", 1000.0)];
        let two_by_two = build_matrix(&[1000.0, 1000.0]);
        let err = RatingStore::new(items, Some(two_by_two)).unwrap_err();
        assert_eq!(err, EloError::MalformedMatrix { expected: 3, rows: 2, cols: 2 });
    }

    #[test]
    fn test_uses_supplied_matrix_verbatim() {
        let items = vec![Item::new("a", 1000.0), Item::new("b", 1000.0)];
        let persisted = ExpectedScoreMatrix::from_rows(vec![vec![0.0, 0.7], vec![0.3, 0.0]], 2).unwrap();
        let s = RatingStore::new(items, Some(persisted.clone())).unwrap();
        assert_eq!(s.matrix(), &persisted);
    }

    #[test]
    fn test_rejects_non_finite_ratings() {
        let items = vec![Item::new("a", f64::NAN), Item::new("b", 1000.0), Item::new("c", f64::INFINITY)];
        match RatingStore::new(items, None) {
            Err(EloError::NonFiniteRating { name, rating }) => {
                assert_eq!(name, "a");
                assert!(rating.is_nan());
            }
            other => panic!("expected NonFiniteRating, got {other:?}"),
        }

        let items = vec![Item::new("a", 1000.0), Item::new("b", f64::NEG_INFINITY)];
        assert!(matches!(
            RatingStore::new(items, None),
            Err(EloError::NonFiniteRating { ref name, .. }) if name == "b"
        ));
    }

    #[test]
    fn test_index_of_follows_input_order() {
        let s = store(&[("Ran", 1200.0), ("Alien", 1000.0), ("Heat", 1100.0)]);
        assert_eq!(s.index_of("Ran").unwrap(), 0);
        assert_eq!(s.index_of("Heat").unwrap(), 2);
        assert_eq!(s.items()[s.index_of("Alien").unwrap()].name, "Alien");
        assert_eq!(s.index_of("Brazil").unwrap_err(), EloError::UnknownItem("Brazil".into()));
    }

    #[test]
    fn test_get_unknown_item() {
        let s = store(&[("a", 1000.0), ("b", 1000.0)]);
        assert_eq!(s.get("a").unwrap(), (1000.0, 0));
        assert_eq!(s.get("zzz").unwrap_err(), EloError::UnknownItem("zzz".into()));
    }

    #[test]
    fn test_win_moves_ratings_and_counts() {
        let mut s = store(&[("a", 1200.0), ("b", 1000.0), ("c", 1100.0)]);
        let update = s.apply_judgment("a", "b", 1.0, 0.0, K).unwrap();

        let (ra, ca) = s.get("a").unwrap();
        let (rb, cb) = s.get("b").unwrap();
        assert!(ra > 1200.0);
        assert!(rb < 1000.0);
        assert_eq!((ca, cb), (1, 1));
        assert_eq!(s.get("c").unwrap(), (1100.0, 0));
        assert!((update.first_change() + update.second_change()).abs() < 1e-9);
        assert_complementary(&s);
    }

    #[test]
    fn test_scenario_three_equal_items() {
        let mut s = store(&[("A", 1500.0), ("B", 1500.0), ("C", 1500.0)]);

        s.apply_judgment("A", "B", 1.0, 0.0, K).unwrap();
        assert_eq!(s.get("A").unwrap(), (1516.0, 1));
        assert_eq!(s.get("B").unwrap(), (1484.0, 1));

        s.apply_judgment("A", "C", 0.5, 0.5, K).unwrap();
        let (ra, ca) = s.get("A").unwrap();
        let (rc, cc) = s.get("C").unwrap();
        assert!((ra - 1515.2637).abs() < 1e-3, "A = {ra}");
        assert!((rc - 1500.7363).abs() < 1e-3, "C = {rc}");
        assert_eq!((ca, cc), (2, 1));

        // The cache tracks ratings exactly, including pairs neither judgment named.
        assert_eq!(s.matrix(), &build_matrix(s.ratings()));
        let (p_bc, _) = expected_score(1484.0, rc);
        assert!((s.matrix().get(1, 2) - p_bc).abs() < 1e-12);
        assert_complementary(&s);
    }

    #[test]
    fn test_expected_score_read_from_matrix() {
        // A persisted matrix wins over the ratings until the pair is refreshed.
        let items = vec![Item::new("a", 1000.0), Item::new("b", 1000.0)];
        let persisted = ExpectedScoreMatrix::from_rows(vec![vec![0.0, 0.75], vec![0.25, 0.0]], 2).unwrap();
        let mut s = RatingStore::new(items, Some(persisted)).unwrap();
        s.apply_judgment("a", "b", 1.0, 0.0, K).unwrap();
        assert_eq!(s.get("a").unwrap().0, 1000.0 + K * 0.25);
        assert_eq!(s.get("b").unwrap().0, 1000.0 - K * 0.25);
    }

    #[test]
    fn test_failed_judgments_leave_store_untouched() {
        let mut s = store(&[("a", 1000.0), ("b", 1050.0)]);
        let before_items = s.items().to_vec();
        let before_matrix = s.matrix().clone();

        assert!(matches!(s.apply_judgment("a", "b", 0.6, 0.4, K), Err(EloError::InvalidJudgment { .. })));
        assert_eq!(s.apply_judgment("a", "nope", 1.0, 0.0, K).unwrap_err(), EloError::UnknownItem("nope".into()));
        assert_eq!(s.apply_judgment("nope", "b", 1.0, 0.0, K).unwrap_err(), EloError::UnknownItem("nope".into()));
        assert_eq!(s.apply_judgment("a", "a", 1.0, 0.0, K).unwrap_err(), EloError::SelfComparison("a".into()));
        assert!(matches!(s.apply_judgment("a", "b", 1.0, 0.0, -1.0), Err(EloError::InvalidConfig(_))));

        assert_eq!(s.items(), before_items.as_slice());
        assert_eq!(s.matrix(), &before_matrix);
    }

    #[test]
    fn test_apply_outcome_second_wins() {
        let mut s = store(&[("a", 1000.0), ("b", 1000.0)]);
        s.apply_outcome("a", "b", Outcome::SecondWins, K).unwrap();
        assert_eq!(s.get("a").unwrap(), (984.0, 1));
        assert_eq!(s.get("b").unwrap(), (1016.0, 1));
    }

    #[test]
    fn test_rank_and_delta_without_snapshot() {
        let s = store(&[("low", 900.0), ("high", 1900.0), ("mid", 1400.0)]);
        let deltas = s.rank_and_delta(None);
        let names: Vec<&str> = deltas.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["high", "mid", "low"]);
        for (i, d) in deltas.iter().enumerate() {
            assert_eq!(d.rank, i + 1);
            assert_eq!(d.rank_change, RankChange::Unchanged);
            assert_eq!(d.elo_change, 0.0);
        }
    }

    #[test]
    fn test_rank_and_delta_with_snapshot() {
        let mut s = store(&[("a", 1000.0), ("b", 1010.0), ("c", 1200.0)]);
        let before = s.snapshot();
        // a overtakes b
        s.apply_judgment("a", "b", 1.0, 0.0, K).unwrap();

        let deltas = s.rank_and_delta(Some(&before));
        let by_name: HashMap<&str, &RankDelta> = deltas.iter().map(|d| (d.name.as_str(), d)).collect();

        assert_eq!(by_name["c"].rank, 1);
        assert_eq!(by_name["c"].rank_change, RankChange::Unchanged);
        assert_eq!(by_name["c"].elo_change, 0.0);

        assert_eq!(by_name["a"].rank, 2);
        assert_eq!(by_name["a"].rank_change, RankChange::Moved(1));
        assert!(by_name["a"].elo_change > 0.0);

        assert_eq!(by_name["b"].rank, 3);
        assert_eq!(by_name["b"].rank_change, RankChange::Moved(-1));
        assert!(by_name["b"].elo_change < 0.0);
    }

    #[test]
    fn test_ties_keep_positional_order() {
        let s = store(&[("first", 1000.0), ("second", 1000.0), ("top", 1100.0), ("third", 1000.0)]);
        let names: Vec<&str> = s.standings().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["top", "first", "second", "third"]);

        let ranks: Vec<(String, usize)> = s.rank_and_delta(None).into_iter().map(|d| (d.name, d.rank)).collect();
        assert_eq!(ranks[1], ("first".to_string(), 2));
        assert_eq!(ranks[3], ("third".to_string(), 4));
    }

    #[test]
    fn test_extra_payload_carried_through() {
        let mut item = Item::new("a", 1000.0);
        item.extra.insert("Year".into(), "1979".into());
        let mut s = RatingStore::new(vec![item, Item::new("b", 1000.0)], None).unwrap();
        s.apply_judgment("a", "b", 0.5, 0.5, K).unwrap();
        assert_eq!(s.items()[0].extra["Year"], "1979");
    }
}
