use std::collections::{BTreeMap, HashMap};

use crate::error::{EloError, Result};

/// A single ranked item.
///
/// `extra` carries whatever additional fields the caller loaded alongside the
/// item. The core never reads it; it only travels with the item so that it can
/// be written back out unchanged.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Item {
    pub name: String,
    pub rating: f64,
    pub comparisons: usize,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "BTreeMap::is_empty"))]
    pub extra: BTreeMap<String, String>,
}

impl Item {
    /// A fresh item that has never been compared.
    pub fn new(name: impl Into<String>, rating: f64) -> Self {
        Item {
            name: name.into(),
            rating,
            comparisons: 0,
            extra: BTreeMap::new(),
        }
    }

    /// An item restored from a previous session.
    pub fn with_comparisons(name: impl Into<String>, rating: f64, comparisons: usize) -> Self {
        Item {
            comparisons,
            ..Item::new(name, rating)
        }
    }
}

/// Result of a single comparison, from the first item's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    FirstWins,
    SecondWins,
    Draw,
}

impl Outcome {
    /// Actual scores (first, second).
    pub fn scores(self) -> (f64, f64) {
        match self {
            Outcome::FirstWins => (1.0, 0.0),
            Outcome::SecondWins => (0.0, 1.0),
            Outcome::Draw => (0.5, 0.5),
        }
    }
}

/// A validated pair of actual scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Judgment {
    score_a: f64,
    score_b: f64,
}

impl Judgment {
    /// Accepts only (1, 0), (0, 1) and (0.5, 0.5).
    pub fn new(score_a: f64, score_b: f64) -> Result<Self> {
        let valid = (score_a == 1.0 && score_b == 0.0)
            || (score_a == 0.0 && score_b == 1.0)
            || (score_a == 0.5 && score_b == 0.5);
        if !valid {
            return Err(EloError::InvalidJudgment { score_a, score_b });
        }
        Ok(Judgment { score_a, score_b })
    }

    pub fn score_a(&self) -> f64 {
        self.score_a
    }

    pub fn score_b(&self) -> f64 {
        self.score_b
    }
}

impl From<Outcome> for Judgment {
    fn from(outcome: Outcome) -> Self {
        let (score_a, score_b) = outcome.scores();
        Judgment { score_a, score_b }
    }
}

/// Ratings of both sides before and after an applied judgment.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RatingUpdate {
    pub first: String,
    pub second: String,
    pub first_before: f64,
    pub first_after: f64,
    pub second_before: f64,
    pub second_after: f64,
}

impl RatingUpdate {
    pub fn first_change(&self) -> f64 {
        self.first_after - self.first_before
    }

    pub fn second_change(&self) -> f64 {
        self.second_after - self.second_before
    }
}

/// Movement in the standings since a previous snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RankChange {
    /// Same position, or nothing to compare against.
    Unchanged,
    /// Positive = moved up the table.
    Moved(i64),
}

impl RankChange {
    pub fn from_delta(delta: i64) -> Self {
        if delta == 0 {
            RankChange::Unchanged
        } else {
            RankChange::Moved(delta)
        }
    }

    pub fn delta(self) -> i64 {
        match self {
            RankChange::Unchanged => 0,
            RankChange::Moved(d) => d,
        }
    }
}

/// Per-item position and change report produced by `RatingStore::rank_and_delta`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankDelta {
    pub name: String,
    /// 1-based position, 1 = highest rating.
    pub rank: usize,
    pub rating: f64,
    pub rank_change: RankChange,
    pub elo_change: f64,
}

/// Frozen (name, rating) list, in positional order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RatingSnapshot {
    pub entries: Vec<(String, f64)>,
}

/// A pairing: two item names to be compared.
pub type Pair = (String, String);

/// Internal indexed pair (positions, not names).
pub(crate) type IndexedPair = (usize, usize);

/// Maps between item names and their fixed 0..N positions.
#[derive(Debug, Clone)]
pub(crate) struct NameMap {
    name_to_idx: HashMap<String, usize>,
}

impl NameMap {
    pub fn from_items(items: &[Item]) -> Result<Self> {
        let mut name_to_idx = HashMap::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            if item.name.is_empty() {
                return Err(EloError::EmptyName(idx));
            }
            if name_to_idx.insert(item.name.clone(), idx).is_some() {
                return Err(EloError::DuplicateItem(item.name.clone()));
            }
        }
        Ok(NameMap { name_to_idx })
    }

    pub fn to_idx(&self, name: &str) -> Result<usize> {
        self.name_to_idx
            .get(name)
            .copied()
            .ok_or_else(|| EloError::UnknownItem(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_judgment_accepts_win_loss_draw() {
        assert!(Judgment::new(1.0, 0.0).is_ok());
        assert!(Judgment::new(0.0, 1.0).is_ok());
        assert!(Judgment::new(0.5, 0.5).is_ok());
    }

    #[test]
    fn test_judgment_rejects_other_scores() {
        assert_eq!(
            Judgment::new(0.7, 0.3),
            Err(EloError::InvalidJudgment { score_a: 0.7, score_b: 0.3 })
        );
        assert!(Judgment::new(1.0, 1.0).is_err());
        assert!(Judgment::new(0.5, 0.0).is_err());
        assert!(Judgment::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_outcome_scores_sum_to_one() {
        for outcome in [Outcome::FirstWins, Outcome::SecondWins, Outcome::Draw] {
            let (a, b) = outcome.scores();
            assert_eq!(a + b, 1.0);
        }
    }

    #[test]
    fn test_name_map_rejects_duplicates_and_empty_names() {
        let dup = vec![Item::new("a", 1000.0), Item::new("b", 1000.0), Item::new("a", 1000.0)];
        assert_eq!(NameMap::from_items(&dup).unwrap_err(), EloError::DuplicateItem("a".into()));

        let empty = vec![Item::new("a", 1000.0), Item::new("", 1000.0)];
        assert_eq!(NameMap::from_items(&empty).unwrap_err(), EloError::EmptyName(1));
    }

    #[test]
    fn test_name_map_is_case_sensitive() {
        let items = vec![Item::new("Alien", 1000.0), Item::new("alien", 1000.0)];
        let map = NameMap::from_items(&items).unwrap();
        assert_eq!(map.to_idx("Alien").unwrap(), 0);
        assert_eq!(map.to_idx("alien").unwrap(), 1);
        assert_eq!(map.to_idx("ALIEN").unwrap_err(), EloError::UnknownItem("ALIEN".into()));
    }

    #[test]
    fn test_rank_change_from_delta() {
        assert_eq!(RankChange::from_delta(0), RankChange::Unchanged);
        assert_eq!(RankChange::from_delta(-2), RankChange::Moved(-2));
        assert_eq!(RankChange::Moved(3).delta(), 3);
    }
}
