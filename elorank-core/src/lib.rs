/// elorank-core: Pure-computation Elo rating and matchmaking engine.
///
/// Pairwise judgments → Elo ratings → ranked list with movement since last time.
/// No IO, no terminal, no filesystem. Bring your own judge.
///
/// Items are identified by name. The crate assigns each one a fixed position
/// for the expected-score matrix; callers never deal with positions.
///
/// # Quick start
///
/// ```rust
/// use elorank_core::{Item, Matchmaker, MatchmakerConfig, RatingStore, Session, Verdict};
///
/// let items = vec![
///     Item::new("Alien", 1000.0),
///     Item::new("Heat", 1000.0),
///     Item::new("Ran", 1000.0),
/// ];
/// let mut store = RatingStore::new(items, None).unwrap();
/// let mut session = Session::new();
/// let mut matchmaker = Matchmaker::new(MatchmakerConfig::default()).unwrap();
///
/// // A judge that always prefers the shorter name, and stops after 20 verdicts.
/// let mut judged = 0;
/// let mut judge = |first: &str, second: &str| {
///     judged += 1;
///     if judged > 20 {
///         Verdict::Stop
///     } else if first.len() <= second.len() {
///         Verdict::FirstWins
///     } else {
///         Verdict::SecondWins
///     }
/// };
///
/// matchmaker.run(&mut store, &mut session, &mut judge).unwrap();
///
/// for row in store.rank_and_delta(None) {
///     println!("{:>2}. {} {:.1}", row.rank, row.name, row.rating);
/// }
/// ```

pub mod constants;
pub mod engine;
pub mod error;
pub mod matchmaker;
pub mod matrix;
pub mod pairing;
pub mod session;
pub mod store;
pub mod types;

// Re-export primary public API at crate root.
pub use engine::{build_matrix, expected_score, refresh_matrix_row_col, update_rating};
pub use error::{EloError, Result};
pub use matchmaker::{Judge, Matchmaker, MatchmakerConfig, Verdict};
pub use matrix::ExpectedScoreMatrix;
pub use pairing::{
    generate_coverage_pairings, get_phase, informativeness_distance, select_refinement_batch, Phase,
};
pub use session::Session;
pub use store::RatingStore;
pub use types::{Item, Judgment, Outcome, Pair, RankChange, RankDelta, RatingSnapshot, RatingUpdate};
