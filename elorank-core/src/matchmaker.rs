/// Matchmaking session driver.
///
/// The caller supplies a `Judge` that decides each presented pair. The
/// matchmaker decides which pair comes next, applies every verdict to the
/// `RatingStore` immediately and keeps the `Session` counter current.
use rand::rngs::ThreadRng;
use rand::Rng;

use crate::constants::{DEFAULT_BATCH_SIZE, DEFAULT_K_FACTOR, DEFAULT_MIN_COMPARISONS};
use crate::error::{EloError, Result};
use crate::pairing::{
    generate_coverage_pairings_indexed, get_phase, select_refinement_batch_indexed, Phase,
};
use crate::session::Session;
use crate::store::RatingStore;
use crate::types::{IndexedPair, Outcome, RatingUpdate};

/// What the judge decided for a presented pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    FirstWins,
    SecondWins,
    Draw,
    /// End the session. Nothing is applied for this pair.
    Stop,
}

impl Verdict {
    fn outcome(self) -> Option<Outcome> {
        match self {
            Verdict::FirstWins => Some(Outcome::FirstWins),
            Verdict::SecondWins => Some(Outcome::SecondWins),
            Verdict::Draw => Some(Outcome::Draw),
            Verdict::Stop => None,
        }
    }
}

/// Source of judgments: a person at a prompt, a script, a test.
pub trait Judge {
    /// Decide between `first` and `second`. May block for as long as it likes.
    fn judge(&mut self, first: &str, second: &str) -> Verdict;

    /// Called after a verdict has been applied to the store.
    fn observe(&mut self, _update: &RatingUpdate) {}

    /// Called when the matchmaker enters a new phase.
    fn phase_changed(&mut self, _phase: Phase) {}
}

impl<F> Judge for F
where
    F: FnMut(&str, &str) -> Verdict,
{
    fn judge(&mut self, first: &str, second: &str) -> Verdict {
        self(first, second)
    }
}

/// Configuration for the matchmaker.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchmakerConfig {
    /// Fixed for the whole session.
    pub k_factor: f64,
    /// Comparisons every item needs before refinement starts.
    pub min_comparisons: usize,
    /// Pairs selected per refinement batch.
    pub batch_size: usize,
}

impl Default for MatchmakerConfig {
    fn default() -> Self {
        MatchmakerConfig {
            k_factor: DEFAULT_K_FACTOR,
            min_comparisons: DEFAULT_MIN_COMPARISONS,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl MatchmakerConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.k_factor.is_finite() && self.k_factor > 0.0) {
            return Err(EloError::InvalidConfig(format!(
                "K-factor must be a positive number, got {}",
                self.k_factor
            )));
        }
        if self.batch_size == 0 {
            return Err(EloError::InvalidConfig("batch size must be at least 1".to_string()));
        }
        Ok(())
    }
}

pub struct Matchmaker<R = ThreadRng> {
    config: MatchmakerConfig,
    rng: R,
}

impl Matchmaker<ThreadRng> {
    pub fn new(config: MatchmakerConfig) -> Result<Self> {
        Matchmaker::with_rng(config, rand::rng())
    }
}

impl<R: Rng> Matchmaker<R> {
    /// Use a caller-provided RNG, e.g. a seeded one for reproducible coverage rounds.
    pub fn with_rng(config: MatchmakerConfig, rng: R) -> Result<Self> {
        config.validate()?;
        Ok(Matchmaker { config, rng })
    }

    pub fn config(&self) -> &MatchmakerConfig {
        &self.config
    }

    /// Current phase. A pure function of the store's counts and the stop signal.
    pub fn phase(&self, store: &RatingStore, session: &Session) -> Phase {
        let counts: Vec<usize> = store.items().iter().map(|item| item.comparisons).collect();
        get_phase(&counts, self.config.min_comparisons, session.is_stopped())
    }

    /// Run coverage, then refinement, until the stop signal is raised.
    ///
    /// Returns `Phase::Stopped`. Errors abort the session; judgments applied
    /// before the error are kept.
    pub fn run(&mut self, store: &mut RatingStore, session: &mut Session, judge: &mut impl Judge) -> Result<Phase> {
        let mut last_phase = None;
        loop {
            let phase = self.phase(store, session);
            if last_phase != Some(phase) {
                judge.phase_changed(phase);
                last_phase = Some(phase);
            }
            match phase {
                Phase::Coverage => self.run_coverage_round(store, session, judge)?,
                Phase::Refinement => {
                    self.run_refinement_batch(store, session, judge)?;
                }
                Phase::Stopped => return Ok(Phase::Stopped),
            }
        }
    }

    /// Present one shuffled round covering every item.
    pub fn run_coverage_round(
        &mut self,
        store: &mut RatingStore,
        session: &mut Session,
        judge: &mut impl Judge,
    ) -> Result<()> {
        let pairs = generate_coverage_pairings_indexed(store.len(), &mut self.rng);
        self.present_all(&pairs, store, session, judge)?;
        Ok(())
    }

    /// Build a batch from the current matrix and present it. The batch is not
    /// rebuilt while it is being worked through, but every verdict is applied
    /// as soon as it arrives. Returns the number of verdicts applied.
    pub fn run_refinement_batch(
        &mut self,
        store: &mut RatingStore,
        session: &mut Session,
        judge: &mut impl Judge,
    ) -> Result<usize> {
        let pairs = select_refinement_batch_indexed(store.matrix(), self.config.batch_size);
        self.present_all(&pairs, store, session, judge)
    }

    fn present_all(
        &mut self,
        pairs: &[IndexedPair],
        store: &mut RatingStore,
        session: &mut Session,
        judge: &mut impl Judge,
    ) -> Result<usize> {
        let mut applied = 0;
        for &(a, b) in pairs {
            if !self.present(a, b, store, session, judge)? {
                break;
            }
            applied += 1;
        }
        Ok(applied)
    }

    /// Ask the judge about one pair. Returns `false` once the session is stopped.
    fn present(
        &mut self,
        a: usize,
        b: usize,
        store: &mut RatingStore,
        session: &mut Session,
        judge: &mut impl Judge,
    ) -> Result<bool> {
        if session.is_stopped() {
            return Ok(false);
        }

        let first = store.items()[a].name.clone();
        let second = store.items()[b].name.clone();

        let Some(outcome) = judge.judge(&first, &second).outcome() else {
            session.stop();
            return Ok(false);
        };

        let update = store.apply_outcome(&first, &second, outcome, self.config.k_factor)?;
        session.record_comparison();
        judge.observe(&update);
        Ok(true)
    }
}
