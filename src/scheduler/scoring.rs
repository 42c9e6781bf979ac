//! Candidate scoring.
//!
//! Among feasible placements that share the earliest start, the engine
//! keeps the one with the lowest score. The score is produced by an
//! injected function so callers can plug in their own objective.

use std::fmt;
use std::sync::Arc;

use crate::models::{Court, Minutes, SessionRequest, TimeWindow};

/// Candidate score. Lower is better.
pub type Score = i64;

/// Signature of a scoring function.
pub type ScoreFn = dyn Fn(&Candidate<'_>) -> Score + Send + Sync;

/// A feasible placement offered to the scorer.
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    /// Request being placed.
    pub request: &'a SessionRequest,
    /// Court the session would use.
    pub court: &'a Court,
    /// Session interval.
    pub window: TimeWindow,
    /// Chosen participant IDs.
    pub participants: Vec<&'a str>,
    /// Court minutes left unusable next to this slot.
    pub fragmentation: Minutes,
    /// Summed cost of the chosen participants.
    pub participant_cost: u64,
}

/// Shareable scoring function.
#[derive(Clone)]
pub struct Scorer(Arc<ScoreFn>);

impl Scorer {
    /// Wraps a scoring closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Candidate<'_>) -> Score + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Scores a candidate.
    pub fn score(&self, candidate: &Candidate<'_>) -> Score {
        (self.0)(candidate)
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(default_score)
    }
}

impl fmt::Debug for Scorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Scorer(..)")
    }
}

/// Fragmentation plus participant cost.
pub fn default_score(candidate: &Candidate<'_>) -> Score {
    let total = u64::from(candidate.fragmentation).saturating_add(candidate.participant_cost);
    Score::try_from(total).unwrap_or(Score::MAX)
}

/// Minutes wasted by a gap that is too short to hold a session of
/// `duration`. Zero-length gaps and gaps that still fit a session waste
/// nothing.
pub(crate) fn wasted(gap: Minutes, duration: Minutes) -> Minutes {
    if gap > 0 && gap < duration {
        gap
    } else {
        0
    }
}
