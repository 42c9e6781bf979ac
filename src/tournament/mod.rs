//! Team tournament planning.
//!
//! Builds match rounds for teams sharing a set of courts, reports how
//! evenly teams play, and converts plans into session requests for the
//! court scheduler.
//!
//! # Squads
//!
//! Doubles are played by two players, so a team of `n` players fields
//! `n / 2` squads. A squad is the unit that occupies a court; squads of
//! the same team can play simultaneously on different courts.

mod planner;
mod stats;

pub use planner::{
    Pairing, Round, TimedPlan, TournamentPlanner, BREAK_MINUTES, PLAY_MINUTES, ROUND_MINUTES,
};
pub use stats::{ParticipationStats, TimedStats};
