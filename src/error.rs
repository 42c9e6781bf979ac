//! Error types for scheduling, configuration, and tournament planning.

use thiserror::Error;

use crate::validation::ValidationError;

/// Hard failures of a scheduling call.
///
/// Per-request infeasibility is never an error; it is reported through
/// [`Schedule::unscheduled`](crate::models::Schedule::unscheduled).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchedulingError {
    /// Inputs are malformed; no schedule is produced.
    #[error("invalid input: {}", join_errors(.0))]
    InvalidInput(Vec<ValidationError>),
    /// The caller's step budget or cancellation check stopped the run.
    #[error("scheduling aborted after {processed} requests")]
    Aborted {
        /// Requests fully processed before stopping.
        processed: usize,
    },
}

impl SchedulingError {
    /// Validation issues carried by an `InvalidInput` error.
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            Self::InvalidInput(errors) => errors,
            Self::Aborted { .. } => &[],
        }
    }
}

/// Engine configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Configuration text could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),
    /// A value is out of range.
    #[error("invalid `{field}`: {message}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },
}

/// Tournament planning errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TournamentError {
    /// Fewer than two teams.
    #[error("at least 2 teams are required, got {0}")]
    NotEnoughTeams(usize),
    /// Two teams share a name.
    #[error("duplicate team name: {0}")]
    DuplicateTeam(String),
    /// No courts to play on.
    #[error("at least 1 court is required")]
    NoCourts,
    /// A team needs at least one squad of two players.
    #[error("at least 2 players per team are required, got {0}")]
    NotEnoughPlayers(u32),
    /// The available time does not fit a single round.
    #[error("{available} minutes is too short for one round of {round} minutes")]
    TooShort {
        /// Minutes available.
        available: u32,
        /// Minutes per round.
        round: u32,
    },
}

/// Convenience result for scheduling calls.
pub type ScheduleResult<T> = Result<T, SchedulingError>;

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
