//! Schedule (solution) model.
//!
//! A schedule is the engine's answer to one scheduling call: the sessions
//! that were placed, the requests that could not be placed (with a reason),
//! and warnings about inputs that were left out.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Minutes, TimeWindow};

/// The result of one scheduling call.
///
/// Immutable once returned; callers re-run the engine to incorporate
/// changed inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Scheduling horizon.
    pub horizon: TimeWindow,
    /// Placed sessions, ordered by start, court id, session id.
    pub assignments: Vec<Assignment>,
    /// Requests that could not be placed.
    pub unscheduled: Vec<Unscheduled>,
    /// Inputs excluded from scheduling.
    pub warnings: Vec<InputWarning>,
}

/// A session placed on a court at a time with bound participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Session id (the originating request id).
    pub session_id: String,
    /// Court the session is played on.
    pub court_id: String,
    /// Time interval [start, end).
    pub window: TimeWindow,
    /// Bound participant ids.
    pub participants: Vec<String>,
}

/// A request the engine could not place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unscheduled {
    /// Request id.
    pub request_id: String,
    /// Why it could not be placed.
    pub reason: UnscheduledReason,
}

/// Reason codes for unscheduled requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnscheduledReason {
    /// No court had a free slot of the requested length.
    NoCourtAvailable,
    /// Court slots existed but not enough participants could play in any.
    NoEligibleParticipants,
    /// Participants were free but at their daily session cap.
    DailyCapExceeded,
}

/// A non-fatal problem with the inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputWarning {
    /// The participant has no availability usable within the horizon and
    /// court opening hours.
    ParticipantExcluded {
        /// Excluded participant.
        participant_id: String,
    },
    /// The court has no open window within the horizon.
    CourtExcluded {
        /// Excluded court.
        court_id: String,
    },
}

impl Assignment {
    /// Creates a new assignment.
    pub fn new(
        session_id: impl Into<String>,
        court_id: impl Into<String>,
        window: TimeWindow,
        participants: Vec<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            court_id: court_id.into(),
            window,
            participants,
        }
    }

    /// Session length in minutes.
    #[inline]
    pub fn duration(&self) -> Minutes {
        self.window.duration()
    }

    /// Whether a participant plays in this session.
    pub fn involves(&self, participant_id: &str) -> bool {
        self.participants.iter().any(|p| p == participant_id)
    }
}

impl Unscheduled {
    /// Creates a new unscheduled entry.
    pub fn new(request_id: impl Into<String>, reason: UnscheduledReason) -> Self {
        Self {
            request_id: request_id.into(),
            reason,
        }
    }
}

impl Schedule {
    /// Creates an empty schedule for a horizon.
    pub fn new(horizon: TimeWindow) -> Self {
        Self {
            horizon,
            ..Self::default()
        }
    }

    /// Adds an assignment.
    pub fn add_assignment(&mut self, assignment: Assignment) {
        self.assignments.push(assignment);
    }

    /// Sorts assignments into their canonical order.
    pub fn sort(&mut self) {
        self.assignments.sort_by(|a, b| {
            a.window
                .start
                .cmp(&b.window.start)
                .then_with(|| a.court_id.cmp(&b.court_id))
                .then_with(|| a.session_id.cmp(&b.session_id))
        });
    }

    /// Whether every request was placed.
    pub fn is_complete(&self) -> bool {
        self.unscheduled.is_empty()
    }

    /// Number of assignments.
    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }

    /// Latest end time across all assignments.
    pub fn last_end(&self) -> Option<Minutes> {
        self.assignments.iter().map(|a| a.window.end).max()
    }

    /// Finds the assignment for a session.
    pub fn assignment_for_session(&self, session_id: &str) -> Option<&Assignment> {
        self.assignments
            .iter()
            .find(|a| a.session_id == session_id)
    }

    /// Returns all assignments on a court.
    pub fn assignments_for_court(&self, court_id: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.court_id == court_id)
            .collect()
    }

    /// Returns all assignments a participant plays in.
    pub fn assignments_for_participant(&self, participant_id: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.involves(participant_id))
            .collect()
    }

    /// Reason a request went unscheduled, if it did.
    pub fn unscheduled_reason(&self, request_id: &str) -> Option<UnscheduledReason> {
        self.unscheduled
            .iter()
            .find(|u| u.request_id == request_id)
            .map(|u| u.reason)
    }

    /// Sessions per participant (participants with at least one session).
    pub fn sessions_per_participant(&self) -> BTreeMap<String, u32> {
        let mut counts = BTreeMap::new();
        for a in &self.assignments {
            for p in &a.participants {
                *counts.entry(p.clone()).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Ids of participants excluded with a warning.
    pub fn excluded_participants(&self) -> Vec<&str> {
        self.warnings
            .iter()
            .filter_map(|w| match w {
                InputWarning::ParticipantExcluded { participant_id } => {
                    Some(participant_id.as_str())
                }
                InputWarning::CourtExcluded { .. } => None,
            })
            .collect()
    }
}
