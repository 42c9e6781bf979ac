//! Input validation for scheduling calls.
//!
//! Checks the structural integrity of participants, courts, requests and
//! the horizon before any interval arithmetic runs. Detects:
//! - Empty or inverted horizon
//! - Inverted availability / opening windows (`end <= start`)
//! - Empty roster or court list
//! - Duplicate IDs
//! - Malformed requests (zero duration or size, unknown or mis-sized fixed
//!   participant sets, unknown or repeated pool members)
//! - Courts with zero capacity
//!
//! Every problem found is reported, not just the first.

use std::collections::HashSet;
use std::fmt;

use crate::models::{Court, Participant, ParticipantSelection, SessionRequest, TimeWindow};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Horizon end is at or before its start.
    InvertedHorizon,
    /// A participant or court window has `end <= start`.
    InvertedInterval,
    /// No participants were supplied.
    EmptyRoster,
    /// No courts were supplied.
    NoCourts,
    /// Two entities share the same ID.
    DuplicateId,
    /// A request has zero duration or zero participants.
    EmptyRequest,
    /// A fixed set or pool names a participant that doesn't exist.
    UnknownParticipant,
    /// A fixed request's participant list does not match its count.
    ParticipantCountMismatch,
    /// A court cannot host any session.
    ZeroCapacity,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates the inputs of a scheduling call.
///
/// Checks:
/// 1. Horizon is non-empty and not inverted
/// 2. Roster and court list are non-empty
/// 3. No duplicate participant, court, or request IDs
/// 4. No inverted availability or opening windows
/// 5. Courts have positive capacity
/// 6. Requests have positive duration and participant count
/// 7. Fixed requests reference known participants, without repeats, and
///    list exactly `participant_count` of them
/// 8. Open request pools name known participants, without repeats
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(
    participants: &[Participant],
    courts: &[Court],
    requests: &[SessionRequest],
    horizon: &TimeWindow,
) -> ValidationResult {
    let mut errors = Vec::new();

    if horizon.is_inverted() {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvertedHorizon,
            format!(
                "Horizon is empty or inverted: start {} >= end {}",
                horizon.start, horizon.end
            ),
        ));
    }

    if participants.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyRoster,
            "No participants supplied",
        ));
    }
    if courts.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoCourts,
            "No courts supplied",
        ));
    }

    // Participants
    let mut participant_ids = HashSet::new();
    for p in participants {
        if !participant_ids.insert(p.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate participant ID: {}", p.id),
            ));
        }
        if let Some(w) = p.availability.first_inverted() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvertedInterval,
                format!(
                    "Participant '{}' has inverted availability {}..{}",
                    p.id, w.start, w.end
                ),
            ));
        }
    }

    // Courts
    let mut court_ids = HashSet::new();
    for c in courts {
        if !court_ids.insert(c.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate court ID: {}", c.id),
            ));
        }
        if let Some(w) = c.open_hours.first_inverted() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvertedInterval,
                format!(
                    "Court '{}' has inverted open hours {}..{}",
                    c.id, w.start, w.end
                ),
            ));
        }
        if c.capacity == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::ZeroCapacity,
                format!("Court '{}' has zero capacity", c.id),
            ));
        }
    }

    // Requests
    let mut request_ids = HashSet::new();
    for r in requests {
        if !request_ids.insert(r.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate request ID: {}", r.id),
            ));
        }
        if r.duration == 0 || r.participant_count == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyRequest,
                format!(
                    "Request '{}' needs a positive duration and participant count",
                    r.id
                ),
            ));
        }
        match &r.selection {
            ParticipantSelection::Fixed(ids) => {
                check_fixed(r, ids, &participant_ids, &mut errors);
            }
            ParticipantSelection::Open { pool: Some(pool) } => {
                let mut seen = HashSet::new();
                for id in pool {
                    if !participant_ids.contains(id.as_str()) {
                        errors.push(ValidationError::new(
                            ValidationErrorKind::UnknownParticipant,
                            format!("Request '{}' pools unknown participant '{}'", r.id, id),
                        ));
                    }
                    if !seen.insert(id.as_str()) {
                        errors.push(ValidationError::new(
                            ValidationErrorKind::DuplicateId,
                            format!("Request '{}' pools participant '{}' twice", r.id, id),
                        ));
                    }
                }
            }
            ParticipantSelection::Open { pool: None } => {}
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_fixed(
    request: &SessionRequest,
    ids: &[String],
    known: &HashSet<&str>,
    errors: &mut Vec<ValidationError>,
) {
    let mut seen = HashSet::new();
    for id in ids {
        if !known.contains(id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownParticipant,
                format!(
                    "Request '{}' references unknown participant '{}'",
                    request.id, id
                ),
            ));
        }
        if !seen.insert(id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Request '{}' lists participant '{}' twice", request.id, id),
            ));
        }
    }
    if ids.len() != request.participant_count as usize {
        errors.push(ValidationError::new(
            ValidationErrorKind::ParticipantCountMismatch,
            format!(
                "Request '{}' fixes {} participants but needs {}",
                request.id,
                ids.len(),
                request.participant_count
            ),
        ));
    }
}
