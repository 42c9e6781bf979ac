//! Greedy court scheduler with bounded repair.
//!
//! # Algorithm
//!
//! 1. Validate inputs; malformed inputs abort with
//!    [`SchedulingError::InvalidInput`].
//! 2. Exclude courts with no open window inside the horizon and
//!    participants with no usable availability (warnings).
//! 3. Sort requests by priority (descending), seed (ascending), input order.
//! 4. For each request, pick the earliest feasible (court, start); ties go
//!    to the lowest score, then the smallest court id. Commit it.
//! 5. Requests that do not fit are recorded with a reason, then offered to
//!    the repair pass (single shifts and pairwise swaps, bounded).
//!
//! # Complexity
//! O(r * c * s * p) for the greedy pass, where r = requests, c = courts,
//! s = candidate starts per court, p = participants considered per slot.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{ScheduleResult, SchedulingError};
use crate::models::{Court, InputWarning, Participant, Schedule, SessionRequest, TimeWindow};
use crate::validation::validate_input;

use super::repair::repair;
use super::scoring::{Candidate, Score, Scorer};
use super::state::{Search, WorkingState};

/// Input container for one scheduling call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleInput {
    /// Roster.
    pub participants: Vec<Participant>,
    /// Courts.
    pub courts: Vec<Court>,
    /// Sessions to place.
    pub requests: Vec<SessionRequest>,
    /// Scheduling horizon.
    pub horizon: TimeWindow,
}

impl ScheduleInput {
    /// Creates an input with no requests.
    pub fn new(participants: Vec<Participant>, courts: Vec<Court>, horizon: TimeWindow) -> Self {
        Self {
            participants,
            courts,
            requests: Vec::new(),
            horizon,
        }
    }

    /// Adds a request.
    pub fn with_request(mut self, request: SessionRequest) -> Self {
        self.requests.push(request);
        self
    }

    /// Adds several requests.
    pub fn with_requests(mut self, requests: impl IntoIterator<Item = SessionRequest>) -> Self {
        self.requests.extend(requests);
        self
    }
}

/// Greedy court scheduler.
///
/// Holds only configuration and the scoring function; every call builds
/// its own working state, so one scheduler can serve many threads.
///
/// # Example
///
/// ```
/// use tennis_schedule::models::{Court, Participant, SessionRequest, TimeWindow};
/// use tennis_schedule::scheduler::CourtScheduler;
///
/// let participants = vec![
///     Participant::new("anna").with_availability(540, 720),
///     Participant::new("ben").with_availability(540, 720),
/// ];
/// let courts = vec![Court::new("C1").with_open_hours(540, 1020)];
/// let requests = vec![SessionRequest::open("S1", 2, 60)];
///
/// let schedule = CourtScheduler::new()
///     .schedule(&participants, &courts, &requests, &TimeWindow::new(480, 1080))
///     .unwrap();
/// assert_eq!(schedule.assignment_count(), 1);
/// assert_eq!(schedule.assignments[0].window, TimeWindow::new(540, 600));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CourtScheduler {
    config: EngineConfig,
    scorer: Scorer,
}

impl CourtScheduler {
    /// Creates a scheduler with default configuration and scoring.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the scoring function used to rank equal-start candidates.
    pub fn with_scorer<F>(mut self, scorer: F) -> Self
    where
        F: Fn(&Candidate<'_>) -> Score + Send + Sync + 'static,
    {
        self.scorer = Scorer::new(scorer);
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Places session requests on courts within the horizon.
    ///
    /// Requests that cannot be placed are listed in
    /// [`Schedule::unscheduled`]; only malformed input or an exhausted
    /// step budget is an error.
    pub fn schedule(
        &self,
        participants: &[Participant],
        courts: &[Court],
        requests: &[SessionRequest],
        horizon: &TimeWindow,
    ) -> ScheduleResult<Schedule> {
        self.schedule_with_cancel(participants, courts, requests, horizon, |_| false)
    }

    /// Schedules from an input container.
    pub fn schedule_input(&self, input: &ScheduleInput) -> ScheduleResult<Schedule> {
        self.schedule(
            &input.participants,
            &input.courts,
            &input.requests,
            &input.horizon,
        )
    }

    /// Like [`schedule`](Self::schedule), checking `should_stop` before
    /// each request. The predicate receives the number of requests
    /// processed so far; returning `true` aborts the call.
    pub fn schedule_with_cancel<F>(
        &self,
        participants: &[Participant],
        courts: &[Court],
        requests: &[SessionRequest],
        horizon: &TimeWindow,
        should_stop: F,
    ) -> ScheduleResult<Schedule>
    where
        F: Fn(usize) -> bool,
    {
        validate_input(participants, courts, requests, horizon)
            .map_err(SchedulingError::InvalidInput)?;

        let (mut state, warnings) = WorkingState::new(
            &self.config,
            &self.scorer,
            participants,
            courts,
            requests,
            horizon,
        );
        for warning in &warnings {
            match warning {
                InputWarning::ParticipantExcluded { participant_id } => {
                    warn!(participant = %participant_id, "participant has no usable availability, excluded");
                }
                InputWarning::CourtExcluded { court_id } => {
                    warn!(court = %court_id, "court has no open window inside the horizon, excluded");
                }
            }
        }

        let mut failed = Vec::new();
        for (processed, &r) in priority_order(requests).iter().enumerate() {
            let over_budget = self.config.max_steps.is_some_and(|max| processed >= max);
            if over_budget || should_stop(processed) {
                warn!(processed, total = requests.len(), "scheduling aborted");
                return Err(SchedulingError::Aborted { processed });
            }

            let request = &requests[r];
            match state.search_request(r) {
                Search::Found(placement) => {
                    debug!(
                        request = %request.id,
                        court = %state.courts[placement.court].court.id,
                        window = %placement.window,
                        "session placed"
                    );
                    state.commit(placement);
                }
                Search::Failed(reason) => {
                    debug!(request = %request.id, ?reason, "session not placed");
                    failed.push((r, reason));
                }
            }
        }

        let unplaced = failed.len();
        let failed = repair(&mut state, failed, self.config.max_repair_attempts);
        let schedule = state.into_schedule(*horizon, failed, warnings);

        info!(
            requests = requests.len(),
            scheduled = schedule.assignment_count(),
            unscheduled = schedule.unscheduled.len(),
            repaired = unplaced - schedule.unscheduled.len(),
            warnings = schedule.warnings.len(),
            "scheduling finished"
        );
        Ok(schedule)
    }
}

/// Schedules with the default configuration.
pub fn schedule(
    participants: &[Participant],
    courts: &[Court],
    requests: &[SessionRequest],
    horizon: &TimeWindow,
) -> ScheduleResult<Schedule> {
    CourtScheduler::new().schedule(participants, courts, requests, horizon)
}

/// Request indices by priority descending, seed ascending, input order.
fn priority_order(requests: &[SessionRequest]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..requests.len()).collect();
    indices.sort_by(|&a, &b| {
        requests[b]
            .priority
            .cmp(&requests[a].priority)
            .then_with(|| requests[a].seed.cmp(&requests[b].seed))
    });
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UnscheduledReason;
    use crate::validation::ValidationErrorKind;

    fn player(id: &str, start: u32, end: u32) -> Participant {
        Participant::new(id).with_availability(start, end)
    }

    fn morning_roster() -> Vec<Participant> {
        ["anna", "ben", "cleo", "dan"]
            .iter()
            .map(|id| player(id, 540, 720))
            .collect()
    }

    fn two_courts() -> Vec<Court> {
        vec![
            Court::new("C1").with_open_hours(540, 660),
            Court::new("C2").with_open_hours(540, 660),
        ]
    }

    #[test]
    fn test_priority_order() {
        let requests = vec![
            SessionRequest::open("a", 2, 60).with_priority(1).with_seed(5),
            SessionRequest::open("b", 2, 60).with_priority(3),
            SessionRequest::open("c", 2, 60).with_priority(1).with_seed(2),
            SessionRequest::open("d", 2, 60).with_priority(1).with_seed(2),
        ];
        assert_eq!(priority_order(&requests), vec![1, 2, 3, 0]);
    }

    #[test]
    fn test_court_limited_morning() {
        let requests = vec![
            SessionRequest::open("S1", 2, 60),
            SessionRequest::open("S2", 2, 60),
            SessionRequest::open("S3", 2, 60),
        ];
        let schedule = schedule(
            &morning_roster(),
            &two_courts(),
            &requests,
            &TimeWindow::new(540, 600),
        )
        .unwrap();

        assert_eq!(schedule.assignment_count(), 2);
        assert_eq!(schedule.unscheduled.len(), 1);
        assert_eq!(schedule.unscheduled[0].request_id, "S3");
        assert_eq!(
            schedule.unscheduled[0].reason,
            UnscheduledReason::NoCourtAvailable
        );
        // Both sessions at 09:00, one per court, four distinct players
        assert!(schedule.assignments.iter().all(|a| a.window.start == 540));
        assert_eq!(schedule.sessions_per_participant().len(), 4);
    }

    #[test]
    fn test_higher_priority_placed_first() {
        let courts = vec![Court::new("C1").with_open_hours(540, 660)];
        let requests = vec![
            SessionRequest::fixed("low", ["anna", "ben"], 60),
            SessionRequest::fixed("high", ["cleo", "dan"], 60).with_priority(5),
        ];
        let schedule = schedule(&morning_roster(), &courts, &requests, &TimeWindow::new(540, 720))
            .unwrap();

        let high = schedule.assignment_for_session("high").unwrap();
        let low = schedule.assignment_for_session("low").unwrap();
        assert_eq!(high.window.start, 540);
        assert_eq!(low.window.start, 600);
    }

    #[test]
    fn test_back_to_back_allowed() {
        let courts = vec![Court::new("C1").with_open_hours(540, 660)];
        let requests = vec![
            SessionRequest::fixed("S1", ["anna", "ben"], 60),
            SessionRequest::fixed("S2", ["anna", "ben"], 60),
        ];
        let schedule = schedule(&morning_roster(), &courts, &requests, &TimeWindow::new(540, 720))
            .unwrap();

        assert!(schedule.is_complete());
        assert_eq!(schedule.assignments[0].window, TimeWindow::new(540, 600));
        assert_eq!(schedule.assignments[1].window, TimeWindow::new(600, 660));
    }

    #[test]
    fn test_court_capacity_two() {
        let courts = vec![Court::new("C1").with_open_hours(540, 600).with_capacity(2)];
        let requests = vec![
            SessionRequest::open("S1", 2, 60),
            SessionRequest::open("S2", 2, 60),
        ];
        let schedule = schedule(&morning_roster(), &courts, &requests, &TimeWindow::new(540, 720))
            .unwrap();

        assert!(schedule.is_complete());
        assert!(schedule.assignments.iter().all(|a| a.court_id == "C1"));
    }

    #[test]
    fn test_daily_cap() {
        let mut roster = morning_roster();
        roster[0] = roster[0].clone().with_max_sessions_per_day(1);
        let courts = vec![Court::new("C1").with_open_hours(540, 720)];
        let requests = vec![
            SessionRequest::fixed("S1", ["anna", "ben"], 60),
            SessionRequest::fixed("S2", ["anna", "cleo"], 60),
        ];
        let schedule =
            schedule(&roster, &courts, &requests, &TimeWindow::new(540, 720)).unwrap();

        assert_eq!(schedule.assignment_count(), 1);
        assert_eq!(
            schedule.unscheduled_reason("S2"),
            Some(UnscheduledReason::DailyCapExceeded)
        );
    }

    #[test]
    fn test_no_eligible_participants() {
        let roster = vec![player("anna", 540, 600), player("ben", 900, 960)];
        let courts = vec![Court::new("C1").with_open_hours(540, 1020)];
        let requests = vec![SessionRequest::open("S1", 2, 60)];
        let schedule =
            schedule(&roster, &courts, &requests, &TimeWindow::new(480, 1080)).unwrap();

        assert_eq!(
            schedule.unscheduled_reason("S1"),
            Some(UnscheduledReason::NoEligibleParticipants)
        );
    }

    #[test]
    fn test_excluded_participant_warning() {
        let mut roster = morning_roster();
        roster.push(player("early", 480, 510));
        let courts = vec![Court::new("C1").with_open_hours(540, 1020)];
        let requests = vec![SessionRequest::open("S1", 4, 60)];
        let schedule =
            schedule(&roster, &courts, &requests, &TimeWindow::new(480, 1080)).unwrap();

        assert_eq!(schedule.excluded_participants(), vec!["early"]);
        assert!(schedule.is_complete());
        assert!(!schedule.assignments[0].involves("early"));
    }

    #[test]
    fn test_court_outside_horizon_excluded() {
        let courts = vec![
            Court::new("C1").with_open_hours(540, 720),
            Court::new("night").with_open_hours(1200, 1320),
        ];
        let schedule = schedule(
            &morning_roster(),
            &courts,
            &[SessionRequest::open("S1", 2, 60)],
            &TimeWindow::new(480, 1080),
        )
        .unwrap();

        assert_eq!(
            schedule.warnings,
            vec![InputWarning::CourtExcluded {
                court_id: "night".into()
            }]
        );
        assert!(schedule.is_complete());
    }

    #[test]
    fn test_invalid_horizon() {
        let err = schedule(
            &morning_roster(),
            &two_courts(),
            &[],
            &TimeWindow::new(720, 540),
        )
        .unwrap_err();
        assert!(err
            .validation_errors()
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvertedHorizon));
    }

    #[test]
    fn test_repeated_pool_member_rejected() {
        let requests = vec![SessionRequest::open("S1", 2, 60).with_pool(["anna", "anna"])];
        let err = schedule(
            &morning_roster(),
            &two_courts(),
            &requests,
            &TimeWindow::new(540, 720),
        )
        .unwrap_err();
        assert!(err
            .validation_errors()
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId));
    }

    #[test]
    fn test_max_steps_aborts() {
        let requests = vec![
            SessionRequest::open("S1", 2, 60),
            SessionRequest::open("S2", 2, 60),
        ];
        let scheduler = CourtScheduler::new().with_config(EngineConfig::new().with_max_steps(1));
        let err = scheduler
            .schedule(&morning_roster(), &two_courts(), &requests, &TimeWindow::new(540, 720))
            .unwrap_err();
        assert_eq!(err, SchedulingError::Aborted { processed: 1 });

        // A budget equal to the request count is enough
        let scheduler = CourtScheduler::new().with_config(EngineConfig::new().with_max_steps(2));
        assert!(scheduler
            .schedule(&morning_roster(), &two_courts(), &requests, &TimeWindow::new(540, 720))
            .is_ok());
    }

    #[test]
    fn test_cancel_predicate() {
        let requests = vec![SessionRequest::open("S1", 2, 60)];
        let err = CourtScheduler::new()
            .schedule_with_cancel(
                &morning_roster(),
                &two_courts(),
                &requests,
                &TimeWindow::new(540, 720),
                |_| true,
            )
            .unwrap_err();
        assert_eq!(err, SchedulingError::Aborted { processed: 0 });
    }

    #[test]
    fn test_custom_scorer_prefers_later_court() {
        let requests = vec![SessionRequest::open("S1", 2, 60)];
        let scheduler = CourtScheduler::new().with_scorer(|c| {
            if c.court.id == "C2" {
                0
            } else {
                1
            }
        });
        let schedule = scheduler
            .schedule(&morning_roster(), &two_courts(), &requests, &TimeWindow::new(540, 720))
            .unwrap();
        assert_eq!(schedule.assignments[0].court_id, "C2");
    }

    #[test]
    fn test_balance_spreads_sessions() {
        let courts = vec![Court::new("C1").with_open_hours(540, 720)];
        let requests = vec![
            SessionRequest::open("S1", 2, 60),
            SessionRequest::open("S2", 2, 60),
        ];
        let schedule = schedule(&morning_roster(), &courts, &requests, &TimeWindow::new(540, 720))
            .unwrap();

        let counts = schedule.sessions_per_participant();
        assert_eq!(counts.len(), 4);
        assert!(counts.values().all(|&n| n == 1));
    }

    #[test]
    fn test_schedule_input_roundtrip() {
        let input = ScheduleInput::new(morning_roster(), two_courts(), TimeWindow::new(540, 720))
            .with_requests([
                SessionRequest::open("S1", 2, 60),
                SessionRequest::fixed("S2", ["anna", "ben"], 60),
            ]);
        let json = serde_json::to_string(&input).unwrap();
        let parsed: ScheduleInput = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, input);

        let scheduler = CourtScheduler::new();
        assert_eq!(
            scheduler.schedule_input(&parsed).unwrap(),
            scheduler.schedule_input(&input).unwrap()
        );
    }
}
