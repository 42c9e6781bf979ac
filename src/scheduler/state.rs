//! Working state of one scheduling call.
//!
//! Holds the per-court and per-participant occupancy built up while
//! requests are placed, and the placement search itself. Nothing here
//! outlives the call.

use std::cell::Cell;
use std::collections::{BTreeSet, HashMap};

use crate::config::EngineConfig;
use crate::models::{
    day_of, Assignment, Calendar, Court, InputWarning, Minutes, Participant,
    ParticipantSelection, Schedule, SessionRequest, TimeWindow, Unscheduled, UnscheduledReason,
};

use super::occupancy::Occupancy;
use super::scoring::{wasted, Candidate, Score, Scorer};

pub(crate) struct ParticipantState<'a> {
    pub(crate) participant: &'a Participant,
    /// Normalized availability.
    pub(crate) availability: Calendar,
    pub(crate) busy: Occupancy,
    pub(crate) excluded: bool,
}

pub(crate) struct CourtState<'a> {
    pub(crate) court: &'a Court,
    /// Normalized open hours clipped to the horizon.
    pub(crate) open: Calendar,
    pub(crate) busy: Occupancy,
}

/// Participant binding of a request, by roster index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Binding {
    Fixed(Vec<usize>),
    Open { pool: Option<Vec<usize>> },
}

/// A committed session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Placement {
    pub(crate) request: usize,
    pub(crate) court: usize,
    pub(crate) window: TimeWindow,
    pub(crate) participants: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Search {
    Found(Placement),
    Failed(UnscheduledReason),
}

enum Eligibility {
    Eligible,
    Capped,
    Unavailable,
}

enum Selection {
    Chosen(Vec<usize>, u64),
    Capped,
    Short,
}

pub(crate) struct WorkingState<'a> {
    config: &'a EngineConfig,
    scorer: &'a Scorer,
    pub(crate) requests: &'a [SessionRequest],
    pub(crate) bindings: Vec<Binding>,
    pub(crate) participants: Vec<ParticipantState<'a>>,
    /// Usable courts, sorted by id.
    pub(crate) courts: Vec<CourtState<'a>>,
    /// Committed sessions in commit order.
    pub(crate) placements: Vec<Placement>,
    /// Slot scans run so far.
    searches: Cell<usize>,
}

impl<'a> WorkingState<'a> {
    /// Builds the working state and the exclusion warnings.
    ///
    /// Inputs must already be validated.
    pub(crate) fn new(
        config: &'a EngineConfig,
        scorer: &'a Scorer,
        participants: &'a [Participant],
        courts: &'a [Court],
        requests: &'a [SessionRequest],
        horizon: &TimeWindow,
    ) -> (Self, Vec<InputWarning>) {
        let mut warnings = Vec::new();

        let mut court_states = Vec::with_capacity(courts.len());
        for court in courts {
            let open = court.open_hours.normalized().clipped(horizon);
            if open.is_empty() {
                warnings.push(InputWarning::CourtExcluded {
                    court_id: court.id.clone(),
                });
                continue;
            }
            court_states.push(CourtState {
                court,
                open,
                busy: Occupancy::new(),
            });
        }
        court_states.sort_by(|a, b| a.court.id.cmp(&b.court.id));

        let court_hours = Calendar::from_windows(
            court_states
                .iter()
                .flat_map(|c| c.open.windows.iter().copied()),
        )
        .normalized();

        let mut participant_states = Vec::with_capacity(participants.len());
        for participant in participants {
            let availability = participant.availability.normalized();
            let usable = availability.clipped(horizon).intersection(&court_hours);
            let excluded = usable.is_empty();
            if excluded {
                warnings.push(InputWarning::ParticipantExcluded {
                    participant_id: participant.id.clone(),
                });
            }
            participant_states.push(ParticipantState {
                participant,
                availability,
                busy: Occupancy::new(),
                excluded,
            });
        }

        let index: HashMap<&str, usize> = participants
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id.as_str(), i))
            .collect();
        let lookup = |ids: &[String]| -> Vec<usize> {
            ids.iter()
                .filter_map(|id| index.get(id.as_str()).copied())
                .collect()
        };
        let bindings = requests
            .iter()
            .map(|r| match &r.selection {
                ParticipantSelection::Fixed(ids) => Binding::Fixed(lookup(ids)),
                ParticipantSelection::Open { pool } => Binding::Open {
                    pool: pool.as_deref().map(&lookup),
                },
            })
            .collect();

        let state = Self {
            config,
            scorer,
            requests,
            bindings,
            participants: participant_states,
            courts: court_states,
            placements: Vec::new(),
            searches: Cell::new(0),
        };
        (state, warnings)
    }

    /// Searches the best placement for a request under its own binding.
    pub(crate) fn search_request(&self, request: usize) -> Search {
        self.search(request, &self.bindings[request])
    }

    /// Searches the best placement for `request` with participants drawn
    /// according to `binding`.
    ///
    /// Candidates are ordered by start, then score, then court id. Each
    /// court contributes its earliest feasible start only.
    pub(crate) fn search(&self, request: usize, binding: &Binding) -> Search {
        self.searches.set(self.searches.get() + 1);
        let req = &self.requests[request];
        let mut best: Option<(Minutes, Score, usize, Placement)> = None;
        let mut saw_slot = false;
        let mut saw_capped = false;

        for (ci, court) in self.courts.iter().enumerate() {
            for start in self.candidate_starts(ci, req.duration, binding) {
                if best.as_ref().is_some_and(|(s, ..)| start > *s) {
                    break;
                }
                let window = TimeWindow::starting_at(start, req.duration);
                if !self.court_has_room(ci, &window) {
                    continue;
                }
                saw_slot = true;

                let (chosen, cost) = match self.select(req, binding, &window) {
                    Selection::Chosen(chosen, cost) => (chosen, cost),
                    Selection::Capped => {
                        saw_capped = true;
                        continue;
                    }
                    Selection::Short => continue,
                };

                let candidate = Candidate {
                    request: req,
                    court: court.court,
                    window,
                    participants: chosen
                        .iter()
                        .map(|&p| self.participants[p].participant.id.as_str())
                        .collect(),
                    fragmentation: self.fragmentation(ci, &window),
                    participant_cost: cost,
                };
                let score = self.scorer.score(&candidate);

                // Courts are visited in id order, so the index breaks ties.
                let better = best
                    .as_ref()
                    .map_or(true, |(s, sc, c, _)| (start, score, ci) < (*s, *sc, *c));
                if better {
                    let placement = Placement {
                        request,
                        court: ci,
                        window,
                        participants: chosen,
                    };
                    best = Some((start, score, ci, placement));
                }
                break;
            }
        }

        match best {
            Some((.., placement)) => Search::Found(placement),
            None if !saw_slot => Search::Failed(UnscheduledReason::NoCourtAvailable),
            None if saw_capped => Search::Failed(UnscheduledReason::DailyCapExceeded),
            None => Search::Failed(UnscheduledReason::NoEligibleParticipants),
        }
    }

    /// Every feasible (court, window) for a fixed participant set, ordered
    /// by start then court id.
    pub(crate) fn feasible_slots(
        &self,
        duration: Minutes,
        participants: &[usize],
    ) -> Vec<(usize, TimeWindow)> {
        self.searches.set(self.searches.get() + 1);
        let binding = Binding::Fixed(participants.to_vec());
        let mut slots = Vec::new();
        for ci in 0..self.courts.len() {
            for start in self.candidate_starts(ci, duration, &binding) {
                let window = TimeWindow::starting_at(start, duration);
                if self.court_has_room(ci, &window)
                    && participants
                        .iter()
                        .all(|&p| matches!(self.eligibility(p, &window), Eligibility::Eligible))
                {
                    slots.push((ci, window));
                }
            }
        }
        slots.sort_by_key(|(ci, w)| (w.start, *ci));
        slots
    }

    /// Number of slot scans (`search` and `feasible_slots`) run so far.
    pub(crate) fn searches(&self) -> usize {
        self.searches.get()
    }

    /// Commits a placement.
    pub(crate) fn commit(&mut self, placement: Placement) {
        self.occupy(&placement);
        self.placements.push(placement);
    }

    /// Removes the placement at `index` and frees its court and participants.
    pub(crate) fn release(&mut self, index: usize) -> Placement {
        let placement = self.placements.remove(index);
        self.vacate(&placement);
        placement
    }

    /// Re-inserts a placement at `index`.
    pub(crate) fn restore(&mut self, index: usize, placement: Placement) {
        self.occupy(&placement);
        self.placements.insert(index, placement);
    }

    /// Whether a fixed participant set can play in `window` on court `court`.
    pub(crate) fn fits(&self, court: usize, window: &TimeWindow, participants: &[usize]) -> bool {
        self.court_has_room(court, window)
            && self.courts[court].open.covers(window)
            && participants
                .iter()
                .all(|&p| matches!(self.eligibility(p, window), Eligibility::Eligible))
    }

    /// Converts the working state into the final schedule.
    pub(crate) fn into_schedule(
        self,
        horizon: TimeWindow,
        failed: Vec<(usize, UnscheduledReason)>,
        warnings: Vec<InputWarning>,
    ) -> Schedule {
        let mut schedule = Schedule::new(horizon);
        for placement in &self.placements {
            let mut ids: Vec<String> = placement
                .participants
                .iter()
                .map(|&p| self.participants[p].participant.id.clone())
                .collect();
            if matches!(self.bindings[placement.request], Binding::Open { .. }) {
                ids.sort();
            }
            schedule.add_assignment(Assignment::new(
                self.requests[placement.request].id.clone(),
                self.courts[placement.court].court.id.clone(),
                placement.window,
                ids,
            ));
        }
        schedule.sort();
        schedule.unscheduled = failed
            .into_iter()
            .map(|(r, reason)| Unscheduled::new(self.requests[r].id.clone(), reason))
            .collect();
        schedule.warnings = warnings;
        schedule
    }

    fn occupy(&mut self, placement: &Placement) {
        self.courts[placement.court].busy.insert(placement.window);
        for &p in &placement.participants {
            self.participants[p].busy.insert(placement.window);
        }
    }

    fn vacate(&mut self, placement: &Placement) {
        self.courts[placement.court].busy.remove(&placement.window);
        for &p in &placement.participants {
            self.participants[p].busy.remove(&placement.window);
        }
    }

    /// Candidate starts on one court, ascending.
    fn candidate_starts(&self, court: usize, duration: Minutes, binding: &Binding) -> BTreeSet<Minutes> {
        let state = &self.courts[court];
        let step = self.config.slot_step.max(1);
        let mut starts = BTreeSet::new();

        for open in &state.open.windows {
            let Some(last) = open.end.checked_sub(duration) else {
                continue;
            };
            if last < open.start {
                continue;
            }
            let in_range = |s: Minutes| s >= open.start && s <= last;

            let mut s = open.start;
            while s <= last {
                starts.insert(s);
                match s.checked_add(step) {
                    Some(next) => s = next,
                    None => break,
                }
            }
            starts.extend(state.busy.windows().iter().map(|w| w.end).filter(|&e| in_range(e)));
            for p in self.binding_members(binding) {
                starts.extend(
                    self.participants[p]
                        .availability
                        .windows
                        .iter()
                        .map(|w| w.start)
                        .filter(|&s| in_range(s)),
                );
            }
        }
        starts
    }

    fn binding_members<'b>(&'b self, binding: &'b Binding) -> Box<dyn Iterator<Item = usize> + 'b> {
        match binding {
            Binding::Fixed(ids) | Binding::Open { pool: Some(ids) } => Box::new(ids.iter().copied()),
            Binding::Open { pool: None } => Box::new(0..self.participants.len()),
        }
    }

    fn court_has_room(&self, court: usize, window: &TimeWindow) -> bool {
        let state = &self.courts[court];
        state.busy.max_concurrent(window) < state.court.capacity
    }

    fn eligibility(&self, participant: usize, window: &TimeWindow) -> Eligibility {
        let state = &self.participants[participant];
        if state.excluded || !state.availability.covers(window) || !state.busy.is_free(window) {
            return Eligibility::Unavailable;
        }
        match state.participant.max_sessions_per_day {
            Some(cap) if state.busy.count_on_day(day_of(window.start)) >= cap => {
                Eligibility::Capped
            }
            _ => Eligibility::Eligible,
        }
    }

    /// Cost of adding `window` to a participant's day.
    fn participant_cost(&self, participant: usize, window: &TimeWindow) -> u64 {
        let busy = &self.participants[participant].busy;
        let idle = u64::from(busy.same_day_gap(window).unwrap_or(0));
        let held = busy.windows().len() as u64;
        let back_to_back = if busy.touches(window) {
            u64::from(self.config.back_to_back_penalty)
        } else {
            0
        };
        idle * u64::from(self.config.idle_weight)
            + held * u64::from(self.config.balance_weight)
            + back_to_back
    }

    fn select(&self, request: &SessionRequest, binding: &Binding, window: &TimeWindow) -> Selection {
        let needed = request.participant_count as usize;
        match binding {
            Binding::Fixed(ids) => {
                let mut capped = false;
                for &p in ids {
                    match self.eligibility(p, window) {
                        Eligibility::Unavailable => return Selection::Short,
                        Eligibility::Capped => capped = true,
                        Eligibility::Eligible => {}
                    }
                }
                if capped {
                    return Selection::Capped;
                }
                let cost = ids.iter().map(|&p| self.participant_cost(p, window)).sum();
                Selection::Chosen(ids.clone(), cost)
            }
            Binding::Open { .. } => {
                let mut eligible: Vec<(u64, &str, usize)> = Vec::new();
                let mut capped = 0usize;
                for p in self.binding_members(binding) {
                    match self.eligibility(p, window) {
                        Eligibility::Eligible => eligible.push((
                            self.participant_cost(p, window),
                            self.participants[p].participant.id.as_str(),
                            p,
                        )),
                        Eligibility::Capped => capped += 1,
                        Eligibility::Unavailable => {}
                    }
                }
                if eligible.len() >= needed {
                    eligible.sort_unstable();
                    eligible.truncate(needed);
                    let cost = eligible.iter().map(|(c, ..)| c).sum();
                    Selection::Chosen(eligible.into_iter().map(|(.., p)| p).collect(), cost)
                } else if eligible.len() + capped >= needed {
                    Selection::Capped
                } else {
                    Selection::Short
                }
            }
        }
    }

    /// Court minutes next to `window` that become too short for another
    /// session of the same length.
    fn fragmentation(&self, court: usize, window: &TimeWindow) -> Minutes {
        let state = &self.courts[court];
        let Some(open) = state.open.windows.iter().find(|w| w.covers(window)) else {
            return 0;
        };
        let before = state
            .busy
            .previous_end(window.start)
            .filter(|&e| e >= open.start)
            .unwrap_or(open.start);
        let after = state
            .busy
            .next_start(window.end)
            .filter(|&s| s <= open.end)
            .unwrap_or(open.end);
        let duration = window.duration();
        wasted(window.start - before, duration) + wasted(after - window.end, duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<Participant> {
        vec![
            Participant::new("anna").with_availability(540, 720),
            Participant::new("ben").with_availability(540, 720),
            Participant::new("cleo")
                .with_availability(600, 720)
                .with_max_sessions_per_day(1),
            Participant::new("dan").with_availability(1200, 1260),
        ]
    }

    fn courts() -> Vec<Court> {
        vec![
            Court::new("C2").with_open_hours(540, 720),
            Court::new("C1").with_open_hours(540, 720),
            Court::new("C3").with_open_hours(1300, 1400),
        ]
    }

    #[test]
    fn test_exclusions_and_court_order() {
        let config = EngineConfig::default();
        let scorer = Scorer::default();
        let participants = roster();
        let courts = courts();
        let (state, warnings) = WorkingState::new(
            &config,
            &scorer,
            &participants,
            &courts,
            &[],
            &TimeWindow::new(480, 1080),
        );

        let ids: Vec<&str> = state.courts.iter().map(|c| c.court.id.as_str()).collect();
        assert_eq!(ids, vec!["C1", "C2"]);
        assert!(warnings.contains(&InputWarning::CourtExcluded {
            court_id: "C3".into()
        }));
        assert!(warnings.contains(&InputWarning::ParticipantExcluded {
            participant_id: "dan".into()
        }));
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_search_picks_earliest_then_smallest_court() {
        let config = EngineConfig::default();
        let scorer = Scorer::default();
        let participants = roster();
        let courts = courts();
        let requests = vec![SessionRequest::fixed("S1", ["anna", "ben"], 60)];
        let (state, _) = WorkingState::new(
            &config,
            &scorer,
            &participants,
            &courts,
            &requests,
            &TimeWindow::new(480, 1080),
        );

        match state.search_request(0) {
            Search::Found(p) => {
                assert_eq!(p.window, TimeWindow::new(540, 600));
                assert_eq!(state.courts[p.court].court.id, "C1");
                assert_eq!(p.participants, vec![0, 1]);
            }
            other => panic!("expected placement, got {other:?}"),
        }
    }

    #[test]
    fn test_daily_cap_reason() {
        let config = EngineConfig::default();
        let scorer = Scorer::default();
        let participants = roster();
        let courts = courts();
        let requests = vec![
            SessionRequest::fixed("S1", ["cleo", "anna"], 60),
            SessionRequest::fixed("S2", ["cleo", "ben"], 60),
        ];
        let (mut state, _) = WorkingState::new(
            &config,
            &scorer,
            &participants,
            &courts,
            &requests,
            &TimeWindow::new(480, 1080),
        );

        let Search::Found(first) = state.search_request(0) else {
            panic!("first request should fit");
        };
        assert_eq!(first.window.start, 600);
        state.commit(first);
        assert_eq!(
            state.search_request(1),
            Search::Failed(UnscheduledReason::DailyCapExceeded)
        );
    }

    #[test]
    fn test_open_request_prefers_least_loaded() {
        let config = EngineConfig::default();
        let scorer = Scorer::default();
        let participants = vec![
            Participant::new("a").with_availability(540, 720),
            Participant::new("b").with_availability(540, 720),
            Participant::new("c").with_availability(540, 720),
        ];
        let courts = vec![Court::new("C1").with_open_hours(540, 720)];
        let requests = vec![
            SessionRequest::fixed("S1", ["a"], 60),
            SessionRequest::open("S2", 2, 60),
        ];
        let (mut state, _) = WorkingState::new(
            &config,
            &scorer,
            &participants,
            &courts,
            &requests,
            &TimeWindow::new(540, 720),
        );
        let Search::Found(first) = state.search_request(0) else {
            panic!("first request should fit");
        };
        state.commit(first);

        let Search::Found(second) = state.search_request(1) else {
            panic!("second request should fit");
        };
        assert_eq!(second.window.start, 600);
        assert_eq!(second.participants, vec![1, 2]);
    }

    #[test]
    fn test_no_court_reason() {
        let config = EngineConfig::default();
        let scorer = Scorer::default();
        let participants = roster();
        let courts = courts();
        let requests = vec![SessionRequest::open("S1", 2, 240)];
        let (state, _) = WorkingState::new(
            &config,
            &scorer,
            &participants,
            &courts,
            &requests,
            &TimeWindow::new(480, 1080),
        );
        assert_eq!(
            state.search_request(0),
            Search::Failed(UnscheduledReason::NoCourtAvailable)
        );
    }

    #[test]
    fn test_release_and_restore() {
        let config = EngineConfig::default();
        let scorer = Scorer::default();
        let participants = roster();
        let courts = courts();
        let requests = vec![SessionRequest::fixed("S1", ["anna", "ben"], 60)];
        let (mut state, _) = WorkingState::new(
            &config,
            &scorer,
            &participants,
            &courts,
            &requests,
            &TimeWindow::new(480, 1080),
        );
        let Search::Found(p) = state.search_request(0) else {
            panic!("request should fit");
        };
        state.commit(p.clone());
        assert!(!state.fits(p.court, &p.window, &p.participants));

        let released = state.release(0);
        assert!(state.fits(p.court, &p.window, &p.participants));
        state.restore(0, released);
        assert_eq!(state.placements, vec![p]);
    }
}
