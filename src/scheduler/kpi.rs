//! Schedule quality metrics (KPIs).
//!
//! Computes load-balance and court-usage indicators from a finished
//! schedule.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Sessions per participant | Placed sessions each participant plays |
//! | Session difference | max - min sessions per participant |
//! | Fairness | Rating of the session difference |
//! | Court utilization | Busy minutes / open minutes within the horizon |
//! | Idle minutes | Same-day gaps between a participant's sessions |
//! | Back-to-back count | Sessions starting exactly when the previous ended |

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{day_of, Court, Minutes, Schedule, TimeWindow};

/// Rating of how evenly games or sessions are spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Fairness {
    /// Difference of at most one.
    VeryFair,
    /// Difference of at most two.
    Acceptable,
    /// Anything larger.
    Uneven,
}

impl Fairness {
    /// Rates a max-min difference.
    pub fn from_difference(difference: u32) -> Self {
        match difference {
            0 | 1 => Self::VeryFair,
            2 => Self::Acceptable,
            _ => Self::Uneven,
        }
    }
}

/// Schedule performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleKpi {
    /// Number of placed sessions.
    pub total_sessions: usize,
    /// Number of requests left unscheduled.
    pub unscheduled_count: usize,
    /// Sessions per participant (participants with at least one session).
    pub sessions_per_participant: BTreeMap<String, u32>,
    /// Fewest sessions of any listed participant.
    pub min_sessions: u32,
    /// Most sessions of any listed participant.
    pub max_sessions: u32,
    /// `max_sessions - min_sessions`.
    pub session_difference: u32,
    /// Rating of the session difference.
    pub fairness: Fairness,
    /// Per-court utilization (0.0..1.0).
    pub utilization_by_court: BTreeMap<String, f64>,
    /// Mean utilization over courts open within the horizon.
    pub avg_utilization: f64,
    /// Total idle minutes between same-day sessions, summed over participants.
    pub total_idle_minutes: Minutes,
    /// Sessions that start exactly when the participant's previous one ends.
    pub back_to_back_count: u32,
}

impl ScheduleKpi {
    /// Computes KPIs from a schedule and the courts it was built for.
    pub fn calculate(schedule: &Schedule, courts: &[Court]) -> Self {
        let sessions_per_participant = schedule.sessions_per_participant();
        let min_sessions = sessions_per_participant.values().copied().min().unwrap_or(0);
        let max_sessions = sessions_per_participant.values().copied().max().unwrap_or(0);
        let session_difference = max_sessions - min_sessions;

        let utilization_by_court = court_utilization(schedule, courts);
        let avg_utilization = if utilization_by_court.is_empty() {
            0.0
        } else {
            utilization_by_court.values().sum::<f64>() / utilization_by_court.len() as f64
        };

        let mut total_idle_minutes = 0;
        let mut back_to_back_count = 0;
        for participant in sessions_per_participant.keys() {
            let mut windows: Vec<TimeWindow> = schedule
                .assignments_for_participant(participant)
                .iter()
                .map(|a| a.window)
                .collect();
            windows.sort();
            for pair in windows.windows(2) {
                let (prev, next) = (pair[0], pair[1]);
                if day_of(prev.start) != day_of(next.start) {
                    continue;
                }
                let gap = prev.gap_to(&next);
                total_idle_minutes += gap;
                if gap == 0 {
                    back_to_back_count += 1;
                }
            }
        }

        Self {
            total_sessions: schedule.assignment_count(),
            unscheduled_count: schedule.unscheduled.len(),
            sessions_per_participant,
            min_sessions,
            max_sessions,
            session_difference,
            fairness: Fairness::from_difference(session_difference),
            utilization_by_court,
            avg_utilization,
            total_idle_minutes,
            back_to_back_count,
        }
    }

    /// Whether the schedule meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_difference: u32, min_utilization: f64) -> bool {
        self.session_difference <= max_difference && self.avg_utilization >= min_utilization
    }
}

/// Busy / open minutes per court, for courts open within the horizon.
fn court_utilization(schedule: &Schedule, courts: &[Court]) -> BTreeMap<String, f64> {
    courts
        .iter()
        .filter_map(|court| {
            let open = court.open_minutes_within(&schedule.horizon);
            if open == 0 {
                return None;
            }
            let busy: Minutes = schedule
                .assignments_for_court(&court.id)
                .iter()
                .map(|a| a.duration())
                .sum();
            let capacity = f64::from(open) * f64::from(court.capacity.max(1));
            Some((court.id.clone(), f64::from(busy) / capacity))
        })
        .collect()
}
