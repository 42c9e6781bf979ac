//! Tournament statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::Minutes;
use crate::scheduler::Fairness;

use super::planner::{Round, ROUND_MINUTES};

/// How often each team plays across a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipationStats {
    /// Matches in the plan.
    pub total_matches: usize,
    /// Games per team, including teams that never play.
    pub team_counts: BTreeMap<String, u32>,
    /// Mean games per team.
    pub avg_games_per_team: f64,
    /// Fewest games of any team.
    pub min_games: u32,
    /// Most games of any team.
    pub max_games: u32,
    /// `max_games - min_games`.
    pub games_difference: u32,
    /// Rating of the games difference.
    pub fairness: Fairness,
}

/// Statistics of a time-based plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedStats {
    /// Games per team.
    pub participation: ParticipationStats,
    /// Rounds played.
    pub total_rounds: u32,
    /// Minutes the organiser asked for.
    pub planned_duration: Minutes,
    /// Minutes the rounds take, breaks included.
    pub actual_duration: Minutes,
    /// `actual / planned` in percent.
    pub efficiency: f64,
    /// Matches / (rounds x courts) in percent.
    pub court_utilization: f64,
}

impl TimedStats {
    pub(crate) fn new(
        participation: ParticipationStats,
        total_rounds: u32,
        planned_duration: Minutes,
        courts: u32,
    ) -> Self {
        let actual_duration = total_rounds * ROUND_MINUTES;
        let efficiency = if planned_duration > 0 {
            f64::from(actual_duration) / f64::from(planned_duration) * 100.0
        } else {
            0.0
        };
        let slots = u64::from(total_rounds) * u64::from(courts);
        let court_utilization = if slots > 0 {
            participation.total_matches as f64 / slots as f64 * 100.0
        } else {
            0.0
        };
        Self {
            participation,
            total_rounds,
            planned_duration,
            actual_duration,
            efficiency,
            court_utilization,
        }
    }
}

/// Counts games per team over `rounds`.
pub(crate) fn participation_stats(teams: &[String], rounds: &[Round]) -> ParticipationStats {
    let mut team_counts: BTreeMap<String, u32> = teams.iter().map(|t| (t.clone(), 0)).collect();
    let mut total_matches = 0;
    for m in rounds.iter().flat_map(|r| &r.matches) {
        total_matches += 1;
        for team in [&m.home, &m.away] {
            *team_counts.entry(team.clone()).or_default() += 1;
        }
    }

    let min_games = team_counts.values().copied().min().unwrap_or(0);
    let max_games = team_counts.values().copied().max().unwrap_or(0);
    let avg_games_per_team = if team_counts.is_empty() {
        0.0
    } else {
        f64::from(team_counts.values().sum::<u32>()) / team_counts.len() as f64
    };
    let games_difference = max_games - min_games;

    ParticipationStats {
        total_matches,
        team_counts,
        avg_games_per_team,
        min_games,
        max_games,
        games_difference,
        fairness: Fairness::from_difference(games_difference),
    }
}
