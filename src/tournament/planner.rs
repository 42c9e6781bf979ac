//! Team tournament planning.
//!
//! # Formats
//!
//! - **Time-based**: as many 20-minute rounds (15 minutes play, 5 minutes
//!   changeover) as fit in the available time. Each round favours the
//!   teams with the fewest games so far.
//! - **Round robin**: every pairing exactly once, in seeded random order,
//!   packed into rounds of at most one match per court.
//! - **Single round**: one round, teams paired in list order.
//!
//! A team fields `players_per_team / 2` doubles squads, so it can be on
//! that many courts at once.

use std::collections::{BTreeMap, HashSet};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::TournamentError;
use crate::models::{Court, Minutes, Participant, SessionRequest, TimeWindow};

use super::stats::{participation_stats, ParticipationStats, TimedStats};

/// Minutes of play per round.
pub const PLAY_MINUTES: Minutes = 15;
/// Changeover after each round.
pub const BREAK_MINUTES: Minutes = 5;
/// Full round length.
pub const ROUND_MINUTES: Minutes = PLAY_MINUTES + BREAK_MINUTES;

/// A match between two teams.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pairing {
    /// First team.
    pub home: String,
    /// Second team.
    pub away: String,
}

impl Pairing {
    /// Creates a pairing.
    pub fn new(home: impl Into<String>, away: impl Into<String>) -> Self {
        Self {
            home: home.into(),
            away: away.into(),
        }
    }

    /// Whether `team` plays in this match.
    pub fn involves(&self, team: &str) -> bool {
        self.home == team || self.away == team
    }
}

/// One round of simultaneous matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    /// 1-based round number.
    pub number: u32,
    /// Matches, at most one per court.
    pub matches: Vec<Pairing>,
    /// Play window relative to the tournament start.
    pub window: TimeWindow,
}

impl Round {
    fn numbered(number: u32, matches: Vec<Pairing>) -> Self {
        let start = (number - 1) * ROUND_MINUTES;
        Self {
            number,
            matches,
            window: TimeWindow::starting_at(start, PLAY_MINUTES),
        }
    }
}

/// A time-based plan and its statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedPlan {
    /// Rounds in order.
    pub rounds: Vec<Round>,
    /// Plan statistics.
    pub stats: TimedStats,
}

/// Tournament planner for a fixed set of teams and courts.
///
/// # Example
///
/// ```
/// use tennis_schedule::tournament::TournamentPlanner;
///
/// let planner = TournamentPlanner::numbered(2, 4, 4).unwrap();
/// let rounds = planner.round_robin(7);
///
/// let played: usize = rounds.iter().map(|r| r.matches.len()).sum();
/// assert_eq!(played, planner.all_pairings().len());
/// assert!(rounds.iter().all(|r| r.matches.len() <= 2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentPlanner {
    courts: u32,
    teams: Vec<String>,
    players_per_team: u32,
}

impl TournamentPlanner {
    /// Creates a planner.
    ///
    /// # Errors
    /// Fewer than two teams, duplicate team names, no courts, or fewer
    /// than two players per team.
    pub fn new<I, S>(courts: u32, teams: I, players_per_team: u32) -> Result<Self, TournamentError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let teams: Vec<String> = teams.into_iter().map(Into::into).collect();
        if teams.len() < 2 {
            return Err(TournamentError::NotEnoughTeams(teams.len()));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = teams.iter().find(|t| !seen.insert(t.as_str())) {
            return Err(TournamentError::DuplicateTeam(dup.clone()));
        }
        if courts == 0 {
            return Err(TournamentError::NoCourts);
        }
        if players_per_team < 2 {
            return Err(TournamentError::NotEnoughPlayers(players_per_team));
        }
        Ok(Self {
            courts,
            teams,
            players_per_team,
        })
    }

    /// Creates a planner for teams named "Team 1", "Team 2", ...
    pub fn numbered(courts: u32, team_count: usize, players_per_team: u32) -> Result<Self, TournamentError> {
        Self::new(
            courts,
            (1..=team_count).map(|i| format!("Team {i}")),
            players_per_team,
        )
    }

    /// Team names in input order.
    pub fn teams(&self) -> &[String] {
        &self.teams
    }

    /// Number of courts.
    pub fn courts(&self) -> u32 {
        self.courts
    }

    /// Squads per team, i.e. courts a team can occupy at once.
    pub fn max_simultaneous(&self) -> u32 {
        self.players_per_team / 2
    }

    /// Every unordered pair of distinct teams, in list order.
    pub fn all_pairings(&self) -> Vec<Pairing> {
        pairs_in_order(&self.teams)
    }

    /// Plans as many rounds as fit into `total_minutes`.
    ///
    /// # Errors
    /// [`TournamentError::TooShort`] when not even one round fits.
    pub fn time_based_rounds(&self, total_minutes: Minutes) -> Result<TimedPlan, TournamentError> {
        let round_count = total_minutes / ROUND_MINUTES;
        if round_count == 0 {
            return Err(TournamentError::TooShort {
                available: total_minutes,
                round: ROUND_MINUTES,
            });
        }

        let mut games: BTreeMap<&str, u32> = self.teams.iter().map(|t| (t.as_str(), 0)).collect();
        let mut rounds = Vec::with_capacity(round_count as usize);
        for number in 1..=round_count {
            let matches = self.least_played_round(&games);
            for m in &matches {
                for team in [m.home.as_str(), m.away.as_str()] {
                    if let Some(count) = games.get_mut(team) {
                        *count += 1;
                    }
                }
            }
            rounds.push(Round::numbered(number, matches));
        }

        let stats = TimedStats::new(
            self.participation_stats(&rounds),
            rounds.len() as u32,
            total_minutes,
            self.courts,
        );
        Ok(TimedPlan { rounds, stats })
    }

    /// Full round robin, shuffled with a seeded RNG.
    pub fn round_robin(&self, seed: u64) -> Vec<Round> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.round_robin_with_rng(&mut rng)
    }

    /// Full round robin using the caller's RNG.
    ///
    /// Each round first takes matches between teams not yet playing in it,
    /// then fills free courts while respecting the squad limit. Rounds
    /// continue until every pairing is placed.
    pub fn round_robin_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Round> {
        let mut remaining = self.all_pairings();
        remaining.shuffle(rng);

        let courts = self.courts as usize;
        let mut rounds = Vec::new();
        while !remaining.is_empty() {
            let mut picked = vec![false; remaining.len()];
            let mut load: BTreeMap<&str, u32> = BTreeMap::new();
            let mut count = 0;

            // Disjoint matches first
            for (i, m) in remaining.iter().enumerate() {
                if count == courts {
                    break;
                }
                if !load.contains_key(m.home.as_str()) && !load.contains_key(m.away.as_str()) {
                    picked[i] = true;
                    count += 1;
                    *load.entry(m.home.as_str()).or_default() += 1;
                    *load.entry(m.away.as_str()).or_default() += 1;
                }
            }
            // Then fill remaining courts
            for (i, m) in remaining.iter().enumerate() {
                if count == courts {
                    break;
                }
                if picked[i] || !self.has_squad_free(&load, m) {
                    continue;
                }
                picked[i] = true;
                count += 1;
                *load.entry(m.home.as_str()).or_default() += 1;
                *load.entry(m.away.as_str()).or_default() += 1;
            }

            let mut matches = Vec::with_capacity(count);
            let mut rest = Vec::with_capacity(remaining.len() - count);
            for (m, taken) in remaining.into_iter().zip(picked) {
                if taken {
                    matches.push(m);
                } else {
                    rest.push(m);
                }
            }
            remaining = rest;
            rounds.push(Round::numbered(rounds.len() as u32 + 1, matches));
        }
        rounds
    }

    /// One round: teams paired in list order, free courts filled with
    /// further pairings where squads allow.
    pub fn single_round(&self) -> Round {
        let courts = self.courts as usize;
        let opening: Vec<&[String]> = self.teams.chunks_exact(2).take(courts).collect();

        let mut load: BTreeMap<&str, u32> = BTreeMap::new();
        for team in opening.iter().flat_map(|pair| pair.iter()) {
            *load.entry(team.as_str()).or_default() += 1;
        }
        let mut matches: Vec<Pairing> = opening
            .iter()
            .map(|pair| Pairing::new(pair[0].clone(), pair[1].clone()))
            .collect();
        let extra: Vec<Pairing> = self
            .all_pairings()
            .into_iter()
            .filter(|p| !matches.contains(p))
            .collect();
        for m in &extra {
            if matches.len() >= courts {
                break;
            }
            if self.has_squad_free(&load, m) {
                *load.entry(m.home.as_str()).or_default() += 1;
                *load.entry(m.away.as_str()).or_default() += 1;
                matches.push(m.clone());
            }
        }
        Round::numbered(1, matches)
    }

    /// Games per team across `rounds`.
    pub fn participation_stats(&self, rounds: &[Round]) -> ParticipationStats {
        participation_stats(&self.teams, rounds)
    }

    /// Squads of every team as engine participants, available in `window`.
    ///
    /// Squad ids are `"<team>/<n>"` with `n` starting at 1.
    pub fn squad_roster(&self, window: TimeWindow) -> Vec<Participant> {
        self.teams
            .iter()
            .flat_map(|team| {
                (1..=self.max_simultaneous()).map(move |n| {
                    Participant::new(squad_id(team, n))
                        .with_name(format!("{team} squad {n}"))
                        .with_window(window)
                })
            })
            .collect()
    }

    /// The planner's courts as engine courts, open during `window`.
    pub fn court_list(&self, window: TimeWindow) -> Vec<Court> {
        (1..=self.courts)
            .map(|n| {
                Court::new(format!("Court {n}")).with_open_hours(window.start, window.end)
            })
            .collect()
    }

    /// Converts rounds into fixed two-squad session requests.
    ///
    /// Within a round each team's matches use distinct squads. Earlier
    /// rounds get higher priority. Request ids are `"R<round>-M<n>"`.
    pub fn to_session_requests(&self, rounds: &[Round]) -> Vec<SessionRequest> {
        let total = rounds.len() as i32;
        let mut requests = Vec::new();
        for (index, round) in rounds.iter().enumerate() {
            let mut next_squad: BTreeMap<&str, u32> = BTreeMap::new();
            for (n, m) in round.matches.iter().enumerate() {
                let squads = [m.home.as_str(), m.away.as_str()].map(|team| {
                    let slot = next_squad.entry(team).or_insert(0);
                    *slot += 1;
                    squad_id(team, *slot)
                });
                requests.push(
                    SessionRequest::fixed(
                        format!("R{}-M{}", round.number, n + 1),
                        squads,
                        PLAY_MINUTES,
                    )
                    .with_priority(total - index as i32)
                    .with_seed(n as u64),
                );
            }
        }
        requests
    }

    fn has_squad_free(&self, load: &BTreeMap<&str, u32>, m: &Pairing) -> bool {
        let limit = self.max_simultaneous();
        let used = |team: &str| load.get(team).copied().unwrap_or(0);
        used(m.home.as_str()) < limit && used(m.away.as_str()) < limit
    }

    /// Matches for one time-based round, favouring teams with fewer games.
    fn least_played_round(&self, games: &BTreeMap<&str, u32>) -> Vec<Pairing> {
        let played = |team: &str| games.get(team).copied().unwrap_or(0);

        let mut by_games = self.teams.clone();
        by_games.sort_by_key(|t| played(t.as_str()));
        let mut candidates = pairs_in_order(&by_games);
        candidates.sort_by_key(|m| played(m.home.as_str()) + played(m.away.as_str()));

        let courts = self.courts as usize;
        let mut load: BTreeMap<&str, u32> = BTreeMap::new();
        let mut matches = Vec::new();
        for m in &candidates {
            if matches.len() >= courts {
                break;
            }
            if self.has_squad_free(&load, m) {
                *load.entry(m.home.as_str()).or_default() += 1;
                *load.entry(m.away.as_str()).or_default() += 1;
                matches.push(m.clone());
            }
        }
        matches
    }
}

fn squad_id(team: &str, n: u32) -> String {
    format!("{team}/{n}")
}

fn pairs_in_order(teams: &[String]) -> Vec<Pairing> {
    let mut pairs = Vec::with_capacity(teams.len() * teams.len().saturating_sub(1) / 2);
    for (i, home) in teams.iter().enumerate() {
        for away in &teams[i + 1..] {
            pairs.push(Pairing::new(home.clone(), away.clone()));
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{CourtScheduler, Fairness};

    #[test]
    fn test_new_rejects_bad_input() {
        assert_eq!(
            TournamentPlanner::new(2, ["A"], 4),
            Err(TournamentError::NotEnoughTeams(1))
        );
        assert_eq!(
            TournamentPlanner::new(2, ["A", "B", "A"], 4),
            Err(TournamentError::DuplicateTeam("A".into()))
        );
        assert_eq!(
            TournamentPlanner::new(0, ["A", "B"], 4),
            Err(TournamentError::NoCourts)
        );
        assert_eq!(
            TournamentPlanner::new(1, ["A", "B"], 1),
            Err(TournamentError::NotEnoughPlayers(1))
        );
    }

    #[test]
    fn test_all_pairings() {
        let planner = TournamentPlanner::numbered(2, 4, 4).unwrap();
        let pairs = planner.all_pairings();
        assert_eq!(pairs.len(), 6);
        assert_eq!(pairs[0], Pairing::new("Team 1", "Team 2"));
        assert_eq!(pairs[5], Pairing::new("Team 3", "Team 4"));
    }

    #[test]
    fn test_time_based_too_short() {
        let planner = TournamentPlanner::numbered(2, 4, 4).unwrap();
        assert_eq!(
            planner.time_based_rounds(19).unwrap_err(),
            TournamentError::TooShort {
                available: 19,
                round: 20
            }
        );
    }

    #[test]
    fn test_time_based_rounds() {
        let planner = TournamentPlanner::numbered(4, 8, 4).unwrap();
        let plan = planner.time_based_rounds(90).unwrap();

        assert_eq!(plan.rounds.len(), 4);
        assert_eq!(plan.rounds[1].window, TimeWindow::new(20, 35));
        assert!(plan.rounds.iter().all(|r| r.matches.len() == 4));
        assert_eq!(plan.stats.actual_duration, 80);
        assert!((plan.stats.court_utilization - 100.0).abs() < 1e-10);
        // 8 teams, 4 courts, 4 rounds: every team plays 4 games
        assert_eq!(plan.stats.participation.games_difference, 0);
        assert_eq!(plan.stats.participation.fairness, Fairness::VeryFair);
    }

    #[test]
    fn test_time_based_respects_squad_limit() {
        // One squad per team: no team twice in a round
        let planner = TournamentPlanner::numbered(3, 5, 2).unwrap();
        let plan = planner.time_based_rounds(100).unwrap();
        for round in &plan.rounds {
            assert_eq!(round.matches.len(), 2);
            for team in planner.teams() {
                assert!(round.matches.iter().filter(|m| m.involves(team)).count() <= 1);
            }
        }
    }

    #[test]
    fn test_round_robin_covers_every_pairing_once() {
        let planner = TournamentPlanner::numbered(3, 6, 2).unwrap();
        let rounds = planner.round_robin(42);

        let mut seen = HashSet::new();
        for round in &rounds {
            assert!(round.matches.len() <= 3);
            for m in &round.matches {
                assert!(seen.insert(m.clone()));
            }
            for team in planner.teams() {
                assert!(round.matches.iter().filter(|m| m.involves(team)).count() <= 1);
            }
        }
        assert_eq!(seen.len(), 15);
    }

    #[test]
    fn test_round_robin_is_seeded() {
        let planner = TournamentPlanner::numbered(2, 5, 4).unwrap();
        assert_eq!(planner.round_robin(1), planner.round_robin(1));
    }

    #[test]
    fn test_round_robin_fills_with_second_squad() {
        // Two teams, two courts, two squads each: still one pairing overall
        let planner = TournamentPlanner::numbered(2, 2, 4).unwrap();
        let rounds = planner.round_robin(0);
        assert_eq!(rounds.len(), 1);
        assert_eq!(rounds[0].matches.len(), 1);
    }

    #[test]
    fn test_single_round() {
        let planner = TournamentPlanner::numbered(3, 4, 4).unwrap();
        let round = planner.single_round();
        assert_eq!(
            round.matches,
            vec![
                Pairing::new("Team 1", "Team 2"),
                Pairing::new("Team 3", "Team 4"),
                Pairing::new("Team 1", "Team 3"),
            ]
        );
    }

    #[test]
    fn test_single_round_one_squad() {
        let planner = TournamentPlanner::numbered(3, 4, 2).unwrap();
        assert_eq!(planner.single_round().matches.len(), 2);
    }

    #[test]
    fn test_single_round_counts_opening_matches() {
        // Every pairing left for the third court involves a team already playing.
        let planner = TournamentPlanner::numbered(3, 5, 2).unwrap();
        let round = planner.single_round();
        assert_eq!(
            round.matches,
            vec![Pairing::new("Team 1", "Team 2"), Pairing::new("Team 3", "Team 4")]
        );

        let planner = TournamentPlanner::numbered(3, 5, 4).unwrap();
        let round = planner.single_round();
        assert_eq!(round.matches.len(), 3);
        assert_eq!(round.matches[2], Pairing::new("Team 1", "Team 3"));
    }

    #[test]
    fn test_squads_and_requests() {
        let planner = TournamentPlanner::numbered(2, 3, 4).unwrap();
        let roster = planner.squad_roster(TimeWindow::new(600, 720));
        assert_eq!(roster.len(), 6);
        assert_eq!(roster[1].id, "Team 1/2");

        let round = Round::numbered(
            1,
            vec![Pairing::new("Team 1", "Team 2"), Pairing::new("Team 1", "Team 3")],
        );
        let requests = planner.to_session_requests(&[round]);
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].id, "R1-M1");
        assert_eq!(
            requests[1].fixed_participants().unwrap(),
            &["Team 1/2".to_string(), "Team 3/1".to_string()]
        );
        assert_eq!(requests[0].duration, PLAY_MINUTES);
    }

    #[test]
    fn test_plan_runs_through_engine() {
        let planner = TournamentPlanner::numbered(2, 4, 4).unwrap();
        let window = TimeWindow::new(600, 720);
        let rounds = planner.round_robin(3);
        let schedule = CourtScheduler::new()
            .schedule(
                &planner.squad_roster(window),
                &planner.court_list(window),
                &planner.to_session_requests(&rounds),
                &window,
            )
            .unwrap();

        assert!(schedule.is_complete());
        assert_eq!(schedule.assignment_count(), 6);
    }
}
