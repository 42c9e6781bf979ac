//! Court scheduling engine and KPI evaluation.
//!
//! # Algorithm
//!
//! `CourtScheduler` is a deterministic greedy placer followed by a bounded
//! local repair pass. It is not optimal, but its worst-case runtime is
//! predictable and identical inputs always give identical schedules.
//!
//! Occupancy is tracked per court and per participant as sorted interval
//! lists; overlap checks are binary searches.
//!
//! # Scoring
//!
//! Placements that share the earliest start are ranked by an injected
//! scoring function (see [`Scorer`]). The default adds court fragmentation
//! to the participants' idle-gap, balance and back-to-back costs.
//!
//! # KPI
//!
//! `ScheduleKpi` reports sessions per participant, fairness, court
//! utilization, idle minutes and back-to-back sessions.

mod engine;
mod kpi;
mod occupancy;
mod repair;
mod scoring;
mod state;

pub use engine::{schedule, CourtScheduler, ScheduleInput};
pub use kpi::{Fairness, ScheduleKpi};
pub use scoring::{default_score, Candidate, Score, ScoreFn, Scorer};
