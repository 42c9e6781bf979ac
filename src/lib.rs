//! Tennis court scheduling.
//!
//! Assigns session requests (matches, lessons, doubles games) to courts and
//! time slots within a horizon, respecting participant availability, court
//! opening hours, court capacity and per-day session caps.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Participant`, `Court`, `SessionRequest`,
//!   `Schedule`, `Assignment`, `TimeWindow`, `Calendar`
//! - **`scheduler`**: `CourtScheduler` (greedy placement with bounded repair),
//!   pluggable scoring, `ScheduleKpi`
//! - **`tournament`**: Round-robin, time-based and single-round team plans
//! - **`validation`**: Input integrity checks (inverted windows, duplicate IDs,
//!   unknown participants)
//! - **`config`**: `EngineConfig`, loadable from JSON
//! - **`error`**: Error types
//! - **`telemetry`**: `tracing` subscriber setup
//!
//! # Outcomes
//!
//! Malformed input is a hard error ([`SchedulingError::InvalidInput`]).
//! Requests that simply do not fit are soft outcomes: they are listed in
//! [`Schedule::unscheduled`](models::Schedule::unscheduled) with a reason,
//! and unusable participants or courts produce warnings.
//!
//! # Example
//!
//! ```
//! use tennis_schedule::models::{Court, Participant, SessionRequest, TimeWindow};
//!
//! let participants = vec![
//!     Participant::new("anna").with_availability(540, 660),
//!     Participant::new("ben").with_availability(540, 660),
//! ];
//! let courts = vec![Court::new("C1").with_open_hours(540, 1020)];
//! let requests = vec![SessionRequest::fixed("final", ["anna", "ben"], 90)];
//! let horizon = TimeWindow::parse("08:00-18:00").unwrap();
//!
//! let schedule = tennis_schedule::schedule(&participants, &courts, &requests, &horizon).unwrap();
//! assert!(schedule.is_complete());
//! assert_eq!(schedule.assignments[0].window.to_string(), "09:00-10:30");
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod telemetry;
pub mod tournament;
pub mod validation;

pub use config::EngineConfig;
pub use error::{ConfigError, ScheduleResult, SchedulingError, TournamentError};
pub use scheduler::{schedule, CourtScheduler, ScheduleKpi};
