//! Court scheduling domain models.
//!
//! Provides the input and output types of a scheduling call.
//!
//! # Domain Mappings
//!
//! | tennis-schedule | Club play | Tournament | Coaching |
//! |-----------------|-----------|------------|----------|
//! | Participant | Member | Team squad | Student |
//! | Court | Court | Court | Court / ball machine |
//! | SessionRequest | Booking wish | Match | Lesson |
//! | Schedule | Day plan | Order of play | Timetable |

mod calendar;
mod court;
mod participant;
mod request;
mod schedule;

pub use calendar::{
    day_of, format_clock, parse_clock, Calendar, Minutes, TimeWindow, MINUTES_PER_DAY,
};
pub use court::Court;
pub use participant::Participant;
pub use request::{ParticipantSelection, SessionRequest};
pub use schedule::{Assignment, InputWarning, Schedule, Unscheduled, UnscheduledReason};
