//! Participant (player, pair, or squad) model.
//!
//! A participant is anyone who occupies a place in a session. The engine
//! treats participants as exclusive: one participant cannot be in two
//! overlapping sessions.

use serde::{Deserialize, Serialize};

use super::{Calendar, Minutes, TimeWindow};

/// A participant that can be bound to sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Unique participant identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Periods when the participant can play.
    pub availability: Calendar,
    /// Maximum sessions per day. `None` = unlimited.
    pub max_sessions_per_day: Option<u32>,
}

impl Participant {
    /// Creates a participant with no availability.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            availability: Calendar::new(),
            max_sessions_per_day: None,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds an availability window.
    pub fn with_availability(mut self, start: Minutes, end: Minutes) -> Self {
        self.availability.windows.push(TimeWindow::new(start, end));
        self
    }

    /// Adds an availability window given as `TimeWindow`.
    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.availability.windows.push(window);
        self
    }

    /// Caps the number of sessions per day.
    pub fn with_max_sessions_per_day(mut self, cap: u32) -> Self {
        self.max_sessions_per_day = Some(cap);
        self
    }

    /// Display name, falling back to the id.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    /// Whether one availability window (after merging) covers `window`.
    pub fn is_available_for(&self, window: &TimeWindow) -> bool {
        self.availability.normalized().covers(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participant_builder() {
        let p = Participant::new("anna")
            .with_name("Anna K.")
            .with_availability(540, 720)
            .with_max_sessions_per_day(2);

        assert_eq!(p.id, "anna");
        assert_eq!(p.display_name(), "Anna K.");
        assert_eq!(p.availability.windows.len(), 1);
        assert_eq!(p.max_sessions_per_day, Some(2));
    }

    #[test]
    fn test_display_name_fallback() {
        assert_eq!(Participant::new("p7").display_name(), "p7");
    }

    #[test]
    fn test_is_available_for() {
        let p = Participant::new("p")
            .with_availability(540, 600)
            .with_availability(600, 660);
        // Touching windows merge into 09:00-11:00
        assert!(p.is_available_for(&TimeWindow::new(570, 630)));
        assert!(!p.is_available_for(&TimeWindow::new(650, 700)));
    }
}
