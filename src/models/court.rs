//! Court model.
//!
//! A court is the exclusive resource a session is played on. Each court
//! has opening hours and a concurrent-session capacity.

use serde::{Deserialize, Serialize};

use super::{Calendar, Minutes, TimeWindow};

/// A court that sessions can be placed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Court {
    /// Unique court identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Opening hours.
    pub open_hours: Calendar,
    /// Number of sessions that may run simultaneously (default: 1).
    pub capacity: u32,
}

impl Court {
    /// Creates a closed court with capacity 1.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            open_hours: Calendar::new(),
            capacity: 1,
        }
    }

    /// Sets the court name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds an open window.
    pub fn with_open_hours(mut self, start: Minutes, end: Minutes) -> Self {
        self.open_hours.windows.push(TimeWindow::new(start, end));
        self
    }

    /// Adds an open window.
    pub fn with_open_window(mut self, window: TimeWindow) -> Self {
        self.open_hours.windows.push(window);
        self
    }

    /// Sets the concurrent-session capacity.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    /// Whether one open window covers `window`.
    pub fn is_open_for(&self, window: &TimeWindow) -> bool {
        self.open_hours.normalized().covers(window)
    }

    /// Open minutes inside `range`.
    pub fn open_minutes_within(&self, range: &TimeWindow) -> Minutes {
        self.open_hours
            .normalized()
            .clipped(range)
            .total_minutes()
    }
}
