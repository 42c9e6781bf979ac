//! Time windows and availability calendars.
//!
//! Defines when a participant can play and when a court is open.
//!
//! # Time Model
//! All times are whole minutes relative to a scheduling epoch chosen by the
//! caller (e.g. midnight of the first tournament day). Minute `m` belongs to
//! day `m / 1440`.
//!
//! # Interval Semantics
//! Windows are half-open `[start, end)`, so a session ending at 10:00 and
//! another starting at 10:00 do not overlap.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Minutes relative to the scheduling epoch.
pub type Minutes = u32;

/// Minutes in one day.
pub const MINUTES_PER_DAY: Minutes = 24 * 60;

/// Day index of a minute timestamp.
#[inline]
pub fn day_of(minute: Minutes) -> u32 {
    minute / MINUTES_PER_DAY
}

/// Parses a clock time (`HH:MM`) into minutes since midnight.
///
/// Hours up to 24 are accepted so that `24:00` can close a day.
pub fn parse_clock(text: &str) -> Option<Minutes> {
    let (hours, minutes) = text.trim().split_once(':')?;
    let hours: Minutes = hours.trim().parse().ok()?;
    let minutes: Minutes = minutes.trim().parse().ok()?;
    if minutes >= 60 || hours > 24 || (hours == 24 && minutes != 0) {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Formats minutes as `HH:MM`. Hours are not wrapped at 24.
pub fn format_clock(minutes: Minutes) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// A time interval [start, end) in minutes.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TimeWindow {
    /// Interval start (inclusive).
    pub start: Minutes,
    /// Interval end (exclusive).
    pub end: Minutes,
}

impl TimeWindow {
    /// Creates a new time window.
    pub fn new(start: Minutes, end: Minutes) -> Self {
        Self { start, end }
    }

    /// Creates a window of `duration` minutes starting at `start`.
    pub fn starting_at(start: Minutes, duration: Minutes) -> Self {
        Self::new(start, start.saturating_add(duration))
    }

    /// Parses `HH:MM-HH:MM` on day 0.
    ///
    /// # Example
    /// ```
    /// use tennis_schedule::models::TimeWindow;
    ///
    /// let w = TimeWindow::parse("09:00-12:30").unwrap();
    /// assert_eq!(w, TimeWindow::new(540, 750));
    /// ```
    pub fn parse(text: &str) -> Option<Self> {
        let (start, end) = text.split_once('-')?;
        Some(Self::new(parse_clock(start)?, parse_clock(end)?))
    }

    /// Duration of this window (0 for inverted windows).
    #[inline]
    pub fn duration(&self) -> Minutes {
        self.end.saturating_sub(self.start)
    }

    /// Whether `end <= start`.
    #[inline]
    pub fn is_inverted(&self) -> bool {
        self.end <= self.start
    }

    /// Whether a minute falls within this window.
    #[inline]
    pub fn contains(&self, minute: Minutes) -> bool {
        minute >= self.start && minute < self.end
    }

    /// Whether two windows overlap.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether `other` lies entirely inside this window.
    #[inline]
    pub fn covers(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Intersection of two windows, `None` if they do not overlap.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (end > start).then_some(Self::new(start, end))
    }

    /// Minutes between the two windows (0 if they touch or overlap).
    pub fn gap_to(&self, other: &Self) -> Minutes {
        if other.start >= self.end {
            other.start - self.end
        } else if self.start >= other.end {
            self.start - other.end
        } else {
            0
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", format_clock(self.start), format_clock(self.end))
    }
}

/// A set of availability windows.
///
/// Windows are kept sorted by start. Overlapping or touching windows are
/// merged when the calendar is normalized, so coverage checks only need to
/// look at a single window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    /// Periods of availability.
    pub windows: Vec<TimeWindow>,
}

impl Calendar {
    /// Creates an empty calendar (never available).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a calendar from windows.
    pub fn from_windows(windows: impl IntoIterator<Item = TimeWindow>) -> Self {
        Self {
            windows: windows.into_iter().collect(),
        }
    }

    /// Adds an availability window.
    pub fn with_window(mut self, start: Minutes, end: Minutes) -> Self {
        self.windows.push(TimeWindow::new(start, end));
        self
    }

    /// Whether the calendar has no windows.
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Returns the first inverted window, if any.
    pub fn first_inverted(&self) -> Option<&TimeWindow> {
        self.windows.iter().find(|w| w.is_inverted())
    }

    /// Sorted, merged copy. Inverted windows are dropped.
    pub fn normalized(&self) -> Self {
        let mut sorted: Vec<TimeWindow> = self
            .windows
            .iter()
            .filter(|w| !w.is_inverted())
            .copied()
            .collect();
        sorted.sort();

        let mut merged: Vec<TimeWindow> = Vec::with_capacity(sorted.len());
        for w in sorted {
            match merged.last_mut() {
                Some(last) if w.start <= last.end => last.end = last.end.max(w.end),
                _ => merged.push(w),
            }
        }
        Self { windows: merged }
    }

    /// Restricts the calendar to `range`.
    pub fn clipped(&self, range: &TimeWindow) -> Self {
        Self {
            windows: self
                .windows
                .iter()
                .filter_map(|w| w.intersect(range))
                .collect(),
        }
    }

    /// Intersection of two calendars. Both must be normalized.
    pub fn intersection(&self, other: &Self) -> Self {
        let mut out = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.windows.len() && j < other.windows.len() {
            let a = self.windows[i];
            let b = other.windows[j];
            if let Some(w) = a.intersect(&b) {
                out.push(w);
            }
            if a.end < b.end {
                i += 1;
            } else {
                j += 1;
            }
        }
        Self { windows: out }
    }

    /// Whether some single window covers `window`. The calendar must be
    /// normalized for a merged span to count as one window.
    pub fn covers(&self, window: &TimeWindow) -> bool {
        // Last window starting at or before `window.start`.
        let idx = self.windows.partition_point(|w| w.start <= window.start);
        idx > 0 && self.windows[idx - 1].covers(window)
    }

    /// Total available minutes.
    pub fn total_minutes(&self) -> Minutes {
        self.windows.iter().map(TimeWindow::duration).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_window() {
        let w = TimeWindow::new(100, 200);
        assert_eq!(w.duration(), 100);
        assert!(w.contains(100));
        assert!(w.contains(199));
        assert!(!w.contains(200)); // exclusive end
        assert!(!w.contains(50));
    }

    #[test]
    fn test_time_window_overlap() {
        let a = TimeWindow::new(0, 100);
        let b = TimeWindow::new(50, 150);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));

        let c = TimeWindow::new(100, 200); // touching but not overlapping
        assert!(!a.overlaps(&c));
        assert_eq!(a.gap_to(&c), 0);
        assert_eq!(a.gap_to(&TimeWindow::new(130, 160)), 30);
        assert_eq!(TimeWindow::new(130, 160).gap_to(&a), 30);
    }

    #[test]
    fn test_inverted_window() {
        assert!(TimeWindow::new(10, 10).is_inverted());
        assert!(TimeWindow::new(20, 10).is_inverted());
        assert_eq!(TimeWindow::new(20, 10).duration(), 0);
        assert!(!TimeWindow::new(10, 11).is_inverted());
    }

    #[test]
    fn test_intersect_and_covers() {
        let a = TimeWindow::new(540, 720);
        let b = TimeWindow::new(600, 780);
        assert_eq!(a.intersect(&b), Some(TimeWindow::new(600, 720)));
        assert_eq!(a.intersect(&TimeWindow::new(720, 800)), None);
        assert!(a.covers(&TimeWindow::new(540, 600)));
        assert!(!a.covers(&TimeWindow::new(700, 740)));
    }

    #[test]
    fn test_clock_parsing() {
        assert_eq!(parse_clock("09:30"), Some(570));
        assert_eq!(parse_clock(" 00:00 "), Some(0));
        assert_eq!(parse_clock("24:00"), Some(1440));
        assert_eq!(parse_clock("24:30"), None);
        assert_eq!(parse_clock("12:60"), None);
        assert_eq!(parse_clock("noon"), None);
        assert_eq!(format_clock(570), "09:30");
        assert_eq!(TimeWindow::new(540, 600).to_string(), "09:00-10:00");
    }

    #[test]
    fn test_calendar_normalize_merges() {
        let cal = Calendar::new()
            .with_window(600, 660)
            .with_window(540, 600) // touching
            .with_window(700, 650); // inverted, dropped
        let n = cal.normalized();
        assert_eq!(n.windows, vec![TimeWindow::new(540, 660)]);
        assert!(n.covers(&TimeWindow::new(570, 630)));
        assert!(!cal.covers(&TimeWindow::new(570, 630)));
    }

    #[test]
    fn test_calendar_covers_binary_search() {
        let cal = Calendar::new()
            .with_window(0, 100)
            .with_window(200, 300)
            .with_window(400, 500)
            .normalized();
        assert!(cal.covers(&TimeWindow::new(200, 300)));
        assert!(cal.covers(&TimeWindow::new(450, 500)));
        assert!(!cal.covers(&TimeWindow::new(90, 110)));
        assert!(!cal.covers(&TimeWindow::new(150, 160)));
    }

    #[test]
    fn test_calendar_intersection_and_clip() {
        let a = Calendar::new().with_window(480, 720).with_window(900, 1000);
        let b = Calendar::new().with_window(540, 960);
        let i = a.normalized().intersection(&b.normalized());
        assert_eq!(
            i.windows,
            vec![TimeWindow::new(540, 720), TimeWindow::new(900, 960)]
        );
        assert_eq!(i.total_minutes(), 240);

        let clipped = a.clipped(&TimeWindow::new(600, 950));
        assert_eq!(
            clipped.windows,
            vec![TimeWindow::new(600, 720), TimeWindow::new(900, 950)]
        );
    }
}
