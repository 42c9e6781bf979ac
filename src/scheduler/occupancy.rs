//! Occupancy tracking for courts and participants.
//!
//! Each court and each participant owns one sorted interval list of the
//! sessions committed to it. Lists are ordered by `(start, end)` so that
//! overlap checks, neighbour lookups and per-day counts are binary searches.
//!
//! Participant lists never contain overlapping intervals. Court lists may,
//! up to the court's capacity.

use crate::models::{Minutes, TimeWindow, MINUTES_PER_DAY};

/// Sorted list of busy intervals for one court or participant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Occupancy {
    windows: Vec<TimeWindow>,
}

impl Occupancy {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn windows(&self) -> &[TimeWindow] {
        &self.windows
    }

    pub(crate) fn insert(&mut self, window: TimeWindow) {
        let idx = self.windows.partition_point(|w| *w < window);
        self.windows.insert(idx, window);
    }

    /// Removes one occurrence of `window`. Returns `false` if absent.
    pub(crate) fn remove(&mut self, window: &TimeWindow) -> bool {
        match self.windows.binary_search(window) {
            Ok(idx) => {
                self.windows.remove(idx);
                true
            }
            Err(_) => false,
        }
    }

    /// Whether `window` overlaps nothing. Valid for lists of disjoint intervals.
    pub(crate) fn is_free(&self, window: &TimeWindow) -> bool {
        // Disjoint and sorted: the last interval starting before `window.end`
        // has the greatest end among all candidates.
        let idx = self.windows.partition_point(|w| w.start < window.end);
        idx == 0 || self.windows[idx - 1].end <= window.start
    }

    /// Highest number of intervals running at once anywhere inside `window`.
    pub(crate) fn max_concurrent(&self, window: &TimeWindow) -> u32 {
        let upper = self.windows.partition_point(|w| w.start < window.end);
        let mut events: Vec<(Minutes, i32)> = Vec::new();
        for w in &self.windows[..upper] {
            if let Some(clipped) = w.intersect(window) {
                events.push((clipped.start, 1));
                events.push((clipped.end, -1));
            }
        }
        // Ends sort before starts at the same minute: [a, t) and [t, b) never overlap.
        events.sort_unstable();

        let mut running = 0i32;
        let mut peak = 0i32;
        for (_, delta) in events {
            running += delta;
            peak = peak.max(running);
        }
        peak.max(0) as u32
    }

    /// Number of intervals starting on `day`.
    pub(crate) fn count_on_day(&self, day: u32) -> u32 {
        let from = day.saturating_mul(MINUTES_PER_DAY);
        let to = from.saturating_add(MINUTES_PER_DAY);
        let lo = self.windows.partition_point(|w| w.start < from);
        let hi = self.windows.partition_point(|w| w.start < to);
        (hi - lo) as u32
    }

    /// Latest end at or before `at`, among intervals that end by then.
    pub(crate) fn previous_end(&self, at: Minutes) -> Option<Minutes> {
        let upper = self.windows.partition_point(|w| w.start < at);
        self.windows[..upper]
            .iter()
            .map(|w| w.end)
            .filter(|&end| end <= at)
            .max()
    }

    /// Earliest start at or after `at`.
    pub(crate) fn next_start(&self, at: Minutes) -> Option<Minutes> {
        let idx = self.windows.partition_point(|w| w.start < at);
        self.windows.get(idx).map(|w| w.start)
    }

    /// Gap to the nearest interval on the same day as `window`, for a
    /// disjoint list. `None` if nothing else is booked that day.
    pub(crate) fn same_day_gap(&self, window: &TimeWindow) -> Option<Minutes> {
        let day = window.start / MINUTES_PER_DAY;
        let idx = self.windows.partition_point(|w| w.start < window.start);
        let before = idx
            .checked_sub(1)
            .map(|i| self.windows[i])
            .filter(|w| w.start / MINUTES_PER_DAY == day)
            .map(|w| w.gap_to(window));
        let after = self
            .windows
            .get(idx)
            .filter(|w| w.start / MINUTES_PER_DAY == day)
            .map(|w| w.gap_to(window));
        match (before, after) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Whether an interval ends exactly at `window.start` or starts exactly
    /// at `window.end`.
    pub(crate) fn touches(&self, window: &TimeWindow) -> bool {
        let idx = self.windows.partition_point(|w| w.start < window.start);
        let ends_at_start = idx
            .checked_sub(1)
            .is_some_and(|i| self.windows[i].end == window.start);
        let starts_at_end = self.windows[idx..]
            .iter()
            .take_while(|w| w.start <= window.end)
            .any(|w| w.start == window.end);
        ends_at_start || starts_at_end
    }
}
