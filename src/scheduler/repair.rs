//! Bounded local repair.
//!
//! After the greedy pass, each unscheduled request gets a second chance:
//! a single committed session may be shifted to another feasible slot, or
//! two committed sessions of equal length may trade slots, if that lets
//! the request fit. Every slot scan the pass runs, pruning checks
//! included, is paid from one shared budget.

use tracing::debug;

use crate::models::UnscheduledReason;

use super::state::{Placement, Search, WorkingState};

/// Slot scans left for the whole pass.
struct Budget {
    used: u32,
    limit: u32,
}

impl Budget {
    fn new(limit: u32) -> Self {
        Self { used: 0, limit }
    }

    /// Takes one unit, or returns `false` when none is left.
    fn spend(&mut self) -> bool {
        if self.used >= self.limit {
            return false;
        }
        self.used += 1;
        true
    }

    fn exhausted(&self) -> bool {
        self.used >= self.limit
    }
}

/// Tries to place each failed request. Returns the requests that still
/// do not fit, in their original order.
///
/// Runs at most `budget` slot scans in total.
pub(crate) fn repair(
    state: &mut WorkingState<'_>,
    failed: Vec<(usize, UnscheduledReason)>,
    budget: u32,
) -> Vec<(usize, UnscheduledReason)> {
    let mut budget = Budget::new(budget);
    let mut remaining = Vec::with_capacity(failed.len());

    for (request, reason) in failed {
        if !budget.exhausted()
            && (try_shift(state, request, &mut budget) || try_swap(state, request, &mut budget))
        {
            continue;
        }
        remaining.push((request, reason));
    }

    if budget.limit > 0 {
        debug!(
            attempts = budget.used,
            budget = budget.limit,
            unresolved = remaining.len(),
            "repair pass finished"
        );
    }
    remaining
}

/// Commits `target` if it fits in the current state.
fn place_target(state: &mut WorkingState<'_>, target: usize) -> bool {
    match state.search_request(target) {
        Search::Found(placement) => {
            state.commit(placement);
            true
        }
        Search::Failed(_) => false,
    }
}

fn target_fits(state: &WorkingState<'_>, target: usize) -> bool {
    matches!(state.search_request(target), Search::Found(_))
}

fn try_shift(state: &mut WorkingState<'_>, target: usize, budget: &mut Budget) -> bool {
    for index in 0..state.placements.len() {
        if !budget.spend() {
            return false;
        }
        let original = state.release(index);

        // Moving this session cannot help if removing it outright does not.
        if !target_fits(state, target) || !budget.spend() {
            state.restore(index, original);
            continue;
        }

        let alternatives = state.feasible_slots(original.window.duration(), &original.participants);
        for (court, window) in alternatives {
            if court == original.court && window == original.window {
                continue;
            }
            if !budget.spend() {
                state.restore(index, original);
                return false;
            }

            state.restore(
                index,
                Placement {
                    court,
                    window,
                    ..original.clone()
                },
            );
            if place_target(state, target) {
                debug!(
                    request = %state.requests[target].id,
                    moved = %state.requests[original.request].id,
                    from = %original.window,
                    to = %window,
                    "repair shifted a session"
                );
                return true;
            }
            state.release(index);
        }
        state.restore(index, original);
    }
    false
}

fn try_swap(state: &mut WorkingState<'_>, target: usize, budget: &mut Budget) -> bool {
    let count = state.placements.len();
    for i in 0..count {
        for j in (i + 1)..count {
            {
                let (a, b) = (&state.placements[i], &state.placements[j]);
                if a.window == b.window || a.window.duration() != b.window.duration() {
                    continue;
                }
            }
            if !budget.spend() {
                return false;
            }

            // Release the later index first so `i` stays valid.
            let b = state.release(j);
            let a = state.release(i);
            if target_fits(state, target)
                && budget.spend()
                && swap_and_place(state, target, i, j, &a, &b)
            {
                debug!(
                    request = %state.requests[target].id,
                    first = %state.requests[a.request].id,
                    second = %state.requests[b.request].id,
                    "repair swapped two sessions"
                );
                return true;
            }
            state.restore(i, a);
            state.restore(j, b);
        }
    }
    false
}

/// Puts `a` in `b`'s slot and `b` in `a`'s, then places `target`.
/// On failure both sessions are left released.
fn swap_and_place(
    state: &mut WorkingState<'_>,
    target: usize,
    i: usize,
    j: usize,
    a: &Placement,
    b: &Placement,
) -> bool {
    let a_moved = Placement {
        court: b.court,
        window: b.window,
        ..a.clone()
    };
    let b_moved = Placement {
        court: a.court,
        window: a.window,
        ..b.clone()
    };
    if !state.fits(a_moved.court, &a_moved.window, &a_moved.participants) {
        return false;
    }
    state.restore(i, a_moved);
    if state.fits(b_moved.court, &b_moved.window, &b_moved.participants) {
        state.restore(j, b_moved);
        if place_target(state, target) {
            return true;
        }
        state.release(j);
    }
    state.release(i);
    false
}
