//! Deterministic A/B bucketing with weekly search-pattern rotation.
//!
//! A subject draws a group once on first contact; everything else is a
//! pure function of the stored assignment and the current time. The
//! week-parity rotation gives each group exposure to both patterns over
//! the experiment's duration while keeping within-week behavior
//! reproducible for a given subject.

use chrono::{DateTime, Utc};
use rand::random;
use sg_core::{AbGroup, ExperimentAssignment, SearchPattern};
use tracing::debug;

const WEEK_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Draw an experiment group for a subject seen for the first time.
///
/// Fair coin, no cryptographic requirement. The caller persists the
/// result together with `assigned_at = now` and never re-draws; admission
/// and pattern derivation only ever read the stored record.
pub fn assign_group() -> AbGroup {
    if random::<bool>() {
        AbGroup::A
    } else {
        AbGroup::B
    }
}

/// Build the assignment record persisted on first contact.
pub fn new_assignment(now: DateTime<Utc>) -> ExperimentAssignment {
    let assignment = ExperimentAssignment {
        group: assign_group(),
        assigned_at: now,
    };
    debug!(group = %assignment.group, "Drew experiment group");
    assignment
}

/// 1-based week number since assignment: `floor(elapsed / 7d) + 1`.
///
/// Non-decreasing as `now` advances; week 1 at the instant of assignment.
/// An `assigned_at` in the future (clock skew, corrupted record) clamps
/// to week 1 rather than going to zero or negative.
pub fn current_week(assigned_at: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let elapsed = now.signed_duration_since(assigned_at).num_seconds();
    if elapsed < 0 {
        return 1;
    }
    (elapsed / WEEK_SECONDS) as u32 + 1
}

/// Pattern in effect for a group in a given week.
///
/// Odd weeks: A gets AND, B gets OR. Even weeks swap, so the rotation
/// has period 2 keyed on week parity.
pub fn pattern_for_group(group: AbGroup, week: u32) -> SearchPattern {
    let odd_week = week % 2 == 1;
    match (group, odd_week) {
        (AbGroup::A, true) | (AbGroup::B, false) => SearchPattern::And,
        (AbGroup::A, false) | (AbGroup::B, true) => SearchPattern::Or,
    }
}

/// Week number and pattern in effect for a stored assignment at `now`.
///
/// Callers stamp both onto the action log, so the pair is derived in one
/// place.
pub fn rotation_at(
    assignment: &ExperimentAssignment,
    now: DateTime<Utc>,
) -> (u32, SearchPattern) {
    let week = current_week(assignment.assigned_at, now);
    (week, pattern_for_group(assignment.group, week))
}
