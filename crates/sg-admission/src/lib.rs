//! Plan-gated admission for real-time fetch requests.
//!
//! A pure decision function over caller-supplied state: the caller reads
//! the subject's action history (newest first) and passes `now` explicitly,
//! so decisions are reproducible in tests and never perform I/O. Denial is
//! a value, not an error; the boundary maps it to HTTP 429.

use chrono::{DateTime, Datelike, Utc};
use sg_config::PlanPolicy;
use sg_core::{ActionLogEntry, AdmissionDecision, DenyReason};
use tracing::debug;

/// Decide whether a new fetch action is admitted for a subject right now.
///
/// `history` must be ordered newest first; `history[0]` is the most recent
/// attempt. Two independent checks, both of which must pass:
///
/// 1. Monthly quota: actions already logged in the same calendar month
///    (UTC) as `now`, compared against the plan's cap. A subject exactly
///    at the cap is denied.
/// 2. Cooldown: the most recent action must be at least `cooldown_seconds`
///    old. A subject whose cooldown has exactly elapsed is admitted.
///
/// Quota is evaluated first, so a subject failing both checks is reported
/// as `QuotaExceeded`.
///
/// Denied attempts must not be appended to the log: they consume no quota
/// and do not reset the cooldown.
pub fn check_admission(
    policy: &PlanPolicy,
    history: &[ActionLogEntry],
    now: DateTime<Utc>,
) -> AdmissionDecision {
    if let Some(max) = policy.max_actions_per_month {
        let used = actions_in_month_of(history, now);
        if used >= max {
            debug!(used, max, "Admission denied: monthly quota exhausted");
            return AdmissionDecision::Denied {
                reason: DenyReason::QuotaExceeded,
                retry_after_seconds: None,
            };
        }
    }

    if policy.cooldown_seconds > 0
        && let Some(last) = history.first()
    {
        // Millisecond arithmetic so a check 500ms into a 1s window still
        // blocks. Negative elapsed (last entry in the future) clamps to 0.
        let elapsed_ms = now
            .signed_duration_since(last.timestamp)
            .num_milliseconds()
            .max(0);
        // Saturate rather than wrap: an absurd configured cooldown must
        // keep blocking, not overflow into a disabled check.
        let cooldown_ms = i64::try_from(policy.cooldown_seconds)
            .unwrap_or(i64::MAX)
            .saturating_mul(1000);
        if elapsed_ms < cooldown_ms {
            let retry_after = remaining_ms_to_secs(cooldown_ms - elapsed_ms);
            debug!(elapsed_ms, cooldown_ms, retry_after, "Admission denied: cooldown active");
            return AdmissionDecision::Denied {
                reason: DenyReason::Cooldown,
                retry_after_seconds: Some(retry_after),
            };
        }
    }

    AdmissionDecision::Allowed
}

/// Count log entries in the same UTC calendar month (and year) as `now`.
///
/// The quota window is the calendar month, not a rolling 30 days: the
/// count resets at the month boundary regardless of when in the month the
/// actions occurred.
fn actions_in_month_of(history: &[ActionLogEntry], now: DateTime<Utc>) -> u32 {
    history
        .iter()
        .filter(|entry| {
            entry.timestamp.year() == now.year() && entry.timestamp.month() == now.month()
        })
        .count() as u32
}

/// Ceiling division of a remaining-time span to whole seconds.
fn remaining_ms_to_secs(remaining_ms: i64) -> u64 {
    (remaining_ms.saturating_add(999) / 1000) as u64
}

#[cfg(test)]
#[path = "admission_tests.rs"]
mod tests;
