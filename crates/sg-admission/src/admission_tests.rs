use super::*;
use chrono::{Duration, TimeZone};
use sg_config::PolicyTable;
use sg_core::ActionOutcome;

fn entry(timestamp: DateTime<Utc>) -> ActionLogEntry {
    ActionLogEntry::new(
        "subject-1",
        timestamp,
        ActionOutcome::Succeeded { product_count: 5 },
    )
}

/// Newest-first history from a list of timestamps (any order).
fn history(mut timestamps: Vec<DateTime<Utc>>) -> Vec<ActionLogEntry> {
    timestamps.sort();
    timestamps.reverse();
    timestamps.into_iter().map(entry).collect()
}

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
}

fn standard() -> PlanPolicy {
    PolicyTable::default().standard
}

fn premium() -> PlanPolicy {
    PolicyTable::default().premium
}

fn free() -> PlanPolicy {
    PolicyTable::default().free
}

#[test]
fn test_free_tier_always_denied() {
    let now = at(2024, 7, 15, 12, 0, 0);
    let decision = check_admission(&free(), &[], now);
    assert_eq!(
        decision,
        AdmissionDecision::Denied {
            reason: DenyReason::QuotaExceeded,
            retry_after_seconds: None,
        }
    );
}

#[test]
fn test_empty_history_standard_allowed() {
    let now = at(2024, 7, 15, 12, 0, 0);
    assert!(check_admission(&standard(), &[], now).is_allowed());
}

#[test]
fn test_quota_boundary_is_exclusive() {
    // Standard cap is 10: the 11th action this month must be denied even
    // though the cooldown has long elapsed.
    let now = at(2024, 7, 20, 12, 0, 0);
    let timestamps: Vec<_> = (1..=10).map(|d| at(2024, 7, d, 8, 0, 0)).collect();
    let decision = check_admission(&standard(), &history(timestamps), now);
    assert_eq!(
        decision,
        AdmissionDecision::Denied {
            reason: DenyReason::QuotaExceeded,
            retry_after_seconds: None,
        }
    );
}

#[test]
fn test_one_below_quota_allowed() {
    let now = at(2024, 7, 20, 12, 0, 0);
    let timestamps: Vec<_> = (1..=9).map(|d| at(2024, 7, d, 8, 0, 0)).collect();
    assert!(check_admission(&standard(), &history(timestamps), now).is_allowed());
}

#[test]
fn test_quota_resets_at_month_boundary() {
    // 10 actions in June leave July untouched.
    let now = at(2024, 7, 1, 0, 0, 30);
    let timestamps: Vec<_> = (11..=20).map(|d| at(2024, 6, d, 8, 0, 0)).collect();
    assert!(check_admission(&standard(), &history(timestamps), now).is_allowed());
}

#[test]
fn test_same_month_of_other_year_not_counted() {
    let now = at(2024, 7, 15, 12, 0, 0);
    let timestamps: Vec<_> = (1..=10).map(|d| at(2023, 7, d, 8, 0, 0)).collect();
    assert!(check_admission(&standard(), &history(timestamps), now).is_allowed());
}

#[test]
fn test_cooldown_blocks_strictly_inside_window() {
    // Standard cooldown is 300s: a check at T+299 is denied with
    // retry_after = 1.
    let last = at(2024, 7, 15, 12, 0, 0);
    let now = last + Duration::seconds(299);
    let decision = check_admission(&standard(), &history(vec![last]), now);
    assert_eq!(
        decision,
        AdmissionDecision::Denied {
            reason: DenyReason::Cooldown,
            retry_after_seconds: Some(1),
        }
    );
}

#[test]
fn test_cooldown_exact_elapse_allowed() {
    let last = at(2024, 7, 15, 12, 0, 0);
    let now = last + Duration::seconds(300);
    assert!(check_admission(&standard(), &history(vec![last]), now).is_allowed());
}

#[test]
fn test_cooldown_retry_after_rounds_up() {
    // 250.5s elapsed of 300 leaves 49.5s: retry_after reports 50.
    let last = at(2024, 7, 15, 12, 0, 0);
    let now = last + Duration::milliseconds(250_500);
    let decision = check_admission(&standard(), &history(vec![last]), now);
    assert_eq!(
        decision,
        AdmissionDecision::Denied {
            reason: DenyReason::Cooldown,
            retry_after_seconds: Some(50),
        }
    );
}

#[test]
fn test_future_last_entry_clamps_elapsed() {
    // Clock skew: last entry ahead of `now`. Elapsed clamps to zero, so
    // the full cooldown is reported, never more.
    let now = at(2024, 7, 15, 12, 0, 0);
    let last = now + Duration::seconds(120);
    let decision = check_admission(&standard(), &history(vec![last]), now);
    assert_eq!(
        decision,
        AdmissionDecision::Denied {
            reason: DenyReason::Cooldown,
            retry_after_seconds: Some(300),
        }
    );
}

#[test]
fn test_quota_takes_precedence_over_cooldown() {
    // 10 entries this month, most recent 10s ago: both checks would deny,
    // quota wins by evaluation order.
    let now = at(2024, 7, 20, 12, 0, 0);
    let mut timestamps: Vec<_> = (1..=9).map(|d| at(2024, 7, d, 8, 0, 0)).collect();
    timestamps.push(now - Duration::seconds(10));
    let decision = check_admission(&standard(), &history(timestamps), now);
    assert_eq!(
        decision,
        AdmissionDecision::Denied {
            reason: DenyReason::QuotaExceeded,
            retry_after_seconds: None,
        }
    );
}

#[test]
fn test_standard_scenario_nine_entries_recent_gap() {
    // 9 entries this month, most recent 400s ago: both checks pass.
    let now = at(2024, 7, 20, 12, 0, 0);
    let mut timestamps: Vec<_> = (1..=8).map(|d| at(2024, 7, d, 8, 0, 0)).collect();
    timestamps.push(now - Duration::seconds(400));
    assert!(check_admission(&standard(), &history(timestamps), now).is_allowed());
}

#[test]
fn test_premium_unbounded_quota() {
    let now = at(2024, 7, 20, 12, 0, 0);
    // 500 actions this month, all outside the 60s cooldown.
    let timestamps: Vec<_> = (0..500i64)
        .map(|i| now - Duration::seconds(120 + i * 90))
        .collect();
    assert!(check_admission(&premium(), &history(timestamps), now).is_allowed());
}

#[test]
fn test_premium_cooldown_scenario() {
    // Empty history admits; a second check 30s after the logged action is
    // denied with retry_after = 30 (premium cooldown is 60s).
    let t0 = at(2024, 7, 15, 12, 0, 0);
    assert!(check_admission(&premium(), &[], t0).is_allowed());

    let now = t0 + Duration::seconds(30);
    let decision = check_admission(&premium(), &history(vec![t0]), now);
    assert_eq!(
        decision,
        AdmissionDecision::Denied {
            reason: DenyReason::Cooldown,
            retry_after_seconds: Some(30),
        }
    );
}

#[test]
fn test_huge_cooldown_override_still_blocks() {
    // A cooldown beyond i64 milliseconds saturates instead of wrapping
    // negative, so the check keeps blocking.
    let policy = PlanPolicy {
        max_actions_per_month: None,
        cooldown_seconds: u64::MAX,
    };
    let last = at(2024, 7, 15, 12, 0, 0);
    let now = last + Duration::seconds(10);
    match check_admission(&policy, &history(vec![last]), now) {
        AdmissionDecision::Denied {
            reason: DenyReason::Cooldown,
            retry_after_seconds: Some(retry),
        } => assert!(retry > 0),
        other => panic!("Expected cooldown denial, got {:?}", other),
    }
}

#[test]
fn test_zero_cooldown_never_blocks() {
    let policy = PlanPolicy {
        max_actions_per_month: Some(100),
        cooldown_seconds: 0,
    };
    let now = at(2024, 7, 15, 12, 0, 0);
    assert!(check_admission(&policy, &history(vec![now]), now).is_allowed());
}

#[test]
fn test_actions_in_month_counting() {
    let now = at(2024, 7, 15, 12, 0, 0);
    let entries = history(vec![
        at(2024, 7, 1, 0, 0, 0),
        at(2024, 7, 31, 23, 59, 59),
        at(2024, 6, 30, 23, 59, 59),
        at(2024, 8, 1, 0, 0, 0),
        at(2023, 7, 15, 12, 0, 0),
    ]);
    assert_eq!(actions_in_month_of(&entries, now), 2);
}
