use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subscription tier controlling feature access and usage limits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    #[default]
    Free,
    Standard,
    Premium,
}

impl PlanTier {
    /// Returns the wire-facing name for this tier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Standard => "standard",
            Self::Premium => "premium",
        }
    }

    /// Lenient parse used at the request boundary.
    ///
    /// Unknown tier strings degrade to `Free` (the most restrictive
    /// policy) instead of erroring, so a malformed plan claim can never
    /// widen a subject's limits.
    pub fn parse_lenient(s: &str) -> Self {
        match s {
            "standard" => Self::Standard,
            "premium" => Self::Premium,
            _ => Self::Free,
        }
    }
}

impl std::fmt::Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stable experiment bucket for a subject. Drawn once on first contact,
/// never re-derived.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbGroup {
    A,
    B,
}

impl AbGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
        }
    }
}

impl std::fmt::Display for AbGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Search-combination mode applied to the downstream scrape query.
///
/// Derived from (group, week) on every request; never stored as subject
/// state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SearchPattern {
    And,
    Or,
}

impl SearchPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

impl std::fmt::Display for SearchPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-subject experiment assignment record.
///
/// `assigned_at` anchors week-number computation and is set exactly once,
/// when the group is first drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentAssignment {
    pub group: AbGroup,
    pub assigned_at: DateTime<Utc>,
}

/// Experiment metadata stamped on each log entry for later analysis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentStamp {
    pub group: AbGroup,
    pub week: u32,
    pub pattern: SearchPattern,
}

/// How an attempted fetch action resolved downstream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActionOutcome {
    Succeeded { product_count: u32 },
    Failed { message: String },
}

/// One attempted real-time fetch. Append-only; the log is queried newest
/// first for admission decisions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLogEntry {
    pub subject_id: String,
    pub timestamp: DateTime<Utc>,
    pub outcome: ActionOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experiment: Option<ExperimentStamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_case: Option<String>,
}

impl ActionLogEntry {
    pub fn new(
        subject_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        outcome: ActionOutcome,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            timestamp,
            outcome,
            experiment: None,
            use_case: None,
        }
    }
}

/// Machine-readable reason for refusing a fetch request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// Monthly quota for the subject's plan is exhausted.
    QuotaExceeded,
    /// The previous action is still inside the cooldown window.
    Cooldown,
}

/// Result of an admission check. Denial is a value, not an error; the
/// boundary maps it to an HTTP 429-equivalent response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum AdmissionDecision {
    Allowed,
    Denied {
        reason: DenyReason,
        /// Seconds until a retry can succeed. Set for `Cooldown` only;
        /// a quota denial lasts until the calendar month rolls over.
        #[serde(skip_serializing_if = "Option::is_none")]
        retry_after_seconds: Option<u64>,
    },
}

impl AdmissionDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}
