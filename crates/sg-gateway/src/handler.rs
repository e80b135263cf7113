//! The admit → bucket → scrape → log pipeline for one inbound request.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sg_admission::check_admission;
use sg_bucketing::{new_assignment, rotation_at};
use sg_config::PolicyTable;
use sg_core::{
    AbGroup, ActionLogEntry, ActionOutcome, AdmissionDecision, DenyReason, ExperimentAssignment,
    ExperimentStamp, PlanTier, SearchPattern,
};
use tracing::{debug, info, warn};

use crate::scraper::{ScrapeJob, ScraperClient};
use crate::store::{ActionLogStore, AssignmentStore};

/// Inbound real-time fetch request, already authenticated upstream.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub subject_id: String,
    pub plan: PlanTier,
    pub query: String,
    pub category: Option<String>,
    pub period: Option<String>,
    pub use_case: Option<String>,
}

/// What the HTTP layer surfaces for one request.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Admitted and scraped; `products` may be empty.
    Fetched {
        products: Vec<serde_json::Value>,
        group: AbGroup,
        week: u32,
        pattern: SearchPattern,
    },
    /// Refused before any downstream call.
    Denied {
        reason: DenyReason,
        retry_after_seconds: Option<u64>,
    },
    /// Admitted but the downstream scrape failed. The attempt is still
    /// logged and counts toward quota.
    Failed { message: String },
}

impl FetchOutcome {
    /// HTTP status the boundary responds with.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Fetched { .. } => 200,
            Self::Denied { .. } => 429,
            Self::Failed { .. } => 502,
        }
    }
}

/// Stateless request gateway over injected storage and scraper clients.
pub struct Gateway<L, A, S> {
    policies: PolicyTable,
    log: L,
    assignments: A,
    scraper: S,
}

impl<L, A, S> Gateway<L, A, S>
where
    L: ActionLogStore,
    A: AssignmentStore,
    S: ScraperClient,
{
    pub fn new(policies: PolicyTable, log: L, assignments: A, scraper: S) -> Self {
        Self {
            policies,
            log,
            assignments,
            scraper,
        }
    }

    /// Handle one fetch request at wall-clock time `now`.
    ///
    /// `now` is passed in rather than sampled so the whole pipeline stays
    /// reproducible under test. Errors are storage/transport failures
    /// only; a refused request is the `Denied` outcome, not an `Err`.
    pub async fn handle_fetch(
        &self,
        request: &FetchRequest,
        now: DateTime<Utc>,
    ) -> Result<FetchOutcome> {
        let policy = self.policies.policy_for(request.plan);
        let history = self.log.history(&request.subject_id).await?;

        if let AdmissionDecision::Denied {
            reason,
            retry_after_seconds,
        } = check_admission(&policy, &history, now)
        {
            info!(
                subject = %request.subject_id,
                plan = %request.plan,
                ?reason,
                "Fetch request denied"
            );
            return Ok(FetchOutcome::Denied {
                reason,
                retry_after_seconds,
            });
        }

        let assignment = self.ensure_assignment(&request.subject_id, now).await?;
        let (week, pattern) = rotation_at(&assignment, now);
        debug!(
            subject = %request.subject_id,
            group = %assignment.group,
            week,
            pattern = %pattern,
            "Bucketing resolved"
        );

        let job = ScrapeJob {
            user_id: request.subject_id.clone(),
            plan: request.plan,
            query: request.query.clone(),
            category: request.category.clone(),
            period: request.period.clone(),
            use_case: request.use_case.clone(),
            pattern,
        };

        let scrape = self.scraper.scrape(&job).await;
        let outcome = match &scrape {
            Ok(result) => ActionOutcome::Succeeded {
                product_count: result.products.len() as u32,
            },
            Err(err) => {
                warn!(subject = %request.subject_id, error = %err, "Scrape failed");
                ActionOutcome::Failed {
                    message: err.to_string(),
                }
            }
        };

        // Exactly one log entry per admitted attempt, success or failure.
        let mut entry = ActionLogEntry::new(request.subject_id.clone(), now, outcome);
        entry.experiment = Some(ExperimentStamp {
            group: assignment.group,
            week,
            pattern,
        });
        entry.use_case = request.use_case.clone();
        self.log.append(entry).await?;

        Ok(match scrape {
            Ok(result) => FetchOutcome::Fetched {
                products: result.products,
                group: assignment.group,
                week,
                pattern,
            },
            Err(err) => FetchOutcome::Failed {
                message: err.to_string(),
            },
        })
    }

    /// Create-if-absent assignment lookup: first contact draws a group
    /// and stamps `assigned_at = now`; every later call returns the
    /// stored record unchanged.
    async fn ensure_assignment(
        &self,
        subject_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ExperimentAssignment> {
        if let Some(existing) = self.assignments.get(subject_id).await? {
            return Ok(existing);
        }
        let assignment = new_assignment(now);
        info!(
            subject = %subject_id,
            group = %assignment.group,
            "Assigned experiment group"
        );
        self.assignments.put(subject_id, assignment).await?;
        Ok(assignment)
    }
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
