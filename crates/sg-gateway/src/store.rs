//! Storage capabilities injected into the gateway.
//!
//! The core never opens a database connection itself; the host hands in
//! implementations of these traits (document-store backed in production,
//! in-memory in tests).

use anyhow::Result;
use async_trait::async_trait;
use sg_core::{ActionLogEntry, ExperimentAssignment};

/// Append-only log of attempted fetch actions.
///
/// Two concurrent admission checks for the same subject may both read a
/// history that does not yet reflect an in-flight append and both be
/// admitted, exceeding quota/cooldown by a small margin. That is accepted
/// best-effort behavior; a store wanting a hard guarantee can back
/// `append` with an atomic conditional insert keyed by subject and time
/// bucket.
#[async_trait]
pub trait ActionLogStore: Send + Sync {
    /// All entries for `subject_id`, newest first.
    async fn history(&self, subject_id: &str) -> Result<Vec<ActionLogEntry>>;

    /// Append one entry. Called exactly once per attempted action and
    /// never for denied requests, so denials consume no quota.
    async fn append(&self, entry: ActionLogEntry) -> Result<()>;
}

/// Per-subject experiment assignment, created once and stable thereafter.
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    async fn get(&self, subject_id: &str) -> Result<Option<ExperimentAssignment>>;

    /// Persist a first-contact assignment. Implementations should treat
    /// this as create-if-absent: when two concurrent first contacts race,
    /// one record wins and all later reads return it.
    async fn put(&self, subject_id: &str, assignment: ExperimentAssignment) -> Result<()>;
}
