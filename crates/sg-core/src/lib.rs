//! Shared types and error taxonomy for the scrape-gateway core.

pub mod error;
pub mod types;

pub use error::AppError;
pub use types::{
    AbGroup, ActionLogEntry, ActionOutcome, AdmissionDecision, DenyReason, ExperimentAssignment,
    ExperimentStamp, PlanTier, SearchPattern,
};
