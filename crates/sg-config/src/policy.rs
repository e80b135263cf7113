use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sg_core::{AppError, PlanTier};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Usage limits for one subscription tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanPolicy {
    /// Maximum admitted actions per calendar month. `None` = unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_actions_per_month: Option<u32>,
    /// Minimum spacing between consecutive admitted actions.
    #[serde(default)]
    pub cooldown_seconds: u64,
}

fn default_free() -> PlanPolicy {
    PlanPolicy {
        max_actions_per_month: Some(0),
        cooldown_seconds: 0,
    }
}

fn default_standard() -> PlanPolicy {
    PlanPolicy {
        max_actions_per_month: Some(10),
        cooldown_seconds: 300,
    }
}

fn default_premium() -> PlanPolicy {
    PlanPolicy {
        max_actions_per_month: None,
        cooldown_seconds: 60,
    }
}

/// Per-tier policy table.
///
/// A tier section present in the file replaces that tier's policy wholesale
/// (omitting `max_actions_per_month` there means unbounded, not "keep the
/// built-in value"); absent sections keep the built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyTable {
    #[serde(default = "default_free")]
    pub free: PlanPolicy,
    #[serde(default = "default_standard")]
    pub standard: PlanPolicy,
    #[serde(default = "default_premium")]
    pub premium: PlanPolicy,
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self {
            free: default_free(),
            standard: default_standard(),
            premium: default_premium(),
        }
    }
}

/// On-disk shape of plans.toml: `[plans.standard]`, `[plans.premium]`, ...
#[derive(Debug, Default, Deserialize)]
struct PolicyFile {
    #[serde(default)]
    plans: Option<PolicyTable>,
}

impl PolicyTable {
    /// Policy for a tier. Callers resolving a tier from an untrusted plan
    /// string go through `PlanTier::parse_lenient`, so an unknown tier has
    /// already degraded to `Free` by the time it reaches here.
    pub fn policy_for(&self, tier: PlanTier) -> PlanPolicy {
        match tier {
            PlanTier::Free => self.free,
            PlanTier::Standard => self.standard,
            PlanTier::Premium => self.premium,
        }
    }

    /// Load a policy table from `path`.
    ///
    /// Returns `Ok(None)` when the file does not exist (callers fall back
    /// to `PolicyTable::default()`); a present-but-invalid file is an error.
    pub fn load(path: &Path) -> Result<Option<PolicyTable>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read policy file: {}", path.display()))?;
        let file: PolicyFile =
            toml::from_str(&contents).map_err(|e| AppError::InvalidPolicyFile {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        let table = file.plans.unwrap_or_default();
        table.check_invariants();
        Ok(Some(table))
    }

    /// Load from `path`, falling back to the built-in table when the file
    /// is absent.
    pub fn load_or_default(path: &Path) -> Result<PolicyTable> {
        Ok(Self::load(path)?.unwrap_or_default())
    }

    /// Warn when an override departs from the expected tier shape.
    /// Overrides are honored as written; these are operator hints only.
    fn check_invariants(&self) {
        if self.free.max_actions_per_month != Some(0) {
            warn!(
                max = ?self.free.max_actions_per_month,
                "Free tier is configured with a non-zero quota"
            );
        }
        if self.premium.max_actions_per_month.is_some() {
            warn!(
                max = ?self.premium.max_actions_per_month,
                "Premium tier is configured with a bounded quota"
            );
        }
    }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
