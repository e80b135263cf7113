//! Plan policy table loading and validation (plans.toml).

pub mod policy;

pub use policy::{PlanPolicy, PolicyTable};
