//! tm-rollout - Rollout engine for Tidemark
//!
//! Diffs the scripts in a rollout directory against the applied-migration
//! ledger, numbers the pending ones, substitutes `${{NAME}}` placeholders, and
//! executes them (one transaction per script, or one for the whole batch)
//! together with the ledger inserts that record them.

pub mod batch;
pub mod engine;
pub mod error;
pub mod plan;
pub mod query;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;

pub use batch::{Batch, ScriptFragment};
pub use engine::{RolloutEngine, RolloutOptions, RolloutOutcome};
pub use error::{RolloutError, RolloutResult};
pub use plan::{RolloutMode, RolloutPlan};
pub use query::{applied_migrations, migration_status, MigrationStatus};
