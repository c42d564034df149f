//! Pending-set diff and iteration numbering

use std::collections::HashSet;
use tm_core::{AppliedMigration, MigrationFile, MigrationId};

/// How pending migrations are grouped into transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RolloutMode {
    /// One transaction per script, each with its own iteration
    Sequential,

    /// A single transaction for every pending script, sharing one iteration
    #[default]
    Combined,
}

impl RolloutMode {
    /// Mode selected by the `as_single_migrations` flag
    pub fn from_single_flag(as_single_migrations: bool) -> Self {
        if as_single_migrations {
            Self::Sequential
        } else {
            Self::Combined
        }
    }
}

impl std::fmt::Display for RolloutMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RolloutMode::Sequential => write!(f, "sequential"),
            RolloutMode::Combined => write!(f, "combined"),
        }
    }
}

/// Result of comparing the listed scripts with the ledger
#[derive(Debug, Clone, Default)]
pub struct PendingDiff {
    /// Scripts not yet recorded, in processing order (last-listed first)
    pub pending: Vec<MigrationFile>,

    /// Ids already recorded, in listing order
    pub skipped: Vec<MigrationId>,
}

/// Split `files` into pending and already-applied scripts.
///
/// Ids are compared exactly. Ledger rows without a matching file are ignored.
pub fn diff_pending(files: Vec<MigrationFile>, applied: &[AppliedMigration]) -> PendingDiff {
    let applied_ids: HashSet<&str> = applied
        .iter()
        .map(|record| record.migration_id.as_str())
        .collect();

    let mut diff = PendingDiff::default();
    for file in files {
        if applied_ids.contains(file.id.as_str()) {
            diff.skipped.push(file.id);
        } else {
            diff.pending.push(file);
        }
    }
    diff.pending.reverse();
    diff
}

/// The work one rollout will perform
#[derive(Debug, Clone)]
pub struct RolloutPlan {
    /// Scripts to apply, in processing order
    pub pending: Vec<MigrationFile>,

    /// Scripts skipped because the ledger already records them
    pub skipped: Vec<MigrationId>,

    /// Transaction grouping
    pub mode: RolloutMode,

    /// Highest iteration in the ledger when the plan was built
    pub base_iteration: i32,
}

impl RolloutPlan {
    /// Build a plan from a diff and the ledger's latest iteration
    pub fn new(diff: PendingDiff, mode: RolloutMode, base_iteration: i32) -> Self {
        Self {
            pending: diff.pending,
            skipped: diff.skipped,
            mode,
            base_iteration,
        }
    }

    /// Whether there is nothing to apply
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Iteration recorded for the pending script at `index`.
    ///
    /// Sequential runs count up from `base_iteration + 1`; a combined run
    /// stamps every script with `base_iteration + 1`.
    pub fn iteration_for(&self, index: usize) -> i32 {
        match self.mode {
            RolloutMode::Sequential => self.base_iteration + 1 + index as i32,
            RolloutMode::Combined => self.base_iteration + 1,
        }
    }
}

#[cfg(test)]
#[path = "plan_test.rs"]
mod tests;
