//! Rollout engine
//!
//! Applies the pending scripts of a rollout directory and records each one in
//! the ledger inside the same transaction as the script itself.

use crate::batch::{Batch, ScriptFragment};
use crate::error::{RolloutError, RolloutResult};
use crate::plan::{diff_pending, RolloutMode, RolloutPlan};
use std::path::PathBuf;
use tm_core::{AppliedMigration, EnvProvider, ScriptSource, SubstitutionProvider};
use tm_db::LedgerStore;

/// Per-run settings
#[derive(Debug, Clone)]
pub struct RolloutOptions {
    /// Directory holding the migration scripts
    pub directory: PathBuf,

    /// Transaction grouping
    pub mode: RolloutMode,

    /// Replace `${{NAME}}` placeholders before execution
    pub replace_variables: bool,
}

impl RolloutOptions {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            mode: RolloutMode::default(),
            replace_variables: false,
        }
    }

    pub fn with_mode(mut self, mode: RolloutMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_replace_variables(mut self, replace_variables: bool) -> Self {
        self.replace_variables = replace_variables;
        self
    }
}

/// How a rollout finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RolloutOutcome {
    /// The rollout directory holds no scripts
    NoScripts,

    /// Every script is already recorded in the ledger
    UpToDate,

    /// Pending scripts were applied; rows are in processing order
    Applied { migrations: Vec<AppliedMigration> },
}

impl RolloutOutcome {
    /// Whether any migration was applied
    pub fn did_apply(&self) -> bool {
        matches!(self, RolloutOutcome::Applied { migrations } if !migrations.is_empty())
    }

    /// Rows written by this run
    pub fn applied(&self) -> &[AppliedMigration] {
        match self {
            RolloutOutcome::Applied { migrations } => migrations,
            _ => &[],
        }
    }
}

/// Level of the log copy of each progress line; below debug so `-v` output
/// does not repeat what the caller already prints
pub(crate) const PROGRESS_LOG_LEVEL: log::Level = log::Level::Trace;

/// Progress sink: every line goes to the caller and to the log
struct Progress<'p> {
    sink: &'p mut dyn FnMut(&str),
}

impl Progress<'_> {
    fn line(&mut self, line: String) {
        log::log!(PROGRESS_LOG_LEVEL, "{}", line);
        (self.sink)(&line);
    }
}

enum Prepared {
    Finished(RolloutOutcome),
    Ready(RolloutPlan),
}

/// Applies pending migrations against a ledger store
pub struct RolloutEngine<'a> {
    store: &'a dyn LedgerStore,
    source: &'a dyn ScriptSource,
    substitution: Option<&'a dyn SubstitutionProvider>,
}

impl<'a> RolloutEngine<'a> {
    /// Create an engine over a ledger store and a script source
    pub fn new(store: &'a dyn LedgerStore, source: &'a dyn ScriptSource) -> Self {
        Self {
            store,
            source,
            substitution: None,
        }
    }

    /// Provider used when `replace_variables` is on. Without one, the
    /// process environment is used.
    pub fn with_substitution(mut self, provider: &'a dyn SubstitutionProvider) -> Self {
        self.substitution = Some(provider);
        self
    }

    /// Run one rollout, reporting progress lines to `progress` as they happen
    pub async fn run(
        &self,
        options: &RolloutOptions,
        progress: &mut dyn FnMut(&str),
    ) -> RolloutResult<RolloutOutcome> {
        let mut progress = Progress { sink: progress };

        let plan = match self.prepare(options, &mut progress).await? {
            Prepared::Finished(outcome) => return Ok(outcome),
            Prepared::Ready(plan) => plan,
        };

        log::debug!(
            "Applying {} migrations in {} mode from iteration {}",
            plan.pending.len(),
            plan.mode,
            plan.base_iteration
        );

        let substitution = options
            .replace_variables
            .then(|| self.substitution.unwrap_or(&EnvProvider));

        let migrations = match plan.mode {
            RolloutMode::Sequential => {
                self.apply_sequential(&plan, substitution, &mut progress)
                    .await?
            }
            RolloutMode::Combined => {
                self.apply_combined(&plan, substitution, &mut progress)
                    .await?
            }
        };

        progress.line(format!("Applied {} migrations", migrations.len()));
        Ok(RolloutOutcome::Applied { migrations })
    }

    /// Existence check, listing, ledger diff and numbering
    async fn prepare(
        &self,
        options: &RolloutOptions,
        progress: &mut Progress<'_>,
    ) -> RolloutResult<Prepared> {
        let ledger = self.store.ledger_table();
        if !self.store.table_exists().await? {
            return Err(RolloutError::LedgerMissing {
                table: ledger.qualified_name(),
            });
        }
        progress.line(format!("Ledger table {} found", ledger.qualified_name()));

        let dir = options.directory.display();
        let files = self.source.list_files(&options.directory)?;
        if files.is_empty() {
            progress.line(format!("No migration scripts found in {}", dir));
            return Ok(Prepared::Finished(RolloutOutcome::NoScripts));
        }
        progress.line(format!("Found {} migration scripts in {}", files.len(), dir));

        let applied = self.store.applied_migrations().await?;
        if applied.len() == files.len() {
            progress.line(
                "Number of applied migrations are the same as the total, skipping".to_string(),
            );
            return Ok(Prepared::Finished(RolloutOutcome::UpToDate));
        }

        let diff = diff_pending(files, &applied);
        for id in &diff.skipped {
            progress.line(format!("Migration {} is applied, skipping", id));
        }

        let base_iteration = self.store.latest_iteration().await?;
        let plan = RolloutPlan::new(diff, options.mode, base_iteration);
        if plan.is_empty() {
            log::debug!("Ledger records ids with no script; nothing pending");
            return Ok(Prepared::Finished(RolloutOutcome::UpToDate));
        }

        Ok(Prepared::Ready(plan))
    }

    /// One transaction per script; stops at the first failure
    async fn apply_sequential(
        &self,
        plan: &RolloutPlan,
        substitution: Option<&dyn SubstitutionProvider>,
        progress: &mut Progress<'_>,
    ) -> RolloutResult<Vec<AppliedMigration>> {
        let ledger = self.store.ledger_table();
        let mut migrations = Vec::with_capacity(plan.pending.len());

        for (index, file) in plan.pending.iter().enumerate() {
            progress.line(format!("Running migration {}", file.id));

            let content = self.source.read_text(file)?;
            let fragment = ScriptFragment::build(
                &content,
                &file.id,
                plan.iteration_for(index),
                ledger,
                substitution,
            )?;

            let batch = Batch::from(fragment);
            self.execute(&batch).await?;
            migrations.extend(batch.applied());
        }

        Ok(migrations)
    }

    /// Every script in a single transaction
    async fn apply_combined(
        &self,
        plan: &RolloutPlan,
        substitution: Option<&dyn SubstitutionProvider>,
        progress: &mut Progress<'_>,
    ) -> RolloutResult<Vec<AppliedMigration>> {
        let ledger = self.store.ledger_table();
        let mut batch = Batch::new();

        for (index, file) in plan.pending.iter().enumerate() {
            let content = self.source.read_text(file)?;
            batch.push(ScriptFragment::build(
                &content,
                &file.id,
                plan.iteration_for(index),
                ledger,
                substitution,
            )?);
            progress.line(format!(
                "Migration {} is not applied adding to transaction",
                file.id
            ));
        }

        self.execute(&batch).await?;
        Ok(batch.applied())
    }

    async fn execute(&self, batch: &Batch) -> RolloutResult<()> {
        self.store
            .run_transaction(&batch.sql())
            .await
            .map_err(|source| RolloutError::ExecutionFailed {
                migrations: batch.ids(),
                source,
            })
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
