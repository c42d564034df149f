//! In-memory fakes for exercising the rollout engine without a database

use crate::engine::{RolloutEngine, RolloutOptions, RolloutOutcome};
use crate::error::RolloutResult;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Mutex;
use tm_core::{AppliedMigration, CoreError, CoreResult, LedgerTable, MigrationFile, ScriptSource};
use tm_db::{DbError, DbResult, LedgerStore};

/// Ledger store that serves a fixed ledger and records every transaction
pub struct RecordingLedgerStore {
    ledger: LedgerTable,
    exists: bool,
    applied: Vec<AppliedMigration>,
    latest: Option<i32>,
    fail_on: Option<usize>,
    transactions: Mutex<Vec<String>>,
    applied_reads: Mutex<usize>,
}

impl RecordingLedgerStore {
    /// Existing, empty ledger in the `public` schema
    pub fn new() -> Self {
        Self {
            ledger: LedgerTable::default(),
            exists: true,
            applied: Vec::new(),
            latest: None,
            fail_on: None,
            transactions: Mutex::new(Vec::new()),
            applied_reads: Mutex::new(0),
        }
    }

    /// Store whose ledger table does not exist
    pub fn missing() -> Self {
        Self {
            exists: false,
            ..Self::new()
        }
    }

    pub fn with_schema(mut self, schema: &str) -> Self {
        self.ledger = LedgerTable::new(schema);
        self
    }

    pub fn with_applied(mut self, applied: Vec<AppliedMigration>) -> Self {
        self.applied = applied;
        self
    }

    /// Fixed latest iteration; by default the highest applied iteration
    pub fn with_latest_iteration(mut self, latest: i32) -> Self {
        self.latest = Some(latest);
        self
    }

    /// Fail the transaction with this zero-based index
    pub fn failing_on(mut self, index: usize) -> Self {
        self.fail_on = Some(index);
        self
    }

    /// Text of every transaction attempted, in order
    pub fn transactions(&self) -> Vec<String> {
        self.transactions.lock().unwrap().clone()
    }

    /// How many times the applied list was read
    pub fn applied_reads(&self) -> usize {
        *self.applied_reads.lock().unwrap()
    }
}

impl Default for RecordingLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerStore for RecordingLedgerStore {
    fn ledger_table(&self) -> &LedgerTable {
        &self.ledger
    }

    async fn table_exists(&self) -> DbResult<bool> {
        Ok(self.exists)
    }

    async fn applied_migrations(&self) -> DbResult<Vec<AppliedMigration>> {
        if !self.exists {
            return Err(DbError::TableNotFound(self.ledger.qualified_name()));
        }
        *self.applied_reads.lock().unwrap() += 1;
        Ok(self.applied.clone())
    }

    async fn latest_iteration(&self) -> DbResult<i32> {
        Ok(self.latest.unwrap_or_else(|| {
            self.applied
                .iter()
                .map(|record| record.iteration)
                .max()
                .unwrap_or(0)
        }))
    }

    async fn run_transaction(&self, sql: &str) -> DbResult<()> {
        let mut transactions = self.transactions.lock().unwrap();
        let index = transactions.len();
        transactions.push(sql.to_string());

        if self.fail_on == Some(index) {
            return Err(DbError::ExecutionError(format!(
                "transaction {index} rejected"
            )));
        }
        Ok(())
    }

    async fn create_ledger_table(&self) -> DbResult<()> {
        Ok(())
    }

    fn db_type(&self) -> &'static str {
        "recording"
    }
}

/// Script source over in-memory bodies, listed in insertion order
#[derive(Default)]
pub struct MemoryScriptSource {
    scripts: Vec<(String, Option<String>)>,
    reads: Mutex<Vec<String>>,
}

impl MemoryScriptSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a script `<id>.sql` with the given body
    pub fn with_script(mut self, id: &str, body: &str) -> Self {
        self.scripts.push((id.to_string(), Some(body.to_string())));
        self
    }

    /// Add a script that is listed but cannot be read
    pub fn with_unreadable(mut self, id: &str) -> Self {
        self.scripts.push((id.to_string(), None));
        self
    }

    /// Ids whose bodies were read, in order
    pub fn reads(&self) -> Vec<String> {
        self.reads.lock().unwrap().clone()
    }
}

impl ScriptSource for MemoryScriptSource {
    fn list_files(&self, dir: &Path) -> CoreResult<Vec<MigrationFile>> {
        self.scripts
            .iter()
            .map(|(id, _)| MigrationFile::from_path(dir.join(format!("{id}.sql"))))
            .collect()
    }

    fn read_text(&self, file: &MigrationFile) -> CoreResult<String> {
        self.reads.lock().unwrap().push(file.id.to_string());

        self.scripts
            .iter()
            .find(|(id, _)| file.id == id.as_str())
            .and_then(|(_, body)| body.clone())
            .ok_or_else(|| CoreError::IoWithPath {
                path: file.path.display().to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "script not readable"),
            })
    }
}

/// Run `engine` and collect its progress lines alongside the result
pub async fn run_collecting(
    engine: &RolloutEngine<'_>,
    options: &RolloutOptions,
) -> (Vec<String>, RolloutResult<RolloutOutcome>) {
    let mut lines = Vec::new();
    let result = engine
        .run(options, &mut |line: &str| lines.push(line.to_string()))
        .await;
    (lines, result)
}
