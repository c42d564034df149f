//! Throwaway DuckDB-backed projects for command tests

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tm_core::LedgerTable;
use tm_db::{DuckDbBackend, LedgerStore};

use crate::cli::{ConnectionArgs, GlobalArgs};

pub(crate) struct TestProject {
    pub dir: TempDir,
}

impl TestProject {
    /// Project with a DuckDB ledger file and the given extra config lines
    pub fn new(rollout_config: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = format!(
            "database:\n  type: duckdb\n  path: ledger.duckdb\n{}",
            rollout_config
        );
        fs::write(dir.path().join("tidemark.yml"), config).unwrap();
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn rollout_dir(&self) -> PathBuf {
        self.path().join("migrations/rollout")
    }

    pub fn write_script(&self, name: &str, body: &str) {
        let dir = self.rollout_dir();
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), body).unwrap();
    }

    pub fn global(&self) -> GlobalArgs {
        GlobalArgs {
            verbose: false,
            project_dir: self.path().display().to_string(),
            config: None,
            connection: ConnectionArgs::default(),
        }
    }

    /// Open the ledger file directly; drop before running another command
    pub fn open_db(&self) -> DuckDbBackend {
        DuckDbBackend::from_path(&self.path().join("ledger.duckdb"), LedgerTable::default())
            .unwrap()
    }

    pub async fn create_ledger(&self) {
        self.open_db().create_ledger_table().await.unwrap();
    }
}
