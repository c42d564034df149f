//! Runtime context for CLI commands

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tm_core::{Config, ConnectionSettings, CoreError, DbType, EnvProvider};
use tm_db::{DuckDbBackend, LedgerStore, PostgresBackend};

use crate::cli::GlobalArgs;

/// Runtime context containing loaded configuration and the ledger store
pub struct RuntimeContext {
    /// Project root
    pub project_dir: PathBuf,

    /// Loaded configuration (defaults when the project has no config file)
    pub config: Config,

    /// Resolved connection settings
    pub settings: ConnectionSettings,

    /// Ledger store connection
    pub store: Arc<dyn LedgerStore>,
}

impl RuntimeContext {
    /// Create a new runtime context from global arguments
    pub async fn new(args: &GlobalArgs) -> Result<Self> {
        let project_dir = PathBuf::from(&args.project_dir);
        let config = load_config(args)?;

        let settings = config
            .database
            .resolve(&args.connection.overrides(), &EnvProvider)
            .context("Invalid database connection settings")?;
        log::debug!("Connection settings: {:?}", settings);

        let store = open_store(&settings, &project_dir).await?;

        Ok(Self {
            project_dir,
            config,
            settings,
            store,
        })
    }

    /// Rollout directory, from the command line or the config, relative to
    /// the project root
    pub fn rollout_dir(&self, cli_dir: Option<&str>) -> PathBuf {
        match cli_dir {
            Some(dir) => self.project_dir.join(dir),
            None => self.config.rollout_dir_absolute(&self.project_dir),
        }
    }
}

/// Load config from `--config`, `TM_CONFIG`, or the project directory.
///
/// A project without a config file runs on defaults and command line flags.
pub(crate) fn load_config(args: &GlobalArgs) -> Result<Config> {
    if let Some(path) = Config::resolve_config_path(args.config.as_deref()) {
        return Config::load(Path::new(&path))
            .with_context(|| format!("Failed to load configuration file {}", path));
    }

    match Config::load_from_dir(Path::new(&args.project_dir)) {
        Ok(config) => Ok(config),
        Err(CoreError::ConfigNotFound { path }) => {
            log::info!("No config file at {}, using defaults", path);
            Ok(Config::default())
        }
        Err(e) => Err(e).context("Failed to load project configuration"),
    }
}

async fn open_store(
    settings: &ConnectionSettings,
    project_dir: &Path,
) -> Result<Arc<dyn LedgerStore>> {
    let ledger = settings.ledger_table();

    let store: Arc<dyn LedgerStore> = match settings.db_type {
        DbType::DuckDb if settings.path == ":memory:" => Arc::new(
            DuckDbBackend::in_memory(ledger).context("Failed to open in-memory DuckDB")?,
        ),
        DbType::DuckDb => {
            let path = project_dir.join(&settings.path);
            Arc::new(
                DuckDbBackend::from_path(&path, ledger)
                    .with_context(|| format!("Failed to open DuckDB at {}", path.display()))?,
            )
        }
        DbType::Postgres => Arc::new(
            PostgresBackend::connect(settings)
                .await
                .context("Failed to connect to PostgreSQL")?,
        ),
    };

    Ok(store)
}

#[cfg(test)]
#[path = "context_test.rs"]
mod tests;
