//! Configuration types and parsing for tidemark.yml

use crate::error::{CoreError, CoreResult};
use crate::ledger::LedgerTable;
use crate::substitution::{ChainProvider, EnvProvider, MapProvider, SubstitutionProvider};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable consulted for the database password when neither the
/// command line nor the config file sets one
pub const PASSWORD_ENV_VAR: &str = "TM_DB_PASSWORD";

/// Environment variable naming an alternative config file
pub const CONFIG_ENV_VAR: &str = "TM_CONFIG";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5432;
const DEFAULT_SCHEMA: &str = "public";
const DEFAULT_DB_PATH: &str = ":memory:";
const DEFAULT_ROLLOUT_DIR: &str = "migrations/rollout";

/// Main project configuration from tidemark.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Rollout behavior
    #[serde(default)]
    pub rollout: RolloutConfig,

    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Values for `${{NAME}}` placeholders in migration scripts
    #[serde(default)]
    pub vars: HashMap<String, serde_yaml::Value>,
}

/// Rollout settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RolloutConfig {
    /// Directory holding the migration scripts, relative to the project root
    #[serde(default = "default_rollout_dir")]
    pub directory: String,

    /// Commit every migration in its own transaction
    #[serde(default)]
    pub as_single_migrations: bool,

    /// Replace `${{NAME}}` placeholders before executing scripts
    #[serde(default)]
    pub replace_variables: bool,
}

impl Default for RolloutConfig {
    fn default() -> Self {
        Self {
            directory: default_rollout_dir(),
            as_single_migrations: false,
            replace_variables: false,
        }
    }
}

fn default_rollout_dir() -> String {
    DEFAULT_ROLLOUT_DIR.to_string()
}

/// Database type selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    /// PostgreSQL (default)
    #[default]
    Postgres,
    /// Embedded DuckDB
    DuckDb,
}

impl fmt::Display for DbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbType::Postgres => write!(f, "postgres"),
            DbType::DuckDb => write!(f, "duckdb"),
        }
    }
}

/// Database connection configuration as written in the config file.
///
/// Every value is optional here; [`DatabaseConfig::resolve`] applies command
/// line overrides, the environment and defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database type (postgres or duckdb)
    #[serde(rename = "type", default)]
    pub db_type: DbType,

    /// Server host name or address
    #[serde(default)]
    pub host: Option<String>,

    /// Server port
    #[serde(default)]
    pub port: Option<u16>,

    /// Database name
    #[serde(default)]
    pub database: Option<String>,

    /// User name
    #[serde(default)]
    pub username: Option<String>,

    /// Password; `${{NAME}}` placeholders are resolved from the environment
    #[serde(default)]
    pub password: Option<String>,

    /// Schema holding the ledger table
    #[serde(default)]
    pub schema: Option<String>,

    /// DuckDB file path or `:memory:`
    #[serde(default)]
    pub path: Option<String>,
}

/// Connection values given on the command line; they win over the file
#[derive(Debug, Clone, Default)]
pub struct ConnectionOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub username: Option<String>,
    pub schema: Option<String>,
    pub path: Option<String>,
}

/// Fully resolved connection settings handed to a database backend
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub db_type: DbType,
    pub host: String,
    pub port: u16,
    pub database: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub schema: String,
    pub path: String,
}

impl ConnectionSettings {
    /// Ledger table under the resolved schema
    pub fn ledger_table(&self) -> LedgerTable {
        LedgerTable::new(&self.schema)
    }
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("db_type", &self.db_type)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("schema", &self.schema)
            .field("path", &self.path)
            .finish()
    }
}

impl DatabaseConfig {
    /// Resolve connection settings.
    ///
    /// Priority per value: command line > config file > environment (password
    /// only, via `TM_DB_PASSWORD`) > default. File values containing
    /// `${{NAME}}` are resolved through `env` first.
    pub fn resolve(
        &self,
        overrides: &ConnectionOverrides,
        env: &dyn SubstitutionProvider,
    ) -> CoreResult<ConnectionSettings> {
        let from_file = |value: &Option<String>| -> CoreResult<Option<String>> {
            match value {
                Some(v) if env.has_placeholder(v) => env.resolve(v).map(Some),
                Some(v) => Ok(Some(v.clone())),
                None => Ok(None),
            }
        };

        let host = match &overrides.host {
            Some(h) => h.clone(),
            None => from_file(&self.host)?.unwrap_or_else(|| DEFAULT_HOST.to_string()),
        };
        let port = overrides.port.or(self.port).unwrap_or(DEFAULT_PORT);
        let database = match &overrides.database {
            Some(d) => Some(d.clone()),
            None => from_file(&self.database)?,
        };
        let username = match &overrides.username {
            Some(u) => Some(u.clone()),
            None => from_file(&self.username)?,
        };
        let password = match from_file(&self.password)? {
            Some(p) => Some(p),
            None => env.lookup(PASSWORD_ENV_VAR),
        };
        let schema = match &overrides.schema {
            Some(s) => s.clone(),
            None => from_file(&self.schema)?.unwrap_or_else(|| DEFAULT_SCHEMA.to_string()),
        };
        let path = match &overrides.path {
            Some(p) => p.clone(),
            None => from_file(&self.path)?.unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
        };

        let settings = ConnectionSettings {
            db_type: self.db_type,
            host,
            port,
            database,
            username,
            password,
            schema,
            path,
        };
        validate_settings(&settings)?;
        Ok(settings)
    }
}

fn validate_settings(settings: &ConnectionSettings) -> CoreResult<()> {
    if settings.schema.trim().is_empty() {
        return Err(CoreError::ConfigInvalid {
            message: "Schema cannot be empty".to_string(),
        });
    }

    if settings.db_type == DbType::Postgres {
        if settings.database.as_deref().map_or(true, str::is_empty) {
            return Err(CoreError::ConfigInvalid {
                message: "A database name is required for postgres (database: or --database)"
                    .to_string(),
            });
        }
        if settings.username.as_deref().map_or(true, str::is_empty) {
            return Err(CoreError::ConfigInvalid {
                message: "A username is required for postgres (username: or --username)"
                    .to_string(),
            });
        }
    }

    Ok(())
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for tidemark.yml or tidemark.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("tidemark.yml");
        let yaml_path = dir.join("tidemark.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: yml_path.display().to_string(),
            })
        }
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.rollout.directory.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "rollout.directory cannot be empty".to_string(),
            });
        }

        if let Some(schema) = &self.database.schema {
            if schema.trim().is_empty() {
                return Err(CoreError::ConfigInvalid {
                    message: "database.schema cannot be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Get absolute rollout directory relative to a project root
    pub fn rollout_dir_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.rollout.directory)
    }

    /// Provider for script placeholders: config `vars:` first, then the
    /// process environment
    pub fn substitution_provider(&self) -> ChainProvider {
        ChainProvider::new()
            .with(MapProvider::from_yaml_vars(&self.vars))
            .with(EnvProvider)
    }

    /// Resolve the config file from CLI flag or TM_CONFIG environment variable
    ///
    /// Priority: CLI flag > TM_CONFIG env var > None
    pub fn resolve_config_path(cli_config: Option<&str>) -> Option<String> {
        cli_config
            .map(String::from)
            .or_else(|| std::env::var(CONFIG_ENV_VAR).ok())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
