//! tm-core - Core library for Tidemark
//!
//! This crate provides the types shared by every Tidemark component: the
//! project configuration, the ledger table layout, on-disk migration files,
//! the script source used to list and read them, and the `${{NAME}}`
//! substitution providers.

pub mod config;
pub mod error;
pub mod ledger;
pub mod migration_file;
pub mod migration_id;
mod newtype_string;
pub mod script_source;
pub mod substitution;

pub use config::{
    Config, ConnectionOverrides, ConnectionSettings, DatabaseConfig, DbType, RolloutConfig,
};
pub use error::{CoreError, CoreResult};
pub use ledger::{AppliedMigration, LedgerTable, LEDGER_TABLE_NAME};
pub use migration_file::MigrationFile;
pub use migration_id::MigrationId;
pub use script_source::{DirectoryScriptSource, ScriptSource};
pub use substitution::{ChainProvider, EnvProvider, MapProvider, SubstitutionProvider};
