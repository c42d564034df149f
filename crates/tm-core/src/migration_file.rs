//! On-disk migration scripts

use crate::error::{CoreError, CoreResult};
use crate::migration_id::MigrationId;
use std::path::{Path, PathBuf};

/// One migration script in the rollout directory.
///
/// Only the location and derived id are held; the script body is read on
/// demand through a [`ScriptSource`](crate::ScriptSource) once the file is
/// known to be pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    /// Full location of the script, opaque to comparison
    pub path: PathBuf,

    /// Ledger id derived from the file stem
    pub id: MigrationId,
}

impl MigrationFile {
    /// Build a migration file from its path, deriving the id by stripping the
    /// directory and extension (`migrations/rollout/one.sql` -> `one`).
    pub fn from_path(path: impl Into<PathBuf>) -> CoreResult<Self> {
        let path = path.into();
        let id = derive_id(&path).ok_or_else(|| CoreError::InvalidScriptName {
            path: path.display().to_string(),
        })?;
        Ok(Self { path, id })
    }
}

fn derive_id(path: &Path) -> Option<MigrationId> {
    let stem = path.file_stem()?.to_str()?;
    MigrationId::try_new(stem)
}

#[cfg(test)]
#[path = "migration_file_test.rs"]
mod tests;
