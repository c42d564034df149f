//! Listing and reading migration scripts

use crate::error::{CoreError, CoreResult};
use crate::migration_file::MigrationFile;
use std::path::Path;

/// Source of migration scripts for a rollout directory.
///
/// The order returned by [`list_files`](Self::list_files) is significant: the
/// rollout engine derives its processing order from it.
pub trait ScriptSource: Send + Sync {
    /// List the migration scripts in `dir`
    fn list_files(&self, dir: &Path) -> CoreResult<Vec<MigrationFile>>;

    /// Read the full text of one script
    fn read_text(&self, file: &MigrationFile) -> CoreResult<String>;
}

/// Script source backed by a directory on the local filesystem.
///
/// Lists the `.sql` files directly inside the directory (no recursion),
/// sorted by file name.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryScriptSource;

impl DirectoryScriptSource {
    /// Create a filesystem script source
    pub fn new() -> Self {
        Self
    }
}

impl ScriptSource for DirectoryScriptSource {
    fn list_files(&self, dir: &Path) -> CoreResult<Vec<MigrationFile>> {
        if !dir.is_dir() {
            return Err(CoreError::ScriptDirNotFound {
                path: dir.display().to_string(),
            });
        }

        let entries = std::fs::read_dir(dir).map_err(|e| CoreError::IoWithPath {
            path: dir.display().to_string(),
            source: e,
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && is_sql_file(&path) {
                paths.push(path);
            } else {
                log::debug!("Ignoring non-script entry {}", path.display());
            }
        }
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        paths.into_iter().map(MigrationFile::from_path).collect()
    }

    fn read_text(&self, file: &MigrationFile) -> CoreResult<String> {
        std::fs::read_to_string(&file.path).map_err(|e| CoreError::IoWithPath {
            path: file.path.display().to_string(),
            source: e,
        })
    }
}

fn is_sql_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("sql"))
}

#[cfg(test)]
#[path = "script_source_test.rs"]
mod tests;
