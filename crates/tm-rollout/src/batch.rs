//! Transaction text assembly

use crate::error::{RolloutError, RolloutResult};
use tm_core::{AppliedMigration, LedgerTable, MigrationId, SubstitutionProvider};

/// Append a `;` when the script body does not already end with one.
///
/// Trailing whitespace is ignored for the check but kept in the output; the
/// terminator is appended directly, with no line break. When the last line
/// ends in a `--` comment, the code before the comment decides, and a missing
/// terminator goes on a new line so it is not commented out.
pub fn ensure_terminated(content: &str) -> String {
    if content.trim_end().ends_with(';') {
        return content.to_string();
    }

    match last_line_comment_start(content) {
        Some(at) if content[..at].trim_end().ends_with(';') => content.to_string(),
        Some(_) => format!("{content}\n;"),
        None => format!("{content};"),
    }
}

/// Byte offset of a `--` comment on the last non-blank line, if any
fn last_line_comment_start(text: &str) -> Option<usize> {
    let trimmed = text.trim_end();
    let line_start = trimmed.rfind('\n').map_or(0, |i| i + 1);
    trimmed[line_start..].find("--").map(|i| line_start + i)
}

/// One script plus the ledger insert that records it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptFragment {
    pub id: MigrationId,
    pub iteration: i32,
    pub sql: String,
}

impl ScriptFragment {
    /// Assemble the fragment for a script body.
    ///
    /// The body is terminated first, then passed through `substitution` when
    /// given, then followed by the ledger insert. The insert starts on a new
    /// line only when the body's last line holds a `--` comment.
    pub fn build(
        content: &str,
        id: &MigrationId,
        iteration: i32,
        ledger: &LedgerTable,
        substitution: Option<&dyn SubstitutionProvider>,
    ) -> RolloutResult<Self> {
        let mut body = ensure_terminated(content);

        if let Some(provider) = substitution {
            body = provider
                .resolve(&body)
                .map_err(|source| RolloutError::Substitution {
                    migration: id.to_string(),
                    source,
                })?;
        }

        // The insert must not land inside a trailing line comment.
        if last_line_comment_start(&body).is_some() {
            body.push('\n');
        }
        body.push_str(&ledger.insert_sql(id, iteration));

        Ok(Self {
            id: id.clone(),
            iteration,
            sql: body,
        })
    }

    /// The ledger row this fragment writes
    pub fn applied(&self) -> AppliedMigration {
        AppliedMigration::new(self.id.as_str(), self.iteration)
    }
}

/// Fragments executed together in one transaction
#[derive(Debug, Clone, Default)]
pub struct Batch {
    fragments: Vec<ScriptFragment>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, fragment: ScriptFragment) {
        self.fragments.push(fragment);
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Full transaction text: the fragments concatenated with no separator
    pub fn sql(&self) -> String {
        self.fragments.iter().map(|f| f.sql.as_str()).collect()
    }

    /// Comma-separated ids, for error messages
    pub fn ids(&self) -> String {
        self.fragments
            .iter()
            .map(|f| f.id.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Ledger rows written by this batch, in fragment order
    pub fn applied(&self) -> Vec<AppliedMigration> {
        self.fragments.iter().map(ScriptFragment::applied).collect()
    }
}

impl From<ScriptFragment> for Batch {
    fn from(fragment: ScriptFragment) -> Self {
        Self {
            fragments: vec![fragment],
        }
    }
}

#[cfg(test)]
#[path = "batch_test.rs"]
mod tests;
