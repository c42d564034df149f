//! `${{NAME}}` placeholder substitution
//!
//! Migration scripts (and config values) may contain placeholders of the form
//! `${{NAME}}`. A [`SubstitutionProvider`] supplies the value for each name.
//! Every bundled provider fails with [`CoreError::UnresolvedVariable`] when a
//! name cannot be resolved; a placeholder is never left in the output.

use crate::error::{CoreError, CoreResult};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();

/// `${{NAME}}`, spaces allowed just inside the braces
fn placeholder_regex() -> &'static Regex {
    PLACEHOLDER_RE.get_or_init(|| {
        Regex::new(r"\$\{\{\s*([A-Za-z0-9_.\-]+)\s*\}\}").expect("valid regex literal")
    })
}

/// Resolves placeholder names to values.
///
/// Only [`lookup`](Self::lookup) is required; `has_placeholder` and `resolve`
/// are built on it.
pub trait SubstitutionProvider: Send + Sync {
    /// Value for `name`, or `None` when the provider does not know it
    fn lookup(&self, name: &str) -> Option<String>;

    /// Whether `text` contains at least one placeholder
    fn has_placeholder(&self, text: &str) -> bool {
        placeholder_regex().is_match(text)
    }

    /// Replace every placeholder in `text`
    fn resolve(&self, text: &str) -> CoreResult<String> {
        replace_placeholders(text, |name| self.lookup(name))
    }
}

/// Names of the placeholders in `text`, in order of appearance
fn placeholder_names(text: &str) -> Vec<String> {
    placeholder_regex()
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Replace every placeholder using `lookup`.
///
/// Fails without replacing anything when any name is unknown; the error
/// lists every unknown name.
pub fn replace_placeholders(
    text: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> CoreResult<String> {
    let mut missing: Vec<String> = Vec::new();
    for name in placeholder_names(text) {
        if lookup(&name).is_none() && !missing.contains(&name) {
            missing.push(name);
        }
    }
    if !missing.is_empty() {
        return Err(CoreError::UnresolvedVariable {
            name: missing.join(", "),
        });
    }

    let replaced = placeholder_regex().replace_all(text, |caps: &Captures<'_>| {
        lookup(&caps[1]).unwrap_or_default()
    });
    Ok(replaced.into_owned())
}

/// Resolves placeholders from process environment variables
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvProvider;

impl SubstitutionProvider for EnvProvider {
    fn lookup(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Resolves placeholders from a fixed map, such as the config `vars:` section
#[derive(Debug, Clone, Default)]
pub struct MapProvider {
    values: HashMap<String, String>,
}

impl MapProvider {
    /// Provider over the given values
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    /// Provider over YAML config variables. Scalars are rendered as text;
    /// sequences and mappings as compact YAML.
    pub fn from_yaml_vars(vars: &HashMap<String, serde_yaml::Value>) -> Self {
        let values = vars
            .iter()
            .map(|(name, value)| (name.clone(), yaml_to_text(value)))
            .collect();
        Self { values }
    }
}

impl SubstitutionProvider for MapProvider {
    fn lookup(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

fn yaml_to_text(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::Null => String::new(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// Consults several providers in order; the first that knows a name wins
#[derive(Default)]
pub struct ChainProvider {
    providers: Vec<Box<dyn SubstitutionProvider>>,
}

impl ChainProvider {
    /// Empty chain; resolves nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider to the end of the chain
    pub fn with(mut self, provider: impl SubstitutionProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }
}

impl SubstitutionProvider for ChainProvider {
    fn lookup(&self, name: &str) -> Option<String> {
        self.providers.iter().find_map(|p| p.lookup(name))
    }
}

#[cfg(test)]
#[path = "substitution_test.rs"]
mod tests;
