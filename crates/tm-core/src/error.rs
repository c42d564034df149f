//! Error types for tm-core

use thiserror::Error;

/// Core error type for Tidemark
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config {path}: {message}")]
    ConfigParseError { path: String, message: String },

    /// E003: Invalid configuration value
    #[error("[E003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E004: Rollout directory not found
    #[error("[E004] Rollout directory not found: {path}")]
    ScriptDirNotFound { path: String },

    /// E005: Script path has no usable file stem
    #[error("[E005] Cannot derive a migration id from '{path}'")]
    InvalidScriptName { path: String },

    /// E006: `${{NAME}}` placeholders with no value; `name` lists every
    /// missing name, comma-separated, in order of first appearance
    #[error("[E006] Undefined variable(s): {name}. Set them in vars: or as environment variables")]
    UnresolvedVariable { name: String },

    /// E007: IO error
    #[error("[E007] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E008: IO error with file path context
    #[error("[E008] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
