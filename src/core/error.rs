//! Error types for scrivener.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrivenerError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("Wrong target file: {found} (only {reserved} may be edited without --file)")]
    WrongTargetFile { found: String, reserved: String },
    #[error("No target file: pass --file or --active")]
    NoTarget,
    #[error("Target not eligible for editing: {path}: {reason}")]
    IneligibleTarget { path: PathBuf, reason: String },
    #[error("Config error: {0}")]
    ConfigError(String),
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
    #[error("Rule error: {0}")]
    RuleError(String),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
    #[error("Not found: {0}")]
    NotFound(String),
}
