//! Editor configuration.
//!
//! Loaded from an optional `scrivener.toml` at the site root. A missing file
//! yields the defaults, which match a stock Hugo layout where every post is a
//! page bundle: `content/**/index.md`.

use crate::core::error::ScrivenerError;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_FILE: &str = "scrivener.toml";

pub const DEFAULT_RESERVED_FILENAME: &str = "index.md";
pub const DEFAULT_CONTENT_DIR: &str = "content";
pub const DEFAULT_SUMMARY_HEADING: &str = "Summary";

/// Name token, then an optional `v` and a numeral, then optional hyphenated
/// suffixes: `GPT-5-Mini`, `Go1.22`, `gpt-4o`. A space may only separate a
/// capitalized name from a version-shaped numeral, dotted or `v`-prefixed:
/// `Python 3.12`, `Hugo v0.120.4`, but not `Step 1` or `In 2024`.
pub const DEFAULT_PROTECTED_PATTERN: &str = r"\b(?:[A-Z][A-Za-z0-9]*[ ](?:v\d+(?:\.\d+)*|\d+(?:\.\d+)+)|[A-Za-z][A-Za-z0-9]*[-_]?v?\d+(?:\.\d+)*)[A-Za-z]*(?:-[A-Za-z0-9]+)*\b";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Base name eligible for editing.
    pub reserved_filename: String,
    /// Content subtree, relative to the site root.
    pub content_dir: String,
    /// Title of the level-2 heading managed by `summary`.
    pub summary_heading: String,
    /// Regexes whose matches are never altered by any rule.
    pub protected_patterns: Vec<String>,
    /// Extra misspelling corrections, merged over the embedded table.
    pub corrections: FxHashMap<String, String>,
    /// Extra canonical spellings, merged over the embedded table.
    pub terminology: FxHashMap<String, String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            reserved_filename: DEFAULT_RESERVED_FILENAME.to_string(),
            content_dir: DEFAULT_CONTENT_DIR.to_string(),
            summary_heading: DEFAULT_SUMMARY_HEADING.to_string(),
            protected_patterns: vec![DEFAULT_PROTECTED_PATTERN.to_string()],
            corrections: FxHashMap::default(),
            terminology: FxHashMap::default(),
        }
    }
}

impl EditorConfig {
    /// Load `scrivener.toml` from `site_root`. No config is not an error.
    pub fn load(site_root: &Path) -> Result<Self, ScrivenerError> {
        let config_path = site_root.join(CONFIG_FILE);
        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(ScrivenerError::IoError)?;
        let config = Self::parse(&content)?;
        tracing::debug!(path = %config_path.display(), "loaded config");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, ScrivenerError> {
        let config: EditorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ScrivenerError> {
        if self.reserved_filename.is_empty() || self.reserved_filename.contains(['/', '\\']) {
            return Err(ScrivenerError::ConfigError(format!(
                "reserved_filename must be a bare file name, got {:?}",
                self.reserved_filename
            )));
        }
        if self.summary_heading.trim().is_empty() {
            return Err(ScrivenerError::ConfigError(
                "summary_heading must not be empty".to_string(),
            ));
        }
        if Path::new(&self.content_dir).is_absolute() {
            return Err(ScrivenerError::ConfigError(format!(
                "content_dir must be relative to the site root, got {:?}",
                self.content_dir
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = tempdir().unwrap();
        let config = EditorConfig::load(tmp.path()).unwrap();
        assert_eq!(config.reserved_filename, "index.md");
        assert_eq!(config.content_dir, "content");
        assert_eq!(config.protected_patterns.len(), 1);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = EditorConfig::parse(
            r#"
summary_heading = "Recap"

[terminology]
rustacean = "Rustacean"
"#,
        )
        .unwrap();
        assert_eq!(config.summary_heading, "Recap");
        assert_eq!(config.reserved_filename, "index.md");
        assert_eq!(config.terminology.get("rustacean").unwrap(), "Rustacean");
    }

    #[test]
    fn rejects_path_like_reserved_filename() {
        let err = EditorConfig::parse(r#"reserved_filename = "posts/index.md""#).unwrap_err();
        assert!(matches!(err, ScrivenerError::ConfigError(_)));
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let err = EditorConfig::parse("summary_heading = ").unwrap_err();
        assert!(matches!(err, ScrivenerError::TomlError(_)));
    }
}
