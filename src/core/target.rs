//! Target resolution and the eligibility gate.
//!
//! Both run before the target is read. Resolution is purely lexical: an
//! explicit path wins unconditionally, otherwise the active file must carry
//! the reserved name. No search or inference takes place.

use crate::core::config::EditorConfig;
use crate::core::error::ScrivenerError;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSource {
    Explicit,
    Active,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub path: PathBuf,
    pub source: TargetSource,
}

/// Pick the file to edit from an explicit path or the active-file fallback.
pub fn resolve(
    explicit: Option<&Path>,
    active: Option<&Path>,
    reserved: &str,
) -> Result<Target, ScrivenerError> {
    if let Some(path) = explicit {
        return Ok(Target {
            path: path.to_path_buf(),
            source: TargetSource::Explicit,
        });
    }

    let active = active.ok_or(ScrivenerError::NoTarget)?;
    let name = active
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if name != reserved {
        return Err(ScrivenerError::WrongTargetFile {
            found: active.display().to_string(),
            reserved: reserved.to_string(),
        });
    }
    Ok(Target {
        path: active.to_path_buf(),
        source: TargetSource::Active,
    })
}

/// Require the target to be a reserved-name file inside the content tree of
/// `site_root`. Returns the target's absolute path.
pub fn check_eligible(
    target: &Target,
    site_root: &Path,
    config: &EditorConfig,
) -> Result<PathBuf, ScrivenerError> {
    let ineligible = |reason: String| ScrivenerError::IneligibleTarget {
        path: target.path.clone(),
        reason,
    };

    let name = target
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if name != config.reserved_filename {
        return Err(ineligible(format!(
            "only files named {} may be edited",
            config.reserved_filename
        )));
    }

    let absolute = if target.path.is_absolute() {
        target.path.clone()
    } else {
        site_root.join(&target.path)
    };
    let file = absolute
        .canonicalize()
        .map_err(|e| ineligible(format!("cannot locate file: {}", e)))?;
    if !file.is_file() {
        return Err(ineligible("not a regular file".to_string()));
    }
    let content_root = site_root
        .join(&config.content_dir)
        .canonicalize()
        .map_err(|e| ineligible(format!("content directory {} missing: {}", config.content_dir, e)))?;
    if !file.starts_with(&content_root) {
        return Err(ineligible(format!(
            "file is outside the {}/ tree",
            config.content_dir
        )));
    }
    Ok(file)
}
