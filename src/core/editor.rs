//! The invocation pipeline.
//!
//! resolve target -> eligibility gate -> read -> segment -> policy ->
//! apply rewrites -> verify immutable regions -> write.
//!
//! Everything before the read is a precondition: a failure there leaves the
//! file untouched and produces no in-document findings. Any failure after the
//! read also writes nothing; the file is only replaced once the full edit has
//! been verified.

use crate::core::config::EditorConfig;
use crate::core::document::Document;
use crate::core::error::ScrivenerError;
use crate::core::references;
use crate::core::report::{Report, ReportStatus};
use crate::core::rules::RuleSet;
use crate::core::target;
use crate::policies::{EditCommand, PolicyContext};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct EditRequest {
    pub command: EditCommand,
    pub file: Option<PathBuf>,
    pub active: Option<PathBuf>,
    pub site_root: PathBuf,
    pub dry_run: bool,
}

#[derive(Debug)]
pub struct EditResult {
    pub report: Report,
    pub output: String,
    pub written: bool,
}

/// Transform `doc` in memory. Pure apart from logging.
pub fn edit_document(
    doc: &Document,
    command: EditCommand,
    rules: &RuleSet,
    summary_heading: &str,
    references: &[Document],
) -> Result<(String, Report), ScrivenerError> {
    let mut report = Report::new(command.as_str());
    report.target = Some(doc.path.clone());
    for anomaly in doc.anomalies() {
        report.record(anomaly.clone());
    }

    let ctx = PolicyContext {
        rules,
        summary_heading,
        references,
    };
    let outcome = command.apply(doc, &ctx);
    report.merge(outcome.report);

    let output = doc.apply(&outcome.rewrites)?;
    verify_isolation(doc, &output)?;

    report.status = if output == doc.text() {
        ReportStatus::Unchanged
    } else {
        ReportStatus::Edited
    };
    report.sort();
    Ok((output, report))
}

/// Front matter and every code block must come out byte-identical.
fn verify_isolation(before: &Document, output: &str) -> Result<(), ScrivenerError> {
    let after = Document::parse(before.path.clone(), output);
    let expected = before.immutable_fingerprint();
    let actual = after.immutable_fingerprint();
    if expected != actual {
        return Err(ScrivenerError::InvariantViolation(format!(
            "immutable regions changed: {} before, {} after",
            expected.len(),
            actual.len()
        )));
    }
    Ok(())
}

/// Replace `path` in one step: write a sibling temp file, then rename.
fn write_atomic(path: &Path, contents: &str) -> Result<(), ScrivenerError> {
    let mut tmp_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    tmp_name.push(".scrivener.tmp");
    let tmp = path.with_file_name(tmp_name);
    fs::write(&tmp, contents).map_err(ScrivenerError::IoError)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(ScrivenerError::IoError(e));
    }
    Ok(())
}

pub fn run_edit(request: &EditRequest) -> Result<EditResult, ScrivenerError> {
    let config = EditorConfig::load(&request.site_root)?;

    let resolved = target::resolve(
        request.file.as_deref(),
        request.active.as_deref(),
        &config.reserved_filename,
    )?;
    let path = target::check_eligible(&resolved, &request.site_root, &config)?;
    let rules = RuleSet::load(&config)?;

    let span = tracing::info_span!("edit", command = %request.command, target = %path.display());
    let _guard = span.enter();

    let doc = Document::read(&path)?;
    tracing::debug!(regions = doc.regions().len(), "segmented document");

    let mut preflight = Report::new(request.command.as_str());
    let referenced = match request.command {
        EditCommand::Review => Vec::new(),
        EditCommand::Copyedit | EditCommand::Summary => {
            let content_root = request
                .site_root
                .join(&config.content_dir)
                .canonicalize()
                .map_err(ScrivenerError::IoError)?;
            references::load_references(&doc, &content_root, &config.reserved_filename, &mut preflight)
        }
    };

    let (output, mut report) = edit_document(
        &doc,
        request.command,
        &rules,
        &config.summary_heading,
        &referenced,
    )?;
    report.merge(preflight);
    report.sort();

    let written = report.status == ReportStatus::Edited && !request.dry_run;
    if written {
        write_atomic(&path, &output)?;
    }
    tracing::info!(
        status = ?report.status,
        changes = report.changes.len(),
        anomalies = report.anomalies.len(),
        written,
        "edit finished"
    );

    Ok(EditResult {
        report,
        output,
        written,
    })
}
