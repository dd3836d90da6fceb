//! Anomaly reporting.
//!
//! Findings and applied changes travel beside the edited text, never inside
//! it. A [`Report`] is informational: producing one never blocks a write.

use crate::core::output::compact_line;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    WrongTargetFile,
    IneligibleTarget,
    MalformedCodeFence,
    UnterminatedFrontMatter,
    ProtectedTokenCollision,
    DuplicateSummarySection,
    UnresolvedReference,
}

impl std::fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WrongTargetFile => write!(f, "Wrong target file"),
            Self::IneligibleTarget => write!(f, "Ineligible target"),
            Self::MalformedCodeFence => write!(f, "Malformed code fence"),
            Self::UnterminatedFrontMatter => write!(f, "Unterminated front matter"),
            Self::ProtectedTokenCollision => write!(f, "Protected token collision"),
            Self::DuplicateSummarySection => write!(f, "Duplicate summary section"),
            Self::UnresolvedReference => write!(f, "Unresolved reference"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    /// 1-based line in the input document; 0 when not tied to a line.
    pub line: usize,
    pub message: String,
}

impl Anomaly {
    pub fn new(kind: AnomalyKind, line: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            line,
            message: message.into(),
        }
    }
}

/// One applied correction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub rule: String,
    pub line: usize,
    pub before: String,
    pub after: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// Document rewritten (or would be, under `--dry-run`).
    Edited,
    /// Transformation produced identical text.
    Unchanged,
    /// Halted before any edit.
    Rejected,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub command: String,
    pub target: Option<PathBuf>,
    pub status: ReportStatus,
    pub anomalies: Vec<Anomaly>,
    pub changes: Vec<Change>,
}

impl Report {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            target: None,
            status: ReportStatus::Unchanged,
            anomalies: Vec::new(),
            changes: Vec::new(),
        }
    }

    /// Report for an invocation rejected before any edit. Carries only the
    /// rejection itself, never in-document findings.
    pub fn rejected(command: impl Into<String>, kind: Option<AnomalyKind>, message: String) -> Self {
        let mut report = Self::new(command);
        report.status = ReportStatus::Rejected;
        if let Some(kind) = kind {
            report.anomalies.push(Anomaly::new(kind, 0, message));
        }
        report
    }

    pub fn record(&mut self, anomaly: Anomaly) {
        if !self.anomalies.contains(&anomaly) {
            self.anomalies.push(anomaly);
        }
    }

    pub fn record_change(&mut self, change: Change) {
        self.changes.push(change);
    }

    pub fn merge(&mut self, other: Report) {
        for anomaly in other.anomalies {
            self.record(anomaly);
        }
        self.changes.extend(other.changes);
    }

    pub fn count(&self, kind: AnomalyKind) -> usize {
        self.anomalies.iter().filter(|a| a.kind == kind).count()
    }

    pub fn sort(&mut self) {
        self.anomalies.sort_by_key(|a| a.line);
        self.changes.sort_by_key(|c| c.line);
    }

    /// Render for a terminal.
    pub fn render_text(&self) -> String {
        use colored::Colorize;

        let mut out = String::new();
        let target = self
            .target
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string());
        let status = match self.status {
            ReportStatus::Edited => "edited".green().bold(),
            ReportStatus::Unchanged => "unchanged".cyan().bold(),
            ReportStatus::Rejected => "rejected".red().bold(),
        };
        out.push_str(&format!("{} {} {}\n", self.command.bold(), target, status));

        for change in &self.changes {
            out.push_str(&format!(
                "  {} L{} [{}] {} -> {}\n",
                "~".green(),
                change.line,
                change.rule,
                compact_line(&change.before, 40),
                compact_line(&change.after, 40)
            ));
        }
        for anomaly in &self.anomalies {
            let loc = if anomaly.line > 0 {
                format!("L{} ", anomaly.line)
            } else {
                String::new()
            };
            out.push_str(&format!(
                "  {} {}{}: {}\n",
                "!".yellow().bold(),
                loc,
                anomaly.kind.to_string().yellow(),
                compact_line(&anomaly.message, 120)
            ));
        }
        out
    }
}
