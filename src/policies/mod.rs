//! Transformation policies, one per editing command.
//!
//! Each policy is a pure function from a segmented [`Document`] and a
//! [`PolicyContext`] to a set of prose [`Rewrite`]s plus a [`Report`]. None of
//! them performs I/O; the editor pipeline owns reading and writing.

pub mod copyedit;
pub mod review;
pub mod summary;

use crate::core::document::{Document, RegionKind, Rewrite};
use crate::core::report::Report;
use crate::core::rules::{RuleEngine, RuleSet};
use serde::Serialize;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditCommand {
    /// Spelling and grammar corrections only.
    Review,
    /// Review plus terminology and readability fixes.
    Copyedit,
    /// Insert or refresh the trailing summary section.
    Summary,
}

impl EditCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Review => "review",
            Self::Copyedit => "copyedit",
            Self::Summary => "summary",
        }
    }

    pub fn apply(self, doc: &Document, ctx: &PolicyContext<'_>) -> PolicyOutcome {
        match self {
            Self::Review => review::review(doc, ctx),
            Self::Copyedit => copyedit::copyedit(doc, ctx),
            Self::Summary => summary::summary(doc, ctx),
        }
    }
}

impl std::fmt::Display for EditCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only inputs shared by every policy.
pub struct PolicyContext<'a> {
    pub rules: &'a RuleSet,
    pub summary_heading: &'a str,
    /// Pages the target links to, for copyedit consistency checks.
    pub references: &'a [Document],
}

#[derive(Debug)]
pub struct PolicyOutcome {
    pub rewrites: Vec<Rewrite>,
    pub report: Report,
}

/// Run `engine` over every prose region, clipped to `within` when given.
pub(crate) fn edit_prose(
    doc: &Document,
    engine: &RuleEngine<'_>,
    within: Option<Range<usize>>,
    report: &mut Report,
) -> Vec<Rewrite> {
    let mut rewrites = Vec::new();
    for region in doc.regions().iter().filter(|r| r.kind == RegionKind::Prose) {
        let span = match &within {
            Some(w) => region.span.start.max(w.start)..region.span.end.min(w.end),
            None => region.span.clone(),
        };
        if span.is_empty() {
            continue;
        }
        let original = &doc.text()[span.clone()];
        let edited = engine.edit(original, doc.line_of(span.start), report);
        if edited != original {
            rewrites.push(Rewrite {
                range: span,
                replacement: edited,
            });
        }
    }
    rewrites
}
