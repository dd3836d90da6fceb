//! `summary`: upsert the designated trailing section.
//!
//! An existing section is copyedited in place rather than regenerated. A
//! missing one is composed from the post's headings (or title, or opening
//! sentence) and appended. After the operation exactly one heading remains:
//! later duplicates lose their heading and prose, while any code blocks
//! inside them stay where they are.

use super::copyedit::{consistency_terms, copyedit_rules, copyedit_within};
use super::{PolicyContext, PolicyOutcome};
use crate::core::document::{Document, RegionKind, Rewrite};
use crate::core::report::{Anomaly, AnomalyKind, Report};
use crate::core::rules::RuleEngine;
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static ATX_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}(#{1,6})[ \t]+(.*?)(?:[ \t]+#+)?[ \t]*$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: usize,
    pub title: String,
    /// Byte range of the heading line, newline included.
    pub line: Range<usize>,
}

/// ATX headings found in prose regions, in document order.
pub fn headings(doc: &Document) -> Vec<Heading> {
    let mut found = Vec::new();
    for region in doc.prose_regions() {
        let mut offset = region.span.start;
        for line in doc.slice(region).split_inclusive('\n') {
            let bare = line.trim_end_matches(['\n', '\r']);
            if let Some(caps) = ATX_HEADING.captures(bare) {
                found.push(Heading {
                    level: caps[1].len(),
                    title: caps[2].trim().to_string(),
                    line: offset..offset + line.len(),
                });
            }
            offset += line.len();
        }
    }
    found
}

/// Spans of every section titled `title` at level 2. A section runs from its
/// heading to the next heading of level 1 or 2.
fn summary_sections(doc: &Document, all: &[Heading], title: &str) -> Vec<(Heading, Range<usize>)> {
    let mut sections = Vec::new();
    for (idx, heading) in all.iter().enumerate() {
        if heading.level != 2 || !heading.title.eq_ignore_ascii_case(title.trim()) {
            continue;
        }
        let end = all[idx + 1..]
            .iter()
            .find(|h| h.level <= 2)
            .map(|h| h.line.start)
            .unwrap_or(doc.text().len());
        sections.push((heading.clone(), heading.line.start..end));
    }
    sections
}

fn join_list(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [one] => one.clone(),
        [a, b] => format!("{} and {}", a, b),
        [head @ .., last] => format!("{}, and {}", head.join(", "), last),
    }
}

fn first_sentence(doc: &Document) -> Option<String> {
    for region in doc.prose_regions() {
        for line in doc.slice(region).lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('<') {
                continue;
            }
            let sentence = trimmed
                .split_inclusive(['.', '!', '?'])
                .next()
                .unwrap_or(trimmed)
                .trim();
            return Some(sentence.to_string());
        }
    }
    None
}

/// Past-tense summary of the post's prose.
pub fn compose_summary(doc: &Document, all: &[Heading], title: &str) -> String {
    let topics: Vec<String> = all
        .iter()
        .filter(|h| (2..=3).contains(&h.level) && !h.title.eq_ignore_ascii_case(title.trim()))
        .map(|h| h.title.clone())
        .collect();

    let mut body = if !topics.is_empty() {
        format!("This post covered {}.", join_list(&topics))
    } else if let Some(page_title) = doc.front_matter_value("title") {
        format!("This post covered {}.", page_title.trim_end_matches('.'))
    } else if let Some(sentence) = first_sentence(doc) {
        format!("This post opened with the following point: {}", sentence)
    } else {
        "This post did not contain any prose to summarize.".to_string()
    };

    match doc.code_blocks().len() {
        0 => {}
        1 => body.push_str(" It walked through one code example."),
        n => body.push_str(&format!(" It walked through {} code examples.", n)),
    }
    body
}

fn has_prose(doc: &Document, range: &Range<usize>) -> bool {
    doc.prose_regions().any(|r| {
        let start = r.span.start.max(range.start);
        let end = r.span.end.min(range.end);
        start < end && !doc.text()[start..end].trim().is_empty()
    })
}

fn contains_code(doc: &Document, range: &Range<usize>) -> bool {
    doc.regions()
        .iter()
        .any(|r| r.kind == RegionKind::Code && r.span.start >= range.start && r.span.end <= range.end)
}

/// Composed summary, passed through copyedit so the next run leaves it as is.
fn generated_body(doc: &Document, ctx: &PolicyContext<'_>, all: &[Heading]) -> String {
    let body = compose_summary(doc, all, ctx.summary_heading);
    let terms = consistency_terms(doc, ctx.references, &ctx.rules.terms);
    let engine = RuleEngine::new(copyedit_rules(ctx, &terms), &ctx.rules.protected);
    engine.edit(&body, 1, &mut Report::new("summary"))
}

pub fn summary(doc: &Document, ctx: &PolicyContext<'_>) -> PolicyOutcome {
    let mut report = Report::new("summary");
    let mut rewrites = Vec::new();
    let all = headings(doc);
    let sections = summary_sections(doc, &all, ctx.summary_heading);
    let text = doc.text();

    let Some(((canonical, section), duplicates)) = sections.split_first().map(|(c, d)| (c.clone(), d))
    else {
        let trailing = text.len() - text.trim_end_matches('\n').len();
        let lead = match (text.is_empty(), trailing) {
            (true, _) => "",
            (false, 0) => "\n\n",
            (false, 1) => "\n",
            _ => "",
        };
        rewrites.push(Rewrite {
            range: text.len()..text.len(),
            replacement: format!(
                "{}## {}\n\n{}\n",
                lead,
                ctx.summary_heading.trim(),
                generated_body(doc, ctx, &all)
            ),
        });
        tracing::debug!("appended summary section");
        return PolicyOutcome { rewrites, report };
    };

    let body = canonical.line.end..section.end;
    if has_prose(doc, &body) || contains_code(doc, &body) {
        rewrites.extend(copyedit_within(doc, ctx, Some(body.clone()), &mut report));
    } else {
        let lead = if text[..canonical.line.end].ends_with('\n') { "\n" } else { "\n\n" };
        let tail = if body.end < text.len() { "\n" } else { "" };
        rewrites.push(Rewrite {
            range: body.clone(),
            replacement: format!("{}{}\n{}", lead, generated_body(doc, ctx, &all), tail),
        });
    }

    let first_line = doc.line_of(canonical.line.start);
    for (heading, range) in duplicates {
        let keeps_code = contains_code(doc, range);
        report.record(Anomaly::new(
            AnomalyKind::DuplicateSummarySection,
            doc.line_of(heading.line.start),
            format!(
                "duplicate `## {}` section removed; the one at line {} is kept{}",
                heading.title,
                first_line,
                if keeps_code { " (its code blocks stay in place)" } else { "" }
            ),
        ));
        for region in doc.prose_regions() {
            let start = region.span.start.max(range.start);
            let end = region.span.end.min(range.end);
            if start < end {
                rewrites.push(Rewrite {
                    range: start..end,
                    replacement: String::new(),
                });
            }
        }
    }

    tracing::debug!(
        duplicates = duplicates.len(),
        rewrites = rewrites.len(),
        "refreshed summary section"
    );
    PolicyOutcome { rewrites, report }
}
