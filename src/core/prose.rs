//! Prose-level masking.
//!
//! Within a prose region some spans are literal text that no rule may touch
//! (inline code, link destinations, URLs, HTML, Hugo shortcodes). Everything
//! else is split into editable pieces. Protected version tokens live inside
//! editable pieces: rules see them but must not alter them.

use crate::core::error::ScrivenerError;
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?m)^[ ]{0,3}\[[^\]\n]+\]:[ \t]*\S.*$",
        r"|``[^\n]*?``|`[^`\n]+`",
        r"|\]\([^)\n]*\)",
        r"|\{\{[<%].*?[%>]\}\}",
        r"|<!--[\s\S]*?-->",
        r"|<[a-z][a-z0-9+.-]*:[^>\s]*>",
        r"|</?[A-Za-z][^>\n]*>",
        r"|\{#[^}\n]*\}",
        r"|\b(?:https?|ftp)://[^\s)>\]]+",
        r"|\b[\w.+-]+@[\w-]+\.[\w.-]+\b",
    ))
    .unwrap()
});

/// Word tokens, with inner dots, apostrophes, hyphens and underscores
/// (`Node.js`, `way's`, `gpt-4o`) kept as one token.
pub static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9]+(?:['’._-][A-Za-z0-9]+)*").unwrap());

/// Literal spans of `text`, sorted and non-overlapping.
pub fn literal_spans(text: &str) -> Vec<Range<usize>> {
    LITERAL.find_iter(text).map(|m| m.range()).collect()
}

/// Complement of [`literal_spans`]: the byte ranges rules may edit.
pub fn editable_pieces(text: &str) -> Vec<Range<usize>> {
    let mut pieces = Vec::new();
    let mut cursor = 0;
    for span in literal_spans(text) {
        if span.start > cursor {
            pieces.push(cursor..span.start);
        }
        cursor = span.end;
    }
    if cursor < text.len() {
        pieces.push(cursor..text.len());
    }
    pieces
}

/// Matcher for version-like tokens that rules must leave alone.
#[derive(Debug, Clone)]
pub struct ProtectedTokens {
    patterns: Vec<Regex>,
}

impl ProtectedTokens {
    pub fn new(patterns: &[String]) -> Result<Self, ScrivenerError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| {
                    ScrivenerError::ConfigError(format!("invalid protected pattern {:?}: {}", p, e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Protected spans of `text`, sorted and merged.
    pub fn find(&self, text: &str) -> Vec<Range<usize>> {
        let mut spans: Vec<Range<usize>> = self
            .patterns
            .iter()
            .flat_map(|p| p.find_iter(text).map(|m| m.range()))
            .collect();
        spans.sort_by_key(|r| r.start);
        let mut merged: Vec<Range<usize>> = Vec::with_capacity(spans.len());
        for span in spans {
            match merged.last_mut() {
                Some(last) if span.start <= last.end => last.end = last.end.max(span.end),
                _ => merged.push(span),
            }
        }
        merged
    }
}

pub fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}
