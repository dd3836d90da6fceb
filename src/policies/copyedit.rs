//! `copyedit`: review plus terminology and readability.
//!
//! Canonical spellings come from three sources, in priority order: the
//! terminology table (embedded plus config), mixed-case terms used by the
//! pages the target references, and mixed-case terms the target itself uses
//! most often. Referenced pages are only read.

use super::review::review_rules;
use super::{PolicyContext, PolicyOutcome, edit_prose};
use crate::core::document::{Document, Rewrite};
use crate::core::prose::{WORD, editable_pieces};
use crate::core::report::Report;
use crate::core::rules::{InteriorSpaces, Rule, RuleEngine, Terminology};
use rustc_hash::FxHashMap;
use std::ops::Range;

/// Alphabetic tokens with a capital after the first letter: `LangChain`,
/// `OpenAI`, `iOS`.
fn is_mixed_case(token: &str) -> bool {
    let mut chars = token.chars();
    let Some(_) = chars.next() else {
        return false;
    };
    token.chars().all(char::is_alphabetic)
        && chars.any(char::is_uppercase)
        && token.chars().any(char::is_lowercase)
}

/// Mixed-case spellings in a document's editable prose, with counts.
fn mixed_case_terms(doc: &Document) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for region in doc.prose_regions() {
        let text = doc.slice(region);
        for piece in editable_pieces(text) {
            for m in WORD.find_iter(&text[piece]) {
                if !is_mixed_case(m.as_str()) {
                    continue;
                }
                match counts.iter_mut().find(|(t, _)| t == m.as_str()) {
                    Some((_, n)) => *n += 1,
                    None => counts.push((m.as_str().to_string(), 1)),
                }
            }
        }
    }
    counts
}

/// Canonical spelling table for `doc`.
pub fn consistency_terms(
    doc: &Document,
    references: &[Document],
    base: &FxHashMap<String, String>,
) -> FxHashMap<String, String> {
    let mut terms = base.clone();

    for referenced in references {
        for (term, _) in mixed_case_terms(referenced) {
            terms.entry(term.to_lowercase()).or_insert(term);
        }
    }

    let mut own: FxHashMap<String, (String, usize)> = FxHashMap::default();
    for (term, count) in mixed_case_terms(doc) {
        let key = term.to_lowercase();
        match own.get(&key) {
            Some((_, best)) if *best >= count => {}
            _ => {
                own.insert(key, (term, count));
            }
        }
    }
    for (key, (term, _)) in own {
        terms.entry(key).or_insert(term);
    }
    terms
}

pub fn copyedit_rules<'a>(
    ctx: &'a PolicyContext<'_>,
    terms: &'a FxHashMap<String, String>,
) -> Vec<Box<dyn Rule + 'a>> {
    let mut rules: Vec<Box<dyn Rule + 'a>> = review_rules(ctx.rules);
    rules.push(Box::new(Terminology { terms }));
    rules.push(Box::new(InteriorSpaces));
    rules
}

/// Copyedit the prose inside `within` (the whole document when `None`).
pub(crate) fn copyedit_within(
    doc: &Document,
    ctx: &PolicyContext<'_>,
    within: Option<Range<usize>>,
    report: &mut Report,
) -> Vec<Rewrite> {
    let terms = consistency_terms(doc, ctx.references, &ctx.rules.terms);
    let engine = RuleEngine::new(copyedit_rules(ctx, &terms), &ctx.rules.protected);
    edit_prose(doc, &engine, within, report)
}

pub fn copyedit(doc: &Document, ctx: &PolicyContext<'_>) -> PolicyOutcome {
    let mut report = Report::new("copyedit");
    let rewrites = copyedit_within(doc, ctx, None, &mut report);
    tracing::debug!(
        rewrites = rewrites.len(),
        references = ctx.references.len(),
        "copyedit done"
    );
    PolicyOutcome { rewrites, report }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_case_detection() {
        assert!(is_mixed_case("LangChain"));
        assert!(is_mixed_case("iOS"));
        assert!(!is_mixed_case("Python"));
        assert!(!is_mixed_case("API"));
        assert!(!is_mixed_case("gpt-4o"));
    }

    #[test]
    fn base_table_outranks_references_and_self() {
        let mut base = FxHashMap::default();
        base.insert("github".to_string(), "GitHub".to_string());
        let reference = Document::parse("b/index.md", "We use GitHUB and LlamaIndex.\n");
        let doc = Document::parse("a/index.md", "DataDog, DataDog, Datadog and DataDOG.\n");
        let terms = consistency_terms(&doc, &[reference], &base);
        assert_eq!(terms["github"], "GitHub");
        assert_eq!(terms["llamaindex"], "LlamaIndex");
        assert_eq!(terms["datadog"], "DataDog");
    }
}
