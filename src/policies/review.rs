//! `review`: spelling and grammar corrections in prose.
//!
//! No style rewrites, no reordering. Protected version tokens are never
//! altered; a correction that would touch one is skipped and reported.

use super::{PolicyContext, PolicyOutcome, edit_prose};
use crate::core::document::Document;
use crate::core::report::Report;
use crate::core::rules::{
    PhraseCorrections, PunctuationSpacing, RepeatedWords, Rule, RuleEngine, RuleSet,
    WordCorrections,
};

/// Review rules in application order.
pub fn review_rules(rules: &RuleSet) -> Vec<Box<dyn Rule + '_>> {
    vec![
        Box::new(WordCorrections { words: &rules.words }),
        Box::new(PhraseCorrections {
            phrases: &rules.phrases,
        }),
        Box::new(RepeatedWords {
            allow: &rules.duplicate_allow,
        }),
        Box::new(PunctuationSpacing),
    ]
}

pub fn review(doc: &Document, ctx: &PolicyContext<'_>) -> PolicyOutcome {
    let engine = RuleEngine::new(review_rules(ctx.rules), &ctx.rules.protected);
    let mut report = Report::new("review");
    let rewrites = edit_prose(doc, &engine, None, &mut report);
    tracing::debug!(rewrites = rewrites.len(), changes = report.changes.len(), "review done");
    PolicyOutcome { rewrites, report }
}
