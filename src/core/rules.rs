//! Correction rules and the engine that applies them to prose.
//!
//! A [`Rule`] proposes [`Candidate`] replacements over a piece of editable
//! prose. The [`RuleEngine`] filters out candidates that would alter a
//! protected token, applies the rest, and repeats the whole pipeline until
//! nothing changes, so a second run over its own output is a no-op.

use crate::core::assets;
use crate::core::config::EditorConfig;
use crate::core::document::line_of;
use crate::core::error::ScrivenerError;
use crate::core::prose::{self, ProtectedTokens, WORD};
use crate::core::report::{Anomaly, AnomalyKind, Change, Report};
use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;
use std::ops::Range;
use std::sync::LazyLock;

/// Upper bound on pipeline repetitions per prose region.
const MAX_PASSES: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub range: Range<usize>,
    pub replacement: String,
}

pub trait Rule {
    fn name(&self) -> &'static str;
    /// Proposed replacements over `text`, sorted and non-overlapping.
    fn candidates(&self, text: &str) -> Vec<Candidate>;
}

#[derive(Debug, Deserialize)]
struct ReviewTable {
    #[serde(default)]
    words: FxHashMap<String, String>,
    #[serde(default)]
    phrases: Vec<PhraseDef>,
    #[serde(default)]
    duplicates: DuplicatesDef,
}

#[derive(Debug, Deserialize)]
struct PhraseDef {
    pattern: String,
    replacement: String,
}

#[derive(Debug, Default, Deserialize)]
struct DuplicatesDef {
    #[serde(default)]
    allow: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TerminologyTable {
    #[serde(default)]
    terms: FxHashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct PhraseRule {
    regex: Regex,
    replacement: String,
}

/// Embedded tables merged with the project's config.
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub words: FxHashMap<String, String>,
    pub phrases: Vec<PhraseRule>,
    pub duplicate_allow: FxHashSet<String>,
    pub terms: FxHashMap<String, String>,
    pub protected: ProtectedTokens,
}

impl RuleSet {
    pub fn load(config: &EditorConfig) -> Result<Self, ScrivenerError> {
        let review_src = assets::get_embedded_rules("review.toml")
            .ok_or_else(|| ScrivenerError::NotFound("rules/review.toml".to_string()))?;
        let terms_src = assets::get_embedded_rules("terminology.toml")
            .ok_or_else(|| ScrivenerError::NotFound("rules/terminology.toml".to_string()))?;
        let review: ReviewTable = toml::from_str(review_src)?;
        let terminology: TerminologyTable = toml::from_str(terms_src)?;

        let mut words: FxHashMap<String, String> = review
            .words
            .into_iter()
            .map(|(k, v)| (normalize_key(&k), v))
            .collect();
        for (k, v) in &config.corrections {
            words.insert(normalize_key(k), v.clone());
        }

        let mut terms: FxHashMap<String, String> = terminology
            .terms
            .into_iter()
            .map(|(k, v)| (normalize_key(&k), v))
            .collect();
        for (k, v) in &config.terminology {
            terms.insert(normalize_key(k), v.clone());
        }

        let phrases = review
            .phrases
            .iter()
            .map(|p| PhraseRule::compile(&p.pattern, &p.replacement))
            .collect::<Result<Vec<_>, _>>()?;

        let set = Self {
            words,
            phrases,
            duplicate_allow: review
                .duplicates
                .allow
                .into_iter()
                .map(|w| w.to_lowercase())
                .collect(),
            terms,
            protected: ProtectedTokens::new(&config.protected_patterns)?,
        };
        set.validate()?;
        Ok(set)
    }

    /// A correction whose output is itself a misspelling would never settle.
    fn validate(&self) -> Result<(), ScrivenerError> {
        for (from, to) in &self.words {
            if from.is_empty() || to.is_empty() {
                return Err(ScrivenerError::RuleError(
                    "empty word correction".to_string(),
                ));
            }
            if self.words.contains_key(&normalize_key(to)) {
                return Err(ScrivenerError::RuleError(format!(
                    "correction {:?} -> {:?} chains into another correction",
                    from, to
                )));
            }
        }
        for phrase in &self.phrases {
            if self.phrases.iter().any(|p| p.regex.is_match(&phrase.replacement)) {
                return Err(ScrivenerError::RuleError(format!(
                    "phrase replacement {:?} matches a phrase pattern",
                    phrase.replacement
                )));
            }
        }
        Ok(())
    }
}

fn normalize_key(word: &str) -> String {
    word.trim().replace('’', "'").to_lowercase()
}

/// Carry the case of `original` over to `replacement`. Replacements with
/// their own capitals (`APIs`, `GitHub`) are used verbatim.
pub fn match_case(original: &str, replacement: &str) -> String {
    if replacement.chars().any(char::is_uppercase) {
        return replacement.to_string();
    }
    let letters: Vec<char> = original.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.len() > 1 && letters.iter().all(|c| c.is_uppercase()) {
        return replacement.to_uppercase();
    }
    if original.chars().next().is_some_and(char::is_uppercase) {
        let mut chars = replacement.chars();
        return match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
    }
    replacement.to_string()
}

/// Misspelling dictionary over whole word tokens.
pub struct WordCorrections<'a> {
    pub words: &'a FxHashMap<String, String>,
}

impl Rule for WordCorrections<'_> {
    fn name(&self) -> &'static str {
        "spelling"
    }

    fn candidates(&self, text: &str) -> Vec<Candidate> {
        WORD.find_iter(text)
            .filter_map(|m| {
                let fix = self.words.get(&normalize_key(m.as_str()))?;
                Some(Candidate {
                    range: m.range(),
                    replacement: match_case(m.as_str(), fix),
                })
            })
            .collect()
    }
}

impl PhraseRule {
    pub fn compile(pattern: &str, replacement: &str) -> Result<Self, ScrivenerError> {
        let body = pattern
            .split_whitespace()
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(r"[ \t]+");
        if body.is_empty() {
            return Err(ScrivenerError::RuleError("empty phrase pattern".to_string()));
        }
        let regex = Regex::new(&format!(r"(?i)\b{}\b", body))
            .map_err(|e| ScrivenerError::RuleError(e.to_string()))?;
        Ok(Self {
            regex,
            replacement: replacement.to_string(),
        })
    }
}

/// Fixed grammar slips such as `could of`.
pub struct PhraseCorrections<'a> {
    pub phrases: &'a [PhraseRule],
}

impl Rule for PhraseCorrections<'_> {
    fn name(&self) -> &'static str {
        "grammar"
    }

    fn candidates(&self, text: &str) -> Vec<Candidate> {
        let mut found: Vec<Candidate> = self
            .phrases
            .iter()
            .flat_map(|p| {
                p.regex.find_iter(text).map(|m| Candidate {
                    range: m.range(),
                    replacement: match_case(m.as_str(), &p.replacement),
                })
            })
            .collect();
        found.sort_by_key(|c| c.range.start);
        drop_overlaps(found)
    }
}

/// `the the` on one line collapses to `the`.
pub struct RepeatedWords<'a> {
    pub allow: &'a FxHashSet<String>,
}

impl Rule for RepeatedWords<'_> {
    fn name(&self) -> &'static str {
        "repeated-word"
    }

    fn candidates(&self, text: &str) -> Vec<Candidate> {
        let tokens: Vec<_> = WORD.find_iter(text).collect();
        tokens
            .windows(2)
            .filter_map(|pair| {
                let (a, b) = (pair[0], pair[1]);
                let gap = &text[a.end()..b.start()];
                let same = a.as_str().eq_ignore_ascii_case(b.as_str());
                let alphabetic = a.as_str().chars().all(char::is_alphabetic);
                let spaced = !gap.is_empty() && gap.chars().all(|c| c == ' ' || c == '\t');
                let allowed = self.allow.contains(&a.as_str().to_lowercase());
                (same && alphabetic && spaced && !allowed).then(|| Candidate {
                    range: a.end()..b.end(),
                    replacement: String::new(),
                })
            })
            .collect()
    }
}

// `![` opens an image and `!=` is an operator; neither ends a sentence.
static SPACE_BEFORE_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9)\]][ \t]+([,;?]|!(?:[^\[=]|$))").unwrap());

/// `word ,` becomes `word,`.
pub struct PunctuationSpacing;

impl Rule for PunctuationSpacing {
    fn name(&self) -> &'static str {
        "punctuation"
    }

    fn candidates(&self, text: &str) -> Vec<Candidate> {
        SPACE_BEFORE_PUNCT
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let mark = caps.get(1)?;
                Some(Candidate {
                    range: whole.start() + 1..mark.start(),
                    replacement: String::new(),
                })
            })
            .collect()
    }
}

/// Canonical spellings for product and technology names.
pub struct Terminology<'a> {
    pub terms: &'a FxHashMap<String, String>,
}

impl Rule for Terminology<'_> {
    fn name(&self) -> &'static str {
        "terminology"
    }

    fn candidates(&self, text: &str) -> Vec<Candidate> {
        WORD.find_iter(text)
            .filter_map(|m| {
                let canonical = self.terms.get(&normalize_key(m.as_str()))?;
                (m.as_str() != canonical).then(|| Candidate {
                    range: m.range(),
                    replacement: canonical.clone(),
                })
            })
            .collect()
    }
}

static SPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ ]{2,}").unwrap());

/// Runs of spaces between words collapse to one. Indentation and trailing
/// hard-break spaces are kept.
pub struct InteriorSpaces;

impl Rule for InteriorSpaces {
    fn name(&self) -> &'static str {
        "whitespace"
    }

    fn candidates(&self, text: &str) -> Vec<Candidate> {
        SPACE_RUN
            .find_iter(text)
            .filter(|m| {
                let before = text[..m.start()].chars().next_back();
                let after = text[m.end()..].chars().next();
                before.is_some_and(|c| !c.is_whitespace()) && after.is_some_and(|c| !c.is_whitespace())
            })
            .map(|m| Candidate {
                range: m.range(),
                replacement: " ".to_string(),
            })
            .collect()
    }
}

fn drop_overlaps(sorted: Vec<Candidate>) -> Vec<Candidate> {
    let mut kept: Vec<Candidate> = Vec::with_capacity(sorted.len());
    for candidate in sorted {
        if kept.last().is_none_or(|last| last.range.end <= candidate.range.start) {
            kept.push(candidate);
        }
    }
    kept
}

/// Applies an ordered rule pipeline to prose, honoring literal spans and
/// protected tokens.
pub struct RuleEngine<'a> {
    rules: Vec<Box<dyn Rule + 'a>>,
    protected: &'a ProtectedTokens,
}

impl<'a> RuleEngine<'a> {
    pub fn new(rules: Vec<Box<dyn Rule + 'a>>, protected: &'a ProtectedTokens) -> Self {
        Self { rules, protected }
    }

    /// Edit one prose span. `first_line` is the 1-based document line where
    /// `text` starts, used for report locations.
    pub fn edit(&self, text: &str, first_line: usize, report: &mut Report) -> String {
        let mut current = text.to_string();
        for pass in 0..MAX_PASSES {
            let mut changed = false;
            for rule in &self.rules {
                if let Some(next) = self.apply_rule(rule.as_ref(), &current, first_line, report) {
                    current = next;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
            if pass + 1 == MAX_PASSES {
                tracing::warn!(first_line, "rule pipeline did not settle");
            }
        }
        current
    }

    fn apply_rule(
        &self,
        rule: &dyn Rule,
        text: &str,
        first_line: usize,
        report: &mut Report,
    ) -> Option<String> {
        let protected = self.protected.find(text);
        let mut accepted = Vec::new();

        for piece in prose::editable_pieces(text) {
            for candidate in rule.candidates(&text[piece.clone()]) {
                let range = candidate.range.start + piece.start..candidate.range.end + piece.start;
                let original = &text[range.clone()];
                if original == candidate.replacement {
                    continue;
                }
                let line = first_line + line_of(text, range.start) - 1;
                if let Some(token) = protected.iter().find(|p| prose::overlaps(p, &range)) {
                    report.record(Anomaly::new(
                        AnomalyKind::ProtectedTokenCollision,
                        line,
                        format!(
                            "{} correction {:?} -> {:?} skipped; it would alter protected token `{}`",
                            rule.name(),
                            original,
                            candidate.replacement,
                            &text[token.clone()]
                        ),
                    ));
                    continue;
                }
                report.record_change(Change {
                    rule: rule.name().to_string(),
                    line,
                    before: original.to_string(),
                    after: candidate.replacement.clone(),
                });
                accepted.push(Candidate {
                    range,
                    replacement: candidate.replacement,
                });
            }
        }

        if accepted.is_empty() {
            return None;
        }
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        for candidate in accepted {
            out.push_str(&text[cursor..candidate.range.start]);
            out.push_str(&candidate.replacement);
            cursor = candidate.range.end;
        }
        out.push_str(&text[cursor..]);
        Some(out)
    }
}
