use scrivener::core::config::EditorConfig;
use scrivener::core::document::Document;
use scrivener::core::editor::edit_document;
use scrivener::core::report::{AnomalyKind, ReportStatus};
use scrivener::core::rules::RuleSet;
use scrivener::policies::EditCommand;

const STREAMING: &str = include_str!("../fixtures/posts/streaming-sdk.md");
const UNTERMINATED: &str = include_str!("../fixtures/posts/unterminated.md");

fn review(text: &str) -> (String, scrivener::core::report::Report) {
    let rules = RuleSet::load(&EditorConfig::default()).unwrap();
    let doc = Document::parse("content/posts/x/index.md", text);
    edit_document(&doc, EditCommand::Review, &rules, "Summary", &[]).unwrap()
}

#[test]
fn test_review_fixes_misspellings_and_grammar() {
    let (out, report) = review(STREAMING);
    assert_eq!(report.status, ReportStatus::Edited);
    assert!(out.contains("There are three ways to stream tokens with GPT-5-Mini, and the simplest one"));
    assert!(out.contains("Install the library with pip, then export your key:"));
    assert!(out.contains("call receives a `stream=True` flag"));
    assert!(out.contains("for environment details."));
    assert!(out.ends_with("Each event arrives as soon as it is ready, which keeps latency low.\n"));
}

#[test]
fn test_review_leaves_protected_and_literal_text_alone() {
    let (out, _) = review(STREAMING);
    assert!(out.contains("GPT-5-Mini"));
    assert!(out.contains("Python 3.12."));
    assert!(out.contains("`client.responses.create`"));
    assert!(out.contains("[the setup post](../setup/)"));
    // Code blocks keep their typos.
    assert!(out.contains("export OPENAI_API_KEY=teh-key"));
    assert!(out.contains("# teh loop below prints each chunk"));
}

#[test]
fn test_review_is_idempotent() {
    let (once, _) = review(STREAMING);
    let (twice, report) = review(&once);
    assert_eq!(once, twice);
    assert_eq!(report.status, ReportStatus::Unchanged);
    assert!(report.changes.is_empty());
}

#[test]
fn test_review_records_line_numbers() {
    let (_, report) = review(STREAMING);
    let teh = report
        .changes
        .iter()
        .find(|c| c.before == "teh")
        .expect("teh correction");
    assert_eq!(teh.after, "the");
    assert_eq!(teh.line, 7);
    let wich = report.changes.iter().find(|c| c.before == "wich").unwrap();
    assert_eq!(wich.line, 30);
    assert!(report.changes.iter().all(|c| !c.rule.is_empty()));
}

#[test]
fn test_review_does_not_touch_style() {
    let (out, report) = review("Node.js  and github are fine here.\n");
    assert_eq!(out, "Node.js  and github are fine here.\n");
    assert_eq!(report.status, ReportStatus::Unchanged);
}

#[test]
fn test_review_continues_past_unterminated_fence() {
    let (out, report) = review(UNTERMINATED);
    assert_eq!(report.count(AnomalyKind::MalformedCodeFence), 1);
    assert!(out.contains("Some the notes before the snippet."));
    assert!(out.starts_with("---\ntitle: \"Draft\"\n---\n"));
}

#[test]
fn test_review_skips_corrections_inside_protected_tokens() {
    let mut config = EditorConfig::default();
    config.corrections.insert("pyhton".to_string(), "python".to_string());
    let rules = RuleSet::load(&config).unwrap();
    let doc = Document::parse("index.md", "Pyhton 3.12 is out; pyhton scripts still run.\n");
    let (out, report) = edit_document(&doc, EditCommand::Review, &rules, "Summary", &[]).unwrap();
    assert_eq!(out, "Pyhton 3.12 is out; python scripts still run.\n");
    assert_eq!(report.count(AnomalyKind::ProtectedTokenCollision), 1);
    assert_eq!(report.anomalies[0].line, 1);
}

#[test]
fn test_review_keeps_inequality_operators() {
    let (out, report) = review("Check that a != b before returning.\n");
    assert_eq!(out, "Check that a != b before returning.\n");
    assert_eq!(report.status, ReportStatus::Unchanged);
}

#[test]
fn test_review_corrects_capitalized_word_before_plain_number() {
    let (out, report) = review("Teh 3 steps are simple. In 2024 we shipped Step 1.\n");
    assert_eq!(out, "The 3 steps are simple. In 2024 we shipped Step 1.\n");
    assert_eq!(report.count(AnomalyKind::ProtectedTokenCollision), 0);
}
