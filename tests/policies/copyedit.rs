use scrivener::core::config::EditorConfig;
use scrivener::core::document::Document;
use scrivener::core::editor::edit_document;
use scrivener::core::report::{AnomalyKind, Report, ReportStatus};
use scrivener::core::rules::RuleSet;
use scrivener::policies::EditCommand;

const STREAMING: &str = include_str!("../fixtures/posts/streaming-sdk.md");
const PLAIN: &str = include_str!("../fixtures/posts/plain.md");

fn copyedit_with(text: &str, references: &[Document]) -> (String, Report) {
    let rules = RuleSet::load(&EditorConfig::default()).unwrap();
    let doc = Document::parse("content/posts/x/index.md", text);
    edit_document(&doc, EditCommand::Copyedit, &rules, "Summary", references).unwrap()
}

#[test]
fn test_copyedit_applies_terminology_and_spacing() {
    let (out, report) = copyedit_with(
        "We push to github  from a javascript cli.\n\nSee `github.com/x` and https://github.com/x.\n",
        &[],
    );
    assert_eq!(
        out,
        "We push to GitHub from a JavaScript CLI.\n\nSee `github.com/x` and https://github.com/x.\n"
    );
    let rules: Vec<&str> = report.changes.iter().map(|c| c.rule.as_str()).collect();
    assert!(rules.contains(&"terminology"));
    assert!(rules.contains(&"whitespace"));
}

#[test]
fn test_copyedit_includes_review_corrections() {
    let (out, _) = copyedit_with(STREAMING, &[]);
    assert!(out.contains("There are three ways"));
    assert!(out.contains("Install the library with pip, then"));
}

#[test]
fn test_copyedit_keeps_code_whitespace() {
    let (out, _) = copyedit_with(PLAIN, &[]);
    assert!(out.contains("raw   text   with   spaces"));
    assert!(out.ends_with("Nothing else to say, really.\n"));
}

#[test]
fn test_copyedit_is_idempotent() {
    for text in [STREAMING, PLAIN] {
        let (once, _) = copyedit_with(text, &[]);
        let (twice, report) = copyedit_with(&once, &[]);
        assert_eq!(once, twice);
        assert_eq!(report.status, ReportStatus::Unchanged);
    }
}

#[test]
fn test_copyedit_follows_referenced_pages() {
    let setup = Document::parse(
        "content/posts/setup/index.md",
        "Install LlamaIndex first.\n\n```py\nimport llamaindex\n```\n",
    );
    let (out, _) = copyedit_with("Then load llamaindex and go.\n", &[setup]);
    assert_eq!(out, "Then load LlamaIndex and go.\n");
}

#[test]
fn test_copyedit_uses_dominant_own_spelling() {
    let (out, _) = copyedit_with("TokenFlow is fast. TokenFlow is small. Tokenflow ships.\n", &[]);
    assert_eq!(out, "TokenFlow is fast. TokenFlow is small. TokenFlow ships.\n");
}

#[test]
fn test_copyedit_reports_protected_collisions() {
    let (out, report) = copyedit_with("The Sdk 2.1 release and the sdk docs.\n", &[]);
    assert_eq!(out, "The Sdk 2.1 release and the SDK docs.\n");
    assert_eq!(report.count(AnomalyKind::ProtectedTokenCollision), 1);
}
