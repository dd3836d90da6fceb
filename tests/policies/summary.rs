use scrivener::core::config::EditorConfig;
use scrivener::core::document::Document;
use scrivener::core::editor::edit_document;
use scrivener::core::report::{AnomalyKind, Report, ReportStatus};
use scrivener::core::rules::RuleSet;
use scrivener::policies::EditCommand;

const STREAMING: &str = include_str!("../fixtures/posts/streaming-sdk.md");
const DUPES: &str = include_str!("../fixtures/posts/summary-dupes.md");

fn summarize(text: &str) -> (String, Report) {
    let rules = RuleSet::load(&EditorConfig::default()).unwrap();
    let doc = Document::parse("content/posts/x/index.md", text);
    edit_document(&doc, EditCommand::Summary, &rules, "Summary", &[]).unwrap()
}

#[test]
fn test_summary_appended_when_missing() {
    let (out, report) = summarize(STREAMING);
    assert_eq!(report.status, ReportStatus::Edited);
    assert!(out.starts_with(STREAMING));
    assert_eq!(
        &out[STREAMING.len()..],
        "\n## Summary\n\nThis post covered Installing the SDK and Sending a request. It walked through 2 code examples.\n"
    );
}

#[test]
fn test_summary_does_not_review_the_rest_of_the_post() {
    let (out, _) = summarize(STREAMING);
    assert!(out.contains("Their are three way's"));
}

#[test]
fn test_duplicate_summaries_collapse_to_the_first() {
    let (out, report) = summarize(DUPES);
    assert_eq!(out.matches("## Summary").count(), 1);
    assert_eq!(report.count(AnomalyKind::DuplicateSummarySection), 2);
    let lines: Vec<usize> = report
        .anomalies
        .iter()
        .filter(|a| a.kind == AnomalyKind::DuplicateSummarySection)
        .map(|a| a.line)
        .collect();
    assert_eq!(lines, vec![11, 19]);
    assert_eq!(
        out,
        "+++\ntitle = \"Tracing axum handlers\"\n+++\n\nWe wired tracing into an axum service.\n\n\
         ## Summary\n\nThis post showed how to add the tracing layer.\n\n\
         ```rust\nlet app = Router::new();\n```\n"
    );
}

#[test]
fn test_summary_is_idempotent() {
    for text in [STREAMING, DUPES] {
        let (once, _) = summarize(text);
        let (twice, report) = summarize(&once);
        assert_eq!(once, twice);
        assert_eq!(report.status, ReportStatus::Unchanged);
        assert_eq!(report.count(AnomalyKind::DuplicateSummarySection), 0);
    }
}

#[test]
fn test_empty_summary_section_gets_a_body() {
    let (out, _) = summarize("---\ntitle: \"Notes on Hugo\"\n---\nShort post.\n\n## Summary\n");
    assert_eq!(
        out,
        "---\ntitle: \"Notes on Hugo\"\n---\nShort post.\n\n## Summary\n\nThis post covered Notes on Hugo.\n"
    );
}

#[test]
fn test_summary_heading_match_is_case_insensitive() {
    let text = "Intro.\n\n## summary\n\nAlready here.\n";
    let (out, report) = summarize(text);
    assert_eq!(out, text);
    assert_eq!(report.status, ReportStatus::Unchanged);
}

#[test]
fn test_summary_appends_to_an_empty_file() {
    let (out, _) = summarize("");
    assert_eq!(
        out,
        "## Summary\n\nThis post did not contain any prose to summarize.\n"
    );
}
