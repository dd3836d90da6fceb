use scrivener::core::config::EditorConfig;
use scrivener::core::document::{Document, RegionKind};
use scrivener::core::error::ScrivenerError;
use scrivener::core::report::AnomalyKind;
use scrivener::core::target::{self, Target, TargetSource};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

const STREAMING: &str = include_str!("../fixtures/posts/streaming-sdk.md");
const UNTERMINATED: &str = include_str!("../fixtures/posts/unterminated.md");
const DUPES: &str = include_str!("../fixtures/posts/summary-dupes.md");

#[test]
fn test_segmentation_is_lossless_for_fixtures() {
    for text in [STREAMING, UNTERMINATED, DUPES] {
        let doc = Document::parse("index.md", text);
        let joined: String = doc.regions().iter().map(|r| doc.slice(r)).collect();
        assert_eq!(joined, text);

        // Contiguous cover, no gaps or overlaps.
        let mut cursor = 0;
        for region in doc.regions() {
            assert_eq!(region.span.start, cursor);
            cursor = region.span.end;
        }
        assert_eq!(cursor, text.len());
    }
}

#[test]
fn test_streaming_post_regions() {
    let doc = Document::parse("index.md", STREAMING);
    assert!(doc.front_matter().starts_with("---\ntitle:"));
    assert!(doc.front_matter().ends_with("---\n"));

    let code = doc.code_blocks();
    assert_eq!(code.len(), 2);
    assert!(code[0].starts_with("```sh\n"));
    assert!(code[1].contains("# teh loop below"));

    let tags: Vec<_> = doc
        .regions()
        .iter()
        .filter(|r| r.kind == RegionKind::Code)
        .map(|r| r.info.clone())
        .collect();
    assert_eq!(tags, vec![Some("sh".to_string()), Some("python".to_string())]);
    assert_eq!(
        doc.front_matter_value("title").as_deref(),
        Some("Streaming responses with the OpenAI SDK")
    );
}

#[test]
fn test_unterminated_fence_is_reported_not_fatal() {
    let doc = Document::parse("index.md", UNTERMINATED);
    assert!(doc.code_blocks().is_empty());
    assert_eq!(doc.anomalies().len(), 1);
    let anomaly = &doc.anomalies()[0];
    assert_eq!(anomaly.kind, AnomalyKind::MalformedCodeFence);
    assert_eq!(anomaly.line, 7);
    // Front matter still holds.
    assert_eq!(doc.front_matter(), "---\ntitle: \"Draft\"\n---\n");
}

#[test]
fn test_unterminated_front_matter_becomes_prose() {
    let doc = Document::parse("index.md", "---\ntitle: x\nno closer here\n");
    assert_eq!(doc.front_matter(), "");
    assert_eq!(doc.anomalies()[0].kind, AnomalyKind::UnterminatedFrontMatter);
}

fn site_with(files: &[&str]) -> tempfile::TempDir {
    let tmp = tempdir().unwrap();
    for file in files {
        let path = tmp.path().join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "Body.\n").unwrap();
    }
    tmp
}

#[test]
fn test_resolution_gate_precedes_eligibility() {
    let config = EditorConfig::default();
    let err = target::resolve(None, Some(Path::new("assets/css/main.css")), &config.reserved_filename)
        .unwrap_err();
    match err {
        ScrivenerError::WrongTargetFile { found, reserved } => {
            assert_eq!(found, "assets/css/main.css");
            assert_eq!(reserved, "index.md");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_explicit_target_still_needs_content_tree() {
    let tmp = site_with(&["content/posts/a/index.md", "layouts/index.md"]);
    let config = EditorConfig::default();

    let ok = Target {
        path: tmp.path().join("content/posts/a/index.md"),
        source: TargetSource::Explicit,
    };
    let resolved = target::check_eligible(&ok, tmp.path(), &config).unwrap();
    assert!(resolved.ends_with("content/posts/a/index.md"));

    let layout = Target {
        path: PathBuf::from("layouts/index.md"),
        source: TargetSource::Explicit,
    };
    assert!(matches!(
        target::check_eligible(&layout, tmp.path(), &config),
        Err(ScrivenerError::IneligibleTarget { .. })
    ));
}

#[test]
fn test_custom_reserved_name_from_config() {
    let tmp = site_with(&["content/posts/a/_index.md"]);
    fs::write(tmp.path().join("scrivener.toml"), "reserved_filename = \"_index.md\"\n").unwrap();
    let config = EditorConfig::load(tmp.path()).unwrap();
    let resolved = target::resolve(
        None,
        Some(Path::new("content/posts/a/_index.md")),
        &config.reserved_filename,
    )
    .unwrap();
    assert!(target::check_eligible(&resolved, tmp.path(), &config).is_ok());
}
