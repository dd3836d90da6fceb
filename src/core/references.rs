//! Referenced-document discovery.
//!
//! `copyedit` cross-checks terminology against the pages a post links to.
//! Links are found in prose only: relative Markdown links (`[x](../other/)`,
//! `[x](other.md)`) and Hugo `ref`/`relref` shortcodes. Referenced pages are
//! opened read-only and must live inside the content tree.

use crate::core::document::Document;
use crate::core::report::{Anomaly, AnomalyKind, Report};
use regex::Regex;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

static MD_LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\]\(([^)\s]+)[^)]*\)").unwrap());
static REF_SHORTCODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\{\{[<%]\s*(?:rel)?ref\s+"([^"]+)"\s*[%>]\}\}"#).unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub target: String,
    pub line: usize,
}

/// Link targets found in the document's prose that may point at pages.
pub fn find_references(doc: &Document) -> Vec<Reference> {
    let mut refs = Vec::new();
    for region in doc.prose_regions() {
        let text = doc.slice(region);
        let link_targets = MD_LINK.captures_iter(text).filter_map(|c| c.get(1));
        let shortcode_targets = REF_SHORTCODE.captures_iter(text).filter_map(|c| c.get(1));
        for m in link_targets.chain(shortcode_targets) {
            let target = m.as_str();
            if !is_local_page_link(target) {
                continue;
            }
            let reference = Reference {
                target: target.to_string(),
                line: doc.line_of(region.span.start + m.start()),
            };
            if !refs.contains(&reference) {
                refs.push(reference);
            }
        }
    }
    refs.sort_by_key(|r| r.line);
    refs
}

fn is_local_page_link(target: &str) -> bool {
    if target.contains("://") || target.starts_with("mailto:") || target.starts_with('#') {
        return false;
    }
    let path = target.split(['#', '?']).next().unwrap_or("");
    if path.is_empty() {
        return false;
    }
    match Path::new(path).extension().and_then(|e| e.to_str()) {
        Some(ext) => ext.eq_ignore_ascii_case("md"),
        None => true,
    }
}

/// Lexically normalize `path`, resolving `.` and `..` without touching the
/// filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Candidate files for a link target: the file itself, or a page bundle's
/// `index.md` / `_index.md`, and `name.md` for extensionless links.
fn candidates(base: &Path, reserved: &str) -> Vec<PathBuf> {
    if base.extension().is_some() {
        return vec![base.to_path_buf()];
    }
    let mut out = vec![base.join(reserved), base.join("_index.md")];
    if let Some(name) = base.file_name() {
        let mut file = name.to_os_string();
        file.push(".md");
        out.push(base.with_file_name(file));
    }
    out
}

/// Load every resolvable reference. Unresolvable ones and those outside the
/// content tree are reported, never fatal.
pub fn load_references(
    doc: &Document,
    content_root: &Path,
    reserved: &str,
    report: &mut Report,
) -> Vec<Document> {
    let content_root = normalize(content_root);
    let here = doc.path.parent().map(Path::to_path_buf).unwrap_or_default();
    let target_path = normalize(&doc.path);
    let mut loaded: Vec<Document> = Vec::new();

    for reference in find_references(doc) {
        let raw = reference.target.split(['#', '?']).next().unwrap_or("");
        let base = if let Some(rooted) = raw.strip_prefix('/') {
            content_root.join(rooted)
        } else {
            here.join(raw)
        };
        let base = normalize(&base);

        let Some(file) = candidates(&base, reserved).into_iter().find(|p| p.is_file()) else {
            report.record(Anomaly::new(
                AnomalyKind::UnresolvedReference,
                reference.line,
                format!("referenced page {:?} not found", reference.target),
            ));
            continue;
        };
        if !file.starts_with(&content_root) {
            report.record(Anomaly::new(
                AnomalyKind::UnresolvedReference,
                reference.line,
                format!("referenced page {:?} is outside the content tree", reference.target),
            ));
            continue;
        }
        if file == target_path || loaded.iter().any(|d| d.path == file) {
            continue;
        }
        match Document::read(&file) {
            Ok(referenced) => {
                tracing::debug!(path = %file.display(), "loaded referenced page");
                loaded.push(referenced);
            }
            Err(e) => report.record(Anomaly::new(
                AnomalyKind::UnresolvedReference,
                reference.line,
                format!("referenced page {:?} unreadable: {}", reference.target, e),
            )),
        }
    }
    loaded
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn finds_relative_links_and_ref_shortcodes() {
        let doc = Document::parse(
            "content/posts/a/index.md",
            "See [b](../b/) and {{< ref \"/posts/c\" >}}.\n[site](https://x.io) [top](#top)\n```\n[code](../d/)\n```\n",
        );
        let targets: Vec<String> = find_references(&doc).into_iter().map(|r| r.target).collect();
        assert_eq!(targets, vec!["../b/".to_string(), "/posts/c".to_string()]);
    }

    #[test]
    fn loads_bundles_and_reports_missing_pages() {
        let tmp = tempdir().unwrap();
        let content = tmp.path().join("content");
        fs::create_dir_all(content.join("posts/a")).unwrap();
        fs::create_dir_all(content.join("posts/b")).unwrap();
        fs::write(content.join("posts/b/index.md"), "LangChain notes\n").unwrap();

        let doc = Document::parse(
            content.join("posts/a/index.md"),
            "Read [b](../b/) and [gone](../gone/).\n",
        );
        let mut report = Report::new("copyedit");
        let refs = load_references(&doc, &content, "index.md", &mut report);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].text(), "LangChain notes\n");
        assert_eq!(report.count(AnomalyKind::UnresolvedReference), 1);
    }

    #[test]
    fn rejects_links_escaping_the_content_tree() {
        let tmp = tempdir().unwrap();
        let content = tmp.path().join("content");
        fs::create_dir_all(content.join("posts/a")).unwrap();
        fs::write(tmp.path().join("README.md"), "outside\n").unwrap();

        let doc = Document::parse(content.join("posts/a/index.md"), "[r](../../../README.md)\n");
        let mut report = Report::new("copyedit");
        let refs = load_references(&doc, &content, "index.md", &mut report);
        assert!(refs.is_empty());
        assert_eq!(report.count(AnomalyKind::UnresolvedReference), 1);
    }
}
