//! Region segmentation for Markdown documents.
//!
//! A [`Document`] owns its raw text plus an immutable arena of [`Region`]s.
//! Regions are line-aligned, contiguous, and cover the whole text, so
//! concatenating their spans reproduces the input byte-for-byte. Edits are
//! expressed as [`Rewrite`]s against prose spans and applied with
//! [`Document::apply`], which refuses anything touching front matter or code.

use crate::core::error::ScrivenerError;
use crate::core::report::{Anomaly, AnomalyKind};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::ops::Range;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    FrontMatter,
    Code,
    Prose,
}

impl std::fmt::Display for RegionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FrontMatter => write!(f, "front-matter"),
            Self::Code => write!(f, "code"),
            Self::Prose => write!(f, "prose"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Region {
    pub kind: RegionKind,
    pub span: Range<usize>,
    /// Language tag of a code fence, if declared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

/// Replace `range` of the original text with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub range: Range<usize>,
    pub replacement: String,
}

#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    text: String,
    regions: Vec<Region>,
    anomalies: Vec<Anomaly>,
}

impl Document {
    pub fn parse(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let path = path.into();
        let text = text.into();
        let (regions, anomalies) = segment(&text);
        Self {
            path,
            text,
            regions,
            anomalies,
        }
    }

    pub fn read(path: &Path) -> Result<Self, ScrivenerError> {
        let text = std::fs::read_to_string(path).map_err(ScrivenerError::IoError)?;
        Ok(Self::parse(path, text))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Anomalies detected while segmenting.
    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    pub fn slice(&self, region: &Region) -> &str {
        &self.text[region.span.clone()]
    }

    /// Front matter including both fence lines; empty when absent.
    pub fn front_matter(&self) -> &str {
        self.regions
            .iter()
            .find(|r| r.kind == RegionKind::FrontMatter)
            .map(|r| self.slice(r))
            .unwrap_or("")
    }

    pub fn code_blocks(&self) -> Vec<&str> {
        self.regions
            .iter()
            .filter(|r| r.kind == RegionKind::Code)
            .map(|r| self.slice(r))
            .collect()
    }

    pub fn prose_regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter().filter(|r| r.kind == RegionKind::Prose)
    }

    /// 1-based line number of a byte offset.
    pub fn line_of(&self, offset: usize) -> usize {
        line_of(&self.text, offset)
    }

    /// Front matter value for `key`, for either YAML (`key: v`) or TOML
    /// (`key = v`) front matter. Surrounding quotes are stripped.
    pub fn front_matter_value(&self, key: &str) -> Option<String> {
        let fm = self.front_matter();
        for line in fm.lines().skip(1) {
            let trimmed = line.trim();
            let rest = match trimmed.strip_prefix(key) {
                Some(rest) => rest.trim_start(),
                None => continue,
            };
            let value = match rest.strip_prefix(':').or_else(|| rest.strip_prefix('=')) {
                Some(v) => v.trim(),
                None => continue,
            };
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
        None
    }

    /// SHA-256 fingerprint of every immutable region, in order. The final
    /// line terminator is excluded: appending to a file that ends on a bare
    /// closing fence has to add one.
    pub fn immutable_fingerprint(&self) -> Vec<(RegionKind, String)> {
        self.regions
            .iter()
            .filter(|r| r.kind != RegionKind::Prose)
            .map(|r| {
                let body = self.slice(r);
                let body = body
                    .strip_suffix('\n')
                    .map(|b| b.strip_suffix('\r').unwrap_or(b))
                    .unwrap_or(body);
                let mut hasher = Sha256::new();
                hasher.update(body.as_bytes());
                (r.kind, format!("{:x}", hasher.finalize()))
            })
            .collect()
    }

    /// Apply non-overlapping rewrites. Each rewrite must lie inside a single
    /// prose region, or be an empty insertion at the end of the text.
    pub fn apply(&self, rewrites: &[Rewrite]) -> Result<String, ScrivenerError> {
        let mut sorted: Vec<&Rewrite> = rewrites.iter().collect();
        sorted.sort_by_key(|r| (r.range.start, r.range.end));

        let mut out = String::with_capacity(self.text.len());
        let mut cursor = 0;
        for rewrite in sorted {
            let range = rewrite.range.clone();
            if range.start < cursor || range.end > self.text.len() || range.start > range.end {
                return Err(ScrivenerError::InvariantViolation(format!(
                    "rewrite {:?} overlaps another rewrite or leaves the document",
                    range
                )));
            }
            if !self.is_prose_range(&range) {
                return Err(ScrivenerError::InvariantViolation(format!(
                    "rewrite {:?} touches a front matter or code region",
                    range
                )));
            }
            out.push_str(&self.text[cursor..range.start]);
            out.push_str(&rewrite.replacement);
            cursor = range.end;
        }
        out.push_str(&self.text[cursor..]);
        Ok(out)
    }

    fn is_prose_range(&self, range: &Range<usize>) -> bool {
        if range.start == self.text.len() && range.is_empty() {
            return true;
        }
        self.prose_regions()
            .any(|r| r.span.start <= range.start && range.end <= r.span.end)
    }
}

/// 1-based line containing byte `offset`. Any offset is accepted, including
/// one inside a multibyte character.
pub fn line_of(text: &str, offset: usize) -> usize {
    let bytes = &text.as_bytes()[..offset.min(text.len())];
    bytes.iter().filter(|b| **b == b'\n').count() + 1
}

/// Byte ranges of each line, newline included.
fn line_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices('\n') {
        spans.push(start..idx + 1);
        start = idx + 1;
    }
    if start < text.len() {
        spans.push(start..text.len());
    }
    spans
}

fn strip_eol(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

fn front_matter_marker(line: &str) -> Option<&'static str> {
    match strip_eol(line).trim_end() {
        "---" => Some("---"),
        "+++" => Some("+++"),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Fence {
    pub ch: char,
    pub len: usize,
    pub info: String,
}

/// Recognize an opening code fence: up to three spaces of indent, then three
/// or more backticks or tildes. Backtick fences may not carry backticks in
/// their info string.
pub(crate) fn opening_fence(line: &str) -> Option<Fence> {
    let line = strip_eol(line);
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }
    let rest = &line[indent..];
    let ch = rest.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = rest.chars().take_while(|c| *c == ch).count();
    if len < 3 {
        return None;
    }
    let info = rest[len..].trim();
    if ch == '`' && info.contains('`') {
        return None;
    }
    Some(Fence {
        ch,
        len,
        info: info.split_whitespace().next().unwrap_or("").to_string(),
    })
}

fn closes_fence(line: &str, open: &Fence) -> bool {
    let line = strip_eol(line);
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return false;
    }
    let rest = &line[indent..];
    let len = rest.chars().take_while(|c| *c == open.ch).count();
    len >= open.len && rest[len * open.ch.len_utf8()..].trim().is_empty()
}

fn push_region(regions: &mut Vec<Region>, kind: RegionKind, span: Range<usize>, info: Option<String>) {
    if span.is_empty() {
        return;
    }
    if kind == RegionKind::Prose
        && let Some(last) = regions.last_mut()
        && last.kind == RegionKind::Prose
        && last.span.end == span.start
    {
        last.span.end = span.end;
        return;
    }
    regions.push(Region { kind, span, info });
}

/// Split `text` into front matter, code, and prose regions.
pub fn segment(text: &str) -> (Vec<Region>, Vec<Anomaly>) {
    let lines = line_spans(text);
    let mut regions = Vec::new();
    let mut anomalies = Vec::new();
    let mut idx = 0;

    let body = text.strip_prefix('\u{feff}').unwrap_or(text);
    let bom = text.len() - body.len();
    if let Some(first) = lines.first()
        && let Some(marker) = front_matter_marker(&text[first.start + bom..first.end])
    {
        let close = lines[1..]
            .iter()
            .position(|l| front_matter_marker(&text[l.clone()]) == Some(marker));
        match close {
            Some(pos) => {
                let end = lines[pos + 1].end;
                push_region(&mut regions, RegionKind::FrontMatter, 0..end, None);
                idx = pos + 2;
            }
            None => anomalies.push(Anomaly::new(
                AnomalyKind::UnterminatedFrontMatter,
                1,
                format!("front matter opened with `{}` is never closed; treated as prose", marker),
            )),
        }
    }

    let mut prose_start = lines.get(idx).map(|l| l.start).unwrap_or(text.len());
    while idx < lines.len() {
        let line = &text[lines[idx].clone()];
        let Some(fence) = opening_fence(line) else {
            idx += 1;
            continue;
        };
        let close = lines[idx + 1..]
            .iter()
            .position(|l| closes_fence(&text[l.clone()], &fence));
        match close {
            Some(offset) => {
                let close_idx = idx + 1 + offset;
                let code_start = lines[idx].start;
                let code_end = lines[close_idx].end;
                push_region(&mut regions, RegionKind::Prose, prose_start..code_start, None);
                let info = (!fence.info.is_empty()).then(|| fence.info.clone());
                push_region(&mut regions, RegionKind::Code, code_start..code_end, info);
                prose_start = code_end;
                idx = close_idx + 1;
            }
            None => {
                let fence_text: String = std::iter::repeat_n(fence.ch, fence.len).collect();
                anomalies.push(Anomaly::new(
                    AnomalyKind::MalformedCodeFence,
                    idx + 1,
                    format!(
                        "code fence `{}` is never closed; the rest of the file is treated as prose",
                        fence_text
                    ),
                ));
                break;
            }
        }
    }
    push_region(&mut regions, RegionKind::Prose, prose_start..text.len(), None);

    (regions, anomalies)
}
