//! Compact output rendering helpers for CLI surfaces.
//!
//! Keeps report lines bounded and readable while preserving signal.

/// Collapse newlines/extra whitespace and bound length for terminal display.
pub fn compact_line(input: &str, max_chars: usize) -> String {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    let preview: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", preview)
    } else {
        preview
    }
}

/// Render a region table row: kind, 1-based line range, optional tag.
pub fn region_row(kind: &str, first_line: usize, last_line: usize, tag: Option<&str>) -> String {
    let lines = if first_line == last_line {
        format!("L{}", first_line)
    } else {
        format!("L{}-{}", first_line, last_line)
    };
    match tag {
        Some(tag) => format!("{:<13}{:<12}{}", kind, lines, tag),
        None => format!("{:<13}{}", kind, lines),
    }
}
