//! Body cleanup passes applied before pages are concatenated.
//!
//! Each pass is a function `&str -> String` (or a split) applied in sequence.

use std::sync::LazyLock;

use regex::Regex;

/// Run the cleanup pipeline on a page body: normalize line endings and trim
/// surrounding whitespace. Interior whitespace is left alone; trailing spaces
/// are hard line breaks in markdown.
pub fn clean_body(md: &str) -> String {
    normalize_line_endings(md).trim().to_string()
}

// ---------------------------------------------------------------------------
// Pass 1: Normalize line endings
// ---------------------------------------------------------------------------

/// Convert CRLF and lone CR line endings to LF.
pub fn normalize_line_endings(md: &str) -> String {
    if !md.contains('\r') {
        return md.to_string();
    }
    md.replace("\r\n", "\n").replace('\r', "\n")
}

// ---------------------------------------------------------------------------
// Pass 2: Leading heading extraction
// ---------------------------------------------------------------------------

/// If the first non-blank line of `md` is an ATX heading, return its text and
/// the remaining body with that line removed and re-trimmed.
pub fn split_leading_heading(md: &str) -> Option<(String, String)> {
    static H_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^#{1,6}\s+(.+?)(?:\s+#+)?\s*$").expect("valid regex")
    });

    let trimmed = md.trim_start();
    let (first, rest) = trimmed.split_once('\n').unwrap_or((trimmed, ""));
    let caps = H_RE.captures(first.trim_end())?;
    Some((caps[1].trim().to_string(), rest.trim().to_string()))
}

// ---------------------------------------------------------------------------
// Titles
// ---------------------------------------------------------------------------

/// Split on `-`, `_`, and whitespace and capitalize each word.
///
/// `linked_bindings` → `Linked Bindings`
pub fn title_case(name: &str) -> String {
    name.replace(['-', '_'], " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(c) => {
                    let upper: String = c.to_uppercase().collect();
                    format!("{upper}{}", chars.as_str())
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Human-readable title for a markdown file name.
pub fn title_from_filename(filename: &str) -> String {
    let stem = filename.strip_suffix(".md").unwrap_or(filename);
    title_case(stem)
}
