//! Index document parser.
//!
//! The index follows the llms.txt layout (<https://llmstxt.org/>):
//! - prose and a `# Title` header
//! - sections: `## Section Name` followed by Markdown link lists
//! - links: `- [Link Name](url): Optional description`
//!
//! Links are only captured under allow-listed ("linkable") sections; every
//! other line, inside or outside such a section, is kept verbatim as header
//! text.

use std::sync::LazyLock;

use regex::Regex;

use docbundle_shared::LinkEntry;

/// Matches `## Section Title` (but not `###`).
static H2_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^##\s+(.+?)\s*$").expect("H2 regex")
});

/// Matches `- [Name](url)` with anything after it.
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[-*]\s+\[([^\]]+)\]\(([^)\s]+)\)(.*)$").expect("link regex")
});

/// Parsed representation of the index document.
#[derive(Debug, Clone, Default)]
pub struct IndexDocument {
    /// Lines copied verbatim, in original order.
    pub header_lines: Vec<String>,
    /// Linkable sections in first-encounter order.
    pub sections: Vec<IndexSection>,
}

/// A linkable `## ` section with its captured links.
#[derive(Debug, Clone)]
pub struct IndexSection {
    pub name: String,
    pub links: Vec<LinkEntry>,
}

impl IndexDocument {
    /// All captured links, grouped by section in section order.
    pub fn links(&self) -> impl Iterator<Item = &LinkEntry> {
        self.sections.iter().flat_map(|s| s.links.iter())
    }
}

/// Parse the index, capturing links under the sections named in `linkable`.
///
/// A linkable heading that appears more than once collects its links into
/// the first occurrence.
pub fn parse_index(content: &str, linkable: &[String]) -> IndexDocument {
    let mut doc = IndexDocument::default();
    let mut current: Option<usize> = None;

    for line in content.lines() {
        if let Some(caps) = H2_RE.captures(line) {
            let name = caps[1].trim();
            if linkable.iter().any(|s| s == name) {
                let idx = match doc.sections.iter().position(|s| s.name == name) {
                    Some(idx) => idx,
                    None => {
                        doc.sections.push(IndexSection {
                            name: name.to_string(),
                            links: Vec::new(),
                        });
                        doc.sections.len() - 1
                    }
                };
                current = Some(idx);
                continue;
            }
            current = None;
            doc.header_lines.push(line.to_string());
            continue;
        }

        if let Some(idx) = current {
            if let Some(entry) = parse_link_line(line) {
                doc.sections[idx].links.push(entry);
                continue;
            }
        }

        doc.header_lines.push(line.to_string());
    }

    doc
}

/// Parse a `- [title](target): description` bullet.
fn parse_link_line(line: &str) -> Option<LinkEntry> {
    let caps = LINK_RE.captures(line)?;
    let description = caps[3]
        .split_once(':')
        .map(|(_, text)| text.trim().to_string())
        .unwrap_or_default();

    Some(LinkEntry {
        title: caps[1].trim().to_string(),
        target: caps[2].trim().to_string(),
        description,
        raw_line: line.to_string(),
    })
}
