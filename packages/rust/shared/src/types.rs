//! Domain types shared by the expander and the merger.

use std::path::PathBuf;

use serde::Serialize;

// ---------------------------------------------------------------------------
// LinkEntry
// ---------------------------------------------------------------------------

/// One `- [title](target)` bullet captured from a linkable index section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    /// Display title inside the brackets.
    pub title: String,
    /// Link target, possibly carrying `#fragment` and `?query`.
    pub target: String,
    /// Text after the first `:` following the link; empty when absent.
    pub description: String,
    /// The untouched source line.
    pub raw_line: String,
}

// ---------------------------------------------------------------------------
// PageOrder
// ---------------------------------------------------------------------------

/// Where a [`PageOrder`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderSource {
    /// Configured literal list.
    Literal,
    /// Derived from the navigation include.
    Navigation,
    /// Navigation yielded nothing; every page in the directory, sorted.
    AlphabeticalFallback,
}

impl std::fmt::Display for OrderSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal => f.write_str("literal"),
            Self::Navigation => f.write_str("navigation"),
            Self::AlphabeticalFallback => f.write_str("alphabetical-fallback"),
        }
    }
}

/// Ordered markdown filenames to concatenate for one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOrder {
    pub files: Vec<String>,
    pub source: OrderSource,
}

// ---------------------------------------------------------------------------
// CombinedOutput
// ---------------------------------------------------------------------------

/// An aggregated document: synthesized header followed by body parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedOutput {
    /// Everything before the first body part (front matter, intro, TOC).
    pub header: String,
    /// Body parts in output order; each is already trimmed.
    pub parts: Vec<String>,
    /// Text placed between consecutive parts.
    pub separator: &'static str,
}

impl CombinedOutput {
    /// Render the final text.
    ///
    /// One blank line separates the header from the first part, and the
    /// result always ends with a single newline.
    pub fn render(&self) -> String {
        let mut out = self.header.trim_end().to_string();
        if !self.parts.is_empty() {
            out.push_str("\n\n");
            out.push_str(&self.parts.join(self.separator));
        }
        out.push('\n');
        out
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Why an entry was left out of the combined output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SkipReason {
    /// The link target is not under a recognized documentation prefix.
    Unresolvable { target: String },
    /// The resolved file does not exist.
    NotFound { path: PathBuf },
    /// The file exists but could not be read.
    Unreadable { path: PathBuf, error: String },
    /// Nothing left after front matter removal and trimming.
    EmptyBody { path: PathBuf },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unresolvable { target } => write!(f, "unresolvable target {target}"),
            Self::NotFound { path } => write!(f, "file not found: {}", path.display()),
            Self::Unreadable { path, error } => {
                write!(f, "cannot read {}: {error}", path.display())
            }
            Self::EmptyBody { path } => write!(f, "empty body: {}", path.display()),
        }
    }
}

/// An entry omitted from the output, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    pub name: String,
    pub reason: SkipReason,
}

/// Summary of one `expand` run.
#[derive(Debug, Clone, Serialize)]
pub struct ExpandReport {
    pub output_path: PathBuf,
    /// Unicode scalar values written.
    pub chars_written: usize,
    pub size_bytes: usize,
    pub sha256: String,
    pub sections: usize,
    pub links: usize,
    pub included: usize,
    pub skipped: Vec<SkippedEntry>,
}

/// Summary of one language's `merge` run.
#[derive(Debug, Clone, Serialize)]
pub struct MergeReport {
    pub language: String,
    pub output_path: PathBuf,
    pub order_source: OrderSource,
    /// Primary pages included.
    pub sections: usize,
    /// Supplementary pages included.
    pub supplementary: usize,
    pub size_bytes: usize,
    pub sha256: String,
    pub skipped: Vec<SkippedEntry>,
}
