//! Markdown utilities shared by the expander and the merger.
//!
//! Reads markdown pages, separates their front matter from the body, and
//! turns cross-page links into in-document anchors.

mod cleanup;
mod frontmatter;
mod links;

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use docbundle_shared::{DocBundleError, Result};

pub use cleanup::{
    clean_body, normalize_line_endings, split_leading_heading, title_case, title_from_filename,
};
pub use frontmatter::{FrontMatterPolicy, FrontMatterSplit, split_front_matter};
pub use links::{
    anchor_for_target, anchor_slug, fragment_slug, is_external, is_markdown_target,
    rewrite_links,
};

// ---------------------------------------------------------------------------
// MarkdownDocument
// ---------------------------------------------------------------------------

/// A markdown page read from disk, split into front matter and body.
#[derive(Debug, Clone)]
pub struct MarkdownDocument {
    /// Where the page was read from.
    pub path: PathBuf,
    /// Front matter content between the fences, if present.
    pub front_matter: Option<String>,
    /// Text tolerated before the opening fence (see [`FrontMatterPolicy`]).
    pub leading: Option<String>,
    /// Everything after the front matter, untrimmed.
    pub body: String,
}

impl MarkdownDocument {
    /// Split already-loaded text.
    pub fn from_text(path: impl Into<PathBuf>, text: &str, policy: FrontMatterPolicy) -> Self {
        let split = split_front_matter(text, policy);
        Self {
            path: path.into(),
            front_matter: split.front_matter.map(str::to_string),
            leading: split.leading.map(str::to_string),
            body: split.body.to_string(),
        }
    }

    /// Read and split a page.
    #[instrument(level = "debug", skip_all, fields(path = %path.display()))]
    pub fn read(path: &Path, policy: FrontMatterPolicy) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| DocBundleError::io(path, e))?;
        let doc = Self::from_text(path, &text, policy);
        debug!(
            has_front_matter = doc.front_matter.is_some(),
            body_len = doc.body.len(),
            "read markdown page"
        );
        Ok(doc)
    }

    /// The body after [`clean_body`]; empty when the page has no content.
    pub fn cleaned_body(&self) -> String {
        clean_body(&self.body)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
