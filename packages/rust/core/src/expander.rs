//! Index expansion: `llms.txt` → `llms-full.txt`.
//!
//! Every page linked from a linkable section of the index is inlined into a
//! single document, behind a synthesized table of contents. Links between
//! inlined pages become in-document anchors.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};
use url::Url;

use docbundle_markdown::{
    FrontMatterPolicy, MarkdownDocument, anchor_for_target, is_external, rewrite_links,
};
use docbundle_shared::{
    CombinedOutput, DocBundleError, ExpandConfig, ExpandReport, InputKind, LinkEntry, Result,
    SkipReason, SkippedEntry,
};

use crate::index::{IndexDocument, parse_index};
use crate::output::{self, OutputMode};
use crate::progress::ProgressReporter;

/// Separator between inlined pages.
const PAGE_SEPARATOR: &str = "\n\n";

/// The expanded document plus what went into it.
#[derive(Debug, Clone)]
pub struct Expansion {
    pub output: CombinedOutput,
    pub sections: usize,
    pub links: usize,
    pub included: usize,
    pub skipped: Vec<SkippedEntry>,
}

/// Expand the index and write (or check) the output file.
///
/// Fails only when the index itself is missing or unreadable, or when the
/// output cannot be written. Individual entries that cannot be inlined are
/// logged and listed in the report.
#[instrument(skip_all, fields(index = %config.index.display()))]
pub fn expand(
    config: &ExpandConfig,
    mode: OutputMode,
    progress: &dyn ProgressReporter,
) -> Result<ExpandReport> {
    let expansion = expand_index(config, progress)?;
    let text = expansion.output.render();

    progress.phase("Writing output");
    let meta = output::emit(&config.output, &text, mode)?;
    progress.done();

    info!(
        path = %meta.path.display(),
        chars = meta.chars,
        included = expansion.included,
        skipped = expansion.skipped.len(),
        "index expanded"
    );

    Ok(ExpandReport {
        output_path: meta.path,
        chars_written: meta.chars,
        size_bytes: meta.size_bytes,
        sha256: meta.sha256,
        sections: expansion.sections,
        links: expansion.links,
        included: expansion.included,
        skipped: expansion.skipped,
    })
}

/// Build the expanded document in memory.
pub fn expand_index(config: &ExpandConfig, progress: &dyn ProgressReporter) -> Result<Expansion> {
    if !config.index.is_file() {
        return Err(DocBundleError::missing(InputKind::IndexFile, &config.index));
    }
    let content = std::fs::read_to_string(&config.index)
        .map_err(|e| DocBundleError::io(&config.index, e))?;

    progress.phase("Parsing index");
    let doc = parse_index(&content, &config.linkable_sections);
    let links: Vec<&LinkEntry> = doc.links().collect();
    debug!(sections = doc.sections.len(), links = links.len(), "index parsed");

    progress.phase("Inlining pages");
    progress.start(links.len());

    let mut parts = Vec::new();
    let mut skipped = Vec::new();

    for (i, entry) in links.iter().enumerate() {
        match inline_entry(entry, config) {
            Ok(body) => {
                debug!(title = %entry.title, target = %entry.target, "inlined page");
                parts.push(body);
                progress.included(&entry.title, i + 1, links.len());
            }
            Err(reason) => {
                warn!(title = %entry.title, reason = %reason, "skipping index entry");
                progress.skipped(&entry.title, &reason);
                skipped.push(SkippedEntry {
                    name: entry.title.clone(),
                    reason,
                });
            }
        }
    }

    Ok(Expansion {
        sections: doc.sections.len(),
        links: links.len(),
        included: parts.len(),
        skipped,
        output: CombinedOutput {
            header: render_header(&doc),
            parts,
            separator: PAGE_SEPARATOR,
        },
    })
}

/// Read one linked page and prepare its body for inlining.
fn inline_entry(entry: &LinkEntry, config: &ExpandConfig) -> std::result::Result<String, SkipReason> {
    let path = resolve_target(
        &entry.target,
        &config.base_dir,
        &config.url_prefixes,
        config.site_url.as_ref(),
    )
    .ok_or_else(|| SkipReason::Unresolvable {
        target: entry.target.clone(),
    })?;

    if !path.exists() {
        return Err(SkipReason::NotFound { path });
    }

    let doc = MarkdownDocument::read(&path, FrontMatterPolicy::LeadingComments).map_err(|e| {
        SkipReason::Unreadable {
            path: path.clone(),
            error: e.to_string(),
        }
    })?;

    let body = doc.cleaned_body();
    if body.is_empty() {
        return Err(SkipReason::EmptyBody { path });
    }

    Ok(rewrite_links(&body))
}

/// Map a link target to a file under `base_dir`.
///
/// The target's path (query and fragment removed) must start with one of
/// `prefixes`. Absolute URLs resolve only on the `site` origin. A `.html`
/// page maps to its `.md` source. Returns `None` for anything else.
pub fn resolve_target(
    target: &str,
    base_dir: &Path,
    prefixes: &[String],
    site: Option<&Url>,
) -> Option<PathBuf> {
    let path = if is_external(target) {
        let url = Url::parse(target).ok()?;
        let site = site?;
        if url.origin() != site.origin() {
            return None;
        }
        let site_root = site.path().trim_end_matches('/');
        let path = url.path();
        path.strip_prefix(site_root).unwrap_or(path).to_string()
    } else {
        target.split(['?', '#']).next()?.to_string()
    };

    if !prefixes.iter().any(|p| path.starts_with(p.as_str())) {
        return None;
    }

    let relative = path.trim_start_matches('/');
    if relative.split('/').any(|segment| segment == "..") {
        return None;
    }

    let relative = match relative.strip_suffix(".html") {
        Some(stem) => format!("{stem}.md"),
        None => relative.to_string(),
    };
    Some(base_dir.join(relative))
}

/// Header text, synthesized TOC, and the closing rule.
fn render_header(doc: &IndexDocument) -> String {
    let mut out = String::new();

    let header = doc.header_lines.join("\n");
    let header = header.trim_end();
    if !header.is_empty() {
        out.push_str(header);
        out.push_str("\n\n");
    }

    for section in &doc.sections {
        out.push_str("## ");
        out.push_str(&section.name);
        out.push_str("\n\n");
        for link in &section.links {
            out.push_str(&toc_line(link));
            out.push('\n');
        }
        if !section.links.is_empty() {
            out.push('\n');
        }
    }

    out.push_str("---");
    out
}

/// `- [title](#anchor): description`; the description may be empty.
fn toc_line(link: &LinkEntry) -> String {
    let anchor = anchor_for_target(link.target.split('#').next().unwrap_or(&link.target));
    format!("- [{}](#{anchor}): {}", link.title, link.description)
}
