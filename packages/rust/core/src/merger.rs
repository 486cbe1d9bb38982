//! Single-page manual assembly.
//!
//! Concatenates the pages of one language directory, in the resolved page
//! order, into `1page.md` behind a synthesized front matter block and intro.
//! Pages from the supplementary folder are appended at the end under their
//! own heading.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use docbundle_markdown::{
    FrontMatterPolicy, MarkdownDocument, split_leading_heading, title_from_filename,
};
use docbundle_shared::{
    CombinedOutput, DocBundleError, InputKind, MergeConfig, MergeReport, OrderSource, Result,
    SkipReason, SkippedEntry,
};

use crate::order::resolve_order;
use crate::output::{self, OutputMode};
use crate::progress::ProgressReporter;

/// Horizontal rule block placed between sections.
const SECTION_SEPARATOR: &str = "\n\n---\n\n";

/// The merged document plus what went into it.
#[derive(Debug, Clone)]
pub struct Merge {
    pub output: CombinedOutput,
    pub order_source: OrderSource,
    pub sections: usize,
    pub supplementary: usize,
    pub skipped: Vec<SkippedEntry>,
}

/// Merge one language and write (or check) its single-page manual.
///
/// Fails when the language's source directory is missing; in that case no
/// output is written. Missing, unreadable, or empty pages are skipped.
#[instrument(skip_all, fields(language = %config.language))]
pub fn merge(
    config: &MergeConfig,
    mode: OutputMode,
    progress: &dyn ProgressReporter,
) -> Result<MergeReport> {
    let merged = merge_language(config, progress)?;
    let text = merged.output.render();

    progress.phase("Writing output");
    let meta = output::emit(&config.output_path(), &text, mode)?;
    progress.done();

    info!(
        path = %meta.path.display(),
        sections = merged.sections,
        supplementary = merged.supplementary,
        skipped = merged.skipped.len(),
        "single-page manual merged"
    );

    Ok(MergeReport {
        language: config.language.clone(),
        output_path: meta.path,
        order_source: merged.order_source,
        sections: merged.sections,
        supplementary: merged.supplementary,
        size_bytes: meta.size_bytes,
        sha256: meta.sha256,
        skipped: merged.skipped,
    })
}

/// Build the merged document in memory.
pub fn merge_language(config: &MergeConfig, progress: &dyn ProgressReporter) -> Result<Merge> {
    if !config.source_dir.is_dir() {
        return Err(DocBundleError::missing(InputKind::SourceDir, &config.source_dir));
    }

    progress.phase("Resolving page order");
    let order = resolve_order(&config.order, &config.source_dir, &config.output_name);
    debug!(source = %order.source, pages = order.files.len(), "page order resolved");

    progress.phase("Merging pages");
    progress.start(order.files.len());

    let mut parts = Vec::new();
    let mut skipped = Vec::new();

    for (i, file) in order.files.iter().enumerate() {
        match read_section(&config.source_dir.join(file)) {
            Ok(body) => {
                info!(file = %file, "added section");
                parts.push(body);
                progress.included(file, i + 1, order.files.len());
            }
            Err(reason) => {
                warn!(file = %file, reason = %reason, "skipping page");
                progress.skipped(file, &reason);
                skipped.push(SkippedEntry {
                    name: file.clone(),
                    reason,
                });
            }
        }
    }
    let sections = parts.len();

    let supplementary = match &config.supplementary_dir {
        Some(dir) if dir.is_dir() => {
            progress.phase("Merging supplementary pages");
            append_supplementary(config, dir, &mut parts, &mut skipped)
        }
        _ => 0,
    };

    Ok(Merge {
        output: CombinedOutput {
            header: render_header(config),
            parts,
            separator: SECTION_SEPARATOR,
        },
        order_source: order.source,
        sections,
        supplementary,
        skipped,
    })
}

/// Read a page and return its trimmed body without front matter.
fn read_section(path: &Path) -> std::result::Result<String, SkipReason> {
    if !path.is_file() {
        return Err(SkipReason::NotFound {
            path: path.to_path_buf(),
        });
    }

    let doc = MarkdownDocument::read(path, FrontMatterPolicy::LeadingDigits).map_err(|e| {
        SkipReason::Unreadable {
            path: path.to_path_buf(),
            error: e.to_string(),
        }
    })?;

    if let Some(leading) = &doc.leading {
        warn!(
            path = %path.display(),
            leading = %leading,
            "stray characters before front matter; fix the source page"
        );
    }

    let body = doc.cleaned_body();
    if body.is_empty() {
        return Err(SkipReason::EmptyBody {
            path: path.to_path_buf(),
        });
    }
    Ok(body)
}

/// Append the supplementary folder's pages; returns how many were added.
fn append_supplementary(
    config: &MergeConfig,
    dir: &Path,
    parts: &mut Vec<String>,
    skipped: &mut Vec<SkippedEntry>,
) -> usize {
    let mut added = 0;

    for path in markdown_files(dir) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let body = match read_section(&path) {
            Ok(body) => body,
            Err(reason) => {
                warn!(file = %name, reason = %reason, "skipping supplementary page");
                skipped.push(SkippedEntry { name, reason });
                continue;
            }
        };

        let (title, body) = match split_leading_heading(&body) {
            Some((title, rest)) if config.dedupe_supplementary_headings => (title, rest),
            _ => (title_from_filename(&name), body),
        };

        let mut part = String::new();
        if added == 0 {
            part.push_str(&format!("# {}\n\n", config.supplementary_title));
        }
        part.push_str(&format!("## {title}"));
        if !body.is_empty() {
            part.push_str("\n\n");
            part.push_str(&body);
        }

        info!(file = %name, "added supplementary section");
        parts.push(part);
        added += 1;
    }

    added
}

/// `*.md` files directly inside `dir`, sorted by name.
fn markdown_files(dir: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "cannot list supplementary directory");
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "md"))
        .collect();
    files.sort();
    files
}

/// Front matter, title heading, intro, and the closing rule.
fn render_header(config: &MergeConfig) -> String {
    let mut fm = String::from("---\n");
    fm.push_str(&format!("layout: {}\n", config.layout));
    fm.push_str(&format!("title: \"{}\"\n", escape_yaml_string(&config.title)));
    fm.push_str(&format!("category: \"{}\"\n", escape_yaml_string(&config.category)));
    fm.push_str(&format!("permalink: {}\n", config.permalink()));
    fm.push_str("---\n\n");

    format!("{fm}# {}\n\n{}\n\n---", config.title, config.intro)
}

/// Escape special characters in a YAML string value.
fn escape_yaml_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::SilentProgress;
    use docbundle_shared::OrderConfig;

    fn config_for(root: &Path, files: &[&str]) -> MergeConfig {
        MergeConfig {
            language: "en".into(),
            version: "1.0".into(),
            title: "Manual".into(),
            category: "Manual".into(),
            layout: "docs-en".into(),
            intro: "Everything on one page.".into(),
            source_dir: root.join("manuals/1.0/en"),
            url_prefix: "/manuals/1.0/en/".into(),
            output_name: "1page.md".into(),
            order: OrderConfig::Literal(files.iter().map(|s| (*s).to_string()).collect()),
            supplementary_dir: Some(root.join("manuals/1.0/en/bp")),
            supplementary_title: "Best Practices".into(),
            dedupe_supplementary_headings: true,
        }
    }

    fn write_page(dir: &Path, name: &str, content: &str) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn pages_are_merged_in_order_with_separators() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = config_for(tmp.path(), &["a.md", "b.md"]);
        write_page(&config.source_dir, "a.md", "---\ntitle: A\n---\nAlpha\n");
        write_page(&config.source_dir, "b.md", "---\ntitle: B\n---\n\nBeta\n");

        let report = merge(&config, OutputMode::Write, &SilentProgress).unwrap();
        let out = std::fs::read_to_string(config.output_path()).unwrap();

        let alpha = out.find("Alpha").unwrap();
        let beta = out.find("Beta").unwrap();
        assert!(alpha < beta);
        assert!(out.contains("Alpha\n\n---\n\nBeta\n"));
        assert!(out.contains("Everything on one page.\n\n---\n\nAlpha"));
        assert!(!out.contains("---\n\n---"));
        assert_eq!(report.sections, 2);
        assert_eq!(report.order_source, OrderSource::Literal);
    }

    #[test]
    fn header_has_front_matter_and_permalink() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = config_for(tmp.path(), &["a.md"]);
        write_page(&config.source_dir, "a.md", "Alpha");

        let merged = merge_language(&config, &SilentProgress).unwrap();
        let text = merged.output.render();
        assert!(text.starts_with(
            "---\nlayout: docs-en\ntitle: \"Manual\"\ncategory: \"Manual\"\npermalink: /manuals/1.0/en/1page.html\n---\n\n# Manual\n\nEverything on one page.\n\n---\n\nAlpha\n"
        ));
    }

    #[test]
    fn intro_is_copied_literally() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut config = config_for(tmp.path(), &["a.md"]);
        config.intro = "  Indented intro.\nSecond line.  ".into();
        write_page(&config.source_dir, "a.md", "Alpha");

        let merged = merge_language(&config, &SilentProgress).unwrap();
        assert!(
            merged
                .output
                .header
                .ends_with("# Manual\n\n  Indented intro.\nSecond line.  \n\n---")
        );
    }

    #[test]
    fn navigation_link_to_output_does_not_feed_it_back() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut config = config_for(tmp.path(), &[]);
        let nav = tmp.path().join("contents.html");
        std::fs::write(
            &nav,
            r#"<a href="/manuals/1.0/en/scopes.html">Scopes</a>
<a href="/manuals/1.0/en/1page.html">All</a>"#,
        )
        .unwrap();
        config.order = OrderConfig::Navigation {
            nav_file: Some(nav),
            url_prefix: "/manuals/1.0/en/".into(),
            site_url: None,
            deny_list: vec!["ai-assistant".into()],
            file_naming: vec![docbundle_shared::FileNaming::Snake],
        };
        write_page(&config.source_dir, "scopes.md", "Scopes body");

        merge(&config, OutputMode::Write, &SilentProgress).unwrap();
        let first = std::fs::read_to_string(config.output_path()).unwrap();
        let report = merge(&config, OutputMode::Write, &SilentProgress).unwrap();
        let second = std::fs::read_to_string(config.output_path()).unwrap();

        assert_eq!(first, second);
        assert_eq!(report.order_source, OrderSource::Navigation);
        assert_eq!(report.sections, 1);
        assert_eq!(second.matches("# Manual\n").count(), 1);
    }

    #[test]
    fn missing_and_empty_pages_leave_no_dangling_separator() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = config_for(tmp.path(), &["empty.md", "missing.md", "a.md", "blank.md", "b.md"]);
        write_page(&config.source_dir, "empty.md", "---\ntitle: Empty\n---\n");
        write_page(&config.source_dir, "blank.md", "  \n\n\t\n");
        write_page(&config.source_dir, "a.md", "Alpha");
        write_page(&config.source_dir, "b.md", "Beta");

        let merged = merge_language(&config, &SilentProgress).unwrap();
        assert_eq!(merged.output.parts, vec!["Alpha", "Beta"]);
        assert_eq!(merged.skipped.len(), 3);
        assert!(matches!(merged.skipped[1].reason, SkipReason::NotFound { .. }));

        let text = merged.output.render();
        assert!(text.contains("page.\n\n---\n\nAlpha\n\n---\n\nBeta\n"));
        assert!(!text.contains("---\n\n---"));
    }

    #[test]
    fn missing_source_dir_is_fatal_and_writes_nothing() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = config_for(tmp.path(), &["a.md"]);

        let err = merge(&config, OutputMode::Write, &SilentProgress).unwrap_err();
        assert!(matches!(
            err,
            DocBundleError::MissingInput {
                kind: InputKind::SourceDir,
                ..
            }
        ));
        assert!(!config.output_path().exists());
    }

    #[test]
    fn leading_digit_artifact_is_stripped() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = config_for(tmp.path(), &["a.md"]);
        write_page(&config.source_dir, "a.md", "1---\ntitle: A\n---\nAlpha\n");

        let merged = merge_language(&config, &SilentProgress).unwrap();
        assert_eq!(merged.output.parts, vec!["Alpha"]);
    }

    #[test]
    fn supplementary_pages_follow_with_deduped_headings() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = config_for(tmp.path(), &["a.md"]);
        let bp = config.supplementary_dir.clone().unwrap();
        write_page(&config.source_dir, "a.md", "Alpha");
        write_page(&bp, "b_second.md", "---\ntitle: x\n---\nNo heading here.\n");
        write_page(&bp, "a_first.md", "---\ntitle: x\n---\n# Avoid Static State\n\nKeep it injectable.\n");
        write_page(&bp, "c_empty.md", "---\ntitle: x\n---\n");
        write_page(&bp, "notes.txt", "ignored");

        let merged = merge_language(&config, &SilentProgress).unwrap();
        assert_eq!(merged.sections, 1);
        assert_eq!(merged.supplementary, 2);
        assert_eq!(merged.skipped.len(), 1);
        assert_eq!(
            merged.output.parts,
            vec![
                "Alpha".to_string(),
                "# Best Practices\n\n## Avoid Static State\n\nKeep it injectable.".to_string(),
                "## B Second\n\nNo heading here.".to_string(),
            ]
        );
    }

    #[test]
    fn supplementary_headings_kept_without_dedupe() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut config = config_for(tmp.path(), &["a.md"]);
        config.dedupe_supplementary_headings = false;
        let bp = config.supplementary_dir.clone().unwrap();
        write_page(&config.source_dir, "a.md", "Alpha");
        write_page(&bp, "avoid_static.md", "# Avoid Static State\n\nText.");

        let merged = merge_language(&config, &SilentProgress).unwrap();
        assert_eq!(
            merged.output.parts[1],
            "# Best Practices\n\n## Avoid Static\n\n# Avoid Static State\n\nText."
        );
    }

    #[test]
    fn output_file_is_not_merged_into_itself() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut config = config_for(tmp.path(), &[]);
        config.order = OrderConfig::Navigation {
            nav_file: None,
            url_prefix: "/manuals/1.0/en/".into(),
            site_url: None,
            deny_list: vec!["index".into()],
            file_naming: vec![docbundle_shared::FileNaming::Pascal],
        };
        write_page(&config.source_dir, "Scopes.md", "Scopes body");
        write_page(&config.source_dir, "index.md", "Home");

        merge(&config, OutputMode::Write, &SilentProgress).unwrap();
        let first = std::fs::read_to_string(config.output_path()).unwrap();
        let report = merge(&config, OutputMode::Write, &SilentProgress).unwrap();
        let second = std::fs::read_to_string(config.output_path()).unwrap();

        assert_eq!(first, second);
        assert_eq!(report.order_source, OrderSource::AlphabeticalFallback);
        assert_eq!(report.sections, 1);
        assert!(!second.contains("Home"));
    }
}
