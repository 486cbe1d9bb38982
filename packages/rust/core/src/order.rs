//! Page order for the single-page manual.
//!
//! The order is either a literal list or derived from the site's navigation
//! include. A derivation that yields nothing switches explicitly to the
//! alphabetical fallback.

use std::path::Path;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, instrument, warn};
use url::Url;

use docbundle_shared::{FileNaming, OrderConfig, OrderSource, PageOrder};

/// Resolve the page order for one language directory.
///
/// `output_name` is never part of the order, whatever the strategy.
#[instrument(skip_all, fields(source_dir = %source_dir.display()))]
pub fn resolve_order(order: &OrderConfig, source_dir: &Path, output_name: &str) -> PageOrder {
    match order {
        OrderConfig::Literal(files) => PageOrder {
            files: without_output(files.clone(), output_name),
            source: OrderSource::Literal,
        },
        OrderConfig::Navigation {
            nav_file,
            url_prefix,
            site_url,
            deny_list,
            file_naming,
        } => {
            let derived = match nav_file {
                Some(path) => {
                    let nav = NavigationSource {
                        url_prefix,
                        site_url: site_url.as_ref(),
                        deny_list,
                        file_naming,
                    };
                    without_output(derive_from_navigation(path, &nav, source_dir), output_name)
                }
                None => Vec::new(),
            };

            if needs_fallback(&derived) {
                warn!(
                    nav_file = ?nav_file,
                    "navigation yielded no pages, falling back to alphabetical order"
                );
                return PageOrder {
                    files: alphabetical_order(source_dir, output_name, deny_list),
                    source: OrderSource::AlphabeticalFallback,
                };
            }

            PageOrder {
                files: derived,
                source: OrderSource::Navigation,
            }
        }
    }
}

/// The derived order is unusable and the fallback applies.
pub fn needs_fallback(derived: &[String]) -> bool {
    derived.is_empty()
}

/// Drop the merge output from an order.
fn without_output(files: Vec<String>, output_name: &str) -> Vec<String> {
    files
        .into_iter()
        .filter(|name| {
            if name == output_name {
                warn!(file = %name, "page order names the output file, leaving it out");
                return false;
            }
            true
        })
        .collect()
}

struct NavigationSource<'a> {
    url_prefix: &'a str,
    site_url: Option<&'a Url>,
    deny_list: &'a [String],
    file_naming: &'a [FileNaming],
}

/// Read the navigation include and map its page links to filenames.
fn derive_from_navigation(nav_file: &Path, nav: &NavigationSource<'_>, source_dir: &Path) -> Vec<String> {
    let html = match std::fs::read_to_string(nav_file) {
        Ok(html) => html,
        Err(e) => {
            warn!(path = %nav_file.display(), error = %e, "cannot read navigation file");
            return Vec::new();
        }
    };

    let files: Vec<String> = navigation_slugs(&html, nav.url_prefix, nav.site_url)
        .into_iter()
        .filter(|slug| !is_denied(slug, nav.deny_list))
        .map(|slug| slug_to_filename(&slug, nav.file_naming, source_dir))
        .collect();

    debug!(count = files.len(), "derived page order from navigation");
    files
}

/// Page slugs linked from `html` under `url_prefix`, in document order,
/// without duplicates. An href must start with `url_prefix`, or with the
/// `site` root followed by it.
///
/// `<a href="/manuals/1.0/en/getting_started.html">` → `getting_started`
pub fn navigation_slugs(html: &str, url_prefix: &str, site: Option<&Url>) -> Vec<String> {
    let site_root = site
        .map(|s| format!("(?:{})?", regex::escape(s.as_str().trim_end_matches('/'))))
        .unwrap_or_default();
    let Ok(href_re) = Regex::new(&format!(
        r"^{site_root}{}([A-Za-z0-9_\-]+)\.html(?:[?#]|$)",
        regex::escape(url_prefix)
    )) else {
        return Vec::new();
    };
    let Ok(anchor_sel) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let doc = Html::parse_fragment(html);
    let mut slugs: Vec<String> = Vec::new();

    for anchor in doc.select(&anchor_sel) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(caps) = href_re.captures(href) else {
            continue;
        };
        let slug = caps[1].to_string();
        if !slugs.contains(&slug) {
            slugs.push(slug);
        }
    }

    slugs
}

/// Deny-list membership, ignoring case and `-`/`_` differences.
pub fn is_denied(slug: &str, deny_list: &[String]) -> bool {
    let normalized = normalize_slug(slug);
    deny_list.iter().any(|d| normalize_slug(d) == normalized)
}

fn normalize_slug(slug: &str) -> String {
    slug.to_lowercase().replace('_', "-")
}

/// Map a slug to the first candidate filename that exists in `source_dir`,
/// or the first candidate if none does.
pub fn slug_to_filename(slug: &str, file_naming: &[FileNaming], source_dir: &Path) -> String {
    let candidates: Vec<String> = file_naming.iter().map(|n| n.filename(slug)).collect();

    candidates
        .iter()
        .find(|name| source_dir.join(name.as_str()).is_file())
        .or_else(|| candidates.first())
        .cloned()
        .unwrap_or_else(|| format!("{slug}.md"))
}

/// Every `*.md` file in `source_dir`, sorted, minus the output file and
/// deny-listed pages.
pub fn alphabetical_order(source_dir: &Path, output_name: &str, deny_list: &[String]) -> Vec<String> {
    let entries = match std::fs::read_dir(source_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %source_dir.display(), error = %e, "cannot list source directory");
            return Vec::new();
        }
    };

    let mut files: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| name.ends_with(".md") && name != output_name)
        .filter(|name| {
            let stem = name.strip_suffix(".md").unwrap_or(name);
            !is_denied(stem, deny_list)
        })
        .collect();

    files.sort();
    files
}
