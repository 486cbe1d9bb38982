//! Anchor slugs and cross-document link rewriting.
//!
//! When pages are concatenated into one document, a link to `scopes.md`
//! has to become a link to `#scopes` inside that document.

use std::sync::LazyLock;

use regex::Regex;

use crate::cleanup::title_case;

/// Matches `[text](url)`; image links are filtered in the replacement.
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]]*)\]\(([^)\s]+)\)").expect("valid regex")
});

/// `scheme://...` or protocol-relative `//...`.
static EXTERNAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z][A-Za-z0-9+.\-]*:)?//").expect("valid regex")
});

/// `.md` at the end of the URL or right before a query or fragment.
static MD_TARGET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.md(?:[?#]|$)").expect("valid regex")
});

/// Whether a URL points outside the site.
pub fn is_external(url: &str) -> bool {
    EXTERNAL_RE.is_match(url)
}

/// Whether a URL targets a markdown page that can become a local anchor.
pub fn is_markdown_target(url: &str) -> bool {
    !is_external(url) && MD_TARGET_RE.is_match(url)
}

/// Slug for a page name: `-`/`_` become word breaks, words are title-cased,
/// then everything is lowercased and joined with `-`.
///
/// `getting_started` → `getting-started`
pub fn anchor_slug(name: &str) -> String {
    title_case(name)
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Slug for a `#fragment`: lowercased, spaces and underscores become `-`.
pub fn fragment_slug(fragment: &str) -> String {
    fragment.to_lowercase().replace([' ', '_'], "-")
}

/// Local anchor for a link target, without the leading `#`.
///
/// The anchor is the slug of the target's file name with its extension
/// removed; a fragment, when present, is appended with `-`.
///
/// `../en/Scopes.md?x=1#Eager_Singleton` → `scopes-eager-singleton`
pub fn anchor_for_target(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let basename = path.rsplit('/').next().unwrap_or(path);
    let stem = match basename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => basename,
    };

    let anchor = anchor_slug(stem);
    match url.split_once('#') {
        Some((_, fragment)) if !fragment.is_empty() => {
            format!("{anchor}-{}", fragment_slug(fragment))
        }
        _ => anchor,
    }
}

/// Rewrite every link to a local `.md` page into an in-document anchor.
///
/// External links, image links, and links to anything other than markdown
/// pages are returned unchanged. Applying this twice gives the same result
/// as applying it once.
pub fn rewrite_links(md: &str) -> String {
    LINK_RE
        .replace_all(md, |caps: &regex::Captures| {
            let whole = &caps[0];
            let text = &caps[1];
            let href = &caps[2];

            let start = caps.get(0).map_or(0, |m| m.start());
            if start > 0 && md.as_bytes()[start - 1] == b'!' {
                return whole.to_string();
            }

            if !is_markdown_target(href) {
                return whole.to_string();
            }

            format!("[{text}](#{})", anchor_for_target(href))
        })
        .into_owned()
}
