//! Project configuration for docbundle.
//!
//! The optional config lives at `<project root>/docbundle.toml`.
//! CLI flags override config file values, which override defaults.
//! Relative paths in the file are resolved against the project root.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DocBundleError, Result};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "docbundle.toml";

/// Index sections whose bullet links are inlined by the expander.
pub const DEFAULT_LINKABLE_SECTIONS: &[&str] = &[
    "Getting Started",
    "Core Concepts",
    "Binding Types",
    "Scopes and Lifecycle",
    "Advanced Topics",
    "Best Practices",
    "Integration",
    "Reference",
];

/// Navigation slugs that never become single-page sections.
pub const DEFAULT_DENY_LIST: &[&str] = &["ai-assistant", "index", "1page"];

// ---------------------------------------------------------------------------
// Config structs (matching docbundle.toml schema)
// ---------------------------------------------------------------------------

/// Top-level project config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// `llms.txt` → `llms-full.txt` expansion.
    #[serde(default)]
    pub expand: ExpandSection,

    /// Per-language single-page manual.
    #[serde(default)]
    pub merge: MergeSection,
}

/// `[expand]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpandSection {
    /// Root index document.
    #[serde(default = "default_index")]
    pub index: String,

    /// Expanded output document.
    #[serde(default = "default_expand_output")]
    pub output: String,

    /// Directory link targets are resolved against.
    #[serde(default = "default_base_dir")]
    pub base_dir: String,

    /// `## ` headings whose links are inlined.
    #[serde(default = "default_linkable_sections")]
    pub linkable_sections: Vec<String>,

    /// Path prefixes a link target must start with to resolve locally.
    #[serde(default = "default_url_prefixes")]
    pub url_prefixes: Vec<String>,

    /// Public origin of the site. Absolute link targets on this origin are
    /// treated like root-relative ones; any other origin is unresolvable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_url: Option<String>,
}

impl Default for ExpandSection {
    fn default() -> Self {
        Self {
            index: default_index(),
            output: default_expand_output(),
            base_dir: default_base_dir(),
            linkable_sections: default_linkable_sections(),
            url_prefixes: default_url_prefixes(),
            site_url: None,
        }
    }
}

fn default_index() -> String {
    "llms.txt".into()
}
fn default_expand_output() -> String {
    "llms-full.txt".into()
}
fn default_base_dir() -> String {
    ".".into()
}
fn default_linkable_sections() -> Vec<String> {
    DEFAULT_LINKABLE_SECTIONS.iter().map(|s| (*s).to_string()).collect()
}
fn default_url_prefixes() -> Vec<String> {
    vec!["/manuals/".into()]
}

/// How the merger decides the page order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStrategy {
    /// Scan the navigation include; fall back to alphabetical.
    #[default]
    Navigation,
    /// Use `merge.pages` verbatim.
    Literal,
}

/// Casing convention mapping a URL slug to an on-disk markdown filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileNaming {
    /// `getting_started` → `GettingStarted.md`
    Pascal,
    /// `getting_started` → `getting-started.md`
    Kebab,
    /// `getting-started` → `getting_started.md`
    Snake,
    /// Slug unchanged.
    Verbatim,
}

impl FileNaming {
    /// Markdown filename for a URL slug under this convention.
    pub fn filename(self, slug: &str) -> String {
        let words = slug.split(['-', '_']).filter(|w| !w.is_empty());
        let stem = match self {
            Self::Pascal => words
                .map(|word| {
                    let mut chars = word.chars();
                    match chars.next() {
                        Some(c) => c.to_uppercase().chain(chars).collect::<String>(),
                        None => String::new(),
                    }
                })
                .collect::<String>(),
            Self::Kebab => words.collect::<Vec<_>>().join("-"),
            Self::Snake => words.collect::<Vec<_>>().join("_"),
            Self::Verbatim => slug.to_string(),
        };
        format!("{stem}.md")
    }
}

/// `[merge]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeSection {
    /// Manual version, part of the source path and the permalink.
    #[serde(default = "default_version")]
    pub version: String,

    /// Directory holding `<version>/<language>/` page folders.
    #[serde(default = "default_manuals_dir")]
    pub manuals_dir: String,

    /// Title written to the front matter and top-level heading.
    #[serde(default = "default_title")]
    pub title: String,

    /// Front matter `category`.
    #[serde(default = "default_category")]
    pub category: String,

    /// Output filename inside each language directory.
    #[serde(default = "default_output_name")]
    pub output_name: String,

    /// Ordering strategy.
    #[serde(default)]
    pub order: OrderStrategy,

    /// Literal page order, used when `order = "literal"`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pages: Vec<String>,

    /// Navigation slugs excluded from the derived order.
    #[serde(default = "default_deny_list")]
    pub deny_list: Vec<String>,

    /// Filename casings tried, in order, when mapping slugs to files.
    #[serde(default = "default_file_naming")]
    pub file_naming: Vec<FileNaming>,

    /// Optional subfolder of supplementary pages appended at the end.
    #[serde(default = "default_supplementary_dir")]
    pub supplementary_dir: Option<String>,

    /// Heading placed before the supplementary pages.
    #[serde(default = "default_supplementary_title")]
    pub supplementary_title: String,

    /// Drop a supplementary page's own leading heading.
    #[serde(default = "default_true")]
    pub dedupe_supplementary_headings: bool,

    /// Languages, processed in this order.
    #[serde(default = "default_languages")]
    pub languages: Vec<LanguageConfig>,
}

impl Default for MergeSection {
    fn default() -> Self {
        Self {
            version: default_version(),
            manuals_dir: default_manuals_dir(),
            title: default_title(),
            category: default_category(),
            output_name: default_output_name(),
            order: OrderStrategy::default(),
            pages: Vec::new(),
            deny_list: default_deny_list(),
            file_naming: default_file_naming(),
            supplementary_dir: default_supplementary_dir(),
            supplementary_title: default_supplementary_title(),
            dedupe_supplementary_headings: true,
            languages: default_languages(),
        }
    }
}

fn default_version() -> String {
    "1.0".into()
}
fn default_manuals_dir() -> String {
    "manuals".into()
}
fn default_title() -> String {
    "Manual".into()
}
fn default_category() -> String {
    "Manual".into()
}
fn default_output_name() -> String {
    "1page.md".into()
}
fn default_deny_list() -> Vec<String> {
    DEFAULT_DENY_LIST.iter().map(|s| (*s).to_string()).collect()
}
fn default_file_naming() -> Vec<FileNaming> {
    vec![
        FileNaming::Pascal,
        FileNaming::Kebab,
        FileNaming::Snake,
        FileNaming::Verbatim,
    ]
}
fn default_supplementary_dir() -> Option<String> {
    Some("bp".into())
}
fn default_supplementary_title() -> String {
    "Best Practices".into()
}
fn default_true() -> bool {
    true
}
fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "en".into(),
            layout: "docs-en".into(),
            intro: "This page collects every chapter of the manual on a single page \
                    for printing and offline reading."
                .into(),
            nav_file: Some("_includes/manuals/1.0/en/contents.html".into()),
        },
        LanguageConfig {
            code: "ja".into(),
            layout: "docs-ja".into(),
            intro: "このページはマニュアルの全章を印刷やオフライン閲覧のために1ページにまとめたものです。"
                .into(),
            nav_file: Some("_includes/manuals/1.0/ja/contents.html".into()),
        },
    ]
}

/// `[[merge.languages]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageConfig {
    /// Language code, also the directory name (`en`, `ja`).
    pub code: String,
    /// Front matter `layout`.
    pub layout: String,
    /// Intro paragraph placed after the top-level heading.
    pub intro: String,
    /// Navigation include scanned for the derived page order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nav_file: Option<String>,
}

impl AppConfig {
    /// Reject values the generators cannot work with.
    pub fn validate(&self) -> Result<()> {
        if let Some(site) = &self.expand.site_url {
            Url::parse(site).map_err(|e| {
                DocBundleError::config(format!("expand.site_url '{site}' is not a URL: {e}"))
            })?;
        }
        if self.expand.url_prefixes.is_empty() {
            return Err(DocBundleError::config("expand.url_prefixes must not be empty"));
        }
        if self.merge.order == OrderStrategy::Literal && self.merge.pages.is_empty() {
            return Err(DocBundleError::config(
                "merge.order is \"literal\" but merge.pages is empty",
            ));
        }
        if self.merge.file_naming.is_empty() {
            return Err(DocBundleError::config("merge.file_naming must not be empty"));
        }
        for (i, lang) in self.merge.languages.iter().enumerate() {
            if lang.code.is_empty() {
                return Err(DocBundleError::config(format!(
                    "merge.languages[{i}] has an empty code"
                )));
            }
            if self.merge.languages[..i].iter().any(|l| l.code == lang.code) {
                return Err(DocBundleError::config(format!(
                    "language '{}' is configured twice",
                    lang.code
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Runtime configs (resolved against the project root)
// ---------------------------------------------------------------------------

/// Runtime expander configuration with absolute paths.
#[derive(Debug, Clone)]
pub struct ExpandConfig {
    pub index: PathBuf,
    pub output: PathBuf,
    pub base_dir: PathBuf,
    pub linkable_sections: Vec<String>,
    pub url_prefixes: Vec<String>,
    pub site_url: Option<Url>,
}

impl ExpandConfig {
    /// Resolve the `[expand]` section against `root`.
    pub fn resolve(config: &AppConfig, root: &Path) -> Result<Self> {
        let section = &config.expand;
        let site_url = section
            .site_url
            .as_deref()
            .map(Url::parse)
            .transpose()
            .map_err(|e| DocBundleError::config(format!("invalid expand.site_url: {e}")))?;

        Ok(Self {
            index: root.join(&section.index),
            output: root.join(&section.output),
            base_dir: root.join(&section.base_dir),
            linkable_sections: section.linkable_sections.clone(),
            url_prefixes: section.url_prefixes.clone(),
            site_url,
        })
    }
}

/// Page ordering for one language, as resolved from config.
#[derive(Debug, Clone)]
pub enum OrderConfig {
    Literal(Vec<String>),
    Navigation {
        nav_file: Option<PathBuf>,
        /// URL path prefix hrefs must start with, e.g. `/manuals/1.0/en/`.
        url_prefix: String,
        /// Absolute hrefs on this site also count.
        site_url: Option<Url>,
        deny_list: Vec<String>,
        file_naming: Vec<FileNaming>,
    },
}

/// Runtime merger configuration for a single language.
#[derive(Debug, Clone)]
pub struct MergeConfig {
    pub language: String,
    pub version: String,
    pub title: String,
    pub category: String,
    pub layout: String,
    pub intro: String,
    pub source_dir: PathBuf,
    /// Site path of the language directory, e.g. `/manuals/1.0/en/`.
    pub url_prefix: String,
    pub output_name: String,
    pub order: OrderConfig,
    pub supplementary_dir: Option<PathBuf>,
    pub supplementary_title: String,
    pub dedupe_supplementary_headings: bool,
}

impl MergeConfig {
    /// Resolve the merge settings of `language` against `root`.
    pub fn resolve(config: &AppConfig, root: &Path, language: &str) -> Result<Self> {
        let section = &config.merge;
        let lang = section
            .languages
            .iter()
            .find(|l| l.code == language)
            .ok_or_else(|| DocBundleError::config(format!("unknown language '{language}'")))?;

        let source_dir = root
            .join(&section.manuals_dir)
            .join(&section.version)
            .join(&lang.code);

        let url_prefix = format!(
            "/{}/{}/{}/",
            section.manuals_dir.trim_matches('/'),
            section.version,
            lang.code
        );

        let order = match section.order {
            OrderStrategy::Literal => OrderConfig::Literal(section.pages.clone()),
            OrderStrategy::Navigation => OrderConfig::Navigation {
                nav_file: lang.nav_file.as_ref().map(|p| root.join(p)),
                url_prefix: url_prefix.clone(),
                site_url: config
                    .expand
                    .site_url
                    .as_deref()
                    .map(Url::parse)
                    .transpose()
                    .map_err(|e| DocBundleError::config(format!("invalid expand.site_url: {e}")))?,
                deny_list: section.deny_list.clone(),
                file_naming: section.file_naming.clone(),
            },
        };

        Ok(Self {
            language: lang.code.clone(),
            version: section.version.clone(),
            title: section.title.clone(),
            category: section.category.clone(),
            layout: lang.layout.clone(),
            intro: lang.intro.clone(),
            supplementary_dir: section.supplementary_dir.as_ref().map(|d| source_dir.join(d)),
            source_dir,
            url_prefix,
            output_name: section.output_name.clone(),
            order,
            supplementary_title: section.supplementary_title.clone(),
            dedupe_supplementary_headings: section.dedupe_supplementary_headings,
        })
    }

    /// Where the single-page manual for this language is written.
    pub fn output_path(&self) -> PathBuf {
        self.source_dir.join(&self.output_name)
    }

    /// Site permalink of the single-page manual.
    pub fn permalink(&self) -> String {
        let stem = self
            .output_name
            .strip_suffix(".md")
            .unwrap_or(&self.output_name);
        format!("{}{stem}.html", self.url_prefix)
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Path of the config file for a project root.
pub fn config_file_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// Load the project config. Returns defaults if the file does not exist.
pub fn load_config(root: &Path) -> Result<AppConfig> {
    let path = config_file_path(root);

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load and validate the config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocBundleError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        DocBundleError::parse(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.validate()?;
    Ok(config)
}

/// Write a default config file into `root`. Refuses to overwrite.
pub fn init_config(root: &Path) -> Result<PathBuf> {
    let path = config_file_path(root);
    if path.exists() {
        return Err(DocBundleError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| DocBundleError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DocBundleError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let toml_str = toml::to_string_pretty(&AppConfig::default()).expect("serialize");
        assert!(toml_str.contains("llms-full.txt"));
        assert!(toml_str.contains("1page.md"));
    }

    #[test]
    fn config_roundtrip() {
        let toml_str = toml::to_string_pretty(&AppConfig::default()).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.expand.index, "llms.txt");
        assert_eq!(parsed.merge.languages.len(), 2);
        assert_eq!(parsed.merge.order, OrderStrategy::Navigation);
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let toml_str = r#"
[merge]
order = "literal"
pages = ["Overview.md", "Installation.md"]
file_naming = ["kebab"]

[[merge.languages]]
code = "en"
layout = "docs-en"
intro = "All in one page."
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.expand.output, "llms-full.txt");
        assert_eq!(config.merge.order, OrderStrategy::Literal);
        assert_eq!(config.merge.file_naming, vec![FileNaming::Kebab]);
        assert_eq!(config.merge.languages.len(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn literal_order_requires_pages() {
        let mut config = AppConfig::default();
        config.merge.order = OrderStrategy::Literal;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("merge.pages"));
    }

    #[test]
    fn invalid_site_url_rejected() {
        let mut config = AppConfig::default();
        config.expand.site_url = Some("not a url".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn file_naming_conventions() {
        assert_eq!(FileNaming::Pascal.filename("getting_started"), "GettingStarted.md");
        assert_eq!(FileNaming::Pascal.filename("linked-bindings"), "LinkedBindings.md");
        assert_eq!(FileNaming::Kebab.filename("getting_started"), "getting-started.md");
        assert_eq!(FileNaming::Snake.filename("getting-started"), "getting_started.md");
        assert_eq!(FileNaming::Verbatim.filename("Getting_started"), "Getting_started.md");
    }

    #[test]
    fn merge_config_resolves_paths_and_permalink() {
        let config = AppConfig::default();
        let merge = MergeConfig::resolve(&config, Path::new("/site"), "ja").expect("resolve");
        assert_eq!(merge.source_dir, PathBuf::from("/site/manuals/1.0/ja"));
        assert_eq!(merge.output_path(), PathBuf::from("/site/manuals/1.0/ja/1page.md"));
        assert_eq!(merge.permalink(), "/manuals/1.0/ja/1page.html");
        assert_eq!(merge.layout, "docs-ja");
        match merge.order {
            OrderConfig::Navigation { url_prefix, .. } => {
                assert_eq!(url_prefix, "/manuals/1.0/ja/");
            }
            OrderConfig::Literal(_) => panic!("expected navigation order"),
        }
    }

    #[test]
    fn merge_config_unknown_language() {
        let config = AppConfig::default();
        assert!(MergeConfig::resolve(&config, Path::new("/site"), "fr").is_err());
    }

    #[test]
    fn load_missing_config_returns_defaults() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        let config = load_config(tmp.path()).expect("load");
        assert_eq!(config.expand.index, "llms.txt");
    }

    #[test]
    fn malformed_config_is_a_parse_error() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        let path = config_file_path(tmp.path());
        std::fs::write(&path, "[merge\norder = ").expect("write");
        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, DocBundleError::Parse { .. }));
    }

    #[test]
    fn init_then_load() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        let path = init_config(tmp.path()).expect("init");
        assert!(path.exists());
        let config = load_config(tmp.path()).expect("load");
        assert_eq!(config.merge.version, "1.0");
        assert!(init_config(tmp.path()).is_err());
    }
}
