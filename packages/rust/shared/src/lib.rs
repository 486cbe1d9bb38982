//! Shared types, error model, and configuration for docbundle.
//!
//! This crate is the foundation depended on by all other docbundle crates.
//! It provides:
//! - [`DocBundleError`]: the unified error type
//! - Domain types ([`LinkEntry`], [`PageOrder`], [`CombinedOutput`], run reports)
//! - Configuration ([`AppConfig`], [`ExpandConfig`], [`MergeConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CONFIG_FILE_NAME, DEFAULT_DENY_LIST, DEFAULT_LINKABLE_SECTIONS, ExpandConfig,
    ExpandSection, FileNaming, LanguageConfig, MergeConfig, MergeSection, OrderConfig,
    OrderStrategy, config_file_path, init_config, load_config, load_config_from,
};
pub use error::{DocBundleError, InputKind, Result};
pub use types::{
    CombinedOutput, ExpandReport, LinkEntry, MergeReport, OrderSource, PageOrder, SkipReason,
    SkippedEntry,
};
