//! Error types for docbundle.
//!
//! Library crates use [`DocBundleError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Which required input was missing when a run aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// The root index document read by the expander.
    IndexFile,
    /// A per-language manual directory read by the merger.
    SourceDir,
}

impl std::fmt::Display for InputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IndexFile => f.write_str("index file"),
            Self::SourceDir => f.write_str("source directory"),
        }
    }
}

/// Top-level error type for all docbundle operations.
#[derive(Debug, thiserror::Error)]
pub enum DocBundleError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// A required input file or directory does not exist.
    #[error("{kind} not found: {}", path.display())]
    MissingInput { kind: InputKind, path: PathBuf },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Input document could not be interpreted.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// A generated artifact on disk differs from what would be generated now.
    #[error("{} is out of date; regenerate it", path.display())]
    Stale { path: PathBuf },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocBundleError>;

impl DocBundleError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Report a missing required input.
    pub fn missing(kind: InputKind, path: impl Into<PathBuf>) -> Self {
        Self::MissingInput {
            kind,
            path: path.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
