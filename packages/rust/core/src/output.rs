//! Writing generated documents to disk.
//!
//! Outputs are written atomically (temp file, then rename) so a failed run
//! never leaves a truncated artifact behind. In check mode nothing is
//! written; the generated text is compared with the file on disk instead.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use docbundle_shared::{DocBundleError, Result};

/// What to do with a generated document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Overwrite the output file.
    #[default]
    Write,
    /// Fail with [`DocBundleError::Stale`] if the file on disk differs.
    Check,
}

/// Metadata for an emitted document.
#[derive(Debug, Clone)]
pub struct OutputMeta {
    pub path: PathBuf,
    pub chars: usize,
    pub size_bytes: usize,
    pub sha256: String,
}

/// Write or check `content` at `path` according to `mode`.
pub fn emit(path: &Path, content: &str, mode: OutputMode) -> Result<OutputMeta> {
    match mode {
        OutputMode::Write => write_atomic(path, content)?,
        OutputMode::Check => ensure_up_to_date(path, content)?,
    }

    Ok(OutputMeta {
        path: path.to_path_buf(),
        chars: content.chars().count(),
        size_bytes: content.len(),
        sha256: sha256_hex(content),
    })
}

/// Hex SHA-256 of a document.
pub fn sha256_hex(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Write `content` to `path` via a sibling temp file and a rename.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| DocBundleError::io(parent, e))?;
    }

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let temp = path.with_file_name(format!(".{filename}.tmp"));

    std::fs::write(&temp, content).map_err(|e| DocBundleError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| {
        let _ = std::fs::remove_file(&temp);
        DocBundleError::io(path, e)
    })?;

    info!(path = %path.display(), bytes = content.len(), "wrote output");
    Ok(())
}

/// Compare `content` with the file at `path`.
fn ensure_up_to_date(path: &Path, content: &str) -> Result<()> {
    let current = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(DocBundleError::Stale {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(DocBundleError::io(path, e)),
    };

    if current != content {
        return Err(DocBundleError::Stale {
            path: path.to_path_buf(),
        });
    }

    debug!(path = %path.display(), "output is up to date");
    Ok(())
}
