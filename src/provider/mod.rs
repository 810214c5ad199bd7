//! Filesystem providers.
//!
//! A provider exposes a tree of files by path relative to its root, in a
//! deterministic order, and separates files that merely failed to parse from
//! I/O failures that must stop the scan.

mod plain;

pub use plain::{PlainFilesystem, WalkOptions};

use crate::error::{CbomError, Result};
use std::path::Path;
use thiserror::Error;

/// Outcome of visiting one file that did not succeed
#[derive(Error, Debug)]
pub enum ScanError {
    /// The file looked relevant but could not be parsed; the walk continues
    #[error("{plugin}: skipping {path}: {detail}")]
    Recoverable {
        plugin: String,
        path: String,
        detail: String,
    },

    /// The scan cannot continue
    #[error(transparent)]
    Fatal(#[from] CbomError),
}

impl ScanError {
    pub fn recoverable(
        plugin: impl Into<String>,
        path: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::Recoverable {
            plugin: plugin.into(),
            path: path.into(),
            detail: detail.into(),
        }
    }
}

/// A file left out of the scan after a recoverable failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: String,
    pub detail: String,
}

/// Counters from one walk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkSummary {
    pub files_visited: usize,
    pub files_oversized: usize,
    pub skipped: Vec<SkippedFile>,
}

/// Log a recoverable failure and return its record; pass fatal ones through
pub fn handle_scan_error(err: ScanError) -> Result<SkippedFile> {
    match err {
        ScanError::Recoverable {
            plugin,
            path,
            detail,
        } => {
            tracing::warn!(plugin = %plugin, path = %path, "Parsing failed although file was selected: {detail}");
            Ok(SkippedFile { path, detail })
        }
        ScanError::Fatal(err) => Err(err),
    }
}

/// Visitor called once per regular file with its root-relative path
pub type FileVisitor<'a> = dyn FnMut(&Path) -> std::result::Result<(), ScanError> + 'a;

/// Source of files to scan
pub trait Filesystem: Send + Sync {
    /// Call `visitor` for every file, in lexicographic order per directory
    fn walk_dir(&self, visitor: &mut FileVisitor<'_>) -> Result<WalkSummary>;

    /// Read a file by root-relative path
    fn read_file(&self, path: &Path) -> Result<Vec<u8>>;

    /// Whether a root-relative path exists
    fn exists(&self, path: &Path) -> bool;

    /// Human-readable name for logs
    fn identifier(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_is_logged_and_recorded() {
        let skipped =
            handle_scan_error(ScanError::recoverable("Certificate File Plugin", "a.pem", "bad"))
                .unwrap();
        assert_eq!(
            skipped,
            SkippedFile {
                path: "a.pem".into(),
                detail: "bad".into()
            }
        );
    }

    #[test]
    fn test_fatal_propagates() {
        let err = handle_scan_error(ScanError::Fatal(CbomError::validation("stop")));
        assert!(matches!(err, Err(CbomError::Validation(_))));
    }
}
