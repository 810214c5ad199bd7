//! Per-plugin scan summary.

use crate::graph::MergeStats;
use serde::Serialize;
use std::fmt;

/// Kind of soft condition met while scanning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    /// A file with a recognized extension could not be decoded
    SkippedFile,
    /// A PEM block that is not a certificate
    SkippedBlock,
    /// A signature or public-key algorithm that could not be classified
    UnknownAlgorithm,
    /// An appended component reuses a `bom-ref` of the input document
    DuplicateRef,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SkippedFile => f.write_str("skipped file"),
            Self::SkippedBlock => f.write_str("skipped PEM block"),
            Self::UnknownAlgorithm => f.write_str("unknown algorithm"),
            Self::DuplicateRef => f.write_str("duplicate bom-ref"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanWarning {
    pub kind: WarningKind,
    pub path: String,
    pub message: String,
}

impl fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.path, self.kind, self.message)
    }
}

/// What one plugin run found and changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub plugin: String,
    pub files_visited: usize,
    /// Files whose extension selected them for decoding
    pub files_matched: usize,
    /// Matched files left out after a recoverable failure
    pub files_skipped: usize,
    pub files_oversized: usize,
    pub certificates_found: usize,
    pub components_added: usize,
    pub dependencies_added: usize,
    pub dependencies_extended: usize,
    pub merge: MergeStats,
    pub warnings: Vec<ScanWarning>,
}

impl ScanReport {
    #[must_use]
    pub fn new(plugin: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub(crate) fn warn(&mut self, kind: WarningKind, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ScanWarning {
            kind,
            path: path.into(),
            message: message.into(),
        });
    }

    /// Warnings of one kind
    pub fn warnings_of(&self, kind: WarningKind) -> impl Iterator<Item = &ScanWarning> {
        self.warnings.iter().filter(move |w| w.kind == kind)
    }
}
