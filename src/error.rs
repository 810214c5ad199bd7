//! Unified error types for cbom-tools.
//!
//! Soft conditions met while scanning (unparsable files, unknown algorithm
//! identifiers) never reach this type; they are logged and recorded in the
//! scan report. What does reach it aborts the run.

use crate::graph::MergeConflict;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for cbom-tools operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CbomError {
    /// Errors while traversing the scan root
    #[error("Scan failed: {context}")]
    Scan {
        context: String,
        #[source]
        source: ScanErrorKind,
    },

    /// A subgraph could not be merged into the asset graph
    #[error("Merging of asset graphs failed: {context}")]
    Merge {
        context: String,
        #[source]
        source: MergeConflict,
    },

    /// Errors reading, assembling or serializing the output document
    #[error("Document error: {context}")]
    Document {
        context: String,
        #[source]
        source: DocumentErrorKind,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Specific scan error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ScanErrorKind {
    #[error("scan root does not exist: {0}")]
    RootNotFound(PathBuf),

    #[error("scan root is not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Specific document error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DocumentErrorKind {
    #[error("Unknown document format - expected a CycloneDX JSON BOM")]
    UnknownFormat,

    #[error("Unsupported specification version: {version} (supported: {supported})")]
    UnsupportedVersion { version: String, supported: String },

    #[error("Invalid JSON structure: {0}")]
    InvalidJson(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for cbom-tools operations
pub type Result<T> = std::result::Result<T, CbomError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl CbomError {
    /// Create a scan error with context
    pub fn scan(context: impl Into<String>, source: ScanErrorKind) -> Self {
        Self::Scan {
            context: context.into(),
            source,
        }
    }

    /// Create a merge error with context
    pub fn merge(context: impl Into<String>, source: MergeConflict) -> Self {
        Self::Merge {
            context: context.into(),
            source,
        }
    }

    /// Create a document error with context
    pub fn document(context: impl Into<String>, source: DocumentErrorKind) -> Self {
        Self::Document {
            context: context.into(),
            source,
        }
    }

    /// Create a document error for an input whose `bomFormat` is not `CycloneDX`
    pub fn unknown_format(found: Option<&str>) -> Self {
        Self::document(
            format!("bomFormat is {}", found.unwrap_or("missing")),
            DocumentErrorKind::UnknownFormat,
        )
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for CbomError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for CbomError {
    fn from(err: serde_json::Error) -> Self {
        Self::document(
            "JSON deserialization",
            DocumentErrorKind::InvalidJson(err.to_string()),
        )
    }
}

impl From<MergeConflict> for CbomError {
    fn from(err: MergeConflict) -> Self {
        Self::merge("", err)
    }
}

// ============================================================================
// Context chaining
// ============================================================================

impl CbomError {
    /// Prefix the error's context with `outer`, keeping the source intact.
    ///
    /// Contexts read outermost first, joined by `": "`.
    #[must_use]
    pub fn prepend_context(self, outer: &str) -> Self {
        let join = |inner: String| {
            if inner.is_empty() {
                outer.to_string()
            } else {
                format!("{outer}: {inner}")
            }
        };
        match self {
            Self::Scan { context, source } => Self::Scan {
                context: join(context),
                source,
            },
            Self::Merge { context, source } => Self::Merge {
                context: join(context),
                source,
            },
            Self::Document { context, source } => Self::Document {
                context: join(context),
                source,
            },
            Self::Io {
                path,
                message,
                source,
            } => Self::Io {
                path,
                message: join(message),
                source,
            },
            Self::Config(message) => Self::Config(join(message)),
            Self::Validation(message) => Self::Validation(join(message)),
        }
    }
}

/// Attach context to any error convertible into [`CbomError`].
///
/// ```ignore
/// use cbom_tools::error::ErrorContext;
///
/// let bom = parse_bom_str(&content).with_context(|| path.display().to_string())?;
/// ```
pub trait ErrorContext<T> {
    fn context(self, context: &str) -> Result<T>;

    /// Like [`ErrorContext::context`], building the text only on error
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: AsRef<str>;
}

impl<T, E: Into<CbomError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: &str) -> Result<T> {
        self.map_err(|e| e.into().prepend_context(context))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: AsRef<str>,
    {
        self.map_err(|e| e.into().prepend_context(f().as_ref()))
    }
}
