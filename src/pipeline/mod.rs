//! Pipeline orchestration for CBOM generation.
//!
//! This module provides the load → scan → write stages shared by the CLI
//! command handlers.

mod load;
mod output;
mod scan_stage;

pub use load::load_bom;
pub use output::{write_bom, write_output, OutputTarget};
pub use scan_stage::{run_plugins, total_warnings};

/// Structured pipeline error types for better diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to read or parse the document being extended
    #[error("Loading BOM failed for {path}: {source}")]
    LoadFailed {
        path: String,
        source: anyhow::Error,
    },

    /// A plugin aborted the scan
    #[error("{plugin} failed: {source}")]
    ScanFailed {
        plugin: String,
        #[source]
        source: anyhow::Error,
    },

    /// Serializing or writing the document failed
    #[error("Writing BOM failed: {source}")]
    WriteFailed {
        #[source]
        source: anyhow::Error,
    },
}

/// Exit codes for CI/CD integration
pub mod exit_codes {
    /// Success
    pub const SUCCESS: i32 = 0;
    /// The scan recorded warnings and --fail-on-warnings was set
    pub const WARNINGS: i32 = 1;
    /// An error occurred
    pub const ERROR: i32 = 3;
}
