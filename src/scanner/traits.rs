//! Plugin abstraction shared by all scanners.

use super::report::ScanReport;
use crate::document::Bom;
use crate::error::Result;
use crate::provider::Filesystem;
use std::fmt;

/// How a plugin affects the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginType {
    /// Adds components and dependencies
    Append,
    /// Checks the document without changing it
    Verify,
    Other,
}

impl fmt::Display for PluginType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Append => write!(f, "append"),
            Self::Verify => write!(f, "verify"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// A scanner that inspects a filesystem and updates a document.
///
/// Soft conditions are recorded in the returned [`ScanReport`]; an `Err`
/// means the document must not be written.
pub trait Plugin {
    /// Human-readable plugin name
    fn name(&self) -> &str;

    fn plugin_type(&self) -> PluginType;

    /// Scan `fs` and update `bom` in place
    fn update_bom(&mut self, fs: &dyn Filesystem, bom: &mut Bom) -> Result<ScanReport>;
}
