//! CLI command handlers.
//!
//! This module provides testable command handlers that are invoked by main.rs.

mod scan;

pub use scan::{run_scan, ScanPaths};
