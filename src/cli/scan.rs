//! Scan command handler.
//!
//! Implements the `scan` subcommand: walk a directory, build the crypto asset
//! graph and write the resulting CycloneDX document.

use crate::config::{ensure_valid, AppConfig};
use crate::pipeline::{
    exit_codes, load_bom, run_plugins, total_warnings, write_bom, OutputTarget,
};
use crate::provider::{PlainFilesystem, WalkOptions};
use crate::scanner::{CertificatesPlugin, Plugin};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Inputs of one scan besides the configuration
#[derive(Debug, Clone)]
pub struct ScanPaths {
    /// Directory to scan
    pub root: PathBuf,
    /// Existing document to extend
    pub bom: Option<PathBuf>,
}

/// Run the scan command, returning the desired exit code
pub fn run_scan(paths: &ScanPaths, config: &AppConfig) -> Result<i32> {
    ensure_valid(config).context("invalid configuration")?;
    let quiet = config.behavior.quiet;

    let fs = open_filesystem(&paths.root, config)?;
    let mut bom = load_bom(paths.bom.as_deref(), quiet)?;

    let mut plugins: Vec<Box<dyn Plugin>> =
        vec![Box::new(CertificatesPlugin::from_config(&config.scan))];
    let reports = run_plugins(&mut plugins, &fs, &mut bom, quiet)?;

    let target = OutputTarget::from_option(config.output.file.clone());
    write_bom(&bom, &target, config.output.pretty, quiet)?;

    let warnings = total_warnings(&reports);
    if warnings > 0 {
        if !quiet {
            tracing::warn!("Scan finished with {warnings} warning(s)");
            for warning in reports.iter().flat_map(|r| &r.warnings) {
                tracing::debug!("{warning}");
            }
        }
        if config.behavior.fail_on_warnings {
            return Ok(exit_codes::WARNINGS);
        }
    }
    Ok(exit_codes::SUCCESS)
}

fn open_filesystem(root: &Path, config: &AppConfig) -> Result<PlainFilesystem> {
    let options = WalkOptions {
        follow_symlinks: config.scan.follow_symlinks,
        exclude_dirs: config.scan.exclude_dirs.clone(),
        max_file_size: config.scan.max_file_size,
    };
    PlainFilesystem::new(root, options)
        .with_context(|| format!("cannot scan {}", root.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::load_bom as read_document;
    use tempfile::TempDir;

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }

    #[test]
    fn test_scan_writes_document() {
        let out = TempDir::new().unwrap();
        let output = out.path().join("cbom.json");
        let config = AppConfig::builder()
            .output_file(Some(output.clone()))
            .quiet(true)
            .build();
        let paths = ScanPaths {
            root: fixture("two-pem"),
            bom: None,
        };

        assert_eq!(run_scan(&paths, &config).unwrap(), exit_codes::SUCCESS);
        let bom = read_document(&output).unwrap();
        assert_eq!(bom.components.len(), 4);
    }

    #[test]
    fn test_fail_on_warnings() {
        let out = TempDir::new().unwrap();
        let config = AppConfig::builder()
            .output_file(Some(out.path().join("cbom.json")))
            .quiet(true)
            .fail_on_warnings(true)
            .build();
        let paths = ScanPaths {
            root: fixture("mixed"),
            bom: None,
        };
        assert_eq!(run_scan(&paths, &config).unwrap(), exit_codes::WARNINGS);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let config = AppConfig::builder().quiet(true).build();
        let paths = ScanPaths {
            root: PathBuf::from("/nonexistent/scan/root"),
            bom: None,
        };
        let err = run_scan(&paths, &config).unwrap_err();
        assert!(format!("{err:#}").contains("scan root does not exist"));
    }
}
