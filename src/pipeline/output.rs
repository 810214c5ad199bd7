//! Output handling for generated documents.

use super::PipelineError;
use crate::document::{to_json, Bom};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Target for output - either stdout or a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Write to stdout
    Stdout,
    /// Write to a file
    File(PathBuf),
}

impl OutputTarget {
    /// Create output target from optional path
    #[must_use]
    pub fn from_option(path: Option<PathBuf>) -> Self {
        match path {
            Some(p) => Self::File(p),
            None => Self::Stdout,
        }
    }
}

/// Write output to the target (stdout or file)
pub fn write_output(content: &str, target: &OutputTarget, quiet: bool) -> Result<()> {
    match target {
        OutputTarget::Stdout => {
            println!("{content}");
            Ok(())
        }
        OutputTarget::File(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            if !quiet {
                tracing::info!("BOM written to {}", path.display());
            }
            Ok(())
        }
    }
}

/// Serialize `bom` and write it to `target`
pub fn write_bom(bom: &Bom, target: &OutputTarget, pretty: bool, quiet: bool) -> Result<()> {
    let json = to_json(bom, pretty).map_err(|e| PipelineError::WriteFailed { source: e.into() })?;
    write_output(&json, target, quiet).map_err(|e| PipelineError::WriteFailed { source: e }.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_output_target_from_option_none() {
        assert_eq!(OutputTarget::from_option(None), OutputTarget::Stdout);
    }

    #[test]
    fn test_output_target_from_option_some() {
        let path = PathBuf::from("/tmp/test.json");
        assert_eq!(
            OutputTarget::from_option(Some(path.clone())),
            OutputTarget::File(path)
        );
    }

    #[test]
    fn test_write_bom_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cbom.json");
        let target = OutputTarget::File(path.clone());

        write_bom(&Bom::skeleton(), &target, false, true).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains('\n'));
        assert!(written.contains(r#""specVersion":"1.6""#));
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let target = OutputTarget::File(dir.path().join("missing/cbom.json"));
        let err = write_bom(&Bom::skeleton(), &target, true, true).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::WriteFailed { .. })
        ));
    }
}
