//! Input document stage.

use super::PipelineError;
use crate::document::{self, Bom};
use anyhow::Result;
use std::path::Path;

/// Load the document to extend, or start from an empty skeleton
pub fn load_bom(path: Option<&Path>, quiet: bool) -> Result<Bom> {
    let Some(path) = path else {
        tracing::debug!("No input BOM given, starting from an empty document");
        return Ok(Bom::skeleton());
    };

    if !quiet {
        tracing::info!("Loading BOM: {}", path.display());
    }
    let bom = document::load_bom(path).map_err(|e| PipelineError::LoadFailed {
        path: path.display().to_string(),
        source: e.into(),
    })?;
    if !quiet {
        tracing::info!(
            "Loaded {} components and {} dependency records",
            bom.components.len(),
            bom.dependencies.len()
        );
    }
    Ok(bom)
}
