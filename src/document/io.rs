//! Reading and serializing BOM documents.

use super::cyclonedx::{Bom, BOM_FORMAT, SPEC_VERSION};
use crate::error::{CbomError, DocumentErrorKind, ErrorContext, Result};
use serde_json::Value;
use std::path::Path;

/// Parse a `CycloneDX` JSON document.
///
/// Documents declaring a 1.x version older than 1.6 are upgraded in place,
/// since crypto asset components need the 1.6 schema.
pub fn parse_bom_str(content: &str) -> Result<Bom> {
    let value: Value = serde_json::from_str(content)?;
    let format = value.get("bomFormat").and_then(Value::as_str);
    if format != Some(BOM_FORMAT) {
        return Err(CbomError::unknown_format(format));
    }

    let mut bom: Bom = serde_json::from_value(value)?;
    match spec_minor(&bom.spec_version) {
        Some(minor) if minor < 6 => {
            tracing::warn!(
                from = %bom.spec_version,
                to = SPEC_VERSION,
                "Upgrading document spec version to carry cryptographic assets"
            );
            bom.spec_version = SPEC_VERSION.to_string();
        }
        Some(_) => {}
        None => {
            return Err(CbomError::document(
                "reading specVersion",
                DocumentErrorKind::UnsupportedVersion {
                    version: bom.spec_version,
                    supported: format!("1.x (written as {SPEC_VERSION})"),
                },
            ));
        }
    }
    Ok(bom)
}

/// Read and parse a document from disk
pub fn load_bom(path: &Path) -> Result<Bom> {
    let content = std::fs::read_to_string(path).map_err(|e| CbomError::io(path, e))?;
    parse_bom_str(&content).with_context(|| path.display().to_string())
}

/// Serialize a document to JSON
pub fn to_json(bom: &Bom, pretty: bool) -> Result<String> {
    let result = if pretty {
        serde_json::to_string_pretty(bom)
    } else {
        serde_json::to_string(bom)
    };
    result.map_err(|e| {
        CbomError::document(
            "serializing BOM",
            DocumentErrorKind::Serialization(e.to_string()),
        )
    })
}

/// Minor version of a `1.x` spec version string
fn spec_minor(version: &str) -> Option<u32> {
    let (major, rest) = version.trim().split_once('.')?;
    if major != "1" {
        return None;
    }
    rest.split('.').next()?.parse().ok()
}
