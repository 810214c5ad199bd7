//! `CycloneDX` 1.6 JSON document model.
//!
//! Only the parts cbom-tools writes are typed. Everything else an input
//! document carries is kept in flattened `extra` maps and written back
//! unchanged, so extending a document produced by another tool does not lose
//! its content.

use crate::model::{
    AssetType, BomRef, CertificationLevel, CryptoFunction, ExecutionEnvironment,
    ImplementationPlatform, Padding, Primitive, RelatedMaterialType,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Value of `bomFormat`
pub const BOM_FORMAT: &str = "CycloneDX";
/// Specification version written, and the minimum that supports crypto assets
pub const SPEC_VERSION: &str = "1.6";
/// Component type of every crypto asset
pub const CRYPTO_COMPONENT_TYPE: &str = "cryptographic-asset";
/// Property name under which certificate serial numbers are recorded
pub const SERIAL_NUMBER_PROPERTY: &str = "cbom-tools:certificate:serial-number";

const TOOL_NAME: &str = env!("CARGO_PKG_NAME");
const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bom {
    #[serde(default)]
    pub bom_format: String,
    #[serde(default)]
    pub spec_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

const fn default_version() -> u32 {
    1
}

impl Bom {
    /// Empty 1.6 document listing cbom-tools as its producer.
    ///
    /// No timestamp or serial number is set, so documents built from the same
    /// input are byte-identical.
    #[must_use]
    pub fn skeleton() -> Self {
        let mut metadata = Metadata::default();
        metadata.add_tool(TOOL_NAME, TOOL_VERSION);
        Self {
            bom_format: BOM_FORMAT.to_string(),
            spec_version: SPEC_VERSION.to_string(),
            serial_number: None,
            version: 1,
            metadata: Some(metadata),
            components: Vec::new(),
            dependencies: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Record cbom-tools in the metadata tool list
    pub fn mark_tool(&mut self) {
        self.metadata
            .get_or_insert_with(Metadata::default)
            .add_tool(TOOL_NAME, TOOL_VERSION);
    }

    /// Crypto asset components of the given asset type, in document order
    pub fn crypto_components(&self, asset_type: AssetType) -> impl Iterator<Item = &Component> {
        self.components.iter().filter(move |c| {
            c.crypto_properties
                .as_ref()
                .is_some_and(|p| p.asset_type == asset_type)
        })
    }

    #[must_use]
    pub fn component(&self, bom_ref: &str) -> Option<&Component> {
        self.components
            .iter()
            .find(|c| c.bom_ref.as_ref().is_some_and(|r| r.as_str() == bom_ref))
    }

    #[must_use]
    pub fn dependency(&self, bom_ref: &str) -> Option<&Dependency> {
        self.dependencies
            .iter()
            .find(|d| d.dependency_ref.as_str() == bom_ref)
    }
}

impl Default for Bom {
    fn default() -> Self {
        Self::skeleton()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Either the 1.6 object form or the legacy array form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Metadata {
    /// Add a tool entry unless one with the same name and version exists
    pub fn add_tool(&mut self, name: &str, version: &str) {
        let matches = |entry: &Value| {
            entry.get("name").and_then(Value::as_str) == Some(name)
                && entry.get("version").and_then(Value::as_str) == Some(version)
        };

        match self.tools.get_or_insert_with(|| json!({ "components": [] })) {
            Value::Array(legacy) => {
                if !legacy.iter().any(matches) {
                    legacy.push(json!({ "name": name, "version": version }));
                }
            }
            Value::Object(object) => {
                let components = object
                    .entry("components")
                    .or_insert_with(|| Value::Array(Vec::new()));
                if let Value::Array(components) = components {
                    if !components.iter().any(matches) {
                        components.push(json!({
                            "type": "application",
                            "name": name,
                            "version": version,
                        }));
                    }
                }
            }
            other => {
                *other = json!({ "components": [{
                    "type": "application",
                    "name": name,
                    "version": version,
                }]});
            }
        }
    }
}

// ============================================================================
// Components
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    #[serde(rename = "type")]
    pub component_type: String,
    #[serde(rename = "bom-ref", default, skip_serializing_if = "Option::is_none")]
    pub bom_ref: Option<BomRef>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crypto_properties: Option<CryptoProperties>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hashes: Vec<Hash>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<Property>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<Evidence>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Component {
    /// A `cryptographic-asset` component with no optional sections set
    #[must_use]
    pub fn crypto_asset(bom_ref: BomRef, name: impl Into<String>, properties: CryptoProperties) -> Self {
        Self {
            component_type: CRYPTO_COMPONENT_TYPE.to_string(),
            bom_ref: Some(bom_ref),
            name: name.into(),
            crypto_properties: Some(properties),
            hashes: Vec::new(),
            properties: Vec::new(),
            evidence: None,
            extra: Map::new(),
        }
    }

    /// Value of the first property with this name; `None` also when the
    /// property is present without a value
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .and_then(|p| p.value.as_deref())
    }

    /// Locations recorded as evidence
    #[must_use]
    pub fn locations(&self) -> Vec<&str> {
        self.evidence
            .iter()
            .flat_map(|e| e.occurrences.iter())
            .map(|o| o.location.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CryptoProperties {
    pub asset_type: AssetType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm_properties: Option<AlgorithmProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_properties: Option<CertificateProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_crypto_material_properties: Option<RelatedCryptoMaterialProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oid: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CryptoProperties {
    #[must_use]
    pub fn new(asset_type: AssetType) -> Self {
        Self {
            asset_type,
            algorithm_properties: None,
            certificate_properties: None,
            related_crypto_material_properties: None,
            oid: None,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgorithmProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primitive: Option<Primitive>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_environment: Option<ExecutionEnvironment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation_platform: Option<ImplementationPlatform>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub certification_level: Vec<CertificationLevel>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub crypto_functions: Vec<CryptoFunction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<Padding>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_valid_before: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_valid_after: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_algorithm_ref: Option<BomRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_public_key_ref: Option<BomRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_extension: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedCryptoMaterialProperties {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub material_type: Option<RelatedMaterialType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm_ref: Option<BomRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hash {
    pub alg: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Property {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub occurrences: Vec<Occurrence>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    pub location: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ============================================================================
// Dependencies
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    #[serde(rename = "ref")]
    pub dependency_ref: BomRef,
    #[serde(default)]
    pub depends_on: Vec<BomRef>,
}
