//! Crypto asset payloads.
//!
//! [`Asset`] is a closed sum over the three kinds of node the graph holds.
//! Payloads never carry their own identifier; the graph arena owns the
//! identifier-to-node mapping. Cross-node references that a payload does
//! carry (a certificate's algorithm refs, a key's algorithm ref) are rewritten
//! by the merge engine when their target is collapsed into a canonical node.

use super::{
    AssetType, BomRef, CertificationLevel, CryptoFunction, ExecutionEnvironment,
    ImplementationPlatform, Padding, Primitive, RelatedMaterialType,
};
use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A node payload in the asset graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Asset {
    Certificate(CertificateAsset),
    Algorithm(AlgorithmAsset),
    RelatedMaterial(RelatedMaterialAsset),
}

impl Asset {
    #[must_use]
    pub const fn asset_type(&self) -> AssetType {
        match self {
            Self::Certificate(_) => AssetType::Certificate,
            Self::Algorithm(_) => AssetType::Algorithm,
            Self::RelatedMaterial(_) => AssetType::RelatedCryptoMaterial,
        }
    }

    /// Display name used for the component
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Certificate(c) => &c.name,
            Self::Algorithm(a) => &a.name,
            Self::RelatedMaterial(m) => &m.name,
        }
    }

    /// Identifiers of other nodes this payload points at
    #[must_use]
    pub fn references(&self) -> Vec<&BomRef> {
        match self {
            Self::Certificate(c) => c
                .signature_algorithm_ref
                .iter()
                .chain(c.subject_public_key_ref.iter())
                .collect(),
            Self::Algorithm(_) => Vec::new(),
            Self::RelatedMaterial(m) => m.algorithm_ref.iter().collect(),
        }
    }

    /// Replace every payload reference found in `remap` by its mapped value.
    ///
    /// Returns true if anything changed.
    pub(crate) fn rewrite_references(&mut self, remap: &HashMap<BomRef, BomRef>) -> bool {
        fn rewrite(slot: &mut Option<BomRef>, remap: &HashMap<BomRef, BomRef>) -> bool {
            match slot.as_ref().and_then(|r| remap.get(r)) {
                Some(target) if slot.as_ref() != Some(target) => {
                    *slot = Some(target.clone());
                    true
                }
                _ => false,
            }
        }

        match self {
            Self::Certificate(c) => {
                let sig = rewrite(&mut c.signature_algorithm_ref, remap);
                let key = rewrite(&mut c.subject_public_key_ref, remap);
                sig || key
            }
            Self::Algorithm(_) => false,
            Self::RelatedMaterial(m) => rewrite(&mut m.algorithm_ref, remap),
        }
    }

    #[must_use]
    pub const fn as_algorithm(&self) -> Option<&AlgorithmAsset> {
        match self {
            Self::Algorithm(a) => Some(a),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_certificate(&self) -> Option<&CertificateAsset> {
        match self {
            Self::Certificate(c) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_related_material(&self) -> Option<&RelatedMaterialAsset> {
        match self {
            Self::RelatedMaterial(m) => Some(m),
            _ => None,
        }
    }
}

impl From<CertificateAsset> for Asset {
    fn from(value: CertificateAsset) -> Self {
        Self::Certificate(value)
    }
}

impl From<AlgorithmAsset> for Asset {
    fn from(value: AlgorithmAsset) -> Self {
        Self::Algorithm(value)
    }
}

impl From<RelatedMaterialAsset> for Asset {
    fn from(value: RelatedMaterialAsset) -> Self {
        Self::RelatedMaterial(value)
    }
}

// ============================================================================
// Algorithm
// ============================================================================

/// A cryptographic algorithm as used by some certificate or key.
///
/// Every field is descriptive. Two algorithms describe the same asset exactly
/// when [`AlgorithmAsset::is_equivalent`] holds, which is also what `Eq` and
/// `Hash` compare, so the type can key a dedupe index directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlgorithmAsset {
    pub name: String,
    pub primitive: Primitive,
    pub execution_environment: ExecutionEnvironment,
    pub implementation_platform: ImplementationPlatform,
    pub certification_levels: Vec<CertificationLevel>,
    pub crypto_functions: Vec<CryptoFunction>,
    pub oid: Option<String>,
    pub padding: Option<Padding>,
}

impl AlgorithmAsset {
    /// Create an algorithm with the functions implied by its primitive
    #[must_use]
    pub fn new(name: impl Into<String>, primitive: Primitive) -> Self {
        Self {
            name: name.into(),
            primitive,
            execution_environment: ExecutionEnvironment::default(),
            implementation_platform: ImplementationPlatform::default(),
            certification_levels: vec![CertificationLevel::None],
            crypto_functions: primitive.default_functions(),
            oid: None,
            padding: None,
        }
    }

    #[must_use]
    pub fn with_oid(mut self, oid: impl Into<String>) -> Self {
        self.oid = Some(oid.into());
        self
    }

    #[must_use]
    pub const fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = Some(padding);
        self
    }

    #[must_use]
    pub const fn with_execution_environment(mut self, env: ExecutionEnvironment) -> Self {
        self.execution_environment = env;
        self
    }

    #[must_use]
    pub const fn with_implementation_platform(mut self, platform: ImplementationPlatform) -> Self {
        self.implementation_platform = platform;
        self
    }

    #[must_use]
    pub fn with_certification_levels(mut self, levels: Vec<CertificationLevel>) -> Self {
        self.certification_levels = levels;
        self
    }

    #[must_use]
    pub fn with_crypto_functions(mut self, functions: Vec<CryptoFunction>) -> Self {
        self.crypto_functions = functions;
        self
    }

    /// Reference-blind equality: every descriptive field must match.
    ///
    /// Order matters for the certification level and function lists.
    #[must_use]
    pub fn is_equivalent(&self, other: &Self) -> bool {
        self.name == other.name
            && self.primitive == other.primitive
            && self.execution_environment == other.execution_environment
            && self.implementation_platform == other.implementation_platform
            && self.certification_levels == other.certification_levels
            && self.crypto_functions == other.crypto_functions
            && self.oid == other.oid
            && self.padding == other.padding
    }
}

// ============================================================================
// Certificate
// ============================================================================

/// An X.509 certificate found on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateAsset {
    /// Subject common name, or the full subject when there is none
    pub name: String,
    pub subject_name: String,
    pub issuer_name: String,
    pub not_valid_before: DateTime<Utc>,
    pub not_valid_after: DateTime<Utc>,
    /// Colon-separated hex
    pub serial_number: String,
    /// Lowercase hex SHA-256 of the DER encoding
    pub fingerprint: String,
    /// Every location the certificate was found at, in discovery order
    pub paths: IndexSet<String>,
    pub signature_algorithm_ref: Option<BomRef>,
    pub subject_public_key_ref: Option<BomRef>,
}

impl CertificateAsset {
    /// Union `other` into this certificate's path set, keeping first-seen order
    pub(crate) fn absorb_paths<'a>(&mut self, other: impl IntoIterator<Item = &'a String>) -> usize {
        let before = self.paths.len();
        self.paths.extend(other.into_iter().cloned());
        self.paths.len() - before
    }

    /// Extension of the first path, without the dot
    #[must_use]
    pub fn file_extension(&self) -> Option<&str> {
        let first = self.paths.first()?;
        let file_name = first.rsplit(['/', '\\']).next()?;
        let (stem, ext) = file_name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            None
        } else {
            Some(ext)
        }
    }
}

// ============================================================================
// Related material
// ============================================================================

/// Key or other material tied to an algorithm
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedMaterialAsset {
    pub name: String,
    pub material_type: RelatedMaterialType,
    pub size: Option<u32>,
    pub algorithm_ref: Option<BomRef>,
}

impl RelatedMaterialAsset {
    #[must_use]
    pub fn new(material_type: RelatedMaterialType, algorithm_ref: Option<BomRef>) -> Self {
        Self {
            name: material_type.label().to_string(),
            material_type,
            size: None,
            algorithm_ref,
        }
    }

    #[must_use]
    pub const fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }
}
