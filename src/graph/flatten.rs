//! Conversion of the merged graph into document records.

use super::AssetGraph;
use crate::document::{
    AlgorithmProperties, Bom, CertificateProperties, Component, CryptoProperties, Dependency,
    Evidence, Hash, Occurrence, Property, RelatedCryptoMaterialProperties, SERIAL_NUMBER_PROPERTY,
};
use crate::model::{
    AlgorithmAsset, Asset, AssetType, BomRef, CertificateAsset, RelatedMaterialAsset,
};
use chrono::SecondsFormat;
use serde_json::Map;
use std::collections::{HashMap, HashSet};

const CERTIFICATE_FORMAT: &str = "X.509";

/// Component and dependency records produced from one graph
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlattenedBom {
    pub components: Vec<Component>,
    pub dependencies: Vec<Dependency>,
}

/// What [`FlattenedBom::append_to`] changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppendSummary {
    pub components_added: usize,
    pub dependencies_added: usize,
    pub dependencies_extended: usize,
    /// Appended refs that an existing component already used
    pub duplicate_refs: Vec<BomRef>,
}

impl FlattenedBom {
    /// Append into an existing document.
    ///
    /// Components are appended as-is, even when their `bom-ref` is already in
    /// the document (for example when a document this tool wrote is scanned
    /// into again); such refs are logged and returned. Dependency records are
    /// unioned with any record the document already holds for the same ref.
    pub fn append_to(self, bom: &mut Bom) -> AppendSummary {
        let duplicate_refs: Vec<BomRef> = {
            let present: HashSet<&BomRef> = bom
                .components
                .iter()
                .filter_map(|c| c.bom_ref.as_ref())
                .collect();
            self.components
                .iter()
                .filter_map(|c| c.bom_ref.as_ref())
                .filter(|id| present.contains(id))
                .cloned()
                .collect()
        };
        for id in &duplicate_refs {
            tracing::warn!(bom_ref = %id, "Appended component reuses a bom-ref already in the document");
        }

        let components_added = self.components.len();
        bom.components.extend(self.components);
        let (dependencies_added, dependencies_extended) =
            merge_dependencies(&mut bom.dependencies, self.dependencies);
        AppendSummary {
            components_added,
            dependencies_added,
            dependencies_extended,
            duplicate_refs,
        }
    }
}

/// Flatten a graph into components (one per node) and dependency records
/// (one per node with outgoing edges), both in creation order.
#[must_use]
pub fn flatten(graph: &AssetGraph) -> FlattenedBom {
    let components = graph
        .nodes()
        .map(|(id, asset)| component_for(id, asset))
        .collect();

    let dependencies = graph
        .nodes()
        .filter_map(|(id, _)| {
            let targets = graph.dependencies_of(id);
            (!targets.is_empty()).then(|| Dependency {
                dependency_ref: id.clone(),
                depends_on: targets.to_vec(),
            })
        })
        .collect();

    FlattenedBom {
        components,
        dependencies,
    }
}

/// Union `incoming` dependency records into `existing`.
///
/// Records sharing a ref are combined: existing targets first, then new ones
/// in order of first appearance, without duplicates. Returns the number of
/// records added and the number of existing records that gained targets.
pub fn merge_dependencies(
    existing: &mut Vec<Dependency>,
    incoming: Vec<Dependency>,
) -> (usize, usize) {
    let original_len = existing.len();
    let mut positions: HashMap<BomRef, usize> = HashMap::new();
    for (pos, record) in existing.iter().enumerate() {
        positions.entry(record.dependency_ref.clone()).or_insert(pos);
    }

    let mut added = 0;
    let mut extended = HashSet::new();
    for record in incoming {
        if let Some(&pos) = positions.get(&record.dependency_ref) {
            let target = &mut existing[pos];
            for dep in record.depends_on {
                if !target.depends_on.contains(&dep) {
                    target.depends_on.push(dep);
                    if pos < original_len {
                        extended.insert(pos);
                    }
                }
            }
        } else {
            let mut depends_on: Vec<BomRef> = Vec::with_capacity(record.depends_on.len());
            for dep in record.depends_on {
                if !depends_on.contains(&dep) {
                    depends_on.push(dep);
                }
            }
            positions.insert(record.dependency_ref.clone(), existing.len());
            existing.push(Dependency {
                dependency_ref: record.dependency_ref,
                depends_on,
            });
            added += 1;
        }
    }
    (added, extended.len())
}

// ============================================================================
// Per-variant field mapping
// ============================================================================

fn component_for(id: &BomRef, asset: &Asset) -> Component {
    match asset {
        Asset::Certificate(certificate) => certificate_component(id, certificate),
        Asset::Algorithm(algorithm) => algorithm_component(id, algorithm),
        Asset::RelatedMaterial(material) => related_material_component(id, material),
    }
}

fn certificate_component(id: &BomRef, certificate: &CertificateAsset) -> Component {
    let mut properties = CryptoProperties::new(AssetType::Certificate);
    properties.certificate_properties = Some(CertificateProperties {
        subject_name: Some(certificate.subject_name.clone()),
        issuer_name: Some(certificate.issuer_name.clone()),
        not_valid_before: Some(
            certificate
                .not_valid_before
                .to_rfc3339_opts(SecondsFormat::Secs, true),
        ),
        not_valid_after: Some(
            certificate
                .not_valid_after
                .to_rfc3339_opts(SecondsFormat::Secs, true),
        ),
        signature_algorithm_ref: certificate.signature_algorithm_ref.clone(),
        subject_public_key_ref: certificate.subject_public_key_ref.clone(),
        certificate_format: Some(CERTIFICATE_FORMAT.to_string()),
        certificate_extension: certificate.file_extension().map(str::to_string),
        extra: Map::new(),
    });

    let mut component = Component::crypto_asset(id.clone(), &certificate.name, properties);
    component.hashes.push(Hash {
        alg: "SHA-256".to_string(),
        content: certificate.fingerprint.clone(),
    });
    component.properties.push(Property::new(
        SERIAL_NUMBER_PROPERTY,
        certificate.serial_number.clone(),
    ));
    component.evidence = Some(Evidence {
        occurrences: certificate
            .paths
            .iter()
            .map(|path| Occurrence {
                location: path.clone(),
                extra: Map::new(),
            })
            .collect(),
        extra: Map::new(),
    });
    component
}

fn algorithm_component(id: &BomRef, algorithm: &AlgorithmAsset) -> Component {
    let mut properties = CryptoProperties::new(AssetType::Algorithm);
    properties.algorithm_properties = Some(AlgorithmProperties {
        primitive: Some(algorithm.primitive),
        execution_environment: Some(algorithm.execution_environment),
        implementation_platform: Some(algorithm.implementation_platform),
        certification_level: algorithm.certification_levels.clone(),
        crypto_functions: algorithm.crypto_functions.clone(),
        padding: algorithm.padding,
        extra: Map::new(),
    });
    properties.oid.clone_from(&algorithm.oid);
    Component::crypto_asset(id.clone(), &algorithm.name, properties)
}

fn related_material_component(id: &BomRef, material: &RelatedMaterialAsset) -> Component {
    let mut properties = CryptoProperties::new(AssetType::RelatedCryptoMaterial);
    properties.related_crypto_material_properties = Some(RelatedCryptoMaterialProperties {
        material_type: Some(material.material_type),
        algorithm_ref: material.algorithm_ref.clone(),
        size: material.size,
        extra: Map::new(),
    });
    Component::crypto_asset(id.clone(), &material.name, properties)
}
