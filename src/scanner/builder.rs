//! Per-certificate subgraph construction.

use super::algorithms::{classify_public_key, classify_signature, AlgorithmDefaults};
use super::decode::DecodedCertificate;
use crate::graph::{AssetGraph, DependencyEdge};
use crate::model::{BomRef, BomRefGenerator, CertificateAsset};
use indexmap::IndexSet;
use std::fmt;
use thiserror::Error;

/// Which of a certificate's algorithms could not be classified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmRole {
    Signature,
    PublicKey,
}

impl fmt::Display for AlgorithmRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signature => f.write_str("signature"),
            Self::PublicKey => f.write_str("public key"),
        }
    }
}

/// Recoverable: the certificate is kept, the dependency on this algorithm is not
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {role} algorithm {oid} in certificate '{subject}' at {path}")]
pub struct UnknownAlgorithm {
    pub role: AlgorithmRole,
    pub oid: String,
    pub subject: String,
    pub path: String,
}

/// Graph produced from one decoded certificate
#[derive(Debug, Clone)]
pub struct CertificateSubgraph {
    pub graph: AssetGraph,
    /// Identifier of the certificate node
    pub certificate: BomRef,
    pub unknown: Vec<UnknownAlgorithm>,
}

/// Builds a certificate node plus the algorithm nodes it depends on
#[derive(Debug, Clone, Default)]
pub struct SubgraphBuilder {
    defaults: AlgorithmDefaults,
}

impl SubgraphBuilder {
    #[must_use]
    pub const fn new(defaults: AlgorithmDefaults) -> Self {
        Self { defaults }
    }

    /// Build the subgraph for `certificate` found at `path`.
    ///
    /// Identifiers are drawn in node creation order: certificate, signature
    /// algorithm, public-key algorithm. Unrecognized algorithms draw no
    /// identifier and leave their edge out.
    pub fn build(
        &self,
        certificate: &DecodedCertificate,
        path: &str,
        ids: &mut BomRefGenerator,
    ) -> CertificateSubgraph {
        let mut unknown = Vec::new();
        let unknown_algorithm = |role: AlgorithmRole, oid: &str| UnknownAlgorithm {
            role,
            oid: oid.to_string(),
            subject: certificate.subject.clone(),
            path: path.to_string(),
        };

        let cert_id = ids.next_ref();

        let signature = classify_signature(&certificate.signature_algorithm_oid, &self.defaults)
            .map(|alg| (ids.next_ref(), alg));
        if signature.is_none() {
            unknown.push(unknown_algorithm(
                AlgorithmRole::Signature,
                &certificate.signature_algorithm_oid,
            ));
        }

        let public_key = classify_public_key(&certificate.public_key, &self.defaults)
            .map(|alg| (ids.next_ref(), alg));
        if public_key.is_none() {
            unknown.push(unknown_algorithm(
                AlgorithmRole::PublicKey,
                &certificate.public_key.algorithm_oid,
            ));
        }

        let asset = CertificateAsset {
            name: certificate.display_name().to_string(),
            subject_name: certificate.subject.clone(),
            issuer_name: certificate.issuer.clone(),
            not_valid_before: certificate.not_before,
            not_valid_after: certificate.not_after,
            serial_number: certificate.serial.clone(),
            fingerprint: certificate.fingerprint.clone(),
            paths: IndexSet::from([path.to_string()]),
            signature_algorithm_ref: signature.as_ref().map(|(id, _)| id.clone()),
            subject_public_key_ref: public_key.as_ref().map(|(id, _)| id.clone()),
        };

        let mut graph = AssetGraph::new();
        graph.insert_node(cert_id.clone(), asset.into());
        for (id, algorithm) in signature.into_iter().chain(public_key) {
            graph.insert_node(id.clone(), algorithm.into());
            graph.insert_edge(DependencyEdge::new(cert_id.clone(), id));
        }

        CertificateSubgraph {
            graph,
            certificate: cert_id,
            unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Asset, ImplementationPlatform};
    use crate::scanner::decode::PublicKeyInfo;
    use chrono::{TimeZone, Utc};

    fn decoded(signature_oid: &str, key_oid: &str) -> DecodedCertificate {
        DecodedCertificate {
            subject: "CN=svc.internal, O=Example".into(),
            common_name: Some("svc.internal".into()),
            issuer: "CN=Example Root".into(),
            not_before: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            not_after: Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap(),
            serial: "0a:1b".into(),
            signature_algorithm_oid: signature_oid.into(),
            public_key: PublicKeyInfo {
                algorithm_oid: key_oid.into(),
                parameters_oid: None,
                key_size_bits: Some(2048),
            },
            fingerprint: "12".repeat(32),
        }
    }

    #[test]
    fn test_builds_certificate_with_two_dependencies() {
        let mut ids = BomRefGenerator::default();
        let sub = SubgraphBuilder::default().build(
            &decoded("1.2.840.113549.1.1.11", "1.2.840.113549.1.1.1"),
            "etc/ssl/svc.pem",
            &mut ids,
        );

        assert!(sub.unknown.is_empty());
        assert_eq!(sub.graph.node_count(), 3);
        assert_eq!(sub.graph.edge_count(), 2);
        assert!(sub.graph.validate().is_ok());

        let names: Vec<_> = sub.graph.nodes().map(|(_, a)| a.name().to_string()).collect();
        assert_eq!(names, vec!["svc.internal", "RSA-SHA256", "RSA-2048"]);

        let Some(Asset::Certificate(cert)) = sub.graph.node(&sub.certificate) else {
            panic!("certificate node missing");
        };
        assert_eq!(cert.paths.first().map(String::as_str), Some("etc/ssl/svc.pem"));
        assert_eq!(
            sub.graph.dependencies_of(&sub.certificate),
            &[
                cert.signature_algorithm_ref.clone().unwrap(),
                cert.subject_public_key_ref.clone().unwrap()
            ]
        );
    }

    #[test]
    fn test_unknown_signature_is_recoverable() {
        let mut ids = BomRefGenerator::default();
        let sub = SubgraphBuilder::default().build(
            &decoded("1.2.3.4.5", "1.2.840.113549.1.1.1"),
            "weird.crt",
            &mut ids,
        );

        assert_eq!(sub.unknown.len(), 1);
        assert_eq!(sub.unknown[0].role, AlgorithmRole::Signature);
        assert_eq!(sub.unknown[0].oid, "1.2.3.4.5");
        assert!(sub.unknown[0].to_string().contains("weird.crt"));
        assert_eq!(sub.graph.node_count(), 2);
        assert_eq!(sub.graph.edge_count(), 1);
        let cert = sub.graph.node(&sub.certificate).unwrap().as_certificate().unwrap();
        assert!(cert.signature_algorithm_ref.is_none());
        assert!(cert.subject_public_key_ref.is_some());
        assert_eq!(ids.issued(), 2);
    }

    #[test]
    fn test_both_unknown_leaves_bare_certificate() {
        let mut ids = BomRefGenerator::default();
        let sub = SubgraphBuilder::default().build(&decoded("1.1", "1.2"), "x.pem", &mut ids);
        assert_eq!(sub.unknown.len(), 2);
        assert_eq!(sub.graph.node_count(), 1);
        assert_eq!(sub.graph.edge_count(), 0);
    }

    #[test]
    fn test_defaults_flow_into_algorithms() {
        let builder = SubgraphBuilder::new(AlgorithmDefaults {
            implementation_platform: ImplementationPlatform::S390x,
            ..AlgorithmDefaults::default()
        });
        let mut ids = BomRefGenerator::default();
        let sub = builder.build(
            &decoded("1.2.840.113549.1.1.11", "1.2.840.113549.1.1.1"),
            "a.pem",
            &mut ids,
        );
        assert!(sub
            .graph
            .algorithms()
            .all(|(_, a)| a.implementation_platform == ImplementationPlatform::S390x));
    }
}
