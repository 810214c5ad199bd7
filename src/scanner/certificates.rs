//! Certificate file plugin.
//!
//! Walks the filesystem, decodes every file whose extension marks it as a
//! certificate or PKCS #7 container, builds one subgraph per certificate and
//! folds them into a single asset graph that is appended to the document.

use super::algorithms::AlgorithmDefaults;
use super::builder::SubgraphBuilder;
use super::decode::{decode, DecodeError, DecodedCertificate, DecodedFile, FileClass, FileClassifier};
use super::report::{ScanReport, WarningKind};
use super::traits::{Plugin, PluginType};
use crate::config::ScanConfig;
use crate::document::Bom;
use crate::error::{ErrorContext, Result};
use crate::graph::{flatten, MergeEngine};
use crate::model::{BomRefGenerator, DEFAULT_ID_SEED};
use crate::provider::{handle_scan_error, Filesystem, ScanError};
use rayon::prelude::*;
use std::path::Path;

pub const PLUGIN_NAME: &str = "Certificate File Plugin";

/// A matched file and its raw content
struct MatchedFile {
    path: String,
    class: FileClass,
    bytes: Vec<u8>,
}

/// Scanner for X.509 certificates and PKCS #7 bundles
#[derive(Debug, Clone)]
pub struct CertificatesPlugin {
    classifier: FileClassifier,
    builder: SubgraphBuilder,
    id_seed: u64,
    parallel: bool,
}

impl Default for CertificatesPlugin {
    fn default() -> Self {
        Self {
            classifier: FileClassifier::default(),
            builder: SubgraphBuilder::default(),
            id_seed: DEFAULT_ID_SEED,
            parallel: true,
        }
    }
}

impl CertificatesPlugin {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            classifier: FileClassifier::new(
                &config.certificate_extensions,
                &config.pkcs7_extensions,
            ),
            builder: SubgraphBuilder::new(AlgorithmDefaults {
                implementation_platform: config.implementation_platform,
                ..AlgorithmDefaults::default()
            }),
            id_seed: config.id_seed,
            parallel: config.parallel,
        }
    }

    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    #[must_use]
    pub const fn with_id_seed(mut self, seed: u64) -> Self {
        self.id_seed = seed;
        self
    }

    /// Collect the bytes of every matched file in traversal order.
    ///
    /// A read failure is fatal: the file was selected and must be scanned.
    fn collect(&self, fs: &dyn Filesystem, report: &mut ScanReport) -> Result<Vec<MatchedFile>> {
        let mut matched = Vec::new();
        let summary = fs.walk_dir(&mut |path: &Path| {
            let Some(class) = self.classifier.classify(path) else {
                return Ok(());
            };
            tracing::debug!(path = %path.display(), ?class, "Matched certificate file");
            let bytes = fs
                .read_file(path)
                .context("reading matched certificate file")
                .map_err(ScanError::Fatal)?;
            matched.push(MatchedFile {
                path: path.to_string_lossy().into_owned(),
                class,
                bytes,
            });
            Ok(())
        })?;

        report.files_visited = summary.files_visited;
        report.files_oversized = summary.files_oversized;
        report.files_skipped += summary.skipped.len();
        for skipped in summary.skipped {
            report.warn(WarningKind::SkippedFile, skipped.path, skipped.detail);
        }
        Ok(matched)
    }

    /// Decode all files, in parallel when enabled; results keep input order
    fn decode_all(&self, files: &[MatchedFile]) -> Vec<std::result::Result<DecodedFile, DecodeError>> {
        if self.parallel {
            files.par_iter().map(|f| decode(&f.bytes, f.class)).collect()
        } else {
            files.iter().map(|f| decode(&f.bytes, f.class)).collect()
        }
    }

    /// Decoded certificates with their paths, in traversal order
    fn decode_files(
        &self,
        files: &[MatchedFile],
        report: &mut ScanReport,
    ) -> Result<Vec<(String, DecodedCertificate)>> {
        let mut certificates = Vec::new();
        for (file, result) in files.iter().zip(self.decode_all(files)) {
            match result {
                Ok(decoded) => {
                    for label in decoded.skipped_blocks {
                        tracing::warn!(
                            path = %file.path,
                            label = %label,
                            "Skipping PEM block that is not a certificate"
                        );
                        report.warn(
                            WarningKind::SkippedBlock,
                            &file.path,
                            format!("PEM block '{label}' is not a certificate"),
                        );
                    }
                    certificates.extend(
                        decoded
                            .certificates
                            .into_iter()
                            .map(|cert| (file.path.clone(), cert)),
                    );
                }
                Err(err) => {
                    let skipped = handle_scan_error(ScanError::recoverable(
                        PLUGIN_NAME,
                        &file.path,
                        err.to_string(),
                    ))?;
                    report.files_skipped += 1;
                    report.warn(WarningKind::SkippedFile, skipped.path, skipped.detail);
                }
            }
        }
        Ok(certificates)
    }
}

impl Plugin for CertificatesPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn plugin_type(&self) -> PluginType {
        PluginType::Append
    }

    fn update_bom(&mut self, fs: &dyn Filesystem, bom: &mut Bom) -> Result<ScanReport> {
        let mut report = ScanReport::new(PLUGIN_NAME);
        tracing::info!(filesystem = %fs.identifier(), "Searching for certificates");

        let files = self.collect(fs, &mut report)?;
        report.files_matched = files.len();
        let certificates = self.decode_files(&files, &mut report)?;
        drop(files);
        report.certificates_found = certificates.len();
        tracing::info!(count = certificates.len(), "Certificate searching done");

        let mut ids = BomRefGenerator::new(self.id_seed);
        let mut engine = MergeEngine::new();
        for (path, certificate) in &certificates {
            let subgraph = self.builder.build(certificate, path, &mut ids);
            for unknown in subgraph.unknown {
                tracing::warn!("{unknown}");
                report.warn(WarningKind::UnknownAlgorithm, path, unknown.to_string());
            }
            if let Err(conflict) = engine.merge(subgraph.graph) {
                tracing::error!(path = %path, "Merging of certificate graph failed: {conflict}");
                return Err(conflict).with_context(|| format!("certificate at {path}"));
            }
        }
        report.merge = *engine.stats();

        let graph = engine.into_graph();
        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Asset graph complete"
        );
        let summary = flatten(&graph).append_to(bom);
        bom.mark_tool();

        for id in &summary.duplicate_refs {
            report.warn(
                WarningKind::DuplicateRef,
                id.as_str(),
                "component appended although the document already holds this bom-ref",
            );
        }

        report.components_added = summary.components_added;
        report.dependencies_added = summary.dependencies_added;
        report.dependencies_extended = summary.dependencies_extended;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CbomError;
    use crate::model::AssetType;
    use crate::provider::{FileVisitor, PlainFilesystem, WalkOptions, WalkSummary};
    use std::path::PathBuf;

    /// Lists one certificate file that cannot be read
    struct Unreadable;

    impl Filesystem for Unreadable {
        fn walk_dir(&self, visitor: &mut FileVisitor<'_>) -> Result<WalkSummary> {
            let mut summary = WalkSummary {
                files_visited: 1,
                ..WalkSummary::default()
            };
            if let Err(err) = visitor(Path::new("locked.pem")) {
                summary.skipped.push(handle_scan_error(err)?);
            }
            Ok(summary)
        }

        fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
            Err(CbomError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied"),
            ))
        }

        fn exists(&self, _path: &Path) -> bool {
            true
        }

        fn identifier(&self) -> String {
            "unreadable".into()
        }
    }

    fn fixtures(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }

    fn scan(dir: &str, plugin: &mut CertificatesPlugin) -> (Bom, ScanReport) {
        let fs = PlainFilesystem::new(fixtures(dir), WalkOptions::default()).unwrap();
        let mut bom = Bom::skeleton();
        let report = plugin.update_bom(&fs, &mut bom).unwrap();
        (bom, report)
    }

    #[test]
    fn test_two_pem_files_share_signature_algorithm() {
        let (bom, report) = scan("two-pem", &mut CertificatesPlugin::new());
        assert_eq!(report.files_matched, 2);
        assert_eq!(report.certificates_found, 2);
        assert_eq!(bom.crypto_components(AssetType::Certificate).count(), 2);
        let signatures: Vec<_> = bom
            .crypto_components(AssetType::Algorithm)
            .filter(|c| c.name == "RSA-SHA256")
            .collect();
        assert_eq!(signatures.len(), 1);
        let sig_ref = signatures[0].bom_ref.clone().unwrap();
        for cert in bom.crypto_components(AssetType::Certificate) {
            let dep = bom.dependency(cert.bom_ref.as_ref().unwrap().as_str()).unwrap();
            assert!(dep.depends_on.contains(&sig_ref));
        }
        assert!(!report.has_warnings());
    }

    #[test]
    fn test_serial_and_parallel_agree() {
        let (parallel, _) = scan("mixed", &mut CertificatesPlugin::new());
        let (serial, _) = scan("mixed", &mut CertificatesPlugin::new().with_parallel(false));
        assert_eq!(
            serde_json::to_string(&parallel).unwrap(),
            serde_json::to_string(&serial).unwrap()
        );
    }

    #[test]
    fn test_seed_changes_identifiers() {
        let (a, _) = scan("two-pem", &mut CertificatesPlugin::new());
        let (b, _) = scan("two-pem", &mut CertificatesPlugin::new().with_id_seed(7));
        assert_ne!(a.components[0].bom_ref, b.components[0].bom_ref);
        assert_eq!(a.components[0].name, b.components[0].name);
    }

    #[test]
    fn test_unreadable_match_is_fatal_with_context() {
        let mut bom = Bom::skeleton();
        let err = CertificatesPlugin::new()
            .update_bom(&Unreadable, &mut bom)
            .unwrap_err();
        match err {
            CbomError::Io { path, message, .. } => {
                assert_eq!(path, Some(PathBuf::from("locked.pem")));
                assert_eq!(message, "reading matched certificate file: permission denied");
            }
            other => panic!("Expected Io error, got {other:?}"),
        }
        assert!(bom.components.is_empty());
    }

    #[test]
    fn test_plugin_identity() {
        let plugin = CertificatesPlugin::new();
        assert_eq!(plugin.name(), "Certificate File Plugin");
        assert_eq!(plugin.plugin_type(), PluginType::Append);
    }
}
