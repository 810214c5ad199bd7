//! **A library for building Cryptographic Bills of Materials (CBOMs).**
//!
//! `cbom-tools` discovers X.509 certificates and PKCS #7 bundles inside a
//! directory tree (for example an extracted container image layer), assembles
//! them into a deduplicated dependency graph of cryptographic assets, and
//! writes that graph as `CycloneDX` 1.6 `cryptographic-asset` components.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: the asset sum type ([`Asset`]: certificate, algorithm,
//!   related material), its CycloneDX property enums and the seeded
//!   [`BomRefGenerator`] that makes identifiers reproducible.
//! - **[`graph`]**: the [`AssetGraph`] arena, the [`MergeEngine`] that folds
//!   per-certificate subgraphs into one graph while collapsing equivalent
//!   algorithms and duplicate certificates, and the flattener that turns the
//!   graph into document records.
//! - **[`scanner`]**: certificate decoding, OID classification, the
//!   [`SubgraphBuilder`] and the [`CertificatesPlugin`] that drives a scan.
//! - **[`provider`]**: the [`Filesystem`] abstraction and a plain directory
//!   implementation.
//! - **[`document`]**: the typed `CycloneDX` document with JSON I/O.
//! - **[`pipeline`]**: load → scan → write stages used by the CLI.
//!
//! ## Getting Started
//!
//! ```no_run
//! use cbom_tools::{Bom, CertificatesPlugin, PlainFilesystem, Plugin, WalkOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fs = PlainFilesystem::new("path/to/rootfs", WalkOptions::default())?;
//!     let mut bom = Bom::skeleton();
//!     let report = CertificatesPlugin::new().update_bom(&fs, &mut bom)?;
//!
//!     println!(
//!         "Found {} certificates, added {} components",
//!         report.certificates_found, report.components_added
//!     );
//!     println!("{}", cbom_tools::document::to_json(&bom, true)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Building a graph by hand
//!
//! ```
//! use cbom_tools::{AlgorithmAsset, AssetGraph, BomRefGenerator, MergeEngine, Primitive};
//!
//! let mut ids = BomRefGenerator::default();
//! let mut engine = MergeEngine::new();
//! for _ in 0..2 {
//!     let mut subgraph = AssetGraph::new();
//!     subgraph.add_node(AlgorithmAsset::new("RSA-SHA256", Primitive::Signature), &mut ids);
//!     engine.merge(subgraph)?;
//! }
//! assert_eq!(engine.graph().node_count(), 1);
//! # Ok::<(), cbom_tools::graph::MergeConflict>(())
//! ```

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    // Doc completeness: # Errors / # Panics sections are aspirational
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::struct_excessive_bools
)]

pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod graph;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod scanner;
pub mod utils;

// Re-export main types for convenience
pub use config::{AppConfig, AppConfigBuilder, BehaviorConfig, OutputConfig, ScanConfig};
pub use config::{ConfigError, Validatable};
pub use document::{parse_bom_str, Bom, Component, Dependency};
pub use error::{CbomError, ErrorContext, Result};
pub use graph::{flatten, AssetGraph, DependencyEdge, MergeConflict, MergeEngine, MergeStats};
pub use model::{
    AlgorithmAsset, Asset, AssetType, BomRef, BomRefGenerator, CertificateAsset, Primitive,
    RelatedMaterialAsset,
};
pub use provider::{Filesystem, PlainFilesystem, ScanError, WalkOptions};
pub use scanner::{CertificatesPlugin, Plugin, PluginType, ScanReport, SubgraphBuilder};
