//! Certificate discovery and subgraph construction.
//!
//! Decoding turns file bytes into certificate fields, classification maps
//! algorithm OIDs to algorithm assets, and the builder wires one certificate
//! and its algorithms into a subgraph for the merge engine.

pub mod algorithms;
mod builder;
mod certificates;
pub mod decode;
mod pkcs7;
mod report;
mod traits;

pub use algorithms::{classify_public_key, classify_signature, AlgorithmDefaults};
pub use builder::{AlgorithmRole, CertificateSubgraph, SubgraphBuilder, UnknownAlgorithm};
pub use certificates::{CertificatesPlugin, PLUGIN_NAME};
pub use decode::{
    decode, decode_der, DecodeError, DecodedCertificate, DecodedFile, FileClass, FileClassifier,
    PublicKeyInfo,
};
pub use pkcs7::EnvelopeError;
pub use report::{ScanReport, ScanWarning, WarningKind};
pub use traits::{Plugin, PluginType};
