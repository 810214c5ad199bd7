//! Certificate file decoding.
//!
//! Turns the raw bytes of a certificate-family or PKCS #7-family file into
//! [`DecodedCertificate`] values. Decoding knows nothing about the graph; it
//! extracts exactly the fields the subgraph builder needs.

use super::pkcs7::{self, EnvelopeError};
use crate::utils::sha256_hex;
use chrono::{DateTime, Utc};
use std::path::Path;
use thiserror::Error;
use x509_parser::parse_x509_certificate;
use x509_parser::pem::Pem;
use x509_parser::public_key::PublicKey;
use x509_parser::x509::SubjectPublicKeyInfo;

const CERTIFICATE_LABEL: &str = "CERTIFICATE";

/// Certificate-family extensions recognized by default
pub const DEFAULT_CERTIFICATE_EXTENSIONS: &[&str] =
    &[".pem", ".cer", ".cert", ".der", ".ca-bundle", ".crt"];
/// PKCS #7-family extensions recognized by default
pub const DEFAULT_PKCS7_EXTENSIONS: &[&str] = &[".p7a", ".p7b", ".p7c", ".p7r", ".p7s", ".spc"];

/// How a file's content is framed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileClass {
    /// PEM certificates or a single DER certificate
    Certificate,
    /// PKCS #7 `SignedData`, PEM-wrapped or raw DER
    Pkcs7,
}

impl FileClass {
    /// Classify by the default extension lists
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        FileClassifier::default().classify(path)
    }
}

/// Extension-based file dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileClassifier {
    certificate: Vec<String>,
    pkcs7: Vec<String>,
}

impl FileClassifier {
    /// Build from extension lists such as `[".pem", ".crt"]`
    #[must_use]
    pub fn new(certificate: &[String], pkcs7: &[String]) -> Self {
        let normalize = |list: &[String]| list.iter().map(|e| e.to_lowercase()).collect::<Vec<_>>();
        Self {
            certificate: normalize(certificate),
            pkcs7: normalize(pkcs7),
        }
    }

    /// Class of a file, matched case-insensitively on its name's suffix
    #[must_use]
    pub fn classify(&self, path: &Path) -> Option<FileClass> {
        let name = path.file_name()?.to_str()?.to_lowercase();
        let matches =
            |exts: &[String]| exts.iter().any(|e| name.len() > e.len() && name.ends_with(e.as_str()));
        if matches(&self.certificate) {
            Some(FileClass::Certificate)
        } else if matches(&self.pkcs7) {
            Some(FileClass::Pkcs7)
        } else {
            None
        }
    }
}

impl Default for FileClassifier {
    fn default() -> Self {
        let owned = |list: &[&str]| list.iter().map(|e| (*e).to_string()).collect::<Vec<_>>();
        Self::new(
            &owned(DEFAULT_CERTIFICATE_EXTENSIONS),
            &owned(DEFAULT_PKCS7_EXTENSIONS),
        )
    }
}

/// Subject public key details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyInfo {
    pub algorithm_oid: String,
    /// Named curve for EC keys
    pub parameters_oid: Option<String>,
    pub key_size_bits: Option<usize>,
}

/// Fields of one X.509 certificate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedCertificate {
    pub subject: String,
    pub common_name: Option<String>,
    pub issuer: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    pub serial: String,
    pub signature_algorithm_oid: String,
    pub public_key: PublicKeyInfo,
    /// Lowercase hex SHA-256 of the DER encoding
    pub fingerprint: String,
}

impl DecodedCertificate {
    /// Common name, falling back to the full subject
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.common_name.as_deref().unwrap_or(&self.subject)
    }
}

/// Everything decoded from one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedFile {
    pub certificates: Vec<DecodedCertificate>,
    /// Labels of PEM blocks that were not certificates
    pub skipped_blocks: Vec<String>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    #[error("malformed PEM: {0}")]
    Pem(String),

    #[error("invalid X.509 certificate: {0}")]
    X509(String),

    #[error("invalid PKCS #7 envelope: {0}")]
    Pkcs7(#[from] EnvelopeError),

    #[error("validity time out of range")]
    Validity,
}

/// Decode a file's content according to its class
pub fn decode(bytes: &[u8], class: FileClass) -> Result<DecodedFile, DecodeError> {
    match class {
        FileClass::Certificate => decode_certificate_file(bytes),
        FileClass::Pkcs7 => decode_pkcs7_file(bytes),
    }
}

/// PEM blocks in order, or the whole input as one DER certificate when it
/// holds no PEM block at all
fn decode_certificate_file(bytes: &[u8]) -> Result<DecodedFile, DecodeError> {
    let blocks = pem_blocks(bytes)?;
    if blocks.is_empty() {
        return Ok(DecodedFile {
            certificates: vec![decode_der(bytes)?],
            skipped_blocks: Vec::new(),
        });
    }

    let mut decoded = DecodedFile::default();
    for block in blocks {
        if block.label == CERTIFICATE_LABEL {
            decoded.certificates.push(decode_der(&block.contents)?);
        } else {
            decoded.skipped_blocks.push(block.label);
        }
    }
    Ok(decoded)
}

/// PEM-wrapped (any label) or raw BER/DER `ContentInfo`
fn decode_pkcs7_file(bytes: &[u8]) -> Result<DecodedFile, DecodeError> {
    let mut blocks = pem_blocks(bytes)?;
    let owned;
    let envelope = if blocks.is_empty() {
        bytes
    } else {
        owned = blocks.swap_remove(0).contents;
        owned.as_slice()
    };

    let certificates = pkcs7::pkcs7_certificates(envelope)?
        .into_iter()
        .map(decode_der)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(DecodedFile {
        certificates,
        skipped_blocks: Vec::new(),
    })
}

fn pem_blocks(bytes: &[u8]) -> Result<Vec<Pem>, DecodeError> {
    if !looks_like_pem(bytes) {
        return Ok(Vec::new());
    }
    Pem::iter_from_buffer(bytes)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| DecodeError::Pem(e.to_string()))
}

fn looks_like_pem(bytes: &[u8]) -> bool {
    bytes.windows(11).any(|w| w == b"-----BEGIN ")
}

/// Decode one DER certificate
pub fn decode_der(der: &[u8]) -> Result<DecodedCertificate, DecodeError> {
    let (rest, cert) =
        parse_x509_certificate(der).map_err(|e| DecodeError::X509(e.to_string()))?;
    let encoded = &der[..der.len() - rest.len()];

    let validity = cert.validity();
    let not_before =
        DateTime::from_timestamp(validity.not_before.timestamp(), 0).ok_or(DecodeError::Validity)?;
    let not_after =
        DateTime::from_timestamp(validity.not_after.timestamp(), 0).ok_or(DecodeError::Validity)?;

    let common_name = cert
        .subject()
        .iter_common_name()
        .next()
        .and_then(|cn| cn.as_str().ok())
        .map(str::to_string);

    Ok(DecodedCertificate {
        subject: cert.subject().to_string(),
        common_name,
        issuer: cert.issuer().to_string(),
        not_before,
        not_after,
        serial: cert.raw_serial_as_string(),
        signature_algorithm_oid: cert.signature_algorithm.algorithm.to_id_string(),
        public_key: public_key_info(cert.public_key()),
        fingerprint: sha256_hex(encoded),
    })
}

fn public_key_info(spki: &SubjectPublicKeyInfo<'_>) -> PublicKeyInfo {
    let algorithm_oid = spki.algorithm.algorithm.to_id_string();
    let parameters = spki.algorithm.parameters.as_ref();
    let parameters_oid = parameters
        .and_then(|p| p.as_oid().ok())
        .map(|oid| oid.to_id_string());

    let key_size_bits = match spki.parsed() {
        Ok(PublicKey::RSA(rsa)) => Some(rsa.key_size()),
        Ok(PublicKey::EC(point)) => Some(point.key_size()),
        // DSA domain parameters are SEQUENCE { p, q, g }
        Ok(PublicKey::DSA(_)) => parameters.and_then(|p| pkcs7::leading_integer_bits(p.data)),
        _ => None,
    }
    .filter(|&bits| bits > 0);

    PublicKeyInfo {
        algorithm_oid,
        parameters_oid,
        key_size_bits,
    }
}
