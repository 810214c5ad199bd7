//! Descriptive vocabularies for cryptographic assets.
//!
//! The string forms follow the `CycloneDX` 1.6 `cryptoProperties` schema, so the
//! same enums serve the in-memory graph and the serialized document. Every enum
//! carries an `Unknown` fallback that absorbs values written by other tools.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of cryptographic asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum AssetType {
    Algorithm,
    Certificate,
    Protocol,
    RelatedCryptoMaterial,
    #[serde(other)]
    Unknown,
}

impl AssetType {
    /// Wire name of the asset type
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Algorithm => "algorithm",
            Self::Certificate => "certificate",
            Self::Protocol => "protocol",
            Self::RelatedCryptoMaterial => "related-crypto-material",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cryptographic primitive class of an algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Primitive {
    Drbg,
    Mac,
    BlockCipher,
    StreamCipher,
    Signature,
    Hash,
    Pke,
    Xof,
    Kdf,
    KeyAgree,
    Kem,
    Ae,
    Combiner,
    Other,
    #[serde(other)]
    Unknown,
}

impl Primitive {
    /// Functions an algorithm of this class offers when nothing more specific is known
    #[must_use]
    pub fn default_functions(&self) -> Vec<CryptoFunction> {
        match self {
            Self::Signature => vec![CryptoFunction::Sign, CryptoFunction::Verify],
            Self::Pke | Self::BlockCipher | Self::StreamCipher | Self::Ae => {
                vec![CryptoFunction::Encrypt, CryptoFunction::Decrypt]
            }
            Self::Kem => vec![CryptoFunction::Encapsulate, CryptoFunction::Decapsulate],
            Self::KeyAgree | Self::Kdf => vec![CryptoFunction::Keyderive],
            Self::Hash | Self::Xof => vec![CryptoFunction::Digest],
            Self::Mac => vec![CryptoFunction::Tag],
            Self::Drbg => vec![CryptoFunction::Generate],
            Self::Combiner | Self::Other => vec![CryptoFunction::Other],
            Self::Unknown => vec![CryptoFunction::Unknown],
        }
    }
}

/// Where an algorithm implementation executes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionEnvironment {
    #[default]
    SoftwarePlainRam,
    SoftwareEncryptedRam,
    SoftwareTee,
    Hardware,
    Other,
    #[serde(other)]
    Unknown,
}

/// Target platform of an algorithm implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
pub enum ImplementationPlatform {
    #[serde(rename = "generic")]
    Generic,
    #[serde(rename = "x86_32")]
    X86_32,
    #[serde(rename = "x86_64")]
    X86_64,
    #[serde(rename = "armv7-a")]
    Armv7A,
    #[serde(rename = "armv7-m")]
    Armv7M,
    #[serde(rename = "armv8-a")]
    Armv8A,
    #[serde(rename = "armv8-m")]
    Armv8M,
    #[serde(rename = "armv9-a")]
    Armv9A,
    #[serde(rename = "armv9-m")]
    Armv9M,
    #[serde(rename = "s390x")]
    S390x,
    #[serde(rename = "ppc64")]
    Ppc64,
    #[serde(rename = "ppc64le")]
    Ppc64le,
    #[serde(rename = "other")]
    Other,
    #[default]
    #[serde(rename = "unknown", other)]
    Unknown,
}

impl ImplementationPlatform {
    const ALL: [Self; 14] = [
        Self::Generic,
        Self::X86_32,
        Self::X86_64,
        Self::Armv7A,
        Self::Armv7M,
        Self::Armv8A,
        Self::Armv8M,
        Self::Armv9A,
        Self::Armv9M,
        Self::S390x,
        Self::Ppc64,
        Self::Ppc64le,
        Self::Other,
        Self::Unknown,
    ];

    /// Wire name of the platform
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::X86_32 => "x86_32",
            Self::X86_64 => "x86_64",
            Self::Armv7A => "armv7-a",
            Self::Armv7M => "armv7-m",
            Self::Armv8A => "armv8-a",
            Self::Armv8M => "armv8-m",
            Self::Armv9A => "armv9-a",
            Self::Armv9M => "armv9-m",
            Self::S390x => "s390x",
            Self::Ppc64 => "ppc64",
            Self::Ppc64le => "ppc64le",
            Self::Other => "other",
            Self::Unknown => "unknown",
        }
    }

    /// Platform of the machine running the scan
    #[must_use]
    pub fn host() -> Self {
        match std::env::consts::ARCH {
            "x86" => Self::X86_32,
            "x86_64" => Self::X86_64,
            "arm" => Self::Armv7A,
            "aarch64" => Self::Armv8A,
            "s390x" => Self::S390x,
            "powerpc64" if cfg!(target_endian = "little") => Self::Ppc64le,
            "powerpc64" => Self::Ppc64,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for ImplementationPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImplementationPlatform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        if lower == "host" {
            return Ok(Self::host());
        }
        Self::ALL
            .iter()
            .find(|p| p.as_str() == lower)
            .copied()
            .ok_or_else(|| {
                let names: Vec<_> = Self::ALL.iter().map(Self::as_str).collect();
                format!(
                    "unknown implementation platform '{s}' (expected host or one of: {})",
                    names.join(", ")
                )
            })
    }
}

/// Certification an implementation holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum CertificationLevel {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "fips140-2-l1")]
    Fips140_2L1,
    #[serde(rename = "fips140-2-l2")]
    Fips140_2L2,
    #[serde(rename = "fips140-2-l3")]
    Fips140_2L3,
    #[serde(rename = "fips140-2-l4")]
    Fips140_2L4,
    #[serde(rename = "fips140-3-l1")]
    Fips140_3L1,
    #[serde(rename = "fips140-3-l2")]
    Fips140_3L2,
    #[serde(rename = "fips140-3-l3")]
    Fips140_3L3,
    #[serde(rename = "fips140-3-l4")]
    Fips140_3L4,
    #[serde(rename = "other")]
    Other,
    #[serde(rename = "unknown", other)]
    Unknown,
}

/// Operation an algorithm is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CryptoFunction {
    Generate,
    Keygen,
    Encrypt,
    Decrypt,
    Digest,
    Tag,
    Keyderive,
    Sign,
    Verify,
    Encapsulate,
    Decapsulate,
    Other,
    #[serde(other)]
    Unknown,
}

/// Padding scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Padding {
    Pkcs5,
    Pkcs7,
    Pkcs1v15,
    Oaep,
    Raw,
    Other,
    #[serde(other)]
    Unknown,
}

/// Type of related cryptographic material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RelatedMaterialType {
    PrivateKey,
    PublicKey,
    SecretKey,
    Key,
    Signature,
    Digest,
    Nonce,
    Salt,
    SharedSecret,
    Credential,
    Token,
    Other,
    #[serde(other)]
    Unknown,
}

impl RelatedMaterialType {
    /// Human-readable label used for component names
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::PrivateKey => "private key",
            Self::PublicKey => "public key",
            Self::SecretKey => "secret key",
            Self::Key => "key",
            Self::Signature => "signature",
            Self::Digest => "digest",
            Self::Nonce => "nonce",
            Self::Salt => "salt",
            Self::SharedSecret => "shared secret",
            Self::Credential => "credential",
            Self::Token => "token",
            Self::Other => "other material",
            Self::Unknown => "unknown material",
        }
    }
}
