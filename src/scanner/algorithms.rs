//! OID classification for signature and public-key algorithms.

use super::decode::PublicKeyInfo;
use crate::model::{
    AlgorithmAsset, CertificationLevel, ExecutionEnvironment, ImplementationPlatform, Padding,
    Primitive,
};

/// Descriptive fields shared by every algorithm a scan creates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmDefaults {
    pub execution_environment: ExecutionEnvironment,
    pub implementation_platform: ImplementationPlatform,
    pub certification_levels: Vec<CertificationLevel>,
}

impl Default for AlgorithmDefaults {
    fn default() -> Self {
        Self {
            execution_environment: ExecutionEnvironment::SoftwarePlainRam,
            implementation_platform: ImplementationPlatform::Unknown,
            certification_levels: vec![CertificationLevel::None],
        }
    }
}

impl AlgorithmDefaults {
    fn apply(&self, algorithm: AlgorithmAsset) -> AlgorithmAsset {
        algorithm
            .with_execution_environment(self.execution_environment)
            .with_implementation_platform(self.implementation_platform)
            .with_certification_levels(self.certification_levels.clone())
    }
}

struct SignatureEntry {
    oid: &'static str,
    name: &'static str,
    padding: Option<Padding>,
}

const fn sig(oid: &'static str, name: &'static str, padding: Option<Padding>) -> SignatureEntry {
    SignatureEntry { oid, name, padding }
}

const PKCS1: Option<Padding> = Some(Padding::Pkcs1v15);

static SIGNATURE_ALGORITHMS: &[SignatureEntry] = &[
    sig("1.2.840.113549.1.1.4", "RSA-MD5", PKCS1),
    sig("1.2.840.113549.1.1.5", "RSA-SHA1", PKCS1),
    sig("1.2.840.113549.1.1.14", "RSA-SHA224", PKCS1),
    sig("1.2.840.113549.1.1.11", "RSA-SHA256", PKCS1),
    sig("1.2.840.113549.1.1.12", "RSA-SHA384", PKCS1),
    sig("1.2.840.113549.1.1.13", "RSA-SHA512", PKCS1),
    sig("1.2.840.113549.1.1.10", "RSASSA-PSS", Some(Padding::Other)),
    sig("1.2.840.10045.4.1", "ECDSA-SHA1", None),
    sig("1.2.840.10045.4.3.1", "ECDSA-SHA224", None),
    sig("1.2.840.10045.4.3.2", "ECDSA-SHA256", None),
    sig("1.2.840.10045.4.3.3", "ECDSA-SHA384", None),
    sig("1.2.840.10045.4.3.4", "ECDSA-SHA512", None),
    sig("1.2.840.10040.4.3", "DSA-SHA1", None),
    sig("2.16.840.1.101.3.4.3.2", "DSA-SHA256", None),
    sig("1.3.101.112", "Ed25519", None),
    sig("1.3.101.113", "Ed448", None),
    sig("2.16.840.1.101.3.4.3.17", "ML-DSA-44", None),
    sig("2.16.840.1.101.3.4.3.18", "ML-DSA-65", None),
    sig("2.16.840.1.101.3.4.3.19", "ML-DSA-87", None),
];

/// How a public-key algorithm is named
#[derive(Clone, Copy)]
enum KeyNaming {
    /// Fixed name
    Fixed(&'static str),
    /// Prefix followed by the key size in bits
    Sized(&'static str),
    /// Named curve from the algorithm parameters
    Curve,
}

struct KeyEntry {
    oid: &'static str,
    naming: KeyNaming,
    primitive: Primitive,
}

const fn key(oid: &'static str, naming: KeyNaming, primitive: Primitive) -> KeyEntry {
    KeyEntry {
        oid,
        naming,
        primitive,
    }
}

static PUBLIC_KEY_ALGORITHMS: &[KeyEntry] = &[
    key("1.2.840.113549.1.1.1", KeyNaming::Sized("RSA"), Primitive::Pke),
    key("1.2.840.113549.1.1.10", KeyNaming::Sized("RSASSA-PSS"), Primitive::Signature),
    key("1.2.840.10045.2.1", KeyNaming::Curve, Primitive::Signature),
    key("1.2.840.10040.4.1", KeyNaming::Sized("DSA"), Primitive::Signature),
    key("1.3.101.112", KeyNaming::Fixed("Ed25519"), Primitive::Signature),
    key("1.3.101.113", KeyNaming::Fixed("Ed448"), Primitive::Signature),
    key("1.3.101.110", KeyNaming::Fixed("X25519"), Primitive::KeyAgree),
    key("1.3.101.111", KeyNaming::Fixed("X448"), Primitive::KeyAgree),
    key("2.16.840.1.101.3.4.3.17", KeyNaming::Fixed("ML-DSA-44"), Primitive::Signature),
    key("2.16.840.1.101.3.4.3.18", KeyNaming::Fixed("ML-DSA-65"), Primitive::Signature),
    key("2.16.840.1.101.3.4.3.19", KeyNaming::Fixed("ML-DSA-87"), Primitive::Signature),
    key("2.16.840.1.101.3.4.4.1", KeyNaming::Fixed("ML-KEM-512"), Primitive::Kem),
    key("2.16.840.1.101.3.4.4.2", KeyNaming::Fixed("ML-KEM-768"), Primitive::Kem),
    key("2.16.840.1.101.3.4.4.3", KeyNaming::Fixed("ML-KEM-1024"), Primitive::Kem),
];

static NAMED_CURVES: &[(&str, &str)] = &[
    ("1.2.840.10045.3.1.7", "secp256r1"),
    ("1.3.132.0.34", "secp384r1"),
    ("1.3.132.0.35", "secp521r1"),
    ("1.3.132.0.10", "secp256k1"),
];

/// Algorithm for a certificate signature OID, or `None` if unrecognized
#[must_use]
pub fn classify_signature(oid: &str, defaults: &AlgorithmDefaults) -> Option<AlgorithmAsset> {
    let entry = SIGNATURE_ALGORITHMS.iter().find(|e| e.oid == oid)?;
    let mut algorithm = AlgorithmAsset::new(entry.name, Primitive::Signature).with_oid(oid);
    algorithm.padding = entry.padding;
    Some(defaults.apply(algorithm))
}

/// Algorithm for a subject public key, or `None` if unrecognized
#[must_use]
pub fn classify_public_key(
    key: &PublicKeyInfo,
    defaults: &AlgorithmDefaults,
) -> Option<AlgorithmAsset> {
    let oid = key.algorithm_oid.as_str();
    let entry = PUBLIC_KEY_ALGORITHMS.iter().find(|e| e.oid == oid)?;
    let name = match entry.naming {
        KeyNaming::Fixed(name) => name.to_string(),
        KeyNaming::Sized(prefix) => match key.key_size_bits {
            Some(bits) => format!("{prefix}-{bits}"),
            None => prefix.to_string(),
        },
        KeyNaming::Curve => {
            let curve = key
                .parameters_oid
                .as_deref()
                .and_then(|p| NAMED_CURVES.iter().find(|(o, _)| *o == p))
                .map(|(_, name)| *name);
            match curve {
                Some(curve) => format!("EC-{curve}"),
                None => "EC".to_string(),
            }
        }
    };
    let algorithm = AlgorithmAsset::new(name, entry.primitive).with_oid(oid);
    Some(defaults.apply(algorithm))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CryptoFunction;

    fn public_key(oid: &str, parameters: Option<&str>, bits: Option<usize>) -> PublicKeyInfo {
        PublicKeyInfo {
            algorithm_oid: oid.to_string(),
            parameters_oid: parameters.map(str::to_string),
            key_size_bits: bits,
        }
    }

    #[test]
    fn test_signature_table() {
        let defaults = AlgorithmDefaults::default();
        let rsa = classify_signature("1.2.840.113549.1.1.11", &defaults).unwrap();
        assert_eq!(rsa.name, "RSA-SHA256");
        assert_eq!(rsa.padding, Some(Padding::Pkcs1v15));
        assert_eq!(rsa.crypto_functions, vec![CryptoFunction::Sign, CryptoFunction::Verify]);
        assert_eq!(rsa.certification_levels, vec![CertificationLevel::None]);

        let ecdsa = classify_signature("1.2.840.10045.4.3.3", &defaults).unwrap();
        assert_eq!(ecdsa.name, "ECDSA-SHA384");
        assert_eq!(ecdsa.padding, None);

        let mldsa = classify_signature("2.16.840.1.101.3.4.3.18", &defaults).unwrap();
        assert_eq!(mldsa.name, "ML-DSA-65");

        assert!(classify_signature("1.2.3.4", &defaults).is_none());
    }

    #[test]
    fn test_public_key_names() {
        let defaults = AlgorithmDefaults::default();
        let name = |info: PublicKeyInfo| classify_public_key(&info, &defaults).map(|a| a.name);

        assert_eq!(
            name(public_key("1.2.840.113549.1.1.1", None, Some(2048))).as_deref(),
            Some("RSA-2048")
        );
        assert_eq!(
            name(public_key("1.2.840.113549.1.1.1", None, None)).as_deref(),
            Some("RSA")
        );
        assert_eq!(
            name(public_key("1.2.840.10045.2.1", Some("1.3.132.0.34"), Some(384))).as_deref(),
            Some("EC-secp384r1")
        );
        assert_eq!(
            name(public_key("1.2.840.10045.2.1", Some("1.2.3"), None)).as_deref(),
            Some("EC")
        );
        assert_eq!(
            name(public_key("1.2.840.10040.4.1", None, Some(3072))).as_deref(),
            Some("DSA-3072")
        );
        assert_eq!(
            name(public_key("1.3.101.110", None, None)).as_deref(),
            Some("X25519")
        );
        assert_eq!(name(public_key("1.2.3.4", None, None)), None);
    }

    #[test]
    fn test_primitives() {
        let defaults = AlgorithmDefaults::default();
        let kem = classify_public_key(&public_key("2.16.840.1.101.3.4.4.2", None, None), &defaults)
            .unwrap();
        assert_eq!(kem.primitive, Primitive::Kem);
        assert_eq!(kem.name, "ML-KEM-768");

        let x448 = classify_public_key(&public_key("1.3.101.111", None, None), &defaults).unwrap();
        assert_eq!(x448.primitive, Primitive::KeyAgree);
    }

    #[test]
    fn test_ed25519_signature_and_key_are_equivalent() {
        let defaults = AlgorithmDefaults::default();
        let sig = classify_signature("1.3.101.112", &defaults).unwrap();
        let key = classify_public_key(&public_key("1.3.101.112", None, None), &defaults).unwrap();
        assert!(sig.is_equivalent(&key));
    }

    #[test]
    fn test_defaults_applied() {
        let defaults = AlgorithmDefaults {
            implementation_platform: ImplementationPlatform::Armv8A,
            ..AlgorithmDefaults::default()
        };
        let alg = classify_signature("1.3.101.113", &defaults).unwrap();
        assert_eq!(alg.implementation_platform, ImplementationPlatform::Armv8A);
        assert_eq!(alg.execution_environment, ExecutionEnvironment::SoftwarePlainRam);
    }
}
