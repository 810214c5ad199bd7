//! PKCS #7 `SignedData` envelope walking.
//!
//! Envelopes are read as BER through `der_parser` (re-exported by
//! `x509-parser`), so streamed CMS output with indefinite lengths is accepted
//! alongside plain DER. Only the structure down to the certificate set is
//! visited; each certificate's encoding is handed to the X.509 parser as-is.

use thiserror::Error;
use x509_parser::der_parser::asn1_rs::Any;
use x509_parser::der_parser::ber::{parse_ber_any, Class, Tag};

const SIGNED_DATA_OID: &str = "1.2.840.113549.1.7.2";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EnvelopeError {
    #[error("malformed BER: {0}")]
    Ber(String),

    #[error("expected {expected}, found {found}")]
    UnexpectedElement { expected: &'static str, found: String },

    #[error("content type {0} is not PKCS #7 signedData")]
    NotSignedData(String),
}

/// One element and its full encoding, header included
struct Element<'a> {
    any: Any<'a>,
    raw: &'a [u8],
}

fn read_element(input: &[u8]) -> Result<(Element<'_>, &[u8]), EnvelopeError> {
    let (rest, any) = parse_ber_any(input).map_err(|e| EnvelopeError::Ber(e.to_string()))?;
    let raw = &input[..input.len() - rest.len()];
    Ok((Element { any, raw }, rest))
}

/// Elements packed in the content of a constructed value
fn elements(mut content: &[u8]) -> impl Iterator<Item = Result<Element<'_>, EnvelopeError>> {
    std::iter::from_fn(move || {
        if content.is_empty() {
            return None;
        }
        match read_element(content) {
            Ok((element, rest)) => {
                content = rest;
                Some(Ok(element))
            }
            Err(e) => {
                content = &[];
                Some(Err(e))
            }
        }
    })
}

fn describe(any: &Any<'_>) -> String {
    format!("{} [{}]", any.class(), any.tag().0)
}

fn expect_universal<'a>(
    any: Any<'a>,
    tag: Tag,
    expected: &'static str,
) -> Result<Any<'a>, EnvelopeError> {
    if any.class() == Class::Universal && any.tag() == tag {
        Ok(any)
    } else {
        Err(EnvelopeError::UnexpectedElement {
            expected,
            found: describe(&any),
        })
    }
}

fn is_context_zero(any: &Any<'_>) -> bool {
    any.class() == Class::ContextSpecific && any.tag() == Tag(0)
}

/// Encodings of every X.509 certificate in a PKCS #7 `SignedData` envelope.
///
/// Accepts definite and indefinite lengths. A `SignedData` without a
/// certificate set yields an empty list.
pub fn pkcs7_certificates(input: &[u8]) -> Result<Vec<&[u8]>, EnvelopeError> {
    let (content_info, _) = read_element(input)?;
    let content_info = expect_universal(content_info.any, Tag::Sequence, "ContentInfo SEQUENCE")?;

    let mut fields = elements(content_info.data);
    let content_type = fields.next().ok_or_else(|| EnvelopeError::UnexpectedElement {
        expected: "contentType",
        found: "end of ContentInfo".into(),
    })??;
    let content_type = expect_universal(content_type.any, Tag::Oid, "contentType OID")?
        .oid()
        .map_err(|e| EnvelopeError::Ber(e.to_string()))?
        .to_id_string();
    if content_type != SIGNED_DATA_OID {
        return Err(EnvelopeError::NotSignedData(content_type));
    }

    let explicit = fields.next().ok_or_else(|| EnvelopeError::UnexpectedElement {
        expected: "[0] content",
        found: "end of ContentInfo".into(),
    })??;
    if !is_context_zero(&explicit.any) {
        return Err(EnvelopeError::UnexpectedElement {
            expected: "[0] content",
            found: describe(&explicit.any),
        });
    }
    let (signed_data, _) = read_element(explicit.any.data)?;
    let signed_data = expect_universal(signed_data.any, Tag::Sequence, "SignedData SEQUENCE")?;

    // version, digestAlgorithms and encapContentInfo precede the optional
    // [0] IMPLICIT certificate set
    let mut certificates = Vec::new();
    for field in elements(signed_data.data) {
        let field = field?;
        if !is_context_zero(&field.any) {
            continue;
        }
        for choice in elements(field.any.data) {
            let choice = choice?;
            // Attribute and other certificate formats are not X.509
            if choice.any.class() == Class::Universal && choice.any.tag() == Tag::Sequence {
                certificates.push(choice.raw);
            }
        }
        break;
    }
    Ok(certificates)
}

/// Bit length of the first INTEGER inside a constructed value.
///
/// Used for DSA domain parameters, whose first member is the prime `p`.
pub fn leading_integer_bits(content: &[u8]) -> Option<usize> {
    let (first, _) = read_element(content).ok()?;
    if first.any.class() != Class::Universal || first.any.tag() != Tag::Integer {
        return None;
    }
    let magnitude = first.any.data;
    let skip = magnitude.iter().take_while(|&&b| b == 0).count();
    let magnitude = &magnitude[skip..];
    let top = *magnitude.first()?;
    Some((magnitude.len() - 1) * 8 + (8 - top.leading_zeros() as usize))
}
