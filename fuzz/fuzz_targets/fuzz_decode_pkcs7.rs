#![no_main]
use cbom_tools::scanner::decode::{decode, FileClass};
use libfuzzer_sys::fuzz_target;

const PEM_HEADER: &str = "-----BEGIN PKCS7-----\n";
const PEM_FOOTER: &str = "\n-----END PKCS7-----\n";

/// Fuzz the PKCS #7 envelope walker.
///
/// Raw input exercises the DER path; UTF-8 input is also wrapped in PEM
/// armor to reach the base64 path.
fuzz_target!(|data: &[u8]| {
    let _ = decode(data, FileClass::Pkcs7);

    if let Ok(s) = std::str::from_utf8(data) {
        let wrapped = format!("{PEM_HEADER}{s}{PEM_FOOTER}");
        let _ = decode(wrapped.as_bytes(), FileClass::Pkcs7);
    }
});
