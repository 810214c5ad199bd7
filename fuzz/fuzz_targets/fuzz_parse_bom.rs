#![no_main]
use cbom_tools::document::{parse_bom_str, to_json};
use libfuzzer_sys::fuzz_target;

const MAX_WRAPPED_INPUT_LEN: usize = 10_000;

/// Fuzz the CycloneDX document reader.
///
/// Anything that parses must serialize and parse again.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(bom) = parse_bom_str(s) {
            let json = to_json(&bom, false).expect("parsed documents serialize");
            assert!(parse_bom_str(&json).is_ok());
        }

        if s.len() < MAX_WRAPPED_INPUT_LEN {
            let wrapped = format!(
                r#"{{"bomFormat":"CycloneDX","specVersion":"1.6","components":[{s}]}}"#,
            );
            let _ = parse_bom_str(&wrapped);
        }
    }
});
