#![no_main]
use cbom_tools::scanner::decode::{decode, FileClass};
use cbom_tools::{BomRefGenerator, SubgraphBuilder};
use libfuzzer_sys::fuzz_target;

/// Fuzz PEM/DER certificate decoding and subgraph construction.
///
/// Every certificate that decodes is also turned into a subgraph, which must
/// always be structurally valid.
fuzz_target!(|data: &[u8]| {
    if let Ok(decoded) = decode(data, FileClass::Certificate) {
        let builder = SubgraphBuilder::default();
        let mut ids = BomRefGenerator::default();
        for certificate in &decoded.certificates {
            let subgraph = builder.build(certificate, "fuzz.pem", &mut ids);
            assert!(subgraph.graph.validate().is_ok());
        }
    }
});
