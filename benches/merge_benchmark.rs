//! Benchmarks for certificate decoding and the merge engine.

use cbom_tools::scanner::decode::{decode, FileClass};
use cbom_tools::{
    AlgorithmAsset, AssetGraph, BomRefGenerator, CertificateAsset, MergeEngine, Primitive,
    SubgraphBuilder,
};
use chrono::{TimeZone, Utc};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use indexmap::IndexSet;
use std::hint::black_box;

const SERVER_PEM: &[u8] = include_bytes!("../tests/fixtures/two-pem/server.pem");
const BUNDLE_P7B: &[u8] = include_bytes!("../tests/fixtures/pkcs7/bundle.p7b");

const SIGNATURES: [&str; 4] = ["RSA-SHA256", "RSA-SHA384", "RSA-SHA512", "ECDSA-SHA256"];
const KEYS: [&str; 3] = ["RSA-2048", "RSA-4096", "EC-secp256r1"];

/// Certificate subgraph over a small algorithm pool, so most algorithms collapse
fn synthetic_subgraph(index: usize, ids: &mut BomRefGenerator) -> AssetGraph {
    let mut graph = AssetGraph::new();
    let signature = graph.add_node(
        AlgorithmAsset::new(SIGNATURES[index % SIGNATURES.len()], Primitive::Signature),
        ids,
    );
    let key = graph.add_node(
        AlgorithmAsset::new(KEYS[index % KEYS.len()], Primitive::Pke),
        ids,
    );
    let cert = graph.add_node(
        CertificateAsset {
            name: format!("host-{index}.example.test"),
            subject_name: format!("CN=host-{index}.example.test"),
            issuer_name: "CN=Example Root".into(),
            not_valid_before: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            not_valid_after: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            serial_number: format!("{index:02x}"),
            // Every tenth certificate repeats an earlier one
            fingerprint: format!("{:064x}", index - index / 10),
            paths: IndexSet::from([format!("certs/{index}.pem")]),
            signature_algorithm_ref: Some(signature.clone()),
            subject_public_key_ref: Some(key.clone()),
        },
        ids,
    );
    let _ = graph.add_edge(&cert, &signature);
    let _ = graph.add_edge(&cert, &key);
    graph
}

fn benchmark_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    group.bench_function("pem_certificate", |b| {
        b.iter(|| decode(black_box(SERVER_PEM), FileClass::Certificate))
    });
    group.bench_function("pkcs7_bundle", |b| {
        b.iter(|| decode(black_box(BUNDLE_P7B), FileClass::Pkcs7))
    });
    group.finish();
}

fn benchmark_build(c: &mut Criterion) {
    let decoded = decode(SERVER_PEM, FileClass::Certificate).unwrap();
    let certificate = &decoded.certificates[0];
    let builder = SubgraphBuilder::default();

    c.bench_function("build_subgraph", |b| {
        let mut ids = BomRefGenerator::default();
        b.iter(|| builder.build(black_box(certificate), "server.pem", &mut ids))
    });
}

fn benchmark_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");
    for count in [100usize, 1_000, 5_000] {
        let mut ids = BomRefGenerator::default();
        let subgraphs: Vec<AssetGraph> = (0..count)
            .map(|i| synthetic_subgraph(i, &mut ids))
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(count), &subgraphs, |b, subgraphs| {
            b.iter(|| {
                let mut engine = MergeEngine::new();
                for subgraph in subgraphs {
                    let _ = engine.merge(subgraph.clone());
                }
                black_box(engine.graph().node_count())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_decode, benchmark_build, benchmark_merge);
criterion_main!(benches);
