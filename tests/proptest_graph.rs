//! Property-based tests for algorithm equivalence and the merge engine.
//!
//! Random subgraphs draw algorithms from a small pool so that collisions,
//! and with them deduplication and cross-subgraph cycles, are frequent.

use cbom_tools::model::{ExecutionEnvironment, ImplementationPlatform, Padding};
use cbom_tools::{AlgorithmAsset, AssetGraph, BomRef, BomRefGenerator, MergeEngine, Primitive};
use proptest::prelude::*;

const NAMES: [&str; 5] = ["RSA-SHA256", "RSA-2048", "ECDSA-SHA384", "EC-secp384r1", "Ed25519"];
const PRIMITIVES: [Primitive; 3] = [Primitive::Signature, Primitive::Pke, Primitive::Hash];

fn algorithm_strategy() -> impl Strategy<Value = AlgorithmAsset> {
    (0..NAMES.len(), 0..PRIMITIVES.len(), any::<bool>(), any::<bool>()).prop_map(
        |(name, primitive, with_oid, with_padding)| {
            let mut algorithm = AlgorithmAsset::new(NAMES[name], PRIMITIVES[primitive]);
            if with_oid {
                algorithm = algorithm.with_oid("1.2.840.113549.1.1.11");
            }
            if with_padding {
                algorithm = algorithm.with_padding(Padding::Pkcs1v15);
            }
            algorithm
        },
    )
}

/// Algorithms plus candidate edges given as index pairs
fn subgraph_strategy() -> impl Strategy<Value = (Vec<AlgorithmAsset>, Vec<(usize, usize)>)> {
    prop::collection::vec(algorithm_strategy(), 1..6).prop_flat_map(|algorithms| {
        let n = algorithms.len();
        let edges = prop::collection::vec((0..n, 0..n), 0..8);
        (Just(algorithms), edges)
    })
}

/// Build a subgraph, silently dropping edges the graph itself refuses
fn build(
    algorithms: &[AlgorithmAsset],
    edges: &[(usize, usize)],
    ids: &mut BomRefGenerator,
) -> AssetGraph {
    let mut graph = AssetGraph::new();
    let refs: Vec<BomRef> = algorithms
        .iter()
        .map(|a| graph.add_node(a.clone(), ids))
        .collect();
    for &(from, to) in edges {
        let _ = graph.add_edge(&refs[from], &refs[to]);
    }
    graph
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn equivalence_is_reflexive_and_symmetric(a in algorithm_strategy(), b in algorithm_strategy()) {
        prop_assert!(a.is_equivalent(&a));
        prop_assert_eq!(a.is_equivalent(&b), b.is_equivalent(&a));
        prop_assert_eq!(a.is_equivalent(&b), a == b);
    }

    #[test]
    fn any_descriptive_change_breaks_equivalence(a in algorithm_strategy(), field in 0..4usize) {
        let changed = match field {
            0 => AlgorithmAsset { name: format!("{}-X", a.name), ..a.clone() },
            1 => a.clone().with_implementation_platform(ImplementationPlatform::S390x),
            2 => a.clone().with_execution_environment(ExecutionEnvironment::Hardware),
            _ => AlgorithmAsset { oid: Some("1.3.101.112".into()), ..a.clone() },
        };
        prop_assert!(!a.is_equivalent(&changed));
    }

    #[test]
    fn built_subgraphs_are_acyclic((algorithms, edges) in subgraph_strategy()) {
        let mut ids = BomRefGenerator::default();
        let graph = build(&algorithms, &edges, &mut ids);
        prop_assert!(graph.validate().is_ok());
    }

    #[test]
    fn merged_graph_stays_valid(
        subgraphs in prop::collection::vec(subgraph_strategy(), 1..6),
        seed in any::<u64>(),
    ) {
        let mut ids = BomRefGenerator::new(seed);
        let mut engine = MergeEngine::new();
        for (algorithms, edges) in &subgraphs {
            let before = engine.graph().content_hash();
            if engine.merge(build(algorithms, edges, &mut ids)).is_err() {
                prop_assert_eq!(engine.graph().content_hash(), before);
            }
            prop_assert!(engine.graph().validate().is_ok());
            prop_assert!(!engine.graph().has_duplicate_algorithms());
        }
    }

    #[test]
    fn merge_is_idempotent((algorithms, edges) in subgraph_strategy(), seed in any::<u64>()) {
        let mut ids = BomRefGenerator::new(seed);
        let graph = build(&algorithms, &edges, &mut ids);
        let mut engine = MergeEngine::new();
        // Equivalent algorithms joined by an edge collapse into a self-loop
        prop_assume!(engine.merge(graph.clone()).is_ok());
        let before = engine.graph().content_hash();

        let outcome = engine.merge(graph).expect("remerge succeeds");
        prop_assert!(outcome.is_noop());
        prop_assert_eq!(engine.graph().content_hash(), before);
    }

    #[test]
    fn every_equivalence_class_keeps_one_node((algorithms, _) in subgraph_strategy()) {
        let mut ids = BomRefGenerator::default();
        let mut engine = MergeEngine::new();
        for algorithm in &algorithms {
            let mut single = AssetGraph::new();
            single.add_node(algorithm.clone(), &mut ids);
            engine.merge(single).expect("isolated nodes never conflict");
        }

        let mut distinct: Vec<&AlgorithmAsset> = Vec::new();
        for algorithm in &algorithms {
            if !distinct.iter().any(|d| d.is_equivalent(algorithm)) {
                distinct.push(algorithm);
            }
        }
        prop_assert_eq!(engine.graph().node_count(), distinct.len());
        prop_assert_eq!(
            engine.stats().algorithms_deduplicated,
            algorithms.len() - distinct.len()
        );
    }
}
