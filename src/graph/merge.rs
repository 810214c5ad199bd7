//! Folding subgraphs into the running asset graph.
//!
//! A merge runs in two phases. Planning resolves every incoming node to its
//! canonical identifier (an equivalent algorithm or a certificate with the
//! same fingerprint, first seen wins), rewrites edges and payload references
//! through that substitution, and checks the result for dangling ends, clashing
//! identifiers and cycles. Only a plan that passes every check is committed, so
//! a rejected subgraph leaves the running graph untouched.

use super::{AssetGraph, DependencyEdge, MergeConflict};
use crate::model::{AlgorithmAsset, Asset, BomRef};
use indexmap::IndexSet;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Running totals across every merge performed by one engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    pub subgraphs_merged: usize,
    pub nodes_inserted: usize,
    pub edges_inserted: usize,
    pub algorithms_deduplicated: usize,
    pub certificates_deduplicated: usize,
}

/// What a single merge changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Incoming identifiers that now resolve to a different canonical node
    pub remapped: HashMap<BomRef, BomRef>,
    /// Identifiers of nodes added to the graph, in creation order
    pub inserted: Vec<BomRef>,
    pub edges_added: usize,
    pub paths_added: usize,
}

impl MergeOutcome {
    /// Identifier an incoming node resolves to after the merge
    #[must_use]
    pub fn canonical<'a>(&'a self, id: &'a BomRef) -> &'a BomRef {
        self.remapped.get(id).unwrap_or(id)
    }

    /// True if the merge did not change the graph
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.inserted.is_empty() && self.edges_added == 0 && self.paths_added == 0
    }
}

/// Owner of the global asset graph during a scan
#[derive(Debug, Default)]
pub struct MergeEngine {
    graph: AssetGraph,
    algorithm_index: HashMap<AlgorithmAsset, BomRef>,
    fingerprint_index: HashMap<String, BomRef>,
    stats: MergeStats,
}

/// Staged changes of one merge
#[derive(Default)]
struct MergePlan {
    remap: HashMap<BomRef, BomRef>,
    nodes: Vec<(BomRef, Asset)>,
    positions: HashMap<BomRef, usize>,
    absorbed: Vec<(BomRef, IndexSet<String>)>,
    edges: Vec<DependencyEdge>,
    algorithms_deduplicated: usize,
    certificates_deduplicated: usize,
}

impl MergePlan {
    fn resolve(&self, id: &BomRef) -> BomRef {
        self.remap.get(id).unwrap_or(id).clone()
    }

    fn stages(&self, id: &BomRef) -> bool {
        self.positions.contains_key(id)
    }
}

impl MergeEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn graph(&self) -> &AssetGraph {
        &self.graph
    }

    #[must_use]
    pub fn into_graph(self) -> AssetGraph {
        self.graph
    }

    #[must_use]
    pub const fn stats(&self) -> &MergeStats {
        &self.stats
    }

    /// Fold `subgraph` into the running graph.
    ///
    /// Merging a subgraph whose nodes are already present with identical
    /// payloads changes nothing.
    pub fn merge(&mut self, subgraph: AssetGraph) -> Result<MergeOutcome, MergeConflict> {
        let (nodes, edges) = subgraph.into_parts();

        let mut plan = self.resolve_canonical(&nodes);
        self.stage_nodes(nodes, &mut plan)?;
        self.stage_edges(edges, &mut plan)?;
        self.check_references(&plan)?;

        Ok(self.commit(plan))
    }

    /// Map each algorithm and certificate to the node that will represent it
    fn resolve_canonical(&self, nodes: &indexmap::IndexMap<BomRef, Asset>) -> MergePlan {
        let mut plan = MergePlan::default();
        let mut planned_algorithms: HashMap<&AlgorithmAsset, &BomRef> = HashMap::new();
        let mut planned_fingerprints: HashMap<&str, &BomRef> = HashMap::new();

        for (id, asset) in nodes {
            match asset {
                Asset::Algorithm(algorithm) => {
                    let canonical = self
                        .algorithm_index
                        .get(algorithm)
                        .or_else(|| planned_algorithms.get(algorithm).copied());
                    match canonical {
                        Some(canonical) => {
                            if canonical != id {
                                plan.algorithms_deduplicated += 1;
                            }
                            plan.remap.insert(id.clone(), canonical.clone());
                        }
                        None => {
                            planned_algorithms.insert(algorithm, id);
                        }
                    }
                }
                Asset::Certificate(certificate) => {
                    let fingerprint = certificate.fingerprint.as_str();
                    let canonical = self
                        .fingerprint_index
                        .get(fingerprint)
                        .or_else(|| planned_fingerprints.get(fingerprint).copied());
                    match canonical {
                        Some(canonical) => {
                            if canonical != id {
                                plan.certificates_deduplicated += 1;
                            }
                            plan.remap.insert(id.clone(), canonical.clone());
                        }
                        None => {
                            planned_fingerprints.insert(fingerprint, id);
                        }
                    }
                }
                Asset::RelatedMaterial(_) => {}
            }
        }
        plan
    }

    /// Rewrite payload references and decide which nodes get inserted
    fn stage_nodes(
        &self,
        nodes: indexmap::IndexMap<BomRef, Asset>,
        plan: &mut MergePlan,
    ) -> Result<(), MergeConflict> {
        for (id, mut asset) in nodes {
            if let Some(canonical) = plan.remap.get(&id).cloned() {
                if let Asset::Certificate(duplicate) = asset {
                    self.stage_paths(canonical, duplicate.paths, plan);
                }
                continue;
            }

            asset.rewrite_references(&plan.remap);
            if let Some(existing) = self.graph.node(&id) {
                if *existing == asset {
                    continue;
                }
                return Err(MergeConflict::IdentifierClash(id));
            }
            plan.positions.insert(id.clone(), plan.nodes.len());
            plan.nodes.push((id, asset));
        }
        Ok(())
    }

    /// Route the paths of a collapsed certificate to its canonical node
    fn stage_paths(&self, canonical: BomRef, paths: IndexSet<String>, plan: &mut MergePlan) {
        if let Some(&pos) = plan.positions.get(&canonical) {
            if let Asset::Certificate(target) = &mut plan.nodes[pos].1 {
                target.absorb_paths(paths.iter());
            }
            return;
        }
        let known = self
            .graph
            .node(&canonical)
            .and_then(Asset::as_certificate)
            .map(|c| &c.paths);
        if known.is_some_and(|known| paths.iter().all(|p| known.contains(p))) {
            return;
        }
        plan.absorbed.push((canonical, paths));
    }

    /// Rewrite edges through the substitution and check each stays acyclic
    fn stage_edges(
        &self,
        edges: IndexSet<DependencyEdge>,
        plan: &mut MergePlan,
    ) -> Result<(), MergeConflict> {
        let mut staged: HashSet<DependencyEdge> = HashSet::new();
        let mut staged_outgoing: HashMap<BomRef, Vec<BomRef>> = HashMap::new();

        for edge in edges {
            let from = plan.resolve(&edge.from);
            let to = plan.resolve(&edge.to);

            for end in [&from, &to] {
                if !self.graph.contains(end) && !plan.stages(end) {
                    return Err(MergeConflict::DanglingEdge {
                        from: from.clone(),
                        to: to.clone(),
                    });
                }
            }

            let edge = DependencyEdge::new(from, to);
            if self.graph.contains_edge(&edge) || staged.contains(&edge) {
                continue;
            }
            if edge.from == edge.to || self.reaches_with(&staged_outgoing, &edge.to, &edge.from) {
                return Err(MergeConflict::Cycle {
                    from: edge.from,
                    to: edge.to,
                });
            }

            staged_outgoing
                .entry(edge.from.clone())
                .or_default()
                .push(edge.to.clone());
            staged.insert(edge.clone());
            plan.edges.push(edge);
        }
        Ok(())
    }

    /// Every payload reference of a staged node must resolve after commit
    fn check_references(&self, plan: &MergePlan) -> Result<(), MergeConflict> {
        for (id, asset) in &plan.nodes {
            for target in asset.references() {
                if !self.graph.contains(target) && !plan.stages(target) {
                    return Err(MergeConflict::DanglingReference {
                        owner: id.clone(),
                        target: target.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Reachability over the committed graph plus the staged edges
    fn reaches_with(
        &self,
        staged: &HashMap<BomRef, Vec<BomRef>>,
        from: &BomRef,
        to: &BomRef,
    ) -> bool {
        let mut stack = vec![from];
        let mut seen = HashSet::from([from]);
        while let Some(current) = stack.pop() {
            let pending = staged.get(current).map_or(&[][..], Vec::as_slice);
            for next in self.graph.dependencies_of(current).iter().chain(pending) {
                if next == to {
                    return true;
                }
                if seen.insert(next) {
                    stack.push(next);
                }
            }
        }
        false
    }

    fn commit(&mut self, plan: MergePlan) -> MergeOutcome {
        let mut outcome = MergeOutcome {
            remapped: plan
                .remap
                .into_iter()
                .filter(|(from, to)| from != to)
                .collect(),
            ..MergeOutcome::default()
        };

        for (canonical, paths) in plan.absorbed {
            if let Some(Asset::Certificate(existing)) = self.graph.node_mut(&canonical) {
                outcome.paths_added += existing.absorb_paths(paths.iter());
            }
        }

        for (id, asset) in plan.nodes {
            match &asset {
                Asset::Algorithm(algorithm) => {
                    self.algorithm_index.insert(algorithm.clone(), id.clone());
                }
                Asset::Certificate(certificate) => {
                    self.fingerprint_index
                        .insert(certificate.fingerprint.clone(), id.clone());
                }
                Asset::RelatedMaterial(_) => {}
            }
            self.graph.insert_node(id.clone(), asset);
            outcome.inserted.push(id);
        }

        for edge in plan.edges {
            if self.graph.insert_edge(edge) {
                outcome.edges_added += 1;
            }
        }

        self.stats.subgraphs_merged += 1;
        self.stats.nodes_inserted += outcome.inserted.len();
        self.stats.edges_inserted += outcome.edges_added;
        self.stats.algorithms_deduplicated += plan.algorithms_deduplicated;
        self.stats.certificates_deduplicated += plan.certificates_deduplicated;
        outcome
    }
}
