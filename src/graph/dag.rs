//! Arena graph of crypto assets.

use super::MergeConflict;
use crate::model::{AlgorithmAsset, Asset, AssetType, BomRef, BomRefGenerator, CertificateAsset};
use crate::utils::content_hash;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Directed "depends-on" relation between two nodes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub from: BomRef,
    pub to: BomRef,
}

impl DependencyEdge {
    #[must_use]
    pub fn new(from: BomRef, to: BomRef) -> Self {
        Self { from, to }
    }
}

/// Node and edge tallies of a graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphCounts {
    pub certificates: usize,
    pub algorithms: usize,
    pub related_material: usize,
    pub edges: usize,
}

/// Identifier-keyed arena of assets plus an insertion-ordered edge set.
///
/// Nodes and edges iterate in creation order. The public mutators keep every
/// edge endpoint resolvable and the graph acyclic; the crate-private ones are
/// used by the merge engine after it has checked a whole batch up front.
#[derive(Debug, Clone, Default)]
pub struct AssetGraph {
    nodes: IndexMap<BomRef, Asset>,
    edges: IndexSet<DependencyEdge>,
    outgoing: HashMap<BomRef, Vec<BomRef>>,
}

impl AssetGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a node under a fresh identifier drawn from `ids`
    pub fn add_node(&mut self, asset: impl Into<Asset>, ids: &mut BomRefGenerator) -> BomRef {
        let id = ids.next_ref();
        self.insert_node(id.clone(), asset.into());
        id
    }

    /// Add a dependency edge.
    ///
    /// Returns `Ok(false)` when the edge is already present. Fails when an
    /// endpoint is missing or the edge would close a cycle.
    pub fn add_edge(&mut self, from: &BomRef, to: &BomRef) -> Result<bool, MergeConflict> {
        if !self.contains(from) || !self.contains(to) {
            return Err(MergeConflict::DanglingEdge {
                from: from.clone(),
                to: to.clone(),
            });
        }
        if from == to || self.reaches(to, from) {
            return Err(MergeConflict::Cycle {
                from: from.clone(),
                to: to.clone(),
            });
        }
        Ok(self.insert_edge(DependencyEdge::new(from.clone(), to.clone())))
    }

    #[must_use]
    pub fn node(&self, id: &BomRef) -> Option<&Asset> {
        self.nodes.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &BomRef) -> bool {
        self.nodes.contains_key(id)
    }

    /// Nodes in creation order
    pub fn nodes(&self) -> impl Iterator<Item = (&BomRef, &Asset)> {
        self.nodes.iter()
    }

    /// Edges in insertion order
    pub fn edges(&self) -> impl Iterator<Item = &DependencyEdge> {
        self.edges.iter()
    }

    #[must_use]
    pub fn contains_edge(&self, edge: &DependencyEdge) -> bool {
        self.edges.contains(edge)
    }

    /// Direct dependencies of a node, in edge insertion order
    #[must_use]
    pub fn dependencies_of(&self, id: &BomRef) -> &[BomRef] {
        self.outgoing.get(id).map_or(&[], Vec::as_slice)
    }

    /// Nodes that directly depend on `id`
    #[must_use]
    pub fn dependents_of(&self, id: &BomRef) -> Vec<&BomRef> {
        self.edges
            .iter()
            .filter(|e| &e.to == id)
            .map(|e| &e.from)
            .collect()
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn counts(&self) -> GraphCounts {
        let mut counts = GraphCounts {
            edges: self.edges.len(),
            ..GraphCounts::default()
        };
        for asset in self.nodes.values() {
            match asset.asset_type() {
                AssetType::Certificate => counts.certificates += 1,
                AssetType::Algorithm => counts.algorithms += 1,
                _ => counts.related_material += 1,
            }
        }
        counts
    }

    /// Algorithm nodes in creation order
    pub fn algorithms(&self) -> impl Iterator<Item = (&BomRef, &AlgorithmAsset)> {
        self.nodes
            .iter()
            .filter_map(|(id, asset)| asset.as_algorithm().map(|a| (id, a)))
    }

    /// Certificate nodes in creation order
    pub fn certificates(&self) -> impl Iterator<Item = (&BomRef, &CertificateAsset)> {
        self.nodes
            .iter()
            .filter_map(|(id, asset)| asset.as_certificate().map(|c| (id, c)))
    }

    /// Whether `to` is reachable from `from` along dependency edges
    #[must_use]
    pub fn reaches(&self, from: &BomRef, to: &BomRef) -> bool {
        if from == to {
            return true;
        }
        let mut stack = vec![from];
        let mut seen = HashSet::from([from]);
        while let Some(current) = stack.pop() {
            for next in self.dependencies_of(current) {
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

    /// Check the structural invariants: resolvable edges and payload references,
    /// and no cycles.
    pub fn validate(&self) -> Result<(), MergeConflict> {
        for edge in &self.edges {
            if !self.contains(&edge.from) || !self.contains(&edge.to) {
                return Err(MergeConflict::DanglingEdge {
                    from: edge.from.clone(),
                    to: edge.to.clone(),
                });
            }
        }
        for (id, asset) in &self.nodes {
            if let Some(target) = asset.references().into_iter().find(|r| !self.contains(r)) {
                return Err(MergeConflict::DanglingReference {
                    owner: id.clone(),
                    target: target.clone(),
                });
            }
        }
        self.find_cycle().map_or(Ok(()), |edge| {
            Err(MergeConflict::Cycle {
                from: edge.from,
                to: edge.to,
            })
        })
    }

    /// True if two algorithm nodes hold equivalent payloads
    #[must_use]
    pub fn has_duplicate_algorithms(&self) -> bool {
        let algorithms: Vec<_> = self.algorithms().map(|(_, a)| a).collect();
        algorithms
            .iter()
            .enumerate()
            .any(|(i, a)| algorithms[i + 1..].iter().any(|b| a.is_equivalent(b)))
    }

    /// True if two certificate nodes share a fingerprint
    #[must_use]
    pub fn has_duplicate_certificates(&self) -> bool {
        let mut seen = HashSet::new();
        self.certificates()
            .any(|(_, c)| !seen.insert(c.fingerprint.as_str()))
    }

    /// Stable hash over nodes and edges, in order
    #[must_use]
    pub fn content_hash(&self) -> u64 {
        let bytes = serde_json::to_vec(&(&self.nodes, &self.edges)).unwrap_or_default();
        content_hash(&bytes)
    }

    // ========================================================================
    // Unchecked mutators for the merge engine and builder
    // ========================================================================

    pub(crate) fn insert_node(&mut self, id: BomRef, asset: Asset) {
        self.nodes.insert(id, asset);
    }

    pub(crate) fn insert_edge(&mut self, edge: DependencyEdge) -> bool {
        if self.edges.contains(&edge) {
            return false;
        }
        self.outgoing
            .entry(edge.from.clone())
            .or_default()
            .push(edge.to.clone());
        self.edges.insert(edge)
    }

    pub(crate) fn node_mut(&mut self, id: &BomRef) -> Option<&mut Asset> {
        self.nodes.get_mut(id)
    }

    pub(crate) fn into_parts(self) -> (IndexMap<BomRef, Asset>, IndexSet<DependencyEdge>) {
        (self.nodes, self.edges)
    }

    /// Some edge that lies on a cycle, if any
    fn find_cycle(&self) -> Option<DependencyEdge> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            Open,
            Done,
        }

        let mut marks: HashMap<&BomRef, Mark> = HashMap::new();
        for root in self.nodes.keys() {
            if marks.contains_key(root) {
                continue;
            }
            marks.insert(root, Mark::Open);
            let mut stack: Vec<(&BomRef, usize)> = vec![(root, 0)];
            while let Some((node, child)) = stack.last().copied() {
                let deps = self.dependencies_of(node);
                if child == deps.len() {
                    marks.insert(node, Mark::Done);
                    stack.pop();
                    continue;
                }
                if let Some(top) = stack.last_mut() {
                    top.1 += 1;
                }
                let next = &deps[child];
                match marks.get(next) {
                    Some(Mark::Open) => return Some(DependencyEdge::new(node.clone(), next.clone())),
                    Some(Mark::Done) => {}
                    None => {
                        marks.insert(next, Mark::Open);
                        stack.push((next, 0));
                    }
                }
            }
        }
        None
    }
}
