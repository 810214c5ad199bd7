//! Crypto asset dependency graph.
//!
//! [`AssetGraph`] is an arena keyed by [`BomRef`](crate::model::BomRef) with an
//! explicit, duplicate-free edge list. [`MergeEngine`] folds per-certificate
//! subgraphs into one running graph while keeping it deduplicated and acyclic,
//! and [`flatten`] turns the result into document components and dependency
//! records.

mod dag;
mod flatten;
mod merge;

pub use dag::{AssetGraph, DependencyEdge, GraphCounts};
pub use flatten::{flatten, merge_dependencies, AppendSummary, FlattenedBom};
pub use merge::{MergeEngine, MergeOutcome, MergeStats};

use crate::model::BomRef;
use thiserror::Error;

/// Reasons a subgraph cannot be folded into the running graph.
///
/// A merge that fails with any of these leaves the target graph unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MergeConflict {
    #[error("edge {from} -> {to} would introduce a cycle")]
    Cycle { from: BomRef, to: BomRef },

    #[error("edge {from} -> {to} references a node that does not exist")]
    DanglingEdge { from: BomRef, to: BomRef },

    #[error("node {owner} references {target}, which does not exist")]
    DanglingReference { owner: BomRef, target: BomRef },

    #[error("identifier {0} already holds a different asset")]
    IdentifierClash(BomRef),
}
