//! Hierarchical Navigable Small World (HNSW) approximate nearest neighbor index.
//!
//! A stack of proximity graphs: level 0 holds every node, each higher level a
//! geometrically thinning subset. Edges are bidirectional and each node keeps
//! at most `M` neighbors per level; evictions and deletions repair the
//! neighborhood by pulling in neighbors-of-neighbors so the small-world
//! structure survives churn. Levels own their nodes in per-level maps and
//! edges are resolved by key, so the same key on two levels is two node
//! records with independent neighbor sets.

/// Graph structure, parameters, and edge maintenance.
pub mod graph;
/// Insertion: level draw, elevator descent, bidirectional linking.
mod insert;
/// Greedy-beam layer search and multi-level descent.
pub mod search;
/// Binary snapshot save/load.
mod snapshot;

pub use graph::{HnswGraph, HnswParams};
pub use search::Neighbor;
pub use snapshot::snapshot_path;
