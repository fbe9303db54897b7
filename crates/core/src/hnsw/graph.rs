//! HNSW graph structure: levels, nodes, parameters, and edge maintenance.
//!
//! [`HnswParams`] carries the tuning knobs (M, Ml, ef_search). [`HnswGraph`]
//! owns the level stack; each [`Level`] owns its nodes in a `BTreeMap` so
//! iteration, entry-point choice, and snapshot bytes are all deterministic.

use crate::config;
use crate::distance::{self, DistanceFn};
use crate::error::{Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, BTreeSet};

/// Tuning parameters for an HNSW graph.
#[derive(Debug, Clone)]
pub struct HnswParams {
    /// Maximum number of neighbors per node per level.
    pub m: usize,
    /// Level-decay factor in (0, 1): each level is roughly `ml` times the
    /// size of the one below it.
    pub ml: f64,
    /// Candidate-set size during search.
    pub ef_search: usize,
}

impl Default for HnswParams {
    fn default() -> Self {
        Self {
            m: config::HNSW_DEFAULT_M,
            ml: config::HNSW_DEFAULT_ML,
            ef_search: config::HNSW_DEFAULT_EF_SEARCH,
        }
    }
}

/// A node within one level: its key, vector, and neighbor keys.
///
/// The neighbor set is a `BTreeSet` so every scan over it is key-sorted,
/// which makes search deterministic for equal inputs.
#[derive(Debug, Clone)]
pub(crate) struct HnswNode {
    pub(crate) key: String,
    pub(crate) vector: Vec<f64>,
    pub(crate) neighbors: BTreeSet<String>,
}

impl HnswNode {
    pub(crate) fn new(key: String, vector: Vec<f64>) -> Self {
        Self {
            key,
            vector,
            neighbors: BTreeSet::new(),
        }
    }
}

/// One level of the graph: a map from key to that level's node record.
///
/// A key present on level `l` is also present on all levels below it; level 0
/// holds every node.
#[derive(Debug, Default)]
pub(crate) struct Level {
    pub(crate) nodes: BTreeMap<String, HnswNode>,
}

impl Level {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_nodes(nodes: BTreeMap<String, HnswNode>) -> Self {
        Self { nodes }
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Any node works as a search entry point; the first key keeps the
    /// choice deterministic.
    pub(crate) fn entry(&self) -> Option<&HnswNode> {
        self.nodes.values().next()
    }

    /// Creates the bidirectional edge `a <-> b`, then enforces the degree
    /// cap on both endpoints. Installing both directions before any eviction
    /// keeps the edge relation symmetric even when the new edge itself is
    /// the one dropped.
    pub(crate) fn link(&mut self, a: &str, b: &str, m: usize, dist: DistanceFn) {
        if a == b || !self.nodes.contains_key(a) || !self.nodes.contains_key(b) {
            return;
        }
        self.nodes.get_mut(a).expect("checked above").neighbors.insert(b.to_string());
        self.nodes.get_mut(b).expect("checked above").neighbors.insert(a.to_string());
        self.enforce_cap(a, m, dist);
        self.enforce_cap(b, m, dist);
    }

    /// If `owner` exceeds `m` neighbors, drops the farthest one (removing
    /// the reciprocal backlink) and replenishes the dropped node.
    fn enforce_cap(&mut self, owner: &str, m: usize, dist: DistanceFn) {
        match self.nodes.get(owner) {
            Some(node) if node.neighbors.len() > m => {}
            _ => return,
        }

        let worst_key = {
            let node = &self.nodes[owner];
            let mut worst: Option<(f64, &str)> = None;
            for nk in &node.neighbors {
                let Some(candidate) = self.nodes.get(nk) else {
                    continue;
                };
                let d = dist(&candidate.vector, &node.vector);
                // A NaN distance never wins the comparison, so the first
                // neighbor stands in when the metric degenerates.
                if worst.as_ref().map_or(true, |&(wd, _)| d > wd) {
                    worst = Some((d, nk.as_str()));
                }
            }
            match worst {
                Some((_, key)) => key.to_string(),
                None => return,
            }
        };

        if let Some(node) = self.nodes.get_mut(owner) {
            node.neighbors.remove(&worst_key);
        }
        if let Some(dropped) = self.nodes.get_mut(&worst_key) {
            dropped.neighbors.remove(owner);
        }
        self.replenish(&worst_key, m);
    }

    /// Repairs a degree deficit on `key` by linking it to neighbors of its
    /// neighbors until it is back at `m` edges. Squared Euclidean distance
    /// is the tie-break metric for any evictions this triggers.
    pub(crate) fn replenish(&mut self, key: &str, m: usize) {
        match self.nodes.get(key) {
            Some(node) if node.neighbors.len() < m => {}
            _ => return,
        }

        let direct: Vec<String> = self.nodes[key].neighbors.iter().cloned().collect();
        for via in &direct {
            let Some(via_node) = self.nodes.get(via) else {
                continue;
            };
            let candidates: Vec<String> = via_node.neighbors.iter().cloned().collect();
            for candidate in candidates {
                if candidate == key || self.nodes[key].neighbors.contains(&candidate) {
                    continue;
                }
                // A saturated candidate would evict the fresh edge straight
                // away; only nodes with spare capacity can donate an edge.
                match self.nodes.get(&candidate) {
                    Some(c) if c.neighbors.len() < m => {}
                    _ => continue,
                }
                self.link(key, &candidate, m, distance::square_distance);
                if self.nodes[key].neighbors.len() >= m {
                    return;
                }
            }
        }
    }

    /// Detaches an already-removed node: strips every backlink to it, then
    /// replenishes each orphaned neighbor.
    pub(crate) fn isolate(&mut self, removed: &HnswNode, m: usize) {
        for nk in &removed.neighbors {
            if let Some(neighbor) = self.nodes.get_mut(nk) {
                neighbor.neighbors.remove(&removed.key);
            }
        }
        for nk in &removed.neighbors {
            self.replenish(nk, m);
        }
    }
}

/// Multi-level proximity graph over string-keyed f64 vectors.
pub struct HnswGraph {
    /// Tuning parameters; changing them affects subsequent operations only.
    pub params: HnswParams,
    pub(crate) distance: DistanceFn,
    pub(crate) distance_name: String,
    pub(crate) rng: StdRng,
    pub(crate) levels: Vec<Level>,
}

impl HnswGraph {
    /// Creates an empty graph using the named distance metric (empty string
    /// selects the default) and default parameters.
    pub fn new(distance_name: &str) -> Result<Self> {
        Self::build(distance_name, StdRng::from_entropy())
    }

    /// Creates an empty graph with a seeded RNG, for reproducible level draws.
    pub fn with_seed(distance_name: &str, seed: u64) -> Result<Self> {
        Self::build(distance_name, StdRng::seed_from_u64(seed))
    }

    fn build(distance_name: &str, rng: StdRng) -> Result<Self> {
        let name = if distance_name.is_empty() {
            config::DEFAULT_METRIC
        } else {
            distance_name
        };
        Ok(Self {
            params: HnswParams::default(),
            distance: distance::by_name(name)?,
            distance_name: name.to_string(),
            rng,
            levels: Vec::new(),
        })
    }

    /// Number of nodes in the graph (the size of the base level).
    pub fn len(&self) -> usize {
        self.levels.first().map_or(0, Level::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Vector dimensionality, or 0 while the graph is empty.
    pub fn dims(&self) -> usize {
        self.levels
            .first()
            .and_then(Level::entry)
            .map_or(0, |node| node.vector.len())
    }

    /// Name of the distance metric this graph was built with.
    pub fn distance_name(&self) -> &str {
        &self.distance_name
    }

    /// Returns the base-level vector stored under `key`.
    pub fn lookup(&self, key: &str) -> Option<&[f64]> {
        self.levels
            .first()?
            .nodes
            .get(key)
            .map(|node| node.vector.as_slice())
    }

    /// Removes `key` from every level it appears on, isolating the node and
    /// replenishing its neighborhoods. Returns whether any level held it.
    pub fn delete(&mut self, key: &str) -> bool {
        let m = self.params.m;
        let mut deleted = false;
        for level in &mut self.levels {
            if let Some(node) = level.nodes.remove(key) {
                level.isolate(&node, m);
                deleted = true;
            }
        }
        deleted
    }

    pub(crate) fn check_dims(&self, vector: &[f64]) -> Result<()> {
        let expected = self.dims();
        if expected != 0 && expected != vector.len() {
            return Err(Error::DimensionMismatch {
                expected,
                actual: vector.len(),
            });
        }
        Ok(())
    }

    /// Upper bound on the level count, derived from the base-level size.
    fn max_level(ml: f64, num_nodes: usize) -> usize {
        if num_nodes == 0 {
            return 1;
        }
        let levels = (num_nodes as f64).ln() / (1.0 / ml).ln();
        levels.round() as usize + 1
    }

    /// Draws the insertion level for a new node: the first level at which a
    /// uniform draw exceeds `ml`, capped by [`Self::max_level`].
    pub(crate) fn random_level(&mut self) -> usize {
        let max = match self.levels.first() {
            Some(base) => Self::max_level(self.params.ml, base.len()),
            None => 1,
        };
        for level in 0..max {
            let r: f64 = self.rng.gen();
            if r > self.params.ml {
                return level;
            }
        }
        max
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn random_vector(rng: &mut StdRng, dim: usize) -> Vec<f64> {
        (0..dim).map(|_| rng.gen::<f64>()).collect()
    }

    pub(crate) fn seeded_graph_with_keys(keys: impl IntoIterator<Item = char>) -> HnswGraph {
        let mut rng = StdRng::seed_from_u64(42);
        let mut graph = HnswGraph::with_seed("", 42).unwrap();
        for key in keys {
            let vector = random_vector(&mut rng, 8);
            graph.insert(&key.to_string(), vector).unwrap();
        }
        graph
    }

    /// Every edge must have its reciprocal on the same level.
    pub(crate) fn assert_bidirectional(graph: &HnswGraph) {
        for (depth, level) in graph.levels.iter().enumerate() {
            for node in level.nodes.values() {
                for nk in &node.neighbors {
                    let neighbor = level
                        .nodes
                        .get(nk)
                        .unwrap_or_else(|| panic!("level {depth}: dangling edge {} -> {nk}", node.key));
                    assert!(
                        neighbor.neighbors.contains(&node.key),
                        "level {depth}: edge {} -> {nk} has no backlink",
                        node.key
                    );
                }
            }
        }
    }

    /// No node may exceed `m` neighbors once an operation completes.
    pub(crate) fn assert_degree_bound(graph: &HnswGraph) {
        for (depth, level) in graph.levels.iter().enumerate() {
            for node in level.nodes.values() {
                assert!(
                    node.neighbors.len() <= graph.params.m,
                    "level {depth}: node {} has {} neighbors (max {})",
                    node.key,
                    node.neighbors.len(),
                    graph.params.m
                );
            }
        }
    }

    /// A key on any level must also be on level 0.
    pub(crate) fn assert_base_complete(graph: &HnswGraph) {
        let Some(base) = graph.levels.first() else {
            return;
        };
        for (depth, level) in graph.levels.iter().enumerate().skip(1) {
            for key in level.nodes.keys() {
                assert!(
                    base.nodes.contains_key(key),
                    "level {depth}: key {key} missing from base level"
                );
            }
        }
    }

    pub(crate) fn assert_invariants(graph: &HnswGraph) {
        assert_bidirectional(graph);
        assert_degree_bound(graph);
        assert_base_complete(graph);
    }

    #[test]
    fn empty_graph_has_no_dims() {
        let graph = HnswGraph::new("").unwrap();
        assert_eq!(graph.len(), 0);
        assert_eq!(graph.dims(), 0);
        assert!(graph.is_empty());
        assert_eq!(graph.distance_name(), "euclidean");
    }

    #[test]
    fn unknown_metric_is_rejected_at_construction() {
        assert!(matches!(
            HnswGraph::new("hamming"),
            Err(Error::UnknownMetric(_))
        ));
    }

    #[test]
    fn insert_fixes_dims_and_len() {
        let mut graph = HnswGraph::with_seed("", 42).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        graph.insert("a", random_vector(&mut rng, 8)).unwrap();
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.dims(), 8);
    }

    #[test]
    fn mismatched_insert_fails() {
        let mut graph = HnswGraph::with_seed("", 42).unwrap();
        graph.insert("a", vec![0.0; 8]).unwrap();
        match graph.insert("b", vec![0.0; 7]) {
            Err(Error::DimensionMismatch { expected, actual }) => {
                assert_eq!((expected, actual), (8, 7));
            }
            other => panic!("expected DimensionMismatch, got {other:?}"),
        }
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn lookup_finds_every_inserted_key() {
        let graph = seeded_graph_with_keys('a'..='z');
        for key in 'a'..='z' {
            let vector = graph.lookup(&key.to_string());
            assert_eq!(vector.map(<[f64]>::len), Some(8), "key {key}");
        }
        assert!(graph.lookup("zz").is_none());
    }

    #[test]
    fn delete_then_readd_restores_membership() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut graph = HnswGraph::with_seed("", 42).unwrap();
        let vector = random_vector(&mut rng, 8);

        assert!(!graph.delete("a"));

        graph.insert("a", vector.clone()).unwrap();
        assert_eq!(graph.len(), 1);

        assert!(graph.delete("a"));
        assert_eq!(graph.len(), 0);
        assert!(graph.lookup("a").is_none());

        assert!(!graph.delete("a"));

        graph.insert("a", vector).unwrap();
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn invariants_hold_after_inserts() {
        let graph = seeded_graph_with_keys('a'..='z');
        assert_invariants(&graph);
    }

    #[test]
    fn invariants_hold_after_interleaved_deletes() {
        let mut graph = seeded_graph_with_keys('a'..='z');
        for key in ['c', 'q', 'a', 'z', 'm', 'n'] {
            assert!(graph.delete(&key.to_string()));
            assert_invariants(&graph);
        }
        assert_eq!(graph.len(), 20);
    }

    #[test]
    fn reinsert_replaces_existing_key() {
        let mut graph = seeded_graph_with_keys('a'..='e');
        let replacement = vec![9.0; 8];
        graph.insert("c", replacement.clone()).unwrap();
        assert_eq!(graph.len(), 5);
        assert_eq!(graph.lookup("c"), Some(replacement.as_slice()));
        assert_invariants(&graph);
    }

    #[test]
    fn random_level_respects_cap() {
        let mut graph = HnswGraph::with_seed("", 7).unwrap();
        for _ in 0..200 {
            assert!(graph.random_level() <= 1, "empty graph caps levels at 1");
        }
    }
}
