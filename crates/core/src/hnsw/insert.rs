//! HNSW insertion.
//!
//! A new node draws an insertion level, then descends the level stack. On
//! levels above the insertion level the greedy search only refines the
//! elevator (the entry point carried into the next level down); on levels at
//! or below it the node is installed and linked bidirectionally to its
//! neighborhood, with over-capacity neighbors evicted and replenished.

use super::graph::{HnswGraph, HnswNode, Level};
use super::search::search_level;
use crate::error::Result;

impl HnswGraph {
    /// Inserts `key` with `vector`, replacing any existing node under the
    /// same key.
    ///
    /// Fails with [`Error::DimensionMismatch`](crate::Error::DimensionMismatch)
    /// when the vector's length disagrees with the graph's fixed dimension.
    ///
    /// # Panics
    ///
    /// Panics if the base level did not grow by exactly one node, which
    /// would mean the graph structure itself is corrupt.
    pub fn insert(&mut self, key: &str, vector: Vec<f64>) -> Result<()> {
        self.check_dims(&vector)?;
        if self.lookup(key).is_some() {
            self.delete(key);
        }

        let insert_level = self.random_level();
        while insert_level >= self.levels.len() {
            self.levels.push(Level::new());
        }

        let pre_len = self.len();
        let dist = self.distance;
        let (m, ef_search) = (self.params.m, self.params.ef_search);
        let mut elevator: Option<String> = None;

        for i in (0..self.levels.len()).rev() {
            if self.levels[i].is_empty() {
                // An empty level holds the new node alone; there is nothing
                // to search or link against.
                self.levels[i].nodes.insert(
                    key.to_string(),
                    HnswNode::new(key.to_string(), vector.clone()),
                );
                continue;
            }

            let entry_key = match &elevator {
                Some(k) if self.levels[i].nodes.contains_key(k) => k.clone(),
                _ => self.levels[i].entry().expect("level is non-empty").key.clone(),
            };

            let neighborhood =
                search_level(&self.levels[i], &entry_key, &vector, m, ef_search, dist);
            let (_, nearest) = neighborhood
                .first()
                .expect("entry node is always in the result set");
            elevator = Some(nearest.clone());

            if insert_level >= i {
                let level = &mut self.levels[i];
                level.nodes.insert(
                    key.to_string(),
                    HnswNode::new(key.to_string(), vector.clone()),
                );
                for (_, neighbor_key) in &neighborhood {
                    level.link(neighbor_key, key, m, dist);
                }
            }
        }

        assert_eq!(
            self.len(),
            pre_len + 1,
            "insert must grow the base level by one node"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::graph::tests::{assert_invariants, random_vector, seeded_graph_with_keys};
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn first_insert_populates_every_level() {
        let mut graph = HnswGraph::with_seed("", 42).unwrap();
        graph.insert("a", vec![1.0; 8]).unwrap();
        assert!(!graph.levels.is_empty());
        for level in &graph.levels {
            assert!(level.nodes.contains_key("a"));
        }
    }

    #[test]
    fn dense_inserts_grow_multiple_levels() {
        let graph = seeded_graph_with_keys('a'..='z');
        assert_eq!(graph.len(), 26);
        assert!(
            graph.levels.len() > 1,
            "26 nodes at ml=0.25 should spill above the base level"
        );
        assert_invariants(&graph);
    }

    #[test]
    fn neighborhoods_are_populated_on_the_base_level() {
        let graph = seeded_graph_with_keys('a'..='z');
        let base = &graph.levels[0];
        for node in base.nodes.values() {
            assert!(
                !node.neighbors.is_empty(),
                "node {} is disconnected on the base level",
                node.key
            );
        }
    }

    #[test]
    fn eviction_keeps_degree_bounded_under_churn() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut graph = HnswGraph::with_seed("", 42).unwrap();
        graph.params.m = 3;
        for i in 0..60 {
            graph
                .insert(&format!("k{i:02}"), random_vector(&mut rng, 8))
                .unwrap();
            assert_invariants(&graph);
        }
    }
}
