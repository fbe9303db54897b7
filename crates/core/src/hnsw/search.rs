//! HNSW search: greedy-beam layer search and multi-level descent.
//!
//! The layer search keeps two ordered sets keyed by `(distance, key)`: a
//! candidate frontier trimmed to `ef_search` and a result set bounded by `k`.
//! Neighbor scans run in key order (the neighbor sets are `BTreeSet`s), so
//! results are reproducible for equal inputs and RNG state.

use super::graph::{HnswGraph, Level};
use crate::distance::DistanceFn;
use crate::error::Result;
use ordered_float::OrderedFloat;
use std::collections::{BTreeSet, HashSet};

type Entry = (OrderedFloat<f64>, String);

/// A search hit: the stored key and vector plus its distance to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub key: String,
    pub vector: Vec<f64>,
    pub distance: f64,
}

/// Greedy search within one level, seeded at `entry_key`.
///
/// Returns up to `k` nearest nodes as `(distance, key)`, ascending. The
/// frontier pops the closest unexpanded candidate each round; a round that
/// improves nothing terminates the search once the result set is full.
pub(crate) fn search_level(
    level: &Level,
    entry_key: &str,
    target: &[f64],
    k: usize,
    ef_search: usize,
    distance: DistanceFn,
) -> Vec<(f64, String)> {
    let Some(entry_node) = level.nodes.get(entry_key) else {
        return Vec::new();
    };
    let entry_dist = distance(&entry_node.vector, target);

    let mut candidates: BTreeSet<Entry> = BTreeSet::new();
    let mut result: BTreeSet<Entry> = BTreeSet::new();
    let mut visited: HashSet<String> = HashSet::new();

    candidates.insert((OrderedFloat(entry_dist), entry_key.to_string()));
    result.insert((OrderedFloat(entry_dist), entry_key.to_string()));
    visited.insert(entry_key.to_string());

    while let Some((_, current_key)) = candidates.pop_first() {
        let Some(current) = level.nodes.get(&current_key) else {
            continue;
        };
        let mut improved = false;

        for nk in &current.neighbors {
            if visited.contains(nk.as_str()) {
                continue;
            }
            let Some(neighbor) = level.nodes.get(nk) else {
                continue;
            };
            visited.insert(nk.clone());

            let d = distance(&neighbor.vector, target);
            if let Some((best, _)) = result.first() {
                improved = improved || d < best.0;
            }

            if result.len() < k {
                result.insert((OrderedFloat(d), nk.clone()));
            } else {
                let worst = result.last().map(|(w, _)| w.0);
                if worst.is_some_and(|w| d < w) {
                    result.pop_last();
                    result.insert((OrderedFloat(d), nk.clone()));
                }
            }

            candidates.insert((OrderedFloat(d), nk.clone()));
            if candidates.len() > ef_search {
                candidates.pop_last();
            }
        }

        if !improved && result.len() >= k {
            break;
        }
    }

    result.into_iter().map(|(d, key)| (d.0, key)).collect()
}

impl HnswGraph {
    /// Finds the `k` nearest neighbors of `query`.
    ///
    /// Descends from the top level carrying the elevator (the best entry
    /// point found so far); only the base level is searched at full width.
    /// An empty graph returns an empty result.
    pub fn search(&self, query: &[f64], k: usize) -> Result<Vec<Neighbor>> {
        self.check_dims(query)?;

        let ef_search = self.params.ef_search;
        let mut elevator: Option<String> = None;

        for i in (0..self.levels.len()).rev() {
            let level = &self.levels[i];
            let entry_key = match &elevator {
                Some(key) if level.nodes.contains_key(key) => key.clone(),
                _ => match level.entry() {
                    Some(node) => node.key.clone(),
                    None => continue,
                },
            };

            if i > 0 {
                let nearest = search_level(level, &entry_key, query, 1, ef_search, self.distance);
                if let Some((_, key)) = nearest.first() {
                    elevator = Some(key.clone());
                }
                continue;
            }

            let hits = search_level(level, &entry_key, query, k, ef_search, self.distance);
            return Ok(hits
                .into_iter()
                .map(|(dist, key)| {
                    let vector = level.nodes[&key].vector.clone();
                    Neighbor {
                        key,
                        vector,
                        distance: dist,
                    }
                })
                .collect());
        }

        Ok(Vec::new())
    }
}
