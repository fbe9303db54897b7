//! HNSW-backed store.

use super::VectorStore;
use crate::config;
use crate::error::{Error, Result};
use crate::hnsw::{snapshot_path, HnswGraph};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// Maps index names to HNSW graphs, creating defaults on first touch.
pub struct HnswStore {
    dir: PathBuf,
    indexes: RwLock<HashMap<String, HnswGraph>>,
}

impl HnswStore {
    /// A store persisting snapshots into the current directory.
    pub fn new() -> Self {
        Self::with_dir(".")
    }

    /// A store persisting snapshots into `dir`.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            indexes: RwLock::new(HashMap::new()),
        }
    }

    fn with_index<T>(&self, name: &str, op: impl FnOnce(&mut HnswGraph) -> T) -> T {
        let mut indexes = self.indexes.write();
        let index = indexes.entry(name.to_string()).or_insert_with(|| {
            debug!(name, "creating hnsw index");
            HnswGraph::new(config::DEFAULT_METRIC).expect("default metric is registered")
        });
        op(index)
    }
}

impl Default for HnswStore {
    fn default() -> Self {
        Self::new()
    }
}

impl VectorStore for HnswStore {
    fn insert(&self, name: &str, vector: &[f64], key: &str) -> Result<()> {
        self.with_index(name, |index| index.insert(key, vector.to_vec()))
    }

    fn search(&self, name: &str, query: &[f64], limit: usize) -> Result<Vec<String>> {
        self.with_index(name, |index| {
            let k = if limit == 0 { index.len() } else { limit };
            let hits = index.search(query, k)?;
            Ok(hits.into_iter().map(|hit| hit.key).collect())
        })
    }

    fn lookup(&self, name: &str, _vector: &[f64], key: &str) -> Result<Vec<f64>> {
        self.with_index(name, |index| {
            index
                .lookup(key)
                .map(<[f64]>::to_vec)
                .ok_or_else(|| Error::NotFound(format!("key {key:?} in index {name:?}")))
        })
    }

    fn delete(&self, name: &str, _vector: &[f64], key: &str) -> Result<bool> {
        self.with_index(name, |index| Ok(index.delete(key)))
    }

    fn save(&self, name: &str) -> Result<()> {
        let path = snapshot_path(&self.dir, name);
        self.with_index(name, |index| index.save(&path))
    }

    fn load(&self, name: &str) -> Result<()> {
        let path = snapshot_path(&self.dir, name);
        self.with_index(name, |index| index.load(&path))
    }
}
