//! LSH-backed store.

use super::VectorStore;
use crate::config;
use crate::error::{Error, Result};
use crate::lsh::{snapshot_path, CosineLsh};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// Maps index names to cosine LSH indexes, creating defaults on first touch.
pub struct LshStore {
    dir: PathBuf,
    indexes: RwLock<HashMap<String, CosineLsh>>,
}

impl LshStore {
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

    fn with_index<T>(&self, name: &str, op: impl FnOnce(&mut CosineLsh) -> T) -> T {
        let mut indexes = self.indexes.write();
        let index = indexes.entry(name.to_string()).or_insert_with(|| {
            debug!(name, "creating lsh index");
            CosineLsh::new(
                config::LSH_DEFAULT_DIM,
                config::LSH_DEFAULT_TABLES,
                config::LSH_DEFAULT_BITS,
                config::DEFAULT_METRIC,
            )
            .expect("default metric is registered")
        });
        op(index)
    }
}

impl Default for LshStore {
    fn default() -> Self {
        Self::new()
    }
}

impl VectorStore for LshStore {
    fn insert(&self, name: &str, vector: &[f64], key: &str) -> Result<()> {
        self.with_index(name, |index| index.insert(vector.to_vec(), key).map(|_| ()))
    }

    fn search(&self, name: &str, query: &[f64], limit: usize) -> Result<Vec<String>> {
        self.with_index(name, |index| {
            let hits = index.search(query, limit)?;
            Ok(hits.into_iter().map(|hit| hit.extra).collect())
        })
    }

    fn lookup(&self, name: &str, vector: &[f64], key: &str) -> Result<Vec<f64>> {
        self.with_index(name, |index| {
            if index.lookup(vector, key) {
                Ok(vector.to_vec())
            } else {
                Err(Error::NotFound(format!("key {key:?} in index {name:?}")))
            }
        })
    }

    fn delete(&self, name: &str, vector: &[f64], key: &str) -> Result<bool> {
        self.with_index(name, |index| {
            index.delete(vector, key);
            Ok(true)
        })
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
