//! HNSW binary snapshots.
//!
//! Layout (all little-endian, `int` fields as zigzag varints):
//! version, M, Ml (f64), EfSearch, distance name, level count; then per
//! level the node count and per node its key, vector (varint count + f64
//! values), and neighbor keys. Writes are atomic-replace; loading a missing
//! file leaves the graph untouched.

use super::graph::{HnswGraph, HnswNode, Level};
use crate::codec::{read_optional, write_atomic, Reader, Writer};
use crate::config;
use crate::distance;
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Snapshot path for a named HNSW index: `{dir}/{name}_hnsw.store`.
pub fn snapshot_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}{}", config::HNSW_SNAPSHOT_SUFFIX))
}

impl HnswGraph {
    /// Writes the graph to `path` with atomic replace.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut w = Writer::new();
        w.put_varint(config::SNAPSHOT_VERSION);
        w.put_varint(self.params.m as i64);
        w.put_f64(self.params.ml);
        w.put_varint(self.params.ef_search as i64);
        w.put_varint_str(&self.distance_name);

        w.put_varint(self.levels.len() as i64);
        for level in &self.levels {
            w.put_varint(level.len() as i64);
            for node in level.nodes.values() {
                w.put_varint_str(&node.key);
                w.put_f64_seq(&node.vector);
                w.put_varint(node.neighbors.len() as i64);
                for neighbor in &node.neighbors {
                    w.put_varint_str(neighbor);
                }
            }
        }

        let bytes = w.into_bytes();
        write_atomic(path, &bytes)?;
        info!(
            path = %path.display(),
            bytes = bytes.len(),
            nodes = self.len(),
            "saved hnsw snapshot"
        );
        Ok(())
    }

    /// Replaces this graph with the snapshot at `path`.
    ///
    /// A missing file is not an error: nothing has been persisted yet and
    /// the graph is left as-is. Fails on a version or metric the running
    /// build does not understand, and with [`Error::Decode`] on malformed
    /// bytes. The RNG is retained across loads.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let Some(bytes) = read_optional(path)? else {
            debug!(path = %path.display(), "no hnsw snapshot to load");
            return Ok(());
        };
        let mut r = Reader::new(&bytes);

        let version = r.read_varint()?;
        if version != config::SNAPSHOT_VERSION {
            return Err(Error::VersionMismatch {
                expected: config::SNAPSHOT_VERSION,
                found: version,
            });
        }
        let m = r.read_len()?;
        let ml = r.read_f64()?;
        let ef_search = r.read_len()?;
        let distance_name = r.read_varint_str()?;
        let dist = distance::by_name(&distance_name)?;

        let level_count = r.read_len()?;
        let mut levels = Vec::with_capacity(level_count.min(64));
        for _ in 0..level_count {
            let node_count = r.read_len()?;
            let mut nodes = BTreeMap::new();
            for _ in 0..node_count {
                let key = r.read_varint_str()?;
                let vector = r.read_f64_seq()?;
                let neighbor_count = r.read_len()?;
                let mut node = HnswNode::new(key.clone(), vector);
                for _ in 0..neighbor_count {
                    node.neighbors.insert(r.read_varint_str()?);
                }
                nodes.insert(key, node);
            }
            levels.push(Level::from_nodes(nodes));
        }

        self.params.m = m;
        self.params.ml = ml;
        self.params.ef_search = ef_search;
        self.distance = dist;
        self.distance_name = distance_name;
        self.levels = levels;
        info!(path = %path.display(), nodes = self.len(), "loaded hnsw snapshot");
        Ok(())
    }
}
