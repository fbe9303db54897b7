//! LSH binary snapshots.
//!
//! Layout (all little-endian): `dim`, `l`, `m`, `h` as u64; the distance
//! name (u32-prefixed); hyperplane row and column counts as u32 followed by
//! every coordinate as f64; `next_id` as u64; then per table a bucket count,
//! and per bucket its u64 key plus the points `{id, vector, extra}`.
//! Writes are atomic-replace; loading a missing file leaves the configured
//! empty index untouched.

use super::index::{CosineLsh, HashTable, LshPoint};
use crate::codec::{read_optional, write_atomic, Reader, Writer};
use crate::config;
use crate::distance;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

/// Snapshot path for a named LSH index: `{dir}/{name}_lsh.store`.
pub fn snapshot_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}{}", config::LSH_SNAPSHOT_SUFFIX))
}

impl CosineLsh {
    /// Writes the index to `path` with atomic replace.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut w = Writer::new();
        w.put_u64(self.dim as u64);
        w.put_u64(self.l as u64);
        w.put_u64(self.m as u64);
        w.put_u64(self.h as u64);
        w.put_u32_str(&self.distance_name);

        w.put_u32(self.hyperplanes.len() as u32);
        w.put_u32(self.hyperplanes.first().map_or(0, Vec::len) as u32);
        for plane in &self.hyperplanes {
            for &coord in plane {
                w.put_f64(coord);
            }
        }

        w.put_u64(self.next_id.load(Ordering::Relaxed));

        w.put_u32(self.tables.len() as u32);
        for table in &self.tables {
            w.put_u32(table.len() as u32);
            for (key, bucket) in table {
                w.put_u64(*key);
                w.put_u32(bucket.len() as u32);
                for point in bucket {
                    w.put_u64(point.id);
                    w.put_u32(point.vector.len() as u32);
                    for &v in &point.vector {
                        w.put_f64(v);
                    }
                    w.put_u32_str(&point.extra);
                }
            }
        }

        let bytes = w.into_bytes();
        write_atomic(path, &bytes)?;
        info!(path = %path.display(), bytes = bytes.len(), "saved lsh snapshot");
        Ok(())
    }

    /// Replaces this index with the snapshot at `path`.
    ///
    /// A missing file is not an error: nothing has been persisted yet and
    /// the configured empty index stands. Malformed content fails with
    /// [`Error::Decode`]; an unregistered metric with
    /// [`Error::UnknownMetric`].
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let Some(bytes) = read_optional(path)? else {
            debug!(path = %path.display(), "no lsh snapshot to load");
            return Ok(());
        };
        let mut r = Reader::new(&bytes);

        let dim = r.read_u64()? as usize;
        let l = r.read_u64()? as usize;
        let m = r.read_u64()? as usize;
        let h = r.read_u64()? as usize;
        if m > config::MAX_SIGNATURE_BITS || h != l * m {
            return Err(Error::Decode(format!(
                "inconsistent lsh shape: l={l} m={m} h={h}"
            )));
        }
        let distance_name = r.read_u32_str()?;
        let dist = distance::by_name(&distance_name)?;

        let rows = r.read_u32()? as usize;
        let cols = r.read_u32()? as usize;
        if rows != h || (rows > 0 && cols != dim) {
            return Err(Error::Decode(format!(
                "hyperplane matrix {rows}x{cols} does not match dim={dim} h={h}"
            )));
        }
        let mut hyperplanes = Vec::with_capacity(rows);
        for _ in 0..rows {
            let mut plane = Vec::with_capacity(cols);
            for _ in 0..cols {
                plane.push(r.read_f64()?);
            }
            hyperplanes.push(plane);
        }

        let next_id = r.read_u64()?;

        let table_count = r.read_u32()? as usize;
        if table_count != l {
            return Err(Error::Decode(format!(
                "table count {table_count} does not match l={l}"
            )));
        }
        let mut tables = Vec::with_capacity(table_count);
        for _ in 0..table_count {
            let bucket_count = r.read_u32()? as usize;
            let mut table = HashTable::new();
            for _ in 0..bucket_count {
                let key = r.read_u64()?;
                let point_count = r.read_u32()? as usize;
                let mut bucket = Vec::with_capacity(point_count.min(1024));
                for _ in 0..point_count {
                    let id = r.read_u64()?;
                    let len = r.read_u32()? as usize;
                    let mut vector = Vec::with_capacity(len.min(4096));
                    for _ in 0..len {
                        vector.push(r.read_f64()?);
                    }
                    let extra = r.read_u32_str()?;
                    bucket.push(LshPoint { id, vector, extra });
                }
                table.insert(key, bucket);
            }
            tables.push(table);
        }

        self.dim = dim;
        self.l = l;
        self.m = m;
        self.h = h;
        self.distance = dist;
        self.distance_name = distance_name;
        self.hyperplanes = hyperplanes;
        self.tables = tables;
        self.next_id = AtomicU64::new(next_id);
        info!(path = %path.display(), "loaded lsh snapshot");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::index::tests::random_vector;
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn snapshot_path_uses_name_prefix() {
        let path = snapshot_path(Path::new("/tmp/data"), "t");
        assert_eq!(path, Path::new("/tmp/data/t_lsh.store"));
    }

    #[test]
    fn save_then_load_restores_every_pair() {
        let dir = tempfile::tempdir().unwrap();
        let path = snapshot_path(dir.path(), "t");

        let mut index = CosineLsh::with_seed(8, 15, 15, "euclidean", 42).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let pairs: Vec<(Vec<f64>, String)> = ('a'..='z')
            .map(|c| (random_vector(&mut rng, 8), c.to_string()))
            .collect();
        for (vector, extra) in &pairs {
            index.insert(vector.clone(), extra).unwrap();
        }
        index.save(&path).unwrap();

        for (vector, extra) in &pairs {
            index.delete(vector, extra);
            assert!(!index.lookup(vector, extra));
        }

        index.load(&path).unwrap();
        for (vector, extra) in &pairs {
            assert!(index.lookup(vector, extra), "pair {extra} lost in roundtrip");
        }
    }

    #[test]
    fn reloaded_index_searches_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path = snapshot_path(dir.path(), "t");

        let mut index = CosineLsh::with_seed(8, 15, 15, "euclidean", 42).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        for c in 'a'..='z' {
            index.insert(random_vector(&mut rng, 8), &c.to_string()).unwrap();
        }
        index.save(&path).unwrap();

        // A differently seeded shell: load must overwrite its hyperplanes.
        let mut reloaded = CosineLsh::with_seed(8, 15, 15, "euclidean", 1).unwrap();
        reloaded.load(&path).unwrap();

        let query = random_vector(&mut rng, 8);
        assert_eq!(
            index.search(&query, 0).unwrap(),
            reloaded.search(&query, 0).unwrap()
        );
    }

    #[test]
    fn next_id_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = snapshot_path(dir.path(), "t");

        let mut index = CosineLsh::with_seed(8, 3, 4, "euclidean", 42).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let mut max_id = 0;
        for _ in 0..5 {
            max_id = index.insert(random_vector(&mut rng, 8), "x").unwrap();
        }
        index.save(&path).unwrap();

        let mut reloaded = CosineLsh::with_seed(8, 3, 4, "euclidean", 1).unwrap();
        reloaded.load(&path).unwrap();
        let fresh = reloaded.insert(random_vector(&mut rng, 8), "y").unwrap();
        assert!(fresh > max_id, "reloaded ids must not collide with saved ones");
    }

    #[test]
    fn missing_snapshot_keeps_the_configured_shape() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = CosineLsh::with_seed(20, 15, 15, "euclidean", 42).unwrap();
        index.load(&snapshot_path(dir.path(), "absent")).unwrap();
        assert_eq!(index.dims(), 20);
        assert!(!snapshot_path(dir.path(), "absent").exists());
    }

    #[test]
    fn truncated_snapshot_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = snapshot_path(dir.path(), "t");

        let mut index = CosineLsh::with_seed(8, 3, 4, "euclidean", 42).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        index.insert(random_vector(&mut rng, 8), "a").unwrap();
        index.save(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        crate::codec::write_atomic(&path, &bytes[..bytes.len() / 2]).unwrap();

        let mut reloaded = CosineLsh::with_seed(8, 3, 4, "euclidean", 42).unwrap();
        assert!(matches!(reloaded.load(&path), Err(Error::Decode(_))));
    }

    #[test]
    fn inconsistent_shape_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = snapshot_path(dir.path(), "t");

        let mut w = Writer::new();
        w.put_u64(8);
        w.put_u64(3);
        w.put_u64(4);
        w.put_u64(99); // h != l * m
        crate::codec::write_atomic(&path, w.as_bytes()).unwrap();

        let mut index = CosineLsh::with_seed(8, 3, 4, "euclidean", 42).unwrap();
        assert!(matches!(index.load(&path), Err(Error::Decode(_))));
    }
}
