//! The cosine LSH index.

use crate::config;
use crate::distance::{self, DistanceFn};
use crate::error::{Error, Result};
use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

/// A stored point: index-local id, the vector, and the caller's payload
/// (typically the original key).
#[derive(Debug, Clone, PartialEq)]
pub struct LshPoint {
    pub id: u64,
    pub vector: Vec<f64>,
    pub extra: String,
}

/// A search hit, ranked by true distance to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct LshMatch {
    pub id: u64,
    pub extra: String,
    pub distance: f64,
}

pub(crate) type Bucket = Vec<LshPoint>;
pub(crate) type HashTable = HashMap<u64, Bucket>;

/// Random-projection LSH index for cosine/angular similarity.
///
/// `h = l * m` hyperplanes are drawn once at construction and never change;
/// they define the hash family, so insert and query always agree on bucket
/// keys. Ids increase monotonically and the counter update is atomic, which
/// keeps table fan-out safe to parallelize.
pub struct CosineLsh {
    pub(crate) dim: usize,
    pub(crate) l: usize,
    pub(crate) m: usize,
    pub(crate) h: usize,
    pub(crate) distance_name: String,
    pub(crate) distance: DistanceFn,
    pub(crate) hyperplanes: Vec<Vec<f64>>,
    pub(crate) tables: Vec<HashTable>,
    pub(crate) next_id: AtomicU64,
}

impl CosineLsh {
    /// Creates an index over `dim`-dimensional vectors with `l` tables of
    /// `m` signature bits each, reranking by the named distance metric
    /// (empty string selects the default).
    ///
    /// # Panics
    ///
    /// Panics if `m` exceeds [`config::MAX_SIGNATURE_BITS`]: a table key is
    /// a single packed `u64`.
    pub fn new(dim: usize, l: usize, m: usize, distance_name: &str) -> Result<Self> {
        Self::build(dim, l, m, distance_name, StdRng::from_entropy())
    }

    /// Like [`CosineLsh::new`] but with seeded hyperplanes, for
    /// reproducible hashing in tests.
    pub fn with_seed(dim: usize, l: usize, m: usize, distance_name: &str, seed: u64) -> Result<Self> {
        Self::build(dim, l, m, distance_name, StdRng::seed_from_u64(seed))
    }

    fn build(dim: usize, l: usize, m: usize, distance_name: &str, mut rng: StdRng) -> Result<Self> {
        assert!(
            m <= config::MAX_SIGNATURE_BITS,
            "signature bits per table ({m}) cannot exceed {}",
            config::MAX_SIGNATURE_BITS
        );
        let name = if distance_name.is_empty() {
            config::DEFAULT_METRIC
        } else {
            distance_name
        };
        let dist = distance::by_name(name)?;

        let h = l * m;
        let hyperplanes: Vec<Vec<f64>> = (0..h)
            .map(|_| (0..dim).map(|_| rng.sample::<f64, _>(StandardNormal)).collect())
            .collect();

        Ok(Self {
            dim,
            l,
            m,
            h,
            distance_name: name.to_string(),
            distance: dist,
            hyperplanes,
            tables: (0..l).map(|_| HashTable::new()).collect(),
            next_id: AtomicU64::new(0),
        })
    }

    /// Vector dimensionality this index was built for.
    pub fn dims(&self) -> usize {
        self.dim
    }

    /// Name of the distance metric used for reranking.
    pub fn distance_name(&self) -> &str {
        &self.distance_name
    }

    fn check_dims(&self, vector: &[f64]) -> Result<()> {
        if vector.len() != self.dim {
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                actual: vector.len(),
            });
        }
        Ok(())
    }

    /// Simhash the vector and pack one `u64` bucket key per table.
    ///
    /// Bit `i` of the signature is the sign of the dot product with
    /// hyperplane `i`; within a table's m-bit slice the first bit is the
    /// most significant.
    pub(crate) fn table_keys(&self, vector: &[f64]) -> Vec<u64> {
        let bits: Vec<bool> = self
            .hyperplanes
            .iter()
            .map(|plane| distance::dot_product(plane, vector) >= 0.0)
            .collect();
        (0..self.l)
            .map(|t| {
                bits[t * self.m..(t + 1) * self.m]
                    .iter()
                    .fold(0u64, |key, &bit| (key << 1) | u64::from(bit))
            })
            .collect()
    }

    /// Appends the point to its bucket in every table, under a fresh id.
    pub fn insert(&mut self, vector: Vec<f64>, extra: &str) -> Result<u64> {
        self.check_dims(&vector)?;
        let keys = self.table_keys(&vector);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        for (table, key) in self.tables.iter_mut().zip(keys) {
            table.entry(key).or_default().push(LshPoint {
                id,
                vector: vector.clone(),
                extra: extra.to_string(),
            });
        }
        Ok(id)
    }

    /// Removes every point matching both `vector` and `extra` from the
    /// buckets the pair hashes to.
    pub fn delete(&mut self, vector: &[f64], extra: &str) {
        if vector.len() != self.dim {
            return;
        }
        let keys = self.table_keys(vector);
        for (table, key) in self.tables.iter_mut().zip(keys) {
            if let Some(bucket) = table.get_mut(&key) {
                bucket.retain(|p| p.extra != extra || p.vector != vector);
                if bucket.is_empty() {
                    table.remove(&key);
                }
            }
        }
    }

    /// Exact membership: true iff some bucket holds a point matching both
    /// `vector` and `extra`.
    pub fn lookup(&self, vector: &[f64], extra: &str) -> bool {
        if vector.len() != self.dim {
            return false;
        }
        self.table_keys(vector)
            .iter()
            .zip(&self.tables)
            .any(|(key, table)| {
                table
                    .get(key)
                    .is_some_and(|bucket| bucket.iter().any(|p| p.extra == extra && p.vector == vector))
            })
    }

    /// Approximate k-NN: unions the query's buckets across all tables,
    /// deduplicates by id, and reranks ascending by the index metric.
    /// `max_result == 0` returns every candidate.
    pub fn search(&self, query: &[f64], max_result: usize) -> Result<Vec<LshMatch>> {
        self.check_dims(query)?;

        let mut seen: HashSet<u64> = HashSet::new();
        let mut matches: Vec<LshMatch> = Vec::new();
        for (key, table) in self.table_keys(query).iter().zip(&self.tables) {
            let Some(bucket) = table.get(key) else {
                continue;
            };
            for point in bucket {
                if seen.insert(point.id) {
                    matches.push(LshMatch {
                        id: point.id,
                        extra: point.extra.clone(),
                        distance: (self.distance)(query, &point.vector),
                    });
                }
            }
        }

        matches.sort_unstable_by_key(|m| (OrderedFloat(m.distance), m.id));
        if max_result > 0 {
            matches.truncate(max_result);
        }
        Ok(matches)
    }
}
