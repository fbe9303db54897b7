//! The multi-index store façade.
//!
//! A store maps user-chosen names to live index instances of one variant
//! (HNSW or LSH — the variant is the store type, not per name). An index is
//! created with default configuration the first time a name is touched;
//! every operation forwards to it, and search results are unwrapped to plain
//! key sequences. Save and load are per name, using the name as the
//! snapshot filename prefix.

use crate::error::Result;

/// HNSW-backed store.
pub mod hnsw;
/// LSH-backed store.
pub mod lsh;

pub use hnsw::HnswStore;
pub use lsh::LshStore;

/// Uniform interface over the two index variants.
///
/// Callers must externally serialize mutating operations on the same name;
/// the store itself only guards its name → index map.
pub trait VectorStore {
    /// Inserts `vector` under `key` into the named index.
    fn insert(&self, name: &str, vector: &[f64], key: &str) -> Result<()>;

    /// Returns up to `limit` keys nearest to `query`, ascending by distance.
    /// A limit of 0 means no cap.
    fn search(&self, name: &str, query: &[f64], limit: usize) -> Result<Vec<String>>;

    /// Returns the stored vector for `key`, or
    /// [`Error::NotFound`](crate::Error::NotFound).
    fn lookup(&self, name: &str, vector: &[f64], key: &str) -> Result<Vec<f64>>;

    /// Removes `key` (and, for LSH, its matching vector) from the named
    /// index. Returns whether anything was removed.
    fn delete(&self, name: &str, vector: &[f64], key: &str) -> Result<bool>;

    /// Snapshots the named index to disk.
    fn save(&self, name: &str) -> Result<()>;

    /// Restores the named index from its snapshot, if one exists.
    fn load(&self, name: &str) -> Result<()>;
}
