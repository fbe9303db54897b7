//! Global defaults and tuning constants.
//!
//! Compile-time constants only; runtime configuration (endpoint, data
//! directory) is handled by CLI arguments in the binary crate.

/// Default number of bidirectional links per HNSW node per level.
///
/// Higher values improve recall but increase memory and maintenance cost.
pub const HNSW_DEFAULT_M: usize = 16;

/// Default HNSW level-decay factor.
///
/// Each level holds roughly `ML` times the nodes of the level below it.
pub const HNSW_DEFAULT_ML: f64 = 0.25;

/// Default candidate-set size during HNSW search.
///
/// Higher values improve accuracy at the expense of latency.
pub const HNSW_DEFAULT_EF_SEARCH: usize = 20;

/// Default vector dimension for lazily created LSH indexes.
pub const LSH_DEFAULT_DIM: usize = 20;

/// Default number of LSH hash tables.
pub const LSH_DEFAULT_TABLES: usize = 15;

/// Default number of signature bits per LSH table.
pub const LSH_DEFAULT_BITS: usize = 15;

/// Hard cap on signature bits per table: a table key is one packed `u64`.
pub const MAX_SIGNATURE_BITS: usize = 64;

/// Distance metric used when none is specified.
pub const DEFAULT_METRIC: &str = "euclidean";

/// Search limit applied when the caller passes 0.
pub const DEFAULT_SEARCH_LIMIT: usize = 3;

/// Version tag written at the head of HNSW snapshots.
pub const SNAPSHOT_VERSION: i64 = 1;

/// Filename suffix for HNSW snapshots: `{name}_hnsw.store`.
pub const HNSW_SNAPSHOT_SUFFIX: &str = "_hnsw.store";

/// Filename suffix for LSH snapshots: `{name}_lsh.store`.
pub const LSH_SNAPSHOT_SUFFIX: &str = "_lsh.store";
