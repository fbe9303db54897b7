//! # anndb-core
//!
//! A small embeddable vector database: two interchangeable approximate
//! nearest-neighbor indexes over fixed-dimension `f64` vectors, behind a
//! uniform named-store façade with binary snapshot persistence.
//!
//! ## Features
//!
//! - **HNSW graph** with bounded degree, bidirectional edges, greedy-beam
//!   search, and delete with neighborhood replenishment
//! - **Cosine LSH** with random-projection simhash signatures across `l`
//!   independent hash tables
//! - **Named stores** that lazily create indexes on first touch and persist
//!   each one to its own `{name}_{variant}.store` snapshot
//! - **Deterministic search**: neighbor scans are key-sorted, so equal
//!   inputs and RNG seeds reproduce results exactly
//! - **Crash-safe snapshots** via temp-file + fsync + atomic rename
//!
//! ## Architecture
//!
//! ```text
//! Db (embed text keys) → VectorStore → { HnswStore | LshStore }
//!                                     → { HnswGraph | CosineLsh }
//! Persistence: custom little-endian codec → {name}_hnsw.store / {name}_lsh.store
//! ```

/// Byte-level snapshot primitives: varints, length-prefixed strings, atomic file replace.
pub mod codec;
/// Global defaults: index parameters, metric name, snapshot suffixes.
pub mod config;
/// The database front: an embedding collaborator plus the active store.
pub mod db;
/// Distance kernels and the string-named metric registry.
pub mod distance;
/// Crate-wide error type.
pub mod error;
/// HNSW approximate nearest neighbor index.
pub mod hnsw;
/// Cosine LSH approximate nearest neighbor index.
pub mod lsh;
/// Named-store façade over the index variants.
pub mod store;

pub use db::{Db, Embedder};
pub use error::{Error, Result};
pub use hnsw::{HnswGraph, HnswParams, Neighbor};
pub use lsh::{CosineLsh, LshMatch};
pub use store::{HnswStore, LshStore, VectorStore};
