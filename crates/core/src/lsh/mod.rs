//! Cosine LSH: random-projection locality-sensitive hashing.
//!
//! A fixed set of standard-normal hyperplanes signs each vector into a bit
//! signature; `l` independent hash tables each key on an `m`-bit slice of
//! that signature, so near-parallel vectors tend to collide in at least one
//! table. Search unions the query's buckets and reranks by true distance.

/// The index: hyperplanes, tables, insert/delete/lookup/search.
pub mod index;
/// Binary snapshot save/load.
mod snapshot;

pub use index::{CosineLsh, LshMatch};
pub use snapshot::snapshot_path;
