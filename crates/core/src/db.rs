//! The database front: text keys in, store operations out.
//!
//! [`Db`] pairs an embedding collaborator with a [`VectorStore`]: every
//! text-keyed operation embeds the key first, then forwards the vector to
//! the active store. The store is swappable at runtime (the REPL's `use`
//! command switches between HNSW and LSH variants).

use crate::config;
use crate::error::Result;
use crate::store::VectorStore;

/// The embedding collaborator: turns text into a vector.
///
/// Implementations live outside the core (HTTP clients, local models); the
/// core only consumes this interface.
pub trait Embedder {
    fn embed(&self, text: &str) -> Result<Vec<f64>>;
}

/// A database over one embedding client and one active store.
pub struct Db {
    client: Box<dyn Embedder>,
    store: Box<dyn VectorStore>,
}

impl Db {
    pub fn new(client: Box<dyn Embedder>, store: Box<dyn VectorStore>) -> Self {
        Self { client, store }
    }

    /// Replaces the active store, keeping the embedding client.
    pub fn set_store(&mut self, store: Box<dyn VectorStore>) {
        self.store = store;
    }

    /// Embeds `key` and inserts the vector under it.
    pub fn insert(&self, name: &str, key: &str) -> Result<()> {
        let vector = self.client.embed(key)?;
        self.store.insert(name, &vector, key)
    }

    /// Embeds `query` and returns the nearest keys. A limit of 0 falls back
    /// to [`config::DEFAULT_SEARCH_LIMIT`].
    pub fn search(&self, name: &str, query: &str, limit: usize) -> Result<Vec<String>> {
        let vector = self.client.embed(query)?;
        let limit = if limit == 0 {
            config::DEFAULT_SEARCH_LIMIT
        } else {
            limit
        };
        self.store.search(name, &vector, limit)
    }

    /// Embeds `key` and returns its stored vector.
    pub fn lookup(&self, name: &str, key: &str) -> Result<Vec<f64>> {
        let vector = self.client.embed(key)?;
        self.store.lookup(name, &vector, key)
    }

    /// Embeds `key` and removes it. Returns whether anything was removed.
    pub fn delete(&self, name: &str, key: &str) -> Result<bool> {
        let vector = self.client.embed(key)?;
        self.store.delete(name, &vector, key)
    }

    pub fn save(&self, name: &str) -> Result<()> {
        self.store.save(name)
    }

    pub fn load(&self, name: &str) -> Result<()> {
        self.store.load(name)
    }
}
