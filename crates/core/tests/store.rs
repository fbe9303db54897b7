//! Store-level scenarios across both index variants.

use anndb_core::{Error, HnswStore, LshStore, VectorStore};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_vector(rng: &mut StdRng, dim: usize) -> Vec<f64> {
    (0..dim).map(|_| rng.gen::<f64>()).collect()
}

#[test]
fn hnsw_store_full_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let store = HnswStore::with_dir(dir.path());
    let mut rng = StdRng::seed_from_u64(42);

    for key in 'a'..='z' {
        store
            .insert("t", &random_vector(&mut rng, 8), &key.to_string())
            .unwrap();
    }

    let query = random_vector(&mut rng, 8);
    let hits = store.search("t", &query, 5).unwrap();
    assert_eq!(hits.len(), 5);

    store.save("t").unwrap();
    assert!(dir.path().join("t_hnsw.store").exists());

    for key in 'a'..='z' {
        assert!(store.delete("t", &[], &key.to_string()).unwrap());
    }
    assert!(store.search("t", &query, 5).unwrap().is_empty());

    store.load("t").unwrap();
    for key in 'a'..='z' {
        assert_eq!(store.lookup("t", &[], &key.to_string()).unwrap().len(), 8);
    }
    // Deterministic iteration makes the reloaded graph search identically.
    assert_eq!(store.search("t", &query, 5).unwrap(), hits);
}

#[test]
fn lsh_store_full_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let store = LshStore::with_dir(dir.path());
    let mut rng = StdRng::seed_from_u64(42);

    let pairs: Vec<(Vec<f64>, String)> = ('a'..='z')
        .map(|c| (random_vector(&mut rng, 20), c.to_string()))
        .collect();
    for (vector, key) in &pairs {
        store.insert("t", vector, key).unwrap();
    }
    store.save("t").unwrap();
    assert!(dir.path().join("t_lsh.store").exists());

    for (vector, key) in &pairs {
        store.delete("t", vector, key).unwrap();
        assert!(store.lookup("t", vector, key).is_err());
    }

    store.load("t").unwrap();
    for (vector, key) in &pairs {
        assert!(
            store.lookup("t", vector, key).is_ok(),
            "pair {key} missing after reload"
        );
    }
}

#[test]
fn variants_persist_under_distinct_suffixes() {
    let dir = tempfile::tempdir().unwrap();
    let hnsw = HnswStore::with_dir(dir.path());
    let lsh = LshStore::with_dir(dir.path());
    let mut rng = StdRng::seed_from_u64(42);

    hnsw.insert("same", &random_vector(&mut rng, 8), "a").unwrap();
    lsh.insert("same", &random_vector(&mut rng, 20), "a").unwrap();
    hnsw.save("same").unwrap();
    lsh.save("same").unwrap();

    assert!(dir.path().join("same_hnsw.store").exists());
    assert!(dir.path().join("same_lsh.store").exists());
}

#[test]
fn store_isolation_across_names() {
    let store = HnswStore::new();
    let mut rng = StdRng::seed_from_u64(42);

    for key in 'a'..='e' {
        store
            .insert("s1", &random_vector(&mut rng, 8), &key.to_string())
            .unwrap();
    }
    for key in 'v'..='z' {
        store
            .insert("s2", &random_vector(&mut rng, 8), &key.to_string())
            .unwrap();
    }

    assert!(store.lookup("s1", &[], "a").is_ok());
    assert!(matches!(store.lookup("s1", &[], "z"), Err(Error::NotFound(_))));
    assert!(store.lookup("s2", &[], "z").is_ok());
}

#[test]
fn dimension_errors_pass_through_the_facade() {
    let store = HnswStore::new();
    store.insert("t", &[0.0; 8], "a").unwrap();
    assert!(matches!(
        store.insert("t", &[0.0; 4], "b"),
        Err(Error::DimensionMismatch { expected: 8, actual: 4 })
    ));
    assert!(store.search("t", &[0.0; 4], 1).is_err());
}
