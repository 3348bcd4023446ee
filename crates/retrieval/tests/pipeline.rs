//! End-to-end tests of the indexing and retrieval pipelines over real
//! on-disk artifacts, using the deterministic mock embedding provider.

use docqa_llm::{EmbeddingClient, MockEmbeddings};
use docqa_retrieval::{
    index_document, reset, retrieve, ArtifactPaths, Embedder, PassageStore, VectorIndex,
    DEFAULT_DISTANCE_THRESHOLD, DEFAULT_TOP_K,
};
use std::sync::Arc;
use tempfile::TempDir;

fn setup(dim: usize) -> (TempDir, ArtifactPaths, Embedder) {
    let temp = TempDir::new().unwrap();
    let paths = ArtifactPaths::new(temp.path());
    let embedder = Embedder::new(Arc::new(MockEmbeddings::new(dim)));
    (temp, paths, embedder)
}

fn strings(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn indexing_appends_passages_in_order() {
    let (_temp, paths, embedder) = setup(32);

    let first = strings(&["one", "two"]);
    let stats = index_document(&embedder, &paths, &first).await.unwrap();
    assert_eq!(stats.passages_indexed, 2);
    assert_eq!(stats.total_vectors, 2);

    let second = strings(&["three"]);
    let stats = index_document(&embedder, &paths, &second).await.unwrap();
    assert_eq!(stats.total_vectors, 3);

    // The store grew by exactly the batch sizes, in input order.
    let stored = PassageStore::new(paths.passages_path()).load().unwrap();
    assert_eq!(stored, vec!["one", "two", "three"]);
}

#[tokio::test]
async fn exact_vector_roundtrip_finds_its_own_position() {
    let (_temp, paths, embedder) = setup(32);

    let passages = strings(&["cats are mammals", "dogs are mammals", "paris is a city"]);
    index_document(&embedder, &paths, &passages).await.unwrap();

    // Searching with the exact embedding of an indexed passage returns that
    // passage's position at distance 0.
    let client = MockEmbeddings::new(32);
    let vector = client.embed("dogs are mammals").await.unwrap();

    let index = VectorIndex::open(&paths.index_path()).unwrap();
    let hits = index.search(&vector, 1).unwrap();
    assert_eq!(hits[0].0, 1);
    assert!(hits[0].1 < 1e-6);
}

#[tokio::test]
async fn inconsistent_embedding_lengths_commit_nothing() {
    let temp = TempDir::new().unwrap();
    let paths = ArtifactPaths::new(temp.path());

    // Pin one passage to a vector of the wrong width so the batch is
    // heterogeneous.
    let client = MockEmbeddings::new(8).with_vector("bad", vec![1.0, 0.0]);
    let embedder = Embedder::new(Arc::new(client));

    let result = index_document(&embedder, &paths, &strings(&["good", "bad"])).await;
    assert!(matches!(
        result,
        Err(docqa_core::AppError::InconsistentEmbeddingLength { .. })
    ));

    // Neither artifact was created.
    assert!(!paths.index_path().exists());
    assert!(!paths.passages_path().exists());
}

#[tokio::test]
async fn retrieve_before_any_indexing_is_empty_string() {
    let (_temp, paths, embedder) = setup(16);

    let context = retrieve(
        &embedder,
        &paths,
        "what kind of animal is a dog",
        DEFAULT_TOP_K,
        DEFAULT_DISTANCE_THRESHOLD,
    )
    .await;

    assert_eq!(context, "");
}

#[tokio::test]
async fn threshold_filter_is_strict() {
    let temp = TempDir::new().unwrap();
    let paths = ArtifactPaths::new(temp.path());

    // Squared distances chosen to be exact in f32: the query sits at the
    // origin, so d^2 is just the passage vector's squared norm.
    //   kept:       (0.25, 0, 0) -> d^2 = 0.0625
    //   borderline: (0.5, 0, 0)  -> d^2 = 0.25, equal to the threshold;
    //               the strict comparison excludes it.
    let client = MockEmbeddings::new(3)
        .with_vector("kept passage", vec![0.25, 0.0, 0.0])
        .with_vector("borderline passage", vec![0.5, 0.0, 0.0])
        .with_vector("query", vec![0.0, 0.0, 0.0]);
    let embedder = Embedder::new(Arc::new(client));

    index_document(
        &embedder,
        &paths,
        &strings(&["kept passage", "borderline passage"]),
    )
    .await
    .unwrap();

    let context = retrieve(&embedder, &paths, "query", 2, 0.25).await;
    assert_eq!(context, "kept passage");
}

#[tokio::test]
async fn top_two_passages_survive_distant_third() {
    let temp = TempDir::new().unwrap();
    let paths = ArtifactPaths::new(temp.path());

    let client = MockEmbeddings::new(4)
        .with_vector("cats are mammals", vec![1.0, 0.1, 0.0, 0.0])
        .with_vector("dogs are mammals", vec![1.0, 0.0, 0.05, 0.0])
        .with_vector("paris is a city", vec![0.0, 0.0, 0.0, 1.0])
        .with_vector("what kind of animal is a dog", vec![1.0, 0.05, 0.05, 0.0]);
    let embedder = Embedder::new(Arc::new(client));

    index_document(
        &embedder,
        &paths,
        &strings(&["cats are mammals", "dogs are mammals", "paris is a city"]),
    )
    .await
    .unwrap();

    let context = retrieve(
        &embedder,
        &paths,
        "what kind of animal is a dog",
        2,
        DEFAULT_DISTANCE_THRESHOLD,
    )
    .await;

    // Both mammal passages qualify; the city passage is never in the top 2.
    // Space-joined, ascending distance.
    assert_eq!(context, "dogs are mammals cats are mammals");
}

#[tokio::test]
async fn indexing_into_torn_pair_still_completes() {
    let (_temp, paths, embedder) = setup(16);

    index_document(&embedder, &paths, &strings(&["alpha", "beta"]))
        .await
        .unwrap();

    // Simulate a prior run that died between the index persist and the
    // store append: the store carries an extra passage the index never saw.
    let store = PassageStore::new(paths.passages_path());
    store.append(&strings(&["orphan"])).unwrap();

    // Ingesting more data into the degraded pair must succeed; recovery is
    // a reset plus re-ingest, not a refusal to index.
    let stats = index_document(&embedder, &paths, &strings(&["gamma"]))
        .await
        .unwrap();
    assert_eq!(stats.passages_indexed, 1);
    assert_eq!(stats.total_vectors, 3);
    assert_eq!(store.load().unwrap().len(), 4);
}

#[tokio::test]
async fn reset_then_reindex_matches_fresh_state() {
    let (_temp, paths, embedder) = setup(16);

    let passages = strings(&["alpha", "beta"]);
    index_document(&embedder, &paths, &passages).await.unwrap();
    index_document(&embedder, &paths, &passages).await.unwrap();
    assert_eq!(
        PassageStore::new(paths.passages_path()).load().unwrap().len(),
        4
    );

    let report = reset(&paths);
    assert!(report.all_clear());
    assert!(!paths.index_path().exists());
    assert!(!paths.passages_path().exists());

    index_document(&embedder, &paths, &passages).await.unwrap();
    let stored = PassageStore::new(paths.passages_path()).load().unwrap();
    assert_eq!(stored, vec!["alpha", "beta"]);

    let index = VectorIndex::open(&paths.index_path()).unwrap();
    assert_eq!(index.len(), 2);
}

#[tokio::test]
async fn growing_corpus_keeps_positions_aligned() {
    let (_temp, paths, embedder) = setup(32);

    // Index in three separate calls, then verify every passage still finds
    // itself at distance 0 via its own embedding.
    for batch in [&["p0", "p1"][..], &["p2"][..], &["p3", "p4", "p5"][..]] {
        index_document(&embedder, &paths, &strings(batch)).await.unwrap();
    }

    let stored = PassageStore::new(paths.passages_path()).load().unwrap();
    let index = VectorIndex::open(&paths.index_path()).unwrap();
    assert_eq!(stored.len(), index.len());

    let client = MockEmbeddings::new(32);
    for (position, text) in stored.iter().enumerate() {
        let vector = client.embed(text).await.unwrap();
        let hits = index.search(&vector, 1).unwrap();
        assert_eq!(hits[0].0, position, "passage {:?} moved", text);
        assert!(hits[0].1 < 1e-6);
    }
}
