//! Indexing pipeline.
//!
//! Orchestrates the embedder, vector index, and passage store to ingest a
//! batch of passages, guaranteeing positional alignment between the index
//! and the store: the i-th passage appended here corresponds to the i-th
//! vector added to the index, for the lifetime of both artifacts.

use crate::embedder::{uniform_dimension, Embedder};
use crate::passage_store::PassageStore;
use crate::paths::ArtifactPaths;
use crate::vector_index::VectorIndex;
use docqa_core::AppResult;
use serde::Serialize;

/// Outcome of one successful indexing call.
#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    /// Passages indexed by this call
    pub passages_indexed: usize,

    /// Embedding dimension observed for the batch
    pub dimension: usize,

    /// Total vectors in the index after this call
    pub total_vectors: usize,
}

/// Ingest a batch of passages: embed, index, persist, and append the same
/// passages in the same order to the passage store.
///
/// There is no rollback: a failure after the index has been persisted but
/// before the store append leaves the on-disk pair in a partially-updated
/// state. The documented recovery is a bulk [`reset`](crate::reset)
/// followed by re-ingesting from scratch. There is also no locking; callers
/// must not run two indexing calls, or an indexing call and a retrieval,
/// concurrently against the same artifacts.
pub async fn index_document(
    embedder: &Embedder,
    paths: &ArtifactPaths,
    passages: &[String],
) -> AppResult<IndexStats> {
    if passages.is_empty() {
        tracing::warn!("Indexing called with no passages; nothing to do");
        return Ok(IndexStats {
            passages_indexed: 0,
            dimension: 0,
            total_vectors: 0,
        });
    }

    tracing::info!("Indexing {} passages", passages.len());

    // Embed everything before touching persisted state, so an embedding
    // failure can never half-commit a batch.
    let embeddings = embedder.embed_passages(passages).await?;
    let dimension = uniform_dimension(&embeddings)?;

    paths.ensure_dir()?;

    let mut index = VectorIndex::open_or_create(&paths.index_path(), dimension)?;
    index.train_if_needed(&embeddings)?;
    index.add(&embeddings)?;
    index.persist()?;

    // Same passages, same order, same invocation: this is what keeps
    // store position i aligned with index position i.
    let total = PassageStore::new(paths.passages_path()).append(passages)?;

    if total != index.len() {
        // A torn pair from an earlier failed run; positions are unreliable
        // until a reset and re-ingest.
        tracing::warn!(
            "Passage store ({}) and index ({}) disagree after ingest",
            total,
            index.len()
        );
    }

    tracing::info!(
        "Indexed {} passages (dimension {}, {} vectors total)",
        passages.len(),
        dimension,
        index.len()
    );

    Ok(IndexStats {
        passages_indexed: passages.len(),
        dimension,
        total_vectors: index.len(),
    })
}
