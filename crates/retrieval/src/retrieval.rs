//! Retrieval pipeline.
//!
//! Answers a query against the persisted index: embed the question, search
//! the k nearest passages, keep the ones within the distance threshold, and
//! hand back their texts space-joined in ascending-distance order.
//!
//! Retrieval never fails the caller. Any internal error — absent index,
//! embedding service failure, a position with no stored passage — degrades
//! to an empty context string so the chat turn can still proceed.

use crate::embedder::Embedder;
use crate::passage_store::PassageStore;
use crate::paths::ArtifactPaths;
use crate::vector_index::VectorIndex;
use docqa_core::{AppError, AppResult};

/// Default number of nearest passages to consider.
pub const DEFAULT_TOP_K: usize = 2;

/// Default squared-L2 distance cutoff. The comparison is strict: a hit at
/// exactly this distance is dropped.
pub const DEFAULT_DISTANCE_THRESHOLD: f32 = 0.4999;

/// Retrieve context for a query. Returns the surviving passage texts joined
/// with single spaces, closest first, or an empty string when nothing
/// qualifies or any step fails.
pub async fn retrieve(
    embedder: &Embedder,
    paths: &ArtifactPaths,
    query: &str,
    top_k: usize,
    distance_threshold: f32,
) -> String {
    match try_retrieve(embedder, paths, query, top_k, distance_threshold).await {
        Ok(context) => context,
        Err(AppError::IndexUnavailable) => {
            tracing::debug!("No persisted index yet; retrieving empty context");
            String::new()
        }
        Err(e) => {
            tracing::warn!("Retrieval failed, proceeding without context: {}", e);
            String::new()
        }
    }
}

async fn try_retrieve(
    embedder: &Embedder,
    paths: &ArtifactPaths,
    query: &str,
    top_k: usize,
    distance_threshold: f32,
) -> AppResult<String> {
    let query_vector = embedder.embed_query(query).await?;

    let index = VectorIndex::open(&paths.index_path())?;
    let hits = index.search(&query_vector, top_k)?;

    let passages = PassageStore::new(paths.passages_path()).load()?;

    tracing::debug!(
        "Search returned {} hits: {:?}",
        hits.len(),
        hits.iter().map(|(p, d)| (*p, *d)).collect::<Vec<_>>()
    );

    let mut kept = Vec::new();
    for (position, distance) in hits {
        if distance < distance_threshold {
            let text = passages.get(position).ok_or_else(|| {
                AppError::Storage(format!(
                    "index position {} has no stored passage ({} stored)",
                    position,
                    passages.len()
                ))
            })?;
            kept.push(text.clone());
        }
    }

    Ok(kept.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use docqa_llm::MockEmbeddings;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_retrieve_without_index_is_empty() {
        let temp = TempDir::new().unwrap();
        let paths = ArtifactPaths::new(temp.path());
        let embedder = Embedder::new(Arc::new(MockEmbeddings::new(8)));

        let context = retrieve(
            &embedder,
            &paths,
            "anything",
            DEFAULT_TOP_K,
            DEFAULT_DISTANCE_THRESHOLD,
        )
        .await;
        assert_eq!(context, "");
    }

    #[tokio::test]
    async fn test_misaligned_store_degrades_to_empty() {
        // An index with one vector but an empty passage store: the hit's
        // position has no stored passage, which must degrade, not panic.
        let temp = TempDir::new().unwrap();
        let paths = ArtifactPaths::new(temp.path());

        let mut index =
            crate::vector_index::VectorIndex::open_or_create(&paths.index_path(), 3).unwrap();
        index.add(&[vec![1.0, 0.0, 0.0]]).unwrap();
        index.persist().unwrap();

        let embedder = Embedder::new(
            Arc::new(MockEmbeddings::new(3).with_vector("q", vec![1.0, 0.0, 0.0])),
        );

        let context = retrieve(&embedder, &paths, "q", 1, 0.5).await;
        assert_eq!(context, "");
    }
}
