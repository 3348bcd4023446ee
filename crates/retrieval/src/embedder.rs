//! Embedder adapter between the pipelines and the embedding service.
//!
//! Wraps an [`EmbeddingClient`] with the batch policy the pipelines need:
//! passage batches are embedded in service-call chunks with a pause between
//! calls once a batch grows past the throttle size, so large documents do
//! not trip provider rate limits. The pause is a fixed, bounded policy and
//! never blocks indefinitely.

use docqa_core::{AppError, AppResult};
use docqa_llm::EmbeddingClient;
use std::sync::Arc;
use std::time::Duration;

/// Batches larger than this are split across multiple service calls.
pub const THROTTLE_BATCH: usize = 20;

/// Pause between successive service calls for large batches.
const THROTTLE_DELAY: Duration = Duration::from_secs(1);

/// Stateless embedding adapter. Holds the service client by `Arc`; safe to
/// share between the indexing and retrieval pipelines.
#[derive(Debug, Clone)]
pub struct Embedder {
    client: Arc<dyn EmbeddingClient>,
}

impl Embedder {
    pub fn new(client: Arc<dyn EmbeddingClient>) -> Self {
        Self { client }
    }

    /// Embed a batch of passages, one vector per passage, in input order.
    pub async fn embed_passages(&self, passages: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if passages.is_empty() {
            return Ok(Vec::new());
        }

        if passages.len() <= THROTTLE_BATCH {
            return self.client.embed_batch(passages).await;
        }

        tracing::info!(
            "Embedding {} passages in throttled chunks of {}",
            passages.len(),
            THROTTLE_BATCH
        );

        let mut embeddings = Vec::with_capacity(passages.len());
        for (i, chunk) in passages.chunks(THROTTLE_BATCH).enumerate() {
            if i > 0 {
                tokio::time::sleep(THROTTLE_DELAY).await;
            }
            embeddings.extend(self.client.embed_batch(chunk).await?);
        }

        Ok(embeddings)
    }

    /// Embed a single query string.
    pub async fn embed_query(&self, query: &str) -> AppResult<Vec<f32>> {
        self.client.embed(query).await
    }

    /// Name of the backing embedding model.
    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }
}

/// Validate that every vector in a batch has the same nonzero length and
/// return that length.
///
/// Heterogeneous batches are rejected before anything reaches the index, so
/// a bad batch can never half-commit.
pub fn uniform_dimension(vectors: &[Vec<f32>]) -> AppResult<usize> {
    let first = vectors
        .first()
        .ok_or_else(|| AppError::Embedding("Embedding batch is empty".to_string()))?;

    let expected = first.len();
    if expected == 0 {
        return Err(AppError::Embedding(
            "Embedding service returned an empty vector".to_string(),
        ));
    }

    for vector in vectors {
        if vector.len() != expected {
            return Err(AppError::InconsistentEmbeddingLength {
                expected,
                found: vector.len(),
            });
        }
    }

    Ok(expected)
}
