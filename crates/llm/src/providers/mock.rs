//! Deterministic mock providers for tests and offline development.

use crate::client::{ChatClient, ChatRequest, ChatResponse, ChatUsage, EmbeddingClient};
use async_trait::async_trait;
use docqa_core::AppResult;
use std::collections::HashMap;

/// Mock embedding provider.
///
/// Generates deterministic, content-derived, unit-normalized vectors by
/// hashing word tokens into dimensions. Not semantically meaningful, but
/// identical texts always map to identical vectors, which is what the
/// pipeline tests rely on. Individual texts can be pinned to exact vectors
/// with [`MockEmbeddings::with_vector`] when a test needs to control
/// distances precisely.
#[derive(Debug)]
pub struct MockEmbeddings {
    dimensions: usize,
    fixtures: HashMap<String, Vec<f32>>,
}

impl MockEmbeddings {
    /// Create a new mock provider with the given output dimension.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            fixtures: HashMap::new(),
        }
    }

    /// Pin an exact vector for a specific input text.
    pub fn with_vector(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        self.fixtures.insert(text.into(), vector);
        self
    }

    /// Get the output dimension.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn generate(&self, text: &str) -> Vec<f32> {
        if let Some(vector) = self.fixtures.get(text) {
            return vector.clone();
        }

        let mut embedding = vec![0.0f32; self.dimensions];

        for word in text.to_lowercase().split_whitespace() {
            let word_hash = word
                .bytes()
                .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
            embedding[(word_hash as usize) % self.dimensions] += 1.0;

            // Character bigrams spread each word over several dimensions so
            // overlapping vocabularies land closer than disjoint ones.
            let bytes = word.as_bytes();
            for pair in bytes.windows(2) {
                let bigram_hash = (pair[0] as u64)
                    .wrapping_mul(37)
                    .wrapping_add(pair[1] as u64);
                embedding[(bigram_hash as usize) % self.dimensions] += 0.5;
            }
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

#[async_trait]
impl EmbeddingClient for MockEmbeddings {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-hash-v1"
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.generate(text)).collect())
    }
}

/// Mock chat provider that echoes a deterministic reply.
///
/// Useful for exercising the chat session (history trimming, prompt
/// assembly) without a live completion service.
#[derive(Debug, Default)]
pub struct MockChat;

impl MockChat {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ChatClient for MockChat {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        let last_user = request
            .messages
            .iter()
            .rev()
            .find(|m| matches!(m.role, crate::client::Role::User))
            .map(|m| m.content.as_str())
            .unwrap_or("");

        Ok(ChatResponse {
            content: format!("mock answer ({} messages): {}", request.messages.len(), last_user),
            model: request.model.clone(),
            usage: ChatUsage::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_embeddings_deterministic() {
        let provider = MockEmbeddings::new(64);

        let a = provider.embed("deterministic test").await.unwrap();
        let b = provider.embed("deterministic test").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[tokio::test]
    async fn test_mock_embeddings_normalized() {
        let provider = MockEmbeddings::new(64);
        let embedding = provider.embed("hello world").await.unwrap();

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_mock_embeddings_different_texts_differ() {
        let provider = MockEmbeddings::new(64);

        let a = provider.embed("cats are mammals").await.unwrap();
        let b = provider.embed("paris is a city").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_mock_embeddings_fixture_override() {
        let provider = MockEmbeddings::new(3).with_vector("pinned", vec![1.0, 0.0, 0.0]);

        let embedding = provider.embed("pinned").await.unwrap();
        assert_eq!(embedding, vec![1.0, 0.0, 0.0]);
    }

    #[tokio::test]
    async fn test_mock_embeddings_batch_order() {
        let provider = MockEmbeddings::new(32);
        let texts = vec!["first".to_string(), "second".to_string()];

        let batch = provider.embed_batch(&texts).await.unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0], provider.embed("first").await.unwrap());
        assert_eq!(batch[1], provider.embed("second").await.unwrap());
    }

    #[tokio::test]
    async fn test_mock_chat_replies() {
        use crate::client::ChatMessage;

        let chat = MockChat::new();
        let request = ChatRequest::new(
            vec![ChatMessage::system("sys"), ChatMessage::user("question")],
            "mock-model",
        );

        let response = chat.complete(&request).await.unwrap();
        assert!(response.content.contains("question"));
        assert_eq!(response.model, "mock-model");
    }
}
