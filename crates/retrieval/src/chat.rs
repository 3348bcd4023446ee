//! Grounded chat session.
//!
//! Holds the rolling conversation window and wraps each query with its
//! retrieved context in a fixed delimiter format before handing the turn to
//! the chat completion service. The session owns no retrieval state beyond
//! the history; context comes in per turn from the retrieval pipeline.

use crate::embedder::Embedder;
use crate::paths::ArtifactPaths;
use crate::retrieval::{retrieve, DEFAULT_DISTANCE_THRESHOLD, DEFAULT_TOP_K};
use docqa_core::AppResult;
use docqa_llm::{ChatClient, ChatMessage, ChatRequest};
use std::sync::Arc;

/// System prompt steering the assistant to answer from context only.
pub const SYSTEM_PROMPT: &str = "\
You are an assistant that answers user questions using only the supplied \
context. Follow these rules:

1. Keep answers concise and specific to the question.
2. Use earlier turns of the conversation to resolve follow-up questions.
3. Respond to greetings normally.
4. Do not draw on outside knowledge beyond the supplied context.
5. If the context does not contain the answer, say the question is outside \
your knowledge.
6. Answer in English only.
";

/// Delimiter wrapping the query and context blocks.
const DELIMITER: &str = "####";

/// Once the history exceeds this many messages it is trimmed...
const HISTORY_CAP: usize = 5;

/// ...down to this many, keeping the most recent exchanges.
const HISTORY_KEEP: usize = 4;

/// Sampling temperature for grounded answers.
const TEMPERATURE: f32 = 0.1;

/// A conversation with bounded rolling history.
pub struct ChatSession {
    client: Arc<dyn ChatClient>,
    model: String,
    history: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(client: Arc<dyn ChatClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            history: Vec::new(),
        }
    }

    /// Number of retained history messages (user and assistant combined).
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Answer a query given already-retrieved context.
    ///
    /// Builds system prompt + trimmed history + the wrapped current turn,
    /// completes it, and records the raw query and the reply in history.
    pub async fn answer(&mut self, query: &str, context: &str) -> AppResult<String> {
        self.trim_history();

        let mut messages = vec![ChatMessage::system(SYSTEM_PROMPT)];
        messages.extend(self.history.iter().cloned());
        messages.push(ChatMessage::user(wrap_query(query, context)));

        let request =
            ChatRequest::new(messages, self.model.clone()).with_temperature(TEMPERATURE);
        let response = self.client.complete(&request).await?;

        self.history.push(ChatMessage::user(query));
        self.history.push(ChatMessage::assistant(response.content.clone()));

        Ok(response.content)
    }

    /// Retrieve context for the query, then answer the turn with it.
    ///
    /// Retrieval degrades to an empty context on failure, so this only
    /// errors when the completion service itself does.
    pub async fn answer_grounded(
        &mut self,
        embedder: &Embedder,
        paths: &ArtifactPaths,
        query: &str,
    ) -> AppResult<String> {
        let context = retrieve(
            embedder,
            paths,
            query,
            DEFAULT_TOP_K,
            DEFAULT_DISTANCE_THRESHOLD,
        )
        .await;

        if context.is_empty() {
            tracing::debug!("Answering without retrieved context");
        }

        self.answer(query, &context).await
    }

    fn trim_history(&mut self) {
        if self.history.len() > HISTORY_CAP {
            let drop = self.history.len() - HISTORY_KEEP;
            self.history.drain(..drop);
        }
    }
}

/// Wrap the current query and its retrieved context in the delimiter format
/// the system prompt refers to.
fn wrap_query(query: &str, context: &str) -> String {
    format!(
        "Query:\n{delim} {query} {delim}\n\ncontext:\n{delim} {context} {delim}\n",
        delim = DELIMITER,
        query = query,
        context = context
    )
}
