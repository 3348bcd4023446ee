//! OpenAI-compatible service provider.
//!
//! Talks to any endpoint exposing the OpenAI REST surface:
//! `POST {base}/embeddings` and `POST {base}/chat/completions`.

use crate::client::{ChatClient, ChatMessage, ChatRequest, ChatResponse, ChatUsage, EmbeddingClient};
use async_trait::async_trait;
use docqa_core::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Maximum retry attempts for failed embedding requests
const MAX_RETRIES: u32 = 3;

/// Initial backoff duration in milliseconds
const INITIAL_BACKOFF_MS: u64 = 100;

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client for an OpenAI-compatible API, serving both embeddings and chat
/// completions.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    /// HTTP client for API requests
    client: Client,
    /// API base URL (e.g., "https://api.openai.com/v1")
    base_url: String,
    /// Bearer token
    api_key: String,
    /// Embedding model name (e.g., "text-embedding-ada-002")
    embed_model: String,
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

/// One item of the embeddings response. The vector field is kept untyped so
/// a missing or nested payload can be diagnosed instead of failing the whole
/// deserialization opaquely.
#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    embedding: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct CompletionsRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct CompletionsResponse {
    model: String,
    choices: Vec<CompletionChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: String,
}

impl OpenAiClient {
    /// Create a new client for an OpenAI-compatible endpoint.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        embed_model: impl Into<String>,
    ) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Embedding(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            embed_model: embed_model.into(),
        })
    }

    async fn embed_once(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let url = format!("{}/embeddings", self.base_url);
        let request = EmbeddingsRequest {
            model: &self.embed_model,
            input: texts,
        };

        debug!("Sending embedding request for {} texts to {}", texts.len(), url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Embedding(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Embedding(format!(
                "Embedding API error ({}): {}",
                status, error_text
            )));
        }

        let body: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| AppError::Embedding(format!("Failed to parse response: {}", e)))?;

        if body.data.len() != texts.len() {
            return Err(AppError::Embedding(format!(
                "Embedding API returned {} vectors for {} inputs",
                body.data.len(),
                texts.len()
            )));
        }

        body.data
            .into_iter()
            .map(|item| {
                let value = item.embedding.ok_or_else(|| {
                    AppError::Embedding("Response item is missing the embedding field".to_string())
                })?;
                flatten_embedding(&value)
            })
            .collect()
    }

    /// Embed a batch with exponential-backoff retries.
    async fn embed_with_retries(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let mut attempt = 0;
        let mut last_error = None;

        while attempt < MAX_RETRIES {
            match self.embed_once(texts).await {
                Ok(embeddings) => return Ok(embeddings),
                Err(e) => {
                    attempt += 1;
                    last_error = Some(e);

                    if attempt < MAX_RETRIES {
                        let backoff_ms = INITIAL_BACKOFF_MS * 2_u64.pow(attempt);
                        warn!(
                            "Embedding request failed (attempt {}/{}), retrying in {}ms",
                            attempt, MAX_RETRIES, backoff_ms
                        );
                        tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| AppError::Embedding("Unknown embedding error".to_string())))
    }
}

/// Convert an untyped wire embedding into `Vec<f32>`, flattening one level of
/// accidental nesting (`[[..]]` payloads observed from some gateways).
fn flatten_embedding(value: &serde_json::Value) -> AppResult<Vec<f32>> {
    let items = value
        .as_array()
        .ok_or_else(|| AppError::Embedding("Embedding field is not an array".to_string()))?;

    let mut flat = Vec::with_capacity(items.len());
    for item in items {
        match item {
            serde_json::Value::Number(n) => {
                flat.push(n.as_f64().ok_or_else(|| {
                    AppError::Embedding("Embedding value is not a valid number".to_string())
                })? as f32);
            }
            serde_json::Value::Array(inner) => {
                for v in inner {
                    let n = v.as_f64().ok_or_else(|| {
                        AppError::Embedding("Nested embedding value is not a number".to_string())
                    })?;
                    flat.push(n as f32);
                }
            }
            _ => {
                return Err(AppError::Embedding(
                    "Embedding contains a non-numeric value".to_string(),
                ))
            }
        }
    }

    if flat.is_empty() {
        return Err(AppError::Embedding("Embedding array is empty".to_string()));
    }

    Ok(flat)
}

#[async_trait]
impl EmbeddingClient for OpenAiClient {
    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.embed_model
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        self.embed_with_retries(texts).await
    }
}

#[async_trait]
impl ChatClient for OpenAiClient {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        let url = format!("{}/chat/completions", self.base_url);
        let wire_request = CompletionsRequest {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        debug!(
            "Sending chat completion request ({} messages) to {}",
            request.messages.len(),
            url
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&wire_request)
            .send()
            .await
            .map_err(|e| AppError::Chat(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Chat(format!(
                "Chat API error ({}): {}",
                status, error_text
            )));
        }

        let body: CompletionsResponse = response
            .json()
            .await
            .map_err(|e| AppError::Chat(format!("Failed to parse response: {}", e)))?;

        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Chat("Response contained no choices".to_string()))?;

        Ok(ChatResponse {
            content: choice.message.content,
            model: body.model,
            usage: body.usage.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_plain_embedding() {
        let value = json!([0.1, 0.2, 0.3]);
        let flat = flatten_embedding(&value).unwrap();
        assert_eq!(flat.len(), 3);
        assert!((flat[1] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_flatten_nested_embedding() {
        let value = json!([[0.1, 0.2], [0.3, 0.4]]);
        let flat = flatten_embedding(&value).unwrap();
        assert_eq!(flat, vec![0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn test_flatten_rejects_non_numeric() {
        let value = json!(["a", "b"]);
        assert!(flatten_embedding(&value).is_err());

        let value = json!("not an array");
        assert!(flatten_embedding(&value).is_err());
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client =
            OpenAiClient::new("https://api.openai.com/v1/", "sk-test", "text-embedding-ada-002")
                .unwrap();
        assert_eq!(client.base_url, "https://api.openai.com/v1");
        assert_eq!(
            EmbeddingClient::provider_name(&client),
            "openai"
        );
        assert_eq!(client.model_name(), "text-embedding-ada-002");
    }
}
