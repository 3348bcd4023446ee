//! Service client factory.
//!
//! Creates embedding and chat clients from application configuration.
//! Credentials are resolved once here and owned by the returned client;
//! there is no process-global service state.

use crate::client::{ChatClient, EmbeddingClient};
use crate::providers::{MockChat, MockEmbeddings, OpenAiClient};
use docqa_core::{AppError, AppResult};
use std::sync::Arc;

/// Default mock embedding dimension, matching text-embedding-ada-002.
const MOCK_DIMENSIONS: usize = 1536;

/// Create an embedding client for the given provider.
///
/// # Arguments
/// * `provider` - Provider identifier ("openai" or "mock")
/// * `api_base` - Base URL of the OpenAI-compatible API
/// * `api_key` - API key (required for "openai")
/// * `embed_model` - Embedding model identifier
pub fn create_embedding_client(
    provider: &str,
    api_base: &str,
    api_key: Option<&str>,
    embed_model: &str,
) -> AppResult<Arc<dyn EmbeddingClient>> {
    match provider.to_lowercase().as_str() {
        "openai" => {
            let key = api_key.ok_or_else(|| {
                AppError::Config("openai provider requires an API key".to_string())
            })?;
            let client = OpenAiClient::new(api_base, key, embed_model)?;
            Ok(Arc::new(client))
        }
        "mock" => Ok(Arc::new(MockEmbeddings::new(MOCK_DIMENSIONS))),
        _ => Err(AppError::Config(format!(
            "Unknown provider: '{}'. Supported providers: openai, mock",
            provider
        ))),
    }
}

/// Create a chat completion client for the given provider.
pub fn create_chat_client(
    provider: &str,
    api_base: &str,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn ChatClient>> {
    match provider.to_lowercase().as_str() {
        "openai" => {
            let key = api_key.ok_or_else(|| {
                AppError::Config("openai provider requires an API key".to_string())
            })?;
            // The embed model is unused on the chat path but part of the
            // shared client construction.
            let client = OpenAiClient::new(api_base, key, "")?;
            Ok(Arc::new(client))
        }
        "mock" => Ok(Arc::new(MockChat::new())),
        _ => Err(AppError::Config(format!(
            "Unknown provider: '{}'. Supported providers: openai, mock",
            provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_mock_clients() {
        let embed = create_embedding_client("mock", "", None, "").unwrap();
        assert_eq!(embed.provider_name(), "mock");

        let chat = create_chat_client("mock", "", None).unwrap();
        assert_eq!(chat.provider_name(), "mock");
    }

    #[test]
    fn test_openai_requires_api_key() {
        let result = create_embedding_client(
            "openai",
            "https://api.openai.com/v1",
            None,
            "text-embedding-ada-002",
        );
        assert!(result.is_err());

        let result = create_chat_client("openai", "https://api.openai.com/v1", None);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_provider() {
        match create_embedding_client("unknown", "", None, "") {
            Err(err) => assert!(err.to_string().contains("Unknown provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}
