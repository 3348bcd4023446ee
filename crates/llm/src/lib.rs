//! Service integration crate for docqa.
//!
//! Provides provider-agnostic clients for the two external services the
//! pipelines consume: an embedding service and a chat completion service.
//! Both are abstracted behind traits so the core can be tested against
//! deterministic mock providers.
//!
//! # Providers
//! - **openai**: any OpenAI-compatible REST endpoint
//! - **mock**: deterministic offline providers for tests
//!
//! # Example
//! ```no_run
//! use docqa_llm::{create_embedding_client, EmbeddingClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = create_embedding_client("mock", "", None, "")?;
//! let vector = client.embed("Hello, world!").await?;
//! println!("{} dimensions", vector.len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{
    ChatClient, ChatMessage, ChatRequest, ChatResponse, ChatUsage, EmbeddingClient, Role,
};
pub use factory::{create_chat_client, create_embedding_client};
pub use providers::{MockChat, MockEmbeddings, OpenAiClient};
