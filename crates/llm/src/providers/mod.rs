//! Service provider implementations.

pub mod mock;
pub mod openai;

pub use mock::{MockChat, MockEmbeddings};
pub use openai::OpenAiClient;
