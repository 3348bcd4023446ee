//! Ask command handler.
//!
//! Answers a single question against the indexed documents.

use clap::Args;
use docqa_core::{config::AppConfig, AppResult};
use docqa_llm::{create_chat_client, create_embedding_client};
use docqa_retrieval::{ArtifactPaths, ChatSession, Embedder};

/// Ask a single question against the indexed documents
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        config.validate()?;

        let embedding_client = create_embedding_client(
            &config.provider,
            &config.api_base,
            config.api_key.as_deref(),
            &config.embed_model,
        )?;
        let chat_client =
            create_chat_client(&config.provider, &config.api_base, config.api_key.as_deref())?;

        let embedder = Embedder::new(embedding_client);
        let paths = ArtifactPaths::new(config.docqa_dir());
        let mut session = ChatSession::new(chat_client, &config.model);

        let answer = session
            .answer_grounded(&embedder, &paths, &self.question)
            .await?;

        if self.json {
            let output = serde_json::json!({
                "question": self.question,
                "answer": answer,
                "model": config.model,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", answer);
        }

        Ok(())
    }
}
