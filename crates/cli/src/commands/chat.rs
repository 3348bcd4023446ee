//! Chat command handler.
//!
//! Interactive question-answering loop over stdin. One session holds the
//! rolling conversation history; every turn is grounded with fresh
//! retrieval.

use clap::Args;
use docqa_core::{config::AppConfig, AppResult};
use docqa_llm::{create_chat_client, create_embedding_client};
use docqa_retrieval::{ArtifactPaths, ChatSession, Embedder};
use std::io::{BufRead, Write};

/// Interactive question-answering session
#[derive(Args, Debug)]
pub struct ChatCommand {}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Starting interactive chat session");
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

        println!("docqa chat ({}). Type 'exit' or press Ctrl-D to quit.", config.model);

        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        loop {
            print!("> ");
            stdout.flush()?;

            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                // EOF
                println!();
                break;
            }

            let question = line.trim();
            if question.is_empty() {
                continue;
            }
            if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
                break;
            }

            match session.answer_grounded(&embedder, &paths, question).await {
                Ok(answer) => println!("{}\n", answer),
                Err(e) => {
                    tracing::error!("Chat turn failed: {}", e);
                    eprintln!("error: {}\n", e);
                }
            }
        }

        Ok(())
    }
}
