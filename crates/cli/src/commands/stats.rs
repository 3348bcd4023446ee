//! Stats command handler.
//!
//! Reports the state of the persisted index, passage store, and document
//! catalog.

use clap::Args;
use docqa_core::{config::AppConfig, AppResult};
use docqa_retrieval::{stats, ArtifactPaths};

/// Show index and passage store statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let paths = ArtifactPaths::new(config.docqa_dir());
        let corpus = stats(&paths)?;

        if self.json {
            let output = serde_json::json!({
                "passageCount": corpus.passage_count,
                "vectorCount": corpus.vector_count,
                "dimension": corpus.dimension,
                "indexBytes": corpus.index_bytes,
                "documents": corpus.documents,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("Passages: {}", corpus.passage_count);
            println!("Vectors:  {}", corpus.vector_count);
            match corpus.dimension {
                Some(dimension) => println!("Dimension: {}", dimension),
                None => println!("Dimension: (no index)"),
            }
            println!("Index size: {} bytes", corpus.index_bytes);
            if corpus.documents.is_empty() {
                println!("Documents: (none)");
            } else {
                println!("Documents:");
                for name in &corpus.documents {
                    println!("  {}", name);
                }
            }

            if corpus.passage_count != corpus.vector_count {
                println!(
                    "warning: passage store ({}) and index ({}) disagree; run 'docqa reset' and re-ingest",
                    corpus.passage_count, corpus.vector_count
                );
            }
        }

        Ok(())
    }
}
