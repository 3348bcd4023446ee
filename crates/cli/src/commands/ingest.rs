//! Ingest command handler.
//!
//! Extracts text from a document, splits it into passages, and feeds them
//! through the indexing pipeline.

use clap::Args;
use docqa_core::{config::AppConfig, AppError, AppResult};
use docqa_llm::create_embedding_client;
use docqa_retrieval::{index_document, ArtifactPaths, DocumentCatalog, Embedder};
use std::path::{Path, PathBuf};

/// Ingest a document into the index
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Path to the document (.pdf or plain text)
    pub file: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ingest command for {:?}", self.file);
        config.validate()?;

        let text = extract_text(&self.file).await?;
        let passages = split_passages(&text);
        tracing::debug!("Extracted {} passages", passages.len());

        let client = create_embedding_client(
            &config.provider,
            &config.api_base,
            config.api_key.as_deref(),
            &config.embed_model,
        )?;
        let embedder = Embedder::new(client);
        tracing::debug!("Embedding with model {}", embedder.model_name());

        let paths = ArtifactPaths::new(config.docqa_dir());
        let stats = index_document(&embedder, &paths, &passages).await?;

        if stats.passages_indexed > 0 {
            let name = self
                .file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.file.display().to_string());
            DocumentCatalog::new(paths.catalog_path()).add(&name)?;
        }

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else if stats.passages_indexed == 0 {
            println!("No text passages found in {:?}; nothing indexed", self.file);
        } else {
            println!(
                "Indexed {} passages (dimension {}, {} vectors total)",
                stats.passages_indexed, stats.dimension, stats.total_vectors
            );
        }

        Ok(())
    }
}

/// Extract text from the document. PDFs go through `pdf-extract` on a
/// blocking task; anything else is read as UTF-8 text.
async fn extract_text(path: &Path) -> AppResult<String> {
    let bytes = std::fs::read(path)
        .map_err(|e| AppError::Storage(format!("Failed to read {:?}: {}", path, e)))?;

    let is_pdf = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);

    if is_pdf {
        tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| AppError::Storage(format!("PDF extraction task failed: {}", e)))?
            .map_err(|e| AppError::Storage(format!("Failed to extract PDF text: {}", e)))
    } else {
        String::from_utf8(bytes)
            .map_err(|e| AppError::Storage(format!("{:?} is not valid UTF-8: {}", path, e)))
    }
}

/// Split extracted text into passages: page breaks first, then blank-line
/// paragraphs, with whitespace-only pieces dropped.
fn split_passages(text: &str) -> Vec<String> {
    text.split('\u{c}')
        .flat_map(|page| page.split("\n\n"))
        .map(|piece| piece.trim())
        .filter(|piece| !piece.is_empty())
        .map(|piece| piece.to_string())
        .collect()
}
