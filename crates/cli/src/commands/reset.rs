//! Reset command handler.
//!
//! Deletes all persisted artifacts (index, passage store, document
//! catalog), each independently and best-effort.

use clap::Args;
use docqa_core::{config::AppConfig, AppError, AppResult};
use docqa_retrieval::{reset, ArtifactPaths, WipeOutcome};

/// Delete all persisted artifacts
#[derive(Args, Debug)]
pub struct ResetCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ResetCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing reset command");

        let paths = ArtifactPaths::new(config.docqa_dir());
        let report = reset(&paths);

        if self.json {
            let output = serde_json::json!({
                "index": describe(&report.index),
                "passages": describe(&report.passages),
                "documents": describe(&report.documents),
                "allClear": report.all_clear(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("index:     {}", describe(&report.index));
            println!("passages:  {}", describe(&report.passages));
            println!("documents: {}", describe(&report.documents));
        }

        if report.all_clear() {
            Ok(())
        } else {
            Err(AppError::Storage(
                "Some artifacts could not be removed".to_string(),
            ))
        }
    }
}

fn describe(outcome: &WipeOutcome) -> String {
    match outcome {
        WipeOutcome::Deleted => "deleted".to_string(),
        WipeOutcome::NotFound => "not present".to_string(),
        WipeOutcome::Failed(reason) => format!("failed: {}", reason),
    }
}
