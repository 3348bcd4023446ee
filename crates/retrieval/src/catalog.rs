//! Catalog of ingested document names.
//!
//! A thin JSON-array artifact next to the passage store, recording which
//! documents have been ingested. Purely informational; the pipelines never
//! read it.

use docqa_core::{AppError, AppResult};
use std::path::PathBuf;

/// Persisted list of ingested document names.
#[derive(Debug, Clone)]
pub struct DocumentCatalog {
    path: PathBuf,
}

impl DocumentCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// List document names in ingestion order. Missing file is an empty
    /// catalog.
    pub fn list(&self) -> AppResult<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            AppError::Storage(format!("Failed to read catalog {:?}: {}", self.path, e))
        })?;

        let names: Vec<String> = serde_json::from_str(&contents).map_err(|e| {
            AppError::Storage(format!("Catalog {:?} is malformed: {}", self.path, e))
        })?;

        Ok(names)
    }

    /// Record an ingested document name.
    pub fn add(&self, name: &str) -> AppResult<()> {
        let mut names = self.list()?;
        names.push(name.to_string());

        let json = serde_json::to_string(&names)?;
        std::fs::write(&self.path, json).map_err(|e| {
            AppError::Storage(format!("Failed to write catalog {:?}: {}", self.path, e))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_add_and_list() {
        let temp = TempDir::new().unwrap();
        let catalog = DocumentCatalog::new(temp.path().join("documents.json"));

        assert_eq!(catalog.list().unwrap(), Vec::<String>::new());

        catalog.add("report.pdf").unwrap();
        catalog.add("notes.txt").unwrap();
        assert_eq!(catalog.list().unwrap(), vec!["report.pdf", "notes.txt"]);
    }
}
