//! Append-only passage store.
//!
//! An ordered sequence of passage texts persisted as a single JSON array of
//! strings, read and written wholesale. Position *i* in the store must
//! always correspond to the *i*-th vector ever added to the vector index;
//! that correspondence is enforced by the indexing pipeline's calling
//! convention, not by the store itself.

use docqa_core::{AppError, AppResult};
use std::path::{Path, PathBuf};

/// Durable mapping from zero-based position to passage text.
#[derive(Debug, Clone)]
pub struct PassageStore {
    path: PathBuf,
}

impl PassageStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all passages in order. A missing file is an empty store, not an
    /// error.
    pub fn load(&self) -> AppResult<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            AppError::Storage(format!("Failed to read passage store {:?}: {}", self.path, e))
        })?;

        let passages: Vec<String> = serde_json::from_str(&contents).map_err(|e| {
            AppError::Storage(format!(
                "Passage store {:?} is not a JSON array of strings: {}",
                self.path, e
            ))
        })?;

        Ok(passages)
    }

    /// Append passages at the end, preserving order, and persist the full
    /// combined sequence. Returns the new total count.
    ///
    /// Must be called with exactly the passages whose embeddings were just
    /// added to the vector index, in the same order, in the same pipeline
    /// invocation.
    pub fn append(&self, passages: &[String]) -> AppResult<usize> {
        let mut existing = self.load()?;
        existing.extend(passages.iter().cloned());

        let json = serde_json::to_string(&existing)?;
        std::fs::write(&self.path, json).map_err(|e| {
            AppError::Storage(format!(
                "Failed to write passage store {:?}: {}",
                self.path, e
            ))
        })?;

        tracing::debug!(
            "Appended {} passages to {:?} ({} total)",
            passages.len(),
            self.path,
            existing.len()
        );
        Ok(existing.len())
    }

    /// Delete the persisted store entirely. A missing file is idempotent
    /// success.
    pub fn reset(&self) -> AppResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to delete passage store {:?}: {}",
                self.path, e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(temp: &TempDir) -> PassageStore {
        PassageStore::new(temp.path().join("passages.json"))
    }

    #[test]
    fn test_load_missing_is_empty() {
        let temp = TempDir::new().unwrap();
        assert_eq!(store(&temp).load().unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_append_preserves_order_across_batches() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        store
            .append(&["first".to_string(), "second".to_string()])
            .unwrap();
        let total = store.append(&["third".to_string()]).unwrap();

        assert_eq!(total, 3);
        assert_eq!(store.load().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        store.append(&["text".to_string()]).unwrap();
        store.reset().unwrap();
        assert_eq!(store.load().unwrap(), Vec::<String>::new());

        // Second reset with nothing on disk still succeeds.
        store.reset().unwrap();
    }

    #[test]
    fn test_corrupt_store_is_storage_error() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        std::fs::write(store.path(), "{not json").unwrap();
        assert!(matches!(store.load(), Err(AppError::Storage(_))));
    }
}
