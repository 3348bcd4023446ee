//! Well-known paths for the persisted artifacts.
//!
//! All three artifacts live side by side in one directory and are read and
//! written wholesale: the binary vector index, the JSON passage store, and
//! the JSON document catalog.

use docqa_core::{AppError, AppResult};
use std::path::{Path, PathBuf};

/// Locations of the persisted artifacts for one corpus.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    root: PathBuf,
}

impl ArtifactPaths {
    /// Create artifact paths rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory containing all artifacts.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the persisted vector index (opaque binary artifact).
    pub fn index_path(&self) -> PathBuf {
        self.root.join("passages.index")
    }

    /// Path of the passage store (JSON array of strings).
    pub fn passages_path(&self) -> PathBuf {
        self.root.join("passages.json")
    }

    /// Path of the document catalog (JSON array of document names).
    pub fn catalog_path(&self) -> PathBuf {
        self.root.join("documents.json")
    }

    /// Ensure the artifact directory exists.
    pub fn ensure_dir(&self) -> AppResult<()> {
        if !self.root.exists() {
            std::fs::create_dir_all(&self.root).map_err(|e| {
                AppError::Storage(format!(
                    "Failed to create artifact directory {:?}: {}",
                    self.root, e
                ))
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_paths() {
        let paths = ArtifactPaths::new("/tmp/corpus");
        assert!(paths.index_path().ends_with("passages.index"));
        assert!(paths.passages_path().ends_with("passages.json"));
        assert!(paths.catalog_path().ends_with("documents.json"));
    }
}
