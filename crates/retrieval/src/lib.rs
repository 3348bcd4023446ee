//! Indexing and retrieval core for docqa.
//!
//! A document is split into passages, each passage is embedded, and the
//! vectors go into a persisted flat L2 index with a parallel passage store.
//! Queries are embedded, searched, threshold-filtered by distance, and the
//! surviving passages become the context for a grounded chat turn.
//!
//! Both persisted artifacts are read and written wholesale on every
//! operation; nothing is cached across calls. There is no locking: callers
//! must serialize indexing calls against each other and against retrieval
//! for the same artifact directory.

pub mod catalog;
pub mod chat;
pub mod embedder;
pub mod indexing;
pub mod passage_store;
pub mod paths;
pub mod retrieval;
pub mod vector_index;

// Re-export commonly used types
pub use catalog::DocumentCatalog;
pub use chat::{ChatSession, SYSTEM_PROMPT};
pub use embedder::Embedder;
pub use indexing::{index_document, IndexStats};
pub use passage_store::PassageStore;
pub use paths::ArtifactPaths;
pub use retrieval::{retrieve, DEFAULT_DISTANCE_THRESHOLD, DEFAULT_TOP_K};
pub use vector_index::VectorIndex;

use docqa_core::AppResult;
use serde::Serialize;

/// Outcome of deleting one persisted artifact during a bulk reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WipeOutcome {
    /// File existed and was deleted
    Deleted,
    /// File did not exist; treated as idempotent success
    NotFound,
    /// Deletion failed
    Failed(String),
}

impl WipeOutcome {
    /// Whether the artifact is gone (deleted or never existed).
    pub fn is_clear(&self) -> bool {
        !matches!(self, WipeOutcome::Failed(_))
    }
}

/// Per-file results of a bulk reset.
#[derive(Debug, Clone, Serialize)]
pub struct ResetReport {
    pub index: WipeOutcome,
    pub passages: WipeOutcome,
    pub documents: WipeOutcome,
}

impl ResetReport {
    /// Whether every artifact is gone.
    pub fn all_clear(&self) -> bool {
        self.index.is_clear() && self.passages.is_clear() && self.documents.is_clear()
    }
}

/// Delete all persisted artifacts, best-effort per file.
///
/// Each file reports its own outcome; a missing file counts as success.
/// This is the only way to remove indexed content — individual passages
/// cannot be deleted or updated.
pub fn reset(paths: &ArtifactPaths) -> ResetReport {
    tracing::info!("Resetting persisted artifacts in {:?}", paths.root());

    ResetReport {
        index: wipe_file(&paths.index_path()),
        passages: wipe_file(&paths.passages_path()),
        documents: wipe_file(&paths.catalog_path()),
    }
}

fn wipe_file(path: &std::path::Path) -> WipeOutcome {
    match std::fs::remove_file(path) {
        Ok(()) => WipeOutcome::Deleted,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => WipeOutcome::NotFound,
        Err(e) => {
            tracing::warn!("Failed to delete {:?}: {}", path, e);
            WipeOutcome::Failed(e.to_string())
        }
    }
}

/// Statistics over the persisted artifacts.
#[derive(Debug, Clone, Serialize)]
pub struct CorpusStats {
    /// Passages in the passage store
    pub passage_count: usize,

    /// Vectors in the index (equals passage_count unless the pair is torn)
    pub vector_count: usize,

    /// Index dimension, if an index exists
    pub dimension: Option<usize>,

    /// Size of the persisted index in bytes
    pub index_bytes: u64,

    /// Ingested document names
    pub documents: Vec<String>,
}

/// Gather statistics for the artifacts under `paths`.
pub fn stats(paths: &ArtifactPaths) -> AppResult<CorpusStats> {
    let passages = PassageStore::new(paths.passages_path()).load()?;
    let documents = DocumentCatalog::new(paths.catalog_path()).list()?;

    let (vector_count, dimension) = match VectorIndex::open(&paths.index_path()) {
        Ok(index) => (index.len(), Some(index.dimension())),
        Err(docqa_core::AppError::IndexUnavailable) => (0, None),
        Err(e) => return Err(e),
    };

    let index_bytes = std::fs::metadata(paths.index_path())
        .map(|m| m.len())
        .unwrap_or(0);

    Ok(CorpusStats {
        passage_count: passages.len(),
        vector_count,
        dimension,
        index_bytes,
        documents,
    })
}
