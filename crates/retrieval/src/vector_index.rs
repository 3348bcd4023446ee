//! Durable nearest-neighbor index over fixed-dimension vectors.
//!
//! A flat L2 structure: vectors are kept row-major and every search scans
//! all of them, so results are exact. The single-partition layout of the
//! original system is preserved as a `trained` lifecycle flag rather than a
//! real partitioning structure; training fixes the state machine (an index
//! must be trained before vectors are added) without fitting anything.
//!
//! Persistence is one opaque binary artifact, rewritten wholesale on every
//! `persist` call. The index is never cached across operations: each
//! pipeline invocation opens it, works on it, persists, and drops it.

use docqa_core::{AppError, AppResult};
use std::path::{Path, PathBuf};

/// Magic bytes identifying the persisted artifact.
const MAGIC: [u8; 4] = *b"DQVI";

/// On-disk format version.
const FORMAT_VERSION: u32 = 1;

/// Header: magic + version + dimension + trained flag + count.
const HEADER_LEN: usize = 4 + 4 + 4 + 1 + 8;

/// Flat L2 vector index with wholesale file persistence.
///
/// States: absent (no file) -> created-untrained -> trained ->
/// trained-with-data. `open_or_create` leaves a fresh index already trained
/// (via a no-op pass on a zero vector) so it is queryable before real data
/// arrives.
#[derive(Debug)]
pub struct VectorIndex {
    path: PathBuf,
    dimension: usize,
    trained: bool,
    /// Row-major vector data, `len() == count * dimension`.
    data: Vec<f32>,
}

impl VectorIndex {
    /// Open the persisted index, or create a fresh one at `dimension`.
    ///
    /// An existing artifact is loaded verbatim; its stored dimension must
    /// equal `dimension` or the call fails with
    /// [`AppError::DimensionMismatch`]. A fresh index immediately runs a
    /// no-op training pass on a single zero vector.
    pub fn open_or_create(path: &Path, dimension: usize) -> AppResult<Self> {
        if path.exists() {
            let index = Self::read_from(path)?;
            if index.dimension != dimension {
                return Err(AppError::DimensionMismatch {
                    stored: index.dimension,
                    requested: dimension,
                });
            }
            tracing::debug!(
                "Loaded existing index ({} vectors, dimension {})",
                index.len(),
                index.dimension
            );
            Ok(index)
        } else {
            tracing::debug!("Creating new index (dimension {})", dimension);
            let mut index = Self {
                path: path.to_path_buf(),
                dimension,
                trained: false,
                data: Vec::new(),
            };
            // Dummy fit so the structure is queryable before real data.
            index.train_if_needed(&[vec![0.0; dimension]])?;
            Ok(index)
        }
    }

    /// Open the persisted index for reading.
    ///
    /// Fails with [`AppError::IndexUnavailable`] when no persisted structure
    /// exists yet.
    pub fn open(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Err(AppError::IndexUnavailable);
        }
        Self::read_from(path)
    }

    /// Fit the index to a batch. No-op when already trained.
    ///
    /// Must see at least one vector before the first `add`. The flat layout
    /// has no partitioning to fit, so training only records the transition.
    pub fn train_if_needed(&mut self, vectors: &[Vec<f32>]) -> AppResult<()> {
        if self.trained {
            return Ok(());
        }
        if vectors.is_empty() {
            return Err(AppError::UntrainedIndex);
        }
        self.trained = true;
        Ok(())
    }

    /// Append vectors in order.
    ///
    /// Each added vector's position equals the prior total count plus its
    /// offset within this batch. Fails with [`AppError::UntrainedIndex`]
    /// before training, and with [`AppError::DimensionMismatch`] when a
    /// vector's length differs from the index dimension.
    pub fn add(&mut self, vectors: &[Vec<f32>]) -> AppResult<()> {
        if !self.trained {
            return Err(AppError::UntrainedIndex);
        }

        for vector in vectors {
            if vector.len() != self.dimension {
                return Err(AppError::DimensionMismatch {
                    stored: self.dimension,
                    requested: vector.len(),
                });
            }
        }

        for vector in vectors {
            self.data.extend_from_slice(vector);
        }

        Ok(())
    }

    /// Durably rewrite the whole artifact.
    ///
    /// The index is not implicitly durable: this must be called after every
    /// `add` in the same pipeline invocation.
    pub fn persist(&self) -> AppResult<()> {
        let count = self.len() as u64;

        let mut bytes = Vec::with_capacity(HEADER_LEN + self.data.len() * 4);
        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&(self.dimension as u32).to_le_bytes());
        bytes.push(self.trained as u8);
        bytes.extend_from_slice(&count.to_le_bytes());
        for value in &self.data {
            bytes.extend_from_slice(&value.to_le_bytes());
        }

        std::fs::write(&self.path, bytes).map_err(|e| {
            AppError::Storage(format!("Failed to write index {:?}: {}", self.path, e))
        })?;

        tracing::debug!("Persisted index ({} vectors) to {:?}", count, self.path);
        Ok(())
    }

    /// Return up to `k` nearest entries by ascending squared Euclidean
    /// distance, fewer if fewer entries exist.
    pub fn search(&self, query: &[f32], k: usize) -> AppResult<Vec<(usize, f32)>> {
        if query.len() != self.dimension {
            return Err(AppError::DimensionMismatch {
                stored: self.dimension,
                requested: query.len(),
            });
        }

        let mut results: Vec<(usize, f32)> = self
            .data
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(position, row)| (position, squared_l2(query, row)))
            .collect();

        results.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(k);

        Ok(results)
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.data.len() / self.dimension
        }
    }

    /// Whether the index holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Vector dimension fixed at creation.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Whether the index has been trained.
    pub fn is_trained(&self) -> bool {
        self.trained
    }

    fn read_from(path: &Path) -> AppResult<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| AppError::Storage(format!("Failed to read index {:?}: {}", path, e)))?;

        if bytes.len() < HEADER_LEN {
            return Err(AppError::Storage(format!(
                "Index file {:?} is truncated ({} bytes)",
                path,
                bytes.len()
            )));
        }

        if bytes[0..4] != MAGIC {
            return Err(AppError::Storage(format!(
                "Index file {:?} has an unrecognized header",
                path
            )));
        }

        let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        if version != FORMAT_VERSION {
            return Err(AppError::Storage(format!(
                "Index file {:?} has unsupported format version {}",
                path, version
            )));
        }

        let dimension = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
        let trained = bytes[12] != 0;
        let count = u64::from_le_bytes([
            bytes[13], bytes[14], bytes[15], bytes[16], bytes[17], bytes[18], bytes[19], bytes[20],
        ]) as usize;

        let payload = &bytes[HEADER_LEN..];
        let expected = count
            .checked_mul(dimension)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| {
                AppError::Storage(format!("Index file {:?} declares an invalid size", path))
            })?;

        if payload.len() != expected {
            return Err(AppError::Storage(format!(
                "Index file {:?} payload is {} bytes, expected {}",
                path,
                payload.len(),
                expected
            )));
        }

        let mut data = Vec::with_capacity(count * dimension);
        for chunk in payload.chunks_exact(4) {
            data.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
        }

        Ok(Self {
            path: path.to_path_buf(),
            dimension,
            trained,
            data,
        })
    }
}

/// Squared Euclidean distance between two equal-length vectors.
fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
