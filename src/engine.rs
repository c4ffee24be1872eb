//! Nearest-neighbor index engine seam and the bundled flat inner-product index.
//!
//! The pipeline only talks to [`IndexEngine`], so another backend can be
//! substituted without touching the join and normalization logic.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::matrix::VectorMatrix;

/// Errors raised by index engines.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Filesystem failure while reading or writing the artifact.
    #[error("index I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding or decoding failure.
    #[error("index encoding error: {0}")]
    Bincode(#[from] bincode::Error),

    /// Rows of the wrong width were added.
    #[error("index expects dimension {expected}, got rows of {actual}")]
    DimensionMismatch {
        /// Dimension the index was built with.
        expected: usize,
        /// Width of the rows supplied.
        actual: usize,
    },

    /// File is not a flat index artifact.
    #[error("unrecognized index artifact header")]
    BadMagic,
}

/// Narrow interface over a vector index backend.
pub trait IndexEngine {
    /// Handle to an index under construction.
    type Index;

    /// Creates an empty inner-product index for `dim`-wide vectors.
    fn build(&self, dim: usize) -> Result<Self::Index, IndexError>;

    /// Appends every row of `rows`, preserving order.
    fn add(&self, index: &mut Self::Index, rows: &VectorMatrix) -> Result<(), IndexError>;

    /// Writes the index to `path`. Parent directories must already exist.
    fn serialize(&self, index: &Self::Index, path: &Path) -> Result<(), IndexError>;
}

const FLAT_IP_MAGIC: [u8; 8] = *b"MIDXFLAT";

/// Similarity metric recorded in the artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    /// Dot product; cosine similarity on unit-norm rows.
    InnerProduct,
}

/// Exhaustive inner-product index holding rows in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatIpIndex {
    magic: [u8; 8],
    dim: usize,
    metric: Metric,
    vectors: Vec<f32>,
}

impl FlatIpIndex {
    /// Empty index for `dim`-wide vectors.
    pub fn new(dim: usize) -> Self {
        Self {
            magic: FLAT_IP_MAGIC,
            dim,
            metric: Metric::InnerProduct,
            vectors: Vec::new(),
        }
    }

    /// Vector width.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Metric the index scores with.
    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        if self.dim == 0 {
            0
        } else {
            self.vectors.len() / self.dim
        }
    }

    /// Whether no rows are stored.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Stored row `idx`.
    pub fn row(&self, idx: usize) -> Option<&[f32]> {
        let start = idx.checked_mul(self.dim)?;
        self.vectors.get(start..start + self.dim)
    }

    /// Appends rows, which must match the index dimension.
    pub fn add(&mut self, rows: &VectorMatrix) -> Result<(), IndexError> {
        if rows.dim() != self.dim {
            return Err(IndexError::DimensionMismatch {
                expected: self.dim,
                actual: rows.dim(),
            });
        }
        self.vectors.extend_from_slice(rows.as_slice());
        Ok(())
    }

    /// Save to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), IndexError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Load from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, IndexError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let index: Self = bincode::deserialize_from(reader)?;
        if index.magic != FLAT_IP_MAGIC {
            return Err(IndexError::BadMagic);
        }
        Ok(index)
    }
}

/// Engine producing [`FlatIpIndex`] artifacts.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatIpEngine;

impl IndexEngine for FlatIpEngine {
    type Index = FlatIpIndex;

    fn build(&self, dim: usize) -> Result<FlatIpIndex, IndexError> {
        Ok(FlatIpIndex::new(dim))
    }

    fn add(&self, index: &mut FlatIpIndex, rows: &VectorMatrix) -> Result<(), IndexError> {
        index.add(rows)
    }

    fn serialize(&self, index: &FlatIpIndex, path: &Path) -> Result<(), IndexError> {
        index.save(path)
    }
}
