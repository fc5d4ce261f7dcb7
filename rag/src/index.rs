//! Exact flat vector index under squared L2 distance.
//!
//! The index is a row-major contiguous array of `f32`; row `i` corresponds
//! exactly to metadata record `i` held by the surrounding
//! [`IndexUnit`](crate::persistence::IndexUnit). Search is exhaustive (every
//! stored vector is scored), which keeps results exact and reproducible at
//! the corpus sizes this engine targets. The row scan parallelizes with
//! rayon; per-row accumulation stays sequential so distances are
//! deterministic.

use rayon::prelude::*;

use crate::error::{RagError, Result};

/// One search result row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Row index into the vector store and its aligned metadata.
    pub row: usize,
    /// Squared L2 distance to the query vector.
    pub distance: f32,
}

/// An immutable flat index over fixed-dimension embeddings.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dimension: usize,
    data: Vec<f32>,
}

impl FlatIndex {
    /// Builds an index from vectors in row order.
    ///
    /// The order of `vectors` must equal the order of the metadata records
    /// supplied alongside them; the index itself does not own metadata.
    ///
    /// # Errors
    /// [`RagError::EmptyInput`] if `vectors` is empty or the first vector has
    /// zero length; [`RagError::DimensionMismatch`] if any vector's length
    /// differs from the first's.
    pub fn build(vectors: Vec<Vec<f32>>) -> Result<Self> {
        let Some(first) = vectors.first() else {
            return Err(RagError::EmptyInput);
        };
        let dimension = first.len();
        if dimension == 0 {
            return Err(RagError::EmptyInput);
        }

        let mut data = Vec::with_capacity(dimension * vectors.len());
        for vector in &vectors {
            if vector.len() != dimension {
                return Err(RagError::DimensionMismatch {
                    expected: dimension,
                    actual: vector.len(),
                });
            }
            data.extend_from_slice(vector);
        }

        Ok(Self { dimension, data })
    }

    /// Reassembles an index from a persisted payload.
    pub(crate) fn from_raw(dimension: usize, data: Vec<f32>) -> Result<Self> {
        if dimension == 0 || data.is_empty() {
            return Err(RagError::CorruptIndex(
                "vector payload is empty".to_string(),
            ));
        }
        if data.len() % dimension != 0 {
            return Err(RagError::CorruptIndex(format!(
                "vector payload length {} is not a multiple of dimension {dimension}",
                data.len()
            )));
        }
        Ok(Self { dimension, data })
    }

    /// Returns the fixed embedding dimension.
    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    /// Returns the number of stored vectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    /// Returns `true` if the index stores no vectors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the vector stored at `row`.
    ///
    /// # Panics
    /// Panics if `row` is out of bounds.
    #[must_use]
    pub fn row(&self, row: usize) -> &[f32] {
        &self.data[row * self.dimension..(row + 1) * self.dimension]
    }

    pub(crate) fn data(&self) -> &[f32] {
        &self.data
    }

    /// Returns the `k` nearest rows to `query` by squared L2 distance,
    /// ascending, ties broken by lower row index.
    ///
    /// If `k` exceeds the number of stored vectors, all of them are returned.
    ///
    /// # Errors
    /// [`RagError::DimensionMismatch`] if `query`'s length differs from the
    /// index dimension.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Hit>> {
        if query.len() != self.dimension {
            return Err(RagError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut hits: Vec<Hit> = self
            .data
            .par_chunks_exact(self.dimension)
            .enumerate()
            .map(|(row, vector)| Hit {
                row,
                distance: squared_l2(vector, query),
            })
            .collect();

        hits.sort_unstable_by(|a, b| a.distance.total_cmp(&b.distance).then(a.row.cmp(&b.row)));
        hits.truncate(k);
        Ok(hits)
    }
}

/// Squared Euclidean distance, accumulated in row order.
fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
