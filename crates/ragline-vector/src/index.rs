//! Exact (brute-force) nearest-neighbor index.
//!
//! Vectors are stored row-major in one contiguous buffer. A search scans
//! every row and keeps the `k` best candidates in a bounded max-heap, so the
//! cost is `O(n·d + n·log k)` per query with no approximation.

use crate::distance::DistanceMetric;
use crate::error::{Error, Result};
use crate::types::{Neighbor, Ranked, VectorId};
use std::collections::BinaryHeap;
use tracing::{debug, trace};

/// Immutable flat index over a fixed set of vectors.
///
/// Built once, then only read. `FlatIndex` is `Send + Sync` and can be
/// shared behind an `Arc` by any number of concurrent searches.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    /// Row-major vector storage, `len * dimensions` values.
    data: Vec<f32>,
    /// Dimension shared by every vector; 0 for an empty index.
    dimensions: usize,
    /// Number of indexed vectors.
    len: usize,
    /// Distance metric, fixed for the lifetime of the index.
    metric: DistanceMetric,
}

impl FlatIndex {
    /// Build an index with the default metric (squared Euclidean).
    ///
    /// Vector `i` of the input gets id `i`. An empty input yields an empty
    /// index; searching it always returns no neighbors.
    pub fn build<I, V>(vectors: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: AsRef<[f32]>,
    {
        Self::build_with_metric(vectors, DistanceMetric::default())
    }

    /// Build an index with an explicit distance metric.
    pub fn build_with_metric<I, V>(vectors: I, metric: DistanceMetric) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: AsRef<[f32]>,
    {
        let mut data = Vec::new();
        let mut dimensions = 0;
        let mut len = 0;

        for (id, vector) in vectors.into_iter().enumerate() {
            let vector = vector.as_ref();

            if id == 0 {
                if vector.is_empty() {
                    return Err(Error::InvalidVector(
                        "Vector 0 has zero dimensions".to_string(),
                    ));
                }
                dimensions = vector.len();
            } else if vector.len() != dimensions {
                return Err(Error::DimensionMismatch {
                    expected: dimensions,
                    actual: vector.len(),
                });
            }

            if vector.iter().any(|v| !v.is_finite()) {
                return Err(Error::InvalidVector(format!(
                    "Vector {} contains NaN or Inf",
                    id
                )));
            }

            data.extend_from_slice(vector);
            len += 1;
        }

        debug!(len, dimensions, %metric, "Built flat index");

        Ok(Self {
            data,
            dimensions,
            len,
            metric,
        })
    }

    /// Dimension of the indexed vectors, or `None` for an empty index.
    pub fn dimensions(&self) -> Option<usize> {
        (self.len > 0).then_some(self.dimensions)
    }

    /// Get the distance metric.
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Get the number of vectors in the index.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate over `(id, vector)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (VectorId, &[f32])> {
        // chunks_exact panics on 0, and an empty index has no rows anyway
        self.data
            .chunks_exact(self.dimensions.max(1))
            .take(self.len)
            .enumerate()
    }

    /// Find the `min(k, len)` nearest vectors to `query`.
    ///
    /// Results are sorted by ascending distance; equal distances keep id
    /// order. `k` must be at least 1. The query must have the index
    /// dimension unless the index is empty.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if k == 0 {
            return Err(Error::InvalidLimit("k must be at least 1".to_string()));
        }

        if self.is_empty() {
            return Ok(Vec::new());
        }

        if query.len() != self.dimensions {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }

        if query.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidVector(
                "Query contains NaN or Inf".to_string(),
            ));
        }

        let k = k.min(self.len);
        let mut heap: BinaryHeap<Ranked> = BinaryHeap::with_capacity(k + 1);

        for (id, vector) in self.iter() {
            let candidate = Neighbor {
                id,
                distance: self.metric.distance(query, vector),
            };

            if heap.len() < k {
                heap.push(Ranked(candidate));
            } else if let Some(worst) = heap.peek() {
                if candidate.rank_cmp(&worst.0).is_lt() {
                    heap.pop();
                    heap.push(Ranked(candidate));
                }
            }
        }

        let results: Vec<Neighbor> = heap.into_sorted_vec().into_iter().map(|r| r.0).collect();

        trace!(k, returned = results.len(), "Flat index search");
        Ok(results)
    }
}
