//! Distance metrics for vector comparison.
//!
//! Every metric here is expressed as a *distance*: lower means closer. The
//! index relies on that to rank results ascending regardless of the metric.

use std::fmt;

/// Distance metric used by a [`FlatIndex`](crate::FlatIndex).
///
/// - **SquaredEuclidean**: `sum((a_i - b_i)^2)`. The default, and what the
///   retrieval path ranks by.
/// - **Cosine**: `1 - cos(a, b)`, ignores magnitude.
/// - **DotProduct**: `-dot(a, b)`, for pre-normalized vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum DistanceMetric {
    /// Squared Euclidean (L2²) distance. Range: [0, ∞).
    #[default]
    SquaredEuclidean,

    /// Cosine distance. Range: [0, 2].
    Cosine,

    /// Negated inner product. Range: (-∞, ∞).
    DotProduct,
}

impl DistanceMetric {
    /// Compute the distance between two vectors of equal length.
    #[inline]
    pub fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");

        match self {
            DistanceMetric::SquaredEuclidean => squared_euclidean(a, b),
            DistanceMetric::Cosine => 1.0 - cosine_similarity(a, b),
            DistanceMetric::DotProduct => -dot_product(a, b),
        }
    }

    /// Get the name of this distance metric.
    pub fn name(&self) -> &'static str {
        match self {
            DistanceMetric::SquaredEuclidean => "squared_euclidean",
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::DotProduct => "dot_product",
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for DistanceMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "squared_euclidean" | "l2" | "l2sq" | "euclidean" => Ok(DistanceMetric::SquaredEuclidean),
            "cosine" | "cos" => Ok(DistanceMetric::Cosine),
            "dot" | "dot_product" | "inner" => Ok(DistanceMetric::DotProduct),
            _ => Err(format!("Unknown distance metric: {}", s)),
        }
    }
}

// ============================================================================
// Distance Functions
// ============================================================================

/// Squared L2 distance. No square root: ranking is identical and it matches
/// the flat L2 index the service was designed around.
#[inline]
fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    let mut sum = 0.0f32;

    let chunks = a.len() / 4;
    let remainder = a.len() % 4;

    for i in 0..chunks {
        let base = i * 4;
        let d0 = a[base] - b[base];
        let d1 = a[base + 1] - b[base + 1];
        let d2 = a[base + 2] - b[base + 2];
        let d3 = a[base + 3] - b[base + 3];
        sum += d0 * d0 + d1 * d1 + d2 * d2 + d3 * d3;
    }

    let start = chunks * 4;
    for i in 0..remainder {
        let d = a[start + i] - b[start + i];
        sum += d * d;
    }

    sum
}

#[inline]
fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Returns 0.0 when either vector has zero norm.
#[inline]
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = (norm_a * norm_b).sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}
