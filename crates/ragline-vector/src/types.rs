//! Common types for ragline-vector.

use std::cmp::Ordering;

/// Position of a vector in the index. Equals the position of the vector in
/// the sequence passed to [`FlatIndex::build`](crate::FlatIndex::build).
pub type VectorId = usize;

/// A single search hit.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Neighbor {
    /// Id of the matched vector.
    pub id: VectorId,
    /// Distance to the query under the index metric (lower is closer).
    pub distance: f32,
}

impl Neighbor {
    /// Total order used for ranking: distance ascending, then id ascending.
    pub(crate) fn rank_cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Heap entry ordered by [`Neighbor::rank_cmp`], so a `BinaryHeap` of these
/// keeps the worst retained neighbor on top.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Ranked(pub Neighbor);

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.rank_cmp(&other.0)
    }
}
