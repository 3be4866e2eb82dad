//! # ragline-vector
//!
//! An exact, in-memory nearest-neighbor index for small to moderate corpora.
//!
//! ## Features
//!
//! - **Exact**: brute-force linear scan, no approximation
//! - **Deterministic**: ties are broken by ascending id
//! - **Immutable**: built once, then shared read-only across threads
//! - **Multiple Distance Metrics**: squared Euclidean (default), cosine, dot product
//!
//! ## Quick Start
//!
//! ```rust
//! use ragline_vector::FlatIndex;
//!
//! let index = FlatIndex::build(vec![
//!     vec![1.0, 0.0],
//!     vec![0.0, 1.0],
//! ])?;
//!
//! let hits = index.search(&[0.9, 0.1], 1)?;
//! assert_eq!(hits[0].id, 0);
//! # Ok::<(), ragline_vector::Error>(())
//! ```
//!
//! ## Scaling
//!
//! A linear scan is fine up to the low tens of thousands of vectors. Past
//! that, an approximate structure (HNSW, IVF) can replace [`FlatIndex`]
//! behind the same `build`/`search` shape.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod distance;
pub mod error;
pub mod index;
pub mod types;

pub use distance::DistanceMetric;
pub use error::{Error, Result};
pub use index::FlatIndex;
pub use types::{Neighbor, VectorId};
