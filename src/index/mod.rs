//! Exact k-nearest-neighbor indexes over a [`PointSet`](crate::PointSet).
//!
//! - [`KdTree`]: balanced k-d tree with branch-and-bound search. The default.
//! - [`ExhaustiveIndex`]: linear scan. Used by the k-d tree for the degenerate
//!   `N <= k + 1` case and as a reference in tests.
//!
//! Both implement [`NeighborIndex`], the seam the resolver is written against,
//! and both return the same answer for the same input: the `k` points with
//! the smallest `(distance, index)` pairs, excluding the query point itself.
//! Breaking distance ties by index is what makes neighbor lists reproducible
//! across runs and thread counts.

mod heap;
pub mod exhaustive;
pub mod kdtree;
pub mod traits;

pub use exhaustive::ExhaustiveIndex;
pub use kdtree::{KdTree, KdTreeParams, SplitRule};
pub use traits::{IndexKind, IndexStats, Neighbor, NeighborIndex};
