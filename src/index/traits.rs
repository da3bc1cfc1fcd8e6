//! Unified traits for the neighbor indexes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::distance::DistanceMetric;
use crate::{MknnError, Result};

/// One entry of a k-nearest-neighbor answer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// Index of the neighboring point.
    pub index: u32,
    /// Distance from the query point under the index's metric.
    pub distance: f32,
}

/// Unified trait for all neighbor index implementations.
///
/// Indexes are built once and then only read, so `Sync` is required: the
/// scheduler shares one index across every worker thread by reference.
pub trait NeighborIndex: Sync {
    /// Number of indexed points.
    fn num_points(&self) -> usize;

    /// Metric every query of this index uses.
    fn metric(&self) -> DistanceMetric;

    /// The `min(k, N - 1)` nearest neighbors of indexed point `point`,
    /// excluding `point` itself.
    ///
    /// Results are sorted ascending by distance, ties by smaller index.
    fn query_k_nearest(&self, point: u32, k: usize) -> Result<Vec<Neighbor>>;

    /// Get index statistics.
    fn stats(&self) -> IndexStats;
}

/// Statistics about a built index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexStats {
    pub num_points: usize,
    pub dimension: usize,
    pub algorithm: String,
    /// Depth of the deepest leaf (0 for a single leaf or a flat scan).
    pub depth: usize,
    pub num_leaves: usize,
}

/// Which index a pipeline run builds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    /// Balanced k-d tree.
    #[default]
    KdTree,
    /// Linear scan over all points.
    Exhaustive,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKind::KdTree => f.write_str("kdtree"),
            IndexKind::Exhaustive => f.write_str("exhaustive"),
        }
    }
}

impl FromStr for IndexKind {
    type Err = MknnError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "kdtree" | "kd-tree" => Ok(IndexKind::KdTree),
            "exhaustive" | "brute" | "bruteforce" => Ok(IndexKind::Exhaustive),
            other => Err(MknnError::InvalidParameter(format!(
                "unknown index kind '{other}' (expected kdtree or exhaustive)"
            ))),
        }
    }
}

/// Shared argument checks for [`NeighborIndex::query_k_nearest`].
pub(crate) fn check_query_point(point: u32, num_points: usize) -> Result<()> {
    if point as usize >= num_points {
        return Err(MknnError::InvalidParameter(format!(
            "query point {point} out of range for {num_points} points"
        )));
    }
    Ok(())
}
