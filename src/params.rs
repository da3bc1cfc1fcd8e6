//! Run parameters.
//!
//! | Parameter | Default | Effect |
//! |-----------|---------|--------|
//! | `k` | 3 | Neighbors per point, `1 <= k <= N - 1` |
//! | `threads` | 0 | Resolver workers, 0 = all cores |
//! | `metric` | `euclidean` | Distance metric |
//! | `index` | `kdtree` | Neighbor index |
//! | `kdtree.leaf_size` | 16 | Max bucket size of a k-d tree leaf |
//! | `kdtree.split` | `max_spread` | k-d tree split dimension rule |
//! | `weighting.combine` | `mean` | Merge of the two directional distances |
//! | `weighting.function` | `inverse_distance` | Distance → weight |
//!
//! Parameters serialize to JSON with these names; missing fields take their
//! defaults:
//!
//! ```json
//! { "k": 10, "threads": 4, "weighting": { "combine": "max" } }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::distance::DistanceMetric;
use crate::index::{IndexKind, KdTreeParams};
use crate::mutual::EdgeWeighting;
use crate::{MknnError, Result};

/// Parameters of one MkNN graph build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MknnParams {
    pub k: usize,
    pub threads: usize,
    pub metric: DistanceMetric,
    pub index: IndexKind,
    pub kdtree: KdTreeParams,
    pub weighting: EdgeWeighting,
}

impl Default for MknnParams {
    fn default() -> Self {
        Self {
            k: 3,
            threads: 0,
            metric: DistanceMetric::Euclidean,
            index: IndexKind::KdTree,
            kdtree: KdTreeParams::default(),
            weighting: EdgeWeighting::default(),
        }
    }
}

impl MknnParams {
    /// Parameters with `k` neighbors and defaults otherwise.
    #[must_use]
    pub fn with_k(k: usize) -> Self {
        Self {
            k,
            ..Self::default()
        }
    }

    /// Check the parameters against a point set of `num_points` points.
    pub fn validate(&self, num_points: usize) -> Result<()> {
        if num_points < 2 {
            return Err(MknnError::InvalidParameter(format!(
                "need at least 2 points to build a neighbor graph, got {num_points}"
            )));
        }
        if self.k == 0 || self.k > num_points - 1 {
            return Err(MknnError::InvalidParameter(format!(
                "k = {} out of range [1, {}] for {num_points} points",
                self.k,
                num_points - 1
            )));
        }
        if self.index == IndexKind::KdTree && self.kdtree.leaf_size == 0 {
            return Err(MknnError::InvalidParameter(
                "kdtree.leaf_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text)
            .map_err(|e| MknnError::Config(format!("{}: {e}", path.display())))
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
