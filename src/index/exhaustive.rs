//! Exhaustive (linear scan) index.
//!
//! O(N) per query. Exact by construction, which makes it the reference the
//! k-d tree is tested against, and the right tool when `N <= k + 1` and every
//! point is everyone's neighbor anyway.

use super::heap::KnnHeap;
use super::traits::{check_query_point, IndexStats, Neighbor, NeighborIndex};
use crate::distance::DistanceMetric;
use crate::points::PointSet;
use crate::{MknnError, Result};

/// Linear-scan index borrowing its points.
#[derive(Debug, Clone, Copy)]
pub struct ExhaustiveIndex<'p> {
    points: &'p PointSet,
    metric: DistanceMetric,
}

impl<'p> ExhaustiveIndex<'p> {
    pub fn new(points: &'p PointSet, metric: DistanceMetric) -> Result<Self> {
        if points.is_empty() {
            return Err(MknnError::IndexConstruction(
                "cannot index an empty point set".to_string(),
            ));
        }
        Ok(Self { points, metric })
    }
}

impl NeighborIndex for ExhaustiveIndex<'_> {
    fn num_points(&self) -> usize {
        self.points.len()
    }

    fn metric(&self) -> DistanceMetric {
        self.metric
    }

    fn query_k_nearest(&self, point: u32, k: usize) -> Result<Vec<Neighbor>> {
        check_query_point(point, self.points.len())?;
        Ok(scan(
            self.points,
            self.metric,
            self.points.point(point as usize),
            k,
            Some(point),
        ))
    }

    fn stats(&self) -> IndexStats {
        IndexStats {
            num_points: self.points.len(),
            dimension: self.points.dimension(),
            algorithm: "Exhaustive".to_string(),
            depth: 0,
            num_leaves: 1,
        }
    }
}

/// Scan every point, keeping the `k` best. `exclude` is skipped by index.
pub(crate) fn scan(
    points: &PointSet,
    metric: DistanceMetric,
    query: &[f32],
    k: usize,
    exclude: Option<u32>,
) -> Vec<Neighbor> {
    let mut heap = KnnHeap::new(k.min(points.len()));
    for (i, p) in points.iter().enumerate() {
        let i = i as u32;
        if Some(i) == exclude {
            continue;
        }
        heap.offer(metric.distance(query, p), i);
    }
    heap.into_sorted()
}
