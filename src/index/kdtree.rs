//! K-D Tree index.
//!
//! Space-partitioning tree using axis-aligned hyperplanes.
//!
//! **Technical Name**: k-d tree (Bentley, 1975)
//!
//! Algorithm:
//! - Recursively split the point set at the median of one coordinate
//! - Stop when a bucket holds at most `leaf_size` points, or all of its points coincide
//! - Query by depth-first descent, visiting the near child first and the far child only
//!   if the splitting plane is no farther than the current k-th best distance
//!
//! Median splits keep the tree balanced (depth ⌈log₂(N / leaf_size)⌉) regardless of
//! the data distribution. Pruning is exact for every metric in
//! [`DistanceMetric`], since each of them is bounded below by the per-axis offset.
//!
//! Works best for low to medium dimensions (d < 20). Beyond that most subtrees
//! survive the pruning test and queries approach a linear scan, but the answer
//! stays exact.
//!
//! # References
//!
//! - Bentley (1975): "Multidimensional binary search trees used for associative searching"
//! - Friedman, Bentley, Finkel (1977): "An algorithm for finding best matches in
//!   logarithmic expected time"

use serde::{Deserialize, Serialize};

use super::exhaustive;
use super::heap::KnnHeap;
use super::traits::{check_query_point, IndexStats, Neighbor, NeighborIndex};
use crate::distance::DistanceMetric;
use crate::points::PointSet;
use crate::{MknnError, Result};

/// How the splitting dimension of a node is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitRule {
    /// Cycle through dimensions by depth, skipping dimensions with zero spread.
    Cycle,
    /// Dimension with the largest coordinate range in the bucket.
    #[default]
    MaxSpread,
}

/// K-D Tree parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KdTreeParams {
    /// Maximum leaf size
    pub leaf_size: usize,

    /// Splitting dimension rule
    pub split: SplitRule,
}

impl Default for KdTreeParams {
    fn default() -> Self {
        Self {
            leaf_size: 16,
            split: SplitRule::MaxSpread,
        }
    }
}

/// K-D Tree node. Children are owned by their parent.
#[derive(Debug)]
enum KdNode {
    /// Internal node: every point of `left` has `coord[dim] <= value`, every
    /// point of `right` has `coord[dim] >= value`.
    Split {
        dim: usize,
        value: f32,
        left: Box<KdNode>,
        right: Box<KdNode>,
    },
    /// Leaf node: bucket `order[start..end]`.
    Leaf { start: usize, end: usize },
}

/// K-D Tree index over a borrowed point set.
///
/// Read-only after [`KdTree::build`]; safe to query from many threads.
#[derive(Debug)]
pub struct KdTree<'p> {
    points: &'p PointSet,
    metric: DistanceMetric,
    /// Point indices permuted so that every leaf is a contiguous range.
    order: Vec<u32>,
    root: KdNode,
    depth: usize,
    num_leaves: usize,
}

impl<'p> KdTree<'p> {
    /// Build the tree over `points`.
    pub fn build(points: &'p PointSet, metric: DistanceMetric, params: KdTreeParams) -> Result<Self> {
        if points.is_empty() {
            return Err(MknnError::IndexConstruction(
                "cannot index an empty point set".to_string(),
            ));
        }
        if params.leaf_size == 0 {
            return Err(MknnError::InvalidParameter(
                "leaf_size must be at least 1".to_string(),
            ));
        }
        let n = u32::try_from(points.len()).map_err(|_| {
            MknnError::IndexConstruction(format!(
                "{} points exceed the u32 index space",
                points.len()
            ))
        })?;

        let mut order: Vec<u32> = (0..n).collect();
        let mut builder = Builder {
            points,
            params: &params,
            depth: 0,
            num_leaves: 0,
        };
        let root = builder.build_node(&mut order, 0, 0);
        let (depth, num_leaves) = (builder.depth, builder.num_leaves);

        Ok(Self {
            points,
            metric,
            order,
            root,
            depth,
            num_leaves,
        })
    }

    /// Search for the `k` nearest indexed points to an arbitrary query vector.
    ///
    /// `exclude` drops one indexed point from the answer (the query itself,
    /// when it is part of the set).
    pub fn search(&self, query: &[f32], k: usize, exclude: Option<u32>) -> Result<Vec<Neighbor>> {
        if query.len() != self.points.dimension() {
            return Err(MknnError::DimensionMismatch {
                point: exclude.map_or(0, |p| p as usize),
                expected: self.points.dimension(),
                found: query.len(),
            });
        }

        let mut heap = KnnHeap::new(k.min(self.points.len()));
        self.search_recursive(&self.root, query, exclude, &mut heap);
        Ok(heap.into_sorted())
    }

    fn search_recursive(&self, node: &KdNode, query: &[f32], exclude: Option<u32>, heap: &mut KnnHeap) {
        match node {
            KdNode::Leaf { start, end } => {
                for &idx in &self.order[*start..*end] {
                    if Some(idx) == exclude {
                        continue;
                    }
                    let dist = self.metric.distance(query, self.points.point(idx as usize));
                    heap.offer(dist, idx);
                }
            }
            KdNode::Split {
                dim,
                value,
                left,
                right,
            } => {
                let offset = query[*dim] - *value;
                let (near, far) = if offset <= 0.0 { (left, right) } else { (right, left) };

                self.search_recursive(near, query, exclude, heap);

                // Strict `>` prune: a far point at exactly the threshold may
                // still win its tie on index.
                if self.metric.axis_lower_bound(offset) <= heap.threshold() {
                    self.search_recursive(far, query, exclude, heap);
                }
            }
        }
    }
}

impl NeighborIndex for KdTree<'_> {
    fn num_points(&self) -> usize {
        self.points.len()
    }

    fn metric(&self) -> DistanceMetric {
        self.metric
    }

    fn query_k_nearest(&self, point: u32, k: usize) -> Result<Vec<Neighbor>> {
        let n = self.points.len();
        check_query_point(point, n)?;
        let query = self.points.point(point as usize);
        let k = k.min(n - 1);

        if k == n - 1 {
            // Everyone is a neighbor; skip the descent.
            return Ok(exhaustive::scan(self.points, self.metric, query, k, Some(point)));
        }
        self.search(query, k, Some(point))
    }

    fn stats(&self) -> IndexStats {
        IndexStats {
            num_points: self.points.len(),
            dimension: self.points.dimension(),
            algorithm: "KdTree".to_string(),
            depth: self.depth,
            num_leaves: self.num_leaves,
        }
    }
}

struct Builder<'a> {
    points: &'a PointSet,
    params: &'a KdTreeParams,
    depth: usize,
    num_leaves: usize,
}

impl Builder<'_> {
    /// Build the subtree over `order`, which sits at `offset` in the full order.
    fn build_node(&mut self, order: &mut [u32], offset: usize, depth: usize) -> KdNode {
        self.depth = self.depth.max(depth);

        let split_dim = if order.len() <= self.params.leaf_size {
            None
        } else {
            self.pick_split_dim(order, depth)
        };
        let Some(dim) = split_dim else {
            self.num_leaves += 1;
            return KdNode::Leaf {
                start: offset,
                end: offset + order.len(),
            };
        };

        let mid = order.len() / 2;
        let points = self.points;
        order.select_nth_unstable_by(mid, |&a, &b| {
            let va = points.point(a as usize)[dim];
            let vb = points.point(b as usize)[dim];
            va.total_cmp(&vb).then(a.cmp(&b))
        });
        let value = points.point(order[mid] as usize)[dim];

        let (left_order, right_order) = order.split_at_mut(mid);
        let left = self.build_node(left_order, offset, depth + 1);
        let right = self.build_node(right_order, offset + mid, depth + 1);

        KdNode::Split {
            dim,
            value,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Splitting dimension, or `None` if every point of the bucket coincides.
    fn pick_split_dim(&self, order: &[u32], depth: usize) -> Option<usize> {
        let dims = self.points.dimension();
        match self.params.split {
            SplitRule::Cycle => (0..dims)
                .map(|i| (depth + i) % dims)
                .find(|&d| self.spread(order, d) > 0.0),
            SplitRule::MaxSpread => {
                let mut best_dim = None;
                let mut best_spread = 0.0f32;
                for d in 0..dims {
                    let spread = self.spread(order, d);
                    if spread > best_spread {
                        best_spread = spread;
                        best_dim = Some(d);
                    }
                }
                best_dim
            }
        }
    }

    fn spread(&self, order: &[u32], dim: usize) -> f32 {
        let mut lo = f32::INFINITY;
        let mut hi = f32::NEG_INFINITY;
        for &idx in order {
            let v = self.points.point(idx as usize)[dim];
            lo = lo.min(v);
            hi = hi.max(v);
        }
        hi - lo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::ExhaustiveIndex;

    fn grid(side: usize) -> PointSet {
        let rows: Vec<[f32; 2]> = (0..side * side)
            .map(|i| [(i % side) as f32, (i / side) as f32])
            .collect();
        PointSet::from_rows(&rows).unwrap()
    }

    #[test]
    fn leaves_cover_every_point_once() {
        let points = grid(10);
        let tree = KdTree::build(
            &points,
            DistanceMetric::Euclidean,
            KdTreeParams {
                leaf_size: 4,
                ..Default::default()
            },
        )
        .unwrap();
        let mut seen = tree.order.clone();
        seen.sort_unstable();
        assert_eq!(seen, (0..100).collect::<Vec<u32>>());
        assert!(tree.stats().num_leaves >= 100 / 4);
        assert!(tree.stats().depth <= 6);
    }

    #[test]
    fn grid_ties_match_exhaustive() {
        // A unit grid has many equal distances; the tie-break must survive pruning.
        let points = grid(9);
        for split in [SplitRule::Cycle, SplitRule::MaxSpread] {
            let tree = KdTree::build(
                &points,
                DistanceMetric::Euclidean,
                KdTreeParams { leaf_size: 2, split },
            )
            .unwrap();
            let flat = ExhaustiveIndex::new(&points, DistanceMetric::Euclidean).unwrap();
            for p in 0..points.len() as u32 {
                assert_eq!(
                    tree.query_k_nearest(p, 6).unwrap(),
                    flat.query_k_nearest(p, 6).unwrap(),
                    "point {p}, {split:?}"
                );
            }
        }
    }

    #[test]
    fn coincident_points_form_one_leaf() {
        let rows = vec![[1.0_f32, 1.0]; 40];
        let points = PointSet::from_rows(&rows).unwrap();
        let tree = KdTree::build(&points, DistanceMetric::Euclidean, KdTreeParams::default()).unwrap();
        assert_eq!(tree.stats().num_leaves, 1);

        let got = tree.query_k_nearest(5, 3).unwrap();
        let ids: Vec<u32> = got.iter().map(|n| n.index).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert!(got.iter().all(|n| n.distance == 0.0));
    }

    #[test]
    fn tiny_spacings_match_exhaustive() {
        let rows: Vec<[f32; 1]> = (0..8).map(|i| [i as f32 * 5.0e-24]).collect();
        let points = PointSet::from_rows(&rows).unwrap();
        let params = KdTreeParams {
            leaf_size: 1,
            split: SplitRule::Cycle,
        };
        for metric in [
            DistanceMetric::Euclidean,
            DistanceMetric::Manhattan,
            DistanceMetric::Chebyshev,
        ] {
            let tree = KdTree::build(&points, metric, params.clone()).unwrap();
            let flat = ExhaustiveIndex::new(&points, metric).unwrap();
            for p in 0..8 {
                assert_eq!(
                    tree.query_k_nearest(p, 2).unwrap(),
                    flat.query_k_nearest(p, 2).unwrap(),
                    "point {p}, {metric}"
                );
            }
            let nearest = tree.query_k_nearest(7, 1).unwrap();
            assert_eq!(nearest[0].index, 6);
            assert!(nearest[0].distance > 0.0);
        }
    }

    #[test]
    fn huge_coordinates_match_exhaustive() {
        let rows: Vec<[f32; 2]> = (0..30)
            .map(|i| [(i % 6) as f32 * 1.0e20, (i / 6) as f32 * 3.0e19])
            .collect();
        let points = PointSet::from_rows(&rows).unwrap();
        let tree = KdTree::build(&points, DistanceMetric::Euclidean, KdTreeParams::default()).unwrap();
        let flat = ExhaustiveIndex::new(&points, DistanceMetric::Euclidean).unwrap();
        for p in 0..30 {
            let got = tree.query_k_nearest(p, 4).unwrap();
            assert!(got.iter().all(|n| n.distance.is_finite()));
            assert_eq!(got, flat.query_k_nearest(p, 4).unwrap(), "point {p}");
        }
    }

    #[test]
    fn search_arbitrary_query() {
        let points = grid(5);
        let tree = KdTree::build(&points, DistanceMetric::Manhattan, KdTreeParams::default()).unwrap();
        let got = tree.search(&[2.1, 2.0], 1, None).unwrap();
        assert_eq!(got[0].index, 12);
        assert!(matches!(
            tree.search(&[1.0], 1, None),
            Err(MknnError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn rejects_empty_and_zero_leaf() {
        let points = PointSet::new(3, Vec::new()).unwrap();
        assert!(matches!(
            KdTree::build(&points, DistanceMetric::Euclidean, KdTreeParams::default()),
            Err(MknnError::IndexConstruction(_))
        ));

        let points = grid(2);
        assert!(matches!(
            KdTree::build(
                &points,
                DistanceMetric::Euclidean,
                KdTreeParams {
                    leaf_size: 0,
                    ..Default::default()
                }
            ),
            Err(MknnError::InvalidParameter(_))
        ));
    }
}
