//! End-to-end MkNN graph construction.
//!
//! ```text
//! PointSet → index build → resolve (parallel) → mutual edges → assemble → Graph
//! ```
//!
//! Only the resolve phase runs on the worker pool. Index construction,
//! mutuality, and assembly run on the calling thread.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};

use crate::candidates::CandidateTable;
use crate::graph::{assemble, Graph};
use crate::index::{ExhaustiveIndex, IndexKind, IndexStats, KdTree, NeighborIndex};
use crate::mutual::compute_edges;
use crate::params::MknnParams;
use crate::points::PointSet;
use crate::resolve::{CancelToken, Scheduler};
use crate::{MknnError, Result};

/// Result of a build: the graph plus what it was built from.
#[derive(Debug, Clone)]
pub struct MknnOutput {
    pub graph: Graph,
    pub candidates: CandidateTable,
    pub stats: BuildStats,
}

/// Summary of one build.
#[derive(Debug, Clone, Serialize)]
pub struct BuildStats {
    pub num_points: usize,
    pub dimension: usize,
    pub k: usize,
    /// Resolver workers actually used.
    pub threads: usize,
    pub candidate_entries: usize,
    pub num_edges: usize,
    pub isolated_vertices: usize,
    pub index: IndexStats,
    pub timings: PhaseTimings,
}

/// Wall-clock time per phase.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PhaseTimings {
    pub index: Duration,
    pub resolve: Duration,
    pub mutual: Duration,
    pub assemble: Duration,
}

impl PhaseTimings {
    #[must_use]
    pub fn total(&self) -> Duration {
        self.index + self.resolve + self.mutual + self.assemble
    }
}

/// Build the MkNN graph of `points`.
pub fn build_mknn_graph(points: &PointSet, params: &MknnParams) -> Result<MknnOutput> {
    MknnGraphBuilder::new(params.clone()).build(points)
}

/// Reusable builder, optionally cancellable.
#[derive(Debug, Clone, Default)]
pub struct MknnGraphBuilder {
    params: MknnParams,
    cancel: Option<CancelToken>,
}

impl MknnGraphBuilder {
    pub fn new(params: MknnParams) -> Self {
        Self {
            params,
            cancel: None,
        }
    }

    /// Abort resolution when `token` is cancelled.
    #[must_use]
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Run every phase over `points`.
    ///
    /// # Errors
    ///
    /// `IndexConstruction` for an empty point set, `InvalidParameter` if the
    /// parameters do not fit the point set (checked before any work), and
    /// whatever resolution reports (`WorkerFailure`, `Cancelled`).
    pub fn build(&self, points: &PointSet) -> Result<MknnOutput> {
        if points.is_empty() {
            return Err(MknnError::IndexConstruction(
                "point set is empty".to_string(),
            ));
        }
        self.params.validate(points.len())?;
        let p = &self.params;

        debug!(
            points = points.len(),
            dimension = points.dimension(),
            k = p.k,
            metric = %p.metric,
            index = %p.index,
            "building mknn graph"
        );

        let start = Instant::now();
        match p.index {
            IndexKind::KdTree => {
                let tree = KdTree::build(points, p.metric, p.kdtree.clone())?;
                self.run(points, &tree, start.elapsed())
            }
            IndexKind::Exhaustive => {
                let flat = ExhaustiveIndex::new(points, p.metric)?;
                self.run(points, &flat, start.elapsed())
            }
        }
    }

    fn run<I: NeighborIndex>(
        &self,
        points: &PointSet,
        index: &I,
        index_time: Duration,
    ) -> Result<MknnOutput> {
        let p = &self.params;
        let index_stats = index.stats();
        debug!(
            depth = index_stats.depth,
            leaves = index_stats.num_leaves,
            elapsed_ms = index_time.as_millis() as u64,
            "index built"
        );

        let mut scheduler = Scheduler::new(p.threads);
        if let Some(token) = &self.cancel {
            scheduler = scheduler.with_cancel(token.clone());
        }

        let start = Instant::now();
        let candidates = scheduler.resolve_all(index, p.k)?;
        let resolve_time = start.elapsed();

        let start = Instant::now();
        let edges = compute_edges(&candidates, &p.weighting);
        let mutual_time = start.elapsed();
        debug!(
            mutual_edges = edges.len(),
            elapsed_ms = mutual_time.as_millis() as u64,
            "mutual edges computed"
        );

        let start = Instant::now();
        let graph = assemble(points.len(), edges)?;
        let assemble_time = start.elapsed();

        let stats = BuildStats {
            num_points: points.len(),
            dimension: points.dimension(),
            k: p.k,
            threads: scheduler.threads().min(points.len()),
            candidate_entries: candidates.num_entries(),
            num_edges: graph.num_edges(),
            isolated_vertices: graph.isolated_vertices().count(),
            index: index_stats,
            timings: PhaseTimings {
                index: index_time,
                resolve: resolve_time,
                mutual: mutual_time,
                assemble: assemble_time,
            },
        };

        info!(
            points = stats.num_points,
            k = stats.k,
            threads = stats.threads,
            edges = stats.num_edges,
            isolated = stats.isolated_vertices,
            elapsed_ms = stats.timings.total().as_millis() as u64,
            "mknn graph built"
        );

        Ok(MknnOutput {
            graph,
            candidates,
            stats,
        })
    }
}
