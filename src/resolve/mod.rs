//! Neighbor resolution: the k nearest neighbors of every indexed point.
//!
//! A resolver worker is a pure function of its chunk of source indices and
//! the shared read-only index. [`Scheduler`] fans chunks out over a worker
//! pool and concatenates the results; see its docs for the thread-count
//! convention.
//!
//! Between two point queries a worker checks two flags:
//!
//! - the caller's [`CancelToken`], if any;
//! - the run's abort flag, raised as soon as any worker fails.
//!
//! So a failing or cancelled run stops within one query per worker, and no
//! partial table ever escapes.

pub mod scheduler;

use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::candidates::Candidate;
use crate::index::NeighborIndex;
use crate::MknnError;

pub use scheduler::{effective_threads, partition, resolve_all, Scheduler};

/// Cooperative cancellation flag shared between a caller and a running build.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Workers notice before their next point query.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Flags every worker of one run observes.
pub(crate) struct RunControl<'a> {
    pub(crate) abort: AtomicBool,
    pub(crate) cancel: Option<&'a CancelToken>,
}

/// Why a chunk produced no lists.
pub(crate) enum ChunkError {
    /// This chunk failed (or saw the cancel token).
    Failed(MknnError),
    /// Another chunk failed first; this one stopped early.
    Aborted,
}

pub(crate) type ChunkResult = Result<Vec<Vec<Candidate>>, ChunkError>;

/// Resolve the candidate lists of `range`, one list per point, in order.
///
/// Every list must have exactly `expected_len` entries with finite distances.
pub(crate) fn resolve_chunk<I: NeighborIndex + ?Sized>(
    index: &I,
    k: usize,
    chunk: usize,
    range: Range<u32>,
    expected_len: usize,
    control: &RunControl<'_>,
) -> ChunkResult {
    debug!(chunk, start = range.start, end = range.end, "resolving chunk");

    let result = resolve_range(index, k, chunk, range, expected_len, control);
    if let Err(ChunkError::Failed(_)) = &result {
        control.abort.store(true, Ordering::Relaxed);
    }
    result
}

fn resolve_range<I: NeighborIndex + ?Sized>(
    index: &I,
    k: usize,
    chunk: usize,
    range: Range<u32>,
    expected_len: usize,
    control: &RunControl<'_>,
) -> ChunkResult {
    let fail = |point: u32, reason: String| {
        ChunkError::Failed(MknnError::WorkerFailure {
            chunk,
            point,
            reason,
        })
    };

    let mut lists = Vec::with_capacity(range.len());
    for point in range {
        if control.abort.load(Ordering::Relaxed) {
            return Err(ChunkError::Aborted);
        }
        if control.cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(ChunkError::Failed(MknnError::Cancelled));
        }

        let neighbors = index
            .query_k_nearest(point, k)
            .map_err(|e| fail(point, e.to_string()))?;

        if neighbors.len() != expected_len {
            return Err(fail(
                point,
                format!(
                    "index returned {} neighbors, expected {expected_len}",
                    neighbors.len()
                ),
            ));
        }

        let mut list = Vec::with_capacity(neighbors.len());
        for n in neighbors {
            if n.index == point {
                return Err(fail(point, "index returned the query point itself".to_string()));
            }
            if !n.distance.is_finite() {
                return Err(fail(
                    point,
                    format!("distance to point {} is not finite", n.index),
                ));
            }
            list.push(Candidate {
                source: point,
                target: n.index,
                distance: n.distance,
            });
        }
        lists.push(list);
    }
    Ok(lists)
}
