//! Parallel scheduler for neighbor resolution.
//!
//! # Thread-count convention
//!
//! | requested | workers |
//! |-----------|---------|
//! | `0` | all available cores (`std::thread::available_parallelism`) |
//! | `1` | the calling thread, no pool |
//! | `t > 1` | a dedicated rayon pool of `min(t, N)` threads |
//!
//! The point range `0..N` is cut into `min(workers, N)` contiguous chunks by
//! [`partition`], which depends only on `N` and the chunk count. Chunks are
//! merged in chunk order after the pool joins, so the table is identical
//! for every thread count.

use std::num::NonZeroUsize;
use std::ops::Range;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, warn};

use super::{resolve_chunk, CancelToken, ChunkError, ChunkResult, RunControl};
use crate::candidates::CandidateTable;
use crate::index::NeighborIndex;
use crate::{MknnError, Result};

/// Resolve the candidate lists of every point with `thread_count` workers.
pub fn resolve_all<I: NeighborIndex + ?Sized>(
    index: &I,
    k: usize,
    thread_count: usize,
) -> Result<CandidateTable> {
    Scheduler::new(thread_count).resolve_all(index, k)
}

/// Number of workers a requested thread count maps to.
#[must_use]
pub fn effective_threads(requested: usize) -> usize {
    if requested == 0 {
        std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
    } else {
        requested
    }
}

/// Split `0..n` into `chunks` contiguous ranges (fewer if `n < chunks`).
///
/// The first `n % chunks` ranges get one extra point. Empty for `n == 0`.
#[must_use]
pub fn partition(n: u32, chunks: usize) -> Vec<Range<u32>> {
    if n == 0 {
        return Vec::new();
    }
    let chunks = chunks.clamp(1, n as usize) as u32;
    let base = n / chunks;
    let extra = n % chunks;

    let mut ranges = Vec::with_capacity(chunks as usize);
    let mut start = 0;
    for i in 0..chunks {
        let len = base + u32::from(i < extra);
        ranges.push(start..start + len);
        start += len;
    }
    ranges
}

/// Worker-pool configuration for one or more resolution runs.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    threads: usize,
    cancel: Option<CancelToken>,
}

impl Scheduler {
    /// `threads` follows the convention in the module docs (0 = all cores).
    pub fn new(threads: usize) -> Self {
        Self {
            threads,
            cancel: None,
        }
    }

    /// Check `token` between point queries.
    #[must_use]
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Number of workers this scheduler runs.
    #[must_use]
    pub fn threads(&self) -> usize {
        effective_threads(self.threads)
    }

    /// Resolve the `min(k, N - 1)` nearest neighbors of every indexed point.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter` if `k == 0` or the worker pool cannot be built.
    /// - `WorkerFailure` for the first failing chunk in chunk order,
    ///   independent of which worker failed first in time.
    /// - `Cancelled` if the token fired and no chunk failed otherwise.
    pub fn resolve_all<I: NeighborIndex + ?Sized>(&self, index: &I, k: usize) -> Result<CandidateTable> {
        if k == 0 {
            return Err(MknnError::InvalidParameter(
                "k must be at least 1".to_string(),
            ));
        }
        let n = u32::try_from(index.num_points()).map_err(|_| {
            MknnError::InvalidParameter(format!(
                "{} points exceed the u32 index space",
                index.num_points()
            ))
        })?;

        let threads = self.threads();
        let chunks = partition(n, threads);
        let expected_len = k.min((n as usize).saturating_sub(1));
        let control = RunControl {
            abort: AtomicBool::new(false),
            cancel: self.cancel.as_ref(),
        };
        let start = Instant::now();

        let run = |(chunk, range): (usize, &Range<u32>)| {
            resolve_chunk(index, k, chunk, range.clone(), expected_len, &control)
        };
        let workers = chunks.len();
        let results: Vec<ChunkResult> = if workers <= 1 {
            chunks.iter().enumerate().map(run).collect()
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("mknn-worker-{i}"))
                .build()?;
            pool.install(|| chunks.par_iter().enumerate().map(run).collect())
        };

        let mut lists = Vec::with_capacity(n as usize);
        let mut cancelled = false;
        let mut aborted = Vec::new();
        for (chunk, result) in results.into_iter().enumerate() {
            match result {
                Ok(part) => lists.extend(part),
                Err(ChunkError::Failed(MknnError::Cancelled)) => cancelled = true,
                Err(ChunkError::Failed(e)) => {
                    return Err(earliest_failure(index, k, &chunks, &aborted, expected_len).unwrap_or(e));
                }
                Err(ChunkError::Aborted) => aborted.push(chunk),
            }
        }
        if cancelled {
            warn!("neighbor resolution cancelled");
            return Err(MknnError::Cancelled);
        }

        debug!(
            points = n,
            k,
            threads,
            workers,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "resolved candidate table"
        );
        Ok(CandidateTable::from_resolved(expected_len, lists))
    }
}

/// Re-resolve `aborted` chunks (all ahead of the first failing chunk) to
/// completion, in order, and return the first failure among them.
///
/// An aborted chunk stopped because a later chunk failed first, so it may
/// still hold an earlier failure. The re-run ignores the cancel token.
fn earliest_failure<I: NeighborIndex + ?Sized>(
    index: &I,
    k: usize,
    chunks: &[Range<u32>],
    aborted: &[usize],
    expected_len: usize,
) -> Option<MknnError> {
    let control = RunControl {
        abort: AtomicBool::new(false),
        cancel: None,
    };
    aborted.iter().find_map(|&chunk| {
        match resolve_chunk(index, k, chunk, chunks[chunk].clone(), expected_len, &control) {
            Err(ChunkError::Failed(e)) => Some(e),
            _ => None,
        }
    })
}
