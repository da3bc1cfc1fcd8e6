//! Error types for mknn.

use thiserror::Error;

/// Errors that can occur while loading points or building a graph.
#[derive(Debug, Error)]
pub enum MknnError {
    /// Invalid parameter value (k out of range, negative thread count, ...).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A dataset row could not be parsed. `line` and `column` are 1-based.
    #[error("malformed input at line {line}, column {column}: {message}")]
    MalformedInput {
        line: usize,
        column: usize,
        message: String,
    },

    /// A point has a different dimensionality than the first point.
    #[error("dimension mismatch at point {point}: expected {expected}, found {found}")]
    DimensionMismatch {
        point: usize,
        expected: usize,
        found: usize,
    },

    /// NaN or infinite coordinate.
    #[error("non-finite coordinate at point {point}, dimension {dimension}")]
    NonFiniteCoordinate { point: usize, dimension: usize },

    /// The spatial index cannot be built (empty or zero-dimensional input).
    #[error("index construction failed: {0}")]
    IndexConstruction(String),

    /// A resolver partition failed; no partial table is returned.
    #[error("worker for chunk {chunk} failed at point {point}: {reason}")]
    WorkerFailure {
        chunk: usize,
        point: u32,
        reason: String,
    },

    /// The run was cancelled through a [`CancelToken`](crate::resolve::CancelToken).
    #[error("neighbor resolution cancelled")]
    Cancelled,

    /// An edge references a missing vertex or is a self-loop.
    #[error("invalid edge ({u}, {v}) for graph with {num_vertices} vertices")]
    InvalidEdge { u: u32, v: u32, num_vertices: usize },

    /// Malformed parameter file.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error (dataset or graph files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for MknnError {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<rayon::ThreadPoolBuildError> for MknnError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        Self::InvalidParameter(format!("cannot build worker pool: {e}"))
    }
}

pub type Result<T> = std::result::Result<T, MknnError>;
