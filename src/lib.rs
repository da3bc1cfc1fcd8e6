//! mknn: Mutual k-Nearest-Neighbor graph construction.
//!
//! Builds the undirected graph that joins two points iff each is among the
//! other's k nearest neighbors:
//!
//! - `index/`: spatial indexes answering exact kNN queries (k-d tree, flat scan)
//! - `resolve/`: parallel per-point neighbor resolution into candidate lists
//! - `mutual`: the symmetric-membership filter and edge weighting
//! - `graph`: the assembled simple weighted graph
//! - `io/`: delimited point tables in, ncol/pajek edge lists out
//!
//! ```no_run
//! use mknn::{build_mknn_graph, MknnParams, PointSet};
//!
//! let points = PointSet::from_rows(&[[0.0_f32, 0.0], [0.0, 1.0], [5.0, 5.0], [5.0, 6.0]])?;
//! let out = build_mknn_graph(&points, &MknnParams::with_k(1))?;
//! assert_eq!(out.graph.num_edges(), 2);
//! # Ok::<(), mknn::MknnError>(())
//! ```
//!
//! # Critical Nuances
//!
//! ## Degree Bound
//!
//! Every vertex has degree ≤ k, and usually much less. Points in sparse
//! regions pick neighbors that pick someone else, so small k leaves many
//! vertices isolated. They stay in the graph as vertices without edges.
//!
//! ## Exactness
//!
//! Neighbor sets are exact, not approximate. Equal distances are broken by
//! the smaller point index, so the candidate lists (and therefore the graph)
//! depend only on the points and `k`, never on thread count or scheduling.
//!
//! ## When the k-d Tree Stops Paying Off
//!
//! Pruning degrades with dimensionality. Past a few dozen dimensions most
//! subtrees survive the bound check and the tree costs more than
//! [`index::ExhaustiveIndex`], which is selectable through [`MknnParams`].

pub mod candidates;
pub mod distance;
pub mod error;
pub mod graph;
pub mod index;
pub mod io;
pub mod mutual;
pub mod params;
pub mod pipeline;
pub mod points;
pub mod resolve;

// Re-exports
pub use candidates::{Candidate, CandidateTable};
pub use distance::DistanceMetric;
pub use error::{MknnError, Result};
pub use graph::{assemble, Edge, Graph};
pub use index::{IndexKind, Neighbor, NeighborIndex};
pub use mutual::{compute_edges, DistanceCombination, EdgeWeighting, WeightFunction};
pub use params::MknnParams;
pub use pipeline::{build_mknn_graph, BuildStats, MknnGraphBuilder, MknnOutput};
pub use points::PointSet;
pub use resolve::{CancelToken, Scheduler};
