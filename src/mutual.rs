//! Mutuality engine: keep a candidate pair only if it is symmetric.
//!
//! # The rule
//!
//! ```text
//! {i, j} ∈ E  ⇔  j ∈ kNN(i)  ∧  i ∈ kNN(j)
//! ```
//!
//! Membership anywhere in the other's list qualifies; rank does not matter.
//! The plain symmetrized kNN graph would use `∨` instead, which lets hubs
//! (points that sit in many lists) collect edges from points they would
//! never pick themselves. The mutual rule removes those one-sided links, so
//! the graph is sparser and every vertex has degree ≤ k.
//!
//! # Weights
//!
//! `d(i→j)` and `d(j→i)` come from two independent queries. They are equal
//! for every metric this crate ships (the kernels are bitwise symmetric), but
//! a caller-built [`CandidateTable`] may carry asymmetric distances, so the
//! combination is an explicit policy: [`DistanceCombination`] merges the two
//! into one distance `d`, then [`WeightFunction`] maps `d` to the edge weight.
//! The default is the arithmetic mean and `1 / (1 + d)`.

use std::fmt;
use std::str::FromStr;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::candidates::CandidateTable;
use crate::graph::Edge;
use crate::MknnError;

/// How the two directional distances of a mutual pair are merged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceCombination {
    /// Arithmetic mean.
    #[default]
    Mean,
    /// Smaller of the two.
    Min,
    /// Larger of the two.
    Max,
}

impl DistanceCombination {
    /// Combine two distances. Symmetric in its arguments.
    #[inline]
    #[must_use]
    pub fn combine(self, forward: f32, backward: f32) -> f32 {
        match self {
            // Halve first so two large finite distances cannot overflow.
            DistanceCombination::Mean => forward * 0.5 + backward * 0.5,
            DistanceCombination::Min => forward.min(backward),
            DistanceCombination::Max => forward.max(backward),
        }
    }
}

impl fmt::Display for DistanceCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DistanceCombination::Mean => "mean",
            DistanceCombination::Min => "min",
            DistanceCombination::Max => "max",
        })
    }
}

impl FromStr for DistanceCombination {
    type Err = MknnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mean" | "avg" => Ok(DistanceCombination::Mean),
            "min" => Ok(DistanceCombination::Min),
            "max" => Ok(DistanceCombination::Max),
            other => Err(MknnError::InvalidParameter(format!(
                "unknown distance combination '{other}' (expected mean, min or max)"
            ))),
        }
    }
}

/// How a combined distance becomes an edge weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightFunction {
    /// `w = 1 / (1 + d)`: in (0, 1], higher = closer. Positive even for
    /// coincident points.
    #[default]
    InverseDistance,
    /// `w = d`: the raw distance. Zero for coincident points.
    Distance,
    /// `w = 1` (unweighted).
    Uniform,
}

impl WeightFunction {
    #[inline]
    #[must_use]
    pub fn apply(self, distance: f32) -> f32 {
        match self {
            WeightFunction::InverseDistance => 1.0 / (1.0 + distance),
            WeightFunction::Distance => distance,
            WeightFunction::Uniform => 1.0,
        }
    }
}

/// Complete edge-weight policy of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeWeighting {
    pub combine: DistanceCombination,
    pub function: WeightFunction,
}

impl EdgeWeighting {
    /// Weight of an edge with directional distances `forward` and `backward`.
    #[inline]
    #[must_use]
    pub fn weight(&self, forward: f32, backward: f32) -> f32 {
        self.function.apply(self.combine.combine(forward, backward))
    }
}

/// Compute the mutual edges of a candidate table.
///
/// Each surviving pair is emitted exactly once, from its smaller endpoint,
/// as an [`Edge`] with `source < target`. Edges come out grouped by
/// ascending source; within a source they follow candidate-list order.
///
/// O(N·k): one hash insert and at most one lookup per candidate entry.
#[must_use]
pub fn compute_edges(table: &CandidateTable, weighting: &EdgeWeighting) -> Vec<Edge> {
    let lookup: FxHashMap<(u32, u32), f32> = table
        .entries()
        .map(|c| ((c.source, c.target), c.distance))
        .collect();

    let mut edges = Vec::new();
    for (source, list) in table.iter() {
        for c in list.iter().filter(|c| source < c.target) {
            if let Some(&backward) = lookup.get(&(c.target, source)) {
                edges.push(Edge {
                    source,
                    target: c.target,
                    weight: weighting.weight(c.distance, backward),
                });
            }
        }
    }
    edges
}

/// Whether `{i, j}` satisfies the mutual rule in `table`.
#[must_use]
pub fn is_mutual(table: &CandidateTable, i: u32, j: u32) -> bool {
    i != j && table.contains(i, j) && table.contains(j, i)
}
