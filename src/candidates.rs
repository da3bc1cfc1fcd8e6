//! Per-vertex candidate lists: each point's k nearest neighbors before the
//! mutuality rule is applied.

use serde::{Deserialize, Serialize};

use crate::{MknnError, Result};

/// One directed candidate relation `source -> target`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub source: u32,
    pub target: u32,
    pub distance: f32,
}

/// Candidate lists for every point, stored densely by source index.
///
/// List `i` holds at most `k` entries with `source == i`, sorted ascending by
/// `(distance, target)`, never containing `i` itself.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateTable {
    k: usize,
    lists: Vec<Vec<Candidate>>,
}

impl CandidateTable {
    /// Build a table from lists the resolver already validated.
    pub(crate) fn from_resolved(k: usize, lists: Vec<Vec<Candidate>>) -> Self {
        Self { k, lists }
    }

    /// Build a table from caller-supplied lists, checking every table invariant.
    ///
    /// Lists must be indexed by source, reference existing points only, and
    /// hold at most `k` entries without self-references or duplicates. They
    /// are re-sorted by `(distance, target)`.
    pub fn new(k: usize, mut lists: Vec<Vec<Candidate>>) -> Result<Self> {
        let n = lists.len();
        for (i, list) in lists.iter_mut().enumerate() {
            if list.len() > k {
                return Err(MknnError::InvalidParameter(format!(
                    "point {i} has {} candidates, more than k = {k}",
                    list.len()
                )));
            }
            for c in list.iter() {
                if c.source as usize != i {
                    return Err(MknnError::InvalidParameter(format!(
                        "candidate list {i} contains an entry with source {}",
                        c.source
                    )));
                }
                if c.target as usize >= n || c.target == c.source {
                    return Err(MknnError::InvalidEdge {
                        u: c.source,
                        v: c.target,
                        num_vertices: n,
                    });
                }
                if !c.distance.is_finite() || c.distance < 0.0 {
                    return Err(MknnError::InvalidParameter(format!(
                        "candidate ({}, {}) has invalid distance {}",
                        c.source, c.target, c.distance
                    )));
                }
            }
            list.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.target.cmp(&b.target)));
            if list.windows(2).any(|w| w[0].target == w[1].target) {
                return Err(MknnError::InvalidParameter(format!(
                    "candidate list {i} contains a duplicate target"
                )));
            }
        }
        Ok(Self { k, lists })
    }

    /// Maximum list length: the resolved `min(k, N - 1)`.
    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of source points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Candidate list of `source`, empty if out of range.
    #[must_use]
    pub fn get(&self, source: u32) -> &[Candidate] {
        self.lists.get(source as usize).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `target` is in the candidate list of `source`.
    #[must_use]
    pub fn contains(&self, source: u32, target: u32) -> bool {
        self.get(source).iter().any(|c| c.target == target)
    }

    /// Iterate `(source, list)` in ascending source order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[Candidate])> + '_ {
        self.lists
            .iter()
            .enumerate()
            .map(|(i, list)| (i as u32, list.as_slice()))
    }

    /// Iterate every candidate entry, grouped by source.
    pub fn entries(&self) -> impl Iterator<Item = &Candidate> + '_ {
        self.lists.iter().flatten()
    }

    /// Total number of candidate entries.
    #[must_use]
    pub fn num_entries(&self) -> usize {
        self.lists.iter().map(Vec::len).sum()
    }
}
