//! Weighted undirected graph assembled from mutual edges.

use serde::{Deserialize, Serialize};

use crate::{MknnError, Result};

/// Undirected weighted edge, normalized so that `source < target`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: u32,
    pub target: u32,
    pub weight: f32,
}

impl Edge {
    /// Create an edge between `a` and `b` in either order.
    #[must_use]
    pub fn new(a: u32, b: u32, weight: f32) -> Self {
        Self {
            source: a.min(b),
            target: a.max(b),
            weight,
        }
    }

    /// The endpoint opposite `vertex`, or `None` if `vertex` is not on this edge.
    #[must_use]
    pub fn other(&self, vertex: u32) -> Option<u32> {
        if vertex == self.source {
            Some(self.target)
        } else if vertex == self.target {
            Some(self.source)
        } else {
            None
        }
    }
}

/// Simple undirected weighted graph on vertices `0..N`.
///
/// Edges are stored once, sorted ascending by `(source, target)`, next to a
/// CSR adjacency so per-vertex queries do not scan the edge list.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    num_vertices: usize,
    edges: Vec<Edge>,
    /// `adjacency[offsets[v]..offsets[v + 1]]` are the `(neighbor, weight)`
    /// pairs of `v`, ascending by neighbor.
    offsets: Vec<usize>,
    adjacency: Vec<(u32, f32)>,
}

/// Assemble the final graph from mutual edges.
///
/// Every vertex `0..num_vertices` is present, isolated or not. Edges are
/// normalized, sorted, and deduplicated: when a pair occurs more than once
/// (in either orientation) the first occurrence is kept.
///
/// # Errors
///
/// `InvalidEdge` for a self-loop or an endpoint `>= num_vertices`.
pub fn assemble(num_vertices: usize, edges: impl IntoIterator<Item = Edge>) -> Result<Graph> {
    let mut normalized = Vec::new();
    for e in edges {
        let e = Edge::new(e.source, e.target, e.weight);
        if e.source == e.target || e.target as usize >= num_vertices {
            return Err(MknnError::InvalidEdge {
                u: e.source,
                v: e.target,
                num_vertices,
            });
        }
        normalized.push(e);
    }

    // Stable sort, so dedup keeps the first occurrence of each pair.
    normalized.sort_by_key(|e| (e.source, e.target));
    normalized.dedup_by_key(|e| (e.source, e.target));

    let mut degree = vec![0usize; num_vertices];
    for e in &normalized {
        degree[e.source as usize] += 1;
        degree[e.target as usize] += 1;
    }
    let mut offsets = Vec::with_capacity(num_vertices + 1);
    offsets.push(0);
    for d in &degree {
        offsets.push(offsets[offsets.len() - 1] + d);
    }

    // Edges are sorted by (source, target), so each vertex first receives
    // its smaller neighbors (as target) and then its larger ones (as source),
    // both in ascending order.
    let mut cursor = offsets[..num_vertices].to_vec();
    let mut adjacency = vec![(0u32, 0.0f32); offsets[num_vertices]];
    for e in &normalized {
        let (s, t) = (e.source as usize, e.target as usize);
        adjacency[cursor[s]] = (e.target, e.weight);
        cursor[s] += 1;
        adjacency[cursor[t]] = (e.source, e.weight);
        cursor[t] += 1;
    }

    Ok(Graph {
        num_vertices,
        edges: normalized,
        offsets,
        adjacency,
    })
}

impl Graph {
    #[must_use]
    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Vertices in ascending order.
    pub fn vertices(&self) -> impl ExactSizeIterator<Item = u32> {
        0..self.num_vertices as u32
    }

    /// Edges ascending by `(source, target)`.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// `(neighbor, weight)` pairs of `vertex`, ascending by neighbor.
    /// Empty for out-of-range vertices.
    #[must_use]
    pub fn neighbors(&self, vertex: u32) -> &[(u32, f32)] {
        let v = vertex as usize;
        if v >= self.num_vertices {
            return &[];
        }
        &self.adjacency[self.offsets[v]..self.offsets[v + 1]]
    }

    #[must_use]
    pub fn degree(&self, vertex: u32) -> usize {
        self.neighbors(vertex).len()
    }

    /// Whether `{a, b}` is an edge.
    #[must_use]
    pub fn contains_edge(&self, a: u32, b: u32) -> bool {
        let key = (a.min(b), a.max(b));
        self.edges
            .binary_search_by_key(&key, |e| (e.source, e.target))
            .is_ok()
    }

    /// Weight of edge `{a, b}`, if present.
    #[must_use]
    pub fn edge_weight(&self, a: u32, b: u32) -> Option<f32> {
        let key = (a.min(b), a.max(b));
        self.edges
            .binary_search_by_key(&key, |e| (e.source, e.target))
            .ok()
            .map(|i| self.edges[i].weight)
    }

    /// Vertices without any edge, ascending.
    pub fn isolated_vertices(&self) -> impl Iterator<Item = u32> + '_ {
        self.vertices().filter(|&v| self.degree(v) == 0)
    }
}
