//! Distance metrics for dense points.
//!
//! Every metric here is a Minkowski-family distance, which gives the k-d tree
//! the property it prunes on: for any two points `a`, `b` and any axis `d`,
//! `|a[d] - b[d]| <= distance(a, b)`. Metrics without that property (cosine,
//! inner product) cannot be served by axis-aligned pruning and are not offered.
//!
//! The kernels are written so that `distance(a, b)` and `distance(b, a)` are
//! bit-identical: `x - y` and `y - x` differ only in sign under IEEE 754, and
//! every kernel takes the absolute value or the square before accumulating.
//!
//! Coordinates are `f32`, but the kernels subtract and accumulate in `f64`
//! and round once at the end. The per-axis difference of two `f32` values is
//! exact in `f64`, squares of `f32` differences neither underflow nor
//! overflow there, and rounding is monotone, so the returned distance is
//! never below `|a[d] - b[d]|` rounded to `f32`, which is what the k-d tree
//! compares it against.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::MknnError;

/// Distance metric for dense points. Fixed for a single run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Euclidean (L2) distance.
    #[default]
    Euclidean,
    /// Manhattan (L1) distance.
    Manhattan,
    /// Chebyshev (L∞) distance.
    Chebyshev,
}

impl DistanceMetric {
    /// Compute distance between two points.
    ///
    /// If dimensions mismatch, this returns `f32::INFINITY` (so it is never selected as a
    /// nearest neighbor).
    #[inline]
    #[must_use]
    pub fn distance(self, a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return f32::INFINITY;
        }
        match self {
            DistanceMetric::Euclidean => l2_distance(a, b),
            DistanceMetric::Manhattan => l1_distance(a, b),
            DistanceMetric::Chebyshev => linf_distance(a, b),
        }
    }

    /// Lower bound on the distance from a query to any point on the far side
    /// of an axis-aligned splitting plane, given the signed offset along that axis.
    #[inline]
    #[must_use]
    pub fn axis_lower_bound(self, offset: f32) -> f32 {
        match self {
            DistanceMetric::Euclidean | DistanceMetric::Manhattan | DistanceMetric::Chebyshev => {
                offset.abs()
            }
        }
    }

    /// Lowercase identifier, as accepted by [`FromStr`].
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            DistanceMetric::Euclidean => "euclidean",
            DistanceMetric::Manhattan => "manhattan",
            DistanceMetric::Chebyshev => "chebyshev",
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DistanceMetric {
    type Err = MknnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "euclidean" | "l2" => Ok(DistanceMetric::Euclidean),
            "manhattan" | "l1" | "cityblock" => Ok(DistanceMetric::Manhattan),
            "chebyshev" | "linf" => Ok(DistanceMetric::Chebyshev),
            other => Err(MknnError::InvalidParameter(format!(
                "unknown distance metric '{other}' (expected euclidean, manhattan or chebyshev)"
            ))),
        }
    }
}

/// L2 (Euclidean) distance.
#[inline]
#[must_use]
pub fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    squared_sum(a, b).sqrt() as f32
}

/// L1 (Manhattan) distance.
#[inline]
#[must_use]
pub fn l1_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| axis_diff(*x, *y)).sum::<f64>() as f32
}

/// L∞ (Chebyshev) distance.
#[inline]
#[must_use]
pub fn linf_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| axis_diff(*x, *y))
        .fold(0.0, f64::max) as f32
}

#[inline]
fn axis_diff(x: f32, y: f32) -> f64 {
    (f64::from(x) - f64::from(y)).abs()
}

#[inline]
fn squared_sum(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = axis_diff(*x, *y);
            d * d
        })
        .sum()
}
