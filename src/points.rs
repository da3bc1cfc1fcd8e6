//! Immutable in-memory point table.
//!
//! Coordinates are stored row-major in one flat buffer (SoA-style, like the
//! index implementations expect), so point `i` is
//! `data[i * dimension..(i + 1) * dimension]`.

use crate::{MknnError, Result};

/// A validated set of N points of dimensionality D.
///
/// Point indices are `0..N` in load order and never change. Every coordinate
/// is finite; that is checked once here so the index and resolvers never
/// have to.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSet {
    data: Vec<f32>,
    dimension: usize,
    len: usize,
}

impl PointSet {
    /// Create a point set from a flat row-major buffer.
    pub fn new(dimension: usize, data: Vec<f32>) -> Result<Self> {
        if dimension == 0 {
            return Err(MknnError::IndexConstruction(
                "points must have at least one dimension".to_string(),
            ));
        }
        if data.len() % dimension != 0 {
            return Err(MknnError::DimensionMismatch {
                point: data.len() / dimension,
                expected: dimension,
                found: data.len() % dimension,
            });
        }
        if let Some(pos) = data.iter().position(|v| !v.is_finite()) {
            return Err(MknnError::NonFiniteCoordinate {
                point: pos / dimension,
                dimension: pos % dimension,
            });
        }

        let len = data.len() / dimension;
        Ok(Self {
            data,
            dimension,
            len,
        })
    }

    /// Create a point set from one vector per point.
    ///
    /// The first row fixes the dimensionality; any later row with a
    /// different length is rejected with its index.
    pub fn from_rows<R: AsRef<[f32]>>(rows: &[R]) -> Result<Self> {
        let Some(first) = rows.first() else {
            return Err(MknnError::IndexConstruction(
                "point set is empty".to_string(),
            ));
        };
        let dimension = first.as_ref().len();
        let mut data = Vec::with_capacity(rows.len() * dimension);

        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != dimension {
                return Err(MknnError::DimensionMismatch {
                    point: i,
                    expected: dimension,
                    found: row.len(),
                });
            }
            data.extend_from_slice(row);
        }

        Self::new(dimension, data)
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Dimensionality of every point.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Coordinates of point `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[inline]
    #[must_use]
    pub fn point(&self, index: usize) -> &[f32] {
        let start = index * self.dimension;
        &self.data[start..start + self.dimension]
    }

    /// Coordinates of point `index`, or `None` if out of range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&[f32]> {
        (index < self.len).then(|| self.point(index))
    }

    /// Iterate points in index order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &[f32]> + '_ {
        self.data.chunks_exact(self.dimension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_keeps_order() {
        let points = PointSet::from_rows(&[vec![0.0, 1.0], vec![2.0, 3.0], vec![4.0, 5.0]]).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points.dimension(), 2);
        assert_eq!(points.point(1), &[2.0, 3.0]);
        assert_eq!(points.iter().count(), 3);
        assert!(points.get(3).is_none());
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = PointSet::from_rows(&[vec![0.0, 1.0], vec![2.0, 3.0], vec![4.0]]).unwrap_err();
        assert!(matches!(
            err,
            MknnError::DimensionMismatch {
                point: 2,
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn rejects_non_finite() {
        let err = PointSet::new(2, vec![0.0, 1.0, f32::NAN, 3.0]).unwrap_err();
        assert!(matches!(
            err,
            MknnError::NonFiniteCoordinate {
                point: 1,
                dimension: 0
            }
        ));
    }

    #[test]
    fn rejects_empty_and_zero_dimension() {
        let empty: [Vec<f32>; 0] = [];
        assert!(matches!(
            PointSet::from_rows(&empty),
            Err(MknnError::IndexConstruction(_))
        ));
        assert!(matches!(
            PointSet::new(0, vec![]),
            Err(MknnError::IndexConstruction(_))
        ));
    }
}
