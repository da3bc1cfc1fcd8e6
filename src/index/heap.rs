//! Bounded max-heap holding the running k best candidates of one query.

use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;

use super::traits::Neighbor;

/// Keeps the `k` smallest `(distance, index)` pairs offered to it.
///
/// The heap top is the current worst kept pair, so replacing it is one
/// sift. Comparing whole tuples gives the index tie-break for free.
pub(crate) struct KnnHeap {
    k: usize,
    heap: BinaryHeap<(OrderedFloat<f32>, u32)>,
}

impl KnnHeap {
    pub(crate) fn new(k: usize) -> Self {
        Self {
            k,
            heap: BinaryHeap::with_capacity(k),
        }
    }

    /// Pruning threshold: the k-th best distance once full, infinity before.
    #[inline]
    pub(crate) fn threshold(&self) -> f32 {
        if self.heap.len() < self.k {
            return f32::INFINITY;
        }
        self.heap.peek().map_or(f32::INFINITY, |&(d, _)| d.0)
    }

    #[inline]
    pub(crate) fn offer(&mut self, distance: f32, index: u32) {
        if self.k == 0 {
            return;
        }
        let item = (OrderedFloat(distance), index);
        if self.heap.len() < self.k {
            self.heap.push(item);
        } else if let Some(mut worst) = self.heap.peek_mut() {
            if item < *worst {
                *worst = item;
            }
        }
    }

    /// Drain into ascending `(distance, index)` order.
    pub(crate) fn into_sorted(self) -> Vec<Neighbor> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|(distance, index)| Neighbor {
                index,
                distance: distance.0,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_k_smallest_sorted() {
        let mut heap = KnnHeap::new(3);
        for (d, i) in [(5.0, 0), (1.0, 1), (4.0, 2), (2.0, 3), (3.0, 4)] {
            heap.offer(d, i);
        }
        let got: Vec<u32> = heap.into_sorted().iter().map(|n| n.index).collect();
        assert_eq!(got, vec![1, 3, 4]);
    }

    #[test]
    fn ties_prefer_smaller_index() {
        let mut heap = KnnHeap::new(2);
        for i in [7, 3, 9, 1, 5] {
            heap.offer(1.0, i);
        }
        let got: Vec<u32> = heap.into_sorted().iter().map(|n| n.index).collect();
        assert_eq!(got, vec![1, 3]);
    }

    #[test]
    fn threshold_is_infinite_until_full() {
        let mut heap = KnnHeap::new(2);
        heap.offer(1.0, 0);
        assert!(heap.threshold().is_infinite());
        heap.offer(2.0, 1);
        assert_eq!(heap.threshold(), 2.0);
        heap.offer(0.5, 2);
        assert_eq!(heap.threshold(), 1.0);
    }

    #[test]
    fn zero_k_keeps_nothing() {
        let mut heap = KnnHeap::new(0);
        heap.offer(1.0, 0);
        assert!(heap.into_sorted().is_empty());
    }
}
