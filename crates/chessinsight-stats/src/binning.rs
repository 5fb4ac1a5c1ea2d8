//! Fixed-edge binning for grouped analysis
//!
//! [`HalfOpenBins`] splits an ordered domain into `edges.len() + 1` bins using
//! lower-inclusive, upper-exclusive intervals:
//!
//! ```text
//! edges = [-100, 0, 100]
//!
//! bin 0: (-inf, -100)
//! bin 1: [-100,    0)
//! bin 2: [   0,  100)
//! bin 3: [ 100, +inf)
//! ```
//!
//! A value equal to an edge always belongs to the bin that starts at that edge.
//!
//! # Examples
//!
//! ```
//! use chessinsight_stats::binning::HalfOpenBins;
//!
//! let bins = HalfOpenBins::new(vec![-500, 0, 100, 200]).unwrap();
//! assert_eq!(bins.bin_count(), 5);
//! assert_eq!(bins.bin_of(-501), 0);
//! assert_eq!(bins.bin_of(-500), 1);
//! assert_eq!(bins.bin_of(0), 2);
//! assert_eq!(bins.bin_of(250), 4);
//! assert_eq!(bins.bounds(2), (Some(0), Some(100)));
//! ```

/// Half-open bins defined by strictly increasing edges.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HalfOpenBins<K> {
    edges: Vec<K>,
}

impl<K> HalfOpenBins<K>
where
    K: Ord + Copy,
{
    /// Creates bins from edges.
    ///
    /// Returns `None` if `edges` is empty or not strictly increasing.
    #[must_use]
    pub fn new(edges: Vec<K>) -> Option<Self> {
        if edges.is_empty() || !edges.windows(2).all(|w| w[0] < w[1]) {
            return None;
        }
        Some(Self { edges })
    }

    /// The bin edges in ascending order.
    #[must_use]
    pub fn edges(&self) -> &[K] {
        &self.edges
    }

    /// Number of bins, including the two unbounded outer bins.
    #[must_use]
    pub fn bin_count(&self) -> usize {
        self.edges.len() + 1
    }

    /// Index of the bin containing `value`.
    #[must_use]
    pub fn bin_of(&self, value: K) -> usize {
        self.edges.partition_point(|edge| *edge <= value)
    }

    /// Lower (inclusive) and upper (exclusive) bounds of a bin.
    ///
    /// `None` stands for an unbounded side.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.bin_count()`.
    #[must_use]
    pub fn bounds(&self, index: usize) -> (Option<K>, Option<K>) {
        assert!(index < self.bin_count(), "bin index out of range");
        let lower = index.checked_sub(1).map(|i| self.edges[i]);
        let upper = self.edges.get(index).copied();
        (lower, upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_edges() {
        assert!(HalfOpenBins::<i32>::new(vec![]).is_none());
        assert!(HalfOpenBins::new(vec![0, 0]).is_none());
        assert!(HalfOpenBins::new(vec![100, 0]).is_none());
        assert!(HalfOpenBins::new(vec![0]).is_some());
    }

    #[test]
    fn test_edge_values_are_lower_inclusive() {
        let bins = HalfOpenBins::new(vec![-100, 0, 100]).unwrap();
        assert_eq!(bins.bin_of(-101), 0);
        assert_eq!(bins.bin_of(-100), 1);
        assert_eq!(bins.bin_of(-1), 1);
        assert_eq!(bins.bin_of(0), 2);
        assert_eq!(bins.bin_of(99), 2);
        assert_eq!(bins.bin_of(100), 3);
        assert_eq!(bins.bin_of(i32::MAX), 3);
        assert_eq!(bins.bin_of(i32::MIN), 0);
    }

    #[test]
    fn test_bounds_of_outer_bins_are_unbounded() {
        let bins = HalfOpenBins::new(vec![-100, 0, 100]).unwrap();
        assert_eq!(bins.bounds(0), (None, Some(-100)));
        assert_eq!(bins.bounds(1), (Some(-100), Some(0)));
        assert_eq!(bins.bounds(3), (Some(100), None));
    }

    #[test]
    fn test_every_value_falls_inside_its_bounds() {
        let bins = HalfOpenBins::new(vec![-500, 0, 100, 200]).unwrap();
        for value in (-700..400).step_by(7) {
            let (lower, upper) = bins.bounds(bins.bin_of(value));
            assert!(lower.is_none_or(|l| l <= value), "{value} below {lower:?}");
            assert!(upper.is_none_or(|u| value < u), "{value} not below {upper:?}");
        }
    }

    #[test]
    #[should_panic(expected = "bin index out of range")]
    fn test_bounds_out_of_range() {
        let bins = HalfOpenBins::new(vec![0]).unwrap();
        let _ = bins.bounds(2);
    }
}
