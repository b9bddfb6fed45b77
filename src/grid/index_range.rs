use serde::{Deserialize, Serialize};

/// Holds an inclusive rectangular range of areal (i,j) indices
///
/// ```text
///  j ↑
///    │  last_j  ┌───────────┐
///    │          │           │
///    │  first_j └───────────┘
///    └─────── first_i ─── last_i ──→ i
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub struct IndexRange {
    pub first_i: usize,
    pub last_i: usize,
    pub first_j: usize,
    pub last_j: usize,
}

impl IndexRange {
    /// Allocates a new range
    ///
    /// **Note:** The range must not be empty, i.e., `first ≤ last` in both directions.
    pub fn new(first_i: usize, last_i: usize, first_j: usize, last_j: usize) -> Self {
        assert!(first_i <= last_i && first_j <= last_j, "index range must not be empty");
        IndexRange {
            first_i,
            last_i,
            first_j,
            last_j,
        }
    }

    /// Returns the number of indices along i
    pub fn len_i(&self) -> usize {
        self.last_i - self.first_i + 1
    }

    /// Returns the number of indices along j
    pub fn len_j(&self) -> usize {
        self.last_j - self.first_j + 1
    }

    /// Returns the total number of (i,j) pairs
    pub fn len(&self) -> usize {
        self.len_i() * self.len_j()
    }

    /// Returns true if (i,j) is within the range
    pub fn contains(&self, i: usize, j: usize) -> bool {
        i >= self.first_i && i <= self.last_i && j >= self.first_j && j <= self.last_j
    }

    /// Returns the range grown by `width` in all directions, limited by the last global indices
    pub fn expanded(&self, width: usize, last_global_i: usize, last_global_j: usize) -> Self {
        IndexRange {
            first_i: self.first_i.saturating_sub(width),
            last_i: usize::min(self.last_i + width, last_global_i),
            first_j: self.first_j.saturating_sub(width),
            last_j: usize::min(self.last_j + width, last_global_j),
        }
    }

    /// Returns an iterator over all (i,j) pairs; i runs fastest
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> {
        let (fi, li, fj, lj) = (self.first_i, self.last_i, self.first_j, self.last_j);
        (fj..=lj).flat_map(move |j| (fi..=li).map(move |i| (i, j)))
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::IndexRange;

    #[test]
    fn new_and_len_work() {
        let r = IndexRange::new(2, 4, 1, 1);
        assert_eq!(r.len_i(), 3);
        assert_eq!(r.len_j(), 1);
        assert_eq!(r.len(), 3);
        assert!(r.contains(2, 1));
        assert!(r.contains(4, 1));
        assert!(!r.contains(5, 1));
        assert!(!r.contains(3, 0));
    }

    #[test]
    #[should_panic(expected = "index range must not be empty")]
    fn new_panics_on_empty() {
        IndexRange::new(3, 2, 0, 0);
    }

    #[test]
    fn expanded_is_clipped() {
        let r = IndexRange::new(0, 2, 3, 5);
        let e = r.expanded(1, 2, 9);
        assert_eq!(e, IndexRange::new(0, 2, 2, 6));
    }

    #[test]
    fn iter_runs_i_fastest() {
        let r = IndexRange::new(1, 2, 0, 1);
        let pairs: Vec<_> = r.iter().collect();
        assert_eq!(pairs, &[(1, 0), (2, 0), (1, 1), (2, 1)]);
    }
}
