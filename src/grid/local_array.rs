use super::IndexRange;
use std::ops::{Index, IndexMut};

/// Holds per-rank 2-D data over the owned-plus-ghost range of a distributed grid
///
/// Entries are addressed by global (i,j) indices. Owned entries are written by
/// the owning rank only; ghost entries are refreshed by
/// [crate::parallel::Collective::ghost_exchange_2d].
#[derive(Clone, Debug, PartialEq)]
pub struct LocalArray2D<T> {
    /// Range owned by this rank
    owned: IndexRange,

    /// Owned range plus the ghost layer
    ghosted: IndexRange,

    /// Holds the values over the ghosted range (i runs fastest)
    data: Vec<T>,
}

impl<T: Clone> LocalArray2D<T> {
    /// Allocates a new array with all entries set to `value`
    pub fn new(owned: IndexRange, ghosted: IndexRange, value: T) -> Self {
        LocalArray2D {
            owned,
            ghosted,
            data: vec![value; ghosted.len()],
        }
    }

    /// Sets all entries (owned and ghost) to `value`
    pub fn fill(&mut self, value: T) {
        self.data.iter_mut().for_each(|x| *x = value.clone());
    }

    /// Returns a copy of the owned entries (i runs fastest)
    pub fn owned_values(&self) -> Vec<T> {
        self.owned.iter().map(|(i, j)| self[(i, j)].clone()).collect()
    }
}

impl<T> LocalArray2D<T> {
    /// Returns the range owned by this rank
    pub fn owned(&self) -> &IndexRange {
        &self.owned
    }

    /// Returns the owned range plus the ghost layer
    pub fn ghosted(&self) -> &IndexRange {
        &self.ghosted
    }

    /// Returns the entry at (i,j) or None if (i,j) is not in the ghosted range
    pub fn get(&self, i: usize, j: usize) -> Option<&T> {
        if self.ghosted.contains(i, j) {
            Some(&self.data[self.offset(i, j)])
        } else {
            None
        }
    }

    /// Returns the mutable entry at (i,j) or None if (i,j) is not in the ghosted range
    pub fn get_mut(&mut self, i: usize, j: usize) -> Option<&mut T> {
        if self.ghosted.contains(i, j) {
            let p = self.offset(i, j);
            Some(&mut self.data[p])
        } else {
            None
        }
    }

    /// Returns an iterator over the ghosted (i,j) pairs and entries
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &T)> {
        self.ghosted.iter().zip(self.data.iter())
    }

    #[inline]
    fn offset(&self, i: usize, j: usize) -> usize {
        (j - self.ghosted.first_j) * self.ghosted.len_i() + (i - self.ghosted.first_i)
    }
}

impl<T> Index<(usize, usize)> for LocalArray2D<T> {
    type Output = T;
    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        assert!(self.ghosted.contains(i, j), "(i,j) is outside the local array");
        &self.data[self.offset(i, j)]
    }
}

impl<T> IndexMut<(usize, usize)> for LocalArray2D<T> {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Self::Output {
        assert!(self.ghosted.contains(i, j), "(i,j) is outside the local array");
        let p = self.offset(i, j);
        &mut self.data[p]
    }
}

/// Holds per-rank 3-D data: a column of `len_k` entries for every ghosted (i,j)
///
/// The k index is local to the owner of the array (e.g., a formation) and is
/// never distributed.
#[derive(Clone, Debug, PartialEq)]
pub struct LocalArray3D<T> {
    /// Range owned by this rank
    owned: IndexRange,

    /// Owned range plus the ghost layer
    ghosted: IndexRange,

    /// Number of entries in each column
    len_k: usize,

    /// Holds the columns over the ghosted range (k runs fastest, then i, then j)
    data: Vec<T>,
}

impl<T: Clone> LocalArray3D<T> {
    /// Allocates a new array with all entries set to `value`
    pub fn new(owned: IndexRange, ghosted: IndexRange, len_k: usize, value: T) -> Self {
        LocalArray3D {
            owned,
            ghosted,
            len_k,
            data: vec![value; ghosted.len() * len_k],
        }
    }

    /// Changes the length of the columns
    ///
    /// Returns false (and keeps all values) if the length is unchanged;
    /// otherwise, all entries are reset to `value` and true is returned.
    pub fn resize_k(&mut self, len_k: usize, value: T) -> bool {
        if len_k == self.len_k {
            return false;
        }
        self.len_k = len_k;
        self.data = vec![value; self.ghosted.len() * len_k];
        true
    }

    /// Sets all entries (owned and ghost) to `value`
    pub fn fill(&mut self, value: T) {
        self.data.iter_mut().for_each(|x| *x = value.clone());
    }

    /// Returns a copy of the owned columns (k fastest, then i, then j)
    pub fn owned_values(&self) -> Vec<T> {
        let mut values = Vec::with_capacity(self.owned.len() * self.len_k);
        for (i, j) in self.owned.iter() {
            values.extend_from_slice(self.column(i, j));
        }
        values
    }
}

impl<T> LocalArray3D<T> {
    /// Returns the range owned by this rank
    pub fn owned(&self) -> &IndexRange {
        &self.owned
    }

    /// Returns the owned range plus the ghost layer
    pub fn ghosted(&self) -> &IndexRange {
        &self.ghosted
    }

    /// Returns the number of entries in each column
    pub fn len_k(&self) -> usize {
        self.len_k
    }

    /// Returns the entry at (i,j,k) or None if out of range
    pub fn get(&self, i: usize, j: usize, k: usize) -> Option<&T> {
        if self.ghosted.contains(i, j) && k < self.len_k {
            Some(&self.data[self.offset(i, j) + k])
        } else {
            None
        }
    }

    /// Returns the mutable entry at (i,j,k) or None if out of range
    pub fn get_mut(&mut self, i: usize, j: usize, k: usize) -> Option<&mut T> {
        if self.ghosted.contains(i, j) && k < self.len_k {
            let p = self.offset(i, j) + k;
            Some(&mut self.data[p])
        } else {
            None
        }
    }

    /// Returns the column at (i,j)
    pub fn column(&self, i: usize, j: usize) -> &[T] {
        assert!(self.ghosted.contains(i, j), "(i,j) is outside the local array");
        let start = self.offset(i, j);
        &self.data[start..start + self.len_k]
    }

    /// Returns the mutable column at (i,j)
    pub fn column_mut(&mut self, i: usize, j: usize) -> &mut [T] {
        assert!(self.ghosted.contains(i, j), "(i,j) is outside the local array");
        let start = self.offset(i, j);
        let len_k = self.len_k;
        &mut self.data[start..start + len_k]
    }

    #[inline]
    fn offset(&self, i: usize, j: usize) -> usize {
        ((j - self.ghosted.first_j) * self.ghosted.len_i() + (i - self.ghosted.first_i)) * self.len_k
    }
}

impl<T> Index<(usize, usize, usize)> for LocalArray3D<T> {
    type Output = T;
    fn index(&self, (i, j, k): (usize, usize, usize)) -> &Self::Output {
        assert!(
            self.ghosted.contains(i, j) && k < self.len_k,
            "(i,j,k) is outside the local array"
        );
        &self.data[self.offset(i, j) + k]
    }
}

impl<T> IndexMut<(usize, usize, usize)> for LocalArray3D<T> {
    fn index_mut(&mut self, (i, j, k): (usize, usize, usize)) -> &mut Self::Output {
        assert!(
            self.ghosted.contains(i, j) && k < self.len_k,
            "(i,j,k) is outside the local array"
        );
        let p = self.offset(i, j) + k;
        &mut self.data[p]
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{LocalArray2D, LocalArray3D};
    use crate::grid::IndexRange;

    #[test]
    fn local_array_2d_works() {
        let owned = IndexRange::new(2, 3, 0, 1);
        let ghosted = IndexRange::new(1, 4, 0, 2);
        let mut a = LocalArray2D::new(owned, ghosted, 0);
        a[(1, 0)] = 10;
        a[(3, 1)] = 31;
        *a.get_mut(4, 2).unwrap() = 42;
        assert_eq!(a.get(3, 1), Some(&31));
        assert_eq!(a.get(0, 0), None);
        assert_eq!(a.get(2, 3), None);
        assert_eq!(a.owned_values(), &[0, 0, 0, 31]);
        let total: i32 = a.iter().map(|(_, v)| *v).sum();
        assert_eq!(total, 10 + 31 + 42);
        a.fill(1);
        assert_eq!(a[(4, 2)], 1);
    }

    #[test]
    #[should_panic(expected = "(i,j) is outside the local array")]
    fn local_array_2d_panics_outside() {
        let r = IndexRange::new(0, 1, 0, 1);
        let a = LocalArray2D::new(r, r, 0.0);
        let _ = a[(2, 0)];
    }

    #[test]
    fn local_array_3d_works() {
        let owned = IndexRange::new(0, 0, 0, 0);
        let ghosted = IndexRange::new(0, 1, 0, 0);
        let mut a = LocalArray3D::new(owned, ghosted, 3, 0usize);
        a[(0, 0, 2)] = 2;
        a.column_mut(1, 0).copy_from_slice(&[7, 8, 9]);
        assert_eq!(a.column(0, 0), &[0, 0, 2]);
        assert_eq!(a.get(1, 0, 1), Some(&8));
        assert_eq!(a.get(1, 0, 3), None);
        assert_eq!(a.owned_values(), &[0, 0, 2]);
        assert!(!a.resize_k(3, 5));
        assert_eq!(a[(1, 0, 2)], 9);
        assert!(a.resize_k(2, 5));
        assert_eq!(a.len_k(), 2);
        assert_eq!(a.column(1, 0), &[5, 5]);
    }
}
