use super::IndexRange;

/// Defines where the degrees of freedom of a volume grid live
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VolumeGridKind {
    /// One entry per hexahedral element
    Element,

    /// One entry per element corner node
    Nodal,
}

/// Describes a distributed 3-D array: the areal ranges of a rank, a depth and a dof count
///
/// The depth (k) direction is never distributed: every rank holds the full depth
/// of its areal columns.
#[derive(Clone, Debug, PartialEq)]
pub struct VolumeGrid {
    /// Element or nodal grid
    pub kind: VolumeGridKind,

    /// Number of values per grid point
    pub number_of_dofs: usize,

    /// Areal range owned by this rank
    pub owned: IndexRange,

    /// Areal range owned by this rank plus the ghost layer
    pub ghosted: IndexRange,

    /// Number of grid points in depth
    pub len_k: usize,
}

impl VolumeGrid {
    /// Returns the number of values stored by this rank (including ghosts)
    pub fn local_size(&self) -> usize {
        self.ghosted.len() * self.len_k * self.number_of_dofs
    }

    /// Returns the number of values owned by this rank
    pub fn owned_size(&self) -> usize {
        self.owned.len() * self.len_k * self.number_of_dofs
    }
}

/// Holds the volume grids of one kind sharing the same areal ranges and depth
///
/// Grids are created on demand for each dof count; resizing the depth resizes
/// all of them and is a no-op when the depth does not change.
#[derive(Clone, Debug, PartialEq)]
pub struct VolumeGridSet {
    /// Element or nodal grids
    kind: VolumeGridKind,

    /// Areal range owned by this rank
    owned: IndexRange,

    /// Areal range owned by this rank plus the ghost layer
    ghosted: IndexRange,

    /// Number of grid points in depth
    len_k: usize,

    /// Holds one grid per dof count
    grids: Vec<VolumeGrid>,

    /// Number of times the grids were reallocated
    reallocation_count: usize,
}

impl VolumeGridSet {
    /// Allocates an empty set
    pub fn new(kind: VolumeGridKind, owned: IndexRange, ghosted: IndexRange, len_k: usize) -> Self {
        VolumeGridSet {
            kind,
            owned,
            ghosted,
            len_k,
            grids: Vec::new(),
            reallocation_count: 0,
        }
    }

    /// Returns the number of grid points in depth
    pub fn len_k(&self) -> usize {
        self.len_k
    }

    /// Returns the number of times the grids were reallocated
    pub fn reallocation_count(&self) -> usize {
        self.reallocation_count
    }

    /// Returns the grid with the given dof count, if allocated
    pub fn get(&self, number_of_dofs: usize) -> Option<&VolumeGrid> {
        self.grids.iter().find(|g| g.number_of_dofs == number_of_dofs)
    }

    /// Returns the grid with the given dof count, allocating it if necessary
    pub fn allocate(&mut self, number_of_dofs: usize) -> &VolumeGrid {
        let pos = match self.grids.iter().position(|g| g.number_of_dofs == number_of_dofs) {
            Some(p) => p,
            None => {
                self.grids.push(VolumeGrid {
                    kind: self.kind,
                    number_of_dofs,
                    owned: self.owned,
                    ghosted: self.ghosted,
                    len_k: self.len_k,
                });
                self.grids.len() - 1
            }
        };
        &self.grids[pos]
    }

    /// Changes the depth of all grids
    ///
    /// Returns true if the grids were reallocated; nothing happens if the depth is unchanged.
    pub fn resize(&mut self, len_k: usize) -> bool {
        if len_k == self.len_k {
            return false;
        }
        self.len_k = len_k;
        for grid in &mut self.grids {
            grid.len_k = len_k;
        }
        self.reallocation_count += 1;
        true
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{VolumeGridKind, VolumeGridSet};
    use crate::grid::IndexRange;

    #[test]
    fn allocate_and_resize_work() {
        let owned = IndexRange::new(0, 1, 0, 1);
        let ghosted = IndexRange::new(0, 2, 0, 2);
        let mut set = VolumeGridSet::new(VolumeGridKind::Nodal, owned, ghosted, 4);
        assert_eq!(set.get(1), None);
        let grid = set.allocate(3);
        assert_eq!(grid.kind, VolumeGridKind::Nodal);
        assert_eq!(grid.local_size(), 9 * 4 * 3);
        assert_eq!(grid.owned_size(), 4 * 4 * 3);
        set.allocate(3);
        set.allocate(1);
        assert!(!set.resize(4));
        assert_eq!(set.reallocation_count(), 0);
        assert!(set.resize(6));
        assert!(!set.resize(6));
        assert_eq!(set.reallocation_count(), 1);
        assert_eq!(set.get(3).map(|g| g.len_k), Some(6));
        assert_eq!(set.get(1).map(|g| g.len_k), Some(6));
    }
}
