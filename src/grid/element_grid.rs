use super::{GridDescription, IndexRange};
use crate::parallel::Partition;
use crate::StrError;

/// Holds the per-rank view of the distributed areal element grid
///
/// The owned range is the block of elements assigned to this rank; the ghosted
/// range adds one layer of elements owned by the neighbouring ranks (clipped at
/// the global grid edges).
#[derive(Clone, Debug, PartialEq)]
pub struct ElementGrid {
    /// Description of the nodes of the grid
    pub description: GridDescription,

    /// Rank owning this view
    pub rank: usize,

    /// Range of elements owned by this rank
    owned: IndexRange,

    /// Owned range plus one layer of ghost elements
    ghosted: IndexRange,
}

impl ElementGrid {
    /// Allocates the view of the element grid for a rank
    pub fn new(description: &GridDescription, partition: &Partition, rank: usize) -> Result<Self, StrError> {
        if description.n_elements_x() != partition.n_elements_x
            || description.n_elements_y() != partition.n_elements_y
        {
            return Err("partition does not match the element grid");
        }
        let owned = partition.owned_range(rank)?;
        let ghosted = owned.expanded(1, description.n_elements_x() - 1, description.n_elements_y() - 1);
        Ok(ElementGrid {
            description: *description,
            rank,
            owned,
            ghosted,
        })
    }

    /// Returns the range of elements owned by this rank
    pub fn owned(&self) -> &IndexRange {
        &self.owned
    }

    /// Returns the owned range plus the ghost layer
    pub fn ghosted(&self) -> &IndexRange {
        &self.ghosted
    }

    /// Returns the first i index of the owned (or ghosted) range
    pub fn first_i(&self, include_ghosts: bool) -> usize {
        if include_ghosts {
            self.ghosted.first_i
        } else {
            self.owned.first_i
        }
    }

    /// Returns the last i index of the owned (or ghosted) range
    pub fn last_i(&self, include_ghosts: bool) -> usize {
        if include_ghosts {
            self.ghosted.last_i
        } else {
            self.owned.last_i
        }
    }

    /// Returns the first j index of the owned (or ghosted) range
    pub fn first_j(&self, include_ghosts: bool) -> usize {
        if include_ghosts {
            self.ghosted.first_j
        } else {
            self.owned.first_j
        }
    }

    /// Returns the last j index of the owned (or ghosted) range
    pub fn last_j(&self, include_ghosts: bool) -> usize {
        if include_ghosts {
            self.ghosted.last_j
        } else {
            self.owned.last_j
        }
    }

    /// Returns the number of elements along i in the whole grid
    pub fn n_elements_x(&self) -> usize {
        self.description.n_elements_x()
    }

    /// Returns the number of elements along j in the whole grid
    pub fn n_elements_y(&self) -> usize {
        self.description.n_elements_y()
    }

    /// Returns true if (i,j) is owned or is a ghost sharing an edge with the owned range
    ///
    /// Corner ghosts (outside the owned range in both directions) are not part of the stencil.
    pub fn is_part_of_stencil(&self, i: usize, j: usize) -> bool {
        if !self.ghosted.contains(i, j) {
            return false;
        }
        let outside_i = i < self.owned.first_i || i > self.owned.last_i;
        let outside_j = j < self.owned.first_j || j > self.owned.last_j;
        !(outside_i && outside_j)
    }
}

/// Holds the per-rank view of the distributed areal node grid
///
/// A rank owns the nodes at the lower-left corners of its owned elements; ranks
/// at the last column (row) of ranks also own the last column (row) of nodes.
/// The ghosted range adds one layer of nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct NodalGrid {
    /// Description of the nodes of the grid
    pub description: GridDescription,

    /// Range of nodes owned by this rank
    owned: IndexRange,

    /// Owned range plus one layer of ghost nodes
    ghosted: IndexRange,
}

impl NodalGrid {
    /// Allocates the node view matching an element view
    pub fn new(elements: &ElementGrid) -> Self {
        let d = elements.description;
        let e = elements.owned();
        let last_i = if e.last_i == d.n_elements_x() - 1 { e.last_i + 1 } else { e.last_i };
        let last_j = if e.last_j == d.n_elements_y() - 1 { e.last_j + 1 } else { e.last_j };
        let owned = IndexRange::new(e.first_i, last_i, e.first_j, last_j);
        let ghosted = owned.expanded(1, d.n_nodes_x - 1, d.n_nodes_y - 1);
        NodalGrid {
            description: d,
            owned,
            ghosted,
        }
    }

    /// Returns the range of nodes owned by this rank
    pub fn owned(&self) -> &IndexRange {
        &self.owned
    }

    /// Returns the owned range plus the ghost layer
    pub fn ghosted(&self) -> &IndexRange {
        &self.ghosted
    }

    /// Returns the number of nodes along i in the whole grid
    pub fn n_nodes_x(&self) -> usize {
        self.description.n_nodes_x
    }

    /// Returns the number of nodes along j in the whole grid
    pub fn n_nodes_y(&self) -> usize {
        self.description.n_nodes_y
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
