use crate::grid::{IndexRange, LocalArray3D};

/// Maps every node of a subdomain to the node holding its degree of freedom
///
/// A node whose segment above is degenerate (no material) does not carry a dof
/// of its own: it is collapsed onto the representative of the node above.
///
/// ```text
///  node k   representative
///    0  ●──→ 2     above the frontier (not deposited yet)
///    1  ●──→ 2
///    2  ●──→ 2     frontier (first active node)
///    3  ●──→ 3
///    4  ●──→ 3     segment 3 is degenerate
///    5  ●──→ 3     segment 4 is degenerate
///    6  ●──→ 6
/// ```
///
/// The run length of node k is `k - representative(k)`; the stencil width of the
/// linear system is the largest run length over the whole domain.
#[derive(Clone, Debug, PartialEq)]
pub struct DofNumbering {
    /// Representative node of each (i,j,k) node
    representative: LocalArray3D<usize>,

    /// Nodes carrying a Dirichlet condition anchored at the frontier
    anchors: LocalArray3D<bool>,
}

impl DofNumbering {
    /// Allocates an identity numbering with `number_of_nodes` nodes per column
    pub fn new(owned: IndexRange, ghosted: IndexRange, number_of_nodes: usize) -> Self {
        let mut numbering = DofNumbering {
            representative: LocalArray3D::new(owned, ghosted, number_of_nodes, 0),
            anchors: LocalArray3D::new(owned, ghosted, number_of_nodes, false),
        };
        for (i, j) in ghosted.iter() {
            numbering.set_identity(i, j);
        }
        numbering
    }

    /// Returns the number of nodes per column
    pub fn number_of_nodes(&self) -> usize {
        self.representative.len_k()
    }

    /// Returns the representative of node (i,j,k)
    pub fn representative(&self, i: usize, j: usize, k: usize) -> Option<usize> {
        self.representative.get(i, j, k).copied()
    }

    /// Returns the representatives of column (i,j)
    pub fn column(&self, i: usize, j: usize) -> &[usize] {
        self.representative.column(i, j)
    }

    /// Returns the number of collapsed segments between node (i,j,k) and its representative
    ///
    /// Nodes above the frontier map downwards onto it and have a zero run length.
    pub fn run_length(&self, i: usize, j: usize, k: usize) -> Option<usize> {
        self.representative(i, j, k).map(|r| k.saturating_sub(r))
    }

    /// Returns true if node (i,j,k) is collapsed onto another node
    pub fn is_collapsed(&self, i: usize, j: usize, k: usize) -> bool {
        self.run_length(i, j, k).map(|n| n > 0).unwrap_or(false)
    }

    /// Returns true if node (i,j,k) carries a Dirichlet condition anchored at the frontier
    pub fn is_dirichlet_anchor(&self, i: usize, j: usize, k: usize) -> bool {
        self.anchors.get(i, j, k).copied().unwrap_or(false)
    }

    /// Marks node (i,j,k) as a Dirichlet anchor
    pub fn set_dirichlet_anchor(&mut self, i: usize, j: usize, k: usize) {
        if let Some(a) = self.anchors.get_mut(i, j, k) {
            *a = true;
        }
    }

    /// Removes all Dirichlet anchors
    pub fn clear_dirichlet_anchors(&mut self) {
        self.anchors.fill(false);
    }

    /// Returns the number of Dirichlet anchors over the owned columns
    pub fn number_of_dirichlet_anchors(&self) -> usize {
        self.anchors
            .owned()
            .iter()
            .map(|(i, j)| self.anchors.column(i, j).iter().filter(|a| **a).count())
            .sum()
    }

    /// Maps every node of column (i,j) to itself
    pub fn set_identity(&mut self, i: usize, j: usize) {
        for (k, r) in self.representative.column_mut(i, j).iter_mut().enumerate() {
            *r = k;
        }
    }

    /// Numbers column (i,j) given the frontier and the presence of material in each segment
    ///
    /// Nodes above the frontier map to the frontier; walking down, node k maps to
    /// itself if `has_material(k - 1)` and to the representative of node k-1 otherwise.
    pub fn number_column<F>(&mut self, i: usize, j: usize, first_active_k: usize, has_material: F)
    where
        F: Fn(usize) -> bool,
    {
        let column = self.representative.column_mut(i, j);
        let n = column.len();
        let first = usize::min(first_active_k, n.saturating_sub(1));
        for k in 0..n {
            column[k] = if k <= first {
                first
            } else if has_material(k - 1) {
                k
            } else {
                column[k - 1]
            };
        }
    }

    /// Returns the largest run length over the owned columns (nodes at or below the frontier)
    pub fn maximum_owned_run_length(&self) -> usize {
        let owned = *self.representative.owned();
        owned
            .iter()
            .flat_map(|(i, j)| {
                self.representative
                    .column(i, j)
                    .iter()
                    .enumerate()
                    .filter(|(k, r)| *k >= **r)
                    .map(|(k, r)| k - r)
                    .collect::<Vec<_>>()
            })
            .max()
            .unwrap_or(0)
    }

    /// Changes the number of nodes per column (identity numbering); returns false if unchanged
    pub fn resize(&mut self, number_of_nodes: usize) -> bool {
        if !self.representative.resize_k(number_of_nodes, 0) {
            return false;
        }
        self.anchors.resize_k(number_of_nodes, false);
        let ghosted = *self.representative.ghosted();
        for (i, j) in ghosted.iter() {
            self.set_identity(i, j);
        }
        true
    }

    /// Returns the representatives for a ghost exchange
    pub(crate) fn representatives_mut(&mut self) -> &mut LocalArray3D<usize> {
        &mut self.representative
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::DofNumbering;
    use crate::grid::IndexRange;

    #[test]
    fn new_gives_identity() {
        let r = IndexRange::new(0, 1, 0, 0);
        let numbering = DofNumbering::new(r, r, 4);
        assert_eq!(numbering.number_of_nodes(), 4);
        assert_eq!(numbering.column(1, 0), &[0, 1, 2, 3]);
        assert_eq!(numbering.maximum_owned_run_length(), 0);
        assert_eq!(numbering.representative(0, 0, 4), None);
    }

    #[test]
    fn number_column_collapses_degenerate_segments() {
        let r = IndexRange::new(0, 0, 0, 0);
        let mut numbering = DofNumbering::new(r, r, 7);
        // segments 3 and 4 are degenerate
        numbering.number_column(0, 0, 2, |k| k != 3 && k != 4);
        assert_eq!(numbering.column(0, 0), &[2, 2, 2, 3, 3, 3, 6]);
        assert_eq!(numbering.run_length(0, 0, 5), Some(2));
        assert!(numbering.is_collapsed(0, 0, 4));
        assert!(!numbering.is_collapsed(0, 0, 6));
        assert_eq!(numbering.maximum_owned_run_length(), 2);
        // above the frontier
        assert_eq!(numbering.run_length(0, 0, 0), Some(0));
        assert_eq!(numbering.run_length(0, 0, 1), Some(0));
        assert!(!numbering.is_collapsed(0, 0, 0));
        assert!(!numbering.is_collapsed(0, 0, 2));
        // numbering twice gives the same result
        numbering.number_column(0, 0, 2, |k| k != 3 && k != 4);
        assert_eq!(numbering.column(0, 0), &[2, 2, 2, 3, 3, 3, 6]);
    }

    #[test]
    fn frontier_at_the_bottom_collapses_everything() {
        let r = IndexRange::new(0, 0, 0, 0);
        let mut numbering = DofNumbering::new(r, r, 4);
        numbering.number_column(0, 0, 3, |_| true);
        assert_eq!(numbering.column(0, 0), &[3, 3, 3, 3]);
        assert_eq!(numbering.maximum_owned_run_length(), 0);
        for k in 0..4 {
            assert_eq!(numbering.run_length(0, 0, k), Some(0));
            assert!(!numbering.is_collapsed(0, 0, k));
        }
    }

    #[test]
    fn frontier_above_an_empty_segment_counts_the_true_run() {
        let r = IndexRange::new(0, 1, 0, 0);
        let mut numbering = DofNumbering::new(r, r, 9);
        // frontier at 2 and segment 2 still empty
        numbering.number_column(0, 0, 2, |k| k != 2);
        numbering.number_column(1, 0, 2, |k| k != 2);
        assert_eq!(numbering.column(0, 0), &[2, 2, 2, 2, 4, 5, 6, 7, 8]);
        assert_eq!(numbering.run_length(0, 0, 3), Some(1));
        assert_eq!(numbering.maximum_owned_run_length(), 1);
    }

    #[test]
    fn anchors_and_resize_work() {
        let r = IndexRange::new(0, 0, 0, 0);
        let mut numbering = DofNumbering::new(r, r, 3);
        numbering.set_dirichlet_anchor(0, 0, 1);
        numbering.set_dirichlet_anchor(0, 0, 9);
        assert!(numbering.is_dirichlet_anchor(0, 0, 1));
        assert_eq!(numbering.number_of_dirichlet_anchors(), 1);
        numbering.clear_dirichlet_anchors();
        assert_eq!(numbering.number_of_dirichlet_anchors(), 0);
        assert!(!numbering.resize(3));
        assert!(numbering.resize(5));
        assert_eq!(numbering.column(0, 0), &[0, 1, 2, 3, 4]);
    }
}
