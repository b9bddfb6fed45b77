use crate::StrError;
use serde::{Deserialize, Serialize};

/// Describes a regular areal grid of nodes
///
/// ```text
///  y ↑
///    │  ●───●───●───●   n_nodes_y = 3
///    │  │   │   │   │
///    │  ●───●───●───●
///    │  │   │   │   │
///    │  ●───●───●───●   n_nodes_x = 4
///    └──────────────────→ x
///    (origin_x, origin_y)
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct GridDescription {
    /// Number of nodes along x (i)
    pub n_nodes_x: usize,

    /// Number of nodes along y (j)
    pub n_nodes_y: usize,

    /// x-coordinate of node (0,0)
    pub origin_x: f64,

    /// y-coordinate of node (0,0)
    pub origin_y: f64,

    /// Spacing of nodes along x
    pub delta_x: f64,

    /// Spacing of nodes along y
    pub delta_y: f64,
}

impl GridDescription {
    /// Allocates a new description with unit spacing at the origin
    pub fn new(n_nodes_x: usize, n_nodes_y: usize) -> Self {
        GridDescription {
            n_nodes_x,
            n_nodes_y,
            origin_x: 0.0,
            origin_y: 0.0,
            delta_x: 1.0,
            delta_y: 1.0,
        }
    }

    /// Returns the number of elements along x
    pub fn n_elements_x(&self) -> usize {
        self.n_nodes_x.saturating_sub(1)
    }

    /// Returns the number of elements along y
    pub fn n_elements_y(&self) -> usize {
        self.n_nodes_y.saturating_sub(1)
    }

    /// Returns the grid made of every `step_x`-th and `step_y`-th node
    pub fn subsampled(&self, step_x: usize, step_y: usize) -> Result<Self, StrError> {
        if step_x < 1 || step_y < 1 {
            return Err("sub-sampling steps must be ≥ 1");
        }
        Ok(GridDescription {
            n_nodes_x: self.n_nodes_x.saturating_sub(1) / step_x + 1,
            n_nodes_y: self.n_nodes_y.saturating_sub(1) / step_y + 1,
            origin_x: self.origin_x,
            origin_y: self.origin_y,
            delta_x: self.delta_x * step_x as f64,
            delta_y: self.delta_y * step_y as f64,
        })
    }

    /// Returns the coordinates of node (i,j)
    pub fn node_coordinates(&self, i: usize, j: usize) -> (f64, f64) {
        (
            self.origin_x + i as f64 * self.delta_x,
            self.origin_y + j as f64 * self.delta_y,
        )
    }

    /// Validates all data
    ///
    /// Returns a message with the inconsistent data, or returns None if everything is all right.
    pub fn validate(&self) -> Option<String> {
        if self.n_nodes_x < 2 || self.n_nodes_y < 2 {
            return Some(format!(
                "grid with {} x {} nodes is incorrect; it must have at least 2 x 2 nodes",
                self.n_nodes_x, self.n_nodes_y
            ));
        }
        if self.delta_x <= 0.0 || self.delta_y <= 0.0 {
            return Some(format!(
                "grid spacing ({:?}, {:?}) is incorrect; it must be positive",
                self.delta_x, self.delta_y
            ));
        }
        None
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::GridDescription;
    use crate::StrError;

    #[test]
    fn subsampled_works() -> Result<(), StrError> {
        let grid = GridDescription::new(9, 5);
        assert_eq!(grid.n_elements_x(), 8);
        assert_eq!(grid.n_elements_y(), 4);
        let low = grid.subsampled(2, 4)?;
        assert_eq!(low.n_nodes_x, 5);
        assert_eq!(low.n_nodes_y, 2);
        assert_eq!(low.delta_x, 2.0);
        assert_eq!(low.node_coordinates(1, 1), (2.0, 4.0));
        assert_eq!(grid.subsampled(0, 1).err(), Some("sub-sampling steps must be ≥ 1"));
        Ok(())
    }

    #[test]
    fn validate_works() {
        let mut grid = GridDescription::new(1, 5);
        assert_eq!(
            grid.validate(),
            Some("grid with 1 x 5 nodes is incorrect; it must have at least 2 x 2 nodes".to_string())
        );
        grid.n_nodes_x = 3;
        assert_eq!(grid.validate(), None);
        grid.delta_y = 0.0;
        assert_eq!(
            grid.validate(),
            Some("grid spacing (1.0, 0.0) is incorrect; it must be positive".to_string())
        );
    }
}
