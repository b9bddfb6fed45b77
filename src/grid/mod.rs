//! Implements the distributed grid primitives (areal element/node grids, map elements, volume grids)

mod element_grid;
mod grid_description;
mod index_range;
mod local_array;
mod map_element;
mod volume_grid;
pub use crate::grid::element_grid::*;
pub use crate::grid::grid_description::*;
pub use crate::grid::index_range::*;
pub use crate::grid::local_array::*;
pub use crate::grid::map_element::*;
pub use crate::grid::volume_grid::*;
