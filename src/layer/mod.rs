//! Implements the stratigraphic formations (thickness histories, element activity, field vectors)

mod formations;
mod layer_element;
mod layer_props;
mod property_vectors;
pub use crate::layer::formations::*;
pub use crate::layer::layer_element::*;
pub use crate::layer::layer_props::*;
pub use crate::layer::property_vectors::*;
