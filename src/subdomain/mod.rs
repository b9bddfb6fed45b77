//! Implements the Darcy subdomains: stacks of formations numbered together in depth

mod dof_numbering;
mod formation_grid;
mod subdomain;
pub use crate::subdomain::dof_numbering::*;
pub use crate::subdomain::formation_grid::*;
pub use crate::subdomain::subdomain::*;
