//! Implements the multi-component (Darcy) flow handler: parameters, subdomains and solve dispatch

mod darcy_error;
mod darcy_solver;
mod flow_handler;
mod mcf_parameters;
pub use crate::mcf::darcy_error::*;
pub use crate::mcf::darcy_solver::*;
pub use crate::mcf::flow_handler::*;
pub use crate::mcf::mcf_parameters::*;
