//! Implements the simulator context: project data, calculation modes, mesh and run loop

mod calculation_mode;
mod mesh;
mod project;
mod run_loop;
mod sample_projects;
mod simulator;
pub use crate::simulator::calculation_mode::*;
pub use crate::simulator::mesh::*;
pub use crate::simulator::project::*;
pub use crate::simulator::run_loop::*;
pub use crate::simulator::sample_projects::*;
pub use crate::simulator::simulator::*;
