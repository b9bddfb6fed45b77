//! Makes available common structures needed to run a simulation
//!
//! You may write `use fastcauldron::prelude::*` in your code and obtain
//! access to commonly used functionality.

pub use crate::base::{Config, Diagnostics, Tag, DEFAULT_OUT_DIR, DEFAULT_TEST_DIR};
pub use crate::layer::{FormationId, Formations};
pub use crate::mcf::{DarcyError, DarcySolver, McfParameters, MultiComponentFlowHandler, SaturationConsistencySolver};
pub use crate::parallel::{run_ranks, Collective, Communicator, SerialComm, ThreadComm};
pub use crate::simulator::{run, CalculationMode, FastcauldronSimulator, ProjectData, RunSummary, SampleProjects};
pub use crate::subdomain::Subdomain;
