//! Implements the distributed-memory substrate (communicators, decomposition, collectives)

mod collective;
mod communicator;
#[cfg(feature = "mpi")]
mod mpi_comm;
mod partition;
mod thread_comm;
pub use crate::parallel::collective::*;
pub use crate::parallel::communicator::*;
#[cfg(feature = "mpi")]
pub use crate::parallel::mpi_comm::*;
pub use crate::parallel::partition::*;
pub use crate::parallel::thread_comm::*;
