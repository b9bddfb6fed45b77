use super::{Communicator, Payload};
use crate::StrError;
use mpi::datatype::PartitionMut;
use mpi::environment::Universe;
use mpi::topology::SimpleCommunicator;
use mpi::traits::{Communicator as MpiCommunicator, CommunicatorCollectives};
use mpi::Count;

/// Implements a communicator over the processes of an MPI run
///
/// A gather first exchanges the payload lengths, then the payload bytes with
/// a variable-count all-gather.
pub struct MpiComm {
    world: SimpleCommunicator,
}

impl MpiComm {
    /// Allocates the communicator of all processes of the run
    pub fn world(universe: &Universe) -> Self {
        MpiComm {
            world: universe.world(),
        }
    }
}

impl Communicator for MpiComm {
    fn rank(&self) -> usize {
        self.world.rank() as usize
    }

    fn size(&self) -> usize {
        self.world.size() as usize
    }

    fn all_gather_payload(&self, value: Payload) -> Result<Vec<Payload>, StrError> {
        let length = Count::try_from(value.len()).map_err(|_| "collective payload is too large")?;
        let mut counts: Vec<Count> = vec![0; self.size()];
        self.world.all_gather_into(&length, &mut counts[..]);
        let mut displs: Vec<Count> = Vec::with_capacity(counts.len());
        let mut total: Count = 0;
        for count in &counts {
            displs.push(total);
            total = total.checked_add(*count).ok_or("collective payload is too large")?;
        }
        let mut buffer = vec![0u8; total as usize];
        {
            let mut partition = PartitionMut::new(&mut buffer[..], &counts[..], &displs[..]);
            self.world.all_gather_varcount_into(&value[..], &mut partition);
        }
        let gathered = counts
            .iter()
            .zip(&displs)
            .map(|(count, start)| {
                let start = *start as usize;
                buffer[start..start + *count as usize].to_vec()
            })
            .collect();
        Ok(gathered)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
