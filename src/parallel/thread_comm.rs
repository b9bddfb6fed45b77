use super::{Communicator, Payload};
use crate::StrError;
use std::sync::{Arc, Barrier, Mutex};
use std::thread;

/// Holds the exchange area shared by the ranks of a [ThreadComm] group
struct Exchange {
    barrier: Barrier,
    slots: Mutex<Vec<Option<Payload>>>,
}

/// Implements a communicator for ranks running as threads of the same process
///
/// Each rank owns one `ThreadComm` of the group created by [ThreadComm::group].
/// A gather stores the payload of the rank in its slot, waits until all ranks
/// have done so, copies all slots, and waits again so that no rank overwrites
/// its slot before every rank has read it.
pub struct ThreadComm {
    rank: usize,
    size: usize,
    exchange: Arc<Exchange>,
}

impl ThreadComm {
    /// Allocates the communicators of a group of `size` ranks
    pub fn group(size: usize) -> Vec<ThreadComm> {
        let exchange = Arc::new(Exchange {
            barrier: Barrier::new(size),
            slots: Mutex::new(vec![None; size]),
        });
        (0..size)
            .map(|rank| ThreadComm {
                rank,
                size,
                exchange: exchange.clone(),
            })
            .collect()
    }
}

impl Communicator for ThreadComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn all_gather_payload(&self, value: Payload) -> Result<Vec<Payload>, StrError> {
        {
            let mut slots = self.exchange.slots.lock().unwrap_or_else(|e| e.into_inner());
            slots[self.rank] = Some(value);
        }
        self.exchange.barrier.wait();
        let gathered: Vec<Payload> = {
            let slots = self.exchange.slots.lock().unwrap_or_else(|e| e.into_inner());
            slots.iter().flatten().cloned().collect()
        };
        self.exchange.barrier.wait();
        Ok(gathered)
    }
}

/// Runs `f` on `size` ranks, one thread per rank, and returns the results ordered by rank
///
/// **Note:** A panic in any rank is propagated after all threads have finished;
/// ranks blocked in a collective waiting for the panicking rank never finish,
/// thus the closures must not panic between collectives.
pub fn run_ranks<F, R>(size: usize, f: F) -> Vec<R>
where
    F: Fn(ThreadComm) -> R + Sync,
    R: Send,
{
    let comms = ThreadComm::group(size);
    thread::scope(|scope| {
        let f = &f;
        let handles: Vec<_> = comms.into_iter().map(|comm| scope.spawn(move || f(comm))).collect();
        handles
            .into_iter()
            .map(|h| match h.join() {
                Ok(r) => r,
                Err(e) => std::panic::resume_unwind(e),
            })
            .collect()
    })
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{run_ranks, ThreadComm};
    use crate::parallel::Communicator;

    #[test]
    fn group_works() {
        let group = ThreadComm::group(3);
        assert_eq!(group.len(), 3);
        assert_eq!(group[2].rank(), 2);
        assert_eq!(group[0].size(), 3);
    }

    #[test]
    fn all_gather_works() {
        let results = run_ranks(4, |comm| {
            let comm: &dyn Communicator = &comm;
            let first = comm.all_gather(&(comm.rank() * 10)).unwrap();
            let second = comm.all_gather(&format!("r{}", comm.rank())).unwrap();
            (first, second)
        });
        for (first, second) in results {
            assert_eq!(first, &[0, 10, 20, 30]);
            assert_eq!(second, &["r0", "r1", "r2", "r3"]);
        }
    }

    #[test]
    fn mismatched_types_are_detected() {
        let results = run_ranks(2, |comm| {
            let comm: &dyn Communicator = &comm;
            if comm.rank() == 0 {
                comm.all_gather(&1_usize).err()
            } else {
                comm.all_gather(&"one".to_string()).err()
            }
        });
        for r in results {
            assert_eq!(r, Some("collective operations were called in different order across ranks"));
        }
    }
}
