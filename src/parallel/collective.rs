use super::{Communicator, SerialComm};
use crate::grid::{IndexRange, LocalArray2D, LocalArray3D};
use crate::StrError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::Cell;

/// Implements the collective operations available to the simulator
///
/// Every operation is named and numbered. The name and sequence number travel
/// with the data, so a rank that issues a different operation (or skips one)
/// makes all ranks fail with an error instead of silently combining unrelated
/// values. The only operations are:
///
/// * `global_sum` -- sum of one count per rank
/// * `global_max` -- maximum of one count per rank
/// * `global_any` -- logical OR of one flag per rank
/// * `ghost_exchange_2d`/`ghost_exchange_3d` -- refresh of the ghost entries of a local array
///
/// **Important:** every rank must call the same operations in the same order,
/// so none of them may be called from a branch that depends on rank-local data.
pub struct Collective {
    /// Underlying message-passing substrate
    comm: Box<dyn Communicator>,

    /// Number of operations issued so far
    sequence: Cell<usize>,
}

impl Collective {
    /// Allocates a new instance
    pub fn new(comm: Box<dyn Communicator>) -> Self {
        Collective {
            comm,
            sequence: Cell::new(0),
        }
    }

    /// Allocates an instance for a single-rank run
    pub fn serial() -> Self {
        Collective::new(Box::new(SerialComm))
    }

    /// Returns the rank of this process
    pub fn rank(&self) -> usize {
        self.comm.rank()
    }

    /// Returns the number of ranks
    pub fn size(&self) -> usize {
        self.comm.size()
    }

    /// Returns the number of operations issued so far
    pub fn sequence(&self) -> usize {
        self.sequence.get()
    }

    /// Returns the sum over all ranks
    pub fn global_sum(&self, value: usize) -> Result<usize, StrError> {
        let all = self.gather("global_sum", value)?;
        Ok(all.iter().sum())
    }

    /// Returns the maximum over all ranks
    pub fn global_max(&self, value: usize) -> Result<usize, StrError> {
        let all = self.gather("global_max", value)?;
        Ok(all.iter().copied().max().unwrap_or(0))
    }

    /// Returns true if the flag is true on any rank
    pub fn global_any(&self, flag: bool) -> Result<bool, StrError> {
        let all = self.gather("global_any", flag)?;
        Ok(all.iter().any(|f| *f))
    }

    /// Refreshes the ghost entries of a 2-D array with the values of their owners
    ///
    /// The owned ranges of all ranks must tile the global grid.
    pub fn ghost_exchange_2d<T>(&self, array: &mut LocalArray2D<T>) -> Result<(), StrError>
    where
        T: Clone + Serialize + DeserializeOwned,
    {
        let block = (*array.owned(), array.owned_values());
        let blocks = self.gather("ghost_exchange_2d", block)?;
        let ghosted = *array.ghosted();
        let owned = *array.owned();
        for (i, j) in ghosted.iter() {
            if owned.contains(i, j) {
                continue;
            }
            let (range, values) = find_owner(&blocks, i, j)?;
            array[(i, j)] = values[offset_2d(range, i, j)].clone();
        }
        Ok(())
    }

    /// Refreshes the ghost columns of a 3-D array with the values of their owners
    ///
    /// The owned ranges of all ranks must tile the global grid and all ranks
    /// must have the same column length.
    pub fn ghost_exchange_3d<T>(&self, array: &mut LocalArray3D<T>) -> Result<(), StrError>
    where
        T: Clone + Serialize + DeserializeOwned,
    {
        let len_k = array.len_k();
        let block = (*array.owned(), array.owned_values());
        let lengths = self.gather("ghost_exchange_3d_len", len_k)?;
        let blocks = self.gather("ghost_exchange_3d", block)?;
        if lengths.iter().any(|n| *n != len_k) {
            return Err("ghost exchange requires the same column length on all ranks");
        }
        let ghosted = *array.ghosted();
        let owned = *array.owned();
        for (i, j) in ghosted.iter() {
            if owned.contains(i, j) {
                continue;
            }
            let (range, values) = find_owner(&blocks, i, j)?;
            let start = offset_2d(range, i, j) * len_k;
            array.column_mut(i, j).clone_from_slice(&values[start..start + len_k]);
        }
        Ok(())
    }

    /// Gathers a value from all ranks after checking that all ranks issued the same operation
    fn gather<T>(&self, operation: &'static str, value: T) -> Result<Vec<T>, StrError>
    where
        T: Serialize + DeserializeOwned,
    {
        let seq = self.sequence.get();
        self.sequence.set(seq + 1);
        let all: Vec<(String, usize, T)> = self.comm.all_gather(&(operation.to_string(), seq, value))?;
        if all.iter().any(|(op, s, _)| *op != operation || *s != seq) {
            log::error!("rank {} issued {} (#{}) out of order", self.rank(), operation, seq);
            return Err("collective operations were called in different order across ranks");
        }
        Ok(all.into_iter().map(|(_, _, v)| v).collect())
    }
}

/// Finds the block owning (i,j)
fn find_owner<T>(blocks: &[(IndexRange, Vec<T>)], i: usize, j: usize) -> Result<(&IndexRange, &[T]), StrError> {
    match blocks.iter().find(|(range, _)| range.contains(i, j)) {
        Some((range, values)) => Ok((range, values)),
        None => Err("ghost entry is not owned by any rank"),
    }
}

/// Returns the position of (i,j) in the owned values of a block (i runs fastest)
fn offset_2d(range: &IndexRange, i: usize, j: usize) -> usize {
    (j - range.first_j) * range.len_i() + (i - range.first_i)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::Collective;
    use crate::grid::{IndexRange, LocalArray2D, LocalArray3D};
    use crate::parallel::{run_ranks, Partition};
    use crate::StrError;

    #[test]
    fn serial_reductions_work() -> Result<(), StrError> {
        let coll = Collective::serial();
        assert_eq!(coll.rank(), 0);
        assert_eq!(coll.size(), 1);
        assert_eq!(coll.global_sum(3)?, 3);
        assert_eq!(coll.global_max(4)?, 4);
        assert_eq!(coll.global_any(false)?, false);
        assert_eq!(coll.sequence(), 3);
        Ok(())
    }

    #[test]
    fn reductions_work_on_four_ranks() {
        let results = run_ranks(4, |comm| {
            let coll = Collective::new(Box::new(comm));
            let r = coll.rank();
            let sum = coll.global_sum(r + 1).unwrap();
            let max = coll.global_max(10 * r).unwrap();
            let any = coll.global_any(r == 2).unwrap();
            (sum, max, any)
        });
        for r in results {
            assert_eq!(r, (10, 30, true));
        }
    }

    #[test]
    fn out_of_order_operations_are_detected() {
        let results = run_ranks(2, |comm| {
            let coll = Collective::new(Box::new(comm));
            if coll.rank() == 0 {
                coll.global_sum(1).err()
            } else {
                coll.global_max(1).err()
            }
        });
        for r in results {
            assert_eq!(r, Some("collective operations were called in different order across ranks"));
        }
    }

    #[test]
    fn ghost_exchange_2d_works() {
        let results = run_ranks(4, |comm| {
            let coll = Collective::new(Box::new(comm));
            let partition = Partition::with_layout(4, 4, 2, 2).unwrap();
            let owned = partition.owned_range(coll.rank()).unwrap();
            let ghosted = owned.expanded(1, 3, 3);
            let mut a = LocalArray2D::new(owned, ghosted, usize::MAX);
            for (i, j) in owned.iter() {
                a[(i, j)] = 100 * j + i;
            }
            coll.ghost_exchange_2d(&mut a).unwrap();
            a
        });
        for a in results {
            for ((i, j), v) in a.iter() {
                assert_eq!(*v, 100 * j + i);
            }
        }
    }

    #[test]
    fn ghost_exchange_3d_works() {
        let results = run_ranks(2, |comm| {
            let coll = Collective::new(Box::new(comm));
            let partition = Partition::with_layout(4, 1, 2, 1).unwrap();
            let owned = partition.owned_range(coll.rank()).unwrap();
            let ghosted = owned.expanded(1, 3, 0);
            let mut a = LocalArray3D::new(owned, ghosted, 2, 0.0);
            for (i, j) in owned.iter() {
                a.column_mut(i, j).copy_from_slice(&[i as f64, -(i as f64)]);
            }
            coll.ghost_exchange_3d(&mut a).unwrap();
            a
        });
        assert_eq!(results[0].column(2, 0), &[2.0, -2.0]);
        assert_eq!(results[1].column(1, 0), &[1.0, -1.0]);
    }

    #[test]
    fn ghost_exchange_3d_requires_same_length() {
        let results = run_ranks(2, |comm| {
            let coll = Collective::new(Box::new(comm));
            let owned = IndexRange::new(coll.rank(), coll.rank(), 0, 0);
            let ghosted = IndexRange::new(0, 1, 0, 0);
            let mut a = LocalArray3D::new(owned, ghosted, 1 + coll.rank(), 0);
            coll.ghost_exchange_3d(&mut a).err()
        });
        for r in results {
            assert_eq!(r, Some("ghost exchange requires the same column length on all ranks"));
        }
    }
}
