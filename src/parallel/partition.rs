use crate::grid::IndexRange;
use crate::StrError;

/// Implements a 2-D block decomposition of the areal element grid
///
/// Ranks are laid out in a `n_proc_x × n_proc_y` array; rank `r` sits at
/// `(r % n_proc_x, r / n_proc_x)`. Along each direction the elements are split
/// into contiguous blocks whose sizes differ by at most one (the first blocks
/// take the remainder).
///
/// ```text
///  j ↑  ┌───────┬───────┐
///    │  │   2   │   3   │
///    │  ├───────┼───────┤
///    │  │   0   │   1   │
///    │  └───────┴───────┘
///    └──────────────────→ i
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Partition {
    /// Number of elements along i
    pub n_elements_x: usize,

    /// Number of elements along j
    pub n_elements_y: usize,

    /// Number of ranks along i
    pub n_proc_x: usize,

    /// Number of ranks along j
    pub n_proc_y: usize,

    /// First element index of each block along i (plus the end index)
    starts_x: Vec<usize>,

    /// First element index of each block along j (plus the end index)
    starts_y: Vec<usize>,
}

impl Partition {
    /// Allocates a new partition choosing the rank layout automatically
    ///
    /// The layout minimises the difference between the block sizes along i and j.
    pub fn new(n_elements_x: usize, n_elements_y: usize, n_ranks: usize) -> Result<Self, StrError> {
        if n_ranks < 1 {
            return Err("the number of ranks must be ≥ 1");
        }
        let mut best: Option<(usize, usize, f64)> = None;
        for px in 1..=n_ranks {
            if n_ranks % px != 0 {
                continue;
            }
            let py = n_ranks / px;
            if px > n_elements_x || py > n_elements_y {
                continue;
            }
            let mismatch = f64::abs(n_elements_x as f64 / px as f64 - n_elements_y as f64 / py as f64);
            let better = match best {
                Some((_, _, m)) => mismatch < m,
                None => true,
            };
            if better {
                best = Some((px, py, mismatch));
            }
        }
        match best {
            Some((px, py, _)) => Partition::with_layout(n_elements_x, n_elements_y, px, py),
            None => Err("cannot decompose the element grid over the given number of ranks"),
        }
    }

    /// Allocates a new partition with a given rank layout
    pub fn with_layout(
        n_elements_x: usize,
        n_elements_y: usize,
        n_proc_x: usize,
        n_proc_y: usize,
    ) -> Result<Self, StrError> {
        if n_elements_x < 1 || n_elements_y < 1 {
            return Err("the element grid must have at least one element in each direction");
        }
        if n_proc_x < 1 || n_proc_y < 1 {
            return Err("the number of ranks in each direction must be ≥ 1");
        }
        if n_proc_x > n_elements_x || n_proc_y > n_elements_y {
            return Err("each rank must own at least one element in each direction");
        }
        Ok(Partition {
            n_elements_x,
            n_elements_y,
            n_proc_x,
            n_proc_y,
            starts_x: block_starts(n_elements_x, n_proc_x),
            starts_y: block_starts(n_elements_y, n_proc_y),
        })
    }

    /// Returns the number of ranks
    pub fn n_ranks(&self) -> usize {
        self.n_proc_x * self.n_proc_y
    }

    /// Returns the range of elements owned by a rank
    pub fn owned_range(&self, rank: usize) -> Result<IndexRange, StrError> {
        if rank >= self.n_ranks() {
            return Err("rank is out of range");
        }
        let (pi, pj) = (rank % self.n_proc_x, rank / self.n_proc_x);
        Ok(IndexRange::new(
            self.starts_x[pi],
            self.starts_x[pi + 1] - 1,
            self.starts_y[pj],
            self.starts_y[pj + 1] - 1,
        ))
    }
}

/// Splits `n` indices into `parts` contiguous blocks and returns the block starts plus the end
fn block_starts(n: usize, parts: usize) -> Vec<usize> {
    let base = n / parts;
    let rem = n % parts;
    let mut starts = Vec::with_capacity(parts + 1);
    let mut cursor = 0;
    starts.push(cursor);
    for p in 0..parts {
        cursor += base + usize::from(p < rem);
        starts.push(cursor);
    }
    starts
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
