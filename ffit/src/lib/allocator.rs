use crate::utils::*;
use clap::ValueEnum;

/// How the allocator looks for the first partition with enough room.
/// Both ways make the exact same decisions; they differ only in how
/// much work it takes to reach them.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
pub enum Strategy {
    /// Walk the partitions from the first one, every time
    #[default]
    Scan,
    /// Descend a max-tree of remaining capacities
    Indexed,
}

/// Runs first-fit over `jobs`, in order, with `partitions` as the
/// initial capacities.
///
/// Each job goes to the *lowest-indexed* partition whose remaining
/// capacity can hold it, never to the tightest one. A job that fits
/// nowhere is left unallocated and the run simply moves on: that is
/// an outcome, not an error.
///
/// `partitions` is only read. The returned [`Outcome`] carries its own
/// copy of the pre-run capacities next to the post-run ones.
pub fn first_fit(partitions: &[MemUnits], jobs: &[MemUnits]) -> Outcome {
    allocate(partitions, jobs, Strategy::Scan)
}

/// Same as [`first_fit`], with a choice of [`Strategy`].
pub fn allocate(partitions: &[MemUnits], jobs: &[MemUnits], strategy: Strategy) -> Outcome {
    let original = partitions.to_vec();
    let (allocation, remaining) = match strategy {
        Strategy::Scan      => { scan(partitions, jobs) },
        Strategy::Indexed   => { indexed(partitions, jobs) },
    };
    let status = original.iter()
        .zip(remaining.iter())
        .map(|(o, r)| PartitionStatus::derive(*o, *r))
        .collect();
    debug!(
        "{:?} first-fit: {} of {} jobs placed in {} partitions",
        strategy,
        allocation.iter().flatten().count(),
        jobs.len(),
        partitions.len()
    );

    Outcome { allocation, original, remaining, status }
}

fn scan(partitions: &[MemUnits], jobs: &[MemUnits]) -> (Vec<Option<usize>>, Vec<MemUnits>) {
    let mut remaining = partitions.to_vec();
    let allocation = jobs.iter()
        .enumerate()
        .map(|(k, &size)| {
            let hit = remaining.iter().position(|&room| room >= size);
            match hit {
                Some(i) => {
                    remaining[i] -= size;
                    trace!("job {} ({}) -> partition {} (left: {})", k, size, i, remaining[i]);
                },
                None    => {
                    trace!("job {} ({}) does not fit anywhere", k, size);
                }
            }
            hit
        })
        .collect();

    (allocation, remaining)
}

fn indexed(partitions: &[MemUnits], jobs: &[MemUnits]) -> (Vec<Option<usize>>, Vec<MemUnits>) {
    let mut tree = MaxTree::new(partitions);
    let allocation = jobs.iter()
        .enumerate()
        .map(|(k, &size)| {
            let hit = tree.leftmost_fitting(size);
            match hit {
                Some(i) => {
                    tree.take(i, size);
                    trace!("job {} ({}) -> partition {} (left: {})", k, size, i, tree.get(i));
                },
                None    => {
                    trace!("job {} ({}) does not fit anywhere", k, size);
                }
            }
            hit
        })
        .collect();

    (allocation, tree.into_remaining())
}

//---START MAX-TREE
/// A complete binary tree over the remaining capacities. Every inner
/// node holds the largest capacity found below it, so the leftmost
/// partition with at least `size` units left is one root-to-leaf
/// descent away. Padding leaves hold 0 and, sizes being positive,
/// are never picked.
struct MaxTree {
    // Number of leaves, a power of two. Leaf `i` lives at `leaves + i`.
    leaves: usize,
    len:    usize,
    nodes:  Vec<MemUnits>,
}

impl MaxTree {
    fn new(caps: &[MemUnits]) -> Self {
        let leaves = caps.len().next_power_of_two();
        let mut nodes = vec![0; 2 * leaves];
        nodes[leaves..leaves + caps.len()].copy_from_slice(caps);
        for i in (1..leaves).rev() {
            nodes[i] = nodes[2 * i].max(nodes[2 * i + 1]);
        }

        Self { leaves, len: caps.len(), nodes }
    }

    fn get(&self, idx: usize) -> MemUnits {
        self.nodes[self.leaves + idx]
    }

    fn leftmost_fitting(&self, size: MemUnits) -> Option<usize> {
        if self.len == 0 || self.nodes[1] < size { return None; }
        let mut i = 1;
        while i < self.leaves {
            // Left child first: that's what makes it *first* fit.
            i = if self.nodes[2 * i] >= size { 2 * i } else { 2 * i + 1 };
        }
        let idx = i - self.leaves;

        if idx < self.len { Some(idx) } else { None }
    }

    fn take(&mut self, idx: usize, size: MemUnits) {
        let mut i = self.leaves + idx;
        self.nodes[i] -= size;
        while i > 1 {
            i /= 2;
            self.nodes[i] = self.nodes[2 * i].max(self.nodes[2 * i + 1]);
        }
    }

    fn into_remaining(mut self) -> Vec<MemUnits> {
        self.nodes.drain(self.leaves..self.leaves + self.len).collect()
    }
}
//---END MAX-TREE
