//! Welcome to `ffit`!
//!
//! A small laboratory for the *first-fit* policy of fixed-partition
//! memory management. The whole pipeline is plain data flowing through
//! pure functions:
//!
//! raw text --[`Request::parse`]--> [`Request`] --[`allocator::allocate`]-->
//! [`Outcome`] --[`Report::new`]--> [`Report`]

mod status;
pub mod allocator;
pub mod input;
pub mod report;
pub mod session;
pub mod utils;

/// Imports, type aliases, traits ... in general
/// useful stuff that shall be needed in many places.
pub use crate::utils::*;

/// A validated allocation problem: the fixed partition capacities and
/// the job sizes, both in arrival order.
///
/// The only ways to get hold of a [`Request`] are [`Request::parse`]
/// (from the raw comma-separated text a user typed) and [`Request::new`]
/// (from integers). Both reject non-positive sizes, so the allocator
/// never needs to look at its input twice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Request {
    partitions: Vec<MemUnits>,
    jobs:       Vec<MemUnits>,
}

/// What happened to each job and each partition during one run.
///
/// > ***ATTENTION:*** indices stored in [`allocation`](Outcome::allocation)
/// > are 0-based. Anything meant for human eyes (see [`Report`]) shifts
/// > them by one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Parallel to the job list. `None` means no partition could hold
    /// the job at the time it arrived.
    pub allocation: Vec<Option<usize>>,
    /// Capacities as they were before the run. Kept apart from
    /// [`remaining`](Outcome::remaining) so that the caller's input is
    /// never the working copy.
    pub original:   Vec<MemUnits>,
    pub remaining:  Vec<MemUnits>,
    pub status:     Vec<PartitionStatus>,
}

/// Classification of a partition after a run, derived from nothing
/// but its original and remaining capacity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartitionStatus {
    /// Untouched: remaining == original.
    Free,
    /// Some but not all capacity handed out.
    PartiallyUsed,
    /// Nothing left.
    FullyUsed,
}
