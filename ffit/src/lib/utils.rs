pub use std::{
    io::{BufRead, BufReader},
    path::PathBuf,
    time::Instant,
};
pub use thiserror::Error;
pub use itertools::Itertools;
pub use indexmap::IndexMap;
pub use serde::{Serialize, Deserialize};
pub use rand::{Rng, SeedableRng, rngs::StdRng};
pub use log::{debug, info, trace, warn};

pub use crate::{Request, Outcome, PartitionStatus,
    allocator::{allocate, first_fit, Strategy},
    input::{Field, InputError, parse_sizes},
    report::{Report, JobRow, PartitionRow, Summary},
    session::Session,
};

/// The unit of partition capacities and job sizes. `ffit` does not care
/// whether it stands for bytes, kilobytes or pages, as long as every
/// number in a [`Request`] is measured the same way.
pub type MemUnits = u64;

/// Sums of [`MemUnits`]. Every single size fits a [`MemUnits`], but a
/// few of them added together may not.
pub type MemTotal = u128;

/// Defines the interface for reading workloads.
///
/// One type reads the plain-text format below, another one (in the
/// `sanity` crate) reads JSON scenario files. The user can implement
/// their own types as needed.
pub trait RequestGen {
    /// Every scenario found, each either validated or carrying the
    /// reason it was rejected. A broken *source* (unreadable file)
    /// fails the whole call instead.
    fn read_requests(&self) -> Result<Vec<Result<Request, InputError>>, Box<dyn std::error::Error>>;
}

//---START EXTERNAL INTERFACES

/// Reads workloads from a text file. Non-empty lines come in pairs:
/// the partitions list first, the jobs list second. Lines starting
/// with `#` are comments.
///
/// ```text
/// # textbook example
/// 100, 500, 200, 300, 600
/// 212, 417, 112, 426
/// ```
pub struct PlainTextParser {
    pub path: PathBuf,
}

impl PlainTextParser {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
        }
    }

    /// Splits already-read text into scenarios. A dangling partitions
    /// line without a jobs line is validated against an empty jobs list,
    /// and thus reported as malformed.
    pub fn parse_text(text: &str) -> Vec<Result<Request, InputError>> {
        text.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .chunks(2)
            .into_iter()
            .map(|mut pair| {
                let partitions = pair.next().unwrap_or_default();
                let jobs = pair.next().unwrap_or_default();
                Request::parse(partitions, jobs)
            })
            .collect()
    }
}

impl RequestGen for PlainTextParser {
    fn read_requests(&self) -> Result<Vec<Result<Request, InputError>>, Box<dyn std::error::Error>> {
        let fd = std::fs::File::open(self.path.as_path())?;
        let mut text = String::new();
        for line in BufReader::new(fd).lines() {
            text.push_str(&line?);
            text.push('\n');
        }

        Ok(Self::parse_text(&text))
    }
}

//---END EXTERNAL INTERFACES

/// Knobs for [`random_request`].
#[derive(Clone, Copy, Debug)]
pub struct Workload {
    pub partitions: usize,
    pub jobs:       usize,
    /// Largest size drawn, for partitions and jobs alike. Must be >= 1.
    pub max_size:   MemUnits,
}

/// Draws a random (but always valid) [`Request`]. Sizes are uniform in
/// `1..=max_size`, so jobs regularly fail to fit and partitions
/// regularly fill up exactly when `max_size` is small.
pub fn random_request<R: Rng>(rng: &mut R, w: Workload) -> Request {
    let max_size = w.max_size.max(1);
    let mut draw = |n: usize| -> Vec<MemUnits> {
        (0..n).map(|_| rng.gen_range(1..=max_size)).collect()
    };
    let partitions = draw(w.partitions);
    let jobs = draw(w.jobs);

    // Drawn from a positive range, no need to validate.
    Request { partitions, jobs }
}
