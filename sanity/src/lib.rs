pub use ffit::*;
pub use rayon::prelude::*;
use itertools::Itertools;
use log::debug;
use rand::{SeedableRng, rngs::StdRng};
use std::collections::HashMap;

/// Something an [`Outcome`] should never contain. Partition and job
/// numbers are 0-based here, matching the [`Outcome`] itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("{what}: expected length {expected}, found {found}")]
    LengthMismatch {
        what:       &'static str,
        expected:   usize,
        found:      usize,
    },
    #[error("partition {partition} reports original capacity {reported}, request said {requested}")]
    OriginalTampered {
        partition:  usize,
        requested:  MemUnits,
        reported:   MemUnits,
    },
    #[error("partition {partition} has {remaining} left out of {original}")]
    Overdrawn {
        partition:  usize,
        original:   MemUnits,
        remaining:  MemUnits,
    },
    #[error("partition {partition} is {found:?}, should be {expected:?}")]
    WrongStatus {
        partition:  usize,
        expected:   PartitionStatus,
        found:      PartitionStatus,
    },
    #[error("job {job} points at partition {partition}, which does not exist")]
    OutOfRange {
        job:        usize,
        partition:  usize,
    },
    #[error("partition {partition} lost {reduction} units but received jobs worth {assigned}")]
    Unbalanced {
        partition:  usize,
        reduction:  MemTotal,
        assigned:   MemTotal,
    },
    #[error("job {job} went to {chosen:?}, first fit is {first:?}")]
    NotFirstFit {
        job:        usize,
        chosen:     Option<usize>,
        first:      Option<usize>,
    },
    #[error("scan and indexed search disagree on job {job}: {scan:?} vs {indexed:?}")]
    Diverged {
        job:        usize,
        scan:       Option<usize>,
        indexed:    Option<usize>,
    },
    #[error("scenario `{scenario}`: {detail}")]
    Unexpected {
        scenario:   String,
        detail:     String,
    },
}

/// Verifies every property a first-fit [`Outcome`] must have w.r.t.
/// the [`Request`] it came from. Cheap checks run first; the full
/// replay of the policy runs last.
pub fn check_outcome(req: &Request, outcome: &Outcome) -> Result<(), Violation> {
    let (parts, jobs) = (req.partitions(), req.jobs());
    for (what, expected, found) in [
        ("allocation", jobs.len(), outcome.allocation.len()),
        ("original", parts.len(), outcome.original.len()),
        ("remaining", parts.len(), outcome.remaining.len()),
        ("status", parts.len(), outcome.status.len()),
    ] {
        if expected != found {
            return Err(Violation::LengthMismatch { what, expected, found });
        }
    }

    for (i, (&requested, (&original, &remaining))) in parts.iter()
        .zip(outcome.original.iter().zip(outcome.remaining.iter()))
        .enumerate() {
        if requested != original {
            return Err(Violation::OriginalTampered { partition: i, requested, reported: original });
        }
        if remaining > original {
            return Err(Violation::Overdrawn { partition: i, original, remaining });
        }
        // Spelled out instead of calling `PartitionStatus::derive`, so
        // that a bug there cannot hide itself.
        let expected = if remaining == original { PartitionStatus::Free }
            else if remaining == 0 { PartitionStatus::FullyUsed }
            else { PartitionStatus::PartiallyUsed };
        if outcome.status[i] != expected {
            return Err(Violation::WrongStatus { partition: i, expected, found: outcome.status[i] });
        }
    }

    // Wide sums: a tampered outcome may pile up more than a partition holds.
    let mut assigned: HashMap<usize, MemTotal> = HashMap::new();
    for (k, slot) in outcome.allocation.iter().enumerate() {
        if let Some(i) = *slot {
            if i >= parts.len() {
                return Err(Violation::OutOfRange { job: k, partition: i });
            }
            *assigned.entry(i).or_default() += jobs[k] as MemTotal;
        }
    }
    for i in 0..parts.len() {
        let reduction = (outcome.original[i] - outcome.remaining[i]) as MemTotal;
        let got = assigned.get(&i).copied().unwrap_or(0);
        if reduction != got {
            return Err(Violation::Unbalanced { partition: i, reduction, assigned: got });
        }
    }

    // Replay: each job must have landed on the lowest partition that
    // could hold it at that moment, or nowhere if none could.
    let mut room = parts.to_vec();
    for (k, &size) in jobs.iter().enumerate() {
        let first = room.iter().position(|&r| r >= size);
        if outcome.allocation[k] != first {
            return Err(Violation::NotFirstFit { job: k, chosen: outcome.allocation[k], first });
        }
        if let Some(i) = first {
            room[i] -= size;
        }
    }

    Ok(())
}

/// Runs both search strategies on `req` and checks that they agree,
/// and that the common answer passes [`check_outcome`].
pub fn cross_check(req: &Request) -> Result<Outcome, Violation> {
    let scan = req.allocate(Strategy::Scan);
    let indexed = req.allocate(Strategy::Indexed);
    if let Some(job) = scan.allocation
        .iter()
        .zip(indexed.allocation.iter())
        .position(|(a, b)| a != b) {
        return Err(Violation::Diverged {
            job,
            scan:       scan.allocation[job],
            indexed:    indexed.allocation[job],
        });
    }
    check_outcome(req, &scan)?;
    check_outcome(req, &indexed)?;

    Ok(scan)
}

//---START SCENARIO FILES

/// The two ways user input can be turned down.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectKind {
    InvalidFormat,
    NonPositiveValue,
}

impl From<&InputError> for RejectKind {
    fn from(e: &InputError) -> Self {
        match e {
            InputError::InvalidFormat { .. }    => { RejectKind::InvalidFormat },
            InputError::NonPositiveValue { .. } => { RejectKind::NonPositiveValue },
        }
    }
}

/// What a scenario's author expects to see.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    /// 1-based partition per job, `null` for "not allocated".
    Allocation(Vec<Option<usize>>),
    /// Post-run capacities, together with the allocation.
    Full {
        allocation: Vec<Option<usize>>,
        remaining:  Vec<MemUnits>,
    },
    /// Validation must fail, for this reason.
    Rejected(RejectKind),
}

/// A workload exactly as a user would have typed it, plus what should
/// come out of it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scenario {
    pub name:       String,
    pub partitions: String,
    pub jobs:       String,
    #[serde(default)]
    pub expect:     Option<Expectation>,
}

impl Scenario {
    pub fn request(&self) -> Result<Request, InputError> {
        Request::parse(&self.partitions, &self.jobs)
    }

    /// Validates, allocates with `strategy`, checks all invariants and
    /// finally compares against [`expect`](Scenario::expect).
    pub fn run(&self, strategy: Strategy) -> Result<Option<Outcome>, Violation> {
        let unexpected = |detail: String| Violation::Unexpected {
            scenario: self.name.clone(),
            detail,
        };
        let req = match (self.request(), &self.expect) {
            (Ok(_), Some(Expectation::Rejected(kind)))  => {
                return Err(unexpected(format!("accepted, expected {:?}", kind)));
            },
            (Ok(r), _)                                  => { r },
            (Err(e), Some(Expectation::Rejected(kind))) => {
                let got = RejectKind::from(&e);
                if got != *kind {
                    return Err(unexpected(format!("rejected as {:?}, expected {:?}", got, kind)));
                }
                return Ok(None);
            },
            (Err(e), _)                                 => {
                return Err(unexpected(format!("rejected: {}", e)));
            },
        };

        let outcome = req.allocate(strategy);
        check_outcome(&req, &outcome)?;
        let shown: Vec<Option<usize>> = outcome.allocation
            .iter()
            .map(|slot| slot.map(|i| i + 1))
            .collect();
        match &self.expect {
            Some(Expectation::Allocation(want)) if *want != shown   => {
                return Err(unexpected(format!("allocation {:?}, expected {:?}", shown, want)));
            },
            Some(Expectation::Full { allocation, remaining }) => {
                if *allocation != shown {
                    return Err(unexpected(format!("allocation {:?}, expected {:?}", shown, allocation)));
                }
                if *remaining != outcome.remaining {
                    return Err(unexpected(format!("remaining {:?}, expected {:?}", outcome.remaining, remaining)));
                }
            },
            _   => {}
        }

        Ok(Some(outcome))
    }
}

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("cannot read scenario file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed scenario file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reads a JSON array of [`Scenario`]s.
pub struct JsonScenarioParser {
    pub path: PathBuf,
}

impl JsonScenarioParser {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
        }
    }

    pub fn read_scenarios(&self) -> Result<Vec<Scenario>, ScenarioError> {
        let fd = std::fs::File::open(self.path.as_path())?;

        Ok(serde_json::from_reader(BufReader::new(fd))?)
    }
}

impl RequestGen for JsonScenarioParser {
    fn read_requests(&self) -> Result<Vec<Result<Request, InputError>>, Box<dyn std::error::Error>> {
        Ok(self.read_scenarios()?
            .iter()
            .map(Scenario::request)
            .collect())
    }
}

//---END SCENARIO FILES

/// Result of auditing many scenarios at once.
#[derive(Debug, Default)]
pub struct Tally {
    pub passed:     usize,
    pub failures:   Vec<Violation>,
}

/// Runs every scenario on the rayon pool. Runs share nothing, so the
/// order in which they finish does not matter; failures are reported
/// in file order.
pub fn audit_scenarios(scenarios: &[Scenario], strategy: Strategy) -> Tally {
    let results: Vec<Result<_, Violation>> = scenarios.par_iter()
        .map(|s| s.run(strategy))
        .collect();
    let (ok, failures): (Vec<_>, Vec<_>) = results.into_iter().partition_result();
    debug!("{} scenarios audited, {} failed", scenarios.len(), failures.len());

    Tally { passed: ok.len(), failures }
}

/// Draws `count` random workloads from `seed` and [`cross_check`]s each
/// one in parallel. Workload `i` is seeded with `seed + i`, so any
/// failure can be reproduced alone.
pub fn audit_random(count: usize, seed: u64, w: Workload) -> Tally {
    let results: Vec<Result<Outcome, Violation>> = (0..count)
        .into_par_iter()
        .map(|i| {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
            cross_check(&random_request(&mut rng, w))
        })
        .collect();
    let (ok, failures): (Vec<_>, Vec<_>) = results.into_iter().partition_result();

    Tally { passed: ok.len(), failures }
}
