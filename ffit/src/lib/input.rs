use crate::utils::*;

/// Which of the two lists an entry came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Field {
    Partitions,
    Jobs,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Partitions   => { f.write_str("partition") },
            Field::Jobs         => { f.write_str("job") },
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Appears while turning user text into a [`Request`]. Positions are
/// 1-based, counted in comma-separated entries.
pub enum InputError {
    #[error("{field} size #{position} (`{token}`) is not an integer")]
    InvalidFormat {
        field:      Field,
        position:   usize,
        token:      String,
    },
    #[error("{field} size #{position} is {value}, but sizes must be positive")]
    NonPositiveValue {
        field:      Field,
        position:   usize,
        value:      i128,
    },
}

impl InputError {
    /// The single message a user sees, whatever went wrong.
    pub const HINT: &'static str = "Please enter valid positive integers separated by commas.";

    pub fn field(&self) -> Field {
        match self {
            InputError::InvalidFormat { field, .. }     => { *field },
            InputError::NonPositiveValue { field, .. }  => { *field },
        }
    }
}

/// Parses one comma-separated list of sizes.
///
/// Entries are trimmed, so `"100, 500"` is fine. An empty entry (which
/// also covers empty input and trailing commas) is malformed. Integers
/// too big for [`MemUnits`] are malformed as well, whereas zero and
/// negative ones are rejected as non-positive.
pub fn parse_sizes(raw: &str, field: Field) -> Result<Vec<MemUnits>, InputError> {
    raw.split(',')
        .enumerate()
        .map(|(idx, token)| {
            let token = token.trim();
            let position = idx + 1;
            let malformed = || InputError::InvalidFormat {
                field,
                position,
                token: token.to_string(),
            };
            let value: i128 = token.parse().map_err(|_| malformed())?;
            if value <= 0 {
                return Err(InputError::NonPositiveValue { field, position, value });
            }

            MemUnits::try_from(value).map_err(|_| malformed())
        })
        .collect()
}

impl Request {
    /// The gatekeeper to the rest of the library. Validates partitions
    /// first, then jobs, and reports the first offending entry.
    pub fn parse(partitions: &str, jobs: &str) -> Result<Self, InputError> {
        let partitions = parse_sizes(partitions, Field::Partitions)?;
        let jobs = parse_sizes(jobs, Field::Jobs)?;

        Ok(Self { partitions, jobs })
    }

    /// Same checks as [`Request::parse`] for callers that already hold
    /// integers. Only zero can be wrong here.
    pub fn new(partitions: Vec<MemUnits>, jobs: Vec<MemUnits>) -> Result<Self, InputError> {
        for (field, list) in [(Field::Partitions, &partitions), (Field::Jobs, &jobs)] {
            if let Some(idx) = list.iter().position(|&s| s == 0) {
                return Err(InputError::NonPositiveValue {
                    field,
                    position: idx + 1,
                    value: 0,
                });
            }
        }

        Ok(Self { partitions, jobs })
    }

    pub fn partitions(&self) -> &[MemUnits] {
        &self.partitions
    }

    pub fn jobs(&self) -> &[MemUnits] {
        &self.jobs
    }

    /// Runs first-fit on this request.
    pub fn allocate(&self, strategy: Strategy) -> Outcome {
        allocate(&self.partitions, &self.jobs, strategy)
    }
}
