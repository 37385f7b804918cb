use crate::utils::*;

/// The input form, minus the widgets: two raw text fields and the
/// result of the last successful run.
///
/// Nothing is validated until [`run`](Session::run). A failed run
/// leaves the fields untouched, so the user fixes one list and tries
/// again; [`reset`](Session::reset) wipes everything.
#[derive(Clone, Debug, Default)]
pub struct Session {
    partitions: String,
    jobs:       String,
    last:       Option<Report>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_partitions(&mut self, raw: &str) {
        self.partitions = raw.trim().to_string();
    }

    pub fn set_jobs(&mut self, raw: &str) {
        self.jobs = raw.trim().to_string();
    }

    pub fn partitions(&self) -> &str {
        &self.partitions
    }

    pub fn jobs(&self) -> &str {
        &self.jobs
    }

    pub fn last_report(&self) -> Option<&Report> {
        self.last.as_ref()
    }

    /// Validates both fields and, if they hold, runs first-fit on them.
    /// Every run starts from the typed capacities; nothing carries over
    /// from earlier runs.
    pub fn run(&mut self, strategy: Strategy) -> Result<&Report, InputError> {
        let req = match Request::parse(&self.partitions, &self.jobs) {
            Ok(r)   => { r },
            Err(e)  => {
                warn!("Rejected input: {}", e);
                self.last = None;
                return Err(e);
            }
        };
        let outcome = req.allocate(strategy);
        info!(
            "Run over {} partitions and {} jobs: {} allocated",
            req.partitions().len(),
            req.jobs().len(),
            outcome.allocated()
        );

        Ok(self.last.insert(Report::new(&req, &outcome, strategy)))
    }

    /// Clears both fields and the last report.
    pub fn reset(&mut self) {
        debug!("Session reset");
        self.partitions.clear();
        self.jobs.clear();
        self.last = None;
    }
}
