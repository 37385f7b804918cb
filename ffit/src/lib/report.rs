use crate::utils::*;

const UNALLOCATED: &str = "Not Allocated";

/// One line of the job table. Numbers are 1-based.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct JobRow {
    pub number:     usize,
    pub size:       MemUnits,
    /// `None` if the job did not fit anywhere.
    pub partition:  Option<usize>,
}

/// One line of the partition table. Numbers are 1-based.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PartitionRow {
    pub number:     usize,
    pub original:   MemUnits,
    pub remaining:  MemUnits,
    pub status:     PartitionStatus,
    /// Jobs this partition received, in arrival order.
    pub jobs:       Vec<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub jobs_total:         usize,
    pub jobs_allocated:     usize,
    pub capacity_total:     MemTotal,
    pub capacity_used:      MemTotal,
    /// Sum of the sizes of jobs left unallocated.
    pub unallocated_demand: MemTotal,
}

/// Everything a user gets to see after a run, already shifted to
/// 1-based numbering. Formatting is a pure function of a [`Request`]
/// and its [`Outcome`]; nothing here touches the allocator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Report {
    pub strategy:   Strategy,
    pub jobs:       Vec<JobRow>,
    pub partitions: Vec<PartitionRow>,
    pub summary:    Summary,
}

impl Report {
    /// `outcome` must come from allocating `req`.
    pub fn new(req: &Request, outcome: &Outcome, strategy: Strategy) -> Self {
        debug_assert_eq!(req.jobs().len(), outcome.allocation.len(), "Outcome of another request.");
        debug_assert_eq!(req.partitions().len(), outcome.original.len(), "Outcome of another request.");
        let mut holders: IndexMap<usize, Vec<usize>> = (0..outcome.original.len())
            .map(|i| (i, vec![]))
            .collect();
        let jobs: Vec<JobRow> = req.jobs()
            .iter()
            .zip(outcome.allocation.iter())
            .enumerate()
            .map(|(k, (&size, &slot))| {
                if let Some(i) = slot {
                    holders.entry(i).or_default().push(k + 1);
                }
                JobRow {
                    number:     k + 1,
                    size,
                    partition:  slot.map(|i| i + 1),
                }
            })
            .collect();
        let partitions: Vec<PartitionRow> = holders
            .into_iter()
            .map(|(i, held)| PartitionRow {
                number:     i + 1,
                original:   outcome.original[i],
                remaining:  outcome.remaining[i],
                status:     outcome.status[i],
                jobs:       held,
            })
            .collect();
        let summary = Summary {
            jobs_total:         jobs.len(),
            jobs_allocated:     outcome.allocated(),
            capacity_total:     outcome.original.iter().map(|&o| o as MemTotal).sum(),
            capacity_used:      outcome.used(),
            unallocated_demand: jobs.iter()
                .filter(|row| row.partition.is_none())
                .map(|row| row.size as MemTotal)
                .sum(),
        };

        Self { strategy, jobs, partitions, summary }
    }

    /// The classroom layout: a tab-separated job table, then one line
    /// per partition, then totals.
    pub fn render_text(&self) -> String {
        let mut out = String::from("Job No.\tJob Size\tPartition No.\n");
        for row in &self.jobs {
            let partition = match row.partition {
                Some(p) => { p.to_string() },
                None    => { UNALLOCATED.to_string() },
            };
            out.push_str(&format!("{}\t\t{}\t\t{}\n", row.number, row.size, partition));
        }

        out.push_str("\nPartition Status:\n");
        for row in &self.partitions {
            out.push_str(&format!(
                "Partition {}: Original={}, Remaining={}, Status={}\n",
                row.number, row.original, row.remaining, row.status
            ));
        }

        let s = &self.summary;
        out.push_str(&format!("\nJobs allocated: {}/{}\n", s.jobs_allocated, s.jobs_total));
        out.push_str(&format!("Capacity used: {}/{}\n", s.capacity_used, s.capacity_total));
        if s.unallocated_demand > 0 {
            let waiting = self.jobs
                .iter()
                .filter(|row| row.partition.is_none())
                .map(|row| row.number)
                .join(", ");
            out.push_str(&format!("Unallocated demand: {} (jobs {})\n", s.unallocated_demand, waiting));
        }

        out
    }

    pub fn render_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
