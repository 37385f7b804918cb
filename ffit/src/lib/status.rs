use crate::utils::*;

impl PartitionStatus {
    /// Derives the status of a partition. `remaining` must not exceed
    /// `original`.
    pub fn derive(original: MemUnits, remaining: MemUnits) -> Self {
        debug_assert!(remaining <= original, "Partition grew during allocation.");
        if remaining == original { PartitionStatus::Free }
        else if remaining == 0 { PartitionStatus::FullyUsed }
        else { PartitionStatus::PartiallyUsed }
    }

    /// The label shown in reports.
    pub fn label(&self) -> &'static str {
        match self {
            PartitionStatus::Free           => { "Free" },
            PartitionStatus::PartiallyUsed  => { "Partially Used" },
            PartitionStatus::FullyUsed      => { "Fully Used" },
        }
    }
}

impl std::fmt::Display for PartitionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Outcome {
    /// Number of jobs that found a partition.
    pub fn allocated(&self) -> usize {
        self.allocation
            .iter()
            .filter(|a| a.is_some())
            .count()
    }

    /// Capacity handed out across all partitions.
    pub fn used(&self) -> MemTotal {
        self.original
            .iter()
            .zip(self.remaining.iter())
            .map(|(o, r)| (o - r) as MemTotal)
            .sum()
    }

    /// 0-based indices of the jobs that were placed in partition `idx`,
    /// in arrival order.
    pub fn jobs_in(&self, idx: usize) -> Vec<usize> {
        self.allocation
            .iter()
            .positions(|a| *a == Some(idx))
            .collect()
    }
}
