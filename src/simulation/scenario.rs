//! Workload mixes for the simulation driver

/// Ratio of balance reads to transfers in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scenario {
    /// Name used in logs and reports
    pub name: &'static str,
    /// Relative weight of balance reads
    pub read_share: u64,
    /// Relative weight of transfers
    pub write_share: u64,
}

impl Scenario {
    pub const READ_ONLY: Scenario = Scenario::new("read-only", 1, 0);
    pub const WRITE_ONLY: Scenario = Scenario::new("write-only", 0, 1);
    pub const MORE_READS: Scenario = Scenario::new("more-reads", 100, 1);
    pub const MORE_WRITES: Scenario = Scenario::new("more-writes", 1, 100);
    pub const BOTH_EQUALLY: Scenario = Scenario::new("both-equally", 1, 1);

    /// Every preset, in reporting order
    pub const ALL: [Scenario; 5] = [
        Scenario::READ_ONLY,
        Scenario::WRITE_ONLY,
        Scenario::MORE_READS,
        Scenario::MORE_WRITES,
        Scenario::BOTH_EQUALLY,
    ];

    /// # Panics
    ///
    /// Panics (at compile time for constants) if both shares are zero.
    pub const fn new(name: &'static str, read_share: u64, write_share: u64) -> Self {
        assert!(read_share + write_share > 0, "scenario needs a non-zero share");
        Scenario {
            name,
            read_share,
            write_share,
        }
    }

    /// Balance reads out of `tasks` operations
    pub fn number_of_reads(&self, tasks: u64) -> u64 {
        self.read_share * tasks / (self.read_share + self.write_share)
    }

    /// Transfers out of `tasks` operations
    pub fn number_of_writes(&self, tasks: u64) -> u64 {
        self.write_share * tasks / (self.read_share + self.write_share)
    }
}
