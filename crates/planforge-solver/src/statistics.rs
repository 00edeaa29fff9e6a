//! Run statistics and the summary returned by a solve.

use std::time::Duration;

use planforge_core::{ClusterId, DemandId};

/// Counters collected while planning one or more clusters.
///
/// # Example
///
/// ```
/// use planforge_solver::RunStatistics;
///
/// let mut total = RunStatistics::default();
/// let cluster = RunStatistics { demands_planned: 2, asks: 10, max_depth: 4, ..Default::default() };
/// total.merge(&cluster);
/// total.merge(&RunStatistics { max_depth: 3, ..Default::default() });
///
/// assert_eq!(total.demands_planned, 2);
/// assert_eq!(total.max_depth, 4);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStatistics {
    /// Demands planned in full.
    pub demands_planned: u64,
    /// Demands planned partially or not at all.
    pub demands_short: u64,
    /// Demands whose planning raised an error.
    pub demands_failed: u64,
    /// Asks answered.
    pub asks: u64,
    /// Deepest state stack seen.
    pub max_depth: usize,
    /// Plans moved to another slot for capacity.
    pub relocations: u64,
    /// Purchases created on procurement buffers.
    pub purchases: u64,
    /// Direct cost of the accepted answers.
    pub cost: f64,
    /// Indirect cost of the accepted answers.
    pub penalty: f64,
}

impl RunStatistics {
    /// Adds the counters of another run.
    pub fn merge(&mut self, other: &RunStatistics) {
        self.demands_planned += other.demands_planned;
        self.demands_short += other.demands_short;
        self.demands_failed += other.demands_failed;
        self.asks += other.asks;
        self.max_depth = self.max_depth.max(other.max_depth);
        self.relocations += other.relocations;
        self.purchases += other.purchases;
        self.cost += other.cost;
        self.penalty += other.penalty;
    }
}

/// A demand whose planning failed and was rolled back.
#[derive(Debug, Clone, PartialEq)]
pub struct DemandFailure {
    pub demand: DemandId,
    pub name: String,
    pub cluster: ClusterId,
    pub message: String,
}

/// Result of [`MrpSolver::run`](crate::MrpSolver::run).
#[derive(Debug, Clone, Default)]
pub struct SolveSummary {
    pub statistics: RunStatistics,
    pub failures: Vec<DemandFailure>,
    /// Clusters that had demands to plan.
    pub clusters: usize,
    /// Worker threads used.
    pub threads: usize,
    pub elapsed: Duration,
}

impl SolveSummary {
    /// Returns true when no demand failed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
