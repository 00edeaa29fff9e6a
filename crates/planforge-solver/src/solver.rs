//! The MRP solver entry point.

use std::time::Instant;

use planforge_config::SolverConfig;
use planforge_core::{ClusterPlan, Model, PlanForgeError, Result};
use rayon::prelude::*;
use tracing::info;

use crate::command::CommandLog;
use crate::dispatch::{solve_cluster, worker_count, ClusterOutcome, ClusterQueue};
use crate::hooks::{NoHooks, SolverHooks};
use crate::statistics::SolveSummary;

/// Plans all demands of a model with the ask-reply heuristic.
///
/// # Example
///
/// ```
/// use planforge_config::SolverConfig;
/// use planforge_core::{Buffer, Date, Demand, Model, Network, Operation, TimePeriod};
/// use planforge_solver::MrpSolver;
///
/// let mut network = Network::new(Date::from_days(0), Date::from_days(60));
/// let raw = network.add_buffer(Buffer::infinite("raw"));
/// let make = network.add_operation(Operation::fixed_time("make", TimePeriod::days(1)));
/// network.add_flow(make, raw, -1.0).unwrap();
/// let order = network.add_demand(Demand::new("order", 5.0, Date::from_days(10)).with_delivery(make));
///
/// let mut model = Model::new(network);
/// let mut solver = MrpSolver::new(SolverConfig::default()).unwrap();
/// let summary = solver.run(&mut model).unwrap();
///
/// assert!(summary.is_clean());
/// assert_eq!(model.delivered(order), 5.0);
/// ```
#[derive(Debug)]
pub struct MrpSolver {
    config: SolverConfig,
    hooks: Box<dyn SolverHooks>,
    /// Uncommitted changes per cluster.
    pending: Vec<CommandLog>,
}

impl MrpSolver {
    /// Creates a solver after validating the configuration.
    pub fn new(config: SolverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            hooks: Box::new(NoHooks),
            pending: Vec::new(),
        })
    }

    pub fn with_hooks(mut self, hooks: impl SolverHooks + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Plans every demand of the model.
    ///
    /// Clusters are planned in parallel on up to the configured number of
    /// threads. A demand that fails is rolled back and reported in the
    /// summary; recursion overflow aborts the run with an error.
    pub fn run(&mut self, model: &mut Model) -> Result<SolveSummary> {
        let started = Instant::now();
        if cfg!(debug_assertions) {
            model.network().validate_clusters()?;
        }

        let queue = ClusterQueue::build(model.network());
        let (network, clusters) = model.split_mut();
        if self.pending.len() < clusters.len() {
            self.pending.resize_with(clusters.len(), CommandLog::new);
        }
        let threads = worker_count(&self.config, queue.cluster_count());
        let verbose = self.config.log_level >= 1;
        if verbose {
            info!(
                event = "solve_start",
                demands = network.demands().count(),
                clusters = queue.cluster_count(),
                threads,
            );
        }

        let config = &self.config;
        let hooks: &dyn SolverHooks = self.hooks.as_ref();
        let queue = &queue;
        let work = |(plan, log): (&mut ClusterPlan, &mut CommandLog)| {
            let demands = queue.demands(plan.cluster());
            if demands.is_empty() {
                return None;
            }
            Some(solve_cluster(network, plan, log, config, hooks, demands))
        };

        let outcomes: Vec<Result<ClusterOutcome>> = if threads <= 1 {
            clusters
                .iter_mut()
                .zip(self.pending.iter_mut())
                .filter_map(work)
                .collect()
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| PlanForgeError::Internal(format!("thread pool: {e}")))?;
            pool.install(|| {
                clusters
                    .par_iter_mut()
                    .zip(self.pending.par_iter_mut())
                    .filter_map(work)
                    .collect()
            })
        };

        let mut summary = SolveSummary {
            clusters: queue.cluster_count(),
            threads,
            ..SolveSummary::default()
        };
        for outcome in outcomes {
            let outcome = outcome?;
            summary.statistics.merge(&outcome.statistics);
            summary.failures.extend(outcome.failures);
        }
        summary.elapsed = started.elapsed();

        if verbose {
            let stats = &summary.statistics;
            info!(
                event = "solve_end",
                planned = stats.demands_planned,
                short = stats.demands_short,
                failed = stats.demands_failed,
                asks = stats.asks,
                cost = stats.cost,
                penalty = stats.penalty,
                duration_ms = summary.elapsed.as_millis() as u64,
            );
        }
        Ok(summary)
    }

    /// Makes all changes of previous runs permanent.
    pub fn commit(&mut self) {
        for log in &mut self.pending {
            log.commit();
        }
    }

    /// Reverts all uncommitted changes of previous runs.
    pub fn undo(&mut self, model: &mut Model) {
        let (_, clusters) = model.split_mut();
        for (plan, log) in clusters.iter_mut().zip(self.pending.iter_mut()) {
            log.undo_all(plan);
        }
    }

    /// Number of uncommitted changes.
    pub fn pending_changes(&self) -> usize {
        self.pending.iter().map(CommandLog::len).sum()
    }
}
