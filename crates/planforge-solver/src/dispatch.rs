//! Cluster dispatch.
//!
//! Demands are grouped by cluster and every cluster is planned by exactly
//! one worker. Clusters share no node, so workers run without locks: each
//! one owns its cluster's plan state and command log for the whole run and
//! only reads the shared network.

use std::collections::BTreeMap;

use planforge_config::SolverConfig;
use planforge_core::{ClusterId, ClusterPlan, DemandId, Network, Result, ROUNDING_ERROR};
use tracing::{info, warn};

use crate::command::CommandLog;
use crate::hooks::SolverHooks;
use crate::ordering::sort_demands;
use crate::scope::ClusterScope;
use crate::solve::solve_demand;
use crate::statistics::{DemandFailure, RunStatistics};

/// Demands of every cluster in planning sequence.
///
/// # Example
///
/// ```
/// use planforge_core::{ClusterId, Date, Demand, Network};
/// use planforge_solver::ClusterQueue;
///
/// let mut network = Network::new(Date::from_days(0), Date::from_days(30));
/// let late = network.add_demand(Demand::new("late", 1.0, Date::from_days(9)));
/// let early = network.add_demand(Demand::new("early", 1.0, Date::from_days(2)));
///
/// let queue = ClusterQueue::build(&network);
/// assert_eq!(queue.cluster_count(), 1);
/// assert_eq!(queue.demands(ClusterId(0)), &[early, late]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClusterQueue {
    queues: BTreeMap<ClusterId, Vec<DemandId>>,
}

impl ClusterQueue {
    pub fn build(network: &Network) -> Self {
        let mut queues: BTreeMap<ClusterId, Vec<DemandId>> = BTreeMap::new();
        for (id, demand) in network.demands() {
            queues.entry(demand.cluster).or_default().push(id);
        }
        for demands in queues.values_mut() {
            sort_demands(network, demands);
        }
        Self { queues }
    }

    /// Number of clusters with at least one demand.
    pub fn cluster_count(&self) -> usize {
        self.queues.len()
    }

    pub fn demands(&self, cluster: ClusterId) -> &[DemandId] {
        self.queues.get(&cluster).map_or(&[], Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClusterId, &[DemandId])> {
        self.queues.iter().map(|(&c, d)| (c, d.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }
}

/// What a worker reports for its cluster.
#[derive(Debug, Default)]
pub(crate) struct ClusterOutcome {
    pub statistics: RunStatistics,
    pub failures: Vec<DemandFailure>,
}

/// Plans the demands of one cluster in sequence.
///
/// A demand that fails is rolled back and recorded; its cluster carries on
/// with the next demand. Fatal errors stop the cluster and are returned.
pub(crate) fn solve_cluster(
    network: &Network,
    plan: &mut ClusterPlan,
    log: &mut CommandLog,
    config: &SolverConfig,
    hooks: &dyn SolverHooks,
    demands: &[DemandId],
) -> Result<ClusterOutcome> {
    let cluster = plan.cluster();
    let mut scope = ClusterScope::new(network, plan, log, config, hooks);
    let mut failures = Vec::new();

    for &id in demands {
        let demand = network.demand(id);
        debug_assert_eq!(demand.cluster, cluster, "demand '{}' outside cluster", demand.name);

        let savepoint = scope.savepoint();
        match solve_demand(&mut scope, id) {
            Ok(planned) => {
                if planned >= demand.quantity - ROUNDING_ERROR {
                    scope.stats.demands_planned += 1;
                } else {
                    scope.stats.demands_short += 1;
                }
                if config.autocommit {
                    scope.log.commit();
                }
                if scope.logs_progress() {
                    info!(
                        event = "demand_planned",
                        demand = %demand.name,
                        cluster = cluster.0,
                        quantity = demand.quantity,
                        planned,
                    );
                }
            }
            Err(err) if err.is_fatal() => {
                scope.rollback_to(savepoint);
                return Err(err);
            }
            Err(err) => {
                scope.rollback_to(savepoint);
                scope.stats.demands_failed += 1;
                warn!(
                    event = "demand_failed",
                    demand = %demand.name,
                    cluster = cluster.0,
                    error = %err,
                );
                failures.push(DemandFailure {
                    demand: id,
                    name: demand.name.clone(),
                    cluster,
                    message: err.to_string(),
                });
            }
        }
        debug_assert_eq!(scope.stack().depth(), 0);
    }

    Ok(ClusterOutcome {
        statistics: scope.into_statistics(),
        failures,
    })
}

/// Number of workers for `clusters` clusters with demands.
pub(crate) fn worker_count(config: &SolverConfig, clusters: usize) -> usize {
    config.resolved_parallelism().min(clusters).max(1)
}
