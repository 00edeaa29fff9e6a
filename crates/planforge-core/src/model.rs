//! The planning model: a static network plus one plan state per cluster.

use crate::error::{PlanForgeError, Result};
use crate::ids::{BufferId, ClusterId, DemandId, OperationId, PlanId};
use crate::network::{BufferKind, Network};
use crate::plan::ClusterPlan;
use crate::time::{Date, TimePeriod};

/// Per-demand summary of the current plan.
#[derive(Debug, Clone, PartialEq)]
pub struct DemandReport {
    pub demand: DemandId,
    pub name: String,
    pub quantity: f64,
    pub planned: f64,
    pub last_delivery: Option<Date>,
    /// Delay of the last delivery past the due date.
    pub lateness: TimePeriod,
}

/// Supply network together with its plan state.
#[derive(Debug, Clone)]
pub struct Model {
    network: Network,
    clusters: Vec<ClusterPlan>,
}

impl Model {
    /// Creates a model and assigns cluster ids to all nodes.
    pub fn new(mut network: Network) -> Self {
        network.compute_clusters();
        Self::with_clusters(network)
    }

    /// Creates a model that trusts the cluster ids already set on the
    /// network nodes.
    pub fn with_clusters(network: Network) -> Self {
        let clusters = (0..network.cluster_count().max(1))
            .map(|i| ClusterPlan::new(ClusterId(i)))
            .collect();
        Self { network, clusters }
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn clusters(&self) -> &[ClusterPlan] {
        &self.clusters
    }

    pub fn cluster(&self, id: ClusterId) -> Option<&ClusterPlan> {
        self.clusters.get(id.0)
    }

    /// Splits the model into the shared network and the per-cluster plans.
    pub fn split_mut(&mut self) -> (&Network, &mut [ClusterPlan]) {
        let needed = self.network.cluster_count();
        while self.clusters.len() < needed {
            let id = ClusterId(self.clusters.len());
            self.clusters.push(ClusterPlan::new(id));
        }
        (&self.network, &mut self.clusters)
    }

    /// Adds a confirmed plan of `operation` ending at `end`.
    ///
    /// Locked plans consume material and capacity like any other plan but
    /// are never changed by the solver.
    pub fn add_locked_plan(&mut self, operation: OperationId, quantity: f64, end: Date) -> Result<PlanId> {
        let cluster = self
            .network
            .get_operation(operation)
            .ok_or_else(|| PlanForgeError::DomainModel(format!("unknown {operation}")))?
            .cluster;
        let (network, clusters) = self.split_mut();
        let plan = clusters
            .get_mut(cluster.0)
            .ok_or_else(|| PlanForgeError::Internal(format!("missing plan state for {cluster}")))?;
        Ok(plan.create_operation_plan(network, operation, quantity, end, None, None, true))
    }

    /// Adds a confirmed purchase received by a procurement buffer at `date`.
    pub fn add_locked_purchase(&mut self, buffer: BufferId, quantity: f64, date: Date) -> Result<PlanId> {
        let node = self
            .network
            .get_buffer(buffer)
            .ok_or_else(|| PlanForgeError::DomainModel(format!("unknown {buffer}")))?;
        let BufferKind::Procure(policy) = &node.kind else {
            return Err(PlanForgeError::DomainModel(format!(
                "buffer '{}' is not a procurement buffer",
                node.name
            )));
        };
        let leadtime = policy.leadtime;
        let cluster = node.cluster;
        let (network, clusters) = self.split_mut();
        let plan = clusters
            .get_mut(cluster.0)
            .ok_or_else(|| PlanForgeError::Internal(format!("missing plan state for {cluster}")))?;
        Ok(plan.create_purchase(network, buffer, quantity, date, leadtime, true))
    }

    /// Quantity planned for a demand.
    pub fn delivered(&self, demand: DemandId) -> f64 {
        self.network
            .get_demand(demand)
            .and_then(|d| self.cluster(d.cluster))
            .map_or(0.0, |plan| plan.delivered(demand))
    }

    /// Summarises the plan of every demand.
    pub fn demand_report(&self) -> Vec<DemandReport> {
        self.network
            .demands()
            .map(|(id, demand)| {
                let deliveries = self
                    .cluster(demand.cluster)
                    .map(|plan| plan.deliveries(id))
                    .unwrap_or_default();
                let planned = deliveries.iter().map(|p| p.quantity).sum();
                let last_delivery = deliveries.iter().map(|p| p.end).max();
                let lateness = match last_delivery {
                    Some(end) if end > demand.due => end - demand.due,
                    _ => TimePeriod::ZERO,
                };
                DemandReport {
                    demand: id,
                    name: demand.name.clone(),
                    quantity: demand.quantity,
                    planned,
                    last_delivery,
                    lateness,
                }
            })
            .collect()
    }
}
