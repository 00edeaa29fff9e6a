//! Dynamic plan state of one cluster.
//!
//! A [`ClusterPlan`] owns the operation plans of its cluster together with
//! the flow-plan timeline of each buffer and the load-plan timeline of each
//! resource. During a run exactly one worker holds it mutably.
//!
//! The mutators here do not record anything; reversible bookkeeping is the
//! solver's concern.

mod instance;

pub use instance::{FlowPlan, FlowTiming, LoadPlan, OperationPlan, PlanKind};

use std::collections::HashMap;

use smallvec::SmallVec;

use crate::ids::{BufferId, ClusterId, DemandId, OperationId, PlanId, ResourceId};
use crate::network::Network;
use crate::time::{Date, TimePeriod};

/// Plan state of a single cluster.
#[derive(Debug, Clone, Default)]
pub struct ClusterPlan {
    cluster: ClusterId,
    plans: Vec<Option<OperationPlan>>,
    flow_plans: HashMap<BufferId, Vec<FlowPlan>>,
    load_plans: HashMap<ResourceId, Vec<LoadPlan>>,
}

impl ClusterPlan {
    pub fn new(cluster: ClusterId) -> Self {
        Self {
            cluster,
            ..Self::default()
        }
    }

    pub fn cluster(&self) -> ClusterId {
        self.cluster
    }

    /// Creates a plan of `operation` ending at `end`.
    ///
    /// Consuming flow plans are dated at the plan start, producing flow
    /// plans at the plan end; load plans span the whole plan.
    #[allow(clippy::too_many_arguments)]
    pub fn create_operation_plan(
        &mut self,
        network: &Network,
        operation: OperationId,
        quantity: f64,
        end: Date,
        demand: Option<DemandId>,
        owner: Option<PlanId>,
        locked: bool,
    ) -> PlanId {
        let op = network.operation(operation);
        debug_assert_eq!(op.cluster, self.cluster, "operation '{}' outside cluster", op.name);

        let id = PlanId(self.plans.len());
        let start = end - op.duration;
        let mut flow_buffers = SmallVec::new();
        let mut load_resources = SmallVec::new();

        for &flow_id in &op.flows {
            let flow = network.flow(flow_id);
            debug_assert_eq!(network.buffer(flow.buffer).cluster, self.cluster);
            let timing = if flow.is_consuming() {
                FlowTiming::Start
            } else {
                FlowTiming::End
            };
            let date = match timing {
                FlowTiming::Start => start,
                FlowTiming::End => end,
            };
            self.flow_plans.entry(flow.buffer).or_default().push(FlowPlan {
                plan: id,
                flow: Some(flow_id),
                quantity_per: flow.quantity_per,
                timing,
                date,
                quantity: flow.quantity_per * quantity,
            });
            if !flow_buffers.contains(&flow.buffer) {
                flow_buffers.push(flow.buffer);
            }
        }

        for &load_id in &op.loads {
            let load = network.load(load_id);
            debug_assert_eq!(network.resource(load.resource).cluster, self.cluster);
            self.load_plans
                .entry(load.resource)
                .or_default()
                .push(LoadPlan {
                    plan: id,
                    load: load_id,
                    start,
                    end,
                    usage: load.usage,
                });
            if !load_resources.contains(&load.resource) {
                load_resources.push(load.resource);
            }
        }

        self.plans.push(Some(OperationPlan {
            id,
            kind: PlanKind::Operation(operation),
            quantity,
            start,
            end,
            demand,
            owner,
            locked,
            flow_buffers,
            load_resources,
        }));
        id
    }

    /// Creates a purchase for a procurement buffer, received at `end`.
    pub fn create_purchase(
        &mut self,
        network: &Network,
        buffer: BufferId,
        quantity: f64,
        end: Date,
        leadtime: TimePeriod,
        locked: bool,
    ) -> PlanId {
        debug_assert_eq!(network.buffer(buffer).cluster, self.cluster);

        let id = PlanId(self.plans.len());
        self.flow_plans.entry(buffer).or_default().push(FlowPlan {
            plan: id,
            flow: None,
            quantity_per: 1.0,
            timing: FlowTiming::End,
            date: end,
            quantity,
        });
        self.plans.push(Some(OperationPlan {
            id,
            kind: PlanKind::Purchase(buffer),
            quantity,
            start: end - leadtime,
            end,
            demand: None,
            owner: None,
            locked,
            flow_buffers: SmallVec::from_slice(&[buffer]),
            load_resources: SmallVec::new(),
        }));
        id
    }

    /// Deletes a plan together with its flow and load plans.
    ///
    /// Empty slots at the end are reclaimed, so the next plan reuses the id
    /// of the latest removed one.
    pub fn remove_plan(&mut self, id: PlanId) -> Option<OperationPlan> {
        let plan = self.plans.get_mut(id.0)?.take()?;
        while matches!(self.plans.last(), Some(None)) {
            self.plans.pop();
        }
        for buffer in &plan.flow_buffers {
            if let Some(timeline) = self.flow_plans.get_mut(buffer) {
                timeline.retain(|fp| fp.plan != id);
            }
        }
        for resource in &plan.load_resources {
            if let Some(timeline) = self.load_plans.get_mut(resource) {
                timeline.retain(|lp| lp.plan != id);
            }
        }
        Some(plan)
    }

    /// Changes the quantity of a plan and returns the previous quantity.
    pub fn set_quantity(&mut self, id: PlanId, quantity: f64) -> Option<f64> {
        let plan = self.plans.get_mut(id.0)?.as_mut()?;
        let old = plan.quantity;
        plan.quantity = quantity;
        for buffer in &plan.flow_buffers {
            if let Some(timeline) = self.flow_plans.get_mut(buffer) {
                for fp in timeline.iter_mut().filter(|fp| fp.plan == id) {
                    fp.quantity = fp.quantity_per * quantity;
                }
            }
        }
        Some(old)
    }

    /// Moves a plan and returns its previous `(start, end)`.
    pub fn set_dates(&mut self, id: PlanId, start: Date, end: Date) -> Option<(Date, Date)> {
        let plan = self.plans.get_mut(id.0)?.as_mut()?;
        let old = (plan.start, plan.end);
        plan.start = start;
        plan.end = end;
        for buffer in &plan.flow_buffers {
            if let Some(timeline) = self.flow_plans.get_mut(buffer) {
                for fp in timeline.iter_mut().filter(|fp| fp.plan == id) {
                    fp.date = match fp.timing {
                        FlowTiming::Start => start,
                        FlowTiming::End => end,
                    };
                }
            }
        }
        for resource in &plan.load_resources {
            if let Some(timeline) = self.load_plans.get_mut(resource) {
                for lp in timeline.iter_mut().filter(|lp| lp.plan == id) {
                    lp.start = start;
                    lp.end = end;
                }
            }
        }
        Some(old)
    }

    pub fn plan(&self, id: PlanId) -> Option<&OperationPlan> {
        self.plans.get(id.0).and_then(Option::as_ref)
    }

    /// Iterates over all live plans.
    pub fn plans(&self) -> impl Iterator<Item = &OperationPlan> {
        self.plans.iter().filter_map(Option::as_ref)
    }

    /// Number of live plans.
    pub fn plan_count(&self) -> usize {
        self.plans().count()
    }

    pub fn flow_plans(&self, buffer: BufferId) -> &[FlowPlan] {
        self.flow_plans.get(&buffer).map_or(&[], Vec::as_slice)
    }

    pub fn load_plans(&self, resource: ResourceId) -> &[LoadPlan] {
        self.load_plans.get(&resource).map_or(&[], Vec::as_slice)
    }

    /// Projected inventory at `date`, after all movements dated on or
    /// before it.
    pub fn inventory_at(&self, network: &Network, buffer: BufferId, date: Date) -> f64 {
        network.buffer(buffer).onhand
            + self
                .flow_plans(buffer)
                .iter()
                .filter(|fp| fp.date <= date)
                .map(|fp| fp.quantity)
                .sum::<f64>()
    }

    /// Lowest projected inventory on or after `date`.
    pub fn min_inventory_from(&self, network: &Network, buffer: BufferId, date: Date) -> f64 {
        let mut level = self.inventory_at(network, buffer, date);
        let mut lowest = level;
        for (_, delta) in self.movements_after(buffer, date) {
            level += delta;
            lowest = lowest.min(level);
        }
        lowest
    }

    /// Buffer movements strictly after `date`, aggregated per date and
    /// sorted by date.
    pub fn movements_after(&self, buffer: BufferId, date: Date) -> Vec<(Date, f64)> {
        let mut moves: Vec<(Date, f64)> = self
            .flow_plans(buffer)
            .iter()
            .filter(|fp| fp.date > date)
            .map(|fp| (fp.date, fp.quantity))
            .collect();
        moves.sort_by_key(|&(d, _)| d);
        let mut aggregated: Vec<(Date, f64)> = Vec::with_capacity(moves.len());
        for (d, q) in moves {
            match aggregated.last_mut() {
                Some((last, total)) if *last == d => *total += q,
                _ => aggregated.push((d, q)),
            }
        }
        aggregated
    }

    /// Purchases of a procurement buffer, sorted by receipt date.
    pub fn purchases(&self, buffer: BufferId) -> Vec<&OperationPlan> {
        let mut purchases: Vec<&OperationPlan> = self
            .plans()
            .filter(|p| p.kind == PlanKind::Purchase(buffer))
            .collect();
        purchases.sort_by_key(|p| (p.end, p.id));
        purchases
    }

    /// Peak concurrent usage of `resource` within `[start, end)`, ignoring
    /// the load plans of `exclude`.
    pub fn peak_usage(
        &self,
        resource: ResourceId,
        start: Date,
        end: Date,
        exclude: Option<PlanId>,
    ) -> f64 {
        let end = if end <= start {
            start + TimePeriod::seconds(1)
        } else {
            end
        };
        let relevant: Vec<&LoadPlan> = self
            .load_plans(resource)
            .iter()
            .filter(|lp| Some(lp.plan) != exclude && lp.overlaps(start, end))
            .collect();

        // Usage only rises at the window start or at a load plan start.
        let mut peak = 0.0_f64;
        let probes = std::iter::once(start).chain(
            relevant
                .iter()
                .map(|lp| lp.start)
                .filter(|&s| s > start && s < end),
        );
        for probe in probes {
            let usage: f64 = relevant
                .iter()
                .filter(|lp| lp.start <= probe && probe < lp.end)
                .map(|lp| lp.usage)
                .sum();
            peak = peak.max(usage);
        }
        peak
    }

    /// Delivery plans of a demand, sorted by end date.
    pub fn deliveries(&self, demand: DemandId) -> Vec<&OperationPlan> {
        let mut plans: Vec<&OperationPlan> = self
            .plans()
            .filter(|p| p.demand == Some(demand))
            .collect();
        plans.sort_by_key(|p| (p.end, p.id));
        plans
    }

    /// Quantity planned for a demand.
    pub fn delivered(&self, demand: DemandId) -> f64 {
        self.deliveries(demand).iter().map(|p| p.quantity).sum()
    }

    /// Returns true when the plan state holds nothing.
    pub fn is_empty(&self) -> bool {
        self.plan_count() == 0
    }
}

#[cfg(test)]
mod tests;
