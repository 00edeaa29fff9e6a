//! The static supply graph.
//!
//! A [`Network`] owns arenas of operations, buffers, resources, flows,
//! loads and demands. It is shared read-only by all cluster workers during
//! a run; everything a run mutates lives in [`ClusterPlan`](crate::plan::ClusterPlan).
//!
//! # Example
//!
//! ```
//! use planforge_core::network::{Buffer, Demand, Network, Operation, Resource};
//! use planforge_core::time::{Date, TimePeriod};
//!
//! let mut network = Network::new(Date::from_days(0), Date::from_days(365));
//! let steel = network.add_buffer(Buffer::infinite("steel"));
//! let press = network.add_resource(Resource::new("press", 8.0));
//! let make = network.add_operation(Operation::fixed_time("make", TimePeriod::days(1)));
//! network.add_flow(make, steel, -1.0).unwrap();
//! network.add_load(make, press, 1.0).unwrap();
//! let order = network.add_demand(Demand::new("order", 10.0, Date::from_days(30)).with_delivery(make));
//!
//! assert_eq!(network.compute_clusters(), 1);
//! assert_eq!(network.demand(order).quantity, 10.0);
//! ```

mod cluster;
mod nodes;

pub use nodes::{
    Buffer, BufferKind, Demand, Flow, Load, Operation, OperationKind, ProcurePolicy, Resource,
    ResourceKind,
};

use crate::error::{PlanForgeError, Result};
use crate::ids::{BufferId, DemandId, FlowId, LoadId, OperationId, ResourceId};
use crate::time::Date;

/// The static part of the planning model.
#[derive(Debug, Clone)]
pub struct Network {
    current: Date,
    horizon_end: Date,
    operations: Vec<Operation>,
    buffers: Vec<Buffer>,
    resources: Vec<Resource>,
    flows: Vec<Flow>,
    loads: Vec<Load>,
    demands: Vec<Demand>,
}

impl Network {
    /// Creates an empty network planned from `current` up to `horizon_end`.
    pub fn new(current: Date, horizon_end: Date) -> Self {
        Self {
            current,
            horizon_end,
            operations: Vec::new(),
            buffers: Vec::new(),
            resources: Vec::new(),
            flows: Vec::new(),
            loads: Vec::new(),
            demands: Vec::new(),
        }
    }

    /// The current date of the plan ("now").
    pub fn current(&self) -> Date {
        self.current
    }

    /// The end of the planning horizon.
    pub fn horizon_end(&self) -> Date {
        self.horizon_end
    }

    pub fn add_operation(&mut self, operation: Operation) -> OperationId {
        self.operations.push(operation);
        OperationId(self.operations.len() - 1)
    }

    pub fn add_buffer(&mut self, buffer: Buffer) -> BufferId {
        self.buffers.push(buffer);
        BufferId(self.buffers.len() - 1)
    }

    pub fn add_resource(&mut self, resource: Resource) -> ResourceId {
        self.resources.push(resource);
        ResourceId(self.resources.len() - 1)
    }

    pub fn add_demand(&mut self, demand: Demand) -> DemandId {
        self.demands.push(demand);
        DemandId(self.demands.len() - 1)
    }

    /// Connects an operation to a buffer.
    ///
    /// A producing flow becomes the buffer's producing operation unless one
    /// is already set.
    pub fn add_flow(
        &mut self,
        operation: OperationId,
        buffer: BufferId,
        quantity_per: f64,
    ) -> Result<FlowId> {
        self.check_operation(operation)?;
        if buffer.0 >= self.buffers.len() {
            return Err(PlanForgeError::DomainModel(format!("unknown {buffer}")));
        }
        if quantity_per == 0.0 || !quantity_per.is_finite() {
            return Err(PlanForgeError::DomainModel(format!(
                "flow between {operation} and {buffer} needs a finite non-zero quantity"
            )));
        }

        let id = FlowId(self.flows.len());
        self.flows.push(Flow {
            operation,
            buffer,
            quantity_per,
        });
        self.operations[operation.0].flows.push(id);
        if quantity_per > 0.0 && self.buffers[buffer.0].producing.is_none() {
            self.buffers[buffer.0].producing = Some(operation);
        }
        Ok(id)
    }

    /// Makes `operation` use `usage` units of `resource` while it runs.
    pub fn add_load(
        &mut self,
        operation: OperationId,
        resource: ResourceId,
        usage: f64,
    ) -> Result<LoadId> {
        self.check_operation(operation)?;
        if resource.0 >= self.resources.len() {
            return Err(PlanForgeError::DomainModel(format!("unknown {resource}")));
        }
        if usage < 0.0 || !usage.is_finite() {
            return Err(PlanForgeError::DomainModel(format!(
                "load of {operation} on {resource} needs a finite non-negative usage"
            )));
        }

        let id = LoadId(self.loads.len());
        self.loads.push(Load {
            operation,
            resource,
            usage,
        });
        self.operations[operation.0].loads.push(id);
        Ok(id)
    }

    /// Overrides the producing operation of a buffer.
    pub fn set_producing(&mut self, buffer: BufferId, operation: OperationId) -> Result<()> {
        self.check_operation(operation)?;
        let buffer = self
            .buffers
            .get_mut(buffer.0)
            .ok_or_else(|| PlanForgeError::DomainModel(format!("unknown {buffer}")))?;
        buffer.producing = Some(operation);
        Ok(())
    }

    fn check_operation(&self, operation: OperationId) -> Result<()> {
        if operation.0 < self.operations.len() {
            Ok(())
        } else {
            Err(PlanForgeError::DomainModel(format!("unknown {operation}")))
        }
    }

    pub fn operation(&self, id: OperationId) -> &Operation {
        &self.operations[id.0]
    }

    pub fn buffer(&self, id: BufferId) -> &Buffer {
        &self.buffers[id.0]
    }

    pub fn resource(&self, id: ResourceId) -> &Resource {
        &self.resources[id.0]
    }

    pub fn flow(&self, id: FlowId) -> &Flow {
        &self.flows[id.0]
    }

    pub fn load(&self, id: LoadId) -> &Load {
        &self.loads[id.0]
    }

    pub fn demand(&self, id: DemandId) -> &Demand {
        &self.demands[id.0]
    }

    pub fn get_operation(&self, id: OperationId) -> Option<&Operation> {
        self.operations.get(id.0)
    }

    pub fn get_buffer(&self, id: BufferId) -> Option<&Buffer> {
        self.buffers.get(id.0)
    }

    pub fn get_demand(&self, id: DemandId) -> Option<&Demand> {
        self.demands.get(id.0)
    }

    pub fn demand_mut(&mut self, id: DemandId) -> Option<&mut Demand> {
        self.demands.get_mut(id.0)
    }

    pub fn operation_mut(&mut self, id: OperationId) -> Option<&mut Operation> {
        self.operations.get_mut(id.0)
    }

    pub fn buffer_mut(&mut self, id: BufferId) -> Option<&mut Buffer> {
        self.buffers.get_mut(id.0)
    }

    /// Iterates over all demands with their ids.
    pub fn demands(&self) -> impl Iterator<Item = (DemandId, &Demand)> {
        self.demands.iter().enumerate().map(|(i, d)| (DemandId(i), d))
    }

    pub fn buffers(&self) -> impl Iterator<Item = (BufferId, &Buffer)> {
        self.buffers.iter().enumerate().map(|(i, b)| (BufferId(i), b))
    }

    pub fn resources(&self) -> impl Iterator<Item = (ResourceId, &Resource)> {
        self.resources
            .iter()
            .enumerate()
            .map(|(i, r)| (ResourceId(i), r))
    }

    pub fn operations(&self) -> impl Iterator<Item = (OperationId, &Operation)> {
        self.operations
            .iter()
            .enumerate()
            .map(|(i, o)| (OperationId(i), o))
    }

    /// Returns the flow through which `operation` produces into `buffer`.
    ///
    /// Consuming flows of the same pair are skipped.
    pub fn producing_flow(&self, operation: OperationId, buffer: BufferId) -> Option<FlowId> {
        self.operation(operation).flows.iter().copied().find(|&f| {
            let flow = self.flow(f);
            flow.buffer == buffer && flow.quantity_per > 0.0
        })
    }

    /// Number of cluster ids in use (highest id plus one).
    pub fn cluster_count(&self) -> usize {
        let op = self.operations.iter().map(|o| o.cluster.0);
        let buf = self.buffers.iter().map(|b| b.cluster.0);
        let res = self.resources.iter().map(|r| r.cluster.0);
        let dem = self.demands.iter().map(|d| d.cluster.0);
        op.chain(buf)
            .chain(res)
            .chain(dem)
            .max()
            .map_or(0, |max| max + 1)
    }
}
