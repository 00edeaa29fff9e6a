//! Static supply-graph nodes.
//!
//! Nodes carry only the attributes the solving rules read. Their dynamic
//! plan state lives in [`ClusterPlan`](crate::plan::ClusterPlan).

use smallvec::SmallVec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{PlanForgeError, Result};
use crate::ids::{BufferId, ClusterId, FlowId, LoadId, OperationId, ResourceId};
use crate::time::{Date, TimePeriod};

/// Kind-specific behaviour of an operation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OperationKind {
    /// A single step of fixed duration.
    FixedTime,
    /// A sequence of steps, executed front to back.
    Routing { steps: Vec<OperationId> },
    /// A choice between operations, each with a priority.
    ///
    /// Lower priorities are tried first; priority zero marks an alternate
    /// as temporarily unavailable.
    Alternate { alternates: Vec<(OperationId, u32)> },
}

/// A production, transport or delivery activity.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Operation {
    pub name: String,
    pub kind: OperationKind,
    pub duration: TimePeriod,
    /// Slack wanted between the end of the operation and the need date.
    pub post_time: TimePeriod,
    /// Release fence measured from the current date.
    pub fence: TimePeriod,
    /// Direct cost per planned unit.
    pub cost: f64,
    pub size_minimum: f64,
    pub size_multiple: f64,
    pub flows: SmallVec<[FlowId; 4]>,
    pub loads: SmallVec<[LoadId; 2]>,
    pub cluster: ClusterId,
}

impl Operation {
    fn with_kind(name: impl Into<String>, kind: OperationKind, duration: TimePeriod) -> Self {
        Self {
            name: name.into(),
            kind,
            duration,
            post_time: TimePeriod::ZERO,
            fence: TimePeriod::ZERO,
            cost: 0.0,
            size_minimum: 0.0,
            size_multiple: 0.0,
            flows: SmallVec::new(),
            loads: SmallVec::new(),
            cluster: ClusterId(0),
        }
    }

    /// Creates an operation of fixed duration.
    pub fn fixed_time(name: impl Into<String>, duration: TimePeriod) -> Self {
        Self::with_kind(name, OperationKind::FixedTime, duration)
    }

    /// Creates a routing over the given steps.
    pub fn routing(name: impl Into<String>, steps: Vec<OperationId>) -> Self {
        Self::with_kind(name, OperationKind::Routing { steps }, TimePeriod::ZERO)
    }

    /// Creates an alternate operation over `(operation, priority)` pairs.
    pub fn alternate(name: impl Into<String>, alternates: Vec<(OperationId, u32)>) -> Self {
        Self::with_kind(
            name,
            OperationKind::Alternate { alternates },
            TimePeriod::ZERO,
        )
    }

    pub fn with_post_time(mut self, post_time: TimePeriod) -> Self {
        self.post_time = post_time;
        self
    }

    pub fn with_fence(mut self, fence: TimePeriod) -> Self {
        self.fence = fence;
        self
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_sizes(mut self, minimum: f64, multiple: f64) -> Self {
        self.size_minimum = minimum;
        self.size_multiple = multiple;
        self
    }

    pub fn with_cluster(mut self, cluster: ClusterId) -> Self {
        self.cluster = cluster;
        self
    }
}

/// Replenishment policy of a procurement buffer.
///
/// Sizes and intervals are hard constraints; a zero maximum size or
/// interval means "unbounded".
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProcurePolicy {
    pub leadtime: TimePeriod,
    pub fence: TimePeriod,
    pub size_minimum: f64,
    pub size_maximum: f64,
    pub size_multiple: f64,
    pub min_interval: TimePeriod,
    pub max_interval: TimePeriod,
    /// Direct cost per purchased unit.
    pub cost: f64,
}

impl ProcurePolicy {
    /// Checks that the size bounds of the policy of `buffer` leave room
    /// for a purchase.
    pub fn validate(&self, buffer: &str) -> Result<()> {
        if self.size_maximum > 0.0 && self.size_maximum < self.size_minimum {
            return Err(PlanForgeError::DomainModel(format!(
                "buffer '{buffer}' buys at most {} but at least {}",
                self.size_maximum, self.size_minimum
            )));
        }
        if self.size_multiple > 0.0
            && self.size_maximum > 0.0
            && self.size_maximum < self.size_multiple
        {
            return Err(PlanForgeError::DomainModel(format!(
                "buffer '{buffer}' buys at most {} in batches of {}",
                self.size_maximum, self.size_multiple
            )));
        }
        Ok(())
    }
}

/// Kind-specific behaviour of a buffer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BufferKind {
    /// Replenished on demand by its producing operation.
    Default,
    /// Unconstrained supply.
    Infinite,
    /// Replenished by purchases, never by upstream operations.
    Procure(ProcurePolicy),
}

/// An inventory point for one material at one location.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Buffer {
    pub name: String,
    pub kind: BufferKind,
    /// Inventory at the start of the horizon.
    pub onhand: f64,
    /// Safety stock target (soft).
    pub minimum: f64,
    /// Replenishment target of procurement buffers (soft).
    pub maximum: f64,
    pub producing: Option<OperationId>,
    /// Cost of holding one unit for one day.
    pub carrying_cost: f64,
    pub cluster: ClusterId,
}

impl Buffer {
    /// Creates a default buffer.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: BufferKind::Default,
            onhand: 0.0,
            minimum: 0.0,
            maximum: 0.0,
            producing: None,
            carrying_cost: 0.0,
            cluster: ClusterId(0),
        }
    }

    /// Creates an infinite buffer.
    pub fn infinite(name: impl Into<String>) -> Self {
        Self {
            kind: BufferKind::Infinite,
            ..Self::new(name)
        }
    }

    /// Creates a procurement buffer.
    pub fn procure(name: impl Into<String>, policy: ProcurePolicy) -> Self {
        Self {
            kind: BufferKind::Procure(policy),
            ..Self::new(name)
        }
    }

    pub fn with_onhand(mut self, onhand: f64) -> Self {
        self.onhand = onhand;
        self
    }

    pub fn with_levels(mut self, minimum: f64, maximum: f64) -> Self {
        self.minimum = minimum;
        self.maximum = maximum;
        self
    }

    pub fn with_carrying_cost(mut self, carrying_cost: f64) -> Self {
        self.carrying_cost = carrying_cost;
        self
    }

    pub fn with_cluster(mut self, cluster: ClusterId) -> Self {
        self.cluster = cluster;
        self
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self.kind, BufferKind::Infinite)
    }
}

/// Kind-specific behaviour of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ResourceKind {
    Default,
    Infinite,
}

/// A capacity-constrained machine, tool or crew.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Resource {
    pub name: String,
    pub kind: ResourceKind,
    /// Maximum concurrent usage.
    pub capacity: f64,
    /// Cost of one unit of usage for one day.
    pub cost: f64,
    pub cluster: ClusterId,
}

impl Resource {
    /// Creates a resource with the given maximum concurrent usage.
    pub fn new(name: impl Into<String>, capacity: f64) -> Self {
        Self {
            name: name.into(),
            kind: ResourceKind::Default,
            capacity,
            cost: 0.0,
            cluster: ClusterId(0),
        }
    }

    /// Creates a resource without capacity limit.
    pub fn infinite(name: impl Into<String>) -> Self {
        Self {
            kind: ResourceKind::Infinite,
            ..Self::new(name, f64::INFINITY)
        }
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_cluster(mut self, cluster: ClusterId) -> Self {
        self.cluster = cluster;
        self
    }
}

/// Material consumed or produced by an operation.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Flow {
    pub operation: OperationId,
    pub buffer: BufferId,
    /// Negative values consume at the plan start, positive values produce
    /// at the plan end.
    pub quantity_per: f64,
}

impl Flow {
    pub fn is_consuming(&self) -> bool {
        self.quantity_per < 0.0
    }

    pub fn is_producing(&self) -> bool {
        self.quantity_per > 0.0
    }
}

/// Capacity used by an operation.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Load {
    pub operation: OperationId,
    pub resource: ResourceId,
    /// Concurrent usage while a plan of the operation runs.
    pub usage: f64,
}

/// An order to be satisfied by a date.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Demand {
    pub name: String,
    pub quantity: f64,
    pub due: Date,
    /// Smaller values are planned first.
    pub priority: i32,
    pub delivery: Option<OperationId>,
    pub max_lateness: TimePeriod,
    /// Smallest delivery the customer accepts.
    pub min_shipment: f64,
    pub cluster: ClusterId,
}

impl Demand {
    pub fn new(name: impl Into<String>, quantity: f64, due: Date) -> Self {
        Self {
            name: name.into(),
            quantity,
            due,
            priority: 0,
            delivery: None,
            max_lateness: TimePeriod::INFINITE,
            min_shipment: 0.0,
            cluster: ClusterId(0),
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_delivery(mut self, operation: OperationId) -> Self {
        self.delivery = Some(operation);
        self
    }

    pub fn with_max_lateness(mut self, max_lateness: TimePeriod) -> Self {
        self.max_lateness = max_lateness;
        self
    }

    pub fn with_min_shipment(mut self, min_shipment: f64) -> Self {
        self.min_shipment = min_shipment;
        self
    }

    pub fn with_cluster(mut self, cluster: ClusterId) -> Self {
        self.cluster = cluster;
        self
    }

    /// Latest acceptable delivery date.
    pub fn deadline(&self) -> Date {
        self.due + self.max_lateness
    }
}
