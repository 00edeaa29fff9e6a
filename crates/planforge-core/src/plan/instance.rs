//! Plan instances: the scheduled occurrences created while solving.

use smallvec::SmallVec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ids::{BufferId, DemandId, FlowId, LoadId, OperationId, PlanId, ResourceId};
use crate::time::{Date, TimePeriod};

/// What an operation plan is an occurrence of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PlanKind {
    Operation(OperationId),
    /// A replenishment of a procurement buffer.
    Purchase(BufferId),
}

/// A scheduled occurrence of an operation or purchase.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OperationPlan {
    pub id: PlanId,
    pub kind: PlanKind,
    pub quantity: f64,
    pub start: Date,
    pub end: Date,
    /// Set on the delivery plans of a demand.
    pub demand: Option<DemandId>,
    /// Set on the step plans of a routing.
    pub owner: Option<PlanId>,
    /// Locked plans are confirmed supply the solver never changes.
    pub locked: bool,
    pub(crate) flow_buffers: SmallVec<[BufferId; 4]>,
    pub(crate) load_resources: SmallVec<[ResourceId; 2]>,
}

impl OperationPlan {
    pub fn duration(&self) -> TimePeriod {
        self.end - self.start
    }

    pub fn operation(&self) -> Option<OperationId> {
        match self.kind {
            PlanKind::Operation(op) => Some(op),
            PlanKind::Purchase(_) => None,
        }
    }

    /// Buffers this plan has flow plans on.
    pub fn buffers(&self) -> &[BufferId] {
        &self.flow_buffers
    }

    /// Resources this plan has load plans on.
    pub fn resources(&self) -> &[ResourceId] {
        &self.load_resources
    }
}

/// Whether a flow plan is dated at the start or the end of its plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FlowTiming {
    Start,
    End,
}

/// A material movement on a buffer caused by an operation plan.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlowPlan {
    pub plan: PlanId,
    /// `None` for purchases.
    pub flow: Option<FlowId>,
    pub quantity_per: f64,
    pub timing: FlowTiming,
    pub date: Date,
    /// Signed quantity: negative consumes, positive produces.
    pub quantity: f64,
}

/// Capacity used on a resource by an operation plan.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LoadPlan {
    pub plan: PlanId,
    pub load: LoadId,
    pub start: Date,
    pub end: Date,
    pub usage: f64,
}

impl LoadPlan {
    /// Returns true when the load plan overlaps `[start, end)`.
    pub fn overlaps(&self, start: Date, end: Date) -> bool {
        self.start < end && start < self.end
    }
}
