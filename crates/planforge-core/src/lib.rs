//! PlanForge Core - Model types for heuristic supply planning
//!
//! This crate provides the data the planning engine works on:
//! - Dates and time periods on the plan timeline
//! - The static supply graph of operations, buffers, resources and demands
//! - Per-cluster plan state holding operation, flow and load plans
//! - The error type shared by all PlanForge crates

pub mod error;
pub mod ids;
pub mod model;
pub mod network;
pub mod plan;
pub mod time;

pub use error::{PlanForgeError, Result};
pub use ids::{BufferId, ClusterId, DemandId, FlowId, LoadId, OperationId, PlanId, ResourceId};
pub use model::{DemandReport, Model};
pub use network::{
    Buffer, BufferKind, Demand, Flow, Load, Network, Operation, OperationKind, ProcurePolicy,
    Resource, ResourceKind,
};
pub use plan::{ClusterPlan, FlowPlan, FlowTiming, LoadPlan, OperationPlan, PlanKind};
pub use time::{Date, TimePeriod, SECONDS_PER_DAY};

/// Quantities closer than this are considered equal.
pub const ROUNDING_ERROR: f64 = 1e-6;
