//! PlanForge - Heuristic Supply Planning in Rust
//!
//! Builds a supply network, plans its demands with the ask-reply solver and
//! reports what could not be met.
//!
//! # Example
//!
//! ```rust
//! use planforge::prelude::*;
//!
//! let mut network = Network::new(Date::from_days(0), Date::from_days(60));
//! let steel = network.add_buffer(Buffer::infinite("steel"));
//! let press = network.add_resource(Resource::new("press", 1.0));
//! let make = network.add_operation(Operation::fixed_time("make", TimePeriod::days(1)));
//! network.add_flow(make, steel, -1.0).unwrap();
//! network.add_load(make, press, 1.0).unwrap();
//! let order = network.add_demand(Demand::new("order", 4.0, Date::from_days(20)).with_delivery(make));
//!
//! let mut model = Model::new(network);
//! let summary = plan_with(&mut model, SolverConfig::default()).unwrap();
//!
//! assert!(summary.is_clean());
//! assert_eq!(model.delivered(order), 4.0);
//! assert!(find_problems(&model).is_empty());
//! ```

// Model
pub use planforge_core::{
    Buffer, BufferId, BufferKind, ClusterId, ClusterPlan, Date, Demand, DemandId, DemandReport,
    Flow, FlowId, Load, LoadId, Model, Network, Operation, OperationId, OperationKind,
    OperationPlan, PlanForgeError, PlanId, PlanKind, ProcurePolicy, Resource, ResourceId,
    ResourceKind, Result, TimePeriod,
};

// Configuration
pub use planforge_config::{ConfigError, Constraints, PlanType, SolverConfig};

// Solver
pub use planforge_solver::{
    find_problems, HookSet, MrpSolver, NoHooks, Problem, RunStatistics, SolveSummary,
    SolverHooks, State,
};

#[cfg(feature = "console")]
pub use planforge_console as console;

mod solver;
pub use solver::{plan, plan_with};

pub mod prelude {
    pub use super::{
        Buffer, Date, Demand, Model, Network, Operation, ProcurePolicy, Resource, TimePeriod,
    };
    pub use super::{find_problems, plan, plan_with, MrpSolver, Problem, SolveSummary};
    pub use super::{Constraints, PlanType, SolverConfig};
}
