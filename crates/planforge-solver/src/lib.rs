//! PlanForge Solver - Ask-reply MRP planning engine
//!
//! This crate plans demands against a supply network:
//! - Solving rules for demands, operations, buffers and resources
//! - The bounded state stack carrying requests and replies
//! - Command log with savepoints, commit and undo
//! - Cluster dispatch onto a worker pool
//! - Capacity relocation of overloaded plans
//! - Plan problem detection

pub mod command;
mod dispatch;
pub mod hooks;
pub mod ordering;
pub mod problems;
pub mod relocate;
mod scope;
mod solve;
pub mod solver;
pub mod state;
pub mod statistics;

pub use command::{CommandLog, Savepoint, UndoCommand};
pub use dispatch::ClusterQueue;
pub use hooks::{HookSet, NoHooks, SolverHooks};
pub use ordering::{demand_ordering, sort_demands};
pub use problems::{find_problems, Problem};
pub use relocate::{find_slot, fits_in_place, SlotRequest};
pub use solver::MrpSolver;
pub use state::{Reply, State, StateStack, MAX_STATES};
pub use statistics::{DemandFailure, RunStatistics, SolveSummary};
