//! Reversible command log for plan changes.
//!
//! Every mutation the solving rules make to a [`ClusterPlan`] registers a
//! typed undo closure here. Undo runs the closures in reverse order, so the
//! plan returns exactly to the state at the chosen savepoint.
//!
//! ```
//! use planforge_core::{ClusterId, ClusterPlan};
//! use planforge_solver::CommandLog;
//!
//! let mut plan = ClusterPlan::new(ClusterId(0));
//! let mut log = CommandLog::new();
//! let savepoint = log.savepoint();
//! log.register(Box::new(|_plan: &mut ClusterPlan| {}));
//! assert_eq!(log.len(), 1);
//!
//! log.rollback_to(savepoint, &mut plan);
//! assert!(log.is_empty());
//! ```

use std::fmt;

use planforge_core::ClusterPlan;

/// Undo closure for one plan mutation.
pub type UndoCommand = Box<dyn FnOnce(&mut ClusterPlan) + Send>;

/// Position in a [`CommandLog`] to roll back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Savepoint(usize);

/// Undo stack of one cluster.
#[derive(Default)]
pub struct CommandLog {
    undo_stack: Vec<UndoCommand>,
}

impl CommandLog {
    pub fn new() -> Self {
        Self {
            undo_stack: Vec::with_capacity(16),
        }
    }

    /// Records the undo closure of a mutation that was just applied.
    pub fn register(&mut self, undo: UndoCommand) {
        self.undo_stack.push(undo);
    }

    /// Marks the current position.
    pub fn savepoint(&self) -> Savepoint {
        Savepoint(self.undo_stack.len())
    }

    /// Undoes all mutations recorded after `savepoint`, newest first.
    pub fn rollback_to(&mut self, savepoint: Savepoint, plan: &mut ClusterPlan) {
        while self.undo_stack.len() > savepoint.0 {
            if let Some(undo) = self.undo_stack.pop() {
                undo(plan);
            }
        }
    }

    /// Undoes every recorded mutation.
    pub fn undo_all(&mut self, plan: &mut ClusterPlan) {
        self.rollback_to(Savepoint(0), plan);
    }

    /// Makes all recorded mutations permanent.
    pub fn commit(&mut self) {
        self.undo_stack.clear();
    }

    /// Returns the number of recorded mutations.
    pub fn len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }
}

impl fmt::Debug for CommandLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandLog")
            .field("pending", &self.undo_stack.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planforge_core::{Buffer, ClusterId, Date, Network, Operation, TimePeriod};

    fn setup() -> (Network, planforge_core::OperationId) {
        let mut network = Network::new(Date::from_days(0), Date::from_days(30));
        let item = network.add_buffer(Buffer::new("item"));
        let make = network.add_operation(Operation::fixed_time("make", TimePeriod::days(1)));
        network.add_flow(make, item, 1.0).unwrap();
        (network, make)
    }

    #[test]
    fn test_rollback_restores_savepoint_state() {
        let (network, make) = setup();
        let mut plan = ClusterPlan::new(ClusterId(0));
        let mut log = CommandLog::new();

        let first = plan.create_operation_plan(&network, make, 2.0, Date::from_days(5), None, None, false);
        log.register(Box::new(move |p| {
            p.remove_plan(first);
        }));
        let savepoint = log.savepoint();

        let old = plan.set_quantity(first, 6.0).unwrap();
        log.register(Box::new(move |p| {
            p.set_quantity(first, old);
        }));
        let second = plan.create_operation_plan(&network, make, 1.0, Date::from_days(7), None, None, false);
        log.register(Box::new(move |p| {
            p.remove_plan(second);
        }));

        log.rollback_to(savepoint, &mut plan);
        assert_eq!(log.len(), 1);
        assert_eq!(plan.plan_count(), 1);
        assert_eq!(plan.plan(first).unwrap().quantity, 2.0);

        log.undo_all(&mut plan);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_commit_keeps_changes() {
        let (network, make) = setup();
        let mut plan = ClusterPlan::new(ClusterId(0));
        let mut log = CommandLog::new();

        let id = plan.create_operation_plan(&network, make, 2.0, Date::from_days(5), None, None, false);
        log.register(Box::new(move |p| {
            p.remove_plan(id);
        }));
        log.commit();
        log.undo_all(&mut plan);

        assert!(log.is_empty());
        assert_eq!(plan.plan_count(), 1);
    }
}
