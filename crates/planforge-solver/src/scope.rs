//! Per-cluster solving scope.
//!
//! A [`ClusterScope`] bundles what one worker needs while planning the
//! demands of its cluster: the shared network, exclusive access to the
//! cluster's plan state and command log, the run configuration and hooks,
//! and the worker's own state stack.

use planforge_config::SolverConfig;
use planforge_core::{
    BufferId, ClusterPlan, Date, DemandId, FlowId, LoadId, Network, OperationId, PlanId,
    Result, TimePeriod,
};
use tracing::debug;

use crate::command::{CommandLog, Savepoint};
use crate::hooks::SolverHooks;
use crate::solve;
use crate::state::{Reply, State, StateStack};
use crate::statistics::RunStatistics;

/// Working context of one cluster worker.
pub struct ClusterScope<'a> {
    pub(crate) network: &'a Network,
    pub(crate) plan: &'a mut ClusterPlan,
    pub(crate) log: &'a mut CommandLog,
    pub(crate) config: &'a SolverConfig,
    pub(crate) hooks: &'a dyn SolverHooks,
    pub(crate) stack: StateStack,
    pub(crate) stats: RunStatistics,
    constrained: bool,
}

impl<'a> ClusterScope<'a> {
    pub fn new(
        network: &'a Network,
        plan: &'a mut ClusterPlan,
        log: &'a mut CommandLog,
        config: &'a SolverConfig,
        hooks: &'a dyn SolverHooks,
    ) -> Self {
        Self {
            network,
            plan,
            log,
            config,
            hooks,
            stack: StateStack::new(),
            stats: RunStatistics::default(),
            constrained: !config.plan_type.is_unconstrained(),
        }
    }

    pub fn stack(&self) -> &StateStack {
        &self.stack
    }

    pub fn statistics(&self) -> &RunStatistics {
        &self.stats
    }

    pub fn into_statistics(self) -> RunStatistics {
        self.stats
    }

    pub fn plan(&self) -> &ClusterPlan {
        &*self.plan
    }

    pub(crate) fn top(&self) -> &State {
        self.stack.top()
    }

    /// Runs `solve` in a new frame asking `q_qty` at `q_date`.
    ///
    /// The frame is popped again whether or not `solve` fails.
    pub fn ask<S, F>(&mut self, q_qty: f64, q_date: Date, setup: S, solve: F) -> Result<Reply>
    where
        S: FnOnce(&mut State),
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.stack.push(q_qty, q_date)?;
        setup(self.stack.top_mut());
        self.stats.asks += 1;
        self.stats.max_depth = self.stats.max_depth.max(self.stack.depth());
        if self.logs_asks() {
            debug!(
                event = "ask",
                depth = self.stack.depth() as u64,
                quantity = q_qty,
                date = %q_date,
            );
        }

        let outcome = solve(self);
        let state = self.stack.pop()?;
        outcome?;

        let reply = Reply::from_state(&state);
        if self.logs_asks() {
            debug!(
                event = "reply",
                depth = self.stack.depth() as u64 + 1,
                quantity = reply.quantity,
                date = %reply.date,
                cost = reply.cost,
                penalty = reply.penalty,
            );
        }
        Ok(reply)
    }

    /// Asks an operation to deliver `q_qty` by `q_date`.
    pub fn ask_operation(
        &mut self,
        operation: OperationId,
        q_qty: f64,
        q_date: Date,
        demand: Option<DemandId>,
        owner: Option<PlanId>,
    ) -> Result<Reply> {
        self.ask(
            q_qty,
            q_date,
            |state| {
                state.q_demand = demand;
                state.q_owner = owner;
            },
            |scope| solve::solve_operation(scope, operation),
        )
    }

    /// Asks the buffer of a consuming flow of `plan` for `q_qty` at `q_date`.
    pub fn ask_flow(&mut self, flow: FlowId, plan: PlanId, q_qty: f64, q_date: Date) -> Result<Reply> {
        self.ask(
            q_qty,
            q_date,
            |state| {
                state.q_flow = Some(flow);
                state.q_operationplan = Some(plan);
            },
            |scope| solve::solve_flow(scope, flow),
        )
    }

    /// Asks the resource of a load whether `plan` fits.
    pub fn ask_load(&mut self, load: LoadId, plan: PlanId, q_qty: f64, q_date: Date) -> Result<Reply> {
        self.ask(
            q_qty,
            q_date,
            |state| {
                state.q_load = Some(load);
                state.q_operationplan = Some(plan);
            },
            |scope| solve::solve_load(scope, load),
        )
    }

    /// Writes the answer of the current frame.
    pub(crate) fn answer(&mut self, quantity: f64, date: Date) {
        let top = self.stack.top_mut();
        top.a_qty = quantity;
        top.a_date = date;
    }

    pub(crate) fn add_cost(&mut self, cost: f64, penalty: f64) {
        let top = self.stack.top_mut();
        top.a_cost += cost;
        top.a_penalty += penalty;
    }

    pub(crate) fn set_answer_plan(&mut self, plan: PlanId) {
        self.stack.top_mut().a_plan = Some(plan);
    }

    /// Returns true while the plan type enforces constraints.
    pub(crate) fn is_constrained(&self) -> bool {
        self.constrained
    }

    /// Switches constraint enforcement and returns the previous setting.
    pub(crate) fn set_constrained(&mut self, constrained: bool) -> bool {
        std::mem::replace(&mut self.constrained, constrained)
    }

    pub(crate) fn leadtime_constrained(&self) -> bool {
        self.constrained && self.config.constraints.leadtime()
    }

    pub(crate) fn material_constrained(&self) -> bool {
        self.constrained && self.config.constraints.material()
    }

    pub(crate) fn capacity_constrained(&self) -> bool {
        self.constrained && self.config.constraints.capacity()
    }

    pub(crate) fn fence_constrained(&self) -> bool {
        self.constrained && self.config.constraints.fence()
    }

    /// Earliest start allowed for new plans with the given release fence.
    pub(crate) fn earliest_start(&self, fence: TimePeriod) -> Date {
        let current = self.network.current();
        let mut earliest = Date::INFINITE_PAST;
        if self.leadtime_constrained() {
            earliest = earliest.max(current);
        }
        if self.fence_constrained() {
            earliest = earliest.max(current + fence);
        }
        earliest
    }

    pub(crate) fn savepoint(&self) -> Savepoint {
        self.log.savepoint()
    }

    pub(crate) fn rollback_to(&mut self, savepoint: Savepoint) {
        self.log.rollback_to(savepoint, self.plan);
    }

    pub(crate) fn create_plan(
        &mut self,
        operation: OperationId,
        quantity: f64,
        end: Date,
        demand: Option<DemandId>,
        owner: Option<PlanId>,
    ) -> PlanId {
        let id = self
            .plan
            .create_operation_plan(self.network, operation, quantity, end, demand, owner, false);
        self.log.register(Box::new(move |plan| {
            plan.remove_plan(id);
        }));
        id
    }

    pub(crate) fn create_purchase(
        &mut self,
        buffer: BufferId,
        quantity: f64,
        end: Date,
        leadtime: TimePeriod,
    ) -> PlanId {
        let id = self
            .plan
            .create_purchase(self.network, buffer, quantity, end, leadtime, false);
        self.log.register(Box::new(move |plan| {
            plan.remove_plan(id);
        }));
        self.stats.purchases += 1;
        id
    }

    pub(crate) fn resize_plan(&mut self, id: PlanId, quantity: f64) {
        if let Some(old) = self.plan.set_quantity(id, quantity) {
            self.log.register(Box::new(move |plan| {
                plan.set_quantity(id, old);
            }));
        }
    }

    pub(crate) fn move_plan(&mut self, id: PlanId, start: Date, end: Date) {
        if let Some((old_start, old_end)) = self.plan.set_dates(id, start, end) {
            self.log.register(Box::new(move |plan| {
                plan.set_dates(id, old_start, old_end);
            }));
        }
    }

    pub(crate) fn logs_progress(&self) -> bool {
        self.config.log_level >= 1
    }

    pub(crate) fn logs_asks(&self) -> bool {
        self.config.log_level >= 2
    }

    pub(crate) fn logs_state(&self) -> bool {
        self.config.log_level >= 3
    }
}
