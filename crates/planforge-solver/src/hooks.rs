//! Scripting hooks invoked before the solving rules run.
//!
//! Hooks observe the request being solved and may fail it. The flow hook
//! additionally answers whether an alternate may produce through its flow.
//!
//! # Example
//!
//! ```
//! use planforge_core::{PlanForgeError, Result};
//! use planforge_solver::HookSet;
//!
//! let hooks = HookSet::new()
//!     .on_demand(|demand, _state| {
//!         if demand.name.starts_with("blocked") {
//!             Err(PlanForgeError::Hook(format!("{} is blocked", demand.name)))
//!         } else {
//!             Ok(())
//!         }
//!     })
//!     .on_flow(|flow, _state| Ok(flow.quantity_per >= 1.0));
//! # let _ = hooks;
//! ```

use std::fmt::{self, Debug};

use planforge_core::{Buffer, Demand, Flow, Operation, Resource, Result};

use crate::state::State;

/// Callbacks invoked by the solving rules.
///
/// Every method defaults to accepting, so implementations override only
/// what they need.
pub trait SolverHooks: Send + Sync + Debug {
    /// Consulted for the producing flow of each alternate; returns false to
    /// skip that alternate.
    fn flow(&self, _flow: &Flow, _state: &State) -> Result<bool> {
        Ok(true)
    }

    fn demand(&self, _demand: &Demand, _state: &State) -> Result<()> {
        Ok(())
    }

    fn buffer(&self, _buffer: &Buffer, _state: &State) -> Result<()> {
        Ok(())
    }

    fn resource(&self, _resource: &Resource, _state: &State) -> Result<()> {
        Ok(())
    }

    fn operation(&self, _operation: &Operation, _state: &State) -> Result<()> {
        Ok(())
    }
}

/// Hooks that accept everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl SolverHooks for NoHooks {}

type FlowHook = Box<dyn Fn(&Flow, &State) -> Result<bool> + Send + Sync>;
type DemandHook = Box<dyn Fn(&Demand, &State) -> Result<()> + Send + Sync>;
type BufferHook = Box<dyn Fn(&Buffer, &State) -> Result<()> + Send + Sync>;
type ResourceHook = Box<dyn Fn(&Resource, &State) -> Result<()> + Send + Sync>;
type OperationHook = Box<dyn Fn(&Operation, &State) -> Result<()> + Send + Sync>;

/// Hooks built from closures.
#[derive(Default)]
pub struct HookSet {
    flow: Option<FlowHook>,
    demand: Option<DemandHook>,
    buffer: Option<BufferHook>,
    resource: Option<ResourceHook>,
    operation: Option<OperationHook>,
}

impl HookSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_flow<F>(mut self, f: F) -> Self
    where
        F: Fn(&Flow, &State) -> Result<bool> + Send + Sync + 'static,
    {
        self.flow = Some(Box::new(f));
        self
    }

    pub fn on_demand<F>(mut self, f: F) -> Self
    where
        F: Fn(&Demand, &State) -> Result<()> + Send + Sync + 'static,
    {
        self.demand = Some(Box::new(f));
        self
    }

    pub fn on_buffer<F>(mut self, f: F) -> Self
    where
        F: Fn(&Buffer, &State) -> Result<()> + Send + Sync + 'static,
    {
        self.buffer = Some(Box::new(f));
        self
    }

    pub fn on_resource<F>(mut self, f: F) -> Self
    where
        F: Fn(&Resource, &State) -> Result<()> + Send + Sync + 'static,
    {
        self.resource = Some(Box::new(f));
        self
    }

    pub fn on_operation<F>(mut self, f: F) -> Self
    where
        F: Fn(&Operation, &State) -> Result<()> + Send + Sync + 'static,
    {
        self.operation = Some(Box::new(f));
        self
    }
}

impl Debug for HookSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookSet")
            .field("flow", &self.flow.is_some())
            .field("demand", &self.demand.is_some())
            .field("buffer", &self.buffer.is_some())
            .field("resource", &self.resource.is_some())
            .field("operation", &self.operation.is_some())
            .finish()
    }
}

impl SolverHooks for HookSet {
    fn flow(&self, flow: &Flow, state: &State) -> Result<bool> {
        self.flow.as_ref().map_or(Ok(true), |f| f(flow, state))
    }

    fn demand(&self, demand: &Demand, state: &State) -> Result<()> {
        self.demand.as_ref().map_or(Ok(()), |f| f(demand, state))
    }

    fn buffer(&self, buffer: &Buffer, state: &State) -> Result<()> {
        self.buffer.as_ref().map_or(Ok(()), |f| f(buffer, state))
    }

    fn resource(&self, resource: &Resource, state: &State) -> Result<()> {
        self.resource.as_ref().map_or(Ok(()), |f| f(resource, state))
    }

    fn operation(&self, operation: &Operation, state: &State) -> Result<()> {
        self.operation.as_ref().map_or(Ok(()), |f| f(operation, state))
    }
}
