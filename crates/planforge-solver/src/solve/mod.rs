//! Ask-reply solving rules, one per node kind.
//!
//! Every rule reads the request of the top frame, mutates the cluster plan
//! through the scope and writes its answer back into the same frame. Rules
//! recurse by asking downstream nodes through [`ClusterScope`].

mod buffer;
mod demand;
mod operation;
mod resource;

pub(crate) use demand::solve_demand;

use planforge_core::{
    BufferKind, FlowId, LoadId, OperationId, OperationKind, ResourceKind, Result,
    ROUNDING_ERROR,
};

use crate::scope::ClusterScope;

/// Dispatches an operation request to the rule of its kind.
pub(crate) fn solve_operation(scope: &mut ClusterScope<'_>, operation: OperationId) -> Result<()> {
    match scope.network.operation(operation).kind {
        OperationKind::FixedTime => operation::solve_fixed_time(scope, operation),
        OperationKind::Routing { .. } => operation::solve_routing(scope, operation),
        OperationKind::Alternate { .. } => operation::solve_alternate(scope, operation),
    }
}

/// Passes a flow request on to the rule of its buffer.
pub(crate) fn solve_flow(scope: &mut ClusterScope<'_>, flow: FlowId) -> Result<()> {
    let network = scope.network;
    let node = network.flow(flow);
    scope.stack.top_mut().cur_buffer = Some(node.buffer);
    match network.buffer(node.buffer).kind {
        BufferKind::Default => buffer::solve_default(scope, node.buffer),
        BufferKind::Infinite => buffer::solve_infinite(scope, node.buffer),
        BufferKind::Procure(_) => buffer::solve_procure(scope, node.buffer),
    }
}

/// Passes a load request on to the rule of its resource.
pub(crate) fn solve_load(scope: &mut ClusterScope<'_>, load: LoadId) -> Result<()> {
    let network = scope.network;
    let resource = network.load(load).resource;
    match network.resource(resource).kind {
        ResourceKind::Default => resource::solve_default(scope, resource, load),
        ResourceKind::Infinite => resource::solve_infinite(scope, resource),
    }
}

/// Rounds `value` up to a multiple of `multiple`; zero means any size.
pub(crate) fn round_up(value: f64, multiple: f64) -> f64 {
    if multiple > 0.0 {
        (value / multiple - ROUNDING_ERROR).ceil() * multiple
    } else {
        value
    }
}

/// Rounds `value` down to a multiple of `multiple`; zero means any size.
pub(crate) fn round_down(value: f64, multiple: f64) -> f64 {
    if multiple > 0.0 {
        (value / multiple + ROUNDING_ERROR).floor() * multiple
    } else {
        value
    }
}

#[cfg(test)]
mod tests;
