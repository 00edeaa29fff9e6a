//! Capacity rules.

use planforge_core::{LoadId, PlanForgeError, ResourceId, Result, ROUNDING_ERROR};
use tracing::{debug, trace};

use crate::relocate::{find_slot, fits_in_place, SlotRequest};
use crate::scope::ClusterScope;

/// Resources without a capacity limit accept every plan where it is.
pub(super) fn solve_infinite(scope: &mut ClusterScope<'_>, resource: ResourceId) -> Result<()> {
    scope.hooks.resource(scope.network.resource(resource), scope.top())?;
    let (q_qty, q_date) = (scope.top().q_qty, scope.top().q_date);
    scope.answer(q_qty, q_date);
    Ok(())
}

/// Checks the load of the asked plan against the resource capacity.
///
/// An overloaded plan moves to the nearest slot with free capacity: earlier
/// first unless the request is forced late, then later. The answer date is
/// the end of the plan where it ends up. With no slot left before the end
/// of the horizon the answer is zero at the horizon end.
pub(super) fn solve_default(
    scope: &mut ClusterScope<'_>,
    resource_id: ResourceId,
    load_id: LoadId,
) -> Result<()> {
    let network = scope.network;
    let resource = network.resource(resource_id);
    scope.hooks.resource(resource, scope.top())?;

    let top = scope.top();
    let (q_qty, q_date, force_late) = (top.q_qty, top.q_date, top.force_late);
    let Some(plan_id) = top.q_operationplan else {
        return Err(PlanForgeError::Internal(format!(
            "capacity of '{}' asked without a plan",
            resource.name
        )));
    };
    if !scope.capacity_constrained() {
        scope.answer(q_qty, q_date);
        return Ok(());
    }

    let load = network.load(load_id);
    let (start, end) = match scope.plan.plan(plan_id) {
        Some(plan) => (plan.start, plan.end),
        None => return Err(PlanForgeError::Internal(format!("{plan_id} vanished while loading"))),
    };
    let request = SlotRequest {
        resource: resource_id,
        plan: plan_id,
        usage: load.usage,
        capacity: resource.capacity,
        start,
        end,
        earliest_start: scope.earliest_start(network.operation(load.operation).fence),
        latest_end: network.horizon_end(),
        force_late,
    };

    if fits_in_place(scope.plan(), &request) {
        scope.answer(q_qty, end);
        return Ok(());
    }
    if load.usage > resource.capacity + ROUNDING_ERROR {
        if scope.logs_state() {
            trace!(event = "never_fits", resource = %resource.name, usage = load.usage);
        }
        scope.answer(0.0, network.horizon_end());
        return Ok(());
    }

    match find_slot(scope.plan(), &request) {
        Some((new_start, new_end)) => {
            scope.move_plan(plan_id, new_start, new_end);
            scope.stats.relocations += 1;
            if scope.logs_asks() {
                debug!(
                    event = "relocate",
                    resource = %resource.name,
                    from = %end,
                    to = %new_end,
                );
            }
            scope.answer(q_qty, new_end);
        }
        None => scope.answer(0.0, network.horizon_end()),
    }
    Ok(())
}
