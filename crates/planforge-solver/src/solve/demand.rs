//! Demand rule: deliver the order, on time or as early as possible after.

use planforge_core::{DemandId, PlanForgeError, Result, ROUNDING_ERROR};
use tracing::debug;

use crate::scope::ClusterScope;

/// Upper bound on delivery attempts for one demand.
const MAX_ATTEMPTS: usize = 1000;

/// Plans a demand through its delivery operation and returns the quantity
/// planned.
///
/// The full quantity is asked at the due date first. Whatever cannot be
/// delivered then is asked again at the date the reply proposes, or after
/// the lazy delay when the reply has no useful date, until the quantity is
/// planned or the next date lies past the maximum lateness or the horizon.
/// Retries search capacity forward only. Answers smaller than the minimum
/// shipment are refused.
pub(crate) fn solve_demand(scope: &mut ClusterScope<'_>, demand_id: DemandId) -> Result<f64> {
    let network = scope.network;
    let demand = network.demand(demand_id);
    scope.stack.reset_root();
    scope.stack.top_mut().cur_demand = Some(demand_id);
    scope.hooks.demand(demand, scope.top())?;

    let Some(delivery) = demand.delivery else {
        return Err(PlanForgeError::DomainModel(format!(
            "demand '{}' has no delivery operation",
            demand.name
        )));
    };

    let deadline = demand.deadline().min(network.horizon_end());
    let lazy_delay = scope.config.lazy_delay_period();
    let mut remaining = demand.quantity;
    let mut planned = 0.0;
    let mut date = demand.due;
    let mut force_late = false;

    for _ in 0..MAX_ATTEMPTS {
        if remaining <= ROUNDING_ERROR {
            break;
        }
        scope.stack.top_mut().force_late = force_late;
        let savepoint = scope.savepoint();
        let reply = scope.ask_operation(delivery, remaining, date, Some(demand_id), None)?;

        let acceptable = reply.quantity > ROUNDING_ERROR
            && reply.quantity >= demand.min_shipment.min(remaining) - ROUNDING_ERROR;
        if acceptable {
            planned += reply.quantity;
            remaining -= reply.quantity;
            scope.stats.cost += reply.cost;
            scope.stats.penalty += reply.penalty;
            if remaining <= ROUNDING_ERROR {
                break;
            }
        } else {
            scope.rollback_to(savepoint);
        }

        let next = if reply.date > date && !reply.date.is_infinite() {
            reply.date
        } else {
            date + lazy_delay
        };
        if next > deadline {
            break;
        }
        if scope.logs_asks() {
            debug!(
                event = "demand_retry",
                demand = %demand.name,
                remaining,
                from = %date,
                to = %next,
            );
        }
        date = next;
        force_late = true;
    }

    Ok(planned)
}
