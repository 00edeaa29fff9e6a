//! Rules for default, infinite and procurement buffers.

use planforge_core::{
    BufferId, BufferKind, Date, Network, OperationId, OperationKind, PlanForgeError, PlanId,
    Result, TimePeriod, ROUNDING_ERROR,
};
use tracing::trace;

use super::{round_down, round_up};
use crate::scope::ClusterScope;

/// Infinite buffers answer every request in full.
pub(super) fn solve_infinite(scope: &mut ClusterScope<'_>, buffer_id: BufferId) -> Result<()> {
    scope.hooks.buffer(scope.network.buffer(buffer_id), scope.top())?;
    let (q_qty, q_date) = (scope.top().q_qty, scope.top().q_date);
    scope.answer(q_qty, q_date);
    Ok(())
}

/// Units of `buffer` one unit of `producer` yields.
///
/// A routing produces through the first of its steps with a flow into the
/// buffer.
fn production_factor(network: &Network, producer: OperationId, buffer: BufferId) -> f64 {
    let flow = network.producing_flow(producer, buffer).or_else(|| {
        match &network.operation(producer).kind {
            OperationKind::Routing { steps } => steps
                .iter()
                .find_map(|&step| network.producing_flow(step, buffer)),
            _ => None,
        }
    });
    flow.map_or(1.0, |f| network.flow(f).quantity_per)
}

/// Replenishment asked from the producing operation, in buffer units.
struct Supply {
    quantity: f64,
    date: Date,
    cost: f64,
    penalty: f64,
}

fn ask_producer(
    scope: &mut ClusterScope<'_>,
    producer: OperationId,
    buffer_id: BufferId,
    quantity: f64,
    date: Date,
) -> Result<Supply> {
    let factor = production_factor(scope.network, producer, buffer_id);
    let reply = scope.ask_operation(producer, quantity / factor, date, None, None)?;
    Ok(Supply {
        quantity: reply.quantity * factor,
        date: reply.date,
        cost: reply.cost,
        penalty: reply.penalty,
    })
}

/// Replenishes a default buffer from its producing operation.
///
/// The request is consumed at the asked date already. The buffer then asks
/// its producer for whatever drops the projected inventory below zero from
/// that date on, or below the safety stock when the producer can cover
/// that as well.
pub(super) fn solve_default(scope: &mut ClusterScope<'_>, buffer_id: BufferId) -> Result<()> {
    let network = scope.network;
    let buffer = network.buffer(buffer_id);
    scope.hooks.buffer(buffer, scope.top())?;

    let (q_qty, q_date) = (scope.top().q_qty, scope.top().q_date);
    let after = scope.plan.min_inventory_from(network, buffer_id, q_date);
    let shortage = (-after).max(0.0);
    let wish = (buffer.minimum - after).max(0.0);
    if scope.logs_state() {
        trace!(
            event = "buffer",
            buffer = %buffer.name,
            level = after,
            shortage,
            minimum = buffer.minimum,
        );
    }

    if wish <= ROUNDING_ERROR {
        scope.answer(q_qty, q_date);
        return Ok(());
    }

    let Some(producer) = buffer.producing else {
        if shortage > ROUNDING_ERROR && scope.material_constrained() {
            scope.answer((q_qty - shortage).max(0.0), Date::INFINITE_FUTURE);
        } else {
            scope.answer(q_qty, q_date);
        }
        return Ok(());
    };

    let mut cost = 0.0;
    let mut penalty = 0.0;

    // Safety stock is only topped up when the shortage fits in the same
    // replenishment.
    if wish > shortage + ROUNDING_ERROR {
        let savepoint = scope.savepoint();
        let supply = ask_producer(scope, producer, buffer_id, wish, q_date)?;
        if supply.quantity >= shortage - ROUNDING_ERROR {
            scope.answer(q_qty, q_date);
            scope.add_cost(supply.cost, supply.penalty);
            return Ok(());
        }
        scope.rollback_to(savepoint);
    }

    let mut missing = shortage;
    let mut next = Date::INFINITE_FUTURE;
    if shortage > ROUNDING_ERROR {
        let supply = ask_producer(scope, producer, buffer_id, shortage, q_date)?;
        missing -= supply.quantity;
        next = supply.date;
        cost += supply.cost;
        penalty += supply.penalty;
    }

    if missing > ROUNDING_ERROR && scope.material_constrained() {
        scope.answer((q_qty - missing).max(0.0), next);
    } else {
        scope.answer(q_qty, q_date);
    }
    scope.add_cost(cost, penalty);
    Ok(())
}

/// A purchase as seen while placing a new one.
#[derive(Debug, Clone, Copy)]
struct Purchase {
    id: PlanId,
    end: Date,
    quantity: f64,
    locked: bool,
}

/// Where the replenishment of a procurement buffer lands.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Placement {
    /// A new purchase received at the date.
    New(Date),
    /// Added to an existing purchase, received at the date.
    Merge { id: PlanId, quantity: f64, end: Date, moved_from: Date },
}

impl Placement {
    fn arrival(&self) -> Date {
        match *self {
            Placement::New(date) => date,
            Placement::Merge { end, .. } => end,
        }
    }
}

/// Replenishes a procurement buffer with purchases.
///
/// A purchase is proposed when the projected inventory drops below the
/// minimum from the asked date on, or when the maximum interval since the
/// last purchase has passed. It tops the buffer up to its maximum (or its
/// minimum when no maximum is set), rounded to the batch size. Purchases
/// respect lead time, release fence and the minimum interval between
/// receipts; an order that would arrive too close to another is merged
/// into it where its maximum size allows.
pub(super) fn solve_procure(scope: &mut ClusterScope<'_>, buffer_id: BufferId) -> Result<()> {
    let network = scope.network;
    let buffer = network.buffer(buffer_id);
    let BufferKind::Procure(policy) = &buffer.kind else {
        return Err(PlanForgeError::Internal(format!("'{}' is not a procurement buffer", buffer.name)));
    };
    policy.validate(&buffer.name)?;
    scope.hooks.buffer(buffer, scope.top())?;

    let (q_qty, q_date) = (scope.top().q_qty, scope.top().q_date);
    let after = scope.plan.min_inventory_from(network, buffer_id, q_date);
    let shortage = (-after).max(0.0);
    let target = if buffer.maximum > 0.0 {
        buffer.maximum
    } else {
        buffer.minimum
    };

    let purchases: Vec<Purchase> = scope
        .plan
        .purchases(buffer_id)
        .into_iter()
        .map(|p| Purchase {
            id: p.id,
            end: p.end,
            quantity: p.quantity,
            locked: p.locked,
        })
        .collect();

    let overdue = policy.max_interval.is_positive()
        && purchases
            .iter()
            .rev()
            .find(|p| p.end <= q_date)
            .map_or(true, |last| q_date - last.end > policy.max_interval);
    let below_minimum = after < buffer.minimum - ROUNDING_ERROR;
    if !(below_minimum || shortage > ROUNDING_ERROR || (overdue && after < target - ROUNDING_ERROR)) {
        scope.answer(q_qty, q_date);
        return Ok(());
    }

    // The request is already consumed at the asked date.
    let level_before = scope.plan.inventory_at(network, buffer_id, q_date) + q_qty;
    let mut quantity = round_down(target - level_before, policy.size_multiple).max(0.0);
    if quantity < shortage - ROUNDING_ERROR {
        quantity = round_up(shortage, policy.size_multiple);
    }
    quantity = round_up(quantity.max(policy.size_minimum), policy.size_multiple);
    if policy.size_maximum > 0.0 && quantity > policy.size_maximum + ROUNDING_ERROR {
        quantity = round_down(policy.size_maximum, policy.size_multiple);
    }
    if quantity <= ROUNDING_ERROR {
        answer_unreplenished(scope, q_qty, q_date, shortage, Date::INFINITE_FUTURE);
        return Ok(());
    }

    let current = network.current();
    let mut date = q_date;
    if scope.leadtime_constrained() {
        date = date.max(current + policy.leadtime);
    }
    if scope.fence_constrained() {
        date = date.max(current + policy.fence);
    }

    let placement = place(&purchases, policy.min_interval, policy.size_maximum, quantity, date);
    let arrival = placement.arrival();
    if scope.logs_state() {
        trace!(
            event = "purchase",
            buffer = %buffer.name,
            quantity,
            arrival = %arrival,
            shortage,
        );
    }
    if arrival > q_date && shortage > ROUNDING_ERROR && scope.material_constrained() {
        answer_unreplenished(scope, q_qty, q_date, shortage, arrival);
        return Ok(());
    }

    match placement {
        Placement::New(date) => {
            scope.create_purchase(buffer_id, quantity, date, policy.leadtime);
        }
        Placement::Merge {
            id,
            quantity: existing,
            end,
            moved_from,
        } => {
            if end != moved_from {
                scope.move_plan(id, end - policy.leadtime, end);
            }
            scope.resize_plan(id, existing + quantity);
        }
    }

    scope.answer(q_qty, q_date);
    scope.add_cost(quantity * policy.cost, 0.0);
    Ok(())
}

fn answer_unreplenished(
    scope: &mut ClusterScope<'_>,
    q_qty: f64,
    q_date: Date,
    shortage: f64,
    next: Date,
) {
    if shortage > ROUNDING_ERROR && scope.material_constrained() {
        scope.answer((q_qty - shortage).max(0.0), next);
    } else {
        scope.answer(q_qty, q_date);
    }
}

/// Positions a purchase of `quantity` wanted at `date` among the existing
/// purchases, keeping at least `min_interval` between receipts.
///
/// A conflicting unlocked purchase absorbs the new quantity when the merged
/// size stays within `size_maximum` (zero means unbounded); otherwise the
/// new purchase moves past it.
fn place(
    purchases: &[Purchase],
    min_interval: TimePeriod,
    size_maximum: f64,
    quantity: f64,
    mut date: Date,
) -> Placement {
    if !min_interval.is_positive() {
        return Placement::New(date);
    }
    let fits = |p: &Purchase| {
        !p.locked && (size_maximum <= 0.0 || p.quantity + quantity <= size_maximum + ROUNDING_ERROR)
    };

    // Every pass either returns or moves the date past one more purchase.
    for _ in 0..=purchases.len() {
        if let Some(prev) = purchases.iter().rev().find(|p| p.end <= date) {
            if date - prev.end < min_interval {
                if fits(prev) {
                    return Placement::Merge {
                        id: prev.id,
                        quantity: prev.quantity,
                        end: prev.end,
                        moved_from: prev.end,
                    };
                }
                date = prev.end + min_interval;
                continue;
            }
        }
        if let Some(next) = purchases.iter().find(|p| p.end > date) {
            if next.end - date < min_interval {
                if fits(next) {
                    return Placement::Merge {
                        id: next.id,
                        quantity: next.quantity,
                        end: date,
                        moved_from: next.end,
                    };
                }
                date = next.end + min_interval;
                continue;
            }
        }
        break;
    }
    Placement::New(date)
}
