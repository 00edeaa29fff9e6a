//! Rules for fixed-time, routing and alternate operations.

use planforge_config::PlanType;
use planforge_core::{
    BufferId, Date, DemandId, Network, Operation, OperationId, OperationKind, PlanForgeError,
    PlanId, Result, ROUNDING_ERROR,
};
use smallvec::SmallVec;
use tracing::trace;

use super::{round_down, round_up};
use crate::scope::ClusterScope;
use crate::state::Reply;

/// Planning rounds per request before the rule gives up.
const MAX_ROUNDS: usize = 8;

/// Smallest valid plan size covering `quantity`.
fn size_up(op: &Operation, quantity: f64) -> f64 {
    if quantity <= ROUNDING_ERROR {
        return 0.0;
    }
    round_up(quantity.max(op.size_minimum), op.size_multiple)
}

/// Largest valid plan size not above `quantity`, or zero.
fn size_down(op: &Operation, quantity: f64) -> f64 {
    let sized = round_down(quantity, op.size_multiple);
    if sized <= ROUNDING_ERROR || sized < op.size_minimum - ROUNDING_ERROR {
        0.0
    } else {
        sized
    }
}

fn plan_dates(scope: &ClusterScope<'_>, plan: PlanId) -> Result<(Date, Date)> {
    scope
        .plan
        .plan(plan)
        .map(|p| (p.start, p.end))
        .ok_or_else(|| PlanForgeError::Internal(format!("{plan} vanished while planning")))
}

/// Earliness penalty of supply arriving at `available` for a need at `needed`.
fn early_penalty(scope: &ClusterScope<'_>, quantity: f64, available: Date, needed: Date) -> f64 {
    match scope.top().cur_buffer {
        Some(buffer) if available < needed && !needed.is_infinite() => {
            scope.network.buffer(buffer).carrying_cost * quantity * (needed - available).as_days()
        }
        _ => 0.0,
    }
}

/// Result of one planning round of a fixed-time operation.
enum Attempt {
    /// The plan cannot exist in time; more may be possible at the date.
    Infeasible(Date),
    Planned(Round),
}

struct Round {
    plan: PlanId,
    end: Date,
    /// Fraction of the plan its materials support.
    ratio: f64,
    /// Date the missing materials can be available, shifted to the
    /// operation's answer date.
    next_date: Date,
    cost: f64,
    penalty: f64,
}

/// Plans a fixed-time operation for the request of the top frame.
///
/// The plan is created at the asked date minus post time, fitted on its
/// resources and then supplied with material. Partial material answers
/// shrink the plan and retry; capacity or date violations reject it.
pub(super) fn solve_fixed_time(scope: &mut ClusterScope<'_>, op_id: OperationId) -> Result<()> {
    let network = scope.network;
    let op = network.operation(op_id);
    scope.hooks.operation(op, scope.top())?;

    let top = scope.top();
    let (q_qty, q_date, q_date_max) = (top.q_qty, top.q_date, top.q_date_max);
    let (demand, owner) = (top.q_demand, top.q_owner);

    let mut quantity = size_up(op, q_qty);
    if quantity <= ROUNDING_ERROR {
        scope.answer(0.0, q_date);
        return Ok(());
    }

    let mut end = q_date - op.post_time;
    let earliest = scope.earliest_start(op.fence);
    if end - op.duration < earliest {
        end = earliest + op.duration;
        if end + op.post_time > q_date_max {
            if scope.logs_state() {
                trace!(event = "too_late", operation = %op.name, earliest = %earliest);
            }
            scope.answer(0.0, end + op.post_time);
            return Ok(());
        }
    }

    let savepoint = scope.savepoint();
    let mut next_date: Option<Date> = None;
    for _ in 0..MAX_ROUNDS {
        let round = match plan_fixed_time(scope, op_id, quantity, end, demand, owner, q_date_max)? {
            Attempt::Infeasible(date) => {
                scope.rollback_to(savepoint);
                scope.answer(0.0, next_date.unwrap_or(date));
                return Ok(());
            }
            Attempt::Planned(round) => round,
        };

        if round.ratio >= 1.0 - ROUNDING_ERROR || !scope.material_constrained() {
            let answered = quantity.min(q_qty);
            let available = round.end + op.post_time;
            let penalty = round.penalty + early_penalty(scope, quantity, available, q_date);
            let date = match next_date {
                Some(next) if answered < q_qty - ROUNDING_ERROR => next,
                _ => available,
            };
            scope.set_answer_plan(round.plan);
            scope.answer(answered, date);
            scope.add_cost(round.cost, penalty);
            return Ok(());
        }

        scope.rollback_to(savepoint);
        let next = *next_date.get_or_insert(round.next_date);
        let reduced = size_down(op, quantity * round.ratio);
        if reduced <= ROUNDING_ERROR || reduced >= quantity - ROUNDING_ERROR {
            scope.answer(0.0, next);
            return Ok(());
        }
        quantity = reduced;
    }

    scope.rollback_to(savepoint);
    scope.answer(0.0, next_date.unwrap_or(Date::INFINITE_FUTURE));
    Ok(())
}

fn plan_fixed_time(
    scope: &mut ClusterScope<'_>,
    op_id: OperationId,
    quantity: f64,
    end: Date,
    demand: Option<DemandId>,
    owner: Option<PlanId>,
    q_date_max: Date,
) -> Result<Attempt> {
    let network = scope.network;
    let op = network.operation(op_id);
    let plan = scope.create_plan(op_id, quantity, end, demand, owner);

    // A relocation on one resource may break the fit on another, so the
    // loads are asked until a full round leaves the plan in place.
    let mut settled = op.loads.is_empty();
    for _ in 0..MAX_ROUNDS {
        let mut moved = false;
        for &load in &op.loads {
            let before = plan_dates(scope, plan)?;
            let reply = scope.ask_load(load, plan, quantity, before.1)?;
            if reply.quantity <= ROUNDING_ERROR {
                return Ok(Attempt::Infeasible(reply.date + op.post_time));
            }
            moved |= plan_dates(scope, plan)? != before;
        }
        if !moved {
            settled = true;
            break;
        }
    }

    let (start, end) = plan_dates(scope, plan)?;
    if !settled {
        if scope.logs_state() {
            trace!(event = "unsettled", operation = %op.name, end = %end);
        }
        return Ok(Attempt::Infeasible(end + op.post_time));
    }
    if end + op.post_time > q_date_max {
        return Ok(Attempt::Infeasible(end + op.post_time));
    }

    let mut cost = op.cost * quantity;
    for &load in &op.loads {
        let load = network.load(load);
        cost += network.resource(load.resource).cost * load.usage * op.duration.as_days();
    }
    let mut penalty = 0.0;
    let mut ratio = 1.0_f64;
    let mut latest_missing = Date::INFINITE_PAST;

    for &flow_id in &op.flows {
        let flow = network.flow(flow_id);
        if !flow.is_consuming() {
            continue;
        }
        let need = -flow.quantity_per * quantity;
        let reply = scope.ask_flow(flow_id, plan, need, start)?;
        cost += reply.cost;
        penalty += reply.penalty;
        if !reply.is_full(need) {
            ratio = ratio.min(reply.quantity / need);
            latest_missing = latest_missing.max(reply.date);
        }
    }

    let next_date = if latest_missing == Date::INFINITE_PAST {
        Date::INFINITE_FUTURE
    } else {
        latest_missing + op.duration + op.post_time
    };
    Ok(Attempt::Planned(Round {
        plan,
        end,
        ratio,
        next_date,
        cost,
        penalty,
    }))
}

/// Plans a routing: the steps back to back, last step first.
///
/// The parent plan spans its steps. A step that cannot deliver the full
/// quantity shrinks the whole routing, and its delay shifts the date the
/// routing can deliver more.
pub(super) fn solve_routing(scope: &mut ClusterScope<'_>, op_id: OperationId) -> Result<()> {
    let network = scope.network;
    let op = network.operation(op_id);
    let OperationKind::Routing { steps } = &op.kind else {
        return Err(PlanForgeError::Internal(format!("'{}' is not a routing", op.name)));
    };
    if steps.is_empty() {
        return solve_fixed_time(scope, op_id);
    }
    scope.hooks.operation(op, scope.top())?;

    let top = scope.top();
    let (q_qty, q_date, q_date_max) = (top.q_qty, top.q_date, top.q_date_max);
    let (demand, owner) = (top.q_demand, top.q_owner);

    let mut quantity = size_up(op, q_qty);
    if quantity <= ROUNDING_ERROR {
        scope.answer(0.0, q_date);
        return Ok(());
    }
    let wanted_end = q_date - op.post_time;

    let savepoint = scope.savepoint();
    let mut next_date: Option<Date> = None;
    for _ in 0..MAX_ROUNDS {
        let parent = scope.create_plan(op_id, quantity, wanted_end, demand, owner);
        let mut date = wanted_end;
        let mut span: Option<(Date, Date)> = None;
        let mut cost = op.cost * quantity;
        let mut penalty = 0.0;
        let mut shortfall: Option<(f64, Date)> = None;

        for &step in steps.iter().rev() {
            let reply = scope.ask_operation(step, quantity, date, None, Some(parent))?;
            cost += reply.cost;
            penalty += reply.penalty;
            if !reply.is_full(quantity) {
                shortfall = Some((reply.quantity / quantity, q_date + (reply.date - date)));
                break;
            }
            let (start, end) = match reply.plan {
                Some(id) => plan_dates(scope, id)?,
                None => (date, date),
            };
            span = Some(match span {
                Some((_, last_end)) => (start, last_end),
                None => (start, end),
            });
            date = start;
        }

        match shortfall {
            None => {
                let (start, end) = span.unwrap_or((wanted_end, wanted_end));
                scope.move_plan(parent, start, end);
                let available = end + op.post_time;
                if available > q_date_max {
                    scope.rollback_to(savepoint);
                    scope.answer(0.0, next_date.unwrap_or(available));
                    return Ok(());
                }
                let answered = quantity.min(q_qty);
                let date = match next_date {
                    Some(next) if answered < q_qty - ROUNDING_ERROR => next,
                    _ => available,
                };
                scope.set_answer_plan(parent);
                scope.answer(answered, date);
                scope.add_cost(cost, penalty);
                return Ok(());
            }
            Some((ratio, next)) => {
                scope.rollback_to(savepoint);
                let next = *next_date.get_or_insert(next);
                let reduced = size_down(op, quantity * ratio);
                if reduced <= ROUNDING_ERROR || reduced >= quantity - ROUNDING_ERROR {
                    scope.answer(0.0, next);
                    return Ok(());
                }
                quantity = reduced;
            }
        }
    }

    scope.rollback_to(savepoint);
    scope.answer(0.0, next_date.unwrap_or(Date::INFINITE_FUTURE));
    Ok(())
}

/// Units of the buffer one unit of `operation` produces.
fn production_factor(network: &Network, operation: OperationId, buffer: Option<BufferId>) -> f64 {
    buffer
        .and_then(|b| network.producing_flow(operation, b))
        .map_or(1.0, |f| network.flow(f).quantity_per)
}

/// Running totals of an alternate split.
struct Split {
    residual: f64,
    next: Date,
    cost: f64,
    penalty: f64,
    plan: Option<PlanId>,
}

/// Plans an alternate operation: alternates in priority order, each asked
/// for what the previous ones left open.
///
/// Under an unconstrained plan type with search, the search itself runs
/// constrained and whatever remains is booked on the preferred alternate
/// without constraints.
pub(super) fn solve_alternate(scope: &mut ClusterScope<'_>, op_id: OperationId) -> Result<()> {
    let network = scope.network;
    let op = network.operation(op_id);
    let OperationKind::Alternate { alternates } = &op.kind else {
        return Err(PlanForgeError::Internal(format!("'{}' is not an alternate", op.name)));
    };
    scope.hooks.operation(op, scope.top())?;

    let top = scope.top();
    let (q_qty, q_date) = (top.q_qty, top.q_date);
    let (demand, owner, buffer) = (top.q_demand, top.q_owner, top.cur_buffer);

    let mut candidates: SmallVec<[(OperationId, u32); 4]> = alternates
        .iter()
        .copied()
        .filter(|&(_, priority)| priority > 0)
        .collect();
    // Stable: equal priorities keep their declaration order.
    candidates.sort_by_key(|&(_, priority)| priority);

    if q_qty <= ROUNDING_ERROR {
        scope.answer(0.0, q_date);
        return Ok(());
    }
    let Some(&(primary, _)) = candidates.first() else {
        scope.answer(0.0, Date::INFINITE_FUTURE);
        return Ok(());
    };

    let date = q_date - op.post_time;
    let mut split = Split {
        residual: q_qty,
        next: Date::INFINITE_FUTURE,
        cost: 0.0,
        penalty: 0.0,
        plan: None,
    };

    let plan_type = scope.config.plan_type;
    if plan_type != PlanType::UnconstrainedWithoutSearch {
        let previous = scope.set_constrained(true);
        let searched = search_alternates(scope, &candidates, buffer, date, demand, owner, &mut split);
        scope.set_constrained(previous);
        searched?;
    }

    if split.residual > ROUNDING_ERROR && plan_type.is_unconstrained() {
        let factor = production_factor(network, primary, buffer);
        let asked = split.residual / factor;
        let reply = scope.ask_operation(primary, asked, date, demand, owner)?;
        accumulate(&mut split, asked, factor, &reply);
    }

    let answered = (q_qty - split.residual).max(0.0);
    if let Some(plan) = split.plan {
        scope.set_answer_plan(plan);
    }
    let answer_date = if split.residual > ROUNDING_ERROR {
        split.next + op.post_time
    } else {
        q_date
    };
    scope.answer(answered, answer_date);
    scope.add_cost(split.cost, split.penalty);
    Ok(())
}

fn search_alternates(
    scope: &mut ClusterScope<'_>,
    candidates: &[(OperationId, u32)],
    buffer: Option<BufferId>,
    date: Date,
    demand: Option<DemandId>,
    owner: Option<PlanId>,
    split: &mut Split,
) -> Result<()> {
    let network = scope.network;
    for &(alternate, _) in candidates {
        if split.residual <= ROUNDING_ERROR {
            break;
        }
        if let Some(flow) = buffer.and_then(|b| network.producing_flow(alternate, b)) {
            if !scope.hooks.flow(network.flow(flow), scope.top())? {
                continue;
            }
        }

        let factor = production_factor(network, alternate, buffer);
        let asked = split.residual / factor;
        let reply = scope.ask_operation(alternate, asked, date, demand, owner)?;
        accumulate(split, asked, factor, &reply);
    }
    Ok(())
}

fn accumulate(split: &mut Split, asked: f64, factor: f64, reply: &Reply) {
    split.cost += reply.cost;
    split.penalty += reply.penalty;
    split.residual -= reply.quantity * factor;
    if reply.quantity > ROUNDING_ERROR && split.plan.is_none() {
        split.plan = reply.plan;
    }
    if !reply.is_full(asked) {
        split.next = split.next.min(reply.date);
    }
}
