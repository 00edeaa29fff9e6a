//! Plan problem detection.
//!
//! Problems describe where a plan violates a demand, a resource or a buffer.
//! Constrained runs avoid most of them; unconstrained plan types report
//! them instead of solving them.

use std::fmt;

use planforge_core::{
    BufferId, BufferKind, Date, DemandId, Model, PlanId, ResourceId, ResourceKind, TimePeriod,
    ROUNDING_ERROR,
};

/// A violation in the current plan.
#[derive(Debug, Clone, PartialEq)]
pub enum Problem {
    /// Less than the demanded quantity is planned.
    DemandShort { demand: DemandId, missing: f64 },
    /// The last delivery ends after the due date.
    DemandLate { demand: DemandId, delay: TimePeriod },
    /// Concurrent usage above capacity from `date` on.
    CapacityOverload {
        resource: ResourceId,
        date: Date,
        usage: f64,
        capacity: f64,
    },
    /// Projected inventory drops below zero at `date`.
    MaterialShortage {
        buffer: BufferId,
        date: Date,
        level: f64,
    },
    /// An unlocked plan starts before the current date.
    BeforeCurrent { plan: PlanId, start: Date },
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Problem::DemandShort { demand, missing } => {
                write!(f, "{demand} short by {missing}")
            }
            Problem::DemandLate { demand, delay } => write!(f, "{demand} late by {delay}"),
            Problem::CapacityOverload {
                resource,
                date,
                usage,
                capacity,
            } => write!(f, "{resource} overloaded at {date}: {usage} of {capacity}"),
            Problem::MaterialShortage {
                buffer,
                date,
                level,
            } => write!(f, "{buffer} short at {date}: level {level}"),
            Problem::BeforeCurrent { plan, start } => {
                write!(f, "{plan} starts in the past at {start}")
            }
        }
    }
}

/// Lists the problems of the current plan: demands first, then resources,
/// buffers and plans.
pub fn find_problems(model: &Model) -> Vec<Problem> {
    let network = model.network();
    let mut problems = Vec::new();

    for report in model.demand_report() {
        let missing = report.quantity - report.planned;
        if missing > ROUNDING_ERROR {
            problems.push(Problem::DemandShort {
                demand: report.demand,
                missing,
            });
        }
        if report.lateness.is_positive() {
            problems.push(Problem::DemandLate {
                demand: report.demand,
                delay: report.lateness,
            });
        }
    }

    for (id, resource) in network.resources() {
        if resource.kind == ResourceKind::Infinite {
            continue;
        }
        let Some(plan) = model.cluster(resource.cluster) else {
            continue;
        };
        let load_plans = plan.load_plans(id);
        let mut starts: Vec<Date> = load_plans.iter().map(|lp| lp.start).collect();
        starts.sort_unstable();
        starts.dedup();
        for date in starts {
            let usage: f64 = load_plans
                .iter()
                .filter(|lp| lp.start <= date && date < lp.end)
                .map(|lp| lp.usage)
                .sum();
            if usage > resource.capacity + ROUNDING_ERROR {
                problems.push(Problem::CapacityOverload {
                    resource: id,
                    date,
                    usage,
                    capacity: resource.capacity,
                });
            }
        }
    }

    for (id, buffer) in network.buffers() {
        if buffer.kind == BufferKind::Infinite {
            continue;
        }
        let Some(plan) = model.cluster(buffer.cluster) else {
            continue;
        };
        let mut level = buffer.onhand;
        let mut short = level < -ROUNDING_ERROR;
        for (date, delta) in plan.movements_after(id, Date::INFINITE_PAST) {
            level += delta;
            let now_short = level < -ROUNDING_ERROR;
            if now_short && !short {
                problems.push(Problem::MaterialShortage {
                    buffer: id,
                    date,
                    level,
                });
            }
            short = now_short;
        }
    }

    let current = network.current();
    for cluster in model.clusters() {
        let mut early: Vec<(PlanId, Date)> = cluster
            .plans()
            .filter(|p| !p.locked && p.start < current)
            .map(|p| (p.id, p.start))
            .collect();
        early.sort_unstable_by_key(|&(id, _)| id);
        problems.extend(
            early
                .into_iter()
                .map(|(plan, start)| Problem::BeforeCurrent { plan, start }),
        );
    }

    problems
}
