//! Capacity relocation: the nearest slot with free capacity.
//!
//! The search only has to probe the dates where the set of overlapping load
//! plans changes. Moving a plan earlier only frees capacity when its end
//! passes the start of another load plan, and moving it later only frees
//! capacity when its start passes the end of one.

use planforge_core::{ClusterPlan, Date, PlanId, ResourceId, ROUNDING_ERROR};
use smallvec::SmallVec;

/// Placement request for one load plan.
#[derive(Debug, Clone, Copy)]
pub struct SlotRequest {
    pub resource: ResourceId,
    /// Plan to move; its own load plans are ignored.
    pub plan: PlanId,
    pub usage: f64,
    pub capacity: f64,
    pub start: Date,
    pub end: Date,
    /// Lower bound on the start of the slot.
    pub earliest_start: Date,
    /// Upper bound on the end of the slot.
    pub latest_end: Date,
    /// Search forward only.
    pub force_late: bool,
}

impl SlotRequest {
    fn fits(&self, plan: &ClusterPlan, start: Date, end: Date) -> bool {
        plan.peak_usage(self.resource, start, end, Some(self.plan)) + self.usage
            <= self.capacity + ROUNDING_ERROR
    }
}

/// Returns true when the request fits where it is.
pub fn fits_in_place(plan: &ClusterPlan, request: &SlotRequest) -> bool {
    request.fits(plan, request.start, request.end)
}

/// Finds the nearest `(start, end)` slot with enough free capacity.
///
/// Searches backward from the current position first, unless the request
/// is forced late, and forward when no earlier slot exists. Returns `None`
/// when the horizon is saturated.
pub fn find_slot(plan: &ClusterPlan, request: &SlotRequest) -> Option<(Date, Date)> {
    let duration = request.end - request.start;
    let others = plan
        .load_plans(request.resource)
        .iter()
        .filter(|lp| lp.plan != request.plan);

    if !request.force_late {
        let mut ends: SmallVec<[Date; 16]> = others
            .clone()
            .map(|lp| lp.start)
            .filter(|&start| start < request.end)
            .collect();
        ends.sort_unstable_by(|a, b| b.cmp(a));
        ends.dedup();
        for end in ends {
            let start = end - duration;
            if start < request.earliest_start {
                break;
            }
            if request.fits(plan, start, end) {
                return Some((start, end));
            }
        }
    }

    let mut starts: SmallVec<[Date; 16]> = others
        .map(|lp| lp.end)
        .filter(|&end| end > request.start)
        .collect();
    starts.sort_unstable();
    starts.dedup();
    for start in starts {
        let start = start.max(request.earliest_start);
        let end = start + duration;
        if end > request.latest_end {
            break;
        }
        if request.fits(plan, start, end) {
            return Some((start, end));
        }
    }
    None
}
