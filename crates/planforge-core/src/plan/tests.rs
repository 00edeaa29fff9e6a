//! Tests for cluster plan state.

use super::*;
use crate::network::{Buffer, Operation, Resource};

struct Fixture {
    network: Network,
    make: OperationId,
    raw: BufferId,
    item: BufferId,
    press: ResourceId,
}

fn fixture() -> Fixture {
    let mut network = Network::new(Date::from_days(0), Date::from_days(100));
    let raw = network.add_buffer(Buffer::new("raw").with_onhand(20.0));
    let item = network.add_buffer(Buffer::new("item"));
    let press = network.add_resource(Resource::new("press", 2.0));
    let make = network.add_operation(Operation::fixed_time("make", TimePeriod::days(2)));
    network.add_flow(make, raw, -2.0).unwrap();
    network.add_flow(make, item, 1.0).unwrap();
    network.add_load(make, press, 1.0).unwrap();
    Fixture {
        network,
        make,
        raw,
        item,
        press,
    }
}

#[test]
fn test_create_operation_plan_dates_flows_and_loads() {
    let f = fixture();
    let mut plan = ClusterPlan::new(ClusterId(0));
    let id = plan.create_operation_plan(&f.network, f.make, 5.0, Date::from_days(10), None, None, false);

    let op_plan = plan.plan(id).unwrap();
    assert_eq!(op_plan.start, Date::from_days(8));
    assert_eq!(op_plan.duration(), TimePeriod::days(2));

    let consumed = &plan.flow_plans(f.raw)[0];
    assert_eq!(consumed.date, Date::from_days(8));
    assert_eq!(consumed.quantity, -10.0);
    let produced = &plan.flow_plans(f.item)[0];
    assert_eq!(produced.date, Date::from_days(10));
    assert_eq!(produced.quantity, 5.0);
    assert_eq!(plan.load_plans(f.press).len(), 1);
}

#[test]
fn test_inventory_projection() {
    let f = fixture();
    let mut plan = ClusterPlan::new(ClusterId(0));
    plan.create_operation_plan(&f.network, f.make, 4.0, Date::from_days(10), None, None, false);

    assert_eq!(plan.inventory_at(&f.network, f.raw, Date::from_days(7)), 20.0);
    assert_eq!(plan.inventory_at(&f.network, f.raw, Date::from_days(8)), 12.0);
    assert_eq!(plan.min_inventory_from(&f.network, f.raw, Date::from_days(0)), 12.0);
}

#[test]
fn test_set_quantity_and_dates_move_timelines() {
    let f = fixture();
    let mut plan = ClusterPlan::new(ClusterId(0));
    let id = plan.create_operation_plan(&f.network, f.make, 4.0, Date::from_days(10), None, None, false);

    assert_eq!(plan.set_quantity(id, 3.0), Some(4.0));
    assert_eq!(plan.flow_plans(f.raw)[0].quantity, -6.0);

    let old = plan.set_dates(id, Date::from_days(4), Date::from_days(6));
    assert_eq!(old, Some((Date::from_days(8), Date::from_days(10))));
    assert_eq!(plan.flow_plans(f.raw)[0].date, Date::from_days(4));
    assert_eq!(plan.flow_plans(f.item)[0].date, Date::from_days(6));
    assert_eq!(plan.load_plans(f.press)[0].end, Date::from_days(6));
}

#[test]
fn test_remove_plan_clears_timelines() {
    let f = fixture();
    let mut plan = ClusterPlan::new(ClusterId(0));
    let id = plan.create_operation_plan(&f.network, f.make, 4.0, Date::from_days(10), None, None, false);

    assert!(plan.remove_plan(id).is_some());
    assert!(plan.remove_plan(id).is_none());
    assert!(plan.flow_plans(f.raw).is_empty());
    assert!(plan.load_plans(f.press).is_empty());
    assert!(plan.is_empty());
}

#[test]
fn test_removed_trailing_plans_free_their_slots() {
    let f = fixture();
    let mut plan = ClusterPlan::new(ClusterId(0));
    let first = plan.create_operation_plan(&f.network, f.make, 1.0, Date::from_days(10), None, None, false);
    let second = plan.create_operation_plan(&f.network, f.make, 1.0, Date::from_days(12), None, None, false);
    let third = plan.create_operation_plan(&f.network, f.make, 1.0, Date::from_days(14), None, None, false);

    plan.remove_plan(second);
    assert_eq!(plan.plans.len(), 3);
    plan.remove_plan(third);
    assert_eq!(plan.plans.len(), 1);

    let reused = plan.create_operation_plan(&f.network, f.make, 2.0, Date::from_days(16), None, None, false);
    assert_eq!(reused, second);
    assert_eq!(plan.plan(reused).unwrap().quantity, 2.0);
    assert_eq!(plan.plan(first).unwrap().end, Date::from_days(10));
    assert_eq!(plan.load_plans(f.press).len(), 2);
}

#[test]
fn test_peak_usage_counts_concurrent_load_only() {
    let f = fixture();
    let mut plan = ClusterPlan::new(ClusterId(0));
    let first = plan.create_operation_plan(&f.network, f.make, 1.0, Date::from_days(10), None, None, false);
    plan.create_operation_plan(&f.network, f.make, 1.0, Date::from_days(11), None, None, false);
    plan.create_operation_plan(&f.network, f.make, 1.0, Date::from_days(14), None, None, false);

    // [8,10) and [9,11) overlap on day 9; [12,14) is separate.
    assert_eq!(plan.peak_usage(f.press, Date::from_days(8), Date::from_days(11), None), 2.0);
    assert_eq!(plan.peak_usage(f.press, Date::from_days(8), Date::from_days(11), Some(first)), 1.0);
    assert_eq!(plan.peak_usage(f.press, Date::from_days(11), Date::from_days(12), None), 0.0);
}

#[test]
fn test_purchases_and_deliveries_are_sorted() {
    let f = fixture();
    let mut plan = ClusterPlan::new(ClusterId(0));
    let late = plan.create_purchase(&f.network, f.raw, 10.0, Date::from_days(9), TimePeriod::days(3), false);
    let early = plan.create_purchase(&f.network, f.raw, 5.0, Date::from_days(4), TimePeriod::days(3), false);
    let ids: Vec<PlanId> = plan.purchases(f.raw).iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![early, late]);
    assert_eq!(plan.plan(early).unwrap().start, Date::from_days(1));

    let demand = DemandId(0);
    plan.create_operation_plan(&f.network, f.make, 2.0, Date::from_days(20), Some(demand), None, false);
    plan.create_operation_plan(&f.network, f.make, 3.0, Date::from_days(15), Some(demand), None, false);
    assert_eq!(plan.delivered(demand), 5.0);
    assert_eq!(plan.deliveries(demand)[0].end, Date::from_days(15));
}

#[test]
fn test_default_plan_is_empty_first_cluster() {
    let plan = ClusterPlan::default();

    assert_eq!(plan.cluster(), ClusterId::default());
    assert_eq!(plan.cluster(), ClusterId(0));
    assert!(plan.is_empty());
}
