//! Tests for the solving rules.

use planforge_config::{Constraints, PlanType, SolverConfig};
use planforge_core::{
    Buffer, Date, Demand, DemandId, Model, Network, Operation, OperationId, PlanForgeError,
    ProcurePolicy, Resource, Result, TimePeriod,
};
use planforge_test::{day, CyclicNetwork, ProcuredAssembly, ProductionLine};
use proptest::prelude::*;

use super::{round_down, round_up, solve_demand};
use crate::command::CommandLog;
use crate::hooks::{HookSet, NoHooks, SolverHooks};
use crate::scope::ClusterScope;
use crate::statistics::RunStatistics;

fn plan_demand(
    model: &mut Model,
    config: &SolverConfig,
    hooks: &dyn SolverHooks,
    demand: DemandId,
) -> (Result<f64>, RunStatistics) {
    let cluster = model.network().demand(demand).cluster;
    let (network, clusters) = model.split_mut();
    let mut log = CommandLog::new();
    let mut scope = ClusterScope::new(network, &mut clusters[cluster.0], &mut log, config, hooks);
    let planned = solve_demand(&mut scope, demand);
    assert_eq!(scope.stack().depth(), 0);
    (planned, scope.into_statistics())
}

/// `(quantity, start, end)` of the plans of an operation, by end date.
fn plans_of(model: &Model, operation: OperationId) -> Vec<(f64, Date, Date)> {
    let cluster = model.network().operation(operation).cluster;
    let mut plans: Vec<(f64, Date, Date)> = model
        .cluster(cluster)
        .map(|plan| {
            plan.plans()
                .filter(|p| p.operation() == Some(operation))
                .map(|p| (p.quantity, p.start, p.end))
                .collect()
        })
        .unwrap_or_default();
    plans.sort_by_key(|&(_, _, end)| end);
    plans
}

#[test]
fn test_rounding_to_multiples() {
    assert_eq!(round_up(26.0, 25.0), 50.0);
    assert_eq!(round_up(25.0, 25.0), 25.0);
    assert_eq!(round_down(190.0, 25.0), 175.0);
    assert_eq!(round_down(7.5, 0.0), 7.5);
}

#[test]
fn test_on_time_delivery_with_free_capacity() {
    let mut line = ProductionLine::new(8.0);
    let order = line.add_demand("order", 10.0, 30);
    let make = line.make;
    let mut model = line.into_model();

    let (planned, stats) = plan_demand(&mut model, &SolverConfig::default(), &NoHooks, order);

    assert_eq!(planned.unwrap(), 10.0);
    assert_eq!(plans_of(&model, make), vec![(10.0, day(29), day(30))]);
    assert_eq!(stats.penalty, 0.0);
    assert_eq!(stats.relocations, 0);
}

#[test]
fn test_overloaded_press_moves_plan_earlier() {
    let mut line = ProductionLine::new(8.0);
    let maintenance = line.add_maintenance(8.0);
    let order = line.add_demand("order", 10.0, 30);
    let make = line.make;
    let mut model = line.into_model();
    model.add_locked_plan(maintenance, 1.0, day(30)).unwrap();
    model.add_locked_plan(maintenance, 1.0, day(29)).unwrap();

    let (planned, stats) = plan_demand(&mut model, &SolverConfig::default(), &NoHooks, order);

    assert_eq!(planned.unwrap(), 10.0);
    assert_eq!(plans_of(&model, make), vec![(10.0, day(27), day(28))]);
    assert_eq!(stats.relocations, 1);
}

#[test]
fn test_saturated_press_delivers_late() {
    let mut line = ProductionLine::new(1.0);
    let maintenance = line.add_maintenance(1.0);
    let order = line.add_demand("order", 10.0, 30);
    let make = line.make;
    let mut model = line.into_model();
    for d in 1..=30 {
        model.add_locked_plan(maintenance, 1.0, day(d)).unwrap();
    }

    let (planned, _) = plan_demand(&mut model, &SolverConfig::default(), &NoHooks, order);

    assert_eq!(planned.unwrap(), 10.0);
    assert_eq!(plans_of(&model, make), vec![(10.0, day(30), day(31))]);
}

#[test]
fn test_zero_lateness_leaves_demand_unplanned() {
    let mut line = ProductionLine::new(1.0);
    let maintenance = line.add_maintenance(1.0);
    line.network.add_demand(
        Demand::new("strict", 10.0, day(30))
            .with_delivery(line.make)
            .with_max_lateness(TimePeriod::ZERO),
    );
    let make = line.make;
    let mut model = line.into_model();
    for d in 1..=30 {
        model.add_locked_plan(maintenance, 1.0, day(d)).unwrap();
    }

    let (planned, _) = plan_demand(&mut model, &SolverConfig::default(), &NoHooks, DemandId(0));

    assert_eq!(planned.unwrap(), 0.0);
    assert!(plans_of(&model, make).is_empty());
}

#[test]
fn test_release_fence_delays_first_plan() {
    let mut line = ProductionLine::new(8.0);
    let order = line.add_demand("order", 4.0, 5);
    let make = line.make;
    if let Some(op) = line.network.operation_mut(make) {
        op.fence = TimePeriod::days(10);
    }
    let mut model = line.into_model();

    let (planned, _) = plan_demand(&mut model, &SolverConfig::default(), &NoHooks, order);

    assert_eq!(planned.unwrap(), 4.0);
    assert_eq!(plans_of(&model, make), vec![(4.0, day(10), day(11))]);
}

#[test]
fn test_fence_ignored_without_fence_constraint() {
    let mut line = ProductionLine::new(8.0);
    let order = line.add_demand("order", 4.0, 5);
    let make = line.make;
    if let Some(op) = line.network.operation_mut(make) {
        op.fence = TimePeriod::days(10);
    }
    let mut model = line.into_model();
    let config = SolverConfig::default()
        .with_constraints(Constraints::LEADTIME | Constraints::MATERIAL | Constraints::CAPACITY);

    let (planned, _) = plan_demand(&mut model, &config, &NoHooks, order);

    assert_eq!(planned.unwrap(), 4.0);
    assert_eq!(plans_of(&model, make), vec![(4.0, day(4), day(5))]);
}

#[test]
fn test_procurement_tops_up_to_maximum() {
    let mut assembly = ProcuredAssembly::new();
    let order = assembly.add_demand("order", 30.0, 30);
    let bolts = assembly.bolts;
    let mut model = assembly.into_model();

    let (planned, stats) = plan_demand(&mut model, &SolverConfig::default(), &NoHooks, order);

    assert_eq!(planned.unwrap(), 30.0);
    assert_eq!(stats.purchases, 1);
    let plan = &model.clusters()[0];
    let purchases = plan.purchases(bolts);
    assert_eq!(purchases.len(), 1);
    assert_eq!(purchases[0].quantity, 175.0);
    assert_eq!(purchases[0].end, day(29));
    assert_eq!(plan.inventory_at(model.network(), bolts, day(29)), 155.0);
    assert_eq!(stats.cost, 175.0 * 0.5);
}

#[test]
fn test_procurement_lead_time_splits_delivery() {
    let mut assembly = ProcuredAssembly::new();
    let order = assembly.add_demand("rush", 30.0, 3);
    let assemble = assembly.assemble;
    let bolts = assembly.bolts;
    let mut model = assembly.into_model();

    let (planned, _) = plan_demand(&mut model, &SolverConfig::default(), &NoHooks, order);

    assert_eq!(planned.unwrap(), 30.0);
    assert_eq!(
        plans_of(&model, assemble),
        vec![(10.0, day(2), day(3)), (20.0, day(5), day(6))]
    );
    let purchases = model.clusters()[0].purchases(bolts);
    assert_eq!(purchases.len(), 1);
    assert_eq!(purchases[0].end, day(5));
}

#[test]
fn test_procurement_merges_within_minimum_interval() {
    let policy = ProcurePolicy {
        min_interval: TimePeriod::days(7),
        ..ProcuredAssembly::default_policy()
    };
    let mut assembly = ProcuredAssembly::with_policy(policy);
    let first = assembly.add_demand("first", 30.0, 20);
    let second = assembly.add_demand("second", 170.0, 23);
    let bolts = assembly.bolts;
    let mut model = assembly.into_model();
    let config = SolverConfig::default();

    plan_demand(&mut model, &config, &NoHooks, first).0.unwrap();
    plan_demand(&mut model, &config, &NoHooks, second).0.unwrap();

    let purchases = model.clusters()[0].purchases(bolts);
    assert_eq!(purchases.len(), 1);
    assert_eq!(purchases[0].end, day(19));
    assert_eq!(purchases[0].quantity, 175.0 + 25.0);
}

#[test]
fn test_short_material_respects_min_shipment() {
    let mut network = Network::new(day(0), day(60));
    let parts = network.add_buffer(Buffer::new("parts").with_onhand(4.0));
    let make = network.add_operation(Operation::fixed_time("make", TimePeriod::days(1)));
    network.add_flow(make, parts, -1.0).unwrap();
    let picky = network.add_demand(
        Demand::new("picky", 10.0, day(10))
            .with_delivery(make)
            .with_min_shipment(10.0)
            .with_max_lateness(TimePeriod::days(5)),
    );
    let lenient = network.add_demand(Demand::new("lenient", 10.0, day(10)).with_delivery(make));
    let mut model = Model::new(network);
    let config = SolverConfig::default();

    let (planned, _) = plan_demand(&mut model, &config, &NoHooks, picky);
    assert_eq!(planned.unwrap(), 0.0);
    assert!(plans_of(&model, make).is_empty());

    let (planned, _) = plan_demand(&mut model, &config, &NoHooks, lenient);
    assert_eq!(planned.unwrap(), 4.0);
    assert_eq!(plans_of(&model, make), vec![(4.0, day(9), day(10))]);
}

#[test]
fn test_unconstrained_material_plans_full_quantity() {
    let mut network = Network::new(day(0), day(60));
    let parts = network.add_buffer(Buffer::new("parts").with_onhand(4.0));
    let make = network.add_operation(Operation::fixed_time("make", TimePeriod::days(1)));
    network.add_flow(make, parts, -1.0).unwrap();
    let order = network.add_demand(Demand::new("order", 10.0, day(10)).with_delivery(make));
    let mut model = Model::new(network);
    let config = SolverConfig::default().with_constraints(Constraints::CAPACITY);

    let (planned, _) = plan_demand(&mut model, &config, &NoHooks, order);

    assert_eq!(planned.unwrap(), 10.0);
    assert_eq!(
        model.clusters()[0].inventory_at(model.network(), parts, day(9)),
        -6.0
    );
}

#[test]
fn test_safety_stock_is_replenished_with_shortage() {
    let mut network = Network::new(day(0), day(60));
    let product = network.add_buffer(Buffer::new("product").with_levels(5.0, 0.0));
    let make = network.add_operation(Operation::fixed_time("make", TimePeriod::days(1)));
    let ship = network.add_operation(Operation::fixed_time("ship", TimePeriod::ZERO));
    network.add_flow(make, product, 1.0).unwrap();
    network.add_flow(ship, product, -1.0).unwrap();
    let order = network.add_demand(Demand::new("order", 10.0, day(20)).with_delivery(ship));
    let mut model = Model::new(network);

    let (planned, _) = plan_demand(&mut model, &SolverConfig::default(), &NoHooks, order);

    assert_eq!(planned.unwrap(), 10.0);
    assert_eq!(plans_of(&model, make), vec![(15.0, day(19), day(20))]);
}

#[test]
fn test_routing_plans_steps_back_to_back() {
    let mut network = Network::new(day(0), day(60));
    let cut = network.add_operation(Operation::fixed_time("cut", TimePeriod::days(1)));
    let weld = network.add_operation(Operation::fixed_time("weld", TimePeriod::days(2)));
    let route = network.add_operation(Operation::routing("frame", vec![cut, weld]));
    let order = network.add_demand(Demand::new("order", 3.0, day(30)).with_delivery(route));
    let mut model = Model::new(network);

    let (planned, _) = plan_demand(&mut model, &SolverConfig::default(), &NoHooks, order);

    assert_eq!(planned.unwrap(), 3.0);
    assert_eq!(plans_of(&model, weld), vec![(3.0, day(28), day(30))]);
    assert_eq!(plans_of(&model, cut), vec![(3.0, day(27), day(28))]);
    assert_eq!(plans_of(&model, route), vec![(3.0, day(27), day(30))]);
    assert_eq!(model.delivered(order), 3.0);
}

struct AlternateFixture {
    model: Model,
    primary: OperationId,
    secondary: OperationId,
    order: DemandId,
}

/// Product made on one of two presses; the preferred press has no capacity
/// for the work, the other one only when `secondary_capacity` allows.
fn alternate_fixture(secondary_capacity: f64) -> AlternateFixture {
    let mut network = Network::new(day(0), day(60));
    let product = network.add_buffer(Buffer::new("product"));
    let small = network.add_resource(Resource::new("small press", 0.5));
    let large = network.add_resource(Resource::new("large press", secondary_capacity));
    let primary = network.add_operation(Operation::fixed_time("make small", TimePeriod::days(1)));
    let secondary = network.add_operation(Operation::fixed_time("make large", TimePeriod::days(1)));
    network.add_flow(primary, product, 1.0).unwrap();
    network.add_flow(secondary, product, 1.0).unwrap();
    network.add_load(primary, small, 1.0).unwrap();
    network.add_load(secondary, large, 1.0).unwrap();
    let source = network.add_operation(Operation::alternate(
        "make",
        vec![(secondary, 2), (primary, 1)],
    ));
    network.set_producing(product, source).unwrap();
    let ship = network.add_operation(Operation::fixed_time("ship", TimePeriod::ZERO));
    network.add_flow(ship, product, -1.0).unwrap();
    let order = network.add_demand(Demand::new("order", 6.0, day(20)).with_delivery(ship));
    AlternateFixture {
        model: Model::new(network),
        primary,
        secondary,
        order,
    }
}

#[test]
fn test_alternate_falls_back_to_secondary() {
    let mut f = alternate_fixture(1.0);

    let (planned, _) = plan_demand(&mut f.model, &SolverConfig::default(), &NoHooks, f.order);

    assert_eq!(planned.unwrap(), 6.0);
    assert!(plans_of(&f.model, f.primary).is_empty());
    assert_eq!(plans_of(&f.model, f.secondary), vec![(6.0, day(19), day(20))]);
}

#[test]
fn test_alternate_without_search_books_primary() {
    let mut f = alternate_fixture(1.0);
    let config = SolverConfig::default().with_plan_type(PlanType::UnconstrainedWithoutSearch);

    let (planned, _) = plan_demand(&mut f.model, &config, &NoHooks, f.order);

    assert_eq!(planned.unwrap(), 6.0);
    assert_eq!(plans_of(&f.model, f.primary), vec![(6.0, day(19), day(20))]);
    assert!(plans_of(&f.model, f.secondary).is_empty());
}

#[test]
fn test_alternate_search_books_remainder_on_primary() {
    let mut f = alternate_fixture(0.5);
    let config = SolverConfig::default().with_plan_type(PlanType::UnconstrainedWithSearch);

    let (planned, _) = plan_demand(&mut f.model, &config, &NoHooks, f.order);

    assert_eq!(planned.unwrap(), 6.0);
    assert_eq!(plans_of(&f.model, f.primary), vec![(6.0, day(19), day(20))]);
    assert!(plans_of(&f.model, f.secondary).is_empty());
}

#[test]
fn test_alternate_search_prefers_feasible_alternate() {
    let mut f = alternate_fixture(1.0);
    let config = SolverConfig::default().with_plan_type(PlanType::UnconstrainedWithSearch);

    let (planned, _) = plan_demand(&mut f.model, &config, &NoHooks, f.order);

    assert_eq!(planned.unwrap(), 6.0);
    assert!(plans_of(&f.model, f.primary).is_empty());
    assert_eq!(plans_of(&f.model, f.secondary), vec![(6.0, day(19), day(20))]);
}

#[test]
fn test_flow_hook_leaves_bill_of_material_alone() {
    let mut line = ProductionLine::new(8.0);
    let order = line.add_demand("order", 10.0, 30);
    let make = line.make;
    let mut model = line.into_model();
    let hooks = HookSet::new().on_flow(|_, _| Ok(false));

    let (planned, _) = plan_demand(&mut model, &SolverConfig::default(), &hooks, order);

    assert_eq!(planned.unwrap(), 10.0);
    assert_eq!(plans_of(&model, make), vec![(10.0, day(29), day(30))]);
}

#[test]
fn test_flow_veto_skips_alternate() {
    let mut f = alternate_fixture(1.0);
    let secondary = f.secondary;
    let config = SolverConfig::default().with_plan_type(PlanType::UnconstrainedWithSearch);
    let hooks = HookSet::new().on_flow(move |flow, _| Ok(flow.operation != secondary));

    let (planned, _) = plan_demand(&mut f.model, &config, &hooks, f.order);

    assert_eq!(planned.unwrap(), 6.0);
    assert_eq!(plans_of(&f.model, f.primary), vec![(6.0, day(19), day(20))]);
    assert!(plans_of(&f.model, f.secondary).is_empty());
}

#[test]
fn test_infinite_resource_accepts_every_plan_in_place() {
    let mut network = Network::new(day(0), day(60));
    let oven = network.add_resource(Resource::infinite("oven"));
    let bake = network.add_operation(Operation::fixed_time("bake", TimePeriod::days(1)));
    let clean = network.add_operation(Operation::fixed_time("clean", TimePeriod::days(1)));
    network.add_load(bake, oven, 1.0).unwrap();
    network.add_load(clean, oven, 5.0).unwrap();
    let order = network.add_demand(Demand::new("order", 10.0, day(30)).with_delivery(bake));
    let mut model = Model::new(network);
    for d in 1..=30 {
        model.add_locked_plan(clean, 1.0, day(d)).unwrap();
    }

    let (planned, stats) = plan_demand(&mut model, &SolverConfig::default(), &NoHooks, order);

    assert_eq!(planned.unwrap(), 10.0);
    assert_eq!(plans_of(&model, bake), vec![(10.0, day(29), day(30))]);
    assert_eq!(stats.relocations, 0);
    assert_eq!(stats.penalty, 0.0);
}

#[test]
fn test_infinite_buffer_never_asks_its_producer() {
    let mut network = Network::new(day(0), day(60));
    let stock = network.add_buffer(Buffer::infinite("stock"));
    let press = network.add_resource(Resource::new("press", 1.0));
    let refill = network.add_operation(Operation::fixed_time("refill", TimePeriod::days(2)));
    let ship = network.add_operation(Operation::fixed_time("ship", TimePeriod::ZERO));
    network.add_flow(refill, stock, 1.0).unwrap();
    network.add_load(refill, press, 1.0).unwrap();
    network.add_flow(ship, stock, -1.0).unwrap();
    let order = network.add_demand(Demand::new("order", 10.0, day(20)).with_delivery(ship));
    let mut model = Model::new(network);
    assert_eq!(model.network().buffer(stock).producing, Some(refill));

    let (planned, stats) = plan_demand(&mut model, &SolverConfig::default(), &NoHooks, order);

    assert_eq!(planned.unwrap(), 10.0);
    assert!(plans_of(&model, refill).is_empty());
    let plan = &model.clusters()[0];
    assert_eq!(plan.plan_count(), 1);
    assert_eq!(plan.flow_plans(stock).len(), 1);
    assert!(plan.load_plans(press).is_empty());
    assert_eq!(stats.relocations, 0);
}

#[test]
fn test_loads_that_keep_moving_reject_plan() {
    let mut network = Network::new(day(0), day(60));
    let lathe = network.add_resource(Resource::new("lathe", 1.0));
    let mill = network.add_resource(Resource::new("mill", 1.0));
    let make = network.add_operation(Operation::fixed_time("make", TimePeriod::days(1)));
    network.add_load(make, lathe, 1.0).unwrap();
    network.add_load(make, mill, 1.0).unwrap();
    let lathe_service = network.add_operation(Operation::fixed_time("lathe service", TimePeriod::days(1)));
    let mill_service = network.add_operation(Operation::fixed_time("mill service", TimePeriod::days(1)));
    network.add_load(lathe_service, lathe, 1.0).unwrap();
    network.add_load(mill_service, mill, 1.0).unwrap();
    let order = network.add_demand(
        Demand::new("order", 1.0, day(30))
            .with_delivery(make)
            .with_max_lateness(TimePeriod::ZERO),
    );
    let mut model = Model::new(network);
    // The lathe is busy on odd days, the mill on even days.
    for d in 1..=15 {
        model.add_locked_plan(lathe_service, 1.0, day(2 * d)).unwrap();
        model.add_locked_plan(mill_service, 1.0, day(2 * d + 1)).unwrap();
    }

    let (planned, stats) = plan_demand(&mut model, &SolverConfig::default(), &NoHooks, order);

    assert_eq!(planned.unwrap(), 0.0);
    assert!(plans_of(&model, make).is_empty());
    assert_eq!(stats.relocations, 16);
}

#[test]
fn test_procure_policy_with_conflicting_sizes_is_rejected() {
    let policy = ProcurePolicy {
        size_minimum: 100.0,
        size_maximum: 50.0,
        ..ProcuredAssembly::default_policy()
    };
    let mut assembly = ProcuredAssembly::with_policy(policy);
    let order = assembly.add_demand("order", 30.0, 30);
    let bolts = assembly.bolts;
    let mut model = assembly.into_model();

    let (planned, _) = plan_demand(&mut model, &SolverConfig::default(), &NoHooks, order);

    assert!(matches!(planned, Err(PlanForgeError::DomainModel(msg)) if msg.contains("bolts")));
    assert!(model.clusters()[0].purchases(bolts).is_empty());
}

#[test]
fn test_operation_hook_error_propagates() {
    let mut line = ProductionLine::new(8.0);
    let order = line.add_demand("order", 10.0, 30);
    let mut model = line.into_model();
    let hooks = HookSet::new().on_operation(|op, _| Err(PlanForgeError::Hook(op.name.clone())));

    let (planned, _) = plan_demand(&mut model, &SolverConfig::default(), &hooks, order);

    assert!(matches!(planned, Err(PlanForgeError::Hook(name)) if name == "make"));
}

#[test]
fn test_missing_delivery_is_a_model_error() {
    let mut network = Network::new(day(0), day(10));
    let orphan = network.add_demand(Demand::new("orphan", 1.0, day(5)));
    let mut model = Model::new(network);

    let (planned, _) = plan_demand(&mut model, &SolverConfig::default(), &NoHooks, orphan);

    assert!(matches!(planned, Err(PlanForgeError::DomainModel(_))));
}

#[test]
fn test_cyclic_network_overflows_state_stack() {
    let cyclic = CyclicNetwork::new();
    let demand = cyclic.demand;
    let mut model = cyclic.into_model();

    let (planned, stats) = plan_demand(&mut model, &SolverConfig::default(), &NoHooks, demand);

    let err = planned.unwrap_err();
    assert!(matches!(err, PlanForgeError::RecursionOverflow { depth: 256 }));
    assert!(err.is_fatal());
    assert_eq!(stats.max_depth, 256);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_answers_stay_within_request(
        capacity in 1u32..4,
        busy_days in prop::collection::vec(1i64..40, 0..25),
        quantity in 1u32..20,
        due in 5i64..40,
    ) {
        let capacity = f64::from(capacity);
        let mut line = ProductionLine::new(capacity);
        let maintenance = line.add_maintenance(capacity);
        let order = line.add_demand("order", f64::from(quantity), due);
        let mut model = line.into_model();
        for &d in &busy_days {
            model.add_locked_plan(maintenance, 1.0, day(d)).unwrap();
        }

        let (planned, _) = plan_demand(&mut model, &SolverConfig::default(), &NoHooks, order);

        let planned = planned.unwrap();
        prop_assert!(planned >= 0.0);
        prop_assert!(planned <= f64::from(quantity) + 1e-9);
        prop_assert!((model.delivered(order) - planned).abs() < 1e-9);
    }

    #[test]
    fn test_purchases_keep_batches_and_spacing(
        min_interval in 0i64..10,
        orders in prop::collection::vec((1u32..120, 1i64..60), 1..6),
    ) {
        let policy = ProcurePolicy {
            min_interval: TimePeriod::days(min_interval),
            ..ProcuredAssembly::default_policy()
        };
        let mut assembly = ProcuredAssembly::with_policy(policy);
        let demands: Vec<(DemandId, f64)> = orders
            .iter()
            .enumerate()
            .map(|(i, &(quantity, due))| {
                (assembly.add_demand(&format!("order-{i}"), f64::from(quantity), due), f64::from(quantity))
            })
            .collect();
        let bolts = assembly.bolts;
        let mut model = assembly.into_model();
        let config = SolverConfig::default();

        for &(demand, quantity) in &demands {
            let (planned, _) = plan_demand(&mut model, &config, &NoHooks, demand);
            let planned = planned.unwrap();
            prop_assert!(planned >= 0.0 && planned <= quantity + 1e-9);
        }

        let purchases = model.clusters()[0].purchases(bolts);
        for purchase in &purchases {
            prop_assert!((purchase.quantity / 25.0).fract().abs() < 1e-9);
            prop_assert!(purchase.quantity > 0.0);
        }
        for pair in purchases.windows(2) {
            prop_assert!(pair[1].end - pair[0].end >= TimePeriod::days(min_interval));
        }
    }
}
