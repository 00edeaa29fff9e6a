//! End-to-end planning scenarios.

use planforge::prelude::*;
use planforge::{HookSet, PlanForgeError};
use planforge_test::{day, CyclicNetwork, ProcuredAssembly, ProductionLine};

/// `(start, end)` of every plan of the line's `make` operation, by end.
fn make_dates(model: &Model, line_make: planforge::OperationId) -> Vec<(Date, Date)> {
    let mut dates: Vec<(Date, Date)> = model
        .clusters()
        .iter()
        .flat_map(|c| c.plans())
        .filter(|p| p.operation() == Some(line_make))
        .map(|p| (p.start, p.end))
        .collect();
    dates.sort_by_key(|&(_, end)| end);
    dates
}

#[test]
fn test_free_capacity_plans_on_due_date() {
    let mut line = ProductionLine::new(8.0);
    let order = line.add_demand("order", 10.0, 30);
    let make = line.make;
    let mut model = line.into_model();

    let summary = plan_with(&mut model, SolverConfig::default()).unwrap();

    assert!(summary.is_clean());
    assert_eq!(model.delivered(order), 10.0);
    assert_eq!(make_dates(&model, make), vec![(day(29), day(30))]);
    assert_eq!(summary.statistics.penalty, 0.0);
    assert_eq!(summary.statistics.demands_planned, 1);
}

#[test]
fn test_loaded_resource_relocates_earlier() {
    let mut line = ProductionLine::new(8.0);
    let maintenance = line.add_maintenance(8.0);
    let order = line.add_demand("order", 10.0, 30);
    let make = line.make;
    let mut model = line.into_model();
    model.add_locked_plan(maintenance, 1.0, day(30)).unwrap();
    model.add_locked_plan(maintenance, 1.0, day(29)).unwrap();

    let summary = plan_with(&mut model, SolverConfig::default()).unwrap();

    assert_eq!(model.delivered(order), 10.0);
    assert_eq!(make_dates(&model, make), vec![(day(27), day(28))]);
    assert_eq!(summary.statistics.relocations, 1);
    assert!(find_problems(&model).is_empty());
}

#[test]
fn test_procurement_replenishes_in_batches() {
    let mut assembly = ProcuredAssembly::new();
    let order = assembly.add_demand("order", 30.0, 30);
    let bolts = assembly.bolts;
    let mut model = assembly.into_model();

    let summary = plan_with(&mut model, SolverConfig::default()).unwrap();

    assert_eq!(model.delivered(order), 30.0);
    assert_eq!(summary.statistics.purchases, 1);
    let purchases = model.clusters()[0].purchases(bolts);
    assert_eq!(purchases.len(), 1);
    assert_eq!(purchases[0].quantity, 175.0);
    assert_eq!(purchases[0].quantity % 25.0, 0.0);
}

#[test]
fn test_failing_demand_does_not_affect_others() {
    let mut line = ProductionLine::new(8.0);
    let orders: Vec<_> = (1..=5)
        .map(|i| line.add_demand(&format!("order-{i}"), 5.0, 10 + i))
        .collect();
    let mut model = line.into_model();
    let hooks = HookSet::new().on_demand(|demand, _| {
        if demand.name == "order-3" {
            Err(PlanForgeError::Internal("scripted failure".into()))
        } else {
            Ok(())
        }
    });
    let mut solver = MrpSolver::new(SolverConfig::default())
        .unwrap()
        .with_hooks(hooks);

    let summary = solver.run(&mut model).unwrap();

    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].name, "order-3");
    assert_eq!(summary.statistics.demands_planned, 4);
    for (i, &order) in orders.iter().enumerate() {
        let expected = if i == 2 { 0.0 } else { 5.0 };
        assert_eq!(model.delivered(order), expected);
    }
}

#[test]
fn test_upstream_hook_failure_keeps_stack_balanced() {
    let mut line = ProductionLine::new(8.0);
    let first = line.add_demand("first", 2.0, 10);
    let broken = line.add_demand("broken", 2.0, 11);
    let last = line.add_demand("last", 2.0, 12);
    let mut model = line.into_model();
    let hooks = HookSet::new().on_resource(move |resource, state| {
        if state.cur_demand == Some(broken) {
            Err(PlanForgeError::Hook(format!("{} offline", resource.name)))
        } else {
            Ok(())
        }
    });
    let mut solver = MrpSolver::new(SolverConfig::default())
        .unwrap()
        .with_hooks(hooks);

    let summary = solver.run(&mut model).unwrap();

    assert_eq!(summary.failures.len(), 1);
    assert!(summary.failures[0].message.contains("press offline"));
    assert_eq!(model.delivered(first), 2.0);
    assert_eq!(model.delivered(broken), 0.0);
    assert_eq!(model.delivered(last), 2.0);
}

#[test]
fn test_cyclic_network_aborts_run() {
    let mut model = CyclicNetwork::new().into_model();

    let err = plan_with(&mut model, SolverConfig::default()).unwrap_err();

    assert!(matches!(err, PlanForgeError::RecursionOverflow { depth: 256 }));
}

#[test]
fn test_identical_demands_swap_without_changing_outcome() {
    let build = |names: [&str; 2]| {
        let mut line = ProductionLine::new(1.0);
        for name in names {
            line.add_demand(name, 1.0, 20);
        }
        let make = line.make;
        let mut model = line.into_model();
        plan_with(&mut model, SolverConfig::default()).unwrap();
        make_dates(&model, make)
    };

    let forward = build(["a", "b"]);
    let swapped = build(["b", "a"]);

    assert_eq!(forward, vec![(day(18), day(19)), (day(19), day(20))]);
    assert_eq!(forward, swapped);
}

#[test]
fn test_deferred_commit_can_be_undone() {
    let mut line = ProductionLine::new(8.0);
    let order = line.add_demand("order", 10.0, 30);
    let mut model = line.into_model();
    let mut solver = MrpSolver::new(SolverConfig::default().with_autocommit(false)).unwrap();

    solver.run(&mut model).unwrap();
    assert_eq!(model.delivered(order), 10.0);

    solver.undo(&mut model);
    assert_eq!(model.delivered(order), 0.0);
    assert_eq!(solver.pending_changes(), 0);
}

#[test]
fn test_toml_config_drives_run() {
    let config = SolverConfig::from_toml_str(
        r#"
        constraints = 7
        max_parallel = 2
        autocommit = true
        "#,
    )
    .unwrap();
    let mut line = ProductionLine::new(8.0);
    let order = line.add_demand("order", 4.0, 5);
    let make = line.make;
    if let Some(op) = line.network.operation_mut(make) {
        op.fence = TimePeriod::days(10);
    }
    let mut model = line.into_model();

    let summary = plan_with(&mut model, config).unwrap();

    assert_eq!(summary.threads, 1);
    assert_eq!(model.delivered(order), 4.0);
    assert_eq!(make_dates(&model, make), vec![(day(4), day(5))]);
}
