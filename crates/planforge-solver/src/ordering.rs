//! Planning sequence of demands.

use std::cmp::Ordering;

use planforge_core::{Demand, DemandId, Network};

/// Orders demands by ascending priority, then due date, then quantity.
///
/// Quantities compare with `total_cmp`, so the order stays a strict weak
/// order even for NaN quantities.
pub fn demand_ordering(a: &Demand, b: &Demand) -> Ordering {
    a.priority
        .cmp(&b.priority)
        .then_with(|| a.due.cmp(&b.due))
        .then_with(|| a.quantity.total_cmp(&b.quantity))
}

/// Sorts demand ids into planning sequence.
///
/// The sort is stable: equivalent demands keep their relative order.
pub fn sort_demands(network: &Network, demands: &mut [DemandId]) {
    demands.sort_by(|&a, &b| demand_ordering(network.demand(a), network.demand(b)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use planforge_core::Date;

    fn demand(priority: i32, due: i64, quantity: f64) -> Demand {
        Demand::new("d", quantity, Date::from_days(due)).with_priority(priority)
    }

    #[test]
    fn test_priority_then_due_then_quantity() {
        let urgent = demand(1, 20, 50.0);
        let early = demand(2, 5, 50.0);
        let small = demand(2, 5, 10.0);

        assert_eq!(demand_ordering(&urgent, &early), Ordering::Less);
        assert_eq!(demand_ordering(&small, &early), Ordering::Less);
        assert_eq!(demand_ordering(&early, &demand(2, 6, 1.0)), Ordering::Less);
    }

    #[test]
    fn test_strict_weak_order() {
        let samples = [
            demand(1, 3, 5.0),
            demand(1, 3, 5.0),
            demand(0, 9, 1.0),
            demand(1, 2, 7.0),
            demand(1, 3, f64::NAN),
            demand(-2, 3, 5.0),
        ];
        for a in &samples {
            assert_ne!(demand_ordering(a, a), Ordering::Less);
            for b in &samples {
                assert_eq!(demand_ordering(a, b), demand_ordering(b, a).reverse());
                for c in &samples {
                    if demand_ordering(a, b) == Ordering::Less
                        && demand_ordering(b, c) == Ordering::Less
                    {
                        assert_eq!(demand_ordering(a, c), Ordering::Less);
                    }
                    if demand_ordering(a, b) == Ordering::Equal
                        && demand_ordering(b, c) == Ordering::Equal
                    {
                        assert_eq!(demand_ordering(a, c), Ordering::Equal);
                    }
                }
            }
        }
    }

    #[test]
    fn test_sort_is_stable_for_equivalent_demands() {
        let mut network = Network::new(Date::from_days(0), Date::from_days(30));
        let first = network.add_demand(Demand::new("first", 5.0, Date::from_days(4)));
        let second = network.add_demand(Demand::new("second", 5.0, Date::from_days(4)));
        let urgent = network.add_demand(Demand::new("urgent", 9.0, Date::from_days(9)).with_priority(-1));

        let mut ids = vec![first, second, urgent];
        sort_demands(&network, &mut ids);
        assert_eq!(ids, vec![urgent, first, second]);
    }
}
