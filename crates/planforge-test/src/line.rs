//! Single production line fixture.
//!
//! One operation `make` takes a day, consumes one unit of raw material from
//! an infinite buffer and uses one unit of a press.
//!
//! # Example
//!
//! ```
//! use planforge_test::line::ProductionLine;
//!
//! let mut line = ProductionLine::new(1.0);
//! line.add_demand("first", 5.0, 10);
//! line.add_demand("second", 5.0, 10);
//! assert_eq!(line.network.demands().count(), 2);
//! ```

use planforge_core::{
    Buffer, BufferId, Date, Demand, DemandId, Model, Network, Operation, OperationId, Resource,
    ResourceId, TimePeriod,
};

/// Production line network under construction.
#[derive(Debug, Clone)]
pub struct ProductionLine {
    pub network: Network,
    pub raw: BufferId,
    pub press: ResourceId,
    pub make: OperationId,
}

impl ProductionLine {
    /// Creates the line with a press of the given capacity, planned from
    /// day 0 to day 365.
    pub fn new(capacity: f64) -> Self {
        let mut network = Network::new(Date::from_days(0), Date::from_days(365));
        let raw = network.add_buffer(Buffer::infinite("raw"));
        let press = network.add_resource(Resource::new("press", capacity));
        let make = network.add_operation(Operation::fixed_time("make", TimePeriod::days(1)));
        network
            .add_flow(make, raw, -1.0)
            .expect("fixture flow is valid");
        network
            .add_load(make, press, 1.0)
            .expect("fixture load is valid");
        Self {
            network,
            raw,
            press,
            make,
        }
    }

    /// Adds a demand delivered by `make`, due on day `due`.
    pub fn add_demand(&mut self, name: &str, quantity: f64, due: i64) -> DemandId {
        self.network
            .add_demand(Demand::new(name, quantity, Date::from_days(due)).with_delivery(self.make))
    }

    /// Adds a separate one-day operation using `usage` of the press.
    pub fn add_maintenance(&mut self, usage: f64) -> OperationId {
        let maintenance = self
            .network
            .add_operation(Operation::fixed_time("maintenance", TimePeriod::days(1)));
        self.network
            .add_load(maintenance, self.press, usage)
            .expect("fixture load is valid");
        maintenance
    }

    pub fn into_model(self) -> Model {
        Model::new(self.network)
    }
}
