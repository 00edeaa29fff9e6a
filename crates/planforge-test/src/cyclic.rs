//! Cyclic network fixture.
//!
//! The instantaneous operation `recycle` consumes two units of `scrap` and
//! produces one, and it is the only producer of `scrap`. Every replenishment
//! therefore asks for more than it yields, and the recursion never ends on
//! its own.

use planforge_core::{
    Buffer, BufferId, Date, Demand, DemandId, Model, Network, Operation, OperationId, TimePeriod,
};

#[derive(Debug, Clone)]
pub struct CyclicNetwork {
    pub network: Network,
    pub scrap: BufferId,
    pub recycle: OperationId,
    pub demand: DemandId,
}

impl CyclicNetwork {
    pub fn new() -> Self {
        let mut network = Network::new(Date::from_days(0), Date::from_days(60));
        let scrap = network.add_buffer(Buffer::new("scrap"));
        let recycle = network.add_operation(Operation::fixed_time("recycle", TimePeriod::ZERO));
        network
            .add_flow(recycle, scrap, -2.0)
            .expect("fixture flow is valid");
        network
            .add_flow(recycle, scrap, 1.0)
            .expect("fixture flow is valid");
        let demand = network
            .add_demand(Demand::new("loop", 1.0, Date::from_days(10)).with_delivery(recycle));
        Self {
            network,
            scrap,
            recycle,
            demand,
        }
    }

    pub fn into_model(self) -> Model {
        Model::new(self.network)
    }
}

impl Default for CyclicNetwork {
    fn default() -> Self {
        Self::new()
    }
}
