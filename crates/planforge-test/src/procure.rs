//! Purchased component fixture.
//!
//! An assembly step of one day consumes one bolt per unit. Bolts are bought
//! in batches of 25 with a lead time of five days, keeping at least 50 and
//! topping up to 200. Ten bolts are on hand at day 0.

use planforge_core::{
    Buffer, BufferId, Date, Demand, DemandId, Model, Network, Operation, OperationId,
    ProcurePolicy, TimePeriod,
};

/// Assembly network with a procurement buffer.
#[derive(Debug, Clone)]
pub struct ProcuredAssembly {
    pub network: Network,
    pub bolts: BufferId,
    pub assemble: OperationId,
}

impl ProcuredAssembly {
    pub fn new() -> Self {
        Self::with_policy(Self::default_policy())
    }

    /// Batch size 25 and five days of lead time.
    pub fn default_policy() -> ProcurePolicy {
        ProcurePolicy {
            leadtime: TimePeriod::days(5),
            size_multiple: 25.0,
            cost: 0.5,
            ..ProcurePolicy::default()
        }
    }

    pub fn with_policy(policy: ProcurePolicy) -> Self {
        let mut network = Network::new(Date::from_days(0), Date::from_days(365));
        let bolts = network.add_buffer(
            Buffer::procure("bolts", policy)
                .with_onhand(10.0)
                .with_levels(50.0, 200.0),
        );
        let assemble = network.add_operation(Operation::fixed_time("assemble", TimePeriod::days(1)));
        network
            .add_flow(assemble, bolts, -1.0)
            .expect("fixture flow is valid");
        Self {
            network,
            bolts,
            assemble,
        }
    }

    /// Adds a demand delivered by `assemble`, due on day `due`.
    pub fn add_demand(&mut self, name: &str, quantity: f64, due: i64) -> DemandId {
        self.network.add_demand(
            Demand::new(name, quantity, Date::from_days(due)).with_delivery(self.assemble),
        )
    }

    pub fn into_model(self) -> Model {
        Model::new(self.network)
    }
}

impl Default for ProcuredAssembly {
    fn default() -> Self {
        Self::new()
    }
}
