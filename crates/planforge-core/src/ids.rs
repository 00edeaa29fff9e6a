//! Typed arena indices for supply-graph nodes and plan instances.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
        pub struct $name(pub usize);

        impl $name {
            /// Returns the raw arena index.
            pub const fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "#{}"), self.0)
            }
        }
    };
}

define_id!(
    /// Index of an [`Operation`](crate::network::Operation).
    OperationId,
    "operation"
);
define_id!(
    /// Index of a [`Buffer`](crate::network::Buffer).
    BufferId,
    "buffer"
);
define_id!(
    /// Index of a [`Resource`](crate::network::Resource).
    ResourceId,
    "resource"
);
define_id!(
    /// Index of a [`Flow`](crate::network::Flow).
    FlowId,
    "flow"
);
define_id!(
    /// Index of a [`Load`](crate::network::Load).
    LoadId,
    "load"
);
define_id!(
    /// Index of a [`Demand`](crate::network::Demand).
    DemandId,
    "demand"
);
define_id!(
    /// Index of an [`OperationPlan`](crate::plan::OperationPlan) within its cluster.
    PlanId,
    "plan"
);
define_id!(
    /// Identifier of an independent planning cluster.
    ClusterId,
    "cluster"
);
