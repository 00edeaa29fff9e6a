//! Shared test fixtures for PlanForge crates.
//!
//! This crate provides small supply networks for testing.
//! It does NOT depend on `planforge-solver` to avoid circular dependencies.
//!
//! - [`line`] - A single production line on one press
//! - [`procure`] - An assembly fed by a purchased component
//! - [`cyclic`] - A network whose material loops back on itself
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! planforge-test = { workspace = true }
//! ```
//!
//! Then build the fixture you need:
//!
//! ```
//! use planforge_test::line::ProductionLine;
//!
//! let mut line = ProductionLine::new(8.0);
//! let order = line.add_demand("order", 10.0, 30);
//! let model = line.into_model();
//! assert_eq!(model.network().demand(order).quantity, 10.0);
//! ```

pub mod cyclic;
pub mod line;
pub mod procure;

pub use cyclic::CyclicNetwork;
pub use line::ProductionLine;
pub use procure::ProcuredAssembly;

use planforge_core::Date;

/// Shorthand for a date on a day boundary.
pub fn day(days: i64) -> Date {
    Date::from_days(days)
}
