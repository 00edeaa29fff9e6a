//! Planning entry points that hide the solver wiring.

use planforge_config::SolverConfig;
use planforge_core::{Model, Result};
use planforge_solver::{MrpSolver, SolveSummary};

/// Configuration file read by [`plan`].
const CONFIG_FILE: &str = "planforge.toml";

/// Plans the model with the configuration in `planforge.toml`, or the
/// defaults when the file is missing or invalid.
pub fn plan(model: &mut Model) -> Result<SolveSummary> {
    let config = SolverConfig::load(CONFIG_FILE).unwrap_or_default();
    plan_with(model, config)
}

/// Plans the model and commits the result.
pub fn plan_with(model: &mut Model, config: SolverConfig) -> Result<SolveSummary> {
    #[cfg(feature = "console")]
    planforge_console::init(config.log_level);

    let mut solver = MrpSolver::new(config)?;
    let summary = solver.run(model)?;
    solver.commit();
    Ok(summary)
}
