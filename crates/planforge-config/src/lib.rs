//! Configuration system for PlanForge.
//!
//! Load solver configuration from TOML or YAML to select the enforced
//! constraints, the plan type and the threading model without code changes.
//!
//! # Examples
//!
//! Load configuration from TOML string:
//!
//! ```
//! use planforge_config::{Constraints, PlanType, SolverConfig};
//!
//! let config = SolverConfig::from_toml_str(r#"
//!     constraints = 6
//!     plan_type = 1
//!     max_parallel = 4
//!     lazy_delay = 3600
//! "#).unwrap();
//!
//! assert!(config.constraints.contains(Constraints::CAPACITY));
//! assert!(!config.constraints.contains(Constraints::LEADTIME));
//! assert_eq!(config.plan_type, PlanType::Constrained);
//! assert_eq!(config.resolved_parallelism(), 4);
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use planforge_config::SolverConfig;
//!
//! let config = SolverConfig::load("solver.toml").unwrap_or_default();
//! // Proceeds with defaults if file doesn't exist
//! assert!(config.autocommit);
//! ```

use std::fmt;
use std::ops::BitOr;
use std::path::Path;

use planforge_core::{PlanForgeError, TimePeriod, SECONDS_PER_DAY};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for PlanForgeError {
    fn from(err: ConfigError) -> Self {
        PlanForgeError::Config(err.to_string())
    }
}

/// Set of enforced constraint kinds.
///
/// Flags combine with `|`; the numeric values are stable and used in
/// configuration files.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Constraints(u8);

impl Constraints {
    pub const NONE: Constraints = Constraints(0);
    pub const LEADTIME: Constraints = Constraints(1);
    pub const MATERIAL: Constraints = Constraints(2);
    pub const CAPACITY: Constraints = Constraints(4);
    pub const FENCE: Constraints = Constraints(8);
    pub const ALL: Constraints = Constraints(15);

    /// Creates a constraint set from its bitmask.
    pub fn from_bits(bits: u8) -> Result<Self, ConfigError> {
        if bits & !Self::ALL.0 != 0 {
            return Err(ConfigError::Invalid(format!(
                "constraint bitmask {bits} has unknown flags"
            )));
        }
        Ok(Constraints(bits))
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns true when all flags of `other` are set.
    pub const fn contains(self, other: Constraints) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn leadtime(self) -> bool {
        self.contains(Self::LEADTIME)
    }

    pub fn material(self) -> bool {
        self.contains(Self::MATERIAL)
    }

    pub fn capacity(self) -> bool {
        self.contains(Self::CAPACITY)
    }

    pub fn fence(self) -> bool {
        self.contains(Self::FENCE)
    }
}

impl Default for Constraints {
    fn default() -> Self {
        Self::ALL
    }
}

impl BitOr for Constraints {
    type Output = Constraints;

    fn bitor(self, rhs: Constraints) -> Constraints {
        Constraints(self.0 | rhs.0)
    }
}

impl TryFrom<u8> for Constraints {
    type Error = ConfigError;

    fn try_from(bits: u8) -> Result<Self, ConfigError> {
        Constraints::from_bits(bits)
    }
}

impl From<Constraints> for u8 {
    fn from(c: Constraints) -> u8 {
        c.0
    }
}

impl fmt::Debug for Constraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = [
            (Self::LEADTIME, "LEADTIME"),
            (Self::MATERIAL, "MATERIAL"),
            (Self::CAPACITY, "CAPACITY"),
            (Self::FENCE, "FENCE"),
        ]
        .into_iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, name)| name)
        .collect();
        if names.is_empty() {
            write!(f, "Constraints(NONE)")
        } else {
            write!(f, "Constraints({})", names.join(" | "))
        }
    }
}

/// Planning mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PlanType {
    /// Demands are planned late or short when constraints bind.
    #[default]
    Constrained,

    /// Availability is searched across alternates; the remaining shortage
    /// is booked on the primary alternate.
    UnconstrainedWithSearch,

    /// Everything is booked on the primary alternate.
    UnconstrainedWithoutSearch,
}

impl PlanType {
    /// Returns true for both unconstrained modes.
    pub fn is_unconstrained(self) -> bool {
        self != PlanType::Constrained
    }
}

impl TryFrom<u8> for PlanType {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, ConfigError> {
        match value {
            1 => Ok(PlanType::Constrained),
            2 => Ok(PlanType::UnconstrainedWithSearch),
            3 => Ok(PlanType::UnconstrainedWithoutSearch),
            other => Err(ConfigError::Invalid(format!("plan type {other} is not 1, 2 or 3"))),
        }
    }
}

impl From<PlanType> for u8 {
    fn from(plan_type: PlanType) -> u8 {
        match plan_type {
            PlanType::Constrained => 1,
            PlanType::UnconstrainedWithSearch => 2,
            PlanType::UnconstrainedWithoutSearch => 3,
        }
    }
}

/// Highest supported log level.
pub const MAX_LOG_LEVEL: u8 = 3;

fn default_lazy_delay() -> i64 {
    SECONDS_PER_DAY
}

fn default_autocommit() -> bool {
    true
}

/// Main solver configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SolverConfig {
    /// Enforced constraints.
    #[serde(default)]
    pub constraints: Constraints,

    #[serde(default)]
    pub plan_type: PlanType,

    /// Worker thread count; `None` picks a default.
    #[serde(default)]
    pub max_parallel: Option<usize>,

    /// Seconds added to the asked date when a reply is unusable.
    #[serde(default = "default_lazy_delay")]
    pub lazy_delay: i64,

    /// Commit plan changes after each demand.
    #[serde(default = "default_autocommit")]
    pub autocommit: bool,

    /// 0 silent, 1 per-demand progress, 2 ask/reply trace, 3 entity state.
    #[serde(default)]
    pub log_level: u8,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            constraints: Constraints::default(),
            plan_type: PlanType::default(),
            max_parallel: None,
            lazy_delay: default_lazy_delay(),
            autocommit: default_autocommit(),
            log_level: 0,
        }
    }
}

impl SolverConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist, contains invalid TOML or holds
    /// out-of-range values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the value ranges of a deserialized or hand-built config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(0) = self.max_parallel {
            return Err(ConfigError::Invalid(
                "invalid number of parallel solver threads: 0".into(),
            ));
        }
        if self.lazy_delay <= 0 {
            return Err(ConfigError::Invalid(format!(
                "invalid lazy delay: {}",
                self.lazy_delay
            )));
        }
        if self.log_level > MAX_LOG_LEVEL {
            return Err(ConfigError::Invalid(format!(
                "log level {} above {MAX_LOG_LEVEL}",
                self.log_level
            )));
        }
        Ok(())
    }

    /// Sets the number of worker threads.
    pub fn set_max_parallel(&mut self, threads: usize) -> Result<(), ConfigError> {
        if threads < 1 {
            return Err(ConfigError::Invalid(format!(
                "invalid number of parallel solver threads: {threads}"
            )));
        }
        self.max_parallel = Some(threads);
        Ok(())
    }

    /// Sets the lazy delay in seconds.
    pub fn set_lazy_delay(&mut self, seconds: i64) -> Result<(), ConfigError> {
        if seconds <= 0 {
            return Err(ConfigError::Invalid(format!("invalid lazy delay: {seconds}")));
        }
        self.lazy_delay = seconds;
        Ok(())
    }

    /// Sets the plan type from its numeric code.
    pub fn set_plan_type(&mut self, code: u8) -> Result<(), ConfigError> {
        self.plan_type = PlanType::try_from(code)?;
        Ok(())
    }

    pub fn set_log_level(&mut self, level: u8) -> Result<(), ConfigError> {
        if level > MAX_LOG_LEVEL {
            return Err(ConfigError::Invalid(format!(
                "log level {level} above {MAX_LOG_LEVEL}"
            )));
        }
        self.log_level = level;
        Ok(())
    }

    /// Sets the enforced constraints.
    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_plan_type(mut self, plan_type: PlanType) -> Self {
        self.plan_type = plan_type;
        self
    }

    pub fn with_autocommit(mut self, autocommit: bool) -> Self {
        self.autocommit = autocommit;
        self
    }

    /// The lazy delay as a time period.
    pub fn lazy_delay_period(&self) -> TimePeriod {
        TimePeriod::seconds(self.lazy_delay)
    }

    /// Returns the number of worker threads to use.
    ///
    /// An explicit setting wins. Otherwise verbose runs use one thread to
    /// keep the trace readable and silent runs use all processors.
    pub fn resolved_parallelism(&self) -> usize {
        if let Some(threads) = self.max_parallel {
            return threads;
        }
        if self.log_level > 0 {
            return 1;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}
